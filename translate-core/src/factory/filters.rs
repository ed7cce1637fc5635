//! Builds the filter tree from the `where` argument.

use std::sync::Arc;

use cypher_builder::CypherValue;
use graph_schema::{ConcreteEntity, Entity, Relationship, Schema};

use crate::ast::filters::{
    AggregationFilter, AggregationPredicate, CountFilter, Filter, LogicalFilter, LogicalOperator,
    PropertyFilter, RelationshipFilter,
};
use crate::request::{AggregationArg, Attachment, WhereArg};
use crate::{TranslateError, TranslateResult};

/// Recursively lowers one `where` tree against `entity`. `relationship`
/// is the traversed relationship when compiling a connection's `where`,
/// making edge-attached property filters resolvable.
pub(crate) fn build_filter(
    schema: &Schema,
    entity: &Arc<ConcreteEntity>,
    relationship: Option<&Relationship>,
    arg: &WhereArg,
) -> TranslateResult<Filter> {
    match arg {
        WhereArg::And(children) => logical(schema, entity, relationship, LogicalOperator::And, children),
        WhereArg::Or(children) => logical(schema, entity, relationship, LogicalOperator::Or, children),
        WhereArg::Not(child) => Ok(Filter::Logical(LogicalFilter {
            operator: LogicalOperator::Not,
            children: vec![build_filter(schema, entity, relationship, child)?],
        })),

        WhereArg::Property {
            attachment,
            field,
            operator,
            value,
        } => {
            let attribute = match attachment {
                Attachment::Node => entity.attribute(field)?,
                Attachment::Edge => relationship
                    .ok_or_else(|| {
                        TranslateError::InvalidInput(
                            "edge filter outside a relationship connection".to_owned(),
                        )
                    })?
                    .attribute(field)?,
            };
            if attribute.is_computed() {
                return Err(TranslateError::InvalidInput(format!(
                    "filtering on computed attribute {field} is not supported"
                )));
            }

            Ok(Filter::Property(PropertyFilter {
                attachment: *attachment,
                attribute: attribute.clone(),
                operator: *operator,
                value: CypherValue::from(value.clone()),
            }))
        }

        WhereArg::Relationship {
            field,
            quantifier,
            filter,
        } => {
            let (rel, target) = resolve_relationship(schema, entity, field)?;
            let nested = build_filter(schema, &target, None, filter)?;
            if nested.contains_aggregation() {
                return Err(TranslateError::InvalidInput(format!(
                    "aggregation filters cannot be nested inside the relationship filter on {field}"
                )));
            }

            Ok(Filter::Relationship(RelationshipFilter {
                relationship: rel,
                target,
                quantifier: *quantifier,
                filter: Some(Box::new(nested)),
            }))
        }

        WhereArg::RelationshipCount {
            field,
            operator,
            count,
        } => {
            let (rel, target) = resolve_relationship(schema, entity, field)?;
            Ok(Filter::Count(CountFilter {
                relationship: rel,
                target,
                operator: *operator,
                count: *count,
            }))
        }

        WhereArg::Aggregation { field, predicates } => {
            let (rel, target) = resolve_relationship(schema, entity, field)?;
            let predicates = predicates
                .iter()
                .map(|p| aggregation_predicate(&rel, &target, p))
                .collect::<TranslateResult<Vec<_>>>()?;

            Ok(Filter::Aggregation(AggregationFilter {
                relationship: rel,
                target,
                predicates,
            }))
        }
    }
}

fn logical(
    schema: &Schema,
    entity: &Arc<ConcreteEntity>,
    relationship: Option<&Relationship>,
    operator: LogicalOperator,
    children: &[WhereArg],
) -> TranslateResult<Filter> {
    Ok(Filter::Logical(LogicalFilter {
        operator,
        children: children
            .iter()
            .map(|child| build_filter(schema, entity, relationship, child))
            .collect::<TranslateResult<Vec<_>>>()?,
    }))
}

fn resolve_relationship(
    schema: &Schema,
    entity: &ConcreteEntity,
    field: &str,
) -> TranslateResult<(Arc<Relationship>, Arc<ConcreteEntity>)> {
    let relationship = Arc::new(entity.relationship(field)?.clone());
    let target = match schema.entity(&relationship.target)?.as_ref() {
        Entity::Concrete(ce) => ce.clone(),
        Entity::Composite(_) => {
            return Err(TranslateError::InvalidInput(format!(
                "relationship {field} targets a union or interface and cannot be filtered directly"
            )))
        }
    };
    Ok((relationship, target))
}

fn aggregation_predicate(
    relationship: &Arc<Relationship>,
    target: &Arc<ConcreteEntity>,
    arg: &AggregationArg,
) -> TranslateResult<AggregationPredicate> {
    match arg {
        AggregationArg::And(children) => aggregation_logical(relationship, target, LogicalOperator::And, children),
        AggregationArg::Or(children) => aggregation_logical(relationship, target, LogicalOperator::Or, children),
        AggregationArg::Not(child) => Ok(AggregationPredicate::Logical {
            operator: LogicalOperator::Not,
            children: vec![aggregation_predicate(relationship, target, child)?],
        }),
        AggregationArg::Count { operator, value } => Ok(AggregationPredicate::Count {
            operator: *operator,
            value: *value,
        }),
        AggregationArg::Property {
            attachment,
            field,
            aggregation,
            operator,
            value,
        } => {
            let attribute = match attachment {
                Attachment::Node => target.attribute(field)?,
                Attachment::Edge => relationship.attribute(field)?,
            };
            Ok(AggregationPredicate::Property {
                attachment: *attachment,
                attribute: attribute.clone(),
                aggregation: *aggregation,
                operator: *operator,
                value: CypherValue::from(value.clone()),
            })
        }
    }
}

fn aggregation_logical(
    relationship: &Arc<Relationship>,
    target: &Arc<ConcreteEntity>,
    operator: LogicalOperator,
    children: &[AggregationArg],
) -> TranslateResult<AggregationPredicate> {
    Ok(AggregationPredicate::Logical {
        operator,
        children: children
            .iter()
            .map(|child| aggregation_predicate(relationship, target, child))
            .collect::<TranslateResult<Vec<_>>>()?,
    })
}
