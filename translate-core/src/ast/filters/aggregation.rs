use std::sync::Arc;

use cypher_builder::{Clause, CypherValue, Expr, ReturnClause, Variable};
use graph_schema::{Attribute, ConcreteEntity, Relationship};

use crate::ast::filters::{comparison_for, CompiledFilter, LogicalOperator};
use crate::ast::{traversal_pattern, QueryAstNode};
use crate::request::{AggregationOperator, Attachment, PropertyOperator};
use crate::{Context, TranslateResult};

/// Predicate over aggregates of a relationship's related elements.
///
/// Compiles into a `CALL` subquery that traverses the relationship,
/// evaluates all child predicates against the aggregated rows and returns
/// a single boolean; the filter's own predicate is then just
/// `var = true`. With zero child predicates the filter compiles to
/// nothing at all — no subquery, no predicate.
#[derive(Debug)]
pub struct AggregationFilter {
    pub relationship: Arc<Relationship>,
    pub target: Arc<ConcreteEntity>,
    pub predicates: Vec<AggregationPredicate>,
}

impl AggregationFilter {
    pub fn compile(&self, ctx: &Context) -> TranslateResult<CompiledFilter> {
        if self.predicates.is_empty() {
            return Ok(CompiledFilter::default());
        }

        let parent = ctx.target()?.clone();
        let rel_variable = ctx.env().new_target();
        let node_variable = ctx.env().new_target();

        let pattern = traversal_pattern(
            &parent,
            &self.relationship,
            Some(rel_variable.clone()),
            &self.target,
            Some(node_variable.clone()),
        );

        let child_ctx = ctx
            .with_target(node_variable)
            .with_relationship(rel_variable);

        let combined = Expr::and(
            self.predicates
                .iter()
                .map(|p| p.predicate(&child_ctx))
                .collect::<TranslateResult<Vec<_>>>()?,
        );

        let return_variable = ctx.env().new_variable();
        let subquery = Clause::CallSubquery {
            imports: vec![parent],
            clauses: vec![
                Clause::Match {
                    pattern,
                    filter: None,
                },
                Clause::Return(ReturnClause::aliased(combined, return_variable.clone())),
            ],
        };

        let predicate = Expr::compare(
            Expr::Variable(return_variable),
            cypher_builder::Comparison::Equals,
            Expr::Literal(CypherValue::Bool(true)),
        );

        Ok(CompiledFilter {
            subqueries: vec![subquery],
            predicate: Some(predicate),
        })
    }
}

/// One predicate inside an aggregation filter.
#[derive(Debug)]
pub enum AggregationPredicate {
    /// Compares the number of related elements.
    Count {
        operator: PropertyOperator,
        value: i64,
    },
    /// Compares an aggregate over one attribute of the related node or
    /// edge.
    Property {
        attachment: Attachment,
        attribute: Attribute,
        aggregation: AggregationOperator,
        operator: PropertyOperator,
        value: CypherValue,
    },
    Logical {
        operator: LogicalOperator,
        children: Vec<AggregationPredicate>,
    },
}

impl AggregationPredicate {
    fn predicate(&self, ctx: &Context) -> TranslateResult<Expr> {
        match self {
            AggregationPredicate::Count { operator, value } => {
                let count = Expr::function("count", vec![Expr::variable(ctx.target()?)]);
                let param = ctx.env().new_param(CypherValue::Int(*value));
                Ok(Expr::compare(count, comparison_for(*operator), param))
            }
            AggregationPredicate::Property {
                attachment,
                attribute,
                aggregation,
                operator,
                value,
            } => {
                let variable = match attachment {
                    Attachment::Node => ctx.target()?,
                    Attachment::Edge => ctx.relationship()?,
                };
                let aggregated = Expr::function(
                    aggregation_function(*aggregation),
                    vec![Expr::property(variable, &attribute.name)],
                );
                let param = ctx.env().new_param(value.clone());
                Ok(Expr::compare(aggregated, comparison_for(*operator), param))
            }
            AggregationPredicate::Logical { operator, children } => {
                let compiled = children
                    .iter()
                    .map(|c| c.predicate(ctx))
                    .collect::<TranslateResult<Vec<_>>>()?;
                Ok(match operator {
                    LogicalOperator::And => Expr::and(compiled),
                    LogicalOperator::Or => Expr::or(compiled),
                    LogicalOperator::Not => {
                        let mut compiled = compiled;
                        match compiled.pop() {
                            Some(inner) if compiled.is_empty() => Expr::not(inner),
                            _ => {
                                return Err(crate::TranslateError::structural(
                                    "NOT aggregation predicate must wrap exactly one child",
                                ))
                            }
                        }
                    }
                })
            }
        }
    }
}

impl QueryAstNode for AggregationPredicate {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        match self {
            AggregationPredicate::Logical { children, .. } => {
                children.iter().map(|c| c as &dyn QueryAstNode).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn aggregation_function(operator: AggregationOperator) -> &'static str {
    match operator {
        AggregationOperator::Average => "avg",
        AggregationOperator::Sum => "sum",
        AggregationOperator::Min => "min",
        AggregationOperator::Max => "max",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Environment, RequestContext};
    use cypher_builder::render_clauses;
    use expect_test::expect;
    use graph_schema::{Cardinality, Direction, ScalarKind};

    fn person() -> Arc<ConcreteEntity> {
        let mut entity = ConcreteEntity::new("Person", vec!["Person".to_owned()]);
        entity.add_attribute(Attribute::stored("age", ScalarKind::Int));
        Arc::new(entity)
    }

    fn actors() -> Arc<Relationship> {
        Arc::new(Relationship::new(
            "actors",
            "ACTED_IN",
            Direction::In,
            "Person",
            Cardinality::Many,
        ))
    }

    fn ctx() -> Context {
        let env = Environment::new();
        let ctx = Context::new(env, RequestContext::default());
        let target = ctx.env().new_target();
        ctx.with_target(target)
    }

    #[test]
    fn empty_aggregation_compiles_to_nothing() {
        let filter = AggregationFilter {
            relationship: actors(),
            target: person(),
            predicates: vec![],
        };

        let compiled = filter.compile(&ctx()).unwrap();
        assert!(compiled.subqueries.is_empty());
        assert!(compiled.predicate.is_none());
    }

    #[test]
    fn predicates_combine_with_and_inside_the_subquery() {
        let filter = AggregationFilter {
            relationship: actors(),
            target: person(),
            predicates: vec![
                AggregationPredicate::Count {
                    operator: PropertyOperator::GreaterThan,
                    value: 2,
                },
                AggregationPredicate::Property {
                    attachment: Attachment::Node,
                    attribute: Attribute::stored("age", ScalarKind::Int),
                    aggregation: AggregationOperator::Average,
                    operator: PropertyOperator::GreaterThanOrEqual,
                    value: CypherValue::Int(40),
                },
            ],
        };

        let compiled = filter.compile(&ctx()).unwrap();

        expect![[r#"
            CALL {
                WITH this0
                MATCH (this0)<-[this1:ACTED_IN]-(this2:Person)
                RETURN (count(this2) > $param0 AND avg(this2.age) >= $param1) AS var3
            }"#]]
        .assert_eq(&render_clauses(&compiled.subqueries));

        let mut out = String::new();
        compiled.predicate.unwrap().render(&mut out);
        assert_eq!(out, "var3 = true");
    }
}
