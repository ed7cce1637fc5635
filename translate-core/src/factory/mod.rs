//! Builds Filter/Sort/Pagination/Operation trees from one field's
//! validated request arguments and the schema model.

mod filters;
mod sorts;

use std::sync::Arc;

use graph_schema::{ConcreteEntity, Entity, Relationship, Schema};

use crate::ast::operations::{
    CompositeConnectionReadOperation, ConnectionReadOperation, FulltextStage, Operation,
    ProjectionField, ReadOperation,
};
use crate::ast::pagination::Pagination;
use crate::ast::sort::{PropertySort, Sort};
use crate::request::{Attachment, ConnectionArgs, FieldArgs, PaginationArg, Selection, WhereArg};
use crate::{Context, TranslateError, TranslateResult};

/// Builds a plain read operation for one field.
pub fn read_operation(
    schema: &Schema,
    entity: &Arc<ConcreteEntity>,
    relationship: Option<Arc<Relationship>>,
    args: &FieldArgs,
    ctx: &Context,
) -> TranslateResult<ReadOperation> {
    let fulltext = match &args.fulltext {
        Some(arg) => {
            if relationship.is_some() {
                return Err(TranslateError::InvalidInput(
                    "fulltext is only available on root fields".to_owned(),
                ));
            }
            Some(FulltextStage {
                index: arg.index.clone(),
                phrase: arg.phrase.clone(),
                score_variable: ctx.env().new_variable(),
            })
        }
        None => None,
    };

    // Sort resolution sees the score binding; nested subtrees do not.
    let scoped_ctx = match &fulltext {
        Some(stage) => ctx.with_score(stage.score_variable.clone()),
        None => ctx.clone(),
    };

    let filter_nodes = match &args.filter {
        Some(arg) => vec![filters::build_filter(schema, entity, relationship.as_deref(), arg)?],
        None => Vec::new(),
    };

    let sorts = sorts::sort_fields(entity, relationship.as_deref(), &args.sort, &scoped_ctx, false)?;
    let selection = projection_fields(entity, &args.selection.attributes)?;

    let mut nested = Vec::new();
    for field in &args.selection.nested {
        if field.args.fulltext.is_some() {
            return Err(TranslateError::InvalidInput(
                "fulltext is only available on root fields".to_owned(),
            ));
        }

        let rel = Arc::new(entity.relationship(&field.field)?.clone());
        let target = match schema.entity(&rel.target)?.as_ref() {
            Entity::Concrete(ce) => ce.clone(),
            Entity::Composite(_) => {
                return Err(TranslateError::InvalidInput(format!(
                    "nested field {} targets a union or interface; select it through a connection field",
                    field.field
                )))
            }
        };

        let mut operation = read_operation(schema, &target, Some(rel), &field.args, ctx)?;
        operation.alias = field.response_key().to_owned();
        nested.push(operation);
    }

    Ok(ReadOperation {
        entity: entity.clone(),
        relationship,
        alias: entity.name.clone(),
        filters: filter_nodes,
        sorts,
        pagination: pagination(&args.pagination),
        selection,
        nested,
        fulltext,
    })
}

/// Builds the connection operation for one field: a plain connection read
/// for concrete entities, a composite one (one partial per member, in
/// schema-declaration order) for unions and interfaces.
pub fn connection_operation(
    schema: &Schema,
    entity: &Arc<Entity>,
    relationship: Option<Arc<Relationship>>,
    args: &ConnectionArgs,
    ctx: &Context,
) -> TranslateResult<Operation> {
    match entity.as_ref() {
        Entity::Concrete(ce) => {
            let mut operation = connection_read(
                schema,
                ce,
                relationship,
                args.filter.as_ref(),
                &args.node_selection,
                &args.edge_attributes,
            )?;

            let sorts = sorts::sort_fields(ce, operation.relationship.as_deref(), &args.sort, ctx, true)?;
            extend_projection_for_sorts(
                &mut operation.node_projection,
                &mut operation.edge_attributes,
                &sorts,
            );
            operation.sorts = sorts;
            operation.pagination = pagination(&args.pagination);

            Ok(Operation::ConnectionRead(operation))
        }

        Entity::Composite(composite) => {
            let sorts = sorts::composite_sort_fields(
                schema,
                composite,
                relationship.as_deref(),
                &args.sort,
            )?;

            let mut partials = Vec::new();
            for member in composite.members() {
                let ce = schema.concrete(member)?;
                let member_filter = merged_filter(args.filter.as_ref(), args.member_filters.get(member.as_str()));
                let member_selection = args
                    .member_selections
                    .get(member.as_str())
                    .unwrap_or(&args.node_selection);

                let mut partial = connection_read(
                    schema,
                    ce,
                    relationship.clone(),
                    member_filter.as_ref(),
                    member_selection,
                    &args.edge_attributes,
                )?;

                // The composite orders over the collected edge maps, so
                // every partial has to materialize the sort keys — with
                // its own computed expressions where they differ.
                if !sorts.is_empty() {
                    let member_sorts =
                        sorts::sort_fields(ce, partial.relationship.as_deref(), &args.sort, ctx, true)?;
                    extend_projection_for_sorts(
                        &mut partial.node_projection,
                        &mut partial.edge_attributes,
                        &member_sorts,
                    );
                }

                partials.push(partial);
            }

            Ok(Operation::CompositeConnectionRead(CompositeConnectionReadOperation {
                partials,
                sorts,
                pagination: pagination(&args.pagination),
            }))
        }
    }
}

/// Builds the match/filter/projection core of a connection read. Sorting
/// and pagination are attached by the caller, which decides whether they
/// belong to this operation or to an owning composite.
fn connection_read(
    schema: &Schema,
    entity: &Arc<ConcreteEntity>,
    relationship: Option<Arc<Relationship>>,
    filter: Option<&WhereArg>,
    node_selection: &Selection,
    edge_attributes: &[String],
) -> TranslateResult<ConnectionReadOperation> {
    if !node_selection.nested.is_empty() {
        return Err(TranslateError::InvalidInput(
            "nested selections inside connection nodes are not supported".to_owned(),
        ));
    }

    let filter_nodes = match filter {
        Some(arg) => vec![filters::build_filter(schema, entity, relationship.as_deref(), arg)?],
        None => Vec::new(),
    };

    let node_projection = projection_fields(entity, &node_selection.attributes)?;

    let edge_attributes = if edge_attributes.is_empty() {
        Vec::new()
    } else {
        let rel = relationship.as_deref().ok_or_else(|| {
            TranslateError::InvalidInput(
                "edge properties are only available on relationship connections".to_owned(),
            )
        })?;
        for name in edge_attributes {
            rel.attribute(name)?;
        }
        edge_attributes.to_vec()
    };

    Ok(ConnectionReadOperation {
        entity: entity.clone(),
        relationship,
        filters: filter_nodes,
        sorts: Vec::new(),
        pagination: Pagination::default(),
        node_projection,
        edge_attributes,
    })
}

fn projection_fields(
    entity: &ConcreteEntity,
    attributes: &[String],
) -> TranslateResult<Vec<ProjectionField>> {
    attributes
        .iter()
        .map(|name| {
            let attribute = entity.attribute(name)?;
            Ok(match &attribute.computed {
                Some(expression) => ProjectionField::Computed {
                    name: name.clone(),
                    expression: expression.clone(),
                },
                None => ProjectionField::Stored(name.clone()),
            })
        })
        .collect()
}

/// Post-collect ordering reads the collected edge maps, so sort keys not
/// already selected have to ride along in the projection.
fn extend_projection_for_sorts(
    node_projection: &mut Vec<ProjectionField>,
    edge_attributes: &mut Vec<String>,
    sorts: &[Sort],
) {
    for sort in sorts {
        let Sort::Property(PropertySort {
            attachment,
            attribute,
            ..
        }) = sort
        else {
            continue;
        };

        match attachment {
            Attachment::Node => {
                if !node_projection.iter().any(|f| f.name() == attribute.name) {
                    node_projection.push(match &attribute.computed {
                        Some(expression) => ProjectionField::Computed {
                            name: attribute.name.clone(),
                            expression: expression.clone(),
                        },
                        None => ProjectionField::Stored(attribute.name.clone()),
                    });
                }
            }
            Attachment::Edge => {
                if !edge_attributes.contains(&attribute.name) {
                    edge_attributes.push(attribute.name.clone());
                }
            }
        }
    }
}

fn merged_filter(base: Option<&WhereArg>, member: Option<&WhereArg>) -> Option<WhereArg> {
    match (base, member) {
        (Some(base), Some(member)) => Some(WhereArg::And(vec![base.clone(), member.clone()])),
        (Some(base), None) => Some(base.clone()),
        (None, Some(member)) => Some(member.clone()),
        (None, None) => None,
    }
}

fn pagination(arg: &PaginationArg) -> Pagination {
    Pagination {
        skip: arg.offset,
        limit: arg.limit,
    }
}
