//! Sort-field resolution against the schema model.

use graph_schema::{CompositeEntity, CompositeKind, ConcreteEntity, Relationship, Schema};

use crate::ast::sort::{CypherPropertySort, FulltextScoreSort, PropertySort, Sort};
use crate::request::{Attachment, SortArg};
use crate::{Context, TranslateError, TranslateResult};

/// The pseudo-field ordering by full-text relevance. Only recognized when
/// a score variable is in scope; otherwise it goes through the ordinary
/// attribute lookup.
pub(crate) const SCORE_FIELD: &str = "score";

/// Resolves the requested sort keys, in caller order. Unknown attribute
/// names fail the compilation. `for_connection` marks keys destined for
/// post-collect ordering, where computed attributes are referenced
/// through the collected node map instead of a subquery.
pub(crate) fn sort_fields(
    entity: &ConcreteEntity,
    relationship: Option<&Relationship>,
    args: &[SortArg],
    ctx: &Context,
    for_connection: bool,
) -> TranslateResult<Vec<Sort>> {
    args.iter()
        .map(|arg| resolve(entity, relationship, arg, ctx, for_connection))
        .collect()
}

fn resolve(
    entity: &ConcreteEntity,
    relationship: Option<&Relationship>,
    arg: &SortArg,
    ctx: &Context,
    for_connection: bool,
) -> TranslateResult<Sort> {
    match arg.attachment {
        Attachment::Edge => {
            let relationship = relationship.ok_or_else(|| {
                TranslateError::InvalidInput(
                    "edge sort outside a relationship connection".to_owned(),
                )
            })?;
            let attribute = relationship.attribute(&arg.field)?.clone();
            if attribute.is_computed() {
                return Err(TranslateError::InvalidInput(format!(
                    "sorting on computed edge attribute {} is not supported",
                    arg.field
                )));
            }
            Ok(Sort::Property(PropertySort {
                attachment: Attachment::Edge,
                attribute,
                direction: arg.direction,
            }))
        }
        Attachment::Node => {
            if arg.field == SCORE_FIELD && ctx.score().is_some() {
                return Ok(Sort::FulltextScore(FulltextScoreSort {
                    direction: arg.direction,
                }));
            }

            let attribute = entity.attribute(&arg.field)?.clone();
            if attribute.is_computed() && !for_connection {
                Ok(Sort::CypherProperty(CypherPropertySort {
                    attribute,
                    direction: arg.direction,
                }))
            } else {
                Ok(Sort::Property(PropertySort {
                    attachment: Attachment::Node,
                    attribute,
                    direction: arg.direction,
                }))
            }
        }
    }
}

/// Sort keys for a composite (union/interface) connection. Unions have no
/// common attribute space, so they silently produce no sort fields at
/// all. Interface keys must resolve on every member; the first member's
/// attribute stands in for the shared one.
pub(crate) fn composite_sort_fields(
    schema: &Schema,
    composite: &CompositeEntity,
    relationship: Option<&Relationship>,
    args: &[SortArg],
) -> TranslateResult<Vec<Sort>> {
    if composite.kind == CompositeKind::Union {
        return Ok(Vec::new());
    }

    args.iter()
        .map(|arg| match arg.attachment {
            Attachment::Edge => {
                let relationship = relationship.ok_or_else(|| {
                    TranslateError::InvalidInput(
                        "edge sort outside a relationship connection".to_owned(),
                    )
                })?;
                let attribute = relationship.attribute(&arg.field)?.clone();
                Ok(Sort::Property(PropertySort {
                    attachment: Attachment::Edge,
                    attribute,
                    direction: arg.direction,
                }))
            }
            Attachment::Node => {
                let mut first = None;
                for member in composite.members() {
                    let entity = schema.concrete(member)?;
                    let attribute = entity.attribute(&arg.field)?;
                    if first.is_none() {
                        first = Some(attribute.clone());
                    }
                }
                let attribute = first.ok_or_else(|| {
                    TranslateError::InvalidInput(format!(
                        "interface {} has no concrete members",
                        composite.name
                    ))
                })?;
                Ok(Sort::Property(PropertySort {
                    attachment: Attachment::Node,
                    attribute,
                    direction: arg.direction,
                }))
            }
        })
        .collect()
}
