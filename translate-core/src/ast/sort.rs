//! Sort nodes and their compilation into `ORDER BY` keys.

use cypher_builder::{Clause, Expr, OrderByItem, ReturnClause, SortDirection};
use graph_schema::Attribute;

use crate::ast::{substitute_this, QueryAstNode};
use crate::request::Attachment;
use crate::{Context, TranslateError, TranslateResult};

/// One requested ordering key.
#[derive(Debug)]
pub enum Sort {
    Property(PropertySort),
    CypherProperty(CypherPropertySort),
    FulltextScore(FulltextScoreSort),
}

/// Plain attribute ordering.
#[derive(Debug)]
pub struct PropertySort {
    pub attachment: Attachment,
    pub attribute: Attribute,
    pub direction: SortDirection,
}

/// Ordering on a computed attribute. The computed expression must be
/// materialized into its own variable before the `ORDER BY` can refer to
/// it, so this sort contributes a subquery.
#[derive(Debug)]
pub struct CypherPropertySort {
    pub attribute: Attribute,
    pub direction: SortDirection,
}

/// Ordering on the relevance score produced by a prior full-text-search
/// clause.
#[derive(Debug)]
pub struct FulltextScoreSort {
    pub direction: SortDirection,
}

/// A compiled sort key: subqueries to evaluate beforehand plus the
/// `ORDER BY` entry itself.
#[derive(Debug)]
pub struct CompiledSort {
    pub subqueries: Vec<Clause>,
    pub item: OrderByItem,
}

impl Sort {
    /// Compiles this key against the bindings in scope. `node_base` roots
    /// node-attribute access (the target variable, or `edge.node` after a
    /// connection collects its edges); `edge_base` roots edge-attribute
    /// access when one is available.
    pub fn compile(
        &self,
        ctx: &Context,
        node_base: &Expr,
        edge_base: Option<&Expr>,
    ) -> TranslateResult<CompiledSort> {
        match self {
            Sort::Property(sort) => {
                let base = match sort.attachment {
                    Attachment::Node => node_base,
                    Attachment::Edge => edge_base.ok_or_else(|| {
                        TranslateError::structural("edge sort without a relationship in scope")
                    })?,
                };
                Ok(CompiledSort {
                    subqueries: Vec::new(),
                    item: OrderByItem {
                        expr: Expr::nested_property(base.clone(), &sort.attribute.name),
                        direction: sort.direction,
                    },
                })
            }
            Sort::CypherProperty(sort) => {
                let target = ctx.target()?;
                let expression = sort.attribute.computed.as_deref().ok_or_else(|| {
                    TranslateError::structural("cypher sort on a stored attribute")
                })?;

                let variable = ctx.env().new_variable();
                let subquery = Clause::CallSubquery {
                    imports: vec![target.clone()],
                    clauses: vec![Clause::Return(ReturnClause::aliased(
                        Expr::Raw(substitute_this(expression, target)),
                        variable.clone(),
                    ))],
                };

                Ok(CompiledSort {
                    subqueries: vec![subquery],
                    item: OrderByItem {
                        expr: Expr::Variable(variable),
                        direction: sort.direction,
                    },
                })
            }
            Sort::FulltextScore(sort) => {
                let score = ctx.score().ok_or_else(|| {
                    TranslateError::structural("score sort without a fulltext score in scope")
                })?;
                Ok(CompiledSort {
                    subqueries: Vec::new(),
                    item: OrderByItem {
                        expr: Expr::variable(score),
                        direction: sort.direction,
                    },
                })
            }
        }
    }
}

impl QueryAstNode for Sort {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        Vec::new()
    }
}

/// Compiles all keys in caller order: first key is the primary ordering,
/// later keys break ties. Subqueries concatenate in the same order.
pub fn compile_all(
    sorts: &[Sort],
    ctx: &Context,
    node_base: &Expr,
    edge_base: Option<&Expr>,
) -> TranslateResult<(Vec<Clause>, Vec<OrderByItem>)> {
    let mut subqueries = Vec::new();
    let mut items = Vec::new();

    for sort in sorts {
        let compiled = sort.compile(ctx, node_base, edge_base)?;
        subqueries.extend(compiled.subqueries);
        items.push(compiled.item);
    }

    Ok((subqueries, items))
}
