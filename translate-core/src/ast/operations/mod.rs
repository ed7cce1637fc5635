//! Operation nodes and their four-stage transpilation pipeline:
//! match the pattern, guard it with the compiled filters (subqueries
//! first), order then paginate, and finally project the requested shape.

mod composite_connection_read;
mod connection_read;
mod read;

pub use composite_connection_read::CompositeConnectionReadOperation;
pub use connection_read::ConnectionReadOperation;
pub use read::{FulltextStage, ProjectionField, ReadOperation};

use std::sync::Arc;

use cypher_builder::{
    Clause, Expr, NodePattern, Pattern, ReturnClause, Variable, WithClause, WithItem,
};
use graph_schema::{ConcreteEntity, Relationship};

use crate::ast::filters::{self, Filter};
use crate::ast::pagination::Pagination;
use crate::ast::sort::{self, Sort};
use crate::ast::{traversal_pattern, QueryAstNode, TranspileResult};
use crate::{Context, TranslateError, TranslateResult};

/// One compiled field's operation tree.
#[derive(Debug)]
pub enum Operation {
    Read(ReadOperation),
    ConnectionRead(ConnectionReadOperation),
    CompositeConnectionRead(CompositeConnectionReadOperation),
}

impl Operation {
    pub fn transpile(&self, ctx: &Context) -> TranslateResult<TranspileResult> {
        match self {
            Operation::Read(op) => op.transpile(ctx),
            Operation::ConnectionRead(op) => op.transpile(ctx),
            Operation::CompositeConnectionRead(op) => op.transpile(ctx),
        }
    }
}

impl QueryAstNode for Operation {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        match self {
            Operation::Read(op) => op.children(),
            Operation::ConnectionRead(op) => op.children(),
            Operation::CompositeConnectionRead(op) => op.children(),
        }
    }

    fn owned_relationship(&self) -> Option<&Arc<Relationship>> {
        match self {
            Operation::Read(op) => op.owned_relationship(),
            Operation::ConnectionRead(op) => op.owned_relationship(),
            Operation::CompositeConnectionRead(op) => op.owned_relationship(),
        }
    }
}

/// Stage one and two shared by all operations: bind a target (either a
/// root node match or a traversal from the parent in scope), compile the
/// filters and place the guard. Filter subqueries go between the MATCH
/// and a `WITH * WHERE` guard; without subqueries the predicate attaches
/// to the MATCH directly.
pub(crate) fn match_stage(
    entity: &ConcreteEntity,
    relationship: Option<&Arc<Relationship>>,
    filters: &[Filter],
    ctx: &Context,
) -> TranslateResult<(Vec<Clause>, Variable, Context)> {
    let (pattern, target, child_ctx) = match relationship {
        Some(relationship) => {
            let parent = ctx.target()?.clone();
            let rel_variable = ctx.env().new_target();
            let target = ctx.env().new_target();
            let pattern = traversal_pattern(
                &parent,
                relationship,
                Some(rel_variable.clone()),
                entity,
                Some(target.clone()),
            );
            let child_ctx = ctx
                .with_target(target.clone())
                .with_relationship(rel_variable);
            (pattern, target, child_ctx)
        }
        None => {
            let target = ctx.env().new_target();
            let pattern = Pattern::node(NodePattern::new(target.clone(), entity.labels.clone()));
            (pattern, target.clone(), ctx.with_target(target))
        }
    };

    let compiled = filters::compile_all(filters, &child_ctx)?;
    let mut clauses = Vec::new();

    if compiled.subqueries.is_empty() {
        clauses.push(Clause::Match {
            pattern,
            filter: compiled.predicate,
        });
    } else {
        clauses.push(Clause::Match {
            pattern,
            filter: None,
        });
        clauses.extend(compiled.subqueries);
        if let Some(predicate) = compiled.predicate {
            clauses.push(Clause::With(WithClause::star().with_filter(predicate)));
        }
    }

    Ok((clauses, target, child_ctx))
}

/// The shared connection tail: edges are already collected under the
/// fixed `edges`/`totalCount` names. Applies ordering and pagination over
/// the collected set when requested (unwind, reorder, slice, re-collect)
/// and returns the `{ edges, totalCount }` map bound to a fresh variable.
/// `totalCount` is computed before the slice, so it reflects the full
/// cardinality.
pub(crate) fn collected_edges_tail(
    clauses: &mut Vec<Clause>,
    sorts: &[Sort],
    pagination: &Pagination,
    ctx: &Context,
) -> TranslateResult<Variable> {
    let edges = Variable::new("edges");
    let total_count = Variable::new("totalCount");
    let edge = Variable::new("edge");

    clauses.push(Clause::With(WithClause::items(vec![
        WithItem::Variable(edges.clone()),
        WithItem::Aliased {
            expr: Expr::function("size", vec![Expr::variable(&edges)]),
            alias: total_count.clone(),
        },
    ])));

    let (skip, limit) = pagination.compile(ctx);
    let node_base = Expr::nested_property(Expr::variable(&edge), "node");
    let edge_base = Expr::nested_property(Expr::variable(&edge), "properties");
    let (sort_subqueries, order_items) = sort::compile_all(sorts, ctx, &node_base, Some(&edge_base))?;

    if !sort_subqueries.is_empty() {
        // Post-collect ordering can only reference the edge maps; sorts
        // that need their own subqueries must have been materialized into
        // the maps by the factory.
        return Err(TranslateError::structural(
            "connection sort keys must resolve within the collected edges",
        ));
    }

    if !order_items.is_empty() || skip.is_some() || limit.is_some() {
        clauses.push(Clause::Unwind {
            expr: Expr::variable(&edges),
            alias: edge.clone(),
        });
        clauses.push(Clause::With(
            WithClause::items(vec![
                WithItem::Variable(edge.clone()),
                WithItem::Variable(total_count.clone()),
            ])
            .with_order_by(order_items)
            .with_skip(skip)
            .with_limit(limit),
        ));
        clauses.push(Clause::With(WithClause::items(vec![
            WithItem::Aliased {
                expr: Expr::function("collect", vec![Expr::variable(&edge)]),
                alias: edges.clone(),
            },
            WithItem::Variable(total_count.clone()),
        ])));
    }

    let result = ctx.env().new_variable();
    clauses.push(Clause::Return(ReturnClause::aliased(
        Expr::MapLiteral(vec![
            ("edges".to_owned(), Expr::variable(&edges)),
            ("totalCount".to_owned(), Expr::variable(&total_count)),
        ]),
        result.clone(),
    )));

    Ok(result)
}
