use std::sync::Arc;

use cypher_builder::{
    Clause, CypherValue, Expr, ProjectionItem, ReturnClause, Variable, WithClause, WithItem,
};
use graph_schema::{ConcreteEntity, Relationship};

use crate::ast::filters::Filter;
use crate::ast::operations::read::ProjectionField;
use crate::ast::operations::{collected_edges_tail, match_stage};
use crate::ast::pagination::Pagination;
use crate::ast::sort::Sort;
use crate::ast::{substitute_this, QueryAstNode, TranspileResult};
use crate::{Context, TranslateResult};

/// Relay-style connection read: matches like a plain read but wraps the
/// result as `{ edges: [...], totalCount }`. `totalCount` is computed
/// from the collected set before pagination; ordering and slicing happen
/// over the collected edges, not the raw match.
#[derive(Debug)]
pub struct ConnectionReadOperation {
    pub entity: Arc<ConcreteEntity>,
    pub relationship: Option<Arc<Relationship>>,
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub pagination: Pagination,
    /// Node attributes projected into each edge's `node` map. The factory
    /// extends this with every node-attached sort key so post-collect
    /// ordering can resolve.
    pub node_projection: Vec<ProjectionField>,
    /// Edge attributes projected into each edge's `properties` map,
    /// likewise extended with edge-attached sort keys.
    pub edge_attributes: Vec<String>,
}

impl ConnectionReadOperation {
    pub fn transpile(&self, ctx: &Context) -> TranslateResult<TranspileResult> {
        let (mut clauses, target, child_ctx) =
            match_stage(&self.entity, self.relationship.as_ref(), &self.filters, ctx)?;

        let edge_map = self.edge_map(&child_ctx, &target, false)?;
        clauses.push(Clause::With(WithClause::items(vec![WithItem::Aliased {
            expr: Expr::function("collect", vec![edge_map]),
            alias: Variable::new("edges"),
        }])));

        let result = collected_edges_tail(&mut clauses, &self.sorts, &self.pagination, &child_ctx)?;

        Ok(TranspileResult {
            clauses,
            projection: Expr::Variable(result),
        })
    }

    /// Transpiles this operation as one partial of a composite
    /// connection: match, filter, and return a single edge map under the
    /// shared `edge` variable. Sorting and pagination are deliberately
    /// absent; the owning composite applies them after the union is
    /// materialized.
    pub(crate) fn transpile_partial(
        &self,
        ctx: &Context,
        tag_typename: bool,
    ) -> TranslateResult<Vec<Clause>> {
        let mut clauses = Vec::new();

        // Union branches import their outer scope individually.
        if self.relationship.is_some() {
            clauses.push(Clause::With(WithClause::items(vec![WithItem::Variable(
                ctx.target()?.clone(),
            )])));
        }

        let (match_clauses, target, child_ctx) =
            match_stage(&self.entity, self.relationship.as_ref(), &self.filters, ctx)?;
        clauses.extend(match_clauses);

        let edge_map = self.edge_map(&child_ctx, &target, tag_typename)?;
        clauses.push(Clause::Return(ReturnClause::aliased(
            edge_map,
            Variable::new("edge"),
        )));

        Ok(clauses)
    }

    /// The `{ node: ..., properties: ... }` map collected for each match.
    /// Computed node attributes inline their substituted expression so
    /// the value survives collection.
    fn edge_map(
        &self,
        ctx: &Context,
        target: &Variable,
        tag_typename: bool,
    ) -> TranslateResult<Expr> {
        let mut node_items = Vec::new();
        if tag_typename {
            node_items.push(ProjectionItem::Aliased {
                alias: "__typename".to_owned(),
                expr: Expr::Literal(CypherValue::String(self.entity.name.clone())),
            });
        }
        for field in &self.node_projection {
            match field {
                ProjectionField::Stored(name) => {
                    node_items.push(ProjectionItem::Property(name.clone()));
                }
                ProjectionField::Computed { name, expression } => {
                    node_items.push(ProjectionItem::Aliased {
                        alias: name.clone(),
                        expr: Expr::Raw(substitute_this(expression, target)),
                    });
                }
            }
        }

        let mut entries = vec![(
            "node".to_owned(),
            Expr::MapProjection {
                variable: target.clone(),
                items: node_items,
            },
        )];

        if !self.edge_attributes.is_empty() {
            let relationship = ctx.relationship()?;
            entries.push((
                "properties".to_owned(),
                Expr::MapProjection {
                    variable: relationship.clone(),
                    items: self
                        .edge_attributes
                        .iter()
                        .map(|name| ProjectionItem::Property(name.clone()))
                        .collect(),
                },
            ));
        }

        Ok(Expr::MapLiteral(entries))
    }
}

impl QueryAstNode for ConnectionReadOperation {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        let mut children: Vec<&dyn QueryAstNode> = Vec::new();
        children.extend(self.filters.iter().map(|f| f as &dyn QueryAstNode));
        children.extend(self.sorts.iter().map(|s| s as &dyn QueryAstNode));
        children.push(&self.pagination);
        children
    }

    fn owned_relationship(&self) -> Option<&Arc<Relationship>> {
        self.relationship.as_ref()
    }
}
