use std::sync::Arc;

use cypher_builder::{Clause, Expr, Variable, WithClause, WithItem};
use graph_schema::Relationship;

use crate::ast::operations::{collected_edges_tail, ConnectionReadOperation};
use crate::ast::pagination::Pagination;
use crate::ast::sort::Sort;
use crate::ast::{QueryAstNode, TranspileResult};
use crate::{Context, TranslateResult};

/// Connection read over a union or interface field: one partial per
/// concrete implementing type, in schema-declaration order.
///
/// Partials never sort or paginate individually. Each transpiles under
/// the shared `edge` return-variable convention and the partials combine
/// with UNION; only once the merged set exists does this operation order,
/// slice and count it. Ordering before the union would order each type's
/// rows independently, which is wrong for mixed-type pagination.
#[derive(Debug)]
pub struct CompositeConnectionReadOperation {
    pub partials: Vec<ConnectionReadOperation>,
    pub sorts: Vec<Sort>,
    pub pagination: Pagination,
}

impl CompositeConnectionReadOperation {
    pub fn transpile(&self, ctx: &Context) -> TranslateResult<TranspileResult> {
        let branches = self
            .partials
            .iter()
            .map(|partial| partial.transpile_partial(ctx, true))
            .collect::<TranslateResult<Vec<_>>>()?;

        let mut clauses = vec![Clause::CallSubquery {
            imports: Vec::new(),
            clauses: vec![Clause::Union(branches)],
        }];

        clauses.push(Clause::With(WithClause::items(vec![WithItem::Aliased {
            expr: Expr::function("collect", vec![Expr::Variable(Variable::new("edge"))]),
            alias: Variable::new("edges"),
        }])));

        let result = collected_edges_tail(&mut clauses, &self.sorts, &self.pagination, ctx)?;

        Ok(TranspileResult {
            clauses,
            projection: Expr::Variable(result),
        })
    }
}

impl QueryAstNode for CompositeConnectionReadOperation {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        let mut children: Vec<&dyn QueryAstNode> = Vec::new();
        children.extend(self.partials.iter().map(|p| p as &dyn QueryAstNode));
        children.extend(self.sorts.iter().map(|s| s as &dyn QueryAstNode));
        children.push(&self.pagination);
        children
    }

    fn owned_relationship(&self) -> Option<&Arc<Relationship>> {
        None
    }
}
