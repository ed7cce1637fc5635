use cypher_builder::{CypherValue, Expr};

use crate::ast::QueryAstNode;
use crate::Context;

/// Skip/limit of one operation. Both parts are independent and always
/// apply strictly after ordering.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.limit.is_none()
    }

    /// Turns the values into `$param` references, skip first.
    pub fn compile(&self, ctx: &Context) -> (Option<Expr>, Option<Expr>) {
        let skip = self.skip.map(|v| ctx.env().new_param(CypherValue::Int(v)));
        let limit = self.limit.map(|v| ctx.env().new_param(CypherValue::Int(v)));
        (skip, limit)
    }
}

impl QueryAstNode for Pagination {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        Vec::new()
    }
}
