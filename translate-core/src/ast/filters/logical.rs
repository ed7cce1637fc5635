use cypher_builder::Expr;

use crate::ast::filters::{CompiledFilter, Filter};
use crate::{Context, TranslateError, TranslateResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

/// Boolean combinator over child filters. Children compile in the literal
/// order given by the caller; operands are never reordered so generated
/// output stays deterministic and diffable.
#[derive(Debug)]
pub struct LogicalFilter {
    pub operator: LogicalOperator,
    pub children: Vec<Filter>,
}

impl LogicalFilter {
    pub fn compile(&self, ctx: &Context) -> TranslateResult<CompiledFilter> {
        if self.operator == LogicalOperator::Not && self.children.len() != 1 {
            return Err(TranslateError::structural(
                "NOT filter must wrap exactly one child",
            ));
        }

        let mut subqueries = Vec::new();
        let mut predicates = Vec::new();

        for child in &self.children {
            let compiled = child.compile(ctx)?;
            subqueries.extend(compiled.subqueries);
            predicates.extend(compiled.predicate);
        }

        let predicate = match self.operator {
            // Zero resolved children short-circuit to the identity value.
            LogicalOperator::And => Some(Expr::and(predicates)),
            LogicalOperator::Or => Some(Expr::or(predicates)),
            LogicalOperator::Not => predicates.pop().map(Expr::not),
        };

        Ok(CompiledFilter {
            subqueries,
            predicate,
        })
    }
}
