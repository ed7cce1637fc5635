use std::sync::Arc;

use cypher_builder::{CypherValue, Expr};
use graph_schema::{ConcreteEntity, Relationship};

use crate::ast::filters::{comparison_for, CompiledFilter};
use crate::ast::traversal_pattern;
use crate::request::PropertyOperator;
use crate::{Context, TranslateResult};

/// Compares the cardinality of a relationship pattern.
#[derive(Debug)]
pub struct CountFilter {
    pub relationship: Arc<Relationship>,
    pub target: Arc<ConcreteEntity>,
    pub operator: PropertyOperator,
    pub count: i64,
}

impl CountFilter {
    pub fn compile(&self, ctx: &Context) -> TranslateResult<CompiledFilter> {
        let parent = ctx.target()?;

        let pattern = traversal_pattern(parent, &self.relationship, None, &self.target, None);
        let lhs = Expr::PatternCount {
            pattern,
            predicate: None,
        };
        let rhs = ctx.env().new_param(CypherValue::Int(self.count));

        Ok(CompiledFilter::predicate(Expr::compare(
            lhs,
            comparison_for(self.operator),
            rhs,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Environment, RequestContext};
    use graph_schema::{Cardinality, Direction};

    #[test]
    fn compares_an_anonymous_pattern_count() {
        let env = Environment::new();
        let ctx = Context::new(env, RequestContext::default());
        let ctx = ctx.with_target(ctx.env().new_target());

        let filter = CountFilter {
            relationship: Arc::new(Relationship::new(
                "actors",
                "ACTED_IN",
                Direction::In,
                "Person",
                Cardinality::Many,
            )),
            target: Arc::new(ConcreteEntity::new("Person", vec!["Person".to_owned()])),
            operator: PropertyOperator::GreaterThanOrEqual,
            count: 3,
        };

        let compiled = filter.compile(&ctx).unwrap();
        let mut out = String::new();
        compiled.predicate.unwrap().render(&mut out);
        assert_eq!(
            out,
            "COUNT { (this0)<-[:ACTED_IN]-(:Person) } >= $param0"
        );
    }
}
