use cypher_builder::{CypherValue, Expr};
use graph_schema::Attribute;

use crate::ast::filters::{comparison_for, CompiledFilter};
use crate::request::{Attachment, PropertyOperator};
use crate::{Context, TranslateResult};

/// Compares one attribute of the bound node or relationship against a
/// parameterized value.
#[derive(Debug)]
pub struct PropertyFilter {
    pub attachment: Attachment,
    pub attribute: Attribute,
    pub operator: PropertyOperator,
    pub value: CypherValue,
}

impl PropertyFilter {
    pub fn compile(&self, ctx: &Context) -> TranslateResult<CompiledFilter> {
        let variable = match self.attachment {
            Attachment::Node => ctx.target()?,
            Attachment::Edge => ctx.relationship()?,
        };

        let lhs = Expr::property(variable, &self.attribute.name);
        let rhs = ctx.env().new_param(self.value.clone());

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
    use cypher_builder::Variable;
    use graph_schema::ScalarKind;

    fn ctx_with_target() -> Context {
        let env = Environment::new();
        Context::new(env, RequestContext::default()).with_target(Variable::new("this0"))
    }

    fn rendered(expr: &Expr) -> String {
        let mut out = String::new();
        expr.render(&mut out);
        out
    }

    #[test]
    fn compiles_to_a_parameterized_comparison() {
        let filter = PropertyFilter {
            attachment: Attachment::Node,
            attribute: Attribute::stored("title", ScalarKind::String),
            operator: PropertyOperator::StartsWith,
            value: CypherValue::from("The "),
        };

        let compiled = filter.compile(&ctx_with_target()).unwrap();
        assert_eq!(
            rendered(&compiled.predicate.unwrap()),
            "this0.title STARTS WITH $param0"
        );
    }

    #[test]
    fn edge_attachment_requires_a_relationship_binding() {
        let filter = PropertyFilter {
            attachment: Attachment::Edge,
            attribute: Attribute::stored("year", ScalarKind::Int),
            operator: PropertyOperator::Equals,
            value: CypherValue::Int(1999),
        };

        let err = filter.compile(&ctx_with_target()).unwrap_err();
        assert!(err.is_structural());
    }
}
