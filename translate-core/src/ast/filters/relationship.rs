use std::sync::Arc;

use cypher_builder::{CypherValue, Comparison, Expr};
use graph_schema::{ConcreteEntity, Relationship};

use crate::ast::filters::{CompiledFilter, Filter};
use crate::ast::traversal_pattern;
use crate::request::RelationshipQuantifier;
use crate::{Context, TranslateError, TranslateResult};

/// Quantified predicate over a relationship traversal, compiled to
/// `EXISTS`/`COUNT` subquery expressions.
#[derive(Debug)]
pub struct RelationshipFilter {
    pub relationship: Arc<Relationship>,
    pub target: Arc<ConcreteEntity>,
    pub quantifier: RelationshipQuantifier,
    /// Predicate applied to the traversed elements. Absent means the
    /// quantifier ranges over the bare pattern.
    pub filter: Option<Box<Filter>>,
}

impl RelationshipFilter {
    pub fn compile(&self, ctx: &Context) -> TranslateResult<CompiledFilter> {
        let parent = ctx.target()?.clone();
        let rel_variable = ctx.env().new_target();
        let node_variable = ctx.env().new_target();

        let pattern = traversal_pattern(
            &parent,
            &self.relationship,
            Some(rel_variable.clone()),
            &self.target,
            Some(node_variable.clone()),
        );

        let child_ctx = ctx
            .with_target(node_variable)
            .with_relationship(rel_variable);

        let inner = match &self.filter {
            Some(filter) => {
                let compiled = filter.compile(&child_ctx)?;
                if !compiled.subqueries.is_empty() {
                    // EXISTS bodies cannot hold CALL subqueries; the
                    // factory rejects such trees before they get here.
                    return Err(TranslateError::structural(
                        "relationship filter predicate requires subqueries",
                    ));
                }
                compiled.predicate
            }
            None => None,
        };

        let exists = |predicate: Option<Expr>| Expr::Exists {
            pattern: pattern.clone(),
            predicate: predicate.map(Box::new),
        };

        let predicate = match self.quantifier {
            RelationshipQuantifier::Some => exists(inner),
            RelationshipQuantifier::None => Expr::not(exists(inner)),
            RelationshipQuantifier::All => {
                let inner = inner.ok_or_else(|| {
                    TranslateError::structural("ALL relationship filter requires a predicate")
                })?;
                // Every element matches: one does, and none fails.
                Expr::and(vec![
                    exists(Some(inner.clone())),
                    Expr::not(exists(Some(Expr::not(inner)))),
                ])
            }
            RelationshipQuantifier::Single => {
                let count = Expr::PatternCount {
                    pattern: pattern.clone(),
                    predicate: inner.map(Box::new),
                };
                Expr::compare(count, Comparison::Equals, Expr::Literal(CypherValue::Int(1)))
            }
        };

        Ok(CompiledFilter::predicate(predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::filters::PropertyFilter;
    use crate::context::{Environment, RequestContext};
    use crate::request::{Attachment, PropertyOperator};
    use graph_schema::{Attribute, Cardinality, Direction, ScalarKind};

    fn person() -> Arc<ConcreteEntity> {
        let mut entity = ConcreteEntity::new("Person", vec!["Person".to_owned()]);
        entity.add_attribute(Attribute::stored("name", ScalarKind::String));
        Arc::new(entity)
    }

    fn actors() -> Arc<Relationship> {
        Arc::new(Relationship::new(
            "actors",
            "ACTED_IN",
            Direction::In,
            "Person",
            Cardinality::Many,
        ))
    }

    fn ctx() -> Context {
        let env = Environment::new();
        let ctx = Context::new(env, RequestContext::default());
        let target = ctx.env().new_target();
        ctx.with_target(target)
    }

    fn rendered(filter: &RelationshipFilter, ctx: &Context) -> String {
        let compiled = filter.compile(ctx).unwrap();
        let mut out = String::new();
        compiled.predicate.unwrap().render(&mut out);
        out
    }

    fn name_filter() -> Box<Filter> {
        Box::new(Filter::Property(PropertyFilter {
            attachment: Attachment::Node,
            attribute: Attribute::stored("name", ScalarKind::String),
            operator: PropertyOperator::Equals,
            value: CypherValue::from("Keanu"),
        }))
    }

    #[test]
    fn some_compiles_to_exists() {
        let filter = RelationshipFilter {
            relationship: actors(),
            target: person(),
            quantifier: RelationshipQuantifier::Some,
            filter: Some(name_filter()),
        };

        assert_eq!(
            rendered(&filter, &ctx()),
            "EXISTS { (this0)<-[this1:ACTED_IN]-(this2:Person) WHERE this2.name = $param0 }"
        );
    }

    #[test]
    fn all_pairs_exists_with_negated_exists() {
        let filter = RelationshipFilter {
            relationship: actors(),
            target: person(),
            quantifier: RelationshipQuantifier::All,
            filter: Some(name_filter()),
        };

        assert_eq!(
            rendered(&filter, &ctx()),
            "(EXISTS { (this0)<-[this1:ACTED_IN]-(this2:Person) WHERE this2.name = $param0 } \
             AND NOT (EXISTS { (this0)<-[this1:ACTED_IN]-(this2:Person) WHERE NOT (this2.name = $param0) }))"
        );
    }

    #[test]
    fn single_compares_a_pattern_count() {
        let filter = RelationshipFilter {
            relationship: actors(),
            target: person(),
            quantifier: RelationshipQuantifier::Single,
            filter: Some(name_filter()),
        };

        assert_eq!(
            rendered(&filter, &ctx()),
            "COUNT { (this0)<-[this1:ACTED_IN]-(this2:Person) WHERE this2.name = $param0 } = 1"
        );
    }
}
