//! Filter nodes: predicates and predicate-producing subqueries.

mod aggregation;
mod count;
mod logical;
mod property;
mod relationship;

pub use aggregation::{AggregationFilter, AggregationPredicate};
pub use count::CountFilter;
pub use logical::{LogicalFilter, LogicalOperator};
pub use property::PropertyFilter;
pub use relationship::RelationshipFilter;

use std::sync::Arc;

use cypher_builder::{Clause, Comparison, Expr};
use graph_schema::Relationship;

use crate::ast::QueryAstNode;
use crate::request::PropertyOperator;
use crate::{Context, TranslateResult};

/// A compiled filter: subqueries to run before the guard, and the
/// predicate to place in it. Subqueries always precede the first
/// reference to the predicate. A filter may compile to nothing (an
/// aggregation with zero resolved predicates).
#[derive(Debug, Default)]
pub struct CompiledFilter {
    pub subqueries: Vec<Clause>,
    pub predicate: Option<Expr>,
}

impl CompiledFilter {
    pub fn predicate(predicate: Expr) -> Self {
        Self {
            subqueries: Vec::new(),
            predicate: Some(predicate),
        }
    }
}

/// One node of the filter tree.
#[derive(Debug)]
pub enum Filter {
    Property(PropertyFilter),
    Logical(LogicalFilter),
    Relationship(RelationshipFilter),
    Aggregation(AggregationFilter),
    Count(CountFilter),
}

impl Filter {
    pub fn compile(&self, ctx: &Context) -> TranslateResult<CompiledFilter> {
        match self {
            Filter::Property(f) => f.compile(ctx),
            Filter::Logical(f) => f.compile(ctx),
            Filter::Relationship(f) => f.compile(ctx),
            Filter::Aggregation(f) => f.compile(ctx),
            Filter::Count(f) => f.compile(ctx),
        }
    }

    /// Whether this subtree contains an aggregation filter. Aggregations
    /// need their own subquery and cannot be nested inside `EXISTS`
    /// predicates.
    pub fn contains_aggregation(&self) -> bool {
        match self {
            Filter::Aggregation(_) => true,
            Filter::Logical(f) => f.children.iter().any(Filter::contains_aggregation),
            Filter::Relationship(f) => f
                .filter
                .as_deref()
                .is_some_and(Filter::contains_aggregation),
            Filter::Property(_) | Filter::Count(_) => false,
        }
    }
}

impl QueryAstNode for Filter {
    fn children(&self) -> Vec<&dyn QueryAstNode> {
        match self {
            Filter::Property(_) | Filter::Count(_) => Vec::new(),
            Filter::Logical(f) => f.children.iter().map(|c| c as &dyn QueryAstNode).collect(),
            Filter::Relationship(f) => match &f.filter {
                Some(nested) => vec![nested.as_ref() as &dyn QueryAstNode],
                None => Vec::new(),
            },
            Filter::Aggregation(f) => f
                .predicates
                .iter()
                .map(|p| p as &dyn QueryAstNode)
                .collect(),
        }
    }

    fn owned_relationship(&self) -> Option<&Arc<Relationship>> {
        match self {
            Filter::Property(_) | Filter::Logical(_) => None,
            Filter::Relationship(f) => Some(&f.relationship),
            Filter::Aggregation(f) => Some(&f.relationship),
            Filter::Count(f) => Some(&f.relationship),
        }
    }
}

/// AND-combines a list of filters: subqueries concatenate in caller
/// order, resolved predicates combine with the AND identity laws.
pub fn compile_all(filters: &[Filter], ctx: &Context) -> TranslateResult<CompiledFilter> {
    let mut subqueries = Vec::new();
    let mut predicates = Vec::new();

    for filter in filters {
        let compiled = filter.compile(ctx)?;
        subqueries.extend(compiled.subqueries);
        predicates.extend(compiled.predicate);
    }

    let predicate = if predicates.is_empty() {
        None
    } else {
        Some(Expr::and(predicates))
    };

    Ok(CompiledFilter {
        subqueries,
        predicate,
    })
}

pub(crate) fn comparison_for(operator: PropertyOperator) -> Comparison {
    match operator {
        PropertyOperator::Equals => Comparison::Equals,
        PropertyOperator::NotEquals => Comparison::NotEquals,
        PropertyOperator::In => Comparison::In,
        PropertyOperator::LessThan => Comparison::LessThan,
        PropertyOperator::LessThanOrEqual => Comparison::LessThanOrEqual,
        PropertyOperator::GreaterThan => Comparison::GreaterThan,
        PropertyOperator::GreaterThanOrEqual => Comparison::GreaterThanOrEqual,
        PropertyOperator::Contains => Comparison::Contains,
        PropertyOperator::StartsWith => Comparison::StartsWith,
        PropertyOperator::EndsWith => Comparison::EndsWith,
    }
}
