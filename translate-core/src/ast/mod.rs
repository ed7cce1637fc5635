//! The query AST: filters, sorts, pagination and operations.
//!
//! Nodes are owned exclusively by their parent and expose their children
//! for whole-tree traversal via [`QueryAstNode`]. Transpilation is a
//! bottom-up pass: each node consults the [`Context`](crate::Context) for
//! its bindings and returns clause fragments plus a result expression.

pub mod filters;
pub mod operations;
pub mod pagination;
pub mod sort;

use std::sync::Arc;

use cypher_builder::{Clause, Expr, NodePattern, Pattern, PatternDirection, RelationshipPattern, Variable};
use graph_schema::{ConcreteEntity, Direction, Relationship};
use itertools::Itertools;

/// Capability shared by every AST node: ordered child traversal.
pub trait QueryAstNode {
    fn children(&self) -> Vec<&dyn QueryAstNode>;

    /// The relationship this node traverses directly, if any. Used to
    /// collect the dependency set of a whole tree.
    fn owned_relationship(&self) -> Option<&Arc<Relationship>> {
        None
    }
}

/// Depth-first pre-order walk over a node and all descendants.
pub fn walk<'a>(root: &'a dyn QueryAstNode, visit: &mut dyn FnMut(&'a dyn QueryAstNode)) {
    visit(root);
    for child in root.children() {
        walk(child, visit);
    }
}

/// Every relationship type touched anywhere under `root`, deduplicated,
/// in traversal order. The change-feed engine uses this set to decide
/// which events can invalidate a compiled field.
pub fn relationship_dependencies(root: &dyn QueryAstNode) -> Vec<String> {
    let mut types = Vec::new();
    walk(root, &mut |node| {
        if let Some(relationship) = node.owned_relationship() {
            types.push(relationship.rel_type.clone());
        }
    });
    types.into_iter().unique().collect()
}

/// Output of transpiling one operation: the clause fragment and the
/// expression holding the operation's projected result.
#[derive(Debug)]
pub struct TranspileResult {
    pub clauses: Vec<Clause>,
    pub projection: Expr,
}

/// Builds the traversal pattern from a bound parent through `relationship`
/// to a freshly named node of the target entity.
pub(crate) fn traversal_pattern(
    parent: &Variable,
    relationship: &Relationship,
    rel_variable: Option<Variable>,
    target: &ConcreteEntity,
    node_variable: Option<Variable>,
) -> Pattern {
    let direction = match relationship.direction {
        Direction::Out => PatternDirection::Outgoing,
        Direction::In => PatternDirection::Incoming,
    };

    let rel_pattern = match rel_variable {
        Some(variable) => RelationshipPattern::new(variable, relationship.rel_type.clone(), direction),
        None => RelationshipPattern::anonymous(relationship.rel_type.clone(), direction),
    };
    let node_pattern = match node_variable {
        Some(variable) => NodePattern::new(variable, target.labels.clone()),
        None => NodePattern::anonymous(target.labels.clone()),
    };

    Pattern::node(NodePattern::new(parent.clone(), Vec::new())).step(rel_pattern, node_pattern)
}

/// Substitutes the `this` placeholder of a computed-attribute expression
/// with the variable currently bound to the node. Only whole identifiers
/// are replaced; `this.title` becomes `this0.title`, `something` stays.
pub(crate) fn substitute_this(template: &str, variable: &Variable) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < bytes.len() {
        if template[i..].starts_with("this") {
            let before_ok = i == 0 || !is_ident_char(bytes[i - 1]);
            let after = i + 4;
            let after_ok = after >= bytes.len() || !is_ident_char(bytes[after]);

            if before_ok && after_ok {
                out.push_str(variable.name());
                i = after;
                continue;
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

fn is_ident_char(byte: u8) -> bool {
    byte == b'_' || byte.is_ascii_alphanumeric()
}
