//! Typed request IR handed to the factory.
//!
//! The external validator has already checked the request against the
//! generated API schema; what arrives here is structurally sound but may
//! still name attributes or relationships the schema model does not have,
//! which the factory rejects as request errors. Operators are closed
//! enums: an unknown operator cannot be represented, so there is no
//! silent fallthrough path.

use cypher_builder::SortDirection;
use indexmap::IndexMap;

/// Whether a filter or sort addresses the matched node or the traversed
/// relationship (edge properties on connections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    Node,
    Edge,
}

/// Comparison operators accepted on property filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyOperator {
    Equals,
    NotEquals,
    In,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

/// Quantifiers for filters over to-many relationship traversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipQuantifier {
    /// At least one related element matches.
    Some,
    /// No related element matches.
    None,
    /// Every related element matches.
    All,
    /// Exactly one related element matches.
    Single,
}

/// Aggregating functions over related-node or edge attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationOperator {
    Average,
    Sum,
    Min,
    Max,
}

/// One requested sort key.
#[derive(Debug, Clone)]
pub struct SortArg {
    pub attachment: Attachment,
    pub field: String,
    pub direction: SortDirection,
}

impl SortArg {
    pub fn node(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            attachment: Attachment::Node,
            field: field.into(),
            direction,
        }
    }

    pub fn edge(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            attachment: Attachment::Edge,
            field: field.into(),
            direction,
        }
    }
}

/// `options { limit, offset }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationArg {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// The `where` predicate tree.
#[derive(Debug, Clone)]
pub enum WhereArg {
    And(Vec<WhereArg>),
    Or(Vec<WhereArg>),
    Not(Box<WhereArg>),
    Property {
        attachment: Attachment,
        field: String,
        operator: PropertyOperator,
        value: serde_json::Value,
    },
    /// Quantified predicate over a to-many relationship.
    Relationship {
        field: String,
        quantifier: RelationshipQuantifier,
        filter: Box<WhereArg>,
    },
    /// Cardinality comparison of a relationship pattern.
    RelationshipCount {
        field: String,
        operator: PropertyOperator,
        count: i64,
    },
    /// Aggregated predicate over a relationship's related elements.
    Aggregation {
        field: String,
        predicates: Vec<AggregationArg>,
    },
}

impl WhereArg {
    pub fn property(
        field: impl Into<String>,
        operator: PropertyOperator,
        value: serde_json::Value,
    ) -> Self {
        WhereArg::Property {
            attachment: Attachment::Node,
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn edge_property(
        field: impl Into<String>,
        operator: PropertyOperator,
        value: serde_json::Value,
    ) -> Self {
        WhereArg::Property {
            attachment: Attachment::Edge,
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Predicates inside an aggregation filter.
#[derive(Debug, Clone)]
pub enum AggregationArg {
    And(Vec<AggregationArg>),
    Or(Vec<AggregationArg>),
    Not(Box<AggregationArg>),
    /// Compares the number of related elements.
    Count { operator: PropertyOperator, value: i64 },
    /// Compares an aggregate over one attribute of the related elements.
    Property {
        attachment: Attachment,
        field: String,
        aggregation: AggregationOperator,
        operator: PropertyOperator,
        value: serde_json::Value,
    },
}

/// The selected sub-fields of a read.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Attribute names, in request order.
    pub attributes: Vec<String>,
    /// Relationship fields with their own nested arguments.
    pub nested: Vec<NestedField>,
}

impl Selection {
    pub fn attributes(attributes: &[&str]) -> Self {
        Self {
            attributes: attributes.iter().map(|a| (*a).to_owned()).collect(),
            nested: Vec::new(),
        }
    }
}

/// A nested relationship selection.
#[derive(Debug, Clone)]
pub struct NestedField {
    /// Relationship field name on the parent entity.
    pub field: String,
    /// Response alias; defaults to the field name.
    pub alias: Option<String>,
    pub args: FieldArgs,
}

impl NestedField {
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }
}

/// Full-text search arguments on a root read field.
#[derive(Debug, Clone)]
pub struct FulltextArg {
    /// Name of the full-text index to query.
    pub index: String,
    pub phrase: String,
}

/// Arguments of one plain read field.
#[derive(Debug, Clone, Default)]
pub struct FieldArgs {
    pub filter: Option<WhereArg>,
    pub sort: Vec<SortArg>,
    pub pagination: PaginationArg,
    pub selection: Selection,
    pub fulltext: Option<FulltextArg>,
}

/// Arguments of one connection field.
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub filter: Option<WhereArg>,
    pub sort: Vec<SortArg>,
    pub pagination: PaginationArg,
    pub node_selection: Selection,
    /// Edge properties to project into each edge.
    pub edge_attributes: Vec<String>,
    /// Per-concrete-type narrowing for union/interface fields, keyed by
    /// member entity name.
    pub member_filters: IndexMap<String, WhereArg>,
    /// Per-concrete-type node selections (inline fragments). A member
    /// listed here selects these fields instead of `node_selection`.
    pub member_selections: IndexMap<String, Selection>,
}
