use indexmap::IndexMap;

use crate::{Attribute, DomainError, DomainResult};

/// Direction of a relationship as seen from its owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A typed, directed edge between two entities. May carry its own
/// attributes (edge properties).
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Field name on the owning entity.
    pub name: String,
    /// Cypher relationship type.
    pub rel_type: String,
    pub direction: Direction,
    /// Name of the target entity; resolved against the schema at
    /// tree-construction time.
    pub target: String,
    pub cardinality: Cardinality,
    attributes: IndexMap<String, Attribute>,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        rel_type: impl Into<String>,
        direction: Direction,
        target: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            rel_type: rel_type.into(),
            direction,
            target: target.into(),
            cardinality,
            attributes: IndexMap::new(),
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn attribute(&self, name: &str) -> DomainResult<&Attribute> {
        self.attributes.get(name).ok_or_else(|| DomainError::UnknownAttribute {
            attribute: name.to_owned(),
            entity: self.name.clone(),
        })
    }

    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn is_to_one(&self) -> bool {
        self.cardinality == Cardinality::One
    }
}
