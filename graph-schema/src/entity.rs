use std::sync::Arc;

use indexmap::IndexMap;

use crate::{Attribute, DomainError, DomainResult, Relationship};

/// A schema-level type. Either a concrete node type or a composite
/// (union/interface) over concrete member types.
#[derive(Debug, Clone)]
pub enum Entity {
    Concrete(Arc<ConcreteEntity>),
    Composite(CompositeEntity),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Concrete(ce) => &ce.name,
            Entity::Composite(ce) => &ce.name,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Entity::Composite(_))
    }
}

/// A node type with labels, attributes and outgoing/incoming relationships.
#[derive(Debug, Clone)]
pub struct ConcreteEntity {
    pub name: String,
    /// Cypher labels applied to nodes of this type, in declaration order.
    pub labels: Vec<String>,
    attributes: IndexMap<String, Attribute>,
    relationships: IndexMap<String, Relationship>,
}

impl ConcreteEntity {
    pub fn new(name: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            labels,
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships
            .insert(relationship.name.clone(), relationship);
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

    pub fn relationship(&self, name: &str) -> DomainResult<&Relationship> {
        self.relationships
            .get(name)
            .ok_or_else(|| DomainError::UnknownRelationship {
                relationship: name.to_owned(),
                entity: self.name.clone(),
            })
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }
}

/// Marker distinguishing unions from interfaces. Interfaces share a common
/// attribute space across members, unions do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Union,
    Interface,
}

/// A union or interface type over concrete members. Member order is
/// declaration order and drives the order of union partials in generated
/// programs.
#[derive(Debug, Clone)]
pub struct CompositeEntity {
    pub name: String,
    pub kind: CompositeKind,
    members: Vec<String>,
}

impl CompositeEntity {
    pub fn new(name: impl Into<String>, kind: CompositeKind, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            members,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}
