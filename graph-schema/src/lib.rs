//! Read-only schema model consumed by the translation engine.
//!
//! A [`Schema`] is built once per process from the augmented type
//! definitions and shared by every compilation. Nothing in this crate is
//! mutated after construction; the translation layer only ever walks it.

mod attribute;
mod entity;
mod error;
mod relationship;

pub use attribute::{Attribute, ScalarKind};
pub use entity::{CompositeEntity, CompositeKind, ConcreteEntity, Entity};
pub use error::DomainError;
pub use relationship::{Cardinality, Direction, Relationship};

use std::sync::Arc;

use indexmap::IndexMap;

pub type DomainResult<T> = Result<T, DomainError>;

/// The full entity space, keyed by entity name in declaration order.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    entities: IndexMap<String, Arc<Entity>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.name().to_owned(), Arc::new(entity));
    }

    pub fn entity(&self, name: &str) -> DomainResult<&Arc<Entity>> {
        self.entities
            .get(name)
            .ok_or_else(|| DomainError::UnknownEntity(name.to_owned()))
    }

    /// Resolves `name` to a concrete entity, rejecting composites.
    pub fn concrete(&self, name: &str) -> DomainResult<&Arc<ConcreteEntity>> {
        match self.entity(name)?.as_ref() {
            Entity::Concrete(ce) => Ok(ce),
            Entity::Composite(_) => Err(DomainError::NotConcrete(name.to_owned())),
        }
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn movie() -> ConcreteEntity {
        let mut entity = ConcreteEntity::new("Movie", vec!["Movie".to_owned()]);
        entity.add_attribute(Attribute::stored("title", ScalarKind::String));
        entity.add_attribute(Attribute::stored("year", ScalarKind::Int));
        entity
    }

    #[test]
    fn entity_lookup_is_by_name() {
        let mut schema = Schema::new();
        schema.add_entity(Entity::Concrete(Arc::new(movie())));

        assert!(schema.concrete("Movie").is_ok());
        assert!(matches!(
            schema.entity("Person"),
            Err(DomainError::UnknownEntity(_))
        ));
    }

    #[test]
    fn composite_members_keep_declaration_order() {
        let composite = CompositeEntity::new(
            "Production",
            CompositeKind::Interface,
            vec!["Movie".to_owned(), "Series".to_owned()],
        );

        assert_eq!(composite.members(), ["Movie", "Series"]);
    }
}
