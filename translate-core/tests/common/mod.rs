use std::sync::Arc;

use graph_schema::{
    Attribute, Cardinality, CompositeEntity, CompositeKind, ConcreteEntity, Direction, Entity,
    Relationship, ScalarKind, Schema,
};

/// A small movie graph: two concrete production types implementing a
/// shared interface, people connected through ACTED_IN edges carrying
/// their own properties, and a union without a common attribute space.
pub fn schema() -> Schema {
    let mut schema = Schema::new();

    let mut movie = ConcreteEntity::new("Movie", vec!["Movie".to_owned()]);
    movie.add_attribute(Attribute::stored("title", ScalarKind::String));
    movie.add_attribute(Attribute::stored("year", ScalarKind::Int));
    movie.add_attribute(Attribute::computed(
        "actorCount",
        ScalarKind::Int,
        "size([(this)<-[:ACTED_IN]-(p:Person) | p])",
    ));
    let mut actors = Relationship::new("actors", "ACTED_IN", Direction::In, "Person", Cardinality::Many);
    actors.add_attribute(Attribute::stored("role", ScalarKind::String));
    actors.add_attribute(Attribute::stored("year", ScalarKind::Int));
    movie.add_relationship(actors);
    movie.add_relationship(Relationship::new(
        "director",
        "DIRECTED",
        Direction::In,
        "Person",
        Cardinality::One,
    ));
    schema.add_entity(Entity::Concrete(Arc::new(movie)));

    let mut person = ConcreteEntity::new("Person", vec!["Person".to_owned()]);
    person.add_attribute(Attribute::stored("name", ScalarKind::String));
    person.add_attribute(Attribute::stored("age", ScalarKind::Int));
    let movies = Relationship::new("movies", "ACTED_IN", Direction::Out, "Movie", Cardinality::Many);
    person.add_relationship(movies);
    schema.add_entity(Entity::Concrete(Arc::new(person)));

    let mut series = ConcreteEntity::new("Series", vec!["Series".to_owned()]);
    series.add_attribute(Attribute::stored("title", ScalarKind::String));
    series.add_attribute(Attribute::stored("episodes", ScalarKind::Int));
    schema.add_entity(Entity::Concrete(Arc::new(series)));

    schema.add_entity(Entity::Composite(CompositeEntity::new(
        "Production",
        CompositeKind::Interface,
        vec!["Movie".to_owned(), "Series".to_owned()],
    )));

    schema.add_entity(Entity::Composite(CompositeEntity::new(
        "SearchResult",
        CompositeKind::Union,
        vec!["Movie".to_owned(), "Person".to_owned()],
    )));

    schema
}
