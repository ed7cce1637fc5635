mod common;

use cypher_builder::SortDirection;
use expect_test::expect;
use graph_schema::DomainError;
use pretty_assertions::assert_eq;
use translate_core::request::{
    FieldArgs, FulltextArg, NestedField, PaginationArg, PropertyOperator, Selection, SortArg,
    WhereArg,
};
use translate_core::{compile_read, RequestContext, TranslateError};

fn movie_args() -> FieldArgs {
    FieldArgs {
        selection: Selection::attributes(&["title", "year"]),
        ..FieldArgs::default()
    }
}

#[test]
fn read_with_filter_sort_and_pagination() {
    let schema = common::schema();
    let args = FieldArgs {
        filter: Some(WhereArg::property(
            "year",
            PropertyOperator::GreaterThan,
            serde_json::json!(2000),
        )),
        sort: vec![SortArg::node("title", SortDirection::Ascending)],
        pagination: PaginationArg {
            limit: Some(10),
            offset: Some(5),
        },
        ..movie_args()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        WHERE this0.year > $param0
        WITH *
        ORDER BY this0.title ASC
        SKIP $param1
        LIMIT $param2
        RETURN this0 { .title, .year } AS this0"#]]
    .assert_eq(&compiled.cypher);

    assert_eq!(compiled.projection, "this0");
    assert_eq!(
        compiled.params.keys().collect::<Vec<_>>(),
        ["param0", "param1", "param2"]
    );
}

#[test]
fn compilation_is_deterministic() {
    let schema = common::schema();
    let args = FieldArgs {
        filter: Some(WhereArg::Or(vec![
            WhereArg::property("title", PropertyOperator::StartsWith, serde_json::json!("The ")),
            WhereArg::property("year", PropertyOperator::LessThan, serde_json::json!(1980)),
        ])),
        sort: vec![
            SortArg::node("year", SortDirection::Descending),
            SortArg::node("title", SortDirection::Ascending),
        ],
        ..movie_args()
    };

    let first = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();
    let second = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    assert_eq!(first.cypher, second.cypher);
    assert_eq!(first.params, second.params);
    assert_eq!(first.projection, second.projection);
}

#[test]
fn sort_keys_are_never_reordered() {
    let schema = common::schema();
    let args = FieldArgs {
        sort: vec![
            SortArg::node("year", SortDirection::Descending),
            SortArg::node("title", SortDirection::Ascending),
        ],
        ..movie_args()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();
    assert!(compiled
        .cypher
        .contains("ORDER BY this0.year DESC, this0.title ASC"));
}

#[test]
fn pagination_never_precedes_ordering() {
    let schema = common::schema();
    let args = FieldArgs {
        sort: vec![SortArg::node("title", SortDirection::Ascending)],
        pagination: PaginationArg {
            limit: Some(3),
            offset: None,
        },
        ..movie_args()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();
    let order_at = compiled.cypher.find("ORDER BY").unwrap();
    let limit_at = compiled.cypher.find("LIMIT").unwrap();
    assert!(order_at < limit_at);
}

#[test]
fn skip_and_limit_are_independent() {
    let schema = common::schema();

    let skip_only = FieldArgs {
        pagination: PaginationArg {
            limit: None,
            offset: Some(20),
        },
        ..movie_args()
    };
    let compiled = compile_read(&schema, "Movie", &skip_only, RequestContext::default()).unwrap();
    assert!(compiled.cypher.contains("SKIP $param0"));
    assert!(!compiled.cypher.contains("LIMIT"));

    let limit_only = FieldArgs {
        pagination: PaginationArg {
            limit: Some(20),
            offset: None,
        },
        ..movie_args()
    };
    let compiled = compile_read(&schema, "Movie", &limit_only, RequestContext::default()).unwrap();
    assert!(compiled.cypher.contains("LIMIT $param0"));
    assert!(!compiled.cypher.contains("SKIP"));
}

#[test]
fn nested_selection_compiles_to_a_call_subquery() {
    let schema = common::schema();
    let args = FieldArgs {
        selection: Selection {
            attributes: vec!["title".to_owned()],
            nested: vec![NestedField {
                field: "actors".to_owned(),
                alias: None,
                args: FieldArgs {
                    selection: Selection::attributes(&["name"]),
                    sort: vec![SortArg::node("name", SortDirection::Ascending)],
                    ..FieldArgs::default()
                },
            }],
        },
        ..FieldArgs::default()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        CALL {
            WITH this0
            MATCH (this0)<-[this1:ACTED_IN]-(this2:Person)
            WITH *
            ORDER BY this2.name ASC
            RETURN collect(this2 { .name }) AS var3
        }
        RETURN this0 { .title, actors: var3 } AS this0"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn computed_sort_materializes_before_order_by() {
    let schema = common::schema();
    let args = FieldArgs {
        sort: vec![SortArg::node("actorCount", SortDirection::Descending)],
        selection: Selection::attributes(&["title"]),
        ..FieldArgs::default()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        CALL {
            WITH this0
            RETURN size([(this0)<-[:ACTED_IN]-(p:Person) | p]) AS var1
        }
        WITH *
        ORDER BY var1 DESC
        RETURN this0 { .title } AS this0"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn relationship_filter_compiles_to_an_exists_predicate() {
    let schema = common::schema();
    let args = FieldArgs {
        filter: Some(WhereArg::Relationship {
            field: "actors".to_owned(),
            quantifier: translate_core::request::RelationshipQuantifier::Some,
            filter: Box::new(WhereArg::property(
                "name",
                PropertyOperator::Equals,
                serde_json::json!("Keanu"),
            )),
        }),
        ..movie_args()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        WHERE EXISTS { (this0)<-[this1:ACTED_IN]-(this2:Person) WHERE this2.name = $param0 }
        RETURN this0 { .title, .year } AS this0"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn computed_selection_materializes_through_a_subquery() {
    let schema = common::schema();
    let args = FieldArgs {
        selection: Selection::attributes(&["title", "actorCount"]),
        ..FieldArgs::default()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        CALL {
            WITH this0
            RETURN size([(this0)<-[:ACTED_IN]-(p:Person) | p]) AS var1
        }
        RETURN this0 { .title, actorCount: var1 } AS this0"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn to_one_relationship_collapses_to_a_single_value() {
    let schema = common::schema();
    let args = FieldArgs {
        selection: Selection {
            attributes: vec!["title".to_owned()],
            nested: vec![NestedField {
                field: "director".to_owned(),
                alias: None,
                args: FieldArgs {
                    selection: Selection::attributes(&["name"]),
                    ..FieldArgs::default()
                },
            }],
        },
        ..FieldArgs::default()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        CALL {
            WITH this0
            MATCH (this0)<-[this1:DIRECTED]-(this2:Person)
            RETURN head(collect(this2 { .name })) AS var3
        }
        RETURN this0 { .title, director: var3 } AS this0"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn aggregation_filter_subquery_precedes_the_guard() {
    let schema = common::schema();
    let args = FieldArgs {
        filter: Some(WhereArg::Aggregation {
            field: "actors".to_owned(),
            predicates: vec![
                translate_core::request::AggregationArg::Count {
                    operator: PropertyOperator::GreaterThan,
                    value: 2,
                },
                translate_core::request::AggregationArg::Property {
                    attachment: translate_core::request::Attachment::Node,
                    field: "age".to_owned(),
                    aggregation: translate_core::request::AggregationOperator::Average,
                    operator: PropertyOperator::GreaterThanOrEqual,
                    value: serde_json::json!(40),
                },
            ],
        }),
        selection: Selection::attributes(&["title"]),
        ..FieldArgs::default()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        MATCH (this0:Movie)
        CALL {
            WITH this0
            MATCH (this0)<-[this1:ACTED_IN]-(this2:Person)
            RETURN (count(this2) > $param0 AND avg(this2.age) >= $param1) AS var3
        }
        WITH *
        WHERE var3 = true
        RETURN this0 { .title } AS this0"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn empty_logical_groups_compile_to_identities() {
    let schema = common::schema();

    let and_args = FieldArgs {
        filter: Some(WhereArg::And(vec![])),
        ..movie_args()
    };
    let compiled = compile_read(&schema, "Movie", &and_args, RequestContext::default()).unwrap();
    assert!(compiled.cypher.contains("WHERE true"));

    let or_args = FieldArgs {
        filter: Some(WhereArg::Or(vec![])),
        ..movie_args()
    };
    let compiled = compile_read(&schema, "Movie", &or_args, RequestContext::default()).unwrap();
    assert!(compiled.cypher.contains("WHERE false"));
}

#[test]
fn unknown_sort_field_is_rejected() {
    let schema = common::schema();
    let args = FieldArgs {
        sort: vec![SortArg::node("imdbRating", SortDirection::Ascending)],
        ..movie_args()
    };

    let err = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap_err();
    match err {
        TranslateError::Domain(DomainError::UnknownAttribute { attribute, entity }) => {
            assert_eq!(attribute, "imdbRating");
            assert_eq!(entity, "Movie");
        }
        other => panic!("expected an unknown-attribute error, got {other:?}"),
    }
}

#[test]
fn fulltext_read_binds_a_score_for_sorting() {
    let schema = common::schema();
    let args = FieldArgs {
        fulltext: Some(FulltextArg {
            index: "MovieTitle".to_owned(),
            phrase: "matrix".to_owned(),
        }),
        sort: vec![SortArg::node("score", SortDirection::Descending)],
        selection: Selection::attributes(&["title"]),
        ..FieldArgs::default()
    };

    let compiled = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap();

    expect![[r#"
        CALL db.index.fulltext.queryNodes($param0, $param1) YIELD node AS this1, score AS var0
        WITH *
        ORDER BY var0 DESC
        RETURN this1 { .title } AS this1"#]]
    .assert_eq(&compiled.cypher);
}

#[test]
fn score_sort_without_fulltext_is_an_ordinary_lookup() {
    let schema = common::schema();
    let args = FieldArgs {
        sort: vec![SortArg::node("score", SortDirection::Descending)],
        ..movie_args()
    };

    // Movie has no `score` attribute, so the pseudo-field falls through
    // to a failing attribute lookup.
    let err = compile_read(&schema, "Movie", &args, RequestContext::default()).unwrap_err();
    assert!(matches!(
        err,
        TranslateError::Domain(DomainError::UnknownAttribute { .. })
    ));
}

#[test]
fn auth_claims_are_forwarded_verbatim() {
    let schema = common::schema();
    let request = RequestContext {
        auth: Some(serde_json::json!({ "sub": "user-1" })),
        ..RequestContext::default()
    };

    let compiled = compile_read(&schema, "Movie", &movie_args(), request).unwrap();
    assert!(compiled.params.contains_key("auth"));
}
