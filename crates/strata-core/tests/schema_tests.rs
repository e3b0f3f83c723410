//! Schema snapshots, runtime definitions and search extraction

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use serde_json::json;
use strata_core::{
    FrameworkError, PropertyDefinition, PropertyKey, SchemaIntrospector, SearchAttribute,
    SearchOperator, Session, ValueType, ALL_VIEW,
};
use strata_graph::NodeId;
use strata_test_utils::{seeded_session, values, ALICE, BOB};

fn matching(session: &Session, type_name: &str, params: &[(&str, &str)], loose: bool) -> Vec<String> {
    let attributes =
        SearchAttribute::extract(session, type_name, params.iter().copied(), loose).unwrap();
    let mut ids: Vec<String> = session
        .entities_of_type(type_name)
        .into_iter()
        .filter(|e| SearchAttribute::matches_all(&attributes, session, e))
        .map(|e| e.id().as_str().to_string())
        .collect();
    ids.sort();
    ids
}

#[test]
fn dynamic_property_appears_in_every_view() {
    let session = seeded_session();
    let introspector = SchemaIntrospector::default();
    let before = introspector.snapshot(&session, "Person").unwrap();
    assert!(!before.views["public"].contains_key("nickname"));

    session
        .registry()
        .define_property("Person", PropertyDefinition::new("nickname", ValueType::String))
        .unwrap();

    let after = introspector.snapshot(&session, "Person").unwrap();
    for view in ["public", "ui", ALL_VIEW] {
        let nickname = &after.views[view]["nickname"];
        assert!(!nickname.system);
        assert!(!nickname.read_only);
        assert_eq!(nickname.value_type, "String");
        assert_eq!(nickname.declaring_class, "Person");
    }

    let bob = session.entity(&NodeId::from(BOB)).unwrap();
    session
        .set_properties(&bob, &values(json!({ "nickname": "Bobby" })))
        .unwrap();
    assert_eq!(session.read_view(&bob, "public").unwrap()["nickname"], json!("Bobby"));

    session.registry().remove_definition("Person", "nickname").unwrap();
    let removed = introspector.snapshot(&session, "Person").unwrap();
    assert!(!removed.views[ALL_VIEW].contains_key("nickname"));
    assert!(!session.read_view(&bob, "public").unwrap().contains_key("nickname"));
}

#[test]
fn scoped_dynamic_property_stays_in_its_views() {
    let session = seeded_session();
    session
        .registry()
        .define_property(
            "File",
            PropertyDefinition::new("checksum", ValueType::String).in_views(["ui"]),
        )
        .unwrap();

    let schema = SchemaIntrospector::default().snapshot(&session, "File").unwrap();
    assert!(schema.views["ui"].contains_key("checksum"));
    assert!(schema.views[ALL_VIEW].contains_key("checksum"));
    assert!(!schema.views["public"].contains_key("checksum"));
}

#[test]
fn static_names_cannot_be_redefined() {
    let session = seeded_session();
    let err = session
        .registry()
        .define_property("Person", PropertyDefinition::new("age", ValueType::String))
        .unwrap_err();
    assert!(err.to_string().contains("statically declared"));
}

#[test]
fn schema_wire_format() {
    let session = seeded_session();
    let schema = SchemaIntrospector::default().snapshot(&session, "Person").unwrap();
    assert_eq!(schema.url, "/people");

    let wire = serde_json::to_value(&schema).unwrap();
    let owns = &wire["views"]["public"]["owns"];
    assert_eq!(owns["className"], json!("CollectionProperty"));
    assert_eq!(owns["relatedType"], json!("File"));
    assert_eq!(owns["isCollection"], json!(true));
    assert_eq!(wire["views"]["ui"]["birthday"]["databaseConverter"], json!("DateConverter"));
    assert_eq!(wire["views"]["public"]["id"]["system"], json!(true));

    let views: Vec<&String> = schema.views.keys().collect();
    assert_eq!(views, ["all", "public", "ui"]);
}

#[test]
fn unknown_type_schema_fails() {
    let session = seeded_session();
    let err = SchemaIntrospector::default()
        .snapshot(&session, "Planet")
        .unwrap_err();
    assert!(matches!(err, FrameworkError::UnknownType(_)));
    assert_eq!(err.status(), 404);
}

#[test]
fn search_ranges_and_equality() {
    let session = seeded_session();
    assert_eq!(matching(&session, "Person", &[("age", "[40 TO 50]")], false), [BOB]);
    assert_eq!(matching(&session, "Person", &[("age", "[* TO 40]")], false), [ALICE]);
    assert_eq!(matching(&session, "Person", &[("age", "30")], false), [ALICE]);
    assert_eq!(matching(&session, "File", &[("size", "[15 TO *]")], false), ["f2", "f3"]);
    assert_eq!(
        matching(
            &session,
            "Person",
            &[("birthday", "[2013-01-01T00:00:00Z TO 2013-12-31T00:00:00Z]")],
            false
        ),
        [ALICE]
    );
}

#[test]
fn date_equality_ignores_offset_spelling() {
    let session = seeded_session();
    for needle in [
        "2013-05-01T12:30:00Z",
        "2013-05-01T14:30:00+02:00",
        "2013-05-01T12:30:00.000Z",
    ] {
        assert_eq!(matching(&session, "Person", &[("birthday", needle)], false), [ALICE], "{needle}");
    }
    assert!(matching(&session, "Person", &[("birthday", "2013-05-01T12:30:01Z")], false).is_empty());

    let err = SearchAttribute::extract(&session, "Person", [("birthday", "yesterday")], false)
        .unwrap_err();
    assert_eq!(err.validation_errors().len(), 1);
}

#[test]
fn search_loose_and_reserved() {
    let session = seeded_session();
    assert_eq!(matching(&session, "File", &[("name", "TXT")], true), ["f1", "f2", "f3"]);
    assert!(matching(&session, "File", &[("name", "TXT")], false).is_empty());
    assert_eq!(
        matching(
            &session,
            "Person",
            &[("sort", "name"), ("pageSize", "1"), ("shoeSize", "9")],
            false
        ),
        [ALICE, BOB]
    );
    // collections are not searchable
    assert_eq!(matching(&session, "Person", &[("owns", "f3")], false), [ALICE, BOB]);
}

#[test]
fn search_entity_values_match_projection() {
    let session = seeded_session();
    assert_eq!(matching(&session, "Person", &[("employer", "Acme")], false), [ALICE]);
    assert_eq!(matching(&session, "File", &[("owner", BOB)], false), ["f3"]);
}

#[test]
fn search_collects_conversion_errors() {
    let session = seeded_session();
    let params = [("age", "old"), ("size", "[1 TO 2]"), ("email", "[a TO b]")];
    let err = SearchAttribute::extract(&session, "Person", params, false).unwrap_err();
    // size is not a Person property, so only age and email fail
    assert_eq!(err.validation_errors().len(), 2);

    let attributes =
        SearchAttribute::extract(&session, "Person", [("age", "[1 TO *]")], false).unwrap();
    assert_eq!(attributes[0].key().external_name(), "age");
    assert_eq!(
        attributes[0].operator(),
        &SearchOperator::Range {
            from: Some(json!(1)),
            to: None
        }
    );
}

#[test]
fn concurrent_readers_see_consistent_snapshots() {
    let session = seeded_session();
    let registry = session.registry();
    let introspector = SchemaIntrospector::default();

    (0..64).into_par_iter().for_each(|i| {
        if i % 8 == 0 {
            registry
                .define_property(
                    "Company",
                    PropertyDefinition::new(format!("extra{i}"), ValueType::Integer),
                )
                .unwrap();
        } else {
            let snapshot = registry.snapshot();
            let all = snapshot.properties_for("Company", ALL_VIEW).unwrap();
            let public = snapshot.properties_for("Company", "public").unwrap();
            assert!(public.len() <= all.len());
            let schema = introspector.snapshot(&session, "Company").unwrap();
            assert_eq!(schema.views["public"].len(), schema.views["ui"].len());
        }
    });

    let all = registry.properties_for("Company", ALL_VIEW).unwrap();
    let extras = all
        .iter()
        .filter(|k| k.external_name().starts_with("extra"))
        .count();
    assert_eq!(extras, 8);
}
