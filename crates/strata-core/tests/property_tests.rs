//! Property-based checks over keys, converters, notions and views

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use strata_core::{
    DateConverter, EntityType, IdNotion, Notion, ObjectNotion, Property, PropertyDefinition,
    PropertyKey, PropertyNotion, PropertyRef, ValueType, ViewRegistry, ALL_VIEW,
};
use strata_graph::{GraphStore, NodeId};
use strata_test_utils::{ids, seeded_session, values, ALICE};

fn scalar(name: &str, kind: u8) -> PropertyRef {
    match kind % 4 {
        0 => Property::string(name).into_ref(),
        1 => Property::integer(name).into_ref(),
        2 => Property::boolean(name).into_ref(),
        _ => Property::date(name).into_ref(),
    }
}

proptest! {
    #[test]
    fn prop_external_names_unique_per_view(
        declared in proptest::collection::vec(("[a-e]", 0u8..4, 0usize..3), 0..24),
        dynamic in proptest::collection::vec("[c-h]", 0..6),
    ) {
        let registry = ViewRegistry::new();
        let views = ["public", "ui", "custom"];
        let mut parent = EntityType::new("Parent");
        let mut child = EntityType::new("Child").extends("Parent");
        for (i, (name, kind, view)) in declared.iter().enumerate() {
            if i % 2 == 0 {
                parent = parent.view(views[*view], [scalar(name, *kind)]);
            } else {
                child = child.view(views[*view], [scalar(name, *kind)]);
            }
        }
        registry.register(parent).unwrap();
        registry.register(child).unwrap();
        for name in &dynamic {
            // clashes with static names are rejected, others join every view
            let _ = registry.define_property("Child", PropertyDefinition::new(name.as_str(), ValueType::String));
        }

        for view in registry.views_for("Child").unwrap() {
            let keys = registry.properties_for("Child", &view).unwrap();
            let mut seen = HashSet::new();
            for key in &keys {
                prop_assert!(seen.insert(key.external_name().to_string()), "duplicate {} in {}", key.external_name(), view);
            }
        }
    }

    #[test]
    fn prop_integer_conversion_idempotent(n in any::<i32>(), as_text in any::<bool>()) {
        let key = Property::integer("n");
        let conv = key.input_converter().unwrap();
        let input = if as_text { json!(n.to_string()) } else { json!(n) };
        let once = conv.revert(conv.convert(input).unwrap()).unwrap();
        let twice = conv.revert(conv.convert(once.clone()).unwrap()).unwrap();
        prop_assert_eq!(&once, &json!(n));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_boolean_conversion_idempotent(b in any::<bool>(), form in 0u8..3) {
        let key = Property::boolean("b");
        let conv = key.input_converter().unwrap();
        let input = match form {
            0 => json!(b),
            1 => json!(b.to_string()),
            _ => json!(if b { "1" } else { "0" }),
        };
        let once = conv.revert(conv.convert(input).unwrap()).unwrap();
        let twice = conv.revert(conv.convert(once.clone()).unwrap()).unwrap();
        prop_assert_eq!(&once, &json!(b));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_date_storage_roundtrip(millis in 0i64..4_102_444_800_000) {
        let key = Property::date("d");
        let conv = key.database_converter().unwrap();
        let memory = conv.revert(json!(millis)).unwrap();
        prop_assert_eq!(conv.convert(memory.clone()).unwrap(), json!(millis));
        prop_assert_eq!(DateConverter::parse_millis(memory.as_str().unwrap()), Some(millis));
    }

    #[test]
    fn prop_scalar_write_read_stable(age in 0i32..150, name in "[A-Za-z ]{1,12}") {
        let session = seeded_session();
        let alice = session.entity(&NodeId::from(ALICE)).unwrap();
        session
            .set_properties(&alice, &values(json!({ "age": age.to_string(), "name": name })))
            .unwrap();
        let first = session.read_view(&alice, "public").unwrap();
        session
            .set_properties(&alice, &values(json!({ "age": first["age"], "name": first["name"] })))
            .unwrap();
        let second = session.read_view(&alice, "public").unwrap();
        prop_assert_eq!(&first["age"], &json!(age));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_collection_replace_exact(
        before in proptest::collection::vec(0usize..3, 0..4),
        after in proptest::collection::vec(0usize..3, 0..4),
    ) {
        let files = ["f1", "f2", "f3"];
        let session = seeded_session();
        let alice = session.entity(&NodeId::from(ALICE)).unwrap();

        let set = |picks: &[usize]| {
            let targets: Vec<Value> = picks.iter().map(|i| json!(files[*i])).collect();
            session
                .set_properties(&alice, &values(json!({ "owns": targets })))
                .unwrap();
        };
        set(&before);
        set(&after);

        let expected: BTreeSet<String> = after.iter().map(|i| files[*i].to_string()).collect();
        let actual: BTreeSet<String> = ids(&session.get(&alice, "owns").unwrap()).into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_notion_roundtrip(pick in 0usize..7, notion_kind in 0u8..3) {
        let session = seeded_session();
        let nodes = session.entities_of_type("AbstractNode");
        let entity = &nodes[pick % nodes.len()];

        let name_key = session.registry().property("AbstractNode", "name").unwrap();
        let notion: Arc<dyn Notion> = match notion_kind {
            0 => Arc::new(IdNotion),
            1 => Arc::new(ObjectNotion),
            _ => Arc::new(PropertyNotion::new(name_key)),
        };
        let projected = notion.project(&session, entity);
        let resolved = notion.resolve(&session, entity.type_name(), &projected).unwrap();
        prop_assert_eq!(&resolved.entity, entity);
        prop_assert!(resolved.pending.is_empty());
    }
}

#[test]
fn property_notion_creates_missing_target() {
    let session = seeded_session();
    let name_key = session.registry().property("Company", "name").unwrap();
    let notion = PropertyNotion::new(name_key).create_if_missing();

    let resolved = notion.resolve(&session, "Company", &json!("Initech")).unwrap();
    assert_eq!(resolved.entity.type_name(), "Company");
    assert_eq!(resolved.pending.len(), 2);
    assert!(session.store().node(resolved.entity.id()).is_none());

    session.store().apply(resolved.pending).unwrap();
    let created = session.entity(resolved.entity.id()).unwrap();
    assert_eq!(session.get(&created, "name").unwrap(), json!("Initech"));
}

#[test]
fn property_notion_ambiguous_values() {
    let session = seeded_session();
    let key = session.registry().property("File", "size").unwrap();
    let f1 = session.entity(&NodeId::from("f1")).unwrap();
    session
        .set_properties(&f1, &values(json!({ "size": 20 })))
        .unwrap();

    let notion = PropertyNotion::new(key);
    let err = notion.resolve(&session, "File", &json!(20)).unwrap_err();
    assert!(err.to_string().contains("2 File entities"));
    assert!(notion.resolve(&session, "File", &Value::Null).is_err());
}

#[test]
fn every_view_contains_all_view_members() {
    let session = seeded_session();
    let registry = session.registry();
    for type_name in registry.type_names() {
        let all: HashSet<String> = registry
            .properties_for(&type_name, ALL_VIEW)
            .unwrap()
            .iter()
            .map(|k| k.external_name().to_string())
            .collect();
        for view in registry.views_for(&type_name).unwrap() {
            for key in registry.properties_for(&type_name, &view).unwrap() {
                assert!(all.contains(key.external_name()), "{type_name}.{view}");
            }
        }
    }
}
