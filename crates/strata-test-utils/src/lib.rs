//! Testing utilities for Strata workspace
//!
//! Shared fixture schema and seeded stores.
//!
//! Schema:
//! - `Company`: `city`, `employees` (incoming `WORKS_AT`)
//! - `Person`: `age`, `email`, `birthday`, `owns` (`OWNS` to `File`),
//!   `employer` (`WORKS_AT`, projected by company name)
//! - `File`: `size`, `owner` (incoming `OWNS`, by id)
//! - `Link`: `linkable` (`LINK` to any node, by id) and derived `linkableId`
//!
//! Seeded graph: people `123` (Alice) and `456` (Bob), company `acme`,
//! files `f1`..`f3` (`123` owns `f1`, `f2`; `456` owns `f3`), link `l1` -> `f1`.

#![allow(missing_docs)]

use serde_json::{json, Map, Value};
use std::sync::Arc;
use strata_core::{
    CollectionProperty, EntityIdProperty, EntityProperty, EntityType, IdNotion, Property,
    PropertyNotion, PropertyRef, Session, ViewRegistry, ABSTRACT_NODE, PUBLIC_VIEW, UI_VIEW,
};
use strata_graph::{Direction, GraphFixture, MemoryGraph};

pub const ALICE: &str = "123";
pub const BOB: &str = "456";
pub const ACME: &str = "acme";
pub const LINK: &str = "l1";

pub fn fixture_registry() -> ViewRegistry {
    let registry = ViewRegistry::new();

    let city = Property::string("city").into_ref();
    let employees =
        CollectionProperty::new("employees", "Person", "WORKS_AT", Direction::Incoming).into_ref();
    registry
        .register(
            EntityType::new("Company")
                .view(PUBLIC_VIEW, [Arc::clone(&city), Arc::clone(&employees)])
                .view(UI_VIEW, [city, employees]),
        )
        .unwrap();

    let company_name = registry.property("Company", "name").unwrap();
    let age = Property::integer("age").into_ref();
    let email = Property::string("email").into_ref();
    let birthday = Property::date("birthday").into_ref();
    let owns = CollectionProperty::new("owns", "File", "OWNS", Direction::Outgoing)
        .one_to_many()
        .into_ref();
    let employer: PropertyRef =
        EntityProperty::new("employer", "Company", "WORKS_AT", Direction::Outgoing)
            .with_notion(Arc::new(PropertyNotion::new(company_name)))
            .into_arc();
    registry
        .register(
            EntityType::new("Person")
                .view(
                    PUBLIC_VIEW,
                    [Arc::clone(&age), Arc::clone(&owns), Arc::clone(&employer)],
                )
                .view(UI_VIEW, [age, email, birthday, owns, employer]),
        )
        .unwrap();

    let size = Property::long("size").into_ref();
    let owner: PropertyRef = EntityProperty::new("owner", "Person", "OWNS", Direction::Incoming)
        .with_notion(Arc::new(IdNotion))
        .into_arc();
    registry
        .register(
            EntityType::new("File")
                .view(PUBLIC_VIEW, [Arc::clone(&size), Arc::clone(&owner)])
                .view(UI_VIEW, [size, owner]),
        )
        .unwrap();

    let linkable = EntityProperty::new("linkable", ABSTRACT_NODE, "LINK", Direction::Outgoing)
        .with_notion(Arc::new(IdNotion))
        .into_arc();
    let linkable_id = EntityIdProperty::new("linkableId", Arc::clone(&linkable)).into_ref();
    let linkable: PropertyRef = linkable;
    registry
        .register(
            EntityType::new("Link")
                .view(PUBLIC_VIEW, [Arc::clone(&linkable), Arc::clone(&linkable_id)])
                .view(UI_VIEW, [linkable, linkable_id]),
        )
        .unwrap();

    registry
}

pub fn seeded_fixture() -> GraphFixture {
    serde_json::from_value(json!({
        "nodes": [
            { "id": ALICE, "type": "Person", "properties": { "name": "Alice", "age": 30, "birthday": 1_367_411_400_000_i64 } },
            { "id": BOB, "type": "Person", "properties": { "name": "Bob", "age": 45 } },
            { "id": ACME, "type": "Company", "properties": { "name": "Acme", "city": "Berlin" } },
            { "id": "f1", "type": "File", "properties": { "name": "a.txt", "size": 10 } },
            { "id": "f2", "type": "File", "properties": { "name": "b.txt", "size": 20 } },
            { "id": "f3", "type": "File", "properties": { "name": "c.txt", "size": 30 } },
            { "id": LINK, "type": "Link", "properties": { "name": "home" } }
        ],
        "relationships": [
            { "start": ALICE, "end": "f1", "type": "OWNS" },
            { "start": ALICE, "end": "f2", "type": "OWNS" },
            { "start": BOB, "end": "f3", "type": "OWNS" },
            { "start": ALICE, "end": ACME, "type": "WORKS_AT" },
            { "start": LINK, "end": "f1", "type": "LINK" }
        ]
    }))
    .unwrap()
}

pub fn seeded_store() -> MemoryGraph {
    seeded_fixture().to_memory_graph().unwrap()
}

pub fn empty_session() -> Session {
    Session::new(Arc::new(MemoryGraph::new()), Arc::new(fixture_registry()))
}

pub fn seeded_session() -> Session {
    Session::new(Arc::new(seeded_store()), Arc::new(fixture_registry()))
}

pub fn values(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn ids(values: &Value) -> Vec<String> {
    let mut ids: Vec<String> = values
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").or(Some(item)).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    ids.sort();
    ids
}
