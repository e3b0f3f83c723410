//! Fold properties of the resource chain resolver

use proptest::prelude::*;
use strata_core::{FrameworkError, RegistrySnapshot};
use strata_graph::NodeId;
use strata_rest::{ChainResolver, CombinationRules, Resource, ResourceKind, ResourcePath};
use strata_test_utils::{fixture_registry, seeded_session};

const SEGMENTS: &[&str] = &[
    "Person", "people", "File", "files", "companies", "123", "456", "acme", "f1", "f3", "owns",
    "owner", "employees", "age", "public", "ui", "_schema", "nothing",
];

fn segment() -> impl Strategy<Value = String> {
    prop::sample::select(SEGMENTS).prop_map(str::to_string)
}

fn id(id: &str) -> Resource {
    Resource::Id {
        id: NodeId::from(id),
    }
}

/// Nests ids as `(left,right)`, exposing the fold order
fn pair(_: &RegistrySnapshot, left: &Resource, right: &Resource) -> Option<Resource> {
    match (left, right) {
        (Resource::Id { id: l }, Resource::Id { id: r }) => Some(id(&format!("({l},{r})"))),
        _ => None,
    }
}

#[test]
fn fold_is_left_biased() {
    let mut rules = CombinationRules::new();
    rules.register(ResourceKind::Id, ResourceKind::Id, pair);
    let resolver = ChainResolver::with_rules(rules);

    let registry = fixture_registry().snapshot();
    let folded = resolver.fold(&registry, vec![id("a"), id("b"), id("c"), id("d")]);
    assert_eq!(folded, vec![id("(((a,b),c),d)")]);
}

#[test]
fn merged_resource_retries_with_next_neighbor() {
    let registry = fixture_registry().snapshot();
    let chain = vec![
        Resource::Type {
            raw: "people".into(),
            type_name: "Person".into(),
        },
        id("123"),
        id("owns"),
        id("f1"),
    ];
    let folded = ChainResolver::new().fold(&registry, chain);
    assert_eq!(folded.len(), 1);
    assert_eq!(folded[0].to_string(), "Person/123/owns/f1");
}

proptest! {
    #[test]
    fn prop_fold_reaches_fixpoint(segments in prop::collection::vec(segment(), 1..7)) {
        let session = seeded_session();
        let resolver = ChainResolver::new();
        let path = ResourcePath::new(segments);
        let Ok(chain) = ChainResolver::instantiate(&session, &path) else {
            return Ok(());
        };

        let registry = session.registry().snapshot();
        let folded = resolver.fold(&registry, chain.clone());
        prop_assert!(!folded.is_empty());
        prop_assert!(folded.len() <= chain.len());
        prop_assert_eq!(resolver.fold(&registry, folded.clone()), folded);
    }

    #[test]
    fn prop_resolve_agrees_with_fold(segments in prop::collection::vec(segment(), 1..7)) {
        let session = seeded_session();
        let resolver = ChainResolver::new();
        let path = ResourcePath::new(segments);

        match resolver.resolve(&session, &path) {
            Ok(resource) => {
                let chain = ChainResolver::instantiate(&session, &path).unwrap();
                let folded = resolver.fold(&session.registry().snapshot(), chain);
                prop_assert_eq!(folded, vec![resource.clone()]);
                prop_assert!(resource.is_executable());
            }
            Err(FrameworkError::IllegalPath(_) | FrameworkError::UnknownType(_)) => {}
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }
}
