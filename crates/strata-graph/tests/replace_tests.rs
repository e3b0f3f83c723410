use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;
use strata_graph::{
    Direction, GraphMutation, GraphStore, MemoryGraph, NodeId, PropertyMap, RelationshipType,
};

fn seeded(count: usize) -> (MemoryGraph, Vec<NodeId>) {
    let graph = MemoryGraph::new();
    let ids: Vec<NodeId> = (0..count)
        .map(|i| {
            graph
                .create_node(NodeId::from(format!("n{i}")), "Thing", PropertyMap::new())
                .unwrap()
        })
        .collect();
    (graph, ids)
}

proptest! {
    #[test]
    fn prop_replace_leaves_exactly_new_targets(
        before in proptest::collection::vec(1..12usize, 0..8),
        after in proptest::collection::vec(1..12usize, 0..8),
    ) {
        let (graph, ids) = seeded(12);
        let rel = RelationshipType::new("OWNS");
        let source = ids[0].clone();

        for idx in &before {
            graph.create_relationship(&source, &ids[*idx], &rel).unwrap();
        }

        let targets: Vec<NodeId> = after.iter().map(|i| ids[*i].clone()).collect();
        graph.apply(vec![GraphMutation::ReplaceRelationships {
            node: source.clone(),
            rel_type: rel.clone(),
            direction: Direction::Outgoing,
            targets: targets.clone(),
            exclusive_targets: false,
        }]).unwrap();

        let linked: BTreeSet<NodeId> = graph
            .traverse(&source, &rel, Direction::Outgoing)
            .unwrap()
            .into_iter()
            .collect();
        let expected: BTreeSet<NodeId> = targets.into_iter().collect();
        prop_assert_eq!(linked, expected);
    }
}

#[test]
fn node_created_earlier_in_batch_can_be_linked() {
    let (graph, ids) = seeded(3);
    let rel = RelationshipType::new("WORKS_AT");
    graph.create_relationship(&ids[0], &ids[1], &rel).unwrap();
    graph.create_relationship(&ids[2], &ids[1], &rel).unwrap();

    graph
        .apply(vec![
            GraphMutation::CreateNode {
                id: "fresh".into(),
                type_name: "Thing".into(),
                properties: PropertyMap::new(),
            },
            GraphMutation::ReplaceRelationships {
                node: ids[0].clone(),
                rel_type: rel.clone(),
                direction: Direction::Outgoing,
                targets: vec!["fresh".into()],
                exclusive_targets: true,
            },
        ])
        .unwrap();

    assert_eq!(
        graph.traverse(&ids[0], &rel, Direction::Outgoing).unwrap(),
        vec![NodeId::from("fresh")]
    );
    // other sources of the old target are untouched
    assert_eq!(
        graph.traverse(&ids[2], &rel, Direction::Outgoing).unwrap(),
        vec![ids[1].clone()]
    );
}

#[test]
fn failed_link_discards_created_node() {
    let (graph, ids) = seeded(1);
    let result = graph.apply(vec![
        GraphMutation::CreateNode {
            id: "fresh".into(),
            type_name: "Thing".into(),
            properties: PropertyMap::new(),
        },
        GraphMutation::ReplaceRelationships {
            node: ids[0].clone(),
            rel_type: "OWNS".into(),
            direction: Direction::Outgoing,
            targets: vec!["fresh".into(), "missing".into()],
            exclusive_targets: false,
        },
    ]);
    assert!(result.is_err());
    assert_eq!(graph.node_count(), 1);
    assert!(graph.node(&"fresh".into()).is_none());
}

#[test]
fn replace_on_missing_source_fails() {
    let (graph, _) = seeded(1);
    let result = graph.apply(vec![GraphMutation::ReplaceRelationships {
        node: "nope".into(),
        rel_type: "OWNS".into(),
        direction: Direction::Outgoing,
        targets: vec![],
        exclusive_targets: false,
    }]);
    assert!(result.is_err());
}

#[test]
fn concurrent_readers_never_see_partial_replace() {
    let (graph, ids) = seeded(6);
    let rel = RelationshipType::new("OWNS");
    let source = ids[0].clone();
    let first = vec![ids[1].clone(), ids[2].clone()];
    let second = vec![ids[3].clone(), ids[4].clone(), ids[5].clone()];

    graph
        .apply(vec![GraphMutation::ReplaceRelationships {
            node: source.clone(),
            rel_type: rel.clone(),
            direction: Direction::Outgoing,
            targets: first.clone(),
            exclusive_targets: false,
        }])
        .unwrap();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..200 {
                let targets = if round % 2 == 0 { &second } else { &first };
                graph
                    .apply(vec![GraphMutation::ReplaceRelationships {
                        node: source.clone(),
                        rel_type: rel.clone(),
                        direction: Direction::Outgoing,
                        targets: targets.clone(),
                        exclusive_targets: false,
                    }])
                    .unwrap();
            }
        });

        for _ in 0..200 {
            let seen = graph.traverse(&source, &rel, Direction::Outgoing).unwrap();
            assert!(seen == first || seen == second, "partial state: {seen:?}");
        }
    });
}
