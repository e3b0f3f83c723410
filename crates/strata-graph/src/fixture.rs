//! JSON graph fixtures
//!
//! A fixture is a flat list of nodes and relationships:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "p1", "type": "Person", "properties": { "name": "Ada" } }],
//!   "relationships": [{ "start": "p1", "end": "c1", "type": "OWNS" }]
//! }
//! ```

use crate::memory::MemoryGraph;
use crate::store::{GraphStore, StoreError};
use crate::types::{NodeId, PropertyMap, RelationshipType};
use serde::{Deserialize, Serialize};

/// Serialized graph content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFixture {
    /// Nodes, created in order
    #[serde(default)]
    pub nodes: Vec<FixtureNode>,
    /// Relationships, created after all nodes
    #[serde(default)]
    pub relationships: Vec<FixtureRelationship>,
}

/// Fixture node entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureNode {
    /// Node id (generated when absent)
    #[serde(default)]
    pub id: Option<NodeId>,
    /// Raw type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Stored properties
    #[serde(default)]
    pub properties: PropertyMap,
}

/// Fixture relationship entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRelationship {
    /// Start node id
    pub start: NodeId,
    /// End node id
    pub end: NodeId,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
}

impl GraphFixture {
    /// Parse a fixture from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not a valid fixture document
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::InvalidFixture(e.to_string()))
    }

    /// Load the fixture into a store
    ///
    /// # Errors
    /// Returns error on duplicate ids or dangling relationship endpoints
    pub fn load_into(&self, store: &dyn GraphStore) -> Result<(), StoreError> {
        for node in &self.nodes {
            let id = node.id.clone().unwrap_or_default();
            store.create_node(id, &node.type_name, node.properties.clone())?;
        }
        for rel in &self.relationships {
            store.create_relationship(&rel.start, &rel.end, &rel.rel_type)?;
        }
        tracing::debug!(
            "Loaded fixture: {} nodes, {} relationships",
            self.nodes.len(),
            self.relationships.len()
        );
        Ok(())
    }

    /// Build a fresh in-memory graph from the fixture
    ///
    /// # Errors
    /// See [`GraphFixture::load_into`]
    pub fn to_memory_graph(&self) -> Result<MemoryGraph, StoreError> {
        let graph = MemoryGraph::new();
        self.load_into(&graph)?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    const FIXTURE: &str = r#"{
        "nodes": [
            { "id": "p1", "type": "Person", "properties": { "name": "Ada" } },
            { "id": "c1", "type": "Car" },
            { "type": "Car" }
        ],
        "relationships": [
            { "start": "p1", "end": "c1", "type": "OWNS" }
        ]
    }"#;

    #[test]
    fn fixture_loads_nodes_and_relationships() {
        let fixture = GraphFixture::from_json(FIXTURE).unwrap();
        let graph = fixture.to_memory_graph().unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(
            graph
                .traverse(&"p1".into(), &"OWNS".into(), Direction::Outgoing)
                .unwrap(),
            vec![NodeId::from("c1")]
        );
    }

    #[test]
    fn fixture_rejects_dangling_relationship() {
        let fixture = GraphFixture::from_json(
            r#"{ "nodes": [{ "id": "a", "type": "T" }],
                 "relationships": [{ "start": "a", "end": "zz", "type": "R" }] }"#,
        )
        .unwrap();
        assert!(matches!(
            fixture.to_memory_graph(),
            Err(StoreError::NodeNotFound(_))
        ));
    }

    #[test]
    fn fixture_rejects_bad_json() {
        assert!(matches!(
            GraphFixture::from_json("{ nope"),
            Err(StoreError::InvalidFixture(_))
        ));
    }
}
