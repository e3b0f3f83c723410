//! Store interface consumed by the entity layer
//!
//! The store is graph-level only: nodes, typed relationships and stored
//! values keyed by storage name. Multi-step writes are submitted as a
//! [`GraphMutation`] batch which the store applies atomically.

use crate::types::{
    Direction, GraphNode, NodeId, PropertyMap, RelId, Relationship, RelationshipType, Value,
};

/// Graph storage backend
///
/// Implementations must be safe for concurrent use. Every call is
/// synchronous; timeouts belong to the implementation.
pub trait GraphStore: Send + Sync + std::fmt::Debug {
    /// Every node in the store, in creation order
    fn all_nodes(&self) -> Vec<GraphNode>;

    /// Lookup a single node
    fn node(&self, id: &NodeId) -> Option<GraphNode>;

    /// Check if a node exists
    #[inline]
    fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Create a node with an initial property set
    ///
    /// # Errors
    /// Returns error if the id is already taken
    fn create_node(
        &self,
        id: NodeId,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, StoreError>;

    /// Delete a node and every relationship touching it
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn delete_node(&self, id: &NodeId) -> Result<(), StoreError>;

    /// Follow relationships of `rel_type` in `direction` from `id`
    ///
    /// Endpoints are returned in relationship creation order.
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn traverse(
        &self,
        id: &NodeId,
        rel_type: &RelationshipType,
        direction: Direction,
    ) -> Result<Vec<NodeId>, StoreError> {
        Ok(self
            .relationships(id, rel_type, direction)?
            .into_iter()
            .map(|rel| rel.other_end(direction).clone())
            .collect())
    }

    /// Relationships of `rel_type` touching `id` on its `direction` side
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn relationships(
        &self,
        id: &NodeId,
        rel_type: &RelationshipType,
        direction: Direction,
    ) -> Result<Vec<Relationship>, StoreError>;

    /// Create a single relationship
    ///
    /// # Errors
    /// Returns error if either endpoint does not exist
    fn create_relationship(
        &self,
        start: &NodeId,
        end: &NodeId,
        rel_type: &RelationshipType,
    ) -> Result<RelId, StoreError>;

    /// Delete a single relationship
    ///
    /// # Errors
    /// Returns error if the relationship does not exist
    fn delete_relationship(&self, id: RelId) -> Result<(), StoreError>;

    /// Read a stored value
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn get_stored_value(&self, id: &NodeId, storage_name: &str)
        -> Result<Option<Value>, StoreError>;

    /// Write (or remove, with `None`) a stored value
    ///
    /// # Errors
    /// Returns error if the node does not exist
    fn set_stored_value(
        &self,
        id: &NodeId,
        storage_name: &str,
        value: Option<Value>,
    ) -> Result<(), StoreError>;

    /// Apply a batch of mutations atomically
    ///
    /// Either every mutation is applied or none is; concurrent readers never
    /// observe a partially applied batch.
    ///
    /// # Errors
    /// Returns the first failing mutation's error; the store is left unchanged
    fn apply(&self, batch: Vec<GraphMutation>) -> Result<(), StoreError>;
}

/// A single write operation inside an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Create a node (the id is chosen by the caller)
    CreateNode {
        /// New node id
        id: NodeId,
        /// Raw type name
        type_name: String,
        /// Initial stored properties
        properties: PropertyMap,
    },

    /// Delete a node and its relationships
    DeleteNode {
        /// Node to delete
        id: NodeId,
    },

    /// Set or remove one stored value
    SetValue {
        /// Target node
        node: NodeId,
        /// Storage name
        key: String,
        /// New value (`None` removes)
        value: Option<Value>,
    },

    /// Replace all relationships of a type/direction with a new target set
    ///
    /// Existing relationships are removed and one relationship per distinct
    /// target is created, in target order. With `exclusive_targets`, every
    /// target is also detached from any other node it was linked to through
    /// the same relationship type.
    ReplaceRelationships {
        /// Source node
        node: NodeId,
        /// Relationship type
        rel_type: RelationshipType,
        /// Direction seen from `node`
        direction: Direction,
        /// New far-end nodes
        targets: Vec<NodeId>,
        /// Detach targets from other sources first
        exclusive_targets: bool,
    },
}

impl GraphMutation {
    /// Node the mutation primarily operates on
    #[must_use]
    pub fn node(&self) -> &NodeId {
        match self {
            Self::CreateNode { id, .. } | Self::DeleteNode { id } => id,
            Self::SetValue { node, .. } | Self::ReplaceRelationships { node, .. } => node,
        }
    }
}

/// Store-level errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Node does not exist
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Node id already in use
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Relationship does not exist
    #[error("relationship not found: {0}")]
    RelationshipNotFound(RelId),

    /// Fixture could not be read
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_node_accessor() {
        let m = GraphMutation::SetValue {
            node: "n1".into(),
            key: "name".to_string(),
            value: None,
        };
        assert_eq!(m.node().as_str(), "n1");

        let m = GraphMutation::DeleteNode { id: "n2".into() };
        assert_eq!(m.node().as_str(), "n2");
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::NodeNotFound("abc".into());
        assert_eq!(err.to_string(), "node not found: abc");
    }
}
