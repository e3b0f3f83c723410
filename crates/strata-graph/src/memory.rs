//! In-memory reference store
//!
//! [`MemoryGraph`] keeps the whole graph behind a single `RwLock`. Batches are
//! applied to a private copy which replaces the live state only when every
//! mutation succeeded, so readers see either the old or the new graph.

use crate::store::{GraphMutation, GraphStore, StoreError};
use crate::types::{
    Direction, GraphNode, NodeId, PropertyMap, RelId, Relationship, RelationshipType, Value,
};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Thread-safe in-memory graph
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: IndexMap<NodeId, GraphNode>,
    relationships: IndexMap<RelId, Relationship>,
    next_rel: u64,
}

impl GraphState {
    fn require(&self, id: &NodeId) -> Result<&GraphNode, StoreError> {
        self.nodes
            .get(id)
            .ok_or_else(|| StoreError::NodeNotFound(id.clone()))
    }

    fn create_node(
        &mut self,
        id: NodeId,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, StoreError> {
        if self.nodes.contains_key(&id) {
            return Err(StoreError::DuplicateNode(id));
        }
        let node = GraphNode {
            id: id.clone(),
            type_name: type_name.to_string(),
            properties,
        };
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    fn delete_node(&mut self, id: &NodeId) -> Result<(), StoreError> {
        self.require(id)?;
        self.relationships
            .retain(|_, rel| &rel.start != id && &rel.end != id);
        self.nodes.shift_remove(id);
        Ok(())
    }

    fn set_value(&mut self, id: &NodeId, key: &str, value: Option<Value>) -> Result<(), StoreError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NodeNotFound(id.clone()))?;
        match value {
            Some(value) => {
                node.properties.insert(key.to_string(), value);
            }
            None => {
                node.properties.remove(key);
            }
        }
        Ok(())
    }

    fn relationships(
        &self,
        id: &NodeId,
        rel_type: &RelationshipType,
        direction: Direction,
    ) -> Result<Vec<Relationship>, StoreError> {
        self.require(id)?;
        Ok(self
            .relationships
            .values()
            .filter(|rel| &rel.rel_type == rel_type && rel.near_end(direction) == id)
            .cloned()
            .collect())
    }

    fn create_relationship(
        &mut self,
        start: &NodeId,
        end: &NodeId,
        rel_type: &RelationshipType,
    ) -> Result<RelId, StoreError> {
        self.require(start)?;
        self.require(end)?;
        self.next_rel += 1;
        let id = RelId(self.next_rel);
        self.relationships.insert(
            id,
            Relationship {
                id,
                rel_type: rel_type.clone(),
                start: start.clone(),
                end: end.clone(),
            },
        );
        Ok(id)
    }

    fn replace_relationships(
        &mut self,
        node: &NodeId,
        rel_type: &RelationshipType,
        direction: Direction,
        targets: &[NodeId],
        exclusive_targets: bool,
    ) -> Result<(), StoreError> {
        self.require(node)?;
        for target in targets {
            self.require(target)?;
        }

        self.relationships.retain(|_, rel| {
            if &rel.rel_type != rel_type {
                return true;
            }
            if rel.near_end(direction) == node {
                return false;
            }
            !(exclusive_targets && targets.contains(rel.other_end(direction)))
        });

        let mut linked: Vec<&NodeId> = Vec::with_capacity(targets.len());
        for target in targets {
            if linked.contains(&target) {
                continue;
            }
            linked.push(target);
            match direction {
                Direction::Outgoing => self.create_relationship(node, target, rel_type)?,
                Direction::Incoming => self.create_relationship(target, node, rel_type)?,
            };
        }
        Ok(())
    }

    fn apply_one(&mut self, mutation: GraphMutation) -> Result<(), StoreError> {
        match mutation {
            GraphMutation::CreateNode {
                id,
                type_name,
                properties,
            } => self.create_node(id, &type_name, properties).map(|_| ()),
            GraphMutation::DeleteNode { id } => self.delete_node(&id),
            GraphMutation::SetValue { node, key, value } => self.set_value(&node, &key, value),
            GraphMutation::ReplaceRelationships {
                node,
                rel_type,
                direction,
                targets,
                exclusive_targets,
            } => self.replace_relationships(&node, &rel_type, direction, &targets, exclusive_targets),
        }
    }
}

impl MemoryGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Number of relationships
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.state.read().relationships.len()
    }
}

impl GraphStore for MemoryGraph {
    fn all_nodes(&self) -> Vec<GraphNode> {
        self.state.read().nodes.values().cloned().collect()
    }

    fn node(&self, id: &NodeId) -> Option<GraphNode> {
        self.state.read().nodes.get(id).cloned()
    }

    fn create_node(
        &self,
        id: NodeId,
        type_name: &str,
        properties: PropertyMap,
    ) -> Result<NodeId, StoreError> {
        self.state.write().create_node(id, type_name, properties)
    }

    fn delete_node(&self, id: &NodeId) -> Result<(), StoreError> {
        self.state.write().delete_node(id)
    }

    fn relationships(
        &self,
        id: &NodeId,
        rel_type: &RelationshipType,
        direction: Direction,
    ) -> Result<Vec<Relationship>, StoreError> {
        self.state.read().relationships(id, rel_type, direction)
    }

    fn create_relationship(
        &self,
        start: &NodeId,
        end: &NodeId,
        rel_type: &RelationshipType,
    ) -> Result<RelId, StoreError> {
        self.state.write().create_relationship(start, end, rel_type)
    }

    fn delete_relationship(&self, id: RelId) -> Result<(), StoreError> {
        self.state
            .write()
            .relationships
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RelationshipNotFound(id))
    }

    fn get_stored_value(
        &self,
        id: &NodeId,
        storage_name: &str,
    ) -> Result<Option<Value>, StoreError> {
        let state = self.state.read();
        Ok(state.require(id)?.properties.get(storage_name).cloned())
    }

    fn set_stored_value(
        &self,
        id: &NodeId,
        storage_name: &str,
        value: Option<Value>,
    ) -> Result<(), StoreError> {
        self.state.write().set_value(id, storage_name, value)
    }

    fn apply(&self, batch: Vec<GraphMutation>) -> Result<(), StoreError> {
        let mut live = self.state.write();
        let mut staged = live.clone();
        let count = batch.len();
        for mutation in batch {
            if let Err(e) = staged.apply_one(mutation) {
                tracing::debug!("Rejected mutation batch of {} operations: {}", count, e);
                return Err(e);
            }
        }
        *live = staged;
        tracing::trace!("Applied mutation batch of {} operations", count);
        Ok(())
    }
}
