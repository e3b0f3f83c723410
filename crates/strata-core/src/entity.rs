//! Entity handles and node instantiation

use std::fmt::{self, Display, Formatter};
use strata_graph::{GraphNode, NodeId};

/// Typed handle on a graph node
///
/// Holds no property data; every read goes through a
/// [`PropertyKey`](crate::PropertyKey) against the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    id: NodeId,
    type_name: String,
}

impl Entity {
    /// Create entity handle
    #[inline]
    #[must_use]
    pub fn new(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
        }
    }

    /// Node id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Entity type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name, self.id)
    }
}

/// Turns raw nodes into entity handles
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactory;

impl NodeFactory {
    /// Instantiate a single node
    #[inline]
    #[must_use]
    pub fn instantiate(node: &GraphNode) -> Entity {
        Entity::new(node.id.clone(), node.type_name.clone())
    }

    /// Instantiate a batch of nodes, preserving order
    #[must_use]
    pub fn bulk_instantiate(nodes: impl IntoIterator<Item = GraphNode>) -> Vec<Entity> {
        nodes
            .into_iter()
            .map(|node| Entity::new(node.id, node.type_name))
            .collect()
    }
}
