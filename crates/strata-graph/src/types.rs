//! Graph-level identifiers and records
//!
//! Provides the raw building blocks the store hands out:
//! - [`NodeId`] / [`RelId`]: stable identifiers
//! - [`RelationshipType`] and [`Direction`]: traversal coordinates
//! - [`GraphNode`] / [`Relationship`]: raw records, no typing applied

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Stored property value
pub type Value = serde_json::Value;

/// Raw property map of a node (storage name -> stored value)
pub type PropertyMap = BTreeMap<String, Value>;

/// Unique node identifier
///
/// Freshly generated ids are 32 lowercase hex characters (simple UUID v4),
/// but any non-empty string is accepted so fixtures can use readable ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a new random node id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the id as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Relationship identifier (monotonic per store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelId(pub u64);

impl Display for RelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "rel-{}", self.0)
    }
}

/// Named relationship type (e.g. `LINK`, `CONTAINS`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipType(String);

impl RelationshipType {
    /// Create a relationship type
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Relationship type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for RelationshipType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationshipType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Traversal direction relative to the starting node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow relationships that start at the node
    Outgoing,
    /// Follow relationships that end at the node
    Incoming,
}

impl Direction {
    /// The opposite direction
    #[inline]
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Self::Outgoing => Self::Incoming,
            Self::Incoming => Self::Outgoing,
        }
    }
}

/// Raw node as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node id
    pub id: NodeId,
    /// Raw type name recorded at creation
    #[serde(rename = "type")]
    pub type_name: String,
    /// Stored properties
    #[serde(default)]
    pub properties: PropertyMap,
}

impl GraphNode {
    /// Create a node record
    #[inline]
    #[must_use]
    pub fn new(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            properties: PropertyMap::new(),
        }
    }

    /// With a stored property
    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Directed, typed relationship between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship id
    pub id: RelId,
    /// Relationship type
    pub rel_type: RelationshipType,
    /// Start node
    pub start: NodeId,
    /// End node
    pub end: NodeId,
}

impl Relationship {
    /// Node at the far side when traversing in `direction`
    #[must_use]
    pub fn other_end(&self, direction: Direction) -> &NodeId {
        match direction {
            Direction::Outgoing => &self.end,
            Direction::Incoming => &self.start,
        }
    }

    /// Node at the near side when traversing in `direction`
    #[must_use]
    pub fn near_end(&self, direction: Direction) -> &NodeId {
        match direction {
            Direction::Outgoing => &self.start,
            Direction::Incoming => &self.end,
        }
    }
}
