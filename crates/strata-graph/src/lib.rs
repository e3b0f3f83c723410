//! Strata Graph
//!
//! The storage seam underneath the entity framework.
//!
//! # Core Concepts
//!
//! - [`GraphStore`]: Node iteration, relationship traversal, stored values
//! - [`GraphMutation`]: Atomic write batches (replace-not-merge relationships)
//! - [`MemoryGraph`]: Thread-safe in-memory reference store
//! - [`GraphFixture`]: JSON fixtures for tests and the CLI
//! - [`GetAllNodes`]: Bulk node enumeration
//!
//! # Example
//!
//! ```rust
//! use strata_graph::{Direction, GraphStore, MemoryGraph, NodeId, PropertyMap};
//!
//! let graph = MemoryGraph::new();
//! let a = graph.create_node(NodeId::from("a"), "Person", PropertyMap::new()).unwrap();
//! let b = graph.create_node(NodeId::from("b"), "Car", PropertyMap::new()).unwrap();
//! graph.create_relationship(&a, &b, &"OWNS".into()).unwrap();
//!
//! let owned = graph.traverse(&a, &"OWNS".into(), Direction::Outgoing).unwrap();
//! assert_eq!(owned, vec![b]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod command;
mod fixture;
mod memory;
mod store;
mod types;

pub use command::GetAllNodes;
pub use fixture::{FixtureNode, FixtureRelationship, GraphFixture};
pub use memory::MemoryGraph;
pub use store::{GraphMutation, GraphStore, StoreError};
pub use types::{
    Direction, GraphNode, NodeId, PropertyMap, RelId, Relationship, RelationshipType, Value,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
