//! Bulk node enumeration
//!
//! [`GetAllNodes`] is the batch data source used by list reads and the CLI
//! `nodes` subcommand. It yields raw nodes only; turning them into typed
//! entities is the caller's job.

use crate::store::GraphStore;
use crate::types::GraphNode;
use std::collections::HashSet;

/// Enumerate every node of a store, optionally restricted to raw type names
#[derive(Debug, Clone, Default)]
pub struct GetAllNodes {
    types: Option<HashSet<String>>,
}

impl GetAllNodes {
    /// Enumerate all nodes
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to nodes whose raw type is one of `types`
    #[must_use]
    pub fn of_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: Some(types.into_iter().map(Into::into).collect()),
        }
    }

    /// Run against a store; nodes come back in store order
    #[must_use]
    pub fn execute(&self, store: &dyn GraphStore) -> Vec<GraphNode> {
        let nodes = store.all_nodes();
        let result: Vec<GraphNode> = match &self.types {
            Some(types) => nodes
                .into_iter()
                .filter(|node| types.contains(&node.type_name))
                .collect(),
            None => nodes,
        };
        tracing::trace!(count = result.len(), "enumerated nodes");
        result
    }
}
