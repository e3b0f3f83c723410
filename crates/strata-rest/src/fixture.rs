//! Combined schema and graph fixtures
//!
//! One JSON file seeds both halves of a session:
//!
//! ```json
//! {
//!   "schema": { "types": [{ "name": "Company", "properties": [], "views": {} }] },
//!   "graph": { "nodes": [{ "id": "acme", "type": "Company" }], "relationships": [] }
//! }
//! ```

use crate::error::RestError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use strata_core::{SchemaDocument, Session, ViewRegistry};
use strata_graph::GraphFixture;

/// Schema document plus graph content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrataFixture {
    /// Types to register, in order
    #[serde(default)]
    pub schema: SchemaDocument,
    /// Nodes and relationships to load
    #[serde(default)]
    pub graph: GraphFixture,
}

impl StrataFixture {
    /// Parse a fixture from JSON text
    ///
    /// # Errors
    /// Returns [`RestError::Fixture`] on malformed input
    pub fn from_json(text: &str) -> Result<Self, RestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a fixture file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let fixture = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            types = fixture.schema.types.len(),
            nodes = fixture.graph.nodes.len(),
            "loaded fixture"
        );
        Ok(fixture)
    }

    /// Register the schema and load the graph into a fresh session
    ///
    /// # Errors
    /// Returns error if a type cannot be registered or the graph has
    /// duplicate ids or dangling relationships
    pub fn into_session(&self) -> Result<Session, RestError> {
        let registry = ViewRegistry::new();
        self.schema.apply(&registry)?;
        let store = self.graph.to_memory_graph()?;
        Ok(Session::new(Arc::new(store), Arc::new(registry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> StrataFixture {
        serde_json::from_value(json!({
            "schema": {
                "types": [{
                    "name": "Company",
                    "properties": [{ "kind": "scalar", "name": "city", "dataType": "String" }],
                    "views": { "public": ["city"] }
                }]
            },
            "graph": {
                "nodes": [{ "id": "acme", "type": "Company", "properties": { "city": "Berlin" } }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn builds_session() {
        let session = fixture().into_session().unwrap();
        let acme = session.entity(&"acme".into()).unwrap();
        assert_eq!(session.get(&acme, "city").unwrap(), json!("Berlin"));
    }

    #[test]
    fn empty_document() {
        let fixture = StrataFixture::from_json("{}").unwrap();
        assert!(fixture.schema.types.is_empty());
        assert!(fixture.into_session().is_ok());
    }

    #[test]
    fn dangling_relationship() {
        let mut fixture = fixture();
        fixture.graph = GraphFixture::from_json(
            r#"{ "relationships": [{ "start": "a", "end": "b", "type": "X" }] }"#,
        )
        .unwrap();
        assert!(matches!(fixture.into_session(), Err(RestError::Store(_))));
    }
}
