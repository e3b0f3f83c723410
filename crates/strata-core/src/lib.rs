//! Strata Core - typed entity mapping over a graph store
//!
//! Projects graph nodes into named, typed, converted, view-scoped fields:
//! - Property keys with storage and input converters
//! - Relationship-backed properties projected through notions
//! - Per-type views, extensible at runtime with dynamic properties
//! - Schema introspection over the view registry
//! - Search predicates extracted from request parameters
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use strata_core::prelude::*;
//! use strata_graph::{Direction, MemoryGraph};
//!
//! let registry = ViewRegistry::new();
//! registry
//!     .register(EntityType::new("Company"))
//!     .unwrap();
//! registry
//!     .register(EntityType::new("Person").view(
//!         "public",
//!         [
//!             Property::integer("age").into_ref(),
//!             CollectionProperty::new("employers", "Company", "WORKS_AT", Direction::Outgoing)
//!                 .into_ref(),
//!         ],
//!     ))
//!     .unwrap();
//!
//! let session = Session::new(Arc::new(MemoryGraph::new()), Arc::new(registry));
//! let acme = session
//!     .create_entity("Company", json!({ "name": "Acme" }).as_object().unwrap())
//!     .unwrap();
//! let bob = session
//!     .create_entity(
//!         "Person",
//!         json!({ "name": "Bob", "age": "42", "employers": [acme.id().as_str()] })
//!             .as_object()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let view = session.read_view(&bob, "public").unwrap();
//! assert_eq!(view["age"], json!(42));
//! assert_eq!(view["employers"][0]["id"], json!(acme.id().as_str()));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod constraint;
pub mod context;
pub mod converter;
pub mod document;
pub mod entity;
pub mod error;
pub mod naming;
pub mod notion;
pub mod property;
pub mod registry;
pub mod schema;
pub mod search;
pub mod session;

pub use constraint::Constraint;
pub use context::{ResourceFlags, SecurityContext};
pub use converter::{
    BooleanConverter, ConversionError, DateConverter, DoubleConverter, IntConverter,
    LongConverter, LowercaseConverter, PropertyConverter,
};
pub use document::{NotionDocument, PropertyDocument, SchemaDocument, TypeDocument};
pub use entity::{Entity, NodeFactory};
pub use error::{
    ErrorBuffer, FrameworkError, RegistryError, ValidationError, ValidationKind,
};
pub use notion::{IdNotion, Notion, NotionError, NotionRef, ObjectNotion, PropertyNotion, Resolved};
pub use property::{
    CollectionProperty, DynamicProperty, EntityIdProperty, EntityProperty, IdProperty, KeyInfo,
    Property, PropertyDefinition, PropertyKey, PropertyRef, Relation, TypeProperty, ValueType,
};
pub use registry::{
    EntityType, RegistrySnapshot, ViewRegistry, ABSTRACT_NODE, ALL_VIEW, PUBLIC_VIEW, UI_VIEW,
};
pub use schema::{PropertySchema, SchemaIntrospector, TypeSchema, TypeSummary, ViewSchemas};
pub use search::{compare_values, SearchAttribute, SearchOperator, RESERVED_PARAMETERS};
pub use session::Session;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring types and working with entities
    pub use crate::{
        CollectionProperty, Entity, EntityIdProperty, EntityProperty, EntityType,
        FrameworkError, Property, PropertyKey, SecurityContext, Session, ViewRegistry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
