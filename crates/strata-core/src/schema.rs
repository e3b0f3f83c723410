//! Schema introspection
//!
//! [`SchemaIntrospector`] walks the view registry and describes a type's
//! properties per view. The output is a pure query over one registry
//! snapshot:
//!
//! - Views are taken from the global view list; empty views are skipped
//! - Views and properties are ordered lexicographically
//! - Wire field names follow the established client format (`dbName`,
//!   `jsonName`, `className`, ...)
//!
//! Descriptions are cached per (type, registry version); any registry write
//! bumps the version, so stale entries are never served.

use crate::error::FrameworkError;
use crate::naming;
use crate::property::PropertyKey;
use crate::registry::RegistrySnapshot;
use crate::session::Session;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// View name -> external name -> property description
pub type ViewSchemas = BTreeMap<String, BTreeMap<String, PropertySchema>>;

/// Description of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    /// Storage name
    pub db_name: String,
    /// External name
    pub json_name: String,
    /// Property kind
    pub class_name: String,
    /// Type that declared the property
    pub declaring_class: String,
    /// Default value
    pub default_value: Option<Value>,
    /// Writes rejected
    pub read_only: bool,
    /// Excluded from validation
    pub system: bool,
    /// Value type, or related type for relationship properties
    #[serde(rename = "type")]
    pub value_type: String,
    /// Related entity type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_type: Option<String>,
    /// Sequence of entities
    pub is_collection: bool,
    /// Storage converter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_converter: Option<String>,
    /// Input converter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_converter: Option<String>,
}

impl PropertySchema {
    /// Describe a key as seen on `type_name`
    #[must_use]
    pub fn describe(key: &dyn PropertyKey, type_name: &str) -> Self {
        Self {
            db_name: key.storage_name().to_string(),
            json_name: key.external_name().to_string(),
            class_name: key.kind_name().to_string(),
            declaring_class: key.declaring_type().unwrap_or(type_name).to_string(),
            default_value: key.default_value().cloned(),
            read_only: key.is_read_only(),
            system: key.is_system(),
            value_type: key.value_type_name().to_string(),
            related_type: key.related_type().map(str::to_string),
            is_collection: key.is_collection(),
            database_converter: key.database_converter().map(|c| c.name().to_string()),
            input_converter: key.input_converter().map(|c| c.name().to_string()),
        }
    }
}

/// Description of one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Collection url of the type
    pub url: String,
    /// Type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Resource flags for the caller
    pub flags: u64,
    /// Non-empty views
    pub views: ViewSchemas,
}

/// Entry of the global type list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    /// Collection url of the type
    pub url: String,
    /// Type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Resource flags for the caller
    pub flags: u64,
}

/// Builds and caches schema descriptions
#[derive(Debug, Clone)]
pub struct SchemaIntrospector {
    cache: Cache<(String, u64), Arc<ViewSchemas>>,
}

impl SchemaIntrospector {
    /// Introspector caching up to `capacity` type descriptions
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Describe every non-empty view of `type_name`
    ///
    /// # Errors
    /// Returns [`FrameworkError::UnknownType`] if the type is not registered
    pub fn snapshot(&self, session: &Session, type_name: &str) -> Result<TypeSchema, FrameworkError> {
        let registry = session.registry().snapshot();
        if !registry.contains_type(type_name) {
            return Err(FrameworkError::UnknownType(type_name.to_string()));
        }

        let cache_key = (type_name.to_string(), registry.version());
        let views = match self.cache.get(&cache_key) {
            Some(views) => views,
            None => {
                let views = Arc::new(Self::build_views(&registry, type_name)?);
                self.cache.insert(cache_key, Arc::clone(&views));
                tracing::debug!(type_name, version = registry.version(), "built schema snapshot");
                views
            }
        };

        Ok(TypeSchema {
            url: naming::type_url(type_name),
            type_name: type_name.to_string(),
            flags: session.security().resource_flags(type_name),
            views: ViewSchemas::clone(&views),
        })
    }

    /// Url, name and flags of every registered type
    #[must_use]
    pub fn summaries(&self, session: &Session) -> Vec<TypeSummary> {
        session
            .registry()
            .type_names()
            .into_iter()
            .map(|type_name| TypeSummary {
                url: naming::type_url(&type_name),
                flags: session.security().resource_flags(&type_name),
                type_name,
            })
            .collect()
    }

    fn build_views(registry: &RegistrySnapshot, type_name: &str) -> Result<ViewSchemas, FrameworkError> {
        let mut views = ViewSchemas::new();
        for view in registry.view_names() {
            let keys = registry.properties_for(type_name, &view)?;
            if keys.is_empty() {
                continue;
            }
            let described = keys
                .iter()
                .map(|key| {
                    (
                        key.external_name().to_string(),
                        PropertySchema::describe(key.as_ref(), type_name),
                    )
                })
                .collect();
            views.insert(view, described);
        }
        Ok(views)
    }
}

impl Default for SchemaIntrospector {
    fn default() -> Self {
        Self::new(256)
    }
}
