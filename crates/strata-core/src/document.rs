//! Schema documents
//!
//! Serde description of entity types used to register whole schemas at
//! runtime (CLI fixtures, tests) and to declare dynamic properties.
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "name": "Company",
//!       "properties": [{ "kind": "scalar", "name": "city", "dataType": "String" }],
//!       "views": { "public": ["city"] }
//!     }
//!   ]
//! }
//! ```
//!
//! Types are registered in document order, so parents and the targets of
//! property notions must come first.

use crate::constraint::Constraint;
use crate::converter::LowercaseConverter;
use crate::error::RegistryError;
use crate::notion::{IdNotion, NotionRef, ObjectNotion, PropertyNotion};
use crate::property::{
    CollectionProperty, EntityIdProperty, EntityProperty, Property, PropertyDefinition,
    PropertyRef, ValueType,
};
use crate::registry::{EntityType, ViewRegistry, ALL_VIEW};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use strata_graph::Direction;

/// A set of type declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Types in registration order
    #[serde(default)]
    pub types: Vec<TypeDocument>,
}

/// Declaration of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDocument {
    /// Type name
    pub name: String,
    /// Parent type (default `AbstractNode`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Static properties
    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
    /// View name -> property names
    #[serde(default)]
    pub views: IndexMap<String, Vec<String>>,
    /// Dynamic properties
    #[serde(default)]
    pub dynamic: Vec<PropertyDefinition>,
}

/// Declaration of one static property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyDocument {
    /// Scalar stored on the node
    #[serde(rename_all = "camelCase")]
    Scalar {
        /// External name
        name: String,
        /// Value type
        data_type: ValueType,
        /// Storage name
        #[serde(default)]
        db_name: Option<String>,
        /// Reject writes
        #[serde(default)]
        read_only: bool,
        /// Skip validation
        #[serde(default)]
        system: bool,
        /// Require a value
        #[serde(default)]
        not_null: bool,
        /// Reject blank strings
        #[serde(default)]
        not_blank: bool,
        /// Regex the value must match
        #[serde(default)]
        pattern: Option<String>,
        /// Maximum string length
        #[serde(default)]
        max_length: Option<usize>,
        /// Store lower-cased
        #[serde(default)]
        lowercase: bool,
        /// Default value
        #[serde(default)]
        default_value: Option<Value>,
    },

    /// Related entities
    #[serde(rename_all = "camelCase")]
    Collection {
        /// External name
        name: String,
        /// Target type
        related_type: String,
        /// Relationship type
        relationship: String,
        /// Direction seen from the owner
        #[serde(default = "outgoing")]
        direction: Direction,
        /// Projection
        #[serde(default)]
        notion: NotionDocument,
        /// A target belongs to one source only
        #[serde(default)]
        one_to_many: bool,
    },

    /// Single related entity
    #[serde(rename_all = "camelCase")]
    Entity {
        /// External name
        name: String,
        /// Target type
        related_type: String,
        /// Relationship type
        relationship: String,
        /// Direction seen from the owner
        #[serde(default = "outgoing")]
        direction: Direction,
        /// Projection
        #[serde(default)]
        notion: NotionDocument,
        /// The target is linked from one source only
        #[serde(default)]
        one_to_one: bool,
    },

    /// Id of an entity property's target
    #[serde(rename_all = "camelCase")]
    EntityId {
        /// External name
        name: String,
        /// Name of the paired entity property (same type)
        entity: String,
    },
}

fn outgoing() -> Direction {
    Direction::Outgoing
}

impl PropertyDocument {
    /// External name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { name, .. }
            | Self::Collection { name, .. }
            | Self::Entity { name, .. }
            | Self::EntityId { name, .. } => name,
        }
    }
}

/// Declaration of a notion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotionDocument {
    /// `{ id, type }` objects
    #[default]
    Object,
    /// Bare node ids
    Id,
    /// Value of a property of the related type
    #[serde(rename_all = "camelCase")]
    Property {
        /// Property of the related type
        key: String,
        /// Create missing targets
        #[serde(default)]
        create_if_missing: bool,
    },
}

impl SchemaDocument {
    /// Parse a JSON document
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidDeclaration`] on malformed input
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(text).map_err(|e| RegistryError::InvalidDeclaration(e.to_string()))
    }

    /// Register every type and dynamic property of the document
    ///
    /// # Errors
    /// Returns the first registration error; types registered before it stay
    pub fn apply(&self, registry: &ViewRegistry) -> Result<(), RegistryError> {
        for doc in &self.types {
            doc.apply(registry)?;
        }
        Ok(())
    }
}

impl TypeDocument {
    /// Register this type and its dynamic properties
    ///
    /// # Errors
    /// Returns error for invalid declarations or registration failures
    pub fn apply(&self, registry: &ViewRegistry) -> Result<(), RegistryError> {
        let mut keys: IndexMap<String, PropertyRef> = IndexMap::new();
        let mut entities: HashMap<&str, Arc<EntityProperty>> = HashMap::new();

        for prop in &self.properties {
            let key: PropertyRef = match prop {
                PropertyDocument::Entity {
                    name,
                    related_type,
                    relationship,
                    direction,
                    notion,
                    one_to_one,
                } => {
                    let mut entity = EntityProperty::new(
                        name.as_str(),
                        related_type.as_str(),
                        relationship.as_str(),
                        *direction,
                    )
                    .with_notion(build_notion(registry, related_type, notion)?);
                    if *one_to_one {
                        entity = entity.one_to_one();
                    }
                    let entity = entity.into_arc();
                    entities.insert(name.as_str(), Arc::clone(&entity));
                    entity
                }
                PropertyDocument::EntityId { name, entity } => {
                    let paired = entities.get(entity.as_str()).ok_or_else(|| {
                        RegistryError::InvalidDeclaration(format!(
                            "{}.{name}: entity property {entity} must be declared first",
                            self.name
                        ))
                    })?;
                    EntityIdProperty::new(name.as_str(), Arc::clone(paired)).into_ref()
                }
                other => build_key(registry, other)?,
            };
            keys.insert(prop.name().to_string(), key);
        }

        let parent = self.extends.as_deref().unwrap_or(crate::registry::ABSTRACT_NODE);
        let mut entity_type = EntityType::new(self.name.as_str()).extends(parent);
        for (view, names) in &self.views {
            let mut view_keys = Vec::with_capacity(names.len());
            for name in names {
                let key = keys
                    .get(name)
                    .cloned()
                    .or_else(|| registry.property(parent, name))
                    .ok_or_else(|| RegistryError::UnknownProperty {
                        type_name: self.name.clone(),
                        property: name.clone(),
                    })?;
                view_keys.push(key);
            }
            entity_type = entity_type.view(view.as_str(), view_keys);
        }
        entity_type = entity_type.view(ALL_VIEW, keys.values().cloned());

        registry.register(entity_type)?;
        for definition in &self.dynamic {
            registry.define_property(&self.name, definition.clone())?;
        }
        Ok(())
    }
}

fn build_notion(
    registry: &ViewRegistry,
    related_type: &str,
    doc: &NotionDocument,
) -> Result<NotionRef, RegistryError> {
    Ok(match doc {
        NotionDocument::Object => Arc::new(ObjectNotion),
        NotionDocument::Id => Arc::new(IdNotion),
        NotionDocument::Property {
            key,
            create_if_missing,
        } => {
            let target = registry.property(related_type, key).ok_or_else(|| {
                RegistryError::UnknownProperty {
                    type_name: related_type.to_string(),
                    property: key.clone(),
                }
            })?;
            let notion = PropertyNotion::new(target);
            Arc::new(if *create_if_missing {
                notion.create_if_missing()
            } else {
                notion
            })
        }
    })
}

fn build_key(registry: &ViewRegistry, doc: &PropertyDocument) -> Result<PropertyRef, RegistryError> {
    match doc {
        PropertyDocument::Scalar {
            name,
            data_type,
            db_name,
            read_only,
            system,
            not_null,
            not_blank,
            pattern,
            max_length,
            lowercase,
            default_value,
        } => {
            if !data_type.is_scalar() {
                return Err(RegistryError::InvalidDeclaration(format!(
                    "{name}: scalar properties cannot be of type {}",
                    data_type.name()
                )));
            }
            let mut prop = Property::of_type(name.as_str(), *data_type);
            if let Some(db_name) = db_name {
                prop = prop.with_storage_name(db_name.as_str());
            }
            if let Some(default) = default_value {
                prop = prop.with_default(default.clone());
            }
            if *read_only {
                prop = prop.read_only();
            }
            if *system {
                prop = prop.system();
            }
            if *not_null {
                prop = prop.not_null();
            }
            if *not_blank {
                prop = prop.with_constraint(Constraint::NotBlank);
            }
            if let Some(pattern) = pattern {
                let constraint = Constraint::pattern(pattern)
                    .map_err(|e| RegistryError::InvalidDeclaration(format!("{name}: {e}")))?;
                prop = prop.with_constraint(constraint);
            }
            if let Some(max) = max_length {
                prop = prop.with_constraint(Constraint::MaxLength(*max));
            }
            if *lowercase {
                prop = prop.with_database_converter(Arc::new(LowercaseConverter));
            }
            Ok(prop.into_ref())
        }
        PropertyDocument::Collection {
            name,
            related_type,
            relationship,
            direction,
            notion,
            one_to_many,
        } => {
            let mut collection = CollectionProperty::new(
                name.as_str(),
                related_type.as_str(),
                relationship.as_str(),
                *direction,
            )
            .with_notion(build_notion(registry, related_type, notion)?);
            if *one_to_many {
                collection = collection.one_to_many();
            }
            Ok(collection.into_ref())
        }
        PropertyDocument::Entity { name, .. } | PropertyDocument::EntityId { name, .. } => {
            Err(RegistryError::InvalidDeclaration(format!(
                "{name}: entity properties are built with their type"
            )))
        }
    }
}
