//! Property keys
//!
//! A [`PropertyKey`] is the typed accessor for one entity field. Every key
//! carries a [`KeyInfo`] (names, flags, declaring type) and implements the
//! read chain `storage -> memory -> external` and its inverse.
//!
//! # Variants
//!
//! - [`Property`]: scalar value stored on the node
//! - [`IdProperty`] / [`TypeProperty`]: the node's own id and type
//! - [`CollectionProperty`]: related entities through a relationship type
//! - [`EntityProperty`]: at most one related entity, projected via a notion
//! - [`EntityIdProperty`]: read-only id of an [`EntityProperty`] target
//! - [`DynamicProperty`]: user-declared scalar added at runtime

mod builtin;
mod collection;
mod dynamic;
mod entity;
mod entity_id;
mod relation;
mod scalar;

pub use builtin::{IdProperty, TypeProperty};
pub use collection::CollectionProperty;
pub use dynamic::{DynamicProperty, PropertyDefinition};
pub use entity::EntityProperty;
pub use entity_id::EntityIdProperty;
pub use relation::Relation;
pub use scalar::Property;

use crate::constraint::Constraint;
use crate::converter::{
    BooleanConverter, DateConverter, DoubleConverter, IntConverter, LongConverter,
    PropertyConverter,
};
use crate::entity::Entity;
use crate::error::{FrameworkError, ValidationError, ValidationKind};
use crate::notion::Notion;
use crate::session::Session;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use strata_graph::GraphMutation;

/// Shared handle on a property key
pub type PropertyRef = Arc<dyn PropertyKey>;

/// Typed accessor for one entity field
pub trait PropertyKey: Send + Sync + Debug {
    /// Names and flags
    fn info(&self) -> &KeyInfo;

    /// Variant name reported by schema introspection
    fn kind_name(&self) -> &'static str;

    /// Value type of the external representation
    fn value_type(&self) -> ValueType;

    /// Read the external value for an entity
    ///
    /// # Errors
    /// Returns [`FrameworkError::DataIntegrity`] when stored data cannot be
    /// converted, or a store error
    fn get(&self, session: &Session, entity: &Entity) -> Result<Value, FrameworkError>;

    /// Validate and convert an external value into store mutations
    ///
    /// Nothing is written; the caller applies the batch.
    ///
    /// # Errors
    /// Returns [`FrameworkError::Validation`] for client input problems and
    /// [`FrameworkError::DataIntegrity`] when the value cannot be stored
    fn prepare(
        &self,
        session: &Session,
        entity: &Entity,
        value: Value,
    ) -> Result<Vec<GraphMutation>, FrameworkError>;

    /// Prepare and apply a write for this property alone
    ///
    /// # Errors
    /// See [`PropertyKey::prepare`]; store failures are passed through
    fn set(&self, session: &Session, entity: &Entity, value: Value) -> Result<(), FrameworkError> {
        let batch = self.prepare(session, entity, value)?;
        session.store().apply(batch)?;
        Ok(())
    }

    /// Name used as the graph persistence key
    #[inline]
    fn storage_name(&self) -> &str {
        self.info().storage_name()
    }

    /// Name used in views and on the wire
    #[inline]
    fn external_name(&self) -> &str {
        self.info().external_name()
    }

    /// Type that first registered this key
    #[inline]
    fn declaring_type(&self) -> Option<&str> {
        self.info().declaring_type()
    }

    /// Value reported when nothing is stored
    #[inline]
    fn default_value(&self) -> Option<&Value> {
        self.info().default_value()
    }

    /// Check if writes are rejected
    #[inline]
    fn is_read_only(&self) -> bool {
        self.info().is_read_only()
    }

    /// Check if the key is excluded from user-facing validation
    #[inline]
    fn is_system(&self) -> bool {
        self.info().is_system()
    }

    /// Check if the value is a sequence of entities
    #[inline]
    fn is_collection(&self) -> bool {
        false
    }

    /// Relationship backing this key, if any
    #[inline]
    fn relation(&self) -> Option<&Relation> {
        None
    }

    /// Projection used for related entities
    #[inline]
    fn notion(&self) -> Option<&dyn Notion> {
        None
    }

    /// Check if linking a target detaches it from its other sources
    #[inline]
    fn exclusive_targets(&self) -> bool {
        false
    }

    /// Related entity type for relationship-backed keys
    #[inline]
    fn related_type(&self) -> Option<&str> {
        self.relation().map(Relation::related_type)
    }

    /// Memory <-> storage converter
    #[inline]
    fn database_converter(&self) -> Option<&dyn PropertyConverter> {
        None
    }

    /// External <-> memory converter
    #[inline]
    fn input_converter(&self) -> Option<&dyn PropertyConverter> {
        None
    }

    /// Constraints checked on user writes
    #[inline]
    fn constraints(&self) -> &[Constraint] {
        &[]
    }

    /// Type name shown in schema output
    #[inline]
    fn value_type_name(&self) -> &str {
        self.related_type().unwrap_or(self.value_type().name())
    }
}

/// Identity and flags of a property key
#[derive(Debug, Clone)]
pub struct KeyInfo {
    storage_name: String,
    external_name: String,
    declaring_type: OnceCell<String>,
    default_value: Option<Value>,
    read_only: bool,
    system: bool,
}

impl KeyInfo {
    /// Create info with identical storage and external names
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            storage_name: name.clone(),
            external_name: name,
            declaring_type: OnceCell::new(),
            default_value: None,
            read_only: false,
            system: false,
        }
    }

    /// Storage name
    #[inline]
    #[must_use]
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    /// External name
    #[inline]
    #[must_use]
    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    /// Declaring type, once registered
    #[inline]
    #[must_use]
    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.get().map(String::as_str)
    }

    /// Default value
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Read-only flag
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// System flag
    #[inline]
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.system
    }

    /// Record the declaring type; the first registration wins
    pub fn declare(&self, type_name: &str) {
        let _ = self.declaring_type.set(type_name.to_string());
    }

    pub(crate) fn set_storage_name(&mut self, name: impl Into<String>) {
        self.storage_name = name.into();
    }

    pub(crate) fn set_default(&mut self, value: Value) {
        self.default_value = Some(value);
    }

    pub(crate) fn set_read_only(&mut self) {
        self.read_only = true;
    }

    pub(crate) fn set_system(&mut self) {
        self.system = true;
    }
}

/// Value types of external representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// UTF-8 string
    String,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    Long,
    /// Floating point number
    Double,
    /// Boolean
    Boolean,
    /// RFC 3339 timestamp
    Date,
    /// Single related entity
    Entity,
    /// Sequence of related entities
    Collection,
}

impl ValueType {
    /// Type name as reported by introspection
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::Entity => "Entity",
            Self::Collection => "Collection",
        }
    }

    /// Check if a memory value is acceptable for this type (null always is)
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::String, Value::String(_)) | (Self::Boolean, Value::Bool(_)) => true,
            (Self::Integer, Value::Number(n)) => {
                n.as_i64().is_some_and(|v| i32::try_from(v).is_ok())
            }
            (Self::Long, Value::Number(n)) => n.as_i64().is_some(),
            (Self::Double, Value::Number(_)) => true,
            (Self::Date, Value::String(s)) => DateConverter::parse_millis(s).is_some(),
            _ => false,
        }
    }

    /// Check if values of this type have a numeric ordering
    #[inline]
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Long | Self::Double)
    }

    /// Check if a range search is meaningful
    #[inline]
    #[must_use]
    pub fn is_rangeable(self) -> bool {
        self.is_numeric() || self == Self::Date
    }

    /// Check if the type describes a scalar stored on the node
    #[inline]
    #[must_use]
    pub fn is_scalar(self) -> bool {
        !matches!(self, Self::Entity | Self::Collection)
    }

    /// Input converter scalar properties of this type get by default
    #[must_use]
    pub fn default_input_converter(self) -> Option<Arc<dyn PropertyConverter>> {
        match self {
            Self::Integer => Some(Arc::new(IntConverter)),
            Self::Long => Some(Arc::new(LongConverter)),
            Self::Double => Some(Arc::new(DoubleConverter)),
            Self::Boolean => Some(Arc::new(BooleanConverter)),
            _ => None,
        }
    }

    /// Database converter scalar properties of this type get by default
    #[must_use]
    pub fn default_database_converter(self) -> Option<Arc<dyn PropertyConverter>> {
        match self {
            Self::Date => Some(Arc::new(DateConverter)),
            _ => None,
        }
    }
}

/// Validation error for `key` on `entity`
pub(crate) fn invalid(key: &dyn PropertyKey, entity: &Entity, kind: ValidationKind) -> FrameworkError {
    ValidationError::new(entity.type_name(), key.external_name(), kind).into()
}

/// Data-integrity error for `key` on `entity`
pub(crate) fn corrupt(key: &dyn PropertyKey, entity: &Entity, message: impl Into<String>) -> FrameworkError {
    FrameworkError::data_integrity(entity.type_name(), key.external_name(), message)
}
