//! Scalar properties stored directly on the node

use super::{corrupt, invalid, KeyInfo, PropertyKey, PropertyRef, ValueType};
use crate::constraint::Constraint;
use crate::converter::PropertyConverter;
use crate::entity::Entity;
use crate::error::{FrameworkError, ValidationKind};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;
use strata_graph::GraphMutation;

/// Scalar property
///
/// # Examples
/// ```rust
/// use strata_core::{Property, PropertyKey};
///
/// let age = Property::integer("age").with_storage_name("_age").not_null();
/// assert_eq!(age.storage_name(), "_age");
/// assert_eq!(age.external_name(), "age");
/// assert_eq!(age.input_converter().map(|c| c.name()), Some("IntConverter"));
/// ```
#[derive(Debug, Clone)]
pub struct Property {
    info: KeyInfo,
    value_type: ValueType,
    database_converter: Option<Arc<dyn PropertyConverter>>,
    input_converter: Option<Arc<dyn PropertyConverter>>,
    constraints: Vec<Constraint>,
}

impl Property {
    /// Scalar property of the given type with the type's default converters
    #[must_use]
    pub fn of_type(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            info: KeyInfo::new(name),
            value_type,
            database_converter: value_type.default_database_converter(),
            input_converter: value_type.default_input_converter(),
            constraints: Vec::new(),
        }
    }

    /// String property
    #[inline]
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::of_type(name, ValueType::String)
    }

    /// 32-bit integer property
    #[inline]
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::of_type(name, ValueType::Integer)
    }

    /// 64-bit integer property
    #[inline]
    #[must_use]
    pub fn long(name: impl Into<String>) -> Self {
        Self::of_type(name, ValueType::Long)
    }

    /// Floating point property
    #[inline]
    #[must_use]
    pub fn double(name: impl Into<String>) -> Self {
        Self::of_type(name, ValueType::Double)
    }

    /// Boolean property
    #[inline]
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::of_type(name, ValueType::Boolean)
    }

    /// Timestamp property (epoch millis in storage)
    #[inline]
    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::of_type(name, ValueType::Date)
    }

    /// Use a different graph persistence key
    #[inline]
    #[must_use]
    pub fn with_storage_name(mut self, name: impl Into<String>) -> Self {
        self.info.set_storage_name(name);
        self
    }

    /// Value reported when nothing is stored (memory representation)
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.info.set_default(value);
        self
    }

    /// Reject writes
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.info.set_read_only();
        self
    }

    /// Exclude from user-facing validation
    #[inline]
    #[must_use]
    pub fn system(mut self) -> Self {
        self.info.set_system();
        self
    }

    /// Replace the input converter
    #[inline]
    #[must_use]
    pub fn with_input_converter(mut self, converter: Arc<dyn PropertyConverter>) -> Self {
        self.input_converter = Some(converter);
        self
    }

    /// Replace the database converter
    #[inline]
    #[must_use]
    pub fn with_database_converter(mut self, converter: Arc<dyn PropertyConverter>) -> Self {
        self.database_converter = Some(converter);
        self
    }

    /// Add a constraint
    #[inline]
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Shorthand for [`Constraint::NotNull`]
    #[inline]
    #[must_use]
    pub fn not_null(self) -> Self {
        self.with_constraint(Constraint::NotNull)
    }

    /// Wrap into a shared key
    #[inline]
    #[must_use]
    pub fn into_ref(self) -> PropertyRef {
        Arc::new(self)
    }

    /// Apply memory -> external conversion
    ///
    /// # Errors
    /// Returns error if the input converter rejects the value
    pub fn to_external(&self, entity: &Entity, memory: Value) -> Result<Value, FrameworkError> {
        match &self.input_converter {
            Some(converter) => converter
                .revert(memory)
                .map_err(|e| corrupt(self, entity, e.to_string())),
            None => Ok(memory),
        }
    }

    /// Apply external -> memory conversion and type/constraint checks
    ///
    /// # Errors
    /// Returns a validation error describing the rejected input
    pub fn to_memory(&self, entity: &Entity, external: Value) -> Result<Value, FrameworkError> {
        let memory = match &self.input_converter {
            Some(converter) => converter
                .convert(external)
                .map_err(|e| invalid(self, entity, ValidationKind::InvalidInput(e.message)))?,
            None => external,
        };

        if !self.value_type.accepts(&memory) {
            return Err(invalid(
                self,
                entity,
                ValidationKind::InvalidInput(format!("expected {}", self.value_type.name())),
            ));
        }

        if !self.is_system() {
            for constraint in &self.constraints {
                constraint
                    .check(&memory)
                    .map_err(|msg| invalid(self, entity, ValidationKind::Constraint(msg)))?;
            }
        }

        Ok(memory)
    }
}

impl PropertyKey for Property {
    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn kind_name(&self) -> &'static str {
        match self.value_type {
            ValueType::Integer => "IntProperty",
            ValueType::Long => "LongProperty",
            ValueType::Double => "DoubleProperty",
            ValueType::Boolean => "BooleanProperty",
            ValueType::Date => "DateProperty",
            _ => "StringProperty",
        }
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn database_converter(&self) -> Option<&dyn PropertyConverter> {
        self.database_converter.as_deref()
    }

    fn input_converter(&self) -> Option<&dyn PropertyConverter> {
        self.input_converter.as_deref()
    }

    fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    fn get(&self, session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        let stored = session
            .store()
            .get_stored_value(entity.id(), self.storage_name())?;

        let memory = match (stored, &self.database_converter) {
            (Some(stored), Some(converter)) => converter
                .revert(stored)
                .map_err(|e| corrupt(self, entity, e.to_string()))?,
            (Some(stored), None) => stored,
            (None, _) => self.default_value().cloned().unwrap_or(Value::Null),
        };

        if !self.value_type.accepts(&memory) {
            return Err(corrupt(
                self,
                entity,
                format!("stored value {memory} is not a {}", self.value_type.name()),
            ));
        }

        self.to_external(entity, memory)
    }

    fn prepare(
        &self,
        _session: &Session,
        entity: &Entity,
        value: Value,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        if self.is_read_only() {
            return Err(invalid(self, entity, ValidationKind::ReadOnly));
        }

        let memory = self.to_memory(entity, value)?;

        let stored = match (&self.database_converter, memory) {
            (_, Value::Null) => None,
            (Some(converter), memory) => Some(
                converter
                    .convert(memory)
                    .map_err(|e| corrupt(self, entity, e.to_string()))?,
            ),
            (None, memory) => Some(memory),
        };

        Ok(vec![GraphMutation::SetValue {
            node: entity.id().clone(),
            key: self.storage_name().to_string(),
            value: stored,
        }])
    }
}
