//! Node identity properties shared by every entity type

use super::{invalid, KeyInfo, PropertyKey, ValueType};
use crate::entity::Entity;
use crate::error::{FrameworkError, ValidationKind};
use crate::session::Session;
use serde_json::Value;
use strata_graph::GraphMutation;

/// The node id (`id`)
#[derive(Debug, Clone)]
pub struct IdProperty {
    info: KeyInfo,
}

impl IdProperty {
    /// Create the id property
    #[must_use]
    pub fn new() -> Self {
        let mut info = KeyInfo::new("id");
        info.set_read_only();
        info.set_system();
        Self { info }
    }
}

impl Default for IdProperty {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyKey for IdProperty {
    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn kind_name(&self) -> &'static str {
        "IdProperty"
    }

    fn value_type(&self) -> ValueType {
        ValueType::String
    }

    fn get(&self, _session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        Ok(Value::String(entity.id().to_string()))
    }

    fn prepare(
        &self,
        _session: &Session,
        entity: &Entity,
        _value: Value,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        Err(invalid(self, entity, ValidationKind::ReadOnly))
    }
}

/// The node's entity type (`type`)
#[derive(Debug, Clone)]
pub struct TypeProperty {
    info: KeyInfo,
}

impl TypeProperty {
    /// Create the type property
    #[must_use]
    pub fn new() -> Self {
        let mut info = KeyInfo::new("type");
        info.set_read_only();
        info.set_system();
        Self { info }
    }
}

impl Default for TypeProperty {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyKey for TypeProperty {
    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn kind_name(&self) -> &'static str {
        "TypeProperty"
    }

    fn value_type(&self) -> ValueType {
        ValueType::String
    }

    fn get(&self, _session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        Ok(Value::String(entity.type_name().to_string()))
    }

    fn prepare(
        &self,
        _session: &Session,
        entity: &Entity,
        _value: Value,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        Err(invalid(self, entity, ValidationKind::ReadOnly))
    }
}
