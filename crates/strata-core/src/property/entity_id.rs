//! Derived-id properties

use super::{invalid, EntityProperty, KeyInfo, PropertyKey, PropertyRef, ValueType};
use crate::entity::Entity;
use crate::error::{FrameworkError, ValidationKind};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;
use strata_graph::GraphMutation;

/// Node id of the entity behind an [`EntityProperty`]
///
/// Owns no relationship and caches nothing. Reads ask the paired property
/// for its related entity and report that entity's node id, whatever the
/// paired notion projects. Always read-only; writes go through the paired
/// property.
#[derive(Debug, Clone)]
pub struct EntityIdProperty {
    info: KeyInfo,
    entity_property: Arc<EntityProperty>,
}

impl EntityIdProperty {
    /// Expose the target id of `entity_property` as `name`
    #[must_use]
    pub fn new(name: impl Into<String>, entity_property: Arc<EntityProperty>) -> Self {
        let mut info = KeyInfo::new(name);
        info.set_read_only();
        Self {
            info,
            entity_property,
        }
    }

    /// Paired single-entity property
    #[inline]
    #[must_use]
    pub fn entity_property(&self) -> &Arc<EntityProperty> {
        &self.entity_property
    }

    /// Wrap into a shared key
    #[inline]
    #[must_use]
    pub fn into_ref(self) -> PropertyRef {
        Arc::new(self)
    }
}

impl PropertyKey for EntityIdProperty {
    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn kind_name(&self) -> &'static str {
        "EntityIdProperty"
    }

    fn value_type(&self) -> ValueType {
        ValueType::String
    }

    fn get(&self, session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        Ok(self
            .entity_property
            .related_entity(session, entity)?
            .map_or(Value::Null, |target| Value::String(target.id().to_string())))
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
