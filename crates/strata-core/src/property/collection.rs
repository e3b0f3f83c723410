//! Collection properties: every related entity through one relationship type

use super::relation::check_writable;
use super::{invalid, KeyInfo, PropertyKey, PropertyRef, Relation, ValueType};
use crate::entity::Entity;
use crate::error::{FrameworkError, ValidationKind};
use crate::notion::{Notion, NotionRef, ObjectNotion};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;
use strata_graph::{Direction, GraphMutation, RelationshipType};

/// Sequence of related entities, projected through a notion
///
/// Writes replace the whole relationship set: relationships to entities not
/// in the new value are removed, missing ones are created.
#[derive(Debug, Clone)]
pub struct CollectionProperty {
    info: KeyInfo,
    relation: Relation,
    notion: NotionRef,
    one_to_many: bool,
}

impl CollectionProperty {
    /// Create a collection projected with [`ObjectNotion`]
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        related_type: impl Into<String>,
        rel_type: impl Into<RelationshipType>,
        direction: Direction,
    ) -> Self {
        Self {
            info: KeyInfo::new(name),
            relation: Relation::new(related_type, rel_type, direction),
            notion: Arc::new(ObjectNotion),
            one_to_many: false,
        }
    }

    /// Use a different notion
    #[inline]
    #[must_use]
    pub fn with_notion(mut self, notion: NotionRef) -> Self {
        self.notion = notion;
        self
    }

    /// A target may belong to one source only
    #[inline]
    #[must_use]
    pub fn one_to_many(mut self) -> Self {
        self.one_to_many = true;
        self
    }

    /// Reject writes
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.info.set_read_only();
        self
    }

    /// Wrap into a shared key
    #[inline]
    #[must_use]
    pub fn into_ref(self) -> PropertyRef {
        Arc::new(self)
    }

    /// Check the one-to-many flag
    #[inline]
    #[must_use]
    pub fn is_one_to_many(&self) -> bool {
        self.one_to_many
    }
}

impl PropertyKey for CollectionProperty {
    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn kind_name(&self) -> &'static str {
        "CollectionProperty"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Collection
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn relation(&self) -> Option<&Relation> {
        Some(&self.relation)
    }

    fn notion(&self) -> Option<&dyn Notion> {
        Some(self.notion.as_ref())
    }

    fn exclusive_targets(&self) -> bool {
        self.one_to_many
    }

    fn get(&self, session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        let related = self.relation.related(session, entity)?;
        Ok(Value::Array(
            related
                .iter()
                .map(|target| self.notion.project(session, target))
                .collect(),
        ))
    }

    fn prepare(
        &self,
        session: &Session,
        entity: &Entity,
        value: Value,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        check_writable(self, entity)?;

        let values = match value {
            Value::Null => Vec::new(),
            Value::Array(values) => values,
            other => {
                return Err(invalid(
                    self,
                    entity,
                    ValidationKind::InvalidInput(format!("expected an array, got {other}")),
                ))
            }
        };

        let (targets, mut batch) =
            self.relation
                .resolve_targets(session, self, entity, &values, self.notion.as_ref())?;
        batch.push(self.relation.replace(entity, targets, self.exclusive_targets()));
        Ok(batch)
    }
}
