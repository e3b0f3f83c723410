//! Single-entity properties: at most one related entity

use super::relation::check_writable;
use super::{invalid, KeyInfo, PropertyKey, Relation, ValueType};
use crate::entity::Entity;
use crate::error::{FrameworkError, ValidationKind};
use crate::notion::{Notion, NotionRef, ObjectNotion};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;
use strata_graph::{Direction, GraphMutation, RelationshipType};

/// Zero or one related entity, projected through a notion
///
/// More than one stored match is a data-integrity problem: it is logged and
/// the first match is returned.
#[derive(Debug, Clone)]
pub struct EntityProperty {
    info: KeyInfo,
    relation: Relation,
    notion: NotionRef,
    one_to_one: bool,
}

impl EntityProperty {
    /// Create a single-entity property projected with [`ObjectNotion`]
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
            one_to_one: false,
        }
    }

    /// Use a different notion
    #[inline]
    #[must_use]
    pub fn with_notion(mut self, notion: NotionRef) -> Self {
        self.notion = notion;
        self
    }

    /// The target may be linked from this source only
    #[inline]
    #[must_use]
    pub fn one_to_one(mut self) -> Self {
        self.one_to_one = true;
        self
    }

    /// Reject writes
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.info.set_read_only();
        self
    }

    /// Wrap into a shared handle (kept typed so derived-id keys can pair with it)
    #[inline]
    #[must_use]
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Check the one-to-one flag
    #[inline]
    #[must_use]
    pub fn is_one_to_one(&self) -> bool {
        self.one_to_one
    }

    /// The related entity, if any
    ///
    /// # Errors
    /// Returns a store error if `entity` does not exist
    pub fn related_entity(
        &self,
        session: &Session,
        entity: &Entity,
    ) -> Result<Option<Entity>, FrameworkError> {
        let mut related = self.relation.related(session, entity)?;
        if related.len() > 1 {
            tracing::warn!(
                %entity,
                property = self.external_name(),
                count = related.len(),
                "data integrity: more than one related entity, using the first"
            );
        }
        Ok(if related.is_empty() {
            None
        } else {
            Some(related.swap_remove(0))
        })
    }
}

impl PropertyKey for EntityProperty {
    fn info(&self) -> &KeyInfo {
        &self.info
    }

    fn kind_name(&self) -> &'static str {
        "EntityProperty"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Entity
    }

    fn relation(&self) -> Option<&Relation> {
        Some(&self.relation)
    }

    fn notion(&self) -> Option<&dyn Notion> {
        Some(self.notion.as_ref())
    }

    fn exclusive_targets(&self) -> bool {
        self.one_to_one
    }

    fn get(&self, session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        Ok(self
            .related_entity(session, entity)?
            .map_or(Value::Null, |target| self.notion.project(session, &target)))
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
            Value::Array(values) if values.len() > 1 => {
                return Err(invalid(
                    self,
                    entity,
                    ValidationKind::Cardinality(values.len()),
                ))
            }
            Value::Array(values) => values,
            single => vec![single],
        };

        let (targets, mut batch) =
            self.relation
                .resolve_targets(session, self, entity, &values, self.notion.as_ref())?;
        batch.push(self.relation.replace(entity, targets, self.exclusive_targets()));
        Ok(batch)
    }
}
