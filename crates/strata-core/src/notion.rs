//! Notions: projection strategies for relationship-valued properties
//!
//! A [`Notion`] collapses a related entity into a compact value on read and
//! resolves such a value back into an entity reference on write.
//!
//! - [`PropertyNotion`]: the value of one property of the related entity
//! - [`IdNotion`]: the related node id as a string
//! - [`ObjectNotion`]: a `{ "id", "type" }` object (bare ids accepted on write)
//!
//! `project` never fails for a well-formed entity; `resolve` is partial and
//! reports [`NotionError::TargetNotFound`] for values matching nothing.

use crate::entity::Entity;
use crate::error::ValidationKind;
use crate::property::PropertyRef;
use crate::session::Session;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::sync::Arc;
use strata_graph::{GraphMutation, NodeId, PropertyMap, StoreError};

/// Shared handle on a notion
pub type NotionRef = Arc<dyn Notion>;

/// Projection strategy between an entity and its compact form
pub trait Notion: Send + Sync + Debug {
    /// Notion name reported by introspection
    fn name(&self) -> &'static str;

    /// Compact form of an entity; total over well-formed entities
    fn project(&self, session: &Session, entity: &Entity) -> Value;

    /// Entity identified by a compact value, scoped to `related_type`
    ///
    /// # Errors
    /// Returns [`NotionError`] when the value identifies no suitable entity
    fn resolve(
        &self,
        session: &Session,
        related_type: &str,
        value: &Value,
    ) -> Result<Resolved, NotionError>;
}

/// Outcome of [`Notion::resolve`]
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Target entity
    pub entity: Entity,
    /// Mutations needed before the target exists (create-if-missing)
    pub pending: Vec<GraphMutation>,
}

impl Resolved {
    /// Existing entity, no pending writes
    #[inline]
    #[must_use]
    pub fn existing(entity: Entity) -> Self {
        Self {
            entity,
            pending: Vec::new(),
        }
    }
}

/// Notion resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotionError {
    /// Value matches no entity
    #[error("no {type_name} matches {value}")]
    TargetNotFound {
        /// Related type searched
        type_name: String,
        /// Compact value
        value: Value,
    },

    /// Value matches several entities
    #[error("{count} {type_name} entities match {value}")]
    Ambiguous {
        /// Related type searched
        type_name: String,
        /// Compact value
        value: Value,
        /// Number of matches
        count: usize,
    },

    /// Entity exists but is not of the related type
    #[error("expected {expected}, found {found}")]
    WrongType {
        /// Related type
        expected: String,
        /// Actual type
        found: String,
    },

    /// Value has the wrong shape for this notion
    #[error("invalid value for {notion}: {value}")]
    InvalidValue {
        /// Notion name
        notion: &'static str,
        /// Offending value
        value: Value,
    },

    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl NotionError {
    /// Validation kind reported to the client on writes
    ///
    /// Returns `None` for store failures, which are not client errors.
    #[must_use]
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        match self {
            Self::TargetNotFound { .. } => Some(ValidationKind::TargetNotFound(self.to_string())),
            Self::WrongType { expected, found } => Some(ValidationKind::WrongTargetType {
                expected: expected.clone(),
                found: found.clone(),
            }),
            Self::Ambiguous { .. } | Self::InvalidValue { .. } => {
                Some(ValidationKind::InvalidInput(self.to_string()))
            }
            Self::Store(_) => None,
        }
    }
}

/// Look up a node by id and check it belongs to `related_type`
fn resolve_id(session: &Session, related_type: &str, id: &str) -> Result<Resolved, NotionError> {
    let node = session
        .store()
        .node(&NodeId::from(id))
        .ok_or_else(|| NotionError::TargetNotFound {
            type_name: related_type.to_string(),
            value: Value::String(id.to_string()),
        })?;

    if !session.registry().is_subtype(&node.type_name, related_type) {
        return Err(NotionError::WrongType {
            expected: related_type.to_string(),
            found: node.type_name,
        });
    }

    Ok(Resolved::existing(Entity::new(node.id, node.type_name)))
}

/// Projects related entities onto their node id
#[derive(Debug, Clone, Copy, Default)]
pub struct IdNotion;

impl Notion for IdNotion {
    fn name(&self) -> &'static str {
        "IdNotion"
    }

    fn project(&self, _session: &Session, entity: &Entity) -> Value {
        Value::String(entity.id().to_string())
    }

    fn resolve(
        &self,
        session: &Session,
        related_type: &str,
        value: &Value,
    ) -> Result<Resolved, NotionError> {
        match value {
            Value::String(id) => resolve_id(session, related_type, id),
            other => Err(NotionError::InvalidValue {
                notion: self.name(),
                value: other.clone(),
            }),
        }
    }
}

/// Projects related entities onto `{ "id": .., "type": .. }`
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectNotion;

impl Notion for ObjectNotion {
    fn name(&self) -> &'static str {
        "ObjectNotion"
    }

    fn project(&self, _session: &Session, entity: &Entity) -> Value {
        json!({ "id": entity.id().as_str(), "type": entity.type_name() })
    }

    fn resolve(
        &self,
        session: &Session,
        related_type: &str,
        value: &Value,
    ) -> Result<Resolved, NotionError> {
        let id = match value {
            Value::String(id) => Some(id.as_str()),
            Value::Object(map) => map.get("id").and_then(Value::as_str),
            _ => None,
        };
        match id {
            Some(id) => resolve_id(session, related_type, id),
            None => Err(NotionError::InvalidValue {
                notion: self.name(),
                value: value.clone(),
            }),
        }
    }
}

/// Projects related entities onto the value of one of their properties
///
/// Resolution searches the related type (subtypes included) for the single
/// entity carrying the value. With `create_if_missing`, an unmatched value
/// yields a new entity instead of an error; its creation is returned as
/// pending mutations so it lands in the same batch as the link.
#[derive(Debug, Clone)]
pub struct PropertyNotion {
    key: PropertyRef,
    create_if_missing: bool,
}

impl PropertyNotion {
    /// Project onto `key`
    #[inline]
    #[must_use]
    pub fn new(key: PropertyRef) -> Self {
        Self {
            key,
            create_if_missing: false,
        }
    }

    /// Create the related entity when no match exists
    #[inline]
    #[must_use]
    pub fn create_if_missing(mut self) -> Self {
        self.create_if_missing = true;
        self
    }

    /// Projected key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &PropertyRef {
        &self.key
    }

    fn create(
        &self,
        session: &Session,
        related_type: &str,
        value: &Value,
    ) -> Result<Resolved, NotionError> {
        let entity = Entity::new(NodeId::new(), related_type);
        let mut pending = vec![GraphMutation::CreateNode {
            id: entity.id().clone(),
            type_name: related_type.to_string(),
            properties: PropertyMap::new(),
        }];
        let writes = self
            .key
            .prepare(session, &entity, value.clone())
            .map_err(|_| NotionError::InvalidValue {
                notion: self.name(),
                value: value.clone(),
            })?;
        pending.extend(writes);
        tracing::debug!(%entity, "creating missing notion target");
        Ok(Resolved { entity, pending })
    }
}

impl Notion for PropertyNotion {
    fn name(&self) -> &'static str {
        "PropertyNotion"
    }

    fn project(&self, session: &Session, entity: &Entity) -> Value {
        match self.key.get(session, entity) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%entity, key = self.key.external_name(), %error, "notion projection degraded to null");
                Value::Null
            }
        }
    }

    fn resolve(
        &self,
        session: &Session,
        related_type: &str,
        value: &Value,
    ) -> Result<Resolved, NotionError> {
        if value.is_null() {
            return Err(NotionError::InvalidValue {
                notion: self.name(),
                value: Value::Null,
            });
        }

        let mut matches: Vec<Entity> = session
            .entities_of_type(related_type)
            .into_iter()
            .filter(|candidate| {
                self.key
                    .get(session, candidate)
                    .is_ok_and(|projected| &projected == value)
            })
            .collect();

        match matches.len() {
            1 => Ok(Resolved::existing(matches.remove(0))),
            0 if self.create_if_missing => self.create(session, related_type, value),
            0 => Err(NotionError::TargetNotFound {
                type_name: related_type.to_string(),
                value: value.clone(),
            }),
            count => Err(NotionError::Ambiguous {
                type_name: related_type.to_string(),
                value: value.clone(),
                count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        let not_found = NotionError::TargetNotFound {
            type_name: "Company".into(),
            value: json!("Acme"),
        };
        assert!(matches!(
            not_found.validation_kind(),
            Some(ValidationKind::TargetNotFound(msg)) if msg == "no Company matches \"Acme\""
        ));

        let wrong = NotionError::WrongType {
            expected: "Company".into(),
            found: "Person".into(),
        };
        assert_eq!(
            wrong.validation_kind(),
            Some(ValidationKind::WrongTargetType {
                expected: "Company".into(),
                found: "Person".into()
            })
        );

        let store = NotionError::Store(StoreError::NodeNotFound("x".into()));
        assert_eq!(store.validation_kind(), None);
    }

    #[test]
    fn resolved_existing_has_no_pending() {
        let r = Resolved::existing(Entity::new("1".into(), "Person"));
        assert!(r.pending.is_empty());
    }
}
