//! Relationship traversal shared by relationship-backed properties

use super::{invalid, PropertyKey};
use crate::entity::{Entity, NodeFactory};
use crate::error::{ErrorBuffer, FrameworkError, ValidationError};
use crate::notion::{Notion, NotionError};
use crate::session::Session;
use serde_json::Value;
use strata_graph::{Direction, GraphMutation, NodeId, RelationshipType};

/// Relationship type, direction and target type of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    related_type: String,
    rel_type: RelationshipType,
    direction: Direction,
}

impl Relation {
    /// Create relation
    #[inline]
    #[must_use]
    pub fn new(
        related_type: impl Into<String>,
        rel_type: impl Into<RelationshipType>,
        direction: Direction,
    ) -> Self {
        Self {
            related_type: related_type.into(),
            rel_type: rel_type.into(),
            direction,
        }
    }

    /// Target entity type
    #[inline]
    #[must_use]
    pub fn related_type(&self) -> &str {
        &self.related_type
    }

    /// Relationship type
    #[inline]
    #[must_use]
    pub fn rel_type(&self) -> &RelationshipType {
        &self.rel_type
    }

    /// Direction seen from the owning entity
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Related entities, in relationship creation order
    ///
    /// Endpoints that are not of the related type (or a subtype) are skipped.
    /// Dangling endpoints are logged and skipped.
    ///
    /// # Errors
    /// Returns a store error if `entity` does not exist
    pub fn related(&self, session: &Session, entity: &Entity) -> Result<Vec<Entity>, FrameworkError> {
        let ids = session
            .store()
            .traverse(entity.id(), &self.rel_type, self.direction)?;

        let registry = session.registry();
        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            match session.store().node(&id) {
                Some(node) if registry.is_subtype(&node.type_name, &self.related_type) => {
                    nodes.push(node);
                }
                Some(_) => {}
                None => {
                    tracing::warn!(%entity, target = %id, rel_type = %self.rel_type, "broken relationship target");
                }
            }
        }
        Ok(NodeFactory::bulk_instantiate(nodes))
    }

    /// Resolve client values into target ids through a notion
    ///
    /// Every unresolvable value is collected; the returned mutations create
    /// targets that did not exist yet.
    ///
    /// # Errors
    /// Returns [`FrameworkError::Validation`] listing every bad value, or a
    /// store error
    pub fn resolve_targets(
        &self,
        session: &Session,
        owner: &dyn PropertyKey,
        entity: &Entity,
        values: &[Value],
        notion: &dyn Notion,
    ) -> Result<(Vec<NodeId>, Vec<GraphMutation>), FrameworkError> {
        let mut errors = ErrorBuffer::new();
        let mut targets = Vec::with_capacity(values.len());
        let mut pending = Vec::new();

        for value in values {
            match notion.resolve(session, &self.related_type, value) {
                Ok(resolved) => {
                    targets.push(resolved.entity.id().clone());
                    pending.extend(resolved.pending);
                }
                Err(NotionError::Store(error)) => return Err(error.into()),
                Err(error) => {
                    if let Some(kind) = error.validation_kind() {
                        errors.add(ValidationError::new(
                            entity.type_name(),
                            owner.external_name(),
                            kind,
                        ));
                    }
                }
            }
        }

        errors.into_result()?;
        Ok((targets, pending))
    }

    /// Replace-not-merge write of the relationship set
    #[must_use]
    pub fn replace(&self, entity: &Entity, targets: Vec<NodeId>, exclusive: bool) -> GraphMutation {
        GraphMutation::ReplaceRelationships {
            node: entity.id().clone(),
            rel_type: self.rel_type.clone(),
            direction: self.direction,
            targets,
            exclusive_targets: exclusive,
        }
    }
}

/// Reject writes on read-only relationship properties
pub(super) fn check_writable(key: &dyn PropertyKey, entity: &Entity) -> Result<(), FrameworkError> {
    if key.is_read_only() {
        Err(invalid(key, entity, crate::error::ValidationKind::ReadOnly))
    } else {
        Ok(())
    }
}
