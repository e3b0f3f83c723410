//! Per-request context
//!
//! A [`Session`] bundles the caller's [`SecurityContext`], the graph store and
//! the view registry. Property keys receive it on every call; resources own
//! one for the lifetime of a request.

use crate::context::SecurityContext;
use crate::entity::{Entity, NodeFactory};
use crate::error::{ErrorBuffer, FrameworkError, ValidationError, ValidationKind};
use crate::property::{invalid, PropertyKey, PropertyRef};
use crate::registry::{ViewRegistry, ALL_VIEW};
use serde_json::{Map, Value};
use std::sync::Arc;
use strata_graph::{GetAllNodes, GraphMutation, GraphStore, NodeId, PropertyMap};

/// Request-scoped access to store and registry
#[derive(Debug, Clone)]
pub struct Session {
    security: SecurityContext,
    store: Arc<dyn GraphStore>,
    registry: Arc<ViewRegistry>,
}

impl Session {
    /// Anonymous session
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>, registry: Arc<ViewRegistry>) -> Self {
        Self {
            security: SecurityContext::anonymous(),
            store,
            registry,
        }
    }

    /// Replace the security context
    #[inline]
    #[must_use]
    pub fn with_security(mut self, security: SecurityContext) -> Self {
        self.security = security;
        self
    }

    /// Caller identity
    #[inline]
    #[must_use]
    pub fn security(&self) -> &SecurityContext {
        &self.security
    }

    /// Graph store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    /// View registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Entity handle for a node id
    ///
    /// # Errors
    /// Returns [`FrameworkError::NotFound`] if no such node exists
    pub fn entity(&self, id: &NodeId) -> Result<Entity, FrameworkError> {
        self.store
            .node(id)
            .map(|node| NodeFactory::instantiate(&node))
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    /// Entity handle for a node id that must be of `type_name` (or a subtype)
    ///
    /// # Errors
    /// Returns [`FrameworkError::NotFound`] if the node is missing or of
    /// another type
    pub fn entity_of_type(&self, id: &NodeId, type_name: &str) -> Result<Entity, FrameworkError> {
        let entity = self.entity(id)?;
        if self.registry.is_subtype(entity.type_name(), type_name) {
            Ok(entity)
        } else {
            Err(FrameworkError::NotFound(format!("{type_name} {id}")))
        }
    }

    /// Every entity of `type_name` or one of its subtypes, in store order
    #[must_use]
    pub fn entities_of_type(&self, type_name: &str) -> Vec<Entity> {
        let types = self.registry.snapshot().subtypes(type_name);
        NodeFactory::bulk_instantiate(GetAllNodes::of_types(types).execute(self.store()))
    }

    /// Property of an entity type by external name
    ///
    /// # Errors
    /// Returns a validation error of kind [`ValidationKind::UnknownProperty`]
    pub fn property(&self, type_name: &str, name: &str) -> Result<PropertyRef, FrameworkError> {
        self.registry.property(type_name, name).ok_or_else(|| {
            ValidationError::new(type_name, name, ValidationKind::UnknownProperty).into()
        })
    }

    /// External value of one property
    ///
    /// # Errors
    /// Returns error if the property is unknown or its value cannot be read
    pub fn get(&self, entity: &Entity, name: &str) -> Result<Value, FrameworkError> {
        self.property(entity.type_name(), name)?.get(self, entity)
    }

    /// Serialize an entity through a view
    ///
    /// Fields whose stored data violates its mapping degrade to null (logged);
    /// other failures abort the read.
    ///
    /// # Errors
    /// Returns error for unknown types and store failures
    pub fn read_view(&self, entity: &Entity, view: &str) -> Result<Map<String, Value>, FrameworkError> {
        let keys = self.registry.properties_for(entity.type_name(), view)?;
        let mut out = Map::with_capacity(keys.len());
        for key in keys {
            let value = match key.get(self, entity) {
                Ok(value) => value,
                Err(error) if error.is_data_integrity() => {
                    tracing::warn!(%entity, property = key.external_name(), %error, "degraded field to null");
                    Value::Null
                }
                Err(error) => return Err(error),
            };
            out.insert(key.external_name().to_string(), value);
        }
        Ok(out)
    }

    /// Prepare writes for several properties, collecting every validation error
    fn prepare_all(
        &self,
        entity: &Entity,
        values: &Map<String, Value>,
        errors: &mut ErrorBuffer,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        let mut batch = Vec::new();
        for (name, value) in values {
            let key = match self.property(entity.type_name(), name) {
                Ok(key) => key,
                Err(FrameworkError::Validation(buffer)) => {
                    errors.absorb(buffer);
                    continue;
                }
                Err(other) => return Err(other),
            };
            match key.prepare(self, entity, value.clone()) {
                Ok(mutations) => batch.extend(mutations),
                Err(FrameworkError::Validation(buffer)) => errors.absorb(buffer),
                Err(other) => return Err(other),
            }
        }
        Ok(batch)
    }

    /// Write several properties atomically
    ///
    /// Every property is validated first; if any fails, nothing is written
    /// and all errors are reported together.
    ///
    /// # Errors
    /// Returns [`FrameworkError::Validation`] with every problem found, or a
    /// data-integrity / store error
    pub fn set_properties(
        &self,
        entity: &Entity,
        values: &Map<String, Value>,
    ) -> Result<(), FrameworkError> {
        let mut errors = ErrorBuffer::new();
        let batch = self.prepare_all(entity, values, &mut errors)?;
        errors.into_result()?;

        tracing::debug!(%entity, mutations = batch.len(), "applying property writes");
        self.store.apply(batch)?;
        Ok(())
    }

    /// Create an entity of `type_name` with initial values
    ///
    /// Not-null properties missing from `values` are reported along with
    /// every other validation error.
    ///
    /// # Errors
    /// Returns [`FrameworkError::UnknownType`] for unregistered types,
    /// otherwise as [`Session::set_properties`]
    pub fn create_entity(
        &self,
        type_name: &str,
        values: &Map<String, Value>,
    ) -> Result<Entity, FrameworkError> {
        let (entity, batch) = self.prepare_entity(type_name, values)?;
        tracing::debug!(%entity, mutations = batch.len(), "creating entity");
        self.store.apply(batch)?;
        Ok(entity)
    }

    /// Validated batch creating an entity, without applying it
    ///
    /// The batch starts with the node creation, so later mutations in the
    /// same batch may reference the new entity.
    ///
    /// # Errors
    /// As [`Session::create_entity`]
    pub fn prepare_entity(
        &self,
        type_name: &str,
        values: &Map<String, Value>,
    ) -> Result<(Entity, Vec<GraphMutation>), FrameworkError> {
        if !self.registry.contains_type(type_name) {
            return Err(FrameworkError::UnknownType(type_name.to_string()));
        }

        let entity = Entity::new(NodeId::new(), type_name);
        let mut batch = vec![GraphMutation::CreateNode {
            id: entity.id().clone(),
            type_name: type_name.to_string(),
            properties: PropertyMap::new(),
        }];

        let mut errors = ErrorBuffer::new();
        batch.extend(self.prepare_all(&entity, values, &mut errors)?);

        for key in self.registry.properties_for(type_name, ALL_VIEW)? {
            let required = !key.is_system()
                && key.default_value().is_none()
                && key.constraints().iter().any(|c| c.is_not_null());
            if required && !values.contains_key(key.external_name()) {
                errors.add(ValidationError::new(
                    type_name,
                    key.external_name(),
                    ValidationKind::Constraint("must not be null".to_string()),
                ));
            }
        }
        errors.into_result()?;
        Ok((entity, batch))
    }

    /// Mutation pointing a relationship property at exactly `targets`
    ///
    /// Targets are taken by node id; the property's notion is not consulted.
    ///
    /// # Errors
    /// Returns a validation error if the property is read-only, not backed
    /// by a relationship, or single-valued and given several targets
    pub fn prepare_link(
        &self,
        entity: &Entity,
        key: &dyn PropertyKey,
        targets: Vec<NodeId>,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        if key.is_read_only() {
            return Err(invalid(key, entity, ValidationKind::ReadOnly));
        }
        let Some(relation) = key.relation() else {
            return Err(invalid(
                key,
                entity,
                ValidationKind::InvalidInput("not a relationship".to_string()),
            ));
        };
        if !key.is_collection() && targets.len() > 1 {
            return Err(invalid(key, entity, ValidationKind::Cardinality(targets.len())));
        }
        Ok(vec![relation.replace(entity, targets, key.exclusive_targets())])
    }

    /// Replace the targets of a relationship property
    ///
    /// # Errors
    /// As [`Session::prepare_link`], or a store error
    pub fn link(
        &self,
        entity: &Entity,
        key: &dyn PropertyKey,
        targets: Vec<NodeId>,
    ) -> Result<(), FrameworkError> {
        let batch = self.prepare_link(entity, key, targets)?;
        tracing::debug!(%entity, property = key.external_name(), "relinking");
        self.store.apply(batch)?;
        Ok(())
    }

    /// Create an entity and add it to `source`'s relationship property
    ///
    /// A single-valued property drops its previous target. Creation and
    /// link are applied as one batch.
    ///
    /// # Errors
    /// As [`Session::create_entity`] and [`Session::prepare_link`]
    pub fn create_related(
        &self,
        source: &Entity,
        key: &dyn PropertyKey,
        type_name: &str,
        values: &Map<String, Value>,
    ) -> Result<Entity, FrameworkError> {
        let (entity, mut batch) = self.prepare_entity(type_name, values)?;
        let mut targets = match key.relation() {
            Some(relation) if key.is_collection() => relation
                .related(self, source)?
                .into_iter()
                .map(|target| target.id().clone())
                .collect(),
            _ => Vec::new(),
        };
        targets.push(entity.id().clone());
        batch.extend(self.prepare_link(source, key, targets)?);

        tracing::debug!(%source, %entity, property = key.external_name(), "creating related entity");
        self.store.apply(batch)?;
        Ok(entity)
    }

    /// Delete an entity and its relationships
    ///
    /// # Errors
    /// Returns a store error if the node does not exist
    pub fn delete_entity(&self, entity: &Entity) -> Result<(), FrameworkError> {
        tracing::debug!(%entity, "deleting entity");
        self.store.apply(vec![GraphMutation::DeleteNode {
            id: entity.id().clone(),
        }])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{CollectionProperty, Property};
    use crate::registry::{EntityType, PUBLIC_VIEW};
    use serde_json::json;
    use strata_graph::{Direction, MemoryGraph};

    fn session() -> Session {
        let registry = ViewRegistry::new();
        registry
            .register(
                EntityType::new("Company").view(PUBLIC_VIEW, [Property::string("city").into_ref()]),
            )
            .unwrap();
        registry
            .register(
                EntityType::new("Person").view(
                    PUBLIC_VIEW,
                    [
                        Property::integer("age").into_ref(),
                        Property::string("email").not_null().into_ref(),
                        CollectionProperty::new("employers", "Company", "WORKS_AT", Direction::Outgoing)
                            .into_ref(),
                    ],
                ),
            )
            .unwrap();
        Session::new(Arc::new(MemoryGraph::new()), Arc::new(registry))
    }

    fn values(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn create_and_read_view() {
        let session = session();
        let bob = session
            .create_entity("Person", &values(json!({"name": "Bob", "age": "42", "email": "b@x"})))
            .unwrap();
        let view = session.read_view(&bob, PUBLIC_VIEW).unwrap();
        assert_eq!(view["name"], json!("Bob"));
        assert_eq!(view["age"], json!(42));
        assert_eq!(view["type"], json!("Person"));
        assert_eq!(view["employers"], json!([]));
        assert_eq!(view["id"], json!(bob.id().as_str()));
    }

    #[test]
    fn create_reports_all_errors_and_writes_nothing() {
        let session = session();
        let err = session
            .create_entity("Person", &values(json!({"age": "old", "id": "x", "shoe": 1})))
            .unwrap_err();
        let props: Vec<_> = err
            .validation_errors()
            .iter()
            .map(|e| e.property.as_str())
            .collect();
        assert_eq!(props.len(), 4);
        for p in ["age", "id", "shoe", "email"] {
            assert!(props.contains(&p), "missing {p}");
        }
        assert!(session.entities_of_type("Person").is_empty());
    }

    #[test]
    fn unknown_type() {
        let session = session();
        assert!(matches!(
            session.create_entity("Ghost", &Map::new()),
            Err(FrameworkError::UnknownType(t)) if t == "Ghost"
        ));
    }

    #[test]
    fn set_properties_is_atomic() {
        let session = session();
        let bob = session
            .create_entity("Person", &values(json!({"email": "b@x", "age": 1})))
            .unwrap();
        let err = session
            .set_properties(&bob, &values(json!({"age": 2, "email": null})))
            .unwrap_err();
        assert_eq!(err.validation_errors().len(), 1);
        assert_eq!(session.get(&bob, "age").unwrap(), json!(1));

        session
            .set_properties(&bob, &values(json!({"age": 3})))
            .unwrap();
        assert_eq!(session.get(&bob, "age").unwrap(), json!(3));
    }

    #[test]
    fn entity_of_type_checks_type() {
        let session = session();
        let acme = session
            .create_entity("Company", &values(json!({"name": "Acme"})))
            .unwrap();
        assert!(session.entity_of_type(acme.id(), "Company").is_ok());
        assert!(session.entity_of_type(acme.id(), "AbstractNode").is_ok());
        assert!(matches!(
            session.entity_of_type(acme.id(), "Person"),
            Err(FrameworkError::NotFound(_))
        ));
        session.delete_entity(&acme).unwrap();
        assert!(session.entity(acme.id()).is_err());
    }

    #[test]
    fn create_related_links_in_one_batch() {
        let session = session();
        let bob = session
            .create_entity("Person", &values(json!({"email": "b@x"})))
            .unwrap();
        let employers = session.property("Person", "employers").unwrap();
        let acme = session
            .create_related(&bob, employers.as_ref(), "Company", &values(json!({"city": "Paris"})))
            .unwrap();
        let initech = session
            .create_related(&bob, employers.as_ref(), "Company", &Map::new())
            .unwrap();

        let related: Vec<NodeId> = employers
            .relation()
            .unwrap()
            .related(&session, &bob)
            .unwrap()
            .iter()
            .map(|e| e.id().clone())
            .collect();
        assert_eq!(related.len(), 2);
        assert!(related.contains(acme.id()) && related.contains(initech.id()));

        // a rejected write leaves neither node nor link behind
        assert!(session
            .create_related(&bob, employers.as_ref(), "Company", &values(json!({"shoe": 1})))
            .is_err());
        assert_eq!(session.entities_of_type("Company").len(), 2);
    }

    #[test]
    fn link_by_id_and_cardinality() {
        let session = session();
        let bob = session
            .create_entity("Person", &values(json!({"email": "b@x"})))
            .unwrap();
        let acme = session.create_entity("Company", &Map::new()).unwrap();
        let employers = session.property("Person", "employers").unwrap();
        session
            .link(&bob, employers.as_ref(), vec![acme.id().clone()])
            .unwrap();
        assert_eq!(session.get(&bob, "employers").unwrap().as_array().map(Vec::len), Some(1));
        session.link(&bob, employers.as_ref(), Vec::new()).unwrap();
        assert_eq!(session.get(&bob, "employers").unwrap(), json!([]));

        let age = session.property("Person", "age").unwrap();
        let err = session
            .prepare_link(&bob, age.as_ref(), vec![acme.id().clone()])
            .unwrap_err();
        assert!(matches!(
            err.validation_errors()[0].kind,
            ValidationKind::InvalidInput(_)
        ));

        let id = session.property("Person", "id").unwrap();
        let err = session.prepare_link(&bob, id.as_ref(), Vec::new()).unwrap_err();
        assert_eq!(err.validation_errors().len(), 1);
    }

    #[test]
    fn degraded_read_on_corrupt_data() {
        let session = session();
        let bob = session
            .create_entity("Person", &values(json!({"email": "b@x"})))
            .unwrap();
        session
            .store()
            .set_stored_value(bob.id(), "age", Some(json!("not a number")))
            .unwrap();
        assert!(session.get(&bob, "age").unwrap_err().is_data_integrity());
        let view = session.read_view(&bob, PUBLIC_VIEW).unwrap();
        assert_eq!(view["age"], Value::Null);
        assert_eq!(view["email"], json!("b@x"));
    }
}
