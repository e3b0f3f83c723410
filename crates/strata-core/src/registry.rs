//! View registry
//!
//! Process-wide table of entity types and their views.
//!
//! # Model
//!
//! - Every type has an optional parent (default [`ABSTRACT_NODE`]); views
//!   are inherited, ancestors first
//! - Each view is an ordered list of property keys, deduplicated by external
//!   name (first declaration wins)
//! - Every statically declared key is also part of the implicit
//!   [`ALL_VIEW`]
//! - Dynamic properties are kept apart from the static set and merged at
//!   read time; a static key always wins a name clash
//!
//! # Concurrency
//!
//! Readers take an immutable [`RegistrySnapshot`] (an `Arc` clone) and never
//! block on writers. Writers are serialized, build a modified copy of the
//! state and swap it in, bumping the version counter.

use crate::error::RegistryError;
use crate::naming;
use crate::property::{
    DynamicProperty, IdProperty, Property, PropertyDefinition, PropertyKey, PropertyRef,
    TypeProperty,
};
use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;

/// Root type every entity type descends from
pub const ABSTRACT_NODE: &str = "AbstractNode";

/// Implicit view holding every property of a type
pub const ALL_VIEW: &str = "all";

/// Default public view
pub const PUBLIC_VIEW: &str = "public";

/// Default editing view
pub const UI_VIEW: &str = "ui";

/// Static declaration of an entity type
///
/// # Examples
/// ```rust
/// use strata_core::{EntityType, Property, ViewRegistry};
///
/// let registry = ViewRegistry::new();
/// let age = Property::integer("age").into_ref();
/// registry
///     .register(EntityType::new("Person").view("public", [age]))
///     .unwrap();
///
/// let names: Vec<_> = registry
///     .properties_for("Person", "public")
///     .unwrap()
///     .iter()
///     .map(|k| k.external_name().to_string())
///     .collect();
/// assert_eq!(names, vec!["id", "type", "name", "age"]);
/// ```
#[derive(Debug, Clone)]
pub struct EntityType {
    name: String,
    parent: Option<String>,
    views: IndexMap<String, Vec<PropertyRef>>,
}

impl EntityType {
    /// Type extending [`ABSTRACT_NODE`]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(ABSTRACT_NODE.to_string()),
            views: IndexMap::new(),
        }
    }

    /// Type without a parent
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            views: IndexMap::new(),
        }
    }

    /// Set the parent type
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Append keys to a view (views may be declared repeatedly)
    #[must_use]
    pub fn view<I>(mut self, name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = PropertyRef>,
    {
        self.views.entry(name.into()).or_default().extend(keys);
        self
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent type name
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    parent: Option<String>,
    views: IndexMap<String, Vec<PropertyRef>>,
    dynamic: Vec<Arc<DynamicProperty>>,
}

#[derive(Debug, Clone, Default)]
struct RegistryState {
    types: IndexMap<String, TypeEntry>,
    view_names: IndexSet<String>,
    version: u64,
}

/// Immutable view of the registry at one version
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    state: Arc<RegistryState>,
}

impl RegistrySnapshot {
    /// Version this snapshot was taken at
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version
    }

    /// Check if a type is registered
    #[inline]
    #[must_use]
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.state.types.contains_key(type_name)
    }

    /// Registered type names, in registration order
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        self.state.types.keys().cloned().collect()
    }

    /// Every view name registered for any type, in registration order
    #[must_use]
    pub fn view_names(&self) -> Vec<String> {
        self.state.view_names.iter().cloned().collect()
    }

    /// Parent of a type
    #[must_use]
    pub fn parent(&self, type_name: &str) -> Option<&str> {
        self.state
            .types
            .get(type_name)
            .and_then(|entry| entry.parent.as_deref())
    }

    /// A type and its ancestors, root first
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownType`] if the type is not registered
    pub fn ancestors(&self, type_name: &str) -> Result<Vec<String>, RegistryError> {
        if !self.contains_type(type_name) {
            return Err(RegistryError::UnknownType(type_name.to_string()));
        }
        let mut chain = Vec::new();
        let mut current = Some(type_name);
        while let Some(name) = current {
            if chain.iter().any(|seen| seen == name) {
                break;
            }
            chain.push(name.to_string());
            current = self.parent(name);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Check if `type_name` is `ancestor` or descends from it
    #[must_use]
    pub fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        if type_name == ancestor {
            return true;
        }
        self.ancestors(type_name)
            .is_ok_and(|chain| chain.iter().any(|name| name == ancestor))
    }

    /// Every registered type that is `type_name` or one of its descendants
    #[must_use]
    pub fn subtypes(&self, type_name: &str) -> Vec<String> {
        self.state
            .types
            .keys()
            .filter(|name| self.is_subtype(name, type_name))
            .cloned()
            .collect()
    }

    /// Registered type named by a path segment (`Person`, `person`, `people`)
    #[must_use]
    pub fn resolve_type_name(&self, segment: &str) -> Option<String> {
        if self.contains_type(segment) {
            return Some(segment.to_string());
        }
        self.state
            .types
            .keys()
            .find(|name| naming::matches_type(name, segment))
            .cloned()
    }

    /// Views of a type (inherited, dynamic and `all` included), ordered
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownType`] if the type is not registered
    pub fn views_for(&self, type_name: &str) -> Result<Vec<String>, RegistryError> {
        let mut views = IndexSet::new();
        for name in self.ancestors(type_name)? {
            if let Some(entry) = self.state.types.get(&name) {
                views.extend(entry.views.keys().cloned());
                for prop in &entry.dynamic {
                    views.extend(prop.definition().views.iter().cloned());
                }
            }
        }
        views.insert(ALL_VIEW.to_string());
        Ok(views.into_iter().collect())
    }

    /// Properties of a type in a view
    ///
    /// Static keys of the ancestors come first, then the type's own, then
    /// dynamic properties; external names are unique in the result. Unknown
    /// views yield an empty list.
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownType`] if the type is not registered
    pub fn properties_for(
        &self,
        type_name: &str,
        view: &str,
    ) -> Result<Vec<PropertyRef>, RegistryError> {
        let chain = self.ancestors(type_name)?;
        let known_view = self.views_for(type_name)?.iter().any(|v| v == view);
        if !known_view {
            return Ok(Vec::new());
        }

        let entries: Vec<&TypeEntry> = chain
            .iter()
            .filter_map(|name| self.state.types.get(name))
            .collect();

        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for entry in &entries {
            for key in entry.views.get(view).into_iter().flatten() {
                if seen.insert(key.external_name().to_string()) {
                    result.push(Arc::clone(key));
                }
            }
        }

        for entry in &entries {
            for prop in &entry.dynamic {
                if prop.definition().applies_to(view)
                    && seen.insert(prop.external_name().to_string())
                {
                    result.push(Arc::clone(prop) as PropertyRef);
                }
            }
        }

        Ok(result)
    }

    /// Property of a type by external name (any view)
    #[must_use]
    pub fn property(&self, type_name: &str, name: &str) -> Option<PropertyRef> {
        self.properties_for(type_name, ALL_VIEW)
            .ok()?
            .into_iter()
            .find(|key| key.external_name() == name)
    }

    /// Dynamic definitions declared directly on a type
    #[must_use]
    pub fn definitions(&self, type_name: &str) -> Vec<PropertyDefinition> {
        self.state
            .types
            .get(type_name)
            .map(|entry| {
                entry
                    .dynamic
                    .iter()
                    .map(|prop| prop.definition().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_static(&self, type_name: &str, name: &str) -> bool {
        self.ancestors(type_name).is_ok_and(|chain| {
            chain.iter().any(|ancestor| {
                self.state.types.get(ancestor).is_some_and(|entry| {
                    entry
                        .views
                        .get(ALL_VIEW)
                        .is_some_and(|keys| keys.iter().any(|k| k.external_name() == name))
                })
            })
        })
    }
}

/// Process-wide registry of entity types and views
#[derive(Debug)]
pub struct ViewRegistry {
    state: RwLock<Arc<RegistryState>>,
    writer: Mutex<()>,
}

impl ViewRegistry {
    /// Registry holding only [`ABSTRACT_NODE`] (`id`, `type`, `name`)
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        let base: [PropertyRef; 3] = [
            Arc::new(IdProperty::new()),
            Arc::new(TypeProperty::new()),
            Property::string("name").into_ref(),
        ];
        // AbstractNode has no parent and no duplicates
        if let Err(error) = registry.register(
            EntityType::root(ABSTRACT_NODE)
                .view(PUBLIC_VIEW, base.clone())
                .view(UI_VIEW, base),
        ) {
            tracing::error!(%error, "failed to register base type");
        }
        registry
    }

    /// Registry without any type
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: RwLock::new(Arc::new(RegistryState::default())),
            writer: Mutex::new(()),
        }
    }

    /// Current snapshot; never blocks on writers for longer than an `Arc` clone
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            state: Arc::clone(&self.state.read()),
        }
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut RegistryState) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let _guard = self.writer.lock();
        let mut next = RegistryState::clone(&self.state.read());
        let out = f(&mut next)?;
        next.version += 1;
        *self.state.write() = Arc::new(next);
        Ok(out)
    }

    /// Register a statically declared type
    ///
    /// # Errors
    /// Returns error if the type exists or its parent is unknown
    pub fn register(&self, entity_type: EntityType) -> Result<(), RegistryError> {
        self.modify(|state| {
            let EntityType {
                name,
                parent,
                views,
            } = entity_type;

            if state.types.contains_key(&name) {
                return Err(RegistryError::DuplicateType(name));
            }
            if let Some(parent) = &parent {
                if !state.types.contains_key(parent) {
                    return Err(RegistryError::UnknownParent {
                        type_name: name,
                        parent: parent.clone(),
                    });
                }
            }

            let mut all: Vec<PropertyRef> = Vec::new();
            let mut deduped = IndexMap::new();
            for (view, keys) in views {
                let mut seen = HashSet::new();
                let keys: Vec<PropertyRef> = keys
                    .into_iter()
                    .filter(|key| seen.insert(key.external_name().to_string()))
                    .collect();
                for key in &keys {
                    key.info().declare(&name);
                    if !all.iter().any(|k| k.external_name() == key.external_name()) {
                        all.push(Arc::clone(key));
                    }
                }
                state.view_names.insert(view.clone());
                deduped.insert(view, keys);
            }
            deduped.insert(ALL_VIEW.to_string(), all);
            state.view_names.insert(ALL_VIEW.to_string());

            tracing::info!(type_name = %name, views = deduped.len(), "registered entity type");
            state.types.insert(
                name,
                TypeEntry {
                    parent,
                    views: deduped,
                    dynamic: Vec::new(),
                },
            );
            Ok(())
        })
    }

    /// Add or replace a dynamic property on a type
    ///
    /// An unknown type is created on the fly as a child of [`ABSTRACT_NODE`].
    ///
    /// # Errors
    /// Returns error if the definition is invalid or clashes with a static key
    pub fn define_property(
        &self,
        type_name: &str,
        definition: PropertyDefinition,
    ) -> Result<PropertyRef, RegistryError> {
        let property = Arc::new(DynamicProperty::from_definition(definition)?);
        property.info().declare(type_name);

        self.modify(|state| {
            let snapshot = RegistrySnapshot {
                state: Arc::new(state.clone()),
            };
            if snapshot.is_static(type_name, property.external_name()) {
                return Err(RegistryError::ShadowsStatic {
                    type_name: type_name.to_string(),
                    property: property.external_name().to_string(),
                });
            }

            if !state.types.contains_key(type_name) {
                if !state.types.contains_key(ABSTRACT_NODE) {
                    return Err(RegistryError::UnknownParent {
                        type_name: type_name.to_string(),
                        parent: ABSTRACT_NODE.to_string(),
                    });
                }
                tracing::info!(type_name, "creating type for dynamic property");
                state.types.insert(
                    type_name.to_string(),
                    TypeEntry {
                        parent: Some(ABSTRACT_NODE.to_string()),
                        views: IndexMap::from([(ALL_VIEW.to_string(), Vec::new())]),
                        dynamic: Vec::new(),
                    },
                );
            }

            for view in &property.definition().views {
                state.view_names.insert(view.clone());
            }

            let Some(entry) = state.types.get_mut(type_name) else {
                return Err(RegistryError::UnknownType(type_name.to_string()));
            };
            entry
                .dynamic
                .retain(|p| p.external_name() != property.external_name());
            entry.dynamic.push(Arc::clone(&property));

            tracing::info!(
                type_name,
                property = property.external_name(),
                "defined dynamic property"
            );
            Ok(Arc::clone(&property) as PropertyRef)
        })
    }

    /// Remove a dynamic property
    ///
    /// # Errors
    /// Returns error if the type or the dynamic property does not exist
    pub fn remove_definition(&self, type_name: &str, name: &str) -> Result<(), RegistryError> {
        self.modify(|state| {
            let entry = state
                .types
                .get_mut(type_name)
                .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
            let before = entry.dynamic.len();
            entry.dynamic.retain(|p| p.external_name() != name);
            if entry.dynamic.len() == before {
                return Err(RegistryError::UnknownProperty {
                    type_name: type_name.to_string(),
                    property: name.to_string(),
                });
            }
            tracing::info!(type_name, property = name, "removed dynamic property");
            Ok(())
        })
    }

    /// See [`RegistrySnapshot::version`]
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// See [`RegistrySnapshot::contains_type`]
    #[inline]
    #[must_use]
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.snapshot().contains_type(type_name)
    }

    /// See [`RegistrySnapshot::type_names`]
    #[inline]
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        self.snapshot().type_names()
    }

    /// See [`RegistrySnapshot::view_names`]
    #[inline]
    #[must_use]
    pub fn view_names(&self) -> Vec<String> {
        self.snapshot().view_names()
    }

    /// See [`RegistrySnapshot::views_for`]
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownType`] if the type is not registered
    #[inline]
    pub fn views_for(&self, type_name: &str) -> Result<Vec<String>, RegistryError> {
        self.snapshot().views_for(type_name)
    }

    /// See [`RegistrySnapshot::properties_for`]
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownType`] if the type is not registered
    #[inline]
    pub fn properties_for(
        &self,
        type_name: &str,
        view: &str,
    ) -> Result<Vec<PropertyRef>, RegistryError> {
        self.snapshot().properties_for(type_name, view)
    }

    /// See [`RegistrySnapshot::property`]
    #[inline]
    #[must_use]
    pub fn property(&self, type_name: &str, name: &str) -> Option<PropertyRef> {
        self.snapshot().property(type_name, name)
    }

    /// See [`RegistrySnapshot::is_subtype`]
    #[inline]
    #[must_use]
    pub fn is_subtype(&self, type_name: &str, ancestor: &str) -> bool {
        self.snapshot().is_subtype(type_name, ancestor)
    }

    /// See [`RegistrySnapshot::ancestors`]
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownType`] if the type is not registered
    #[inline]
    pub fn ancestors(&self, type_name: &str) -> Result<Vec<String>, RegistryError> {
        self.snapshot().ancestors(type_name)
    }

    /// See [`RegistrySnapshot::resolve_type_name`]
    #[inline]
    #[must_use]
    pub fn resolve_type_name(&self, segment: &str) -> Option<String> {
        self.snapshot().resolve_type_name(segment)
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ValueType;
    use pretty_assertions::assert_eq;

    fn names(keys: &[PropertyRef]) -> Vec<&str> {
        keys.iter().map(|k| k.external_name()).collect()
    }

    fn person_registry() -> ViewRegistry {
        let registry = ViewRegistry::new();
        let age = Property::integer("age").into_ref();
        let email = Property::string("email").into_ref();
        registry
            .register(
                EntityType::new("Person")
                    .view(PUBLIC_VIEW, [Arc::clone(&age)])
                    .view(UI_VIEW, [age, email]),
            )
            .unwrap();
        registry
    }

    #[test]
    fn base_type_registered() {
        let registry = ViewRegistry::new();
        assert!(registry.contains_type(ABSTRACT_NODE));
        let keys = registry.properties_for(ABSTRACT_NODE, PUBLIC_VIEW).unwrap();
        assert_eq!(names(&keys), vec!["id", "type", "name"]);
        assert!(keys[0].is_read_only());
        assert_eq!(keys[2].declaring_type(), Some(ABSTRACT_NODE));
    }

    #[test]
    fn inherited_views_ancestors_first() {
        let registry = person_registry();
        let keys = registry.properties_for("Person", UI_VIEW).unwrap();
        assert_eq!(names(&keys), vec!["id", "type", "name", "age", "email"]);
        let all = registry.properties_for("Person", ALL_VIEW).unwrap();
        assert_eq!(names(&all), vec!["id", "type", "name", "age", "email"]);
    }

    #[test]
    fn unknown_view_is_empty_unknown_type_errors() {
        let registry = person_registry();
        assert!(registry.properties_for("Person", "nope").unwrap().is_empty());
        assert_eq!(
            registry.properties_for("Ghost", PUBLIC_VIEW).unwrap_err(),
            RegistryError::UnknownType("Ghost".into())
        );
    }

    #[test]
    fn duplicate_external_names_removed() {
        let registry = ViewRegistry::new();
        registry
            .register(EntityType::new("Thing").view(
                PUBLIC_VIEW,
                [
                    Property::string("name").into_ref(),
                    Property::string("color").into_ref(),
                    Property::integer("color").into_ref(),
                ],
            ))
            .unwrap();
        let keys = registry.properties_for("Thing", PUBLIC_VIEW).unwrap();
        assert_eq!(names(&keys), vec!["id", "type", "name", "color"]);
        assert_eq!(keys[3].value_type(), ValueType::String);
        assert_eq!(keys[2].declaring_type(), Some(ABSTRACT_NODE));
    }

    #[test]
    fn registration_errors() {
        let registry = person_registry();
        assert_eq!(
            registry.register(EntityType::new("Person")).unwrap_err(),
            RegistryError::DuplicateType("Person".into())
        );
        assert!(matches!(
            registry.register(EntityType::new("Car").extends("Vehicle")),
            Err(RegistryError::UnknownParent { .. })
        ));
    }

    #[test]
    fn dynamic_properties_merge() {
        let registry = person_registry();
        let v0 = registry.version();
        registry
            .define_property("Person", PropertyDefinition::new("nickname", ValueType::String))
            .unwrap();
        assert!(registry.version() > v0);

        for view in [PUBLIC_VIEW, UI_VIEW, ALL_VIEW] {
            let keys = registry.properties_for("Person", view).unwrap();
            assert_eq!(keys.last().unwrap().external_name(), "nickname");
        }
        assert_eq!(
            registry.property("Person", "nickname").unwrap().declaring_type(),
            Some("Person")
        );

        registry.remove_definition("Person", "nickname").unwrap();
        assert!(registry.property("Person", "nickname").is_none());
        assert!(registry.remove_definition("Person", "nickname").is_err());
    }

    #[test]
    fn dynamic_views_are_scoped() {
        let registry = person_registry();
        registry
            .define_property(
                "Person",
                PropertyDefinition::new("badge", ValueType::String).in_views(["admin"]),
            )
            .unwrap();
        assert!(registry.views_for("Person").unwrap().contains(&"admin".to_string()));
        assert_eq!(
            names(&registry.properties_for("Person", "admin").unwrap()),
            vec!["badge"]
        );
        assert!(registry.property("Person", "badge").is_some());
        assert!(!names(&registry.properties_for("Person", PUBLIC_VIEW).unwrap()).contains(&"badge"));
    }

    #[test]
    fn dynamic_cannot_shadow_static() {
        let registry = person_registry();
        let err = registry
            .define_property("Person", PropertyDefinition::new("age", ValueType::String))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ShadowsStatic { .. }));
        let err = registry
            .define_property("Person", PropertyDefinition::new("name", ValueType::String))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ShadowsStatic { .. }));
    }

    #[test]
    fn static_wins_over_inherited_dynamic() {
        let registry = ViewRegistry::new();
        registry
            .define_property(ABSTRACT_NODE, PropertyDefinition::new("email", ValueType::Integer))
            .unwrap();
        registry
            .register(EntityType::new("Person").view(PUBLIC_VIEW, [Property::string("email").into_ref()]))
            .unwrap();
        let keys = registry.properties_for("Person", PUBLIC_VIEW).unwrap();
        let emails: Vec<_> = keys.iter().filter(|k| k.external_name() == "email").collect();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].value_type(), ValueType::String);
    }

    #[test]
    fn define_on_unknown_type_creates_it() {
        let registry = ViewRegistry::new();
        registry
            .define_property("Note", PropertyDefinition::new("text", ValueType::String))
            .unwrap();
        assert!(registry.contains_type("Note"));
        assert!(registry.is_subtype("Note", ABSTRACT_NODE));
        let keys = registry.properties_for("Note", PUBLIC_VIEW).unwrap();
        assert_eq!(names(&keys), vec!["id", "type", "name", "text"]);
    }

    #[test]
    fn subtypes_and_names() {
        let registry = person_registry();
        registry
            .register(EntityType::new("Employee").extends("Person"))
            .unwrap();
        assert!(registry.is_subtype("Employee", "Person"));
        assert!(!registry.is_subtype("Person", "Employee"));
        assert_eq!(
            registry.ancestors("Employee").unwrap(),
            vec![ABSTRACT_NODE, "Person", "Employee"]
        );
        assert_eq!(registry.snapshot().subtypes("Person"), vec!["Person", "Employee"]);
        assert_eq!(registry.resolve_type_name("people").as_deref(), Some("Person"));
        assert_eq!(registry.resolve_type_name("employees").as_deref(), Some("Employee"));
        assert_eq!(registry.resolve_type_name("ghosts"), None);
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let registry = person_registry();
        let before = registry.snapshot();
        registry
            .define_property("Person", PropertyDefinition::new("nickname", ValueType::String))
            .unwrap();
        assert!(before.property("Person", "nickname").is_none());
        assert!(registry.property("Person", "nickname").is_some());
    }

    #[test]
    fn view_names_in_registration_order() {
        let registry = person_registry();
        assert_eq!(registry.view_names(), vec![PUBLIC_VIEW, UI_VIEW, ALL_VIEW]);
    }
}
