//! Combination rule table
//!
//! Maps a pair of resource kinds to the function that merges them. A pair
//! without a rule never combines; a rule may still decline a particular
//! pair by returning `None`.
//!
//! Standard rules:
//! - `Type + Id` → `TypedId`
//! - `TypedId + Id|Type` → `Relationship` (segment names a relationship property)
//! - `Relationship + Id` → `RelatedId`
//! - `RelatedId + Id|Type` → `Relationship` from the related entity
//! - `Schema + Type` → `SchemaType`
//! - `Type|Id|TypedId|Relationship|RelatedId + View` → `ViewFilter`

use super::{Resource, ResourceKind};
use std::collections::HashMap;
use std::fmt::{self, Formatter};
use strata_core::{PropertyKey, PropertyRef, RegistrySnapshot, ALL_VIEW};

/// Merges two adjacent resources, or declines with `None`
pub type Combiner = fn(&RegistrySnapshot, &Resource, &Resource) -> Option<Resource>;

/// Table of combination rules keyed by (left kind, right kind)
#[derive(Clone, Default)]
pub struct CombinationRules {
    rules: HashMap<(ResourceKind, ResourceKind), Combiner>,
}

impl CombinationRules {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Create table with the standard rules
    #[must_use]
    pub fn standard() -> Self {
        use ResourceKind::{Id, RelatedId, Relationship, Schema, Type, TypedId, View};

        let mut rules = Self::new();
        rules.register(Type, Id, typed_id);
        rules.register(TypedId, Id, relationship);
        rules.register(TypedId, Type, relationship);
        rules.register(Relationship, Id, related_id);
        rules.register(RelatedId, Id, relationship);
        rules.register(RelatedId, Type, relationship);
        rules.register(Schema, Type, schema_type);
        for kind in [Type, Id, TypedId, Relationship, RelatedId] {
            rules.register(kind, View, view_filter);
        }
        rules
    }

    /// Register (or replace) the rule for a pair of kinds
    pub fn register(&mut self, left: ResourceKind, right: ResourceKind, combiner: Combiner) {
        self.rules.insert((left, right), combiner);
    }

    /// Remove the rule for a pair of kinds
    #[inline]
    pub fn remove(&mut self, left: ResourceKind, right: ResourceKind) -> bool {
        self.rules.remove(&(left, right)).is_some()
    }

    /// Check if a pair of kinds has a rule
    #[inline]
    #[must_use]
    pub fn contains(&self, left: ResourceKind, right: ResourceKind) -> bool {
        self.rules.contains_key(&(left, right))
    }

    /// Get number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Try to merge `left` with its right neighbor
    #[must_use]
    pub fn combine(
        &self,
        registry: &RegistrySnapshot,
        left: &Resource,
        right: &Resource,
    ) -> Option<Resource> {
        let combiner = self.rules.get(&(left.kind(), right.kind()))?;
        let merged = combiner(registry, left, right);
        if let Some(merged) = &merged {
            tracing::debug!(%left, %right, %merged, "combined resources");
        }
        merged
    }
}

impl fmt::Debug for CombinationRules {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.rules.keys().collect();
        pairs.sort();
        f.debug_struct("CombinationRules").field("rules", &pairs).finish()
    }
}

fn typed_id(_: &RegistrySnapshot, left: &Resource, right: &Resource) -> Option<Resource> {
    match (left, right) {
        (Resource::Type { type_name, .. }, Resource::Id { id }) => Some(Resource::TypedId {
            type_name: type_name.clone(),
            id: id.clone(),
        }),
        _ => None,
    }
}

fn relationship(registry: &RegistrySnapshot, left: &Resource, right: &Resource) -> Option<Resource> {
    let (source_type, source) = match left {
        Resource::TypedId { type_name, id } => (type_name, id),
        Resource::RelatedId {
            related_type, id, ..
        } => (related_type, id),
        _ => return None,
    };
    let key = match right {
        Resource::Id { id } => relationship_key(registry, source_type, id.as_str())?,
        Resource::Type { raw, type_name } => relationship_key(registry, source_type, raw)
            .or_else(|| key_for_related_type(registry, source_type, type_name))?,
        _ => return None,
    };
    let related_type = key.related_type()?.to_string();

    Some(Resource::Relationship {
        source_type: source_type.clone(),
        source: source.clone(),
        property: key.external_name().to_string(),
        related_type,
    })
}

fn related_id(_: &RegistrySnapshot, left: &Resource, right: &Resource) -> Option<Resource> {
    match (left, right) {
        (
            Resource::Relationship {
                source_type,
                source,
                property,
                related_type,
            },
            Resource::Id { id },
        ) => Some(Resource::RelatedId {
            source_type: source_type.clone(),
            source: source.clone(),
            property: property.clone(),
            related_type: related_type.clone(),
            id: id.clone(),
        }),
        _ => None,
    }
}

fn schema_type(_: &RegistrySnapshot, left: &Resource, right: &Resource) -> Option<Resource> {
    match (left, right) {
        (Resource::Schema, Resource::Type { type_name, .. }) => Some(Resource::SchemaType {
            type_name: type_name.clone(),
        }),
        _ => None,
    }
}

fn view_filter(_: &RegistrySnapshot, left: &Resource, right: &Resource) -> Option<Resource> {
    match right {
        Resource::View { view } => Some(Resource::ViewFilter {
            inner: Box::new(left.clone()),
            view: view.clone(),
        }),
        _ => None,
    }
}

/// Relationship-backed property of `type_name` with external name `name`
fn relationship_key(registry: &RegistrySnapshot, type_name: &str, name: &str) -> Option<PropertyRef> {
    registry
        .property(type_name, name)
        .filter(|key| key.relation().is_some())
}

/// The only relationship-backed property of `type_name` targeting `related_type`
fn key_for_related_type(
    registry: &RegistrySnapshot,
    type_name: &str,
    related_type: &str,
) -> Option<PropertyRef> {
    let mut candidates = registry
        .properties_for(type_name, ALL_VIEW)
        .ok()?
        .into_iter()
        .filter(|key| key.relation().is_some() && key.related_type() == Some(related_type));
    let key = candidates.next()?;
    candidates.next().is_none().then_some(key)
}
