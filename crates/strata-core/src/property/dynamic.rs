//! User-declared properties added at runtime

use super::{KeyInfo, Property, PropertyKey, ValueType};
use crate::constraint::Constraint;
use crate::converter::PropertyConverter;
use crate::entity::Entity;
use crate::error::{FrameworkError, RegistryError};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_graph::GraphMutation;

/// Declaration of a dynamic property
///
/// # Examples
/// ```rust
/// use strata_core::PropertyDefinition;
///
/// let def: PropertyDefinition =
///     serde_json::from_str(r#"{ "name": "nickname", "dataType": "String" }"#).unwrap();
/// assert!(def.views.is_empty());
/// assert!(!def.read_only);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    /// External name
    pub name: String,
    /// Scalar value type
    pub data_type: ValueType,
    /// Views the property joins (empty: every view of the type)
    #[serde(default)]
    pub views: Vec<String>,
    /// Reject writes
    #[serde(default)]
    pub read_only: bool,
    /// Exclude from user-facing validation
    #[serde(default)]
    pub system: bool,
    /// Value reported when nothing is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Require a value on create and reject null writes
    #[serde(default)]
    pub not_null: bool,
    /// Storage name when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
}

impl PropertyDefinition {
    /// Definition with defaults for everything but name and type
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: ValueType) -> Self {
        Self {
            name: name.into(),
            data_type,
            views: Vec::new(),
            read_only: false,
            system: false,
            default_value: None,
            not_null: false,
            db_name: None,
        }
    }

    /// Restrict to the named views
    #[must_use]
    pub fn in_views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views = views.into_iter().map(Into::into).collect();
        self
    }

    /// Check if the property joins `view`
    ///
    /// Every dynamic property is part of the implicit `all` view.
    #[must_use]
    pub fn applies_to(&self, view: &str) -> bool {
        self.views.is_empty()
            || view == crate::registry::ALL_VIEW
            || self.views.iter().any(|v| v == view)
    }
}

/// Runtime-declared scalar property
#[derive(Debug, Clone)]
pub struct DynamicProperty {
    definition: PropertyDefinition,
    inner: Property,
}

impl DynamicProperty {
    /// Build from a definition
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidDeclaration`] for non-scalar types or
    /// a blank name
    pub fn from_definition(definition: PropertyDefinition) -> Result<Self, RegistryError> {
        if definition.name.trim().is_empty() {
            return Err(RegistryError::InvalidDeclaration(
                "property name must not be blank".to_string(),
            ));
        }
        if !definition.data_type.is_scalar() {
            return Err(RegistryError::InvalidDeclaration(format!(
                "{}: dynamic properties must be scalar, not {}",
                definition.name,
                definition.data_type.name()
            )));
        }

        let mut inner = Property::of_type(definition.name.clone(), definition.data_type);
        if let Some(db_name) = &definition.db_name {
            inner = inner.with_storage_name(db_name.clone());
        }
        if let Some(default) = &definition.default_value {
            inner = inner.with_default(default.clone());
        }
        if definition.read_only {
            inner = inner.read_only();
        }
        if definition.system {
            inner = inner.system();
        }
        if definition.not_null {
            inner = inner.not_null();
        }

        Ok(Self { definition, inner })
    }

    /// Source definition
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &PropertyDefinition {
        &self.definition
    }
}

impl PropertyKey for DynamicProperty {
    fn info(&self) -> &KeyInfo {
        self.inner.info()
    }

    fn kind_name(&self) -> &'static str {
        self.inner.kind_name()
    }

    fn value_type(&self) -> ValueType {
        self.inner.value_type()
    }

    fn database_converter(&self) -> Option<&dyn PropertyConverter> {
        self.inner.database_converter()
    }

    fn input_converter(&self) -> Option<&dyn PropertyConverter> {
        self.inner.input_converter()
    }

    fn constraints(&self) -> &[Constraint] {
        self.inner.constraints()
    }

    fn get(&self, session: &Session, entity: &Entity) -> Result<Value, FrameworkError> {
        self.inner.get(session, entity)
    }

    fn prepare(
        &self,
        session: &Session,
        entity: &Entity,
        value: Value,
    ) -> Result<Vec<GraphMutation>, FrameworkError> {
        self.inner.prepare(session, entity, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_serde() {
        let def: PropertyDefinition = serde_json::from_value(json!({
            "name": "nickname",
            "dataType": "String",
            "views": ["public"],
            "notNull": true,
            "dbName": "_nick"
        }))
        .unwrap();
        assert_eq!(def.views, vec!["public"]);
        assert!(def.not_null);
        assert_eq!(def.db_name.as_deref(), Some("_nick"));
    }

    #[test]
    fn applies_to_views() {
        let everywhere = PropertyDefinition::new("a", ValueType::String);
        assert!(everywhere.applies_to("ui"));

        let public = PropertyDefinition::new("b", ValueType::String).in_views(["public"]);
        assert!(public.applies_to("public"));
        assert!(public.applies_to("all"));
        assert!(!public.applies_to("ui"));
    }

    #[test]
    fn builds_inner_property() {
        let mut def = PropertyDefinition::new("age", ValueType::Integer);
        def.db_name = Some("_age".into());
        def.not_null = true;
        let prop = DynamicProperty::from_definition(def).unwrap();
        assert_eq!(prop.storage_name(), "_age");
        assert_eq!(prop.external_name(), "age");
        assert_eq!(prop.kind_name(), "IntProperty");
        assert!(prop.constraints()[0].is_not_null());
        assert!(!prop.is_system());
        assert!(!prop.is_read_only());
    }

    #[test]
    fn rejects_relationship_types() {
        let def = PropertyDefinition::new("friends", ValueType::Collection);
        assert!(matches!(
            DynamicProperty::from_definition(def),
            Err(RegistryError::InvalidDeclaration(_))
        ));
        let blank = PropertyDefinition::new(" ", ValueType::String);
        assert!(DynamicProperty::from_definition(blank).is_err());
    }
}
