//! Resources: resolved units of a request path
//!
//! Every path segment is instantiated as one [`Resource`]; adjacent
//! resources are then folded into combined ones through the
//! [`CombinationRules`] table (see [`ChainResolver`](crate::ChainResolver)).
//!
//! Segment classification, in order:
//! - `_schema` → [`Resource::Schema`]
//! - a registered view name → [`Resource::View`]
//! - a type name in any spelling (`Person`, `person`, `people`) → [`Resource::Type`]
//! - anything else → [`Resource::Id`]; as the first segment it must name an
//!   existing node, otherwise the path names an unknown type

mod rules;
mod verbs;

pub use rules::{CombinationRules, Combiner};
pub(crate) use verbs::RequestContext;

use std::fmt::{self, Display, Formatter};
use strata_core::{FrameworkError, Session};
use strata_graph::NodeId;

/// Segment naming the schema root
pub const SCHEMA_SEGMENT: &str = "_schema";

/// One resolved unit of a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// All entities of a type
    Type {
        /// Segment as written
        raw: String,
        /// Registered type name
        type_name: String,
    },

    /// A node by id, whatever its type
    Id {
        /// Node id (also the raw segment)
        id: NodeId,
    },

    /// A node of a given type
    TypedId {
        /// Type the node must be an instance of
        type_name: String,
        /// Node id
        id: NodeId,
    },

    /// Entities related to a node through a relationship property
    Relationship {
        /// Type of the source node
        source_type: String,
        /// Source node
        source: NodeId,
        /// External name of the relationship property
        property: String,
        /// Type of the related entities
        related_type: String,
    },

    /// One entity among the related ones
    RelatedId {
        /// Type of the source node
        source_type: String,
        /// Source node
        source: NodeId,
        /// External name of the relationship property
        property: String,
        /// Type of the related entities
        related_type: String,
        /// Related node
        id: NodeId,
    },

    /// Bare view segment, only meaningful after an entity resource
    View {
        /// View name
        view: String,
    },

    /// Another resource rendered through an explicit view
    ViewFilter {
        /// Filtered resource
        inner: Box<Resource>,
        /// View name
        view: String,
    },

    /// List of registered types
    Schema,

    /// Schema snapshot of one type
    SchemaType {
        /// Registered type name
        type_name: String,
    },
}

/// Variant tag of a [`Resource`], used to key the combination table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// [`Resource::Type`]
    Type,
    /// [`Resource::Id`]
    Id,
    /// [`Resource::TypedId`]
    TypedId,
    /// [`Resource::Relationship`]
    Relationship,
    /// [`Resource::RelatedId`]
    RelatedId,
    /// [`Resource::View`]
    View,
    /// [`Resource::ViewFilter`]
    ViewFilter,
    /// [`Resource::Schema`]
    Schema,
    /// [`Resource::SchemaType`]
    SchemaType,
}

impl Resource {
    /// Instantiate the resource for one path segment
    ///
    /// # Errors
    /// Returns [`FrameworkError::UnknownType`] if the first segment names
    /// neither a type, a view, the schema nor an existing node
    pub fn instantiate(
        session: &Session,
        position: usize,
        segment: &str,
    ) -> Result<Self, FrameworkError> {
        let registry = session.registry().snapshot();
        if segment == SCHEMA_SEGMENT {
            return Ok(Self::Schema);
        }
        if registry.view_names().iter().any(|view| view == segment) {
            return Ok(Self::View {
                view: segment.to_string(),
            });
        }
        if let Some(type_name) = registry.resolve_type_name(segment) {
            return Ok(Self::Type {
                raw: segment.to_string(),
                type_name,
            });
        }

        let id = NodeId::from(segment);
        if position == 0 && !session.store().contains(&id) {
            return Err(FrameworkError::UnknownType(segment.to_string()));
        }
        Ok(Self::Id { id })
    }

    /// Variant tag
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Type { .. } => ResourceKind::Type,
            Self::Id { .. } => ResourceKind::Id,
            Self::TypedId { .. } => ResourceKind::TypedId,
            Self::Relationship { .. } => ResourceKind::Relationship,
            Self::RelatedId { .. } => ResourceKind::RelatedId,
            Self::View { .. } => ResourceKind::View,
            Self::ViewFilter { .. } => ResourceKind::ViewFilter,
            Self::Schema => ResourceKind::Schema,
            Self::SchemaType { .. } => ResourceKind::SchemaType,
        }
    }

    /// Primary entity type of the resource, if it has one
    #[must_use]
    pub fn entity_type(&self) -> Option<&str> {
        match self {
            Self::Type { type_name, .. }
            | Self::TypedId { type_name, .. }
            | Self::SchemaType { type_name } => Some(type_name),
            Self::Relationship { related_type, .. } | Self::RelatedId { related_type, .. } => {
                Some(related_type)
            }
            Self::ViewFilter { inner, .. } => inner.entity_type(),
            Self::Id { .. } | Self::View { .. } | Self::Schema => None,
        }
    }

    /// Explicit view selected by the path
    #[must_use]
    pub fn view(&self) -> Option<&str> {
        match self {
            Self::ViewFilter { view, .. } | Self::View { view } => Some(view),
            _ => None,
        }
    }

    /// Check if the resource addresses exactly one entity
    #[must_use]
    pub fn is_single(&self) -> bool {
        match self {
            Self::Id { .. } | Self::TypedId { .. } | Self::RelatedId { .. } => true,
            Self::ViewFilter { inner, .. } => inner.is_single(),
            _ => false,
        }
    }

    /// Check if the resource can be executed on its own
    #[must_use]
    pub fn is_executable(&self) -> bool {
        !matches!(self, Self::View { .. })
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { type_name, .. } => write!(f, "{type_name}"),
            Self::Id { id } => write!(f, "{id}"),
            Self::TypedId { type_name, id } => write!(f, "{type_name}/{id}"),
            Self::Relationship {
                source_type,
                source,
                property,
                ..
            } => write!(f, "{source_type}/{source}/{property}"),
            Self::RelatedId {
                source_type,
                source,
                property,
                id,
                ..
            } => write!(f, "{source_type}/{source}/{property}/{id}"),
            Self::View { view } => write!(f, "{view}"),
            Self::ViewFilter { inner, view } => write!(f, "{inner}/{view}"),
            Self::Schema => f.write_str(SCHEMA_SEGMENT),
            Self::SchemaType { type_name } => write!(f, "{SCHEMA_SEGMENT}/{type_name}"),
        }
    }
}
