//! Error types for Strata Core
//!
//! Provides the request-level taxonomy:
//! - Unknown entity types in paths or schema documents
//! - Validation errors, aggregated per write in an [`ErrorBuffer`]
//! - Data-integrity violations found in stored data
//! - Unsupported verbs on a resolved resource

use strata_graph::StoreError;

/// Main framework error type
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// Path segment or document names no registered entity type
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// One or more client input problems
    #[error("validation failed: {0}")]
    Validation(ErrorBuffer),

    /// Stored data does not match its declared mapping
    #[error("data integrity violation on {type_name}.{property}: {message}")]
    DataIntegrity {
        /// Entity type
        type_name: String,
        /// External property name
        property: String,
        /// What was wrong
        message: String,
    },

    /// Verb not valid for the resolved resource kind
    #[error("method {method} not allowed on {resource}")]
    UnsupportedOperation {
        /// Rejected verb
        method: String,
        /// Resource signature
        resource: String,
    },

    /// Referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Path could not be folded into a single resource
    #[error("illegal path: {0}")]
    IllegalPath(String),

    /// Schema registration failed
    #[error("schema error: {0}")]
    Registry(#[from] RegistryError),

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl FrameworkError {
    /// Create a data-integrity error
    #[inline]
    pub fn data_integrity(
        type_name: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DataIntegrity {
            type_name: type_name.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-operation error
    #[inline]
    pub fn unsupported(method: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            method: method.into(),
            resource: resource.into(),
        }
    }

    /// HTTP-style status code for the error
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::UnknownType(_) | Self::NotFound(_) => 404,
            Self::Validation(_) => 422,
            Self::UnsupportedOperation { .. } => 405,
            Self::IllegalPath(_) | Self::Registry(_) => 400,
            Self::DataIntegrity { .. } | Self::Store(_) => 500,
        }
    }

    /// Check if the error was caused by the client
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Check if the error is a data-integrity violation
    #[inline]
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity { .. })
    }

    /// Validation errors carried by this error, if any
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(buffer) => buffer.errors(),
            _ => &[],
        }
    }
}

impl From<ValidationError> for FrameworkError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(ErrorBuffer::single(error))
    }
}

impl From<ErrorBuffer> for FrameworkError {
    fn from(buffer: ErrorBuffer) -> Self {
        Self::Validation(buffer)
    }
}

/// A single client input problem on one property
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{type_name}.{property}: {kind}")]
pub struct ValidationError {
    /// Entity type
    pub type_name: String,
    /// External property name
    pub property: String,
    /// What was wrong
    pub kind: ValidationKind,
}

impl ValidationError {
    /// Create validation error
    #[inline]
    #[must_use]
    pub fn new(type_name: impl Into<String>, property: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            type_name: type_name.into(),
            property: property.into(),
            kind,
        }
    }
}

/// Classification of validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationKind {
    /// Write to a read-only property
    #[error("property is read-only")]
    ReadOnly,

    /// Input could not be converted
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Declared constraint violated
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Notion could not resolve the referenced entity
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// Referenced entity has the wrong type
    #[error("expected target of type {expected}, found {found}")]
    WrongTargetType {
        /// Declared related type
        expected: String,
        /// Actual type
        found: String,
    },

    /// More targets than the property allows
    #[error("expected at most one target, got {0}")]
    Cardinality(usize),

    /// No property with that name on the type
    #[error("unknown property")]
    UnknownProperty,
}

/// Aggregated validation errors for one write
///
/// Writes collect every problem before rejecting, so a client sees all of
/// them in one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBuffer {
    errors: Vec<ValidationError>,
}

impl ErrorBuffer {
    /// Create empty buffer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding one error
    #[inline]
    #[must_use]
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Add an error
    #[inline]
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Move all errors from another buffer into this one
    #[inline]
    pub fn absorb(&mut self, other: ErrorBuffer) {
        self.errors.extend(other.errors);
    }

    /// Collected errors
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of errors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if no error was collected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when empty, otherwise a validation error carrying the buffer
    ///
    /// # Errors
    /// Returns [`FrameworkError::Validation`] if any error was collected
    pub fn into_result(self) -> Result<(), FrameworkError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FrameworkError::Validation(self))
        }
    }
}

impl std::fmt::Display for ErrorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// Schema registration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Type registered twice
    #[error("type already registered: {0}")]
    DuplicateType(String),

    /// Parent type not registered
    #[error("type {type_name} extends unknown type {parent}")]
    UnknownParent {
        /// Type being registered
        type_name: String,
        /// Missing parent
        parent: String,
    },

    /// Type not registered
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// Property referenced by name does not exist
    #[error("unknown property {property} on {type_name}")]
    UnknownProperty {
        /// Type searched
        type_name: String,
        /// Missing property
        property: String,
    },

    /// Dynamic property would shadow a static one
    #[error("property {property} on {type_name} is statically declared")]
    ShadowsStatic {
        /// Type
        type_name: String,
        /// Property name
        property: String,
    },

    /// Invalid declaration (bad regex, unknown data type, ...)
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
}
