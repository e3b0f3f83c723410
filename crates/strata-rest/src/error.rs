//! Error types for Strata REST
//!
//! Request handling reports [`FrameworkError`]; this enum covers the
//! surrounding setup:
//! - Configuration files
//! - Fixture files (schema document plus graph)
//! - Malformed request paths and methods

use crate::path::PathError;
use strata_core::{FrameworkError, RegistryError};
use strata_graph::StoreError;

/// Setup and loading errors
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// File could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid TOML for [`StrataConfig`](crate::StrataConfig)
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Fixture is not valid JSON
    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),

    /// Schema document could not be registered
    #[error("schema error: {0}")]
    Registry(#[from] RegistryError),

    /// Graph could not be loaded
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Request path could not be parsed
    #[error("bad path: {0}")]
    Path(#[from] PathError),

    /// Unknown request method
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

impl From<PathError> for FrameworkError {
    fn from(error: PathError) -> Self {
        Self::IllegalPath(error.to_string())
    }
}
