//! Service configuration
//!
//! Loaded from TOML; every field has a default so partial files work.
//!
//! ```toml
//! default_page_size = 20
//! max_page_size = 500
//! default_view = "public"
//! log_filter = "strata=debug"
//! json_logs = false
//! loose_search_param = "loose"
//! ```

use crate::error::RestError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::PUBLIC_VIEW;

/// Configuration of the resource layer and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    /// Page size when the request names none (0 = unpaged)
    pub default_page_size: usize,
    /// Upper bound for requested page sizes (0 = unbounded)
    pub max_page_size: usize,
    /// View used when the request names none
    pub default_view: String,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Request parameter switching on loose (substring) search
    pub loose_search_param: String,
}

impl StrataConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns [`RestError::Config`] on malformed TOML
    pub fn from_toml(text: &str) -> Result<Self, RestError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// With default page size
    #[inline]
    #[must_use]
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// With maximum page size
    #[inline]
    #[must_use]
    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size;
        self
    }

    /// With default view
    #[inline]
    #[must_use]
    pub fn with_default_view(mut self, view: impl Into<String>) -> Self {
        self.default_view = view.into();
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// With JSON logs
    #[inline]
    #[must_use]
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// With loose search parameter name
    #[inline]
    #[must_use]
    pub fn with_loose_search_param(mut self, name: impl Into<String>) -> Self {
        self.loose_search_param = name.into();
        self
    }

    /// Effective page size for a request
    ///
    /// `None` falls back to the default; the result never exceeds the
    /// maximum, and 0 means unpaged.
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        let size = requested.unwrap_or(self.default_page_size);
        match (size, self.max_page_size) {
            (_, 0) => size,
            (0, max) if requested.is_some() => max,
            (size, max) => size.min(max),
        }
    }
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 500,
            default_view: PUBLIC_VIEW.to_string(),
            log_filter: "strata=info".to_string(),
            json_logs: false,
            loose_search_param: "loose".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StrataConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.default_view, "public");
        assert!(!config.json_logs);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StrataConfig::from_toml("max_page_size = 50\njson_logs = true").unwrap();
        assert_eq!(config.max_page_size, 50);
        assert!(config.json_logs);
        assert_eq!(config.default_page_size, 20);
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(
            StrataConfig::from_toml("max_page_size = \"many\""),
            Err(RestError::Config(_))
        ));
    }

    #[test]
    fn clamp_page_size() {
        let config = StrataConfig::new()
            .with_default_page_size(10)
            .with_max_page_size(100);
        assert_eq!(config.clamp_page_size(None), 10);
        assert_eq!(config.clamp_page_size(Some(30)), 30);
        assert_eq!(config.clamp_page_size(Some(1000)), 100);
        // clients cannot switch paging off past the maximum
        assert_eq!(config.clamp_page_size(Some(0)), 100);

        let unbounded = config.with_max_page_size(0);
        assert_eq!(unbounded.clamp_page_size(Some(0)), 0);
        assert_eq!(unbounded.clamp_page_size(Some(1000)), 1000);
    }

    #[test]
    fn unpaged_default() {
        let config = StrataConfig::new().with_default_page_size(0);
        assert_eq!(config.clamp_page_size(None), 0);
    }
}
