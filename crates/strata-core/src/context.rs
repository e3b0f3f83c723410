//! Security context passed through every call
//!
//! The framework never interprets permissions; it only forwards the context
//! and looks up resource flags by raw type name.

use dashmap::DashMap;
use std::sync::Arc;

/// Process-wide resource flag table (raw type name -> flag bits)
#[derive(Debug, Clone, Default)]
pub struct ResourceFlags {
    table: Arc<DashMap<String, u64>>,
}

impl ResourceFlags {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags for a raw type (0 when unset)
    #[inline]
    #[must_use]
    pub fn get(&self, raw_type: &str) -> u64 {
        self.table.get(raw_type).map_or(0, |entry| *entry.value())
    }

    /// Set flags for a raw type
    #[inline]
    pub fn set(&self, raw_type: impl Into<String>, flags: u64) {
        self.table.insert(raw_type.into(), flags);
    }
}

/// Capability object identifying the caller
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    user: Option<String>,
    superuser: bool,
    flags: ResourceFlags,
}

impl SecurityContext {
    /// Unauthenticated caller
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Unrestricted caller (imports, maintenance, tests)
    #[inline]
    #[must_use]
    pub fn superuser() -> Self {
        Self {
            superuser: true,
            ..Self::default()
        }
    }

    /// Authenticated caller
    #[inline]
    #[must_use]
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    /// Share a resource flag table
    #[inline]
    #[must_use]
    pub fn with_flags(mut self, flags: ResourceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Authenticated user name
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Check if this is the superuser context
    #[inline]
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.superuser
    }

    /// Resource flags registered for a raw type
    #[inline]
    #[must_use]
    pub fn resource_flags(&self, raw_type: &str) -> u64 {
        self.flags.get(raw_type)
    }

    /// The shared flag table
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &ResourceFlags {
        &self.flags
    }
}
