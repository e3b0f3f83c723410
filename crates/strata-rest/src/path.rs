//! Request paths
//!
//! Provides [`ResourcePath`], the ordered segments of a request uri.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path of a request, split into segments
///
/// Leading and trailing slashes are insignificant; empty interior segments
/// (`/a//b`) are rejected.
///
/// # Examples
/// - `/Person` → `["Person"]`
/// - `/Person/123/owns/` → `["Person", "123", "owns"]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourcePath(Vec<String>);

impl ResourcePath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get first segment (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Iterator over segments from first to last
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

impl FromStr for ResourcePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let segments = trimmed
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg
                    .chars()
                    .any(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
                {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(segments))
    }
}

impl<'a> IntoIterator for &'a ResourcePath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Path parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path (e.g., `/a//b`)
    #[error("empty path segment")]
    EmptySegment,

    /// Segment contains invalid characters
    #[error("invalid path segment: {0}")]
    InvalidSegment(String),
}
