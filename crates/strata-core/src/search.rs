//! Search attribute extraction
//!
//! Turns request parameters into filter predicates over a resolved type.
//!
//! - A parameter named like a property of the type becomes a predicate
//! - `[a TO b]` on a numeric or date property becomes a range (`*` = open)
//! - In loose mode, string equality becomes case-insensitive substring match
//! - Everything else (paging, sorting, unknown names) is ignored
//!
//! All predicates of a query must match (logical AND).

use crate::converter::DateConverter;
use crate::entity::Entity;
use crate::error::{ErrorBuffer, FrameworkError, ValidationError, ValidationKind};
use crate::property::{PropertyRef, ValueType};
use crate::session::Session;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

/// Parameters consumed by paging, sorting and view selection
pub const RESERVED_PARAMETERS: &[&str] =
    &["sort", "order", "pageSize", "page", "offsetId", "loose", "view"];

static RANGE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\[\s*(\S+)\s+TO\s+(\S+)\s*\]$").ok());

/// Comparison applied by a [`SearchAttribute`]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOperator {
    /// Exact match (entity values also match on their id)
    Equals(Value),
    /// Inclusive bounds; `None` is open
    Range {
        /// Lower bound
        from: Option<Value>,
        /// Upper bound
        to: Option<Value>,
    },
    /// Case-insensitive substring (needle is lower-cased)
    Contains(String),
}

/// One filter predicate
#[derive(Debug, Clone)]
pub struct SearchAttribute {
    key: PropertyRef,
    operator: SearchOperator,
}

impl SearchAttribute {
    /// Create predicate
    #[inline]
    #[must_use]
    pub fn new(key: PropertyRef, operator: SearchOperator) -> Self {
        Self { key, operator }
    }

    /// Property the predicate reads
    #[inline]
    #[must_use]
    pub fn key(&self) -> &PropertyRef {
        &self.key
    }

    /// Comparison
    #[inline]
    #[must_use]
    pub fn operator(&self) -> &SearchOperator {
        &self.operator
    }

    /// Check an entity; unreadable values never match
    #[must_use]
    pub fn matches(&self, session: &Session, entity: &Entity) -> bool {
        let Ok(actual) = self.key.get(session, entity) else {
            return false;
        };
        match &self.operator {
            SearchOperator::Equals(expected) if self.key.value_type().is_rangeable() => {
                !actual.is_null() && compare_values(&actual, expected) == Some(Ordering::Equal)
            }
            SearchOperator::Equals(expected) => {
                &actual == expected
                    || actual
                        .as_object()
                        .and_then(|obj| obj.get("id"))
                        .is_some_and(|id| id == expected)
            }
            SearchOperator::Range { from, to } => {
                if actual.is_null() {
                    return false;
                }
                let above = from.as_ref().map_or(true, |from| {
                    matches!(compare_values(&actual, from), Some(Ordering::Greater | Ordering::Equal))
                });
                let below = to.as_ref().map_or(true, |to| {
                    matches!(compare_values(&actual, to), Some(Ordering::Less | Ordering::Equal))
                });
                above && below
            }
            SearchOperator::Contains(needle) => actual
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str())),
        }
    }

    /// Check that every predicate matches
    #[must_use]
    pub fn matches_all(attributes: &[Self], session: &Session, entity: &Entity) -> bool {
        attributes.iter().all(|a| a.matches(session, entity))
    }

    /// Build predicates for `type_name` from request parameters
    ///
    /// # Errors
    /// Returns [`FrameworkError::Validation`] for values that cannot be
    /// converted to the property's type
    pub fn extract<I, K, V>(
        session: &Session,
        type_name: &str,
        params: I,
        loose: bool,
    ) -> Result<Vec<Self>, FrameworkError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let registry = session.registry().snapshot();
        let mut errors = ErrorBuffer::new();
        let mut attributes = Vec::new();

        for (name, raw) in params {
            let (name, raw) = (name.as_ref(), raw.as_ref());
            if RESERVED_PARAMETERS.contains(&name) {
                continue;
            }
            let Some(key) = registry.property(type_name, name) else {
                tracing::trace!(param = name, "ignoring unmatched search parameter");
                continue;
            };
            if key.is_collection() {
                tracing::debug!(param = name, "collection properties are not searchable");
                continue;
            }

            let invalid = |message: String| {
                ValidationError::new(type_name, name, ValidationKind::InvalidInput(message))
            };

            let operator = if let Some((from, to)) = parse_range(raw) {
                if !key.value_type().is_rangeable() {
                    errors.add(invalid(format!("{} is not rangeable", key.value_type().name())));
                    continue;
                }
                let from = from.map(|v| to_memory(&key, v)).transpose();
                let to = to.map(|v| to_memory(&key, v)).transpose();
                match (from, to) {
                    (Ok(from), Ok(to)) => SearchOperator::Range { from, to },
                    (Err(message), _) | (_, Err(message)) => {
                        errors.add(invalid(message));
                        continue;
                    }
                }
            } else if loose && key.value_type() == ValueType::String {
                SearchOperator::Contains(raw.to_lowercase())
            } else {
                match to_memory(&key, raw) {
                    Ok(value) => SearchOperator::Equals(value),
                    Err(message) => {
                        errors.add(invalid(message));
                        continue;
                    }
                }
            };

            attributes.push(Self::new(key, operator));
        }

        errors.into_result()?;
        Ok(attributes)
    }
}

/// Parse `[from TO to]`; `*` marks an open bound
fn parse_range(raw: &str) -> Option<(Option<&str>, Option<&str>)> {
    let captures = RANGE.as_ref()?.captures(raw.trim())?;
    let bound = |i: usize| captures.get(i).map(|m| m.as_str()).filter(|s| *s != "*");
    Some((bound(1), bound(2)))
}

/// Convert a raw parameter with the key's input converter
///
/// Dates are normalised to the UTC millisecond form reads produce.
fn to_memory(key: &PropertyRef, raw: &str) -> Result<Value, String> {
    let value = Value::String(raw.to_string());
    let value = match key.input_converter() {
        Some(converter) => converter.convert(value).map_err(|e| e.message)?,
        None => value,
    };
    match value {
        Value::String(text) if key.value_type() == ValueType::Date => {
            DateConverter::parse_millis(&text)
                .and_then(DateConverter::format_millis)
                .map(Value::String)
                .ok_or_else(|| format!("'{text}' is not RFC 3339"))
        }
        other => Ok(other),
    }
}

/// Order two memory values of the same kind
///
/// Numbers compare numerically, RFC 3339 strings chronologically, other
/// strings lexically. Mixed kinds are unordered.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            match (DateConverter::parse_millis(x), DateConverter::parse_millis(y)) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range("[1 TO 5]"), Some((Some("1"), Some("5"))));
        assert_eq!(parse_range("[ * TO 5 ]"), Some((None, Some("5"))));
        assert_eq!(parse_range("[2020-01-01T00:00:00Z TO *]"), Some((Some("2020-01-01T00:00:00Z"), None)));
        assert_eq!(parse_range("1 TO 5"), None);
        assert_eq!(parse_range("[1 to 5]"), None);
    }

    #[test]
    fn value_ordering() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Some(Ordering::Greater));
        assert_eq!(compare_values(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(
            compare_values(&json!("2020-01-01T10:00:00+02:00"), &json!("2020-01-01T09:00:00Z")),
            Some(Ordering::Less)
        );
        assert_eq!(compare_values(&Value::Null, &json!(1)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!("a"), &json!(1)), None);
    }

    #[test]
    fn reserved_names() {
        for name in ["sort", "order", "pageSize", "page", "offsetId"] {
            assert!(RESERVED_PARAMETERS.contains(&name));
        }
    }
}
