//! Value constraints checked on user writes
//!
//! Constraints run against the memory representation after input
//! conversion. Properties flagged `system` skip them.

use regex::Regex;
use serde_json::Value;

/// Declarative rule on a property value
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must not be null
    NotNull,
    /// String must contain a non-whitespace character
    NotBlank,
    /// String must match the pattern
    Pattern(Regex),
    /// String must not exceed this many characters
    MaxLength(usize),
    /// Number must be within the inclusive bounds
    Range {
        /// Lower bound
        min: Option<f64>,
        /// Upper bound
        max: Option<f64>,
    },
}

impl Constraint {
    /// Build a pattern constraint
    ///
    /// # Errors
    /// Returns the regex error if the pattern does not compile
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Check a memory value, returning a description of the violation
    ///
    /// Only [`Constraint::NotNull`] applies to null values.
    ///
    /// # Errors
    /// Returns a human-readable message when the rule is violated
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Self::NotNull, Value::Null) => Err("must not be null".to_string()),
            (_, Value::Null) | (Self::NotNull, _) => Ok(()),
            (Self::NotBlank, Value::String(s)) if s.trim().is_empty() => {
                Err("must not be blank".to_string())
            }
            (Self::Pattern(re), Value::String(s)) if !re.is_match(s) => {
                Err(format!("must match {}", re.as_str()))
            }
            (Self::MaxLength(max), Value::String(s)) if s.chars().count() > *max => {
                Err(format!("must be at most {max} characters"))
            }
            (Self::Range { min, max }, Value::Number(n)) => {
                let v = n.as_f64().unwrap_or(f64::NAN);
                if min.is_some_and(|m| v < m) || max.is_some_and(|m| v > m) {
                    Err(format!(
                        "must be within [{}, {}]",
                        min.map_or("*".to_string(), |m| m.to_string()),
                        max.map_or("*".to_string(), |m| m.to_string())
                    ))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Check if this is the not-null rule
    #[inline]
    #[must_use]
    pub fn is_not_null(&self) -> bool {
        matches!(self, Self::NotNull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_null() {
        assert!(Constraint::NotNull.check(&Value::Null).is_err());
        assert!(Constraint::NotNull.check(&json!("")).is_ok());
    }

    #[test]
    fn null_passes_other_rules() {
        assert!(Constraint::NotBlank.check(&Value::Null).is_ok());
        assert!(Constraint::MaxLength(1).check(&Value::Null).is_ok());
    }

    #[test]
    fn not_blank() {
        assert!(Constraint::NotBlank.check(&json!("  ")).is_err());
        assert!(Constraint::NotBlank.check(&json!(" a ")).is_ok());
    }

    #[test]
    fn pattern() {
        let c = Constraint::pattern("^[a-z]+$").unwrap();
        assert!(c.check(&json!("abc")).is_ok());
        assert_eq!(c.check(&json!("ABC")).unwrap_err(), "must match ^[a-z]+$");
        assert!(Constraint::pattern("(").is_err());
    }

    #[test]
    fn max_length_counts_chars() {
        let c = Constraint::MaxLength(3);
        assert!(c.check(&json!("äöü")).is_ok());
        assert!(c.check(&json!("abcd")).is_err());
    }

    #[test]
    fn range() {
        let c = Constraint::Range {
            min: Some(0.0),
            max: Some(150.0),
        };
        assert!(c.check(&json!(42)).is_ok());
        assert_eq!(c.check(&json!(-1)).unwrap_err(), "must be within [0, 150]");
        let open = Constraint::Range {
            min: None,
            max: Some(1.0),
        };
        assert_eq!(open.check(&json!(2)).unwrap_err(), "must be within [*, 1]");
    }
}
