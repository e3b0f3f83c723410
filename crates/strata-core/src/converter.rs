//! Property converters
//!
//! A converter maps values one step toward storage (`convert`) and one step
//! back toward the client (`revert`). Each property has two optional slots:
//!
//! - database converter: memory <-> storage
//! - input converter: external <-> memory
//!
//! An empty slot is the identity mapping. `null` passes through every
//! built-in converter unchanged.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use std::fmt::Debug;

/// Bidirectional value converter
pub trait PropertyConverter: Send + Sync + Debug {
    /// Converter identity reported by schema introspection
    fn name(&self) -> &'static str;

    /// Convert one step toward storage
    ///
    /// # Errors
    /// Returns error if the value cannot be represented
    fn convert(&self, value: Value) -> Result<Value, ConversionError>;

    /// Convert one step toward the client
    ///
    /// # Errors
    /// Returns error if the value cannot be represented
    fn revert(&self, value: Value) -> Result<Value, ConversionError>;
}

/// Conversion failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{converter}: {message}")]
pub struct ConversionError {
    /// Converter that failed
    pub converter: &'static str,
    /// What was wrong
    pub message: String,
}

impl ConversionError {
    /// Create conversion error
    #[inline]
    #[must_use]
    pub fn new(converter: &'static str, message: impl Into<String>) -> Self {
        Self {
            converter,
            message: message.into(),
        }
    }
}

fn parse_i64(name: &'static str, value: &Value) -> Result<i64, ConversionError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ConversionError::new(name, format!("{n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConversionError::new(name, format!("cannot parse '{s}' as integer"))),
        other => Err(ConversionError::new(name, format!("cannot convert {other}"))),
    }
}

/// Input converter for 32-bit integers
#[derive(Debug, Clone, Copy, Default)]
pub struct IntConverter;

impl PropertyConverter for IntConverter {
    fn name(&self) -> &'static str {
        "IntConverter"
    }

    fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(value);
        }
        let n = parse_i64(self.name(), &value)?;
        let n = i32::try_from(n)
            .map_err(|_| ConversionError::new(self.name(), format!("{n} out of range")))?;
        Ok(Value::from(n))
    }

    fn revert(&self, value: Value) -> Result<Value, ConversionError> {
        Ok(value)
    }
}

/// Input converter for 64-bit integers
#[derive(Debug, Clone, Copy, Default)]
pub struct LongConverter;

impl PropertyConverter for LongConverter {
    fn name(&self) -> &'static str {
        "LongConverter"
    }

    fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(value);
        }
        parse_i64(self.name(), &value).map(Value::from)
    }

    fn revert(&self, value: Value) -> Result<Value, ConversionError> {
        Ok(value)
    }
}

/// Input converter for floating point numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleConverter;

impl PropertyConverter for DoubleConverter {
    fn name(&self) -> &'static str {
        "DoubleConverter"
    }

    fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        let parsed = match &value {
            Value::Null => return Ok(value),
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| ConversionError::new(self.name(), format!("cannot convert {value}")))
    }

    fn revert(&self, value: Value) -> Result<Value, ConversionError> {
        Ok(value)
    }
}

/// Input converter for booleans (`true`/`false`/`1`/`0`)
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl PropertyConverter for BooleanConverter {
    fn name(&self) -> &'static str {
        "BooleanConverter"
    }

    fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        match &value {
            Value::Null | Value::Bool(_) => Ok(value),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(ConversionError::new(self.name(), format!("cannot parse '{s}'"))),
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(Value::Bool(true)),
                Some(0) => Ok(Value::Bool(false)),
                _ => Err(ConversionError::new(self.name(), format!("cannot convert {n}"))),
            },
            other => Err(ConversionError::new(self.name(), format!("cannot convert {other}"))),
        }
    }

    fn revert(&self, value: Value) -> Result<Value, ConversionError> {
        Ok(value)
    }
}

/// Database converter for timestamps
///
/// Memory form is an RFC 3339 string, storage form is epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateConverter;

impl DateConverter {
    /// Format epoch millis as the memory representation
    #[must_use]
    pub fn format_millis(millis: i64) -> Option<String> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Parse the memory representation into epoch millis
    #[must_use]
    pub fn parse_millis(text: &str) -> Option<i64> {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.timestamp_millis())
    }
}

impl PropertyConverter for DateConverter {
    fn name(&self) -> &'static str {
        "DateConverter"
    }

    fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        match &value {
            Value::Null => Ok(value),
            Value::String(s) => Self::parse_millis(s)
                .map(Value::from)
                .ok_or_else(|| ConversionError::new(self.name(), format!("'{s}' is not RFC 3339"))),
            other => Err(ConversionError::new(self.name(), format!("cannot convert {other}"))),
        }
    }

    fn revert(&self, value: Value) -> Result<Value, ConversionError> {
        match &value {
            Value::Null => Ok(value),
            Value::Number(n) => n
                .as_i64()
                .and_then(Self::format_millis)
                .map(Value::from)
                .ok_or_else(|| ConversionError::new(self.name(), format!("{n} is not a timestamp"))),
            other => Err(ConversionError::new(self.name(), format!("stored {other} is not a timestamp"))),
        }
    }
}

/// Database converter that stores strings lower-cased
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseConverter;

impl PropertyConverter for LowercaseConverter {
    fn name(&self) -> &'static str {
        "LowercaseConverter"
    }

    fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        match value {
            Value::String(s) => Ok(Value::String(s.to_lowercase())),
            Value::Null => Ok(Value::Null),
            other => Err(ConversionError::new(self.name(), format!("cannot convert {other}"))),
        }
    }

    fn revert(&self, value: Value) -> Result<Value, ConversionError> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_converter_parses_strings() {
        assert_eq!(IntConverter.convert(json!("42")).unwrap(), json!(42));
        assert_eq!(IntConverter.convert(json!(7)).unwrap(), json!(7));
        assert!(IntConverter.convert(json!("4x")).is_err());
        assert!(IntConverter.convert(json!(i64::MAX)).is_err());
        assert_eq!(IntConverter.convert(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn long_converter_rejects_fractions() {
        assert_eq!(LongConverter.convert(json!("-12")).unwrap(), json!(-12));
        assert!(LongConverter.convert(json!(1.5)).is_err());
    }

    #[test]
    fn double_converter() {
        assert_eq!(DoubleConverter.convert(json!("2.5")).unwrap(), json!(2.5));
        assert!(DoubleConverter.convert(json!("NaN")).is_err());
        assert!(DoubleConverter.convert(json!(true)).is_err());
    }

    #[test]
    fn boolean_converter() {
        assert_eq!(BooleanConverter.convert(json!("TRUE")).unwrap(), json!(true));
        assert_eq!(BooleanConverter.convert(json!(0)).unwrap(), json!(false));
        assert!(BooleanConverter.convert(json!("maybe")).is_err());
    }

    #[test]
    fn date_converter_roundtrip() {
        let stored = DateConverter.convert(json!("2013-05-01T12:30:00Z")).unwrap();
        assert_eq!(stored, json!(1_367_411_400_000_i64));
        let memory = DateConverter.revert(stored).unwrap();
        assert_eq!(memory, json!("2013-05-01T12:30:00.000Z"));
    }

    #[test]
    fn date_converter_rejects_garbage() {
        assert!(DateConverter.convert(json!("yesterday")).is_err());
        assert!(DateConverter.revert(json!("not a number")).is_err());
    }

    #[test]
    fn lowercase_converter() {
        assert_eq!(
            LowercaseConverter.convert(json!("MiXeD")).unwrap(),
            json!("mixed")
        );
        assert!(LowercaseConverter.convert(json!(3)).is_err());
    }
}
