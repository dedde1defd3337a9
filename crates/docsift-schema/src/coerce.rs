//! Value coercion to declared field types
//!
//! Coercion order for `boolean` fields: the token set
//! (`true/false/yes/no/1/0`, any case) is checked first, then JSON numbers
//! exactly equal to 0 or 1. `number` fields never accept boolean tokens.

use chrono::NaiveDate;
use docsift_domain::FieldType;
use serde_json::{Number, Value};
use thiserror::Error;

/// Why a value could not be coerced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The JSON kind cannot represent the declared type
    #[error("expected {expected}, found {found}")]
    WrongKind {
        /// Declared type
        expected: FieldType,
        /// JSON kind that was supplied
        found: &'static str,
    },

    /// Text that does not parse to a finite number
    #[error("{0:?} is not a plain finite number")]
    NotANumber(String),

    /// Text outside the boolean token set
    #[error("{0:?} is not a boolean token")]
    NotABoolean(String),

    /// Text that is not a `YYYY-MM-DD` date
    #[error("{0:?} is not an ISO-8601 date (YYYY-MM-DD)")]
    NotADate(String),
}

/// Coerce a present, non-null value to the declared type
///
/// Returns the normalized value: numbers as JSON numbers, booleans as JSON
/// booleans, dates as zero-padded `YYYY-MM-DD` strings.
pub fn coerce(value: &Value, field_type: FieldType) -> Result<Value, CoercionError> {
    match field_type {
        FieldType::String => coerce_string(value),
        FieldType::Number => coerce_number(value),
        FieldType::Boolean => coerce_boolean(value),
        FieldType::Date => coerce_date(value),
    }
}

fn coerce_string(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(wrong_kind(FieldType::String, other)),
    }
}

fn coerce_number(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => parse_number(s)
            .map(Value::Number)
            .ok_or_else(|| CoercionError::NotANumber(s.clone())),
        other => Err(wrong_kind(FieldType::Number, other)),
    }
}

/// Parse plain numeric text; currency symbols and separators are rejected
fn parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

fn coerce_boolean(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::NotABoolean(s.clone())),
        },
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Ok(Value::Bool(true)),
            Some(f) if f == 0.0 => Ok(Value::Bool(false)),
            _ => Err(CoercionError::NotABoolean(n.to_string())),
        },
        other => Err(wrong_kind(FieldType::Boolean, other)),
    }
}

fn coerce_date(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::String(s) => {
            let text = s.trim();
            if !is_iso_date_shape(text) {
                return Err(CoercionError::NotADate(s.clone()));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| CoercionError::NotADate(s.clone()))
        }
        other => Err(wrong_kind(FieldType::Date, other)),
    }
}

/// Exactly `YYYY-MM-DD`: chrono alone accepts unpadded parts and signed years
fn is_iso_date_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn wrong_kind(expected: FieldType, value: &Value) -> CoercionError {
    CoercionError::WrongKind {
        expected,
        found: kind_of(value),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_accepts_scalars() {
        assert_eq!(coerce(&json!("INV-001"), FieldType::String), Ok(json!("INV-001")));
        assert_eq!(coerce(&json!(42), FieldType::String), Ok(json!("42")));
        assert_eq!(coerce(&json!(true), FieldType::String), Ok(json!("true")));
        assert!(coerce(&json!(["a"]), FieldType::String).is_err());
    }

    #[test]
    fn test_number_from_text() {
        assert_eq!(coerce(&json!("120.00"), FieldType::Number), Ok(json!(120.0)));
        assert_eq!(coerce(&json!(" 7 "), FieldType::Number), Ok(json!(7)));
        assert_eq!(coerce(&json!(-3.5), FieldType::Number), Ok(json!(-3.5)));
    }

    #[test]
    fn test_number_rejects_decorated_text() {
        for text in ["$120.00", "1,200", "120 USD", "inf", "NaN", ""] {
            assert_eq!(
                coerce(&json!(text), FieldType::Number),
                Err(CoercionError::NotANumber(text.to_string())),
                "{} should not coerce",
                text
            );
        }
        assert!(matches!(
            coerce(&json!(true), FieldType::Number),
            Err(CoercionError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_boolean_tokens() {
        for (text, expected) in [
            ("true", true),
            ("YES", true),
            ("1", true),
            ("False", false),
            ("no", false),
            ("0", false),
        ] {
            assert_eq!(coerce(&json!(text), FieldType::Boolean), Ok(json!(expected)));
        }
        assert!(coerce(&json!("maybe"), FieldType::Boolean).is_err());
    }

    #[test]
    fn test_boolean_from_numbers() {
        assert_eq!(coerce(&json!(1), FieldType::Boolean), Ok(json!(true)));
        assert_eq!(coerce(&json!(0), FieldType::Boolean), Ok(json!(false)));
        assert!(coerce(&json!(2), FieldType::Boolean).is_err());
    }

    #[test]
    fn test_zero_token_depends_on_declared_type() {
        assert_eq!(coerce(&json!("0"), FieldType::Boolean), Ok(json!(false)));
        assert_eq!(coerce(&json!("0"), FieldType::Number), Ok(json!(0)));
        assert!(coerce(&json!("yes"), FieldType::Number).is_err());
    }

    #[test]
    fn test_date_iso_calendar() {
        assert_eq!(coerce(&json!("2025-10-26"), FieldType::Date), Ok(json!("2025-10-26")));
        assert!(coerce(&json!("October 26, 2025"), FieldType::Date).is_err());
        assert!(coerce(&json!("2025-02-30"), FieldType::Date).is_err());
        assert!(coerce(&json!(20251026), FieldType::Date).is_err());
        assert_eq!(coerce(&json!(" 2025-01-05 "), FieldType::Date), Ok(json!("2025-01-05")));
        assert!(coerce(&json!("2025-1-5"), FieldType::Date).is_err());
        assert!(coerce(&json!("2025-01-5"), FieldType::Date).is_err());
        assert!(coerce(&json!("+2025-01-05"), FieldType::Date).is_err());
        assert!(coerce(&json!("2025/01/05"), FieldType::Date).is_err());
    }
}
