//! Per-field payload validation
//!
//! Every field is checked independently. Mandatory violations reject the
//! payload as a whole; optional violations are replaced by an explicit `null`
//! and reported as warnings.

use crate::coerce::{coerce, kind_of, CoercionError};
use crate::contract::{RecordShape, ValidationSchema};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Why a field or record failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    /// Mandatory field absent, null or blank
    Missing,

    /// Value present but not coercible to the declared type
    Incoercible(CoercionError),

    /// A record is not a JSON object
    NotAnObject {
        /// JSON kind found instead
        found: &'static str,
    },

    /// The payload is not the shape the contract expects
    WrongShape {
        /// Expected shape
        expected: &'static str,
        /// JSON kind found instead
        found: &'static str,
    },

    /// Fewer rows than the contract requires
    TooFewRows {
        /// Required minimum
        min: usize,
        /// Rows supplied
        found: usize,
    },
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationReason::Missing => write!(f, "missing mandatory value"),
            ViolationReason::Incoercible(e) => write!(f, "{}", e),
            ViolationReason::NotAnObject { found } => {
                write!(f, "expected an object, found {}", found)
            }
            ViolationReason::WrongShape { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ViolationReason::TooFewRows { min, found } => {
                write!(f, "expected at least {} row(s), found {}", min, found)
            }
        }
    }
}

/// One validation violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based row for multi-row payloads
    pub row: Option<usize>,

    /// Field the violation is about; `None` for record-level violations
    pub field: Option<String>,

    /// What went wrong
    pub reason: ViolationReason,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(row) = self.row {
            write!(f, "row {}: ", row)?;
        }
        if let Some(field) = &self.field {
            write!(f, "field '{}': ", field)?;
        }
        write!(f, "{}", self.reason)
    }
}

/// A payload rejected by validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe(.violations))]
pub struct ValidationFailure {
    /// Every violation found, in payload order
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Distinct field names named by the violations, in first-seen order
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for name in self.violations.iter().filter_map(|v| v.field.as_ref()) {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
        fields
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A payload that satisfied its contract
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    /// Normalized object, or array of objects for multi-row contracts
    pub data: Value,

    /// Tolerated optional-field problems
    pub warnings: Vec<String>,
}

/// Validate a parsed payload against a schema
///
/// Output records contain exactly the declared fields, in declaration order;
/// undeclared keys are dropped.
pub fn validate(
    payload: &Value,
    schema: &ValidationSchema,
) -> Result<ValidatedPayload, ValidationFailure> {
    let mut violations = Vec::new();
    let mut warnings = Vec::new();

    let data = match schema.shape {
        RecordShape::Single => {
            let record = match payload {
                Value::Object(obj) => Some(obj),
                // A lone object wrapped in an array is accepted
                Value::Array(items) if items.len() == 1 => match &items[0] {
                    Value::Object(obj) => {
                        warnings.push("unwrapped single-element array".to_string());
                        Some(obj)
                    }
                    _ => None,
                },
                _ => None,
            };

            match record {
                Some(obj) => Value::Object(validate_record(
                    obj,
                    schema,
                    None,
                    &mut violations,
                    &mut warnings,
                )),
                None => {
                    violations.push(Violation {
                        row: None,
                        field: None,
                        reason: ViolationReason::WrongShape {
                            expected: "a single object",
                            found: kind_of(payload),
                        },
                    });
                    Value::Null
                }
            }
        }
        RecordShape::Rows { min_rows } => match rows_of(payload) {
            Some(rows) => {
                if rows.len() < min_rows {
                    violations.push(Violation {
                        row: None,
                        field: None,
                        reason: ViolationReason::TooFewRows {
                            min: min_rows,
                            found: rows.len(),
                        },
                    });
                }

                let mut out = Vec::with_capacity(rows.len());
                for (idx, row) in rows.iter().enumerate() {
                    match row {
                        Value::Object(obj) => out.push(Value::Object(validate_record(
                            obj,
                            schema,
                            Some(idx + 1),
                            &mut violations,
                            &mut warnings,
                        ))),
                        other => violations.push(Violation {
                            row: Some(idx + 1),
                            field: None,
                            reason: ViolationReason::NotAnObject {
                                found: kind_of(other),
                            },
                        }),
                    }
                }
                Value::Array(out)
            }
            None => {
                violations.push(Violation {
                    row: None,
                    field: None,
                    reason: ViolationReason::WrongShape {
                        expected: "an array of objects",
                        found: kind_of(payload),
                    },
                });
                Value::Null
            }
        },
    };

    if violations.is_empty() {
        Ok(ValidatedPayload { data, warnings })
    } else {
        Err(ValidationFailure { violations })
    }
}

/// Rows of a multi-row payload; `{"data": [...]}` is unwrapped
fn rows_of(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(rows) => Some(rows),
        Value::Object(obj) if obj.len() == 1 => obj.get("data").and_then(Value::as_array),
        _ => None,
    }
}

fn validate_record(
    record: &Map<String, Value>,
    schema: &ValidationSchema,
    row: Option<usize>,
    violations: &mut Vec<Violation>,
    warnings: &mut Vec<String>,
) -> Map<String, Value> {
    let mut out = Map::new();

    for rule in &schema.fields {
        let value = record.get(&rule.name).filter(|v| !is_absent(v));

        let coerced = match value {
            None => {
                if rule.mandatory {
                    violations.push(Violation {
                        row,
                        field: Some(rule.name.clone()),
                        reason: ViolationReason::Missing,
                    });
                }
                Value::Null
            }
            Some(v) => match coerce(v, rule.field_type) {
                Ok(coerced) => coerced,
                Err(e) if rule.mandatory => {
                    violations.push(Violation {
                        row,
                        field: Some(rule.name.clone()),
                        reason: ViolationReason::Incoercible(e),
                    });
                    Value::Null
                }
                Err(e) => {
                    let violation = Violation {
                        row,
                        field: Some(rule.name.clone()),
                        reason: ViolationReason::Incoercible(e),
                    };
                    warn!("Optional field set to null: {}", violation);
                    warnings.push(format!("{}; set to null", violation));
                    Value::Null
                }
            },
        };

        out.insert(rule.name.clone(), coerced);
    }

    out
}

/// Null and blank text count as absent
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::FieldRule;
    use docsift_domain::FieldType;
    use serde_json::json;

    fn rule(name: &str, field_type: FieldType, mandatory: bool) -> FieldRule {
        FieldRule {
            name: name.to_string(),
            field_type,
            mandatory,
            description: None,
        }
    }

    fn header_schema() -> ValidationSchema {
        ValidationSchema {
            shape: RecordShape::Single,
            fields: vec![
                rule("invoice_number", FieldType::String, true),
                rule("total_amount", FieldType::Number, true),
                rule("due_date", FieldType::Date, false),
            ],
        }
    }

    fn rows_schema(min_rows: usize, mandatory: bool) -> ValidationSchema {
        ValidationSchema {
            shape: RecordShape::Rows { min_rows },
            fields: vec![
                rule("assignee", FieldType::String, mandatory),
                rule("due_date", FieldType::Date, false),
            ],
        }
    }

    #[test]
    fn test_valid_record() {
        let payload = json!({"invoice_number": "INV-001", "total_amount": 120.00});
        let result = validate(&payload, &header_schema()).unwrap();

        assert_eq!(
            result.data,
            json!({"invoice_number": "INV-001", "total_amount": 120.0, "due_date": null})
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_output_keys_follow_declaration_order() {
        let payload = json!({"total_amount": 5, "extra": "dropped", "invoice_number": "A"});
        let result = validate(&payload, &header_schema()).unwrap();

        let keys: Vec<&String> = result.data.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["invoice_number", "total_amount", "due_date"]);
    }

    #[test]
    fn test_missing_mandatory_rejects_record() {
        let payload = json!({"invoice_number": "INV-001", "total_amount": null});
        let err = validate(&payload, &header_schema()).unwrap_err();

        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field.as_deref(), Some("total_amount"));
        assert_eq!(err.violations[0].reason, ViolationReason::Missing);
        assert_eq!(err.fields(), vec!["total_amount"]);
    }

    #[test]
    fn test_lists_every_mandatory_violation() {
        let payload = json!({"invoice_number": "  ", "total_amount": "$120"});
        let err = validate(&payload, &header_schema()).unwrap_err();

        assert_eq!(err.fields(), vec!["invoice_number", "total_amount"]);
        assert!(err.to_string().contains("field 'invoice_number': missing mandatory value"));
        assert!(err.to_string().contains("field 'total_amount'"));
    }

    #[test]
    fn test_optional_incoercible_becomes_null_with_warning() {
        let payload = json!({
            "invoice_number": "INV-1",
            "total_amount": 10,
            "due_date": "November 10, 2025"
        });
        let result = validate(&payload, &header_schema()).unwrap();

        assert_eq!(result.data["due_date"], Value::Null);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("due_date"));
    }

    #[test]
    fn test_single_record_rejects_array_of_many() {
        let payload = json!([{"invoice_number": "A"}, {"invoice_number": "B"}]);
        let err = validate(&payload, &header_schema()).unwrap_err();
        assert!(matches!(err.violations[0].reason, ViolationReason::WrongShape { .. }));
    }

    #[test]
    fn test_single_record_unwraps_lone_array_element() {
        let payload = json!([{"invoice_number": "A", "total_amount": 1}]);
        let result = validate(&payload, &header_schema()).unwrap();
        assert!(result.data.is_object());
    }

    #[test]
    fn test_rows_always_yield_array() {
        let result = validate(&json!([]), &rows_schema(0, false)).unwrap();
        assert_eq!(result.data, json!([]));

        let payload = json!([{"assignee": "Bob", "due_date": "2025-11-05"}, {"assignee": "Charlie"}]);
        let result = validate(&payload, &rows_schema(0, false)).unwrap();
        assert_eq!(
            result.data,
            json!([
                {"assignee": "Bob", "due_date": "2025-11-05"},
                {"assignee": "Charlie", "due_date": null}
            ])
        );
    }

    #[test]
    fn test_rows_unwrap_data_key() {
        let payload = json!({"data": [{"assignee": "Alice"}]});
        let result = validate(&payload, &rows_schema(0, false)).unwrap();
        assert_eq!(result.data.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_rows_reject_bare_object() {
        let payload = json!({"assignee": "Alice"});
        let err = validate(&payload, &rows_schema(0, false)).unwrap_err();
        assert!(matches!(err.violations[0].reason, ViolationReason::WrongShape { .. }));
    }

    #[test]
    fn test_rows_min_rows_enforced() {
        let err = validate(&json!([]), &rows_schema(1, true)).unwrap_err();
        assert_eq!(
            err.violations[0].reason,
            ViolationReason::TooFewRows { min: 1, found: 0 }
        );
    }

    #[test]
    fn test_row_violation_carries_row_index() {
        let payload = json!([{"assignee": "Bob"}, {"due_date": "2025-10-30"}, "junk"]);
        let err = validate(&payload, &rows_schema(1, true)).unwrap_err();

        assert_eq!(err.violations.len(), 2);
        assert_eq!(err.violations[0].row, Some(2));
        assert_eq!(err.violations[0].field.as_deref(), Some("assignee"));
        assert_eq!(err.violations[1].row, Some(3));
        assert!(err.to_string().starts_with("row 2: field 'assignee'"));
    }
}
