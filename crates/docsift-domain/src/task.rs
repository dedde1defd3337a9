//! Task module - independently validated extraction units

use crate::field::FieldSpec;
use serde::{Deserialize, Serialize};

/// A user-defined extraction task
///
/// A task pairs a free-text aim with an ordered field list. Tasks are
/// independent: nothing one task produces is visible to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionTask {
    /// Free-text goal, baked into the extraction instruction
    #[serde(default)]
    pub aim: String,

    /// Declared output columns, in output order
    #[serde(rename = "schema", alias = "extraction_schema", default)]
    pub fields: Vec<FieldSpec>,

    /// Task-level row flag; forces row-producing mode when set
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multi_row: bool,
}

impl ExtractionTask {
    /// Create a task with the given aim and fields
    pub fn new(aim: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            aim: aim.into(),
            fields,
            multi_row: false,
        }
    }

    /// Set the task-level row flag
    pub fn with_multi_row(mut self, multi_row: bool) -> Self {
        self.multi_row = multi_row;
        self
    }

    /// Whether the task declares any field at all
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    #[test]
    fn test_deserialize_schema_key() {
        let json = r#"{
            "aim": "extract header",
            "schema": [
                {"name": "invoice_number", "type": "string", "mandatory": true},
                {"name": "total_amount", "type": "number", "mandatory": true}
            ]
        }"#;

        let task: ExtractionTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.aim, "extract header");
        assert_eq!(task.fields.len(), 2);
        assert_eq!(task.fields[1].field_type(), Some(FieldType::Number));
        assert!(!task.multi_row);
    }

    #[test]
    fn test_deserialize_extraction_schema_alias() {
        let json = r#"{
            "aim": "line items",
            "multi_row": true,
            "extraction_schema": [{"name": "sku"}]
        }"#;

        let task: ExtractionTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.fields.len(), 1);
        assert!(task.multi_row);
    }

    #[test]
    fn test_missing_schema_yields_empty_task() {
        let task: ExtractionTask = serde_json::from_str(r#"{"aim": "nothing"}"#).unwrap();
        assert!(!task.has_fields());
    }
}
