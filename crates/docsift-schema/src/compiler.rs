//! Task compilation

use crate::contract::{CompiledContract, FieldRule, RecordShape, ValidationSchema};
use crate::error::{SchemaCompilationError, UnknownType};
use crate::instruction::InstructionBuilder;
use docsift_domain::ExtractionTask;
use std::collections::HashSet;
use tracing::debug;

/// Compile a task with the default compiler
pub fn compile(task: &ExtractionTask) -> Result<CompiledContract, SchemaCompilationError> {
    SchemaCompiler::default().compile(task)
}

/// Compiles task declarations into contracts
///
/// Holds only immutable settings, so one compiler serves every request.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    preamble: Option<String>,
}

impl SchemaCompiler {
    /// Create a compiler with no instruction preamble
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend fixed role text to every generated instruction
    pub fn with_preamble(mut self, preamble: Option<String>) -> Self {
        self.preamble = preamble;
        self
    }

    /// Compile a task into a contract
    ///
    /// Checks run in a fixed order (field list, names, types, duplicates,
    /// multi_row) and the first failing check is reported with every field it
    /// applies to.
    pub fn compile(
        &self,
        task: &ExtractionTask,
    ) -> Result<CompiledContract, SchemaCompilationError> {
        if task.fields.is_empty() {
            return Err(SchemaCompilationError::EmptyFieldList);
        }

        if let Some(idx) = task.fields.iter().position(|f| f.name.trim().is_empty()) {
            return Err(SchemaCompilationError::EmptyFieldName(idx + 1));
        }

        let unknown: Vec<UnknownType> = task
            .fields
            .iter()
            .filter(|f| f.field_type().is_none())
            .map(|f| UnknownType {
                field: f.name.clone(),
                token: f.type_token.clone(),
            })
            .collect();
        if !unknown.is_empty() {
            return Err(SchemaCompilationError::UnknownFieldTypes(unknown));
        }

        let duplicates = duplicate_names(task);
        if !duplicates.is_empty() {
            return Err(SchemaCompilationError::DuplicateFieldNames(duplicates));
        }

        let (row_fields, record_fields): (Vec<_>, Vec<_>) =
            task.fields.iter().partition(|f| f.multi_row);
        if !row_fields.is_empty() && !record_fields.is_empty() {
            return Err(SchemaCompilationError::InconsistentMultiRow {
                row_fields: row_fields.iter().map(|f| f.name.clone()).collect(),
                record_fields: record_fields.iter().map(|f| f.name.clone()).collect(),
            });
        }

        let fields: Vec<FieldRule> = task
            .fields
            .iter()
            .filter_map(|f| {
                f.field_type().map(|field_type| FieldRule {
                    name: f.name.clone(),
                    field_type,
                    mandatory: f.mandatory,
                    description: f.description().map(str::to_string),
                })
            })
            .collect();

        let multi_row = task.multi_row || !row_fields.is_empty();
        let shape = if multi_row {
            let min_rows = usize::from(fields.iter().any(|f| f.mandatory));
            RecordShape::Rows { min_rows }
        } else {
            RecordShape::Single
        };

        let schema = ValidationSchema { shape, fields };
        let instruction = InstructionBuilder::new(&task.aim, &schema)
            .with_preamble(self.preamble.as_deref())
            .build();

        debug!(
            fields = schema.fields.len(),
            multi_row,
            instruction_len = instruction.len(),
            "Compiled extraction contract"
        );

        Ok(CompiledContract::new(task.aim.clone(), schema, instruction))
    }
}

/// Names that occur more than once, in first-occurrence order
fn duplicate_names(task: &ExtractionTask) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for field in &task.fields {
        if !seen.insert(field.name.as_str()) && reported.insert(field.name.as_str()) {
            duplicates.push(field.name.clone());
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::{FieldSpec, FieldType};

    fn header_task() -> ExtractionTask {
        ExtractionTask::new(
            "extract header",
            vec![
                FieldSpec::new("invoice_number", FieldType::String).mandatory(),
                FieldSpec::new("total_amount", FieldType::Number).mandatory(),
            ],
        )
    }

    #[test]
    fn test_compile_single_record() {
        let contract = compile(&header_task()).unwrap();
        assert!(!contract.is_multi_row());
        assert_eq!(contract.schema().shape, RecordShape::Single);
        assert_eq!(contract.schema().mandatory_fields(), vec!["invoice_number", "total_amount"]);
        assert_eq!(contract.aim(), "extract header");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = compile(&header_task()).unwrap();
        let b = compile(&header_task()).unwrap();
        assert_eq!(a.instruction(), b.instruction());
        assert_eq!(a.schema(), b.schema());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_field_list() {
        let task = ExtractionTask::new("nothing", vec![]);
        assert_eq!(compile(&task), Err(SchemaCompilationError::EmptyFieldList));
    }

    #[test]
    fn test_empty_field_name() {
        let task = ExtractionTask::new(
            "bad",
            vec![
                FieldSpec::new("ok", FieldType::String),
                FieldSpec::new("  ", FieldType::String),
            ],
        );
        assert_eq!(compile(&task), Err(SchemaCompilationError::EmptyFieldName(2)));
    }

    #[test]
    fn test_duplicate_names_are_case_sensitive() {
        let task = ExtractionTask::new(
            "dupes",
            vec![
                FieldSpec::new("total", FieldType::Number),
                FieldSpec::new("Total", FieldType::Number),
                FieldSpec::new("total", FieldType::String),
                FieldSpec::new("total", FieldType::String),
            ],
        );

        let err = compile(&task).unwrap_err();
        assert_eq!(err, SchemaCompilationError::DuplicateFieldNames(vec!["total".to_string()]));
        assert_eq!(err.fields(), vec!["total"]);
    }

    #[test]
    fn test_unknown_type_token() {
        let mut field = FieldSpec::new("amount", FieldType::Number);
        field.type_token = "currency".to_string();
        let task = ExtractionTask::new("money", vec![field]);

        match compile(&task) {
            Err(SchemaCompilationError::UnknownFieldTypes(unknown)) => {
                assert_eq!(unknown.len(), 1);
                assert_eq!(unknown[0].field, "amount");
                assert_eq!(unknown[0].token, "currency");
            }
            other => panic!("Expected UnknownFieldTypes, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_token_fails_compilation() {
        let task: ExtractionTask = serde_json::from_str(
            r#"{"aim": "a", "schema": [{"name": "total", "mandatory": true}]}"#,
        )
        .unwrap();

        match compile(&task) {
            Err(SchemaCompilationError::UnknownFieldTypes(unknown)) => {
                assert_eq!(unknown.len(), 1);
                assert_eq!(unknown[0].field, "total");
                assert_eq!(unknown[0].token, "");
            }
            other => panic!("Expected UnknownFieldTypes, got {:?}", other),
        }
    }

    #[test]
    fn test_inconsistent_multi_row() {
        let task = ExtractionTask::new(
            "mixed",
            vec![
                FieldSpec::new("sku", FieldType::String).multi_row(),
                FieldSpec::new("qty", FieldType::Number),
            ],
        );

        let err = compile(&task).unwrap_err();
        assert!(matches!(err, SchemaCompilationError::InconsistentMultiRow { .. }));
        assert!(err.fields().contains(&"sku".to_string()));
    }

    #[test]
    fn test_multi_row_min_rows() {
        let optional_only = ExtractionTask::new(
            "items",
            vec![
                FieldSpec::new("sku", FieldType::String).multi_row(),
                FieldSpec::new("qty", FieldType::Number).multi_row(),
            ],
        );
        let contract = compile(&optional_only).unwrap();
        assert_eq!(contract.schema().shape, RecordShape::Rows { min_rows: 0 });

        let with_mandatory = ExtractionTask::new(
            "items",
            vec![
                FieldSpec::new("sku", FieldType::String).multi_row().mandatory(),
                FieldSpec::new("qty", FieldType::Number).multi_row(),
            ],
        );
        let contract = compile(&with_mandatory).unwrap();
        assert_eq!(contract.schema().shape, RecordShape::Rows { min_rows: 1 });
    }

    #[test]
    fn test_task_level_multi_row_flag() {
        let task = ExtractionTask::new(
            "action items",
            vec![
                FieldSpec::new("assignee", FieldType::String),
                FieldSpec::new("due_date", FieldType::Date),
            ],
        )
        .with_multi_row(true);

        let contract = compile(&task).unwrap();
        assert!(contract.is_multi_row());
        assert!(contract.instruction().contains("Return a JSON array of objects"));
    }

    #[test]
    fn test_preamble_from_compiler() {
        let compiler = SchemaCompiler::new()
            .with_preamble(Some("You are an extraction specialist.".to_string()));
        let contract = compiler.compile(&header_task()).unwrap();
        assert!(contract.instruction().starts_with("You are an extraction specialist."));
    }
}
