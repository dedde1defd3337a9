//! Schema compilation error types

use thiserror::Error;

/// A field whose type token is outside the allowed set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType {
    /// Offending field name
    pub field: String,

    /// Token as declared
    pub token: String,
}

/// Errors that reject a task declaration before any backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaCompilationError {
    /// The task declares no fields
    #[error("Task declares no fields")]
    EmptyFieldList,

    /// A field has an empty name (1-based position)
    #[error("Field at position {0} has an empty name")]
    EmptyFieldName(usize),

    /// Field names repeat within the task
    #[error("Duplicate field names: {}", .0.join(", "))]
    DuplicateFieldNames(Vec<String>),

    /// Type tokens outside string/number/boolean/date
    #[error("Unsupported field types: {}", describe_unknown(.0))]
    UnknownFieldTypes(Vec<UnknownType>),

    /// Some fields are row-producing and others are not
    #[error(
        "Inconsistent multi_row declaration: rows declared by [{}] but not by [{}]",
        .row_fields.join(", "),
        .record_fields.join(", ")
    )]
    InconsistentMultiRow {
        /// Fields declared `multi_row: true`
        row_fields: Vec<String>,
        /// Fields declared `multi_row: false`
        record_fields: Vec<String>,
    },
}

impl SchemaCompilationError {
    /// Names of the fields the error is about
    ///
    /// Nameless fields are reported by position as `#<n>`.
    pub fn fields(&self) -> Vec<String> {
        match self {
            SchemaCompilationError::EmptyFieldList => Vec::new(),
            SchemaCompilationError::EmptyFieldName(position) => vec![format!("#{}", position)],
            SchemaCompilationError::DuplicateFieldNames(names) => names.clone(),
            SchemaCompilationError::UnknownFieldTypes(unknown) => {
                unknown.iter().map(|u| u.field.clone()).collect()
            }
            SchemaCompilationError::InconsistentMultiRow { row_fields, record_fields } => {
                // The minority side is the one that disagrees
                if row_fields.len() <= record_fields.len() {
                    row_fields.clone()
                } else {
                    record_fields.clone()
                }
            }
        }
    }
}

fn describe_unknown(unknown: &[UnknownType]) -> String {
    unknown
        .iter()
        .map(|u| format!("{} ({:?})", u.field, u.token))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_offenders() {
        let err = SchemaCompilationError::UnknownFieldTypes(vec![UnknownType {
            field: "amount".to_string(),
            token: "money".to_string(),
        }]);
        assert_eq!(err.to_string(), "Unsupported field types: amount (\"money\")");
        assert_eq!(err.fields(), vec!["amount"]);
    }

    #[test]
    fn test_inconsistent_multi_row_blames_minority() {
        let err = SchemaCompilationError::InconsistentMultiRow {
            row_fields: vec!["sku".to_string()],
            record_fields: vec!["qty".to_string(), "price".to_string()],
        };
        assert_eq!(err.fields(), vec!["sku"]);
    }
}
