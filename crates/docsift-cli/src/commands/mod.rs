//! Command implementations.

pub mod compile;
pub mod extract;

pub use self::compile::execute_compile;
pub use self::extract::execute_extract;

use crate::error::{CliError, Result};
use docsift_domain::ExtractionTask;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Accepted task file layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskFile {
    List(Vec<ExtractionTask>),
    Wrapped { tasks: Vec<ExtractionTask> },
}

/// Load tasks from a JSON file.
pub fn load_tasks(path: &Path) -> Result<Vec<ExtractionTask>> {
    let contents = fs::read_to_string(path)?;
    parse_tasks(&contents)
}

fn parse_tasks(contents: &str) -> Result<Vec<ExtractionTask>> {
    match serde_json::from_str::<TaskFile>(contents) {
        Ok(TaskFile::List(tasks)) | Ok(TaskFile::Wrapped { tasks }) => Ok(tasks),
        Err(e) => Err(CliError::InvalidInput(format!(
            "Task file must hold a JSON array of tasks or {{\"tasks\": [...]}}: {}",
            e
        ))),
    }
}

/// Render a value as JSON for stdout.
pub fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_array() {
        let tasks = parse_tasks(
            r#"[{"aim": "header", "schema": [{"name": "invoice_number", "type": "string"}]}]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].fields[0].name, "invoice_number");
    }

    #[test]
    fn test_parse_wrapped_tasks() {
        let tasks = parse_tasks(
            r#"{"tasks": [{"aim": "a", "schema": []}, {"aim": "b", "extraction_schema": []}]}"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].aim, "b");
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(
            parse_tasks(r#"{"aim": "lonely"}"#),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(render(&value, false).unwrap(), r#"{"a":1}"#);
        assert!(render(&value, true).unwrap().contains('\n'));
    }
}
