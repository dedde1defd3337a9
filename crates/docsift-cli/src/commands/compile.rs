//! Compile command implementation.

use crate::cli::CompileArgs;
use crate::commands::{load_tasks, render};
use crate::config::Config;
use crate::error::Result;
use docsift_domain::ExtractionTask;
use docsift_schema::SchemaCompiler;
use serde_json::{json, Map, Value};

/// Execute the compile command.
///
/// Compilation errors are reported per task; they do not fail the command.
pub fn execute_compile(args: CompileArgs, config: &Config, pretty: bool) -> Result<()> {
    let tasks = load_tasks(&args.tasks)?;
    let report = compile_report(&tasks, config);
    println!("{}", render(&report, pretty)?);
    Ok(())
}

fn compile_report(tasks: &[ExtractionTask], config: &Config) -> Value {
    let compiler =
        SchemaCompiler::new().with_preamble(config.extractor.instruction_preamble.clone());

    let mut report = Map::new();
    for (idx, task) in tasks.iter().enumerate() {
        let entry = match compiler.compile(task) {
            Ok(contract) => json!({
                "aim": contract.aim(),
                "multi_row": contract.is_multi_row(),
                "schema": contract.schema(),
                "json_schema": contract.json_schema(),
                "instruction": contract.instruction(),
            }),
            Err(e) => json!({
                "aim": task.aim,
                "error": e.to_string(),
                "fields": e.fields(),
            }),
        };
        report.insert(format!("task_{}", idx + 1), entry);
    }

    Value::Object(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::{FieldSpec, FieldType};

    #[test]
    fn test_report_mixes_contracts_and_errors() {
        let tasks = vec![
            ExtractionTask::new(
                "dupes",
                vec![
                    FieldSpec::new("a", FieldType::String),
                    FieldSpec::new("a", FieldType::String),
                ],
            ),
            ExtractionTask::new("header", vec![FieldSpec::new("total", FieldType::Number)]),
        ];

        let report = compile_report(&tasks, &Config::default());

        assert_eq!(report["task_1"]["fields"], json!(["a"]));
        assert!(report["task_2"]["instruction"]
            .as_str()
            .unwrap()
            .contains("**Extraction Task Aim:**\nheader"));
        assert_eq!(report["task_2"]["multi_row"], false);
    }
}
