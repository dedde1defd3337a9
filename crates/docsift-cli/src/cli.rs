//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docsift - Extract structured data from documents with runtime schemas.
#[derive(Debug, Parser)]
#[command(name = "docsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path ([backend] and [extractor] sections)
    #[arg(short, long, global = true, env = "DOCSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a task file and print each contract
    Compile(CompileArgs),

    /// Run a task file against a document
    Extract(ExtractArgs),
}

/// Arguments for the compile command.
#[derive(Debug, Parser)]
pub struct CompileArgs {
    /// Task file (JSON array of tasks, or {"tasks": [...]})
    #[arg(short, long)]
    pub tasks: PathBuf,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Normalized document (text or markdown)
    #[arg(short, long)]
    pub document: PathBuf,

    /// Task file (JSON array of tasks, or {"tasks": [...]})
    #[arg(short, long)]
    pub tasks: PathBuf,

    /// MIME type recorded for the document
    #[arg(long)]
    pub file_type: Option<String>,

    /// Ignore the document and use the built-in sample markdown
    #[arg(long)]
    pub mock_normalization: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "docsift",
            "extract",
            "--document",
            "invoice.md",
            "--tasks",
            "tasks.json",
            "--mock-normalization",
            "--pretty",
        ])
        .unwrap();

        assert!(cli.pretty);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.document, PathBuf::from("invoice.md"));
                assert!(args.mock_normalization);
            }
            other => panic!("Expected extract, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_requires_tasks() {
        let result = Cli::try_parse_from(["docsift", "extract", "--document", "a.md"]);
        assert!(result.is_err());
    }
}
