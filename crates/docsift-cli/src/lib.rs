//! docsift CLI library.
//!
//! Argument parsing, configuration loading and the `compile` / `extract`
//! commands for the `docsift` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
