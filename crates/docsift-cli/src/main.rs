//! docsift CLI - Run schema-driven extraction from the command line.

use anyhow::Context;
use clap::Parser;
use docsift_cli::commands;
use docsift_cli::{Cli, Command, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Compile(args) => {
            commands::execute_compile(args, &config, cli.pretty)?;
        }
        Command::Extract(args) => {
            commands::execute_extract(args, &config, cli.pretty).await?;
        }
    }

    Ok(())
}
