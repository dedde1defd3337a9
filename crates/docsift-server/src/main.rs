//! docsift server binary
//!
//! Starts the extraction HTTP service.

use docsift_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using local Ollama defaults");
        eprintln!("Usage: docsift-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("docsift server - Schema-driven document extraction");
    println!();
    println!("USAGE:");
    println!("    docsift-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /extract      Run extraction tasks against a document");
    println!("    GET  /health       Service and backend status");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 5001)");
    println!("    - mock_normalization: Use the built-in sample document (default: false)");
    println!("    - [backend]: provider = 'ollama' | 'gemini' | 'mock' and its settings");
    println!("    - [extractor]: retry_limit, attempt_timeout_secs, request_timeout_secs, ...");
    println!();
    println!("Log verbosity follows RUST_LOG (default: info).");
}
