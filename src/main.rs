use std::process;

use clap::Parser;
use git_scribe::error::{exit_code_for, is_failure};
use git_scribe::Cli;

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with RUST_LOG environment variable support
    // Default to "warn" level if RUST_LOG is not set
    // Write to stderr so debug logs don't interfere with stdout output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        if is_failure(&e) {
            eprintln!("Error: {e}");

            // Print the full error chain if available
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {cause}");
            }
        } else {
            // User cancellation is not an error; report it quietly.
            eprintln!("{e}");
        }

        process::exit(exit_code_for(&e));
    }
}
