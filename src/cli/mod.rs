//! CLI interface for git-scribe.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod check;
pub mod fixup;
pub mod summary;
pub mod write;

pub use check::CheckCommand;
pub use fixup::FixupCommand;
pub use summary::SummaryCommand;
pub use write::WriteCommand;

use crate::ai::anthropic::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::ai::{credentials, AnthropicClient};

/// git-scribe: AI-assisted commit messages and pull-request summaries.
#[derive(Parser)]
#[command(name = "git-scribe")]
#[command(about = "AI-assisted git commit messages and pull-request summaries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generates a commit message for uncommitted changes and commits them.
    Write(WriteCommand),
    /// Reviews the most recent commit's message and prints a suggestion.
    Check(CheckCommand),
    /// Rewrites the most recent commit's message in place.
    Fixup(FixupCommand),
    /// Summarizes a commit range as a pull-request title and description.
    Summary(SummaryCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Write(cmd) => cmd.execute().await,
            Commands::Check(cmd) => cmd.execute().await,
            Commands::Fixup(cmd) => cmd.execute().await,
            Commands::Summary(cmd) => cmd.execute().await,
        }
    }
}

/// Builds the production completion client from credentials and overrides.
pub(crate) fn build_client(
    model: Option<String>,
    max_tokens: Option<u32>,
) -> Result<AnthropicClient> {
    let api_key = credentials::load_api_key()?;
    AnthropicClient::new(
        api_key,
        model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    )
}
