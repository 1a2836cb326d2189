//! Check command — reviews the HEAD commit's message without modifying it.

use anyhow::Result;
use clap::Parser;

use crate::data::{Mode, OperationResult};
use crate::git::extract::ExtractOptions;
use crate::git::GitRepository;
use crate::pipeline;

/// Exit code when the model flags the message as wrong.
const EXIT_MESSAGE_REJECTED: i32 = 8;

/// Check command options.
#[derive(Parser)]
pub struct CheckCommand {
    /// Model to use (defaults to the compiled-in model).
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum tokens the model may generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl CheckCommand {
    /// Executes the check command.
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::open()?;
        let client = super::build_client(self.model, self.max_tokens)?;

        let result =
            pipeline::generate(&repo, Mode::Check, &ExtractOptions::default(), &client).await?;

        let OperationResult::Suggestion { text, problem } = result else {
            anyhow::bail!("unexpected pipeline result for check mode");
        };

        println!("{text}");

        if problem {
            eprintln!("commit message needs attention");
            std::process::exit(EXIT_MESSAGE_REJECTED);
        }

        Ok(())
    }
}
