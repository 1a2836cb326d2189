//! Fixup command — rewrites the HEAD commit's message in place.

use anyhow::Result;
use clap::Parser;

use crate::data::{Mode, OperationResult};
use crate::git::extract::ExtractOptions;
use crate::git::{GitMutator, GitRepository, SHORT_HASH_LEN};
use crate::pipeline;

/// Fixup command options.
#[derive(Parser)]
pub struct FixupCommand {
    /// Model to use (defaults to the compiled-in model).
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum tokens the model may generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl FixupCommand {
    /// Executes the fixup command.
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::open()?;
        let client = super::build_client(self.model, self.max_tokens)?;

        let result =
            pipeline::generate(&repo, Mode::Fixup, &ExtractOptions::default(), &client).await?;

        let OperationResult::Message(message) = result else {
            anyhow::bail!("unexpected pipeline result for fixup mode");
        };

        let mutator = GitMutator::new()?;
        let commit = mutator.amend_head_message(&message)?;

        println!("✅ Amended HEAD commit {}: {}", &commit[..SHORT_HASH_LEN], message.title);
        Ok(())
    }
}
