//! Write command — generates a commit message for uncommitted changes and
//! commits them.

use anyhow::Result;
use clap::Parser;

use crate::data::{Mode, OperationResult};
use crate::git::extract::ExtractOptions;
use crate::git::mutator::CommitOptions;
use crate::git::{GitMutator, GitRepository, SHORT_HASH_LEN};
use crate::pipeline;

/// Write command options.
#[derive(Parser)]
pub struct WriteCommand {
    /// Adds a Signed-off-by trailer to the commit.
    #[arg(short = 's', long)]
    pub signoff: bool,

    /// Commits only staged changes instead of the whole working tree.
    #[arg(long)]
    pub cached: bool,

    /// Opens the generated message in an editor before committing.
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Model to use (defaults to the compiled-in model).
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum tokens the model may generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl WriteCommand {
    /// Executes the write command.
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::open()?;
        let client = super::build_client(self.model, self.max_tokens)?;

        let opts = ExtractOptions {
            staged_only: self.cached,
            ..Default::default()
        };
        let result = pipeline::generate(&repo, Mode::Write, &opts, &client).await?;

        let OperationResult::Message(message) = result else {
            anyhow::bail!("unexpected pipeline result for write mode");
        };

        let mutator = GitMutator::new()?;
        let commit = mutator.commit(
            &message,
            &CommitOptions {
                signoff: self.signoff,
                staged_only: self.cached,
                interactive: self.interactive,
            },
        )?;

        println!("✅ Created commit {}: {}", &commit[..SHORT_HASH_LEN], message.title);
        Ok(())
    }
}
