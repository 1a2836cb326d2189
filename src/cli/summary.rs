//! Summary command — summarizes a commit range as a pull-request title and
//! description.

use anyhow::Result;
use clap::Parser;

use crate::data::{Mode, OperationResult};
use crate::git::extract::ExtractOptions;
use crate::git::GitRepository;
use crate::pipeline;

/// Summary command options.
#[derive(Parser)]
pub struct SummaryCommand {
    /// Base ref of the range; commits after this ref are summarized.
    #[arg(long, value_name = "REF")]
    pub base: String,

    /// Head ref of the range (defaults to HEAD).
    #[arg(long, value_name = "REF")]
    pub head: Option<String>,

    /// Model to use (defaults to the compiled-in model).
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum tokens the model may generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl SummaryCommand {
    /// Executes the summary command.
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::open()?;
        let client = super::build_client(self.model, self.max_tokens)?;

        let opts = ExtractOptions {
            staged_only: false,
            base_ref: Some(self.base),
            head_ref: self.head,
        };
        let result = pipeline::generate(&repo, Mode::Summary, &opts, &client).await?;

        let OperationResult::Summary(summary) = result else {
            anyhow::bail!("unexpected pipeline result for summary mode");
        };

        // Two-section format: title line, blank line, description.
        println!("{}", summary.title);
        println!();
        println!("{}", summary.description);
        Ok(())
    }
}
