//! Git history mutation: creating commits and rewriting the HEAD message.
//!
//! Mutations go through the `git` CLI so hooks, GPG signing, and index
//! locking behave exactly as they do for a hand-typed `git commit`. State
//! is captured through git2 before and after each mutation so failures can
//! be reported with a guarantee that the repository was left untouched.

use std::env;
use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result};
use git2::{Oid, Repository};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::data::CommitMessage;
use crate::error::ScribeError;
use crate::git::SHORT_HASH_LEN;

/// Options for creating a commit in write mode.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Add a `Signed-off-by` trailer.
    pub signoff: bool,
    /// Commit only what is already staged; otherwise commit all tracked
    /// working-tree changes (`git commit -a`).
    pub staged_only: bool,
    /// Open the generated message in an editor before committing.
    pub interactive: bool,
}

/// History mutation handler.
///
/// The only component that writes to the repository. Every method either
/// completes the mutation fully or leaves HEAD and the index exactly as
/// they were.
pub struct GitMutator {
    repo: Repository,
}

impl GitMutator {
    /// Creates a mutator for the repository containing the current directory.
    pub fn new() -> Result<Self> {
        let repo = Repository::open_from_env().context("Not in a git repository")?;
        Ok(Self { repo })
    }

    /// Creates a mutator for the repository at a specific path.
    pub fn new_at<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    /// Creates a new commit with the given message.
    ///
    /// With `interactive` set, the message is opened in `$EDITOR` first; an
    /// emptied message or a failing editor aborts with
    /// [`ScribeError::UserCancelled`] before anything is mutated.
    pub fn commit(&self, message: &CommitMessage, opts: &CommitOptions) -> Result<String> {
        let mut text = message.render();
        if opts.interactive {
            text = edit_message(&text)?;
        }

        let head_before = self.head_oid()?;

        let msg_file = write_message_file(&text)?;
        let mut cmd = self.git_command();
        cmd.args(["commit", "-F"]).arg(msg_file.path());
        if !opts.staged_only {
            cmd.arg("-a");
        }
        if opts.signoff {
            cmd.arg("-s");
        }

        let output = cmd.output().context("Failed to execute git commit")?;

        if !output.status.success() {
            self.verify_unchanged(head_before)?;
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScribeError::GitFailure(format!("commit failed: {}", stderr.trim())).into());
        }

        let new_head = self
            .head_oid()?
            .ok_or_else(|| ScribeError::GitFailure("commit produced no HEAD".to_string()))?;
        debug!(commit = %new_head, "Created commit");
        Ok(new_head.to_string())
    }

    /// Rewrites the HEAD commit's message without touching its tree.
    ///
    /// Refuses to run when the index differs from HEAD, since `git commit
    /// --amend` would silently fold those staged changes into the rewritten
    /// commit. Either the message is fully replaced or nothing changes.
    pub fn amend_head_message(&self, message: &CommitMessage) -> Result<String> {
        let head = self
            .repo
            .head()
            .context("Failed to resolve HEAD")?
            .peel_to_commit()
            .context("HEAD does not point at a commit")?;
        let old_oid = head.id();
        let old_tree = head.tree_id();
        drop(head);

        self.check_index_matches_head()?;

        let msg_file = write_message_file(&message.render())?;
        let output = self
            .git_command()
            .args(["commit", "--amend", "-F"])
            .arg(msg_file.path())
            .output()
            .context("Failed to execute git commit --amend")?;

        if !output.status.success() {
            self.verify_unchanged(Some(old_oid))?;
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScribeError::GitFailure(format!("amend failed: {}", stderr.trim())).into());
        }

        let new_head = self
            .repo
            .head()
            .context("Failed to resolve HEAD after amend")?
            .peel_to_commit()
            .context("HEAD does not point at a commit after amend")?;

        if new_head.tree_id() != old_tree {
            return Err(ScribeError::GitFailure(format!(
                "amend of {} changed the commit tree; inspect the repository",
                &old_oid.to_string()[..SHORT_HASH_LEN]
            ))
            .into());
        }

        debug!(
            old = %old_oid,
            new = %new_head.id(),
            "Amended HEAD commit message"
        );
        Ok(new_head.id().to_string())
    }

    /// Fails with [`ScribeError::GitFailure`] when staged changes exist.
    fn check_index_matches_head(&self) -> Result<()> {
        let head_tree = self
            .repo
            .head()
            .context("Failed to resolve HEAD")?
            .peel_to_tree()
            .context("Failed to get HEAD tree")?;
        let index = self.repo.index().context("Failed to read index")?;
        let diff = self
            .repo
            .diff_tree_to_index(Some(&head_tree), Some(&index), None)
            .context("Failed to diff index against HEAD")?;

        if diff.deltas().len() > 0 {
            return Err(ScribeError::GitFailure(
                "index has staged changes; commit or unstage them before fixup".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Current HEAD commit id, or `None` on an unborn branch.
    fn head_oid(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(head.target()),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e).context("Failed to resolve HEAD"),
        }
    }

    /// Confirms HEAD still matches its pre-mutation value after a failed
    /// git invocation.
    fn verify_unchanged(&self, expected: Option<Oid>) -> Result<()> {
        let current = self.head_oid()?;
        if current != expected {
            warn!(?expected, ?current, "HEAD moved during a failed mutation");
            return Err(ScribeError::GitFailure(
                "git failed mid-operation and HEAD moved; inspect the repository".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// A `git` command rooted at this repository's working directory.
    fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        if let Some(workdir) = self.repo.workdir() {
            cmd.current_dir(workdir);
        }
        cmd
    }
}

/// Writes a commit message to a temp file for `git commit -F`.
fn write_message_file(text: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("Failed to create message temp file")?;
    file.write_all(text.as_bytes())
        .context("Failed to write message temp file")?;
    file.flush().context("Failed to flush message temp file")?;
    Ok(file)
}

/// Opens the message in an external editor and returns the edited text.
///
/// The editor comes from `GIT_SCRIBE_EDITOR`, then `EDITOR`, then `vi`.
/// Comment lines are stripped; an empty result or a non-zero editor exit
/// means the user backed out.
fn edit_message(text: &str) -> Result<String> {
    let mut file = NamedTempFile::with_suffix(".gitcommit")
        .context("Failed to create editor temp file")?;
    writeln!(file, "{text}").context("Failed to write editor temp file")?;
    writeln!(file, "\n# Edit the commit message above. Lines starting with '#' are")
        .context("Failed to write editor temp file")?;
    writeln!(file, "# ignored. Save an empty message to abort the commit.")
        .context("Failed to write editor temp file")?;
    file.flush().context("Failed to flush editor temp file")?;

    let editor = env::var("GIT_SCRIBE_EDITOR")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let mut parts = editor.split_whitespace();
    let editor_cmd = parts
        .next()
        .ok_or_else(|| ScribeError::UserCancelled)?;

    let status = Command::new(editor_cmd)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;

    if !status.success() {
        return Err(ScribeError::UserCancelled.into());
    }

    let edited = std::fs::read_to_string(file.path()).context("Failed to read edited message")?;
    let cleaned: String = edited
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = cleaned.trim().to_string();

    if cleaned.is_empty() {
        return Err(ScribeError::UserCancelled.into());
    }

    Ok(cleaned)
}
