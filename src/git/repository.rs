//! Read-only git repository queries.

use anyhow::{Context, Result};
use git2::{Commit, Diff, DiffFormat, Oid, Repository, Tree};
use tracing::debug;

use crate::data::CommitEntry;
use crate::error::ScribeError;

/// Git repository wrapper for read queries.
///
/// All methods here are side-effect free; history mutation lives in
/// [`GitMutator`](crate::git::GitMutator).
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository containing the current directory.
    pub fn open() -> Result<Self> {
        let repo = Repository::open_from_env().context("Not in a git repository")?;
        Ok(Self { repo })
    }

    /// Opens the repository at a specific path.
    pub fn open_at<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    /// Access to the underlying `git2::Repository`.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Tree of the commit HEAD points at, or `None` on an unborn branch.
    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head
                    .peel_to_commit()
                    .context("Failed to peel HEAD to commit")?;
                Ok(Some(commit.tree().context("Failed to get HEAD tree")?))
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(e).context("Failed to resolve HEAD"),
        }
    }

    /// Patch text of the working tree (including the index) against HEAD.
    ///
    /// Matches `git diff HEAD`: tracked changes only, staged or not.
    pub fn working_tree_diff(&self) -> Result<String> {
        let head_tree = self.head_tree()?;
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(head_tree.as_ref(), None)
            .context("Failed to diff working tree against HEAD")?;
        diff_to_patch(&diff)
    }

    /// Patch text of the index (staged changes) against HEAD.
    pub fn staged_diff(&self) -> Result<String> {
        let head_tree = self.head_tree()?;
        let index = self.repo.index().context("Failed to read index")?;
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)
            .context("Failed to diff index against HEAD")?;
        diff_to_patch(&diff)
    }

    /// The HEAD commit.
    pub fn head_commit(&self) -> Result<Commit<'_>> {
        self.repo
            .head()
            .context("Failed to resolve HEAD")?
            .peel_to_commit()
            .context("HEAD does not point at a commit")
    }

    /// Full message of the HEAD commit.
    pub fn head_message(&self) -> Result<String> {
        Ok(self.head_commit()?.message().unwrap_or("").to_string())
    }

    /// Patch text introduced by a commit relative to its first parent.
    ///
    /// A root commit diffs against the empty tree.
    pub fn commit_diff(&self, commit: &Commit<'_>) -> Result<String> {
        let commit_tree = commit.tree().context("Failed to get commit tree")?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(
                commit
                    .parent(0)
                    .context("Failed to get parent commit")?
                    .tree()
                    .context("Failed to get parent tree")?,
            )
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)
            .context("Failed to create diff")?;
        diff_to_patch(&diff)
    }

    /// Resolves a revspec to a commit id.
    pub fn resolve_ref(&self, spec: &str) -> Result<Oid> {
        let obj = self
            .repo
            .revparse_single(spec)
            .map_err(|e| ScribeError::GitFailure(format!("cannot resolve '{spec}': {e}")))?;
        let commit = obj
            .peel_to_commit()
            .map_err(|e| ScribeError::GitFailure(format!("'{spec}' is not a commit: {e}")))?;
        Ok(commit.id())
    }

    /// Whether `base` is an ancestor of `head` (merge-base equals base).
    pub fn is_ancestor(&self, base: Oid, head: Oid) -> Result<bool> {
        if base == head {
            return Ok(true);
        }
        let merge_base = self
            .repo
            .merge_base(base, head)
            .map_err(|e| ScribeError::GitFailure(format!("merge-base failed: {e}")))?;
        Ok(merge_base == base)
    }

    /// Enumerates the commits in `(base, head]`, oldest first, with the
    /// patch each one introduced.
    pub fn commits_in_range(&self, base: Oid, head: Oid) -> Result<Vec<CommitEntry>> {
        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker.push(head).context("Failed to push head commit")?;
        walker.hide(base).context("Failed to hide base commit")?;

        let mut entries = Vec::new();
        for oid in walker {
            let oid = oid.context("Failed to read commit from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;
            entries.push(CommitEntry {
                hash: oid.to_string(),
                message: commit.message().unwrap_or("").to_string(),
                diff: self.commit_diff(&commit)?,
            });
        }

        // Walker yields newest first; callers want chronological order.
        entries.reverse();
        debug!(count = entries.len(), "Enumerated summary range");
        Ok(entries)
    }

    /// Combined patch text between two commits' trees.
    pub fn range_diff(&self, base: Oid, head: Oid) -> Result<String> {
        let base_tree = self
            .repo
            .find_commit(base)
            .context("Failed to find base commit")?
            .tree()
            .context("Failed to get base tree")?;
        let head_tree = self
            .repo
            .find_commit(head)
            .context("Failed to find head commit")?
            .tree()
            .context("Failed to get head tree")?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)
            .context("Failed to diff range")?;
        diff_to_patch(&diff)
    }
}

/// Renders a `git2::Diff` as unified patch text.
fn diff_to_patch(diff: &Diff<'_>) -> Result<String> {
    let mut patch = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let content = std::str::from_utf8(line.content()).unwrap_or("<binary>");
        let prefix = match line.origin() {
            '+' => "+",
            '-' => "-",
            ' ' => " ",
            '@' => "@",
            _ => "",
        };
        patch.push_str(prefix);
        patch.push_str(content);
        true
    })
    .context("Failed to format diff")?;

    if !patch.is_empty() && !patch.ends_with('\n') {
        patch.push('\n');
    }

    Ok(patch)
}
