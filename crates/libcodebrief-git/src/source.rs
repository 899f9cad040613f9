//! The version-control surface a diff context is built from.

use std::path::Path;

use git2::{Diff, DiffFormat, ErrorCode, Repository, Tree};

use crate::GitError;

/// Revision naming the current tip
pub const HEAD: &str = "HEAD";

/// How the base and the tip are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Changes since the merge base (`base...HEAD`)
    MergeBase,
    /// Straight tree comparison (`base HEAD`)
    Direct,
}

/// Queries a diff context needs from version control
pub trait VcsSource {
    /// Short name of the checked-out branch, `HEAD` when detached
    fn current_branch(&self) -> Result<String, GitError>;

    /// Whether `rev` names something in the repository
    fn resolves(&self, rev: &str) -> bool;

    /// Unified diff between `base` and the tip
    fn diff_text(&self, base: &str, comparison: Comparison) -> Result<String, GitError>;

    /// Changed paths, in the order the diff reports them
    fn changed_files(&self, base: &str, comparison: Comparison) -> Result<Vec<String>, GitError>;

    /// Content of `path` at `rev`
    fn show(&self, rev: &str, path: &str) -> Result<String, GitError>;
}

/// [`VcsSource`] backed by libgit2
pub struct Git2Source {
    repo: Repository,
}

impl Git2Source {
    /// Open the repository containing `path`
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                GitError::NotARepo
            } else {
                GitError::Git(e)
            }
        })?;
        Ok(Self { repo })
    }

    pub fn from_repo(repo: Repository) -> Self {
        Self { repo }
    }

    /// Working tree root, if the repository has one
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn trees(&self, base: &str, comparison: Comparison) -> Result<(Tree<'_>, Tree<'_>), GitError> {
        let tip = self.repo.head()?.peel_to_commit()?;
        let base_commit = self.repo.revparse_single(base)?.peel_to_commit()?;

        let old = match comparison {
            Comparison::MergeBase => {
                let oid = self.repo.merge_base(base_commit.id(), tip.id())?;
                self.repo.find_commit(oid)?.tree()?
            }
            Comparison::Direct => base_commit.tree()?,
        };
        Ok((old, tip.tree()?))
    }

    fn diff(&self, base: &str, comparison: Comparison) -> Result<Diff<'_>, GitError> {
        let (old, new) = self.trees(base, comparison)?;
        Ok(self.repo.diff_tree_to_tree(Some(&old), Some(&new), None)?)
    }
}

impl VcsSource for Git2Source {
    fn current_branch(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Ok(HEAD.to_string());
        }
        Ok(head.shorthand().unwrap_or(HEAD).to_string())
    }

    fn resolves(&self, rev: &str) -> bool {
        self.repo.revparse_single(rev).is_ok()
    }

    fn diff_text(&self, base: &str, comparison: Comparison) -> Result<String, GitError> {
        let diff = self.diff(base, comparison)?;
        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;
        Ok(text)
    }

    fn changed_files(&self, base: &str, comparison: Comparison) -> Result<Vec<String>, GitError> {
        let diff = self.diff(base, comparison)?;
        let files = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .and_then(|p| p.to_str())
                    .map(String::from)
            })
            .collect();
        Ok(files)
    }

    fn show(&self, rev: &str, path: &str) -> Result<String, GitError> {
        let blob = self
            .repo
            .revparse_single(&format!("{}:{}", rev, path))?
            .peel_to_blob()?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}
