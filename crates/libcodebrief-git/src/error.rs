use thiserror::Error;

/// Errors that can occur while building a diff context
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a git repository")]
    NotARepo,

    /// Neither the merge-base nor the direct comparison produced a diff
    #[error("no diff available against {base}: {reason}")]
    DiffUnavailable { base: String, reason: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl GitError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            GitError::Git(_) => "git_error",
            GitError::Io(_) => "io_error",
            GitError::NotARepo => "not_a_repo",
            GitError::DiffUnavailable { .. } => "diff_unavailable",
            GitError::Cancelled => "cancelled",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            GitError::NotARepo => 3,
            GitError::DiffUnavailable { .. } => 4,
            GitError::Io(_) => 5,
            GitError::Cancelled => 130,
            GitError::Git(_) => 1,
        }
    }

    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            GitError::NotARepo => vec!["Run inside a git working tree or pass --root"],
            GitError::DiffUnavailable { .. } => vec![
                "Pass --base with a branch that exists locally",
                "Fetch the base branch first in shallow CI clones",
            ],
            _ => vec![],
        }
    }
}
