use thiserror::Error;

use crate::analysis::GenerateError;

/// Main error type for codebrief operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("model error: {0}")]
    Generate(#[from] GenerateError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::InvalidArgs(_) => "invalid_args",
            CoreError::NotFound(_) => "not_found",
            CoreError::Io(_) => "io_error",
            CoreError::Json(_) => "internal_error",
            CoreError::TomlParse(_) => "invalid_config",
            CoreError::TomlSerialize(_) => "internal_error",
            CoreError::Glob(_) => "invalid_args",
            CoreError::Generate(_) => "model_error",
            CoreError::Cancelled => "cancelled",
            CoreError::Internal(_) => "internal_error",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::InvalidArgs(_) => 2,
            CoreError::NotFound(_) => 3,
            CoreError::TomlParse(_) => 2,
            CoreError::Glob(_) => 2,
            CoreError::Io(_) => 5,
            CoreError::Generate(_) => 6,
            CoreError::Cancelled => 130,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            CoreError::NotFound(msg) => {
                if msg.contains("instruction") || msg.contains("Task") {
                    vec!["Task documents are looked up as <tasks_dir>/<TASK_ID>_*.md"]
                } else {
                    vec![]
                }
            }
            CoreError::InvalidArgs(msg) if msg.contains("model command") => vec![
                "Pass --llm-cmd \"<command>\" or export CODEBRIEF_LLM_CMD",
                "Or set `command` under [llm] in .codebrief.toml",
            ],
            CoreError::TomlParse(_) => vec![
                "Check the syntax of .codebrief.toml",
                "Delete the file to fall back to built-in defaults",
            ],
            CoreError::Generate(_) => vec![
                "Set --llm-cmd or CODEBRIEF_LLM_CMD to a command that reads a prompt on stdin",
                "Run the command by hand to check it answers on stdout",
            ],
            _ => vec![],
        }
    }

    /// Create a NotFound error for a missing task document
    pub fn task_doc_not_found(kind: &str, task_id: &str) -> Self {
        CoreError::NotFound(format!("no {} file found for Task {}", kind, task_id))
    }
}
