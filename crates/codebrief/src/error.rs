use libcodebrief_core::{CoreError, GenerateError};
use libcodebrief_git::GitError;
use thiserror::Error;

/// Anything a command can fail with
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Git(#[from] GitError),
}

impl From<GenerateError> for CliError {
    fn from(e: GenerateError) -> Self {
        CliError::Core(CoreError::Generate(e))
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Core(CoreError::Io(e))
    }
}

impl CliError {
    pub fn error_code(&self) -> &'static str {
        match self {
            CliError::Core(e) => e.error_code(),
            CliError::Git(e) => e.error_code(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => e.exit_code(),
            CliError::Git(e) => e.exit_code(),
        }
    }

    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            CliError::Core(e) => e.suggestions(),
            CliError::Git(e) => e.suggestions(),
        }
    }
}
