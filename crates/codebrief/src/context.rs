use std::path::PathBuf;

use libcodebrief_core::{
    load_config, CancelToken, CodebriefConfig, ContextBuilder, CoreError, ExtractorRegistry, TaskDocs,
};
use libcodebrief_git::{Git2Source, GitError};

use crate::cli::Cli;
use crate::generator::CommandGenerator;

/// Resolved context for a codebrief command
pub struct BriefContext {
    pub root: PathBuf,
    pub config: CodebriefConfig,
    pub cancel: CancelToken,
    llm_cmd: Option<String>,
}

impl BriefContext {
    /// Load `.codebrief.toml` under `--root`; the flag beats the config for the model command
    pub fn resolve(cli: &Cli, cancel: CancelToken) -> Result<Self, CoreError> {
        let root = cli.root.clone();
        if !root.is_dir() {
            return Err(CoreError::InvalidArgs(format!("root is not a directory: {}", root.display())));
        }
        let config = load_config(&root)?;
        let llm_cmd = cli
            .llm_cmd
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| config.llm.command.clone());
        Ok(Self {
            root,
            config,
            cancel,
            llm_cmd,
        })
    }

    pub fn docs(&self) -> TaskDocs {
        TaskDocs::new(&self.root, &self.config.docs)
    }

    pub fn builder(&self) -> ContextBuilder {
        ContextBuilder::new(&self.root, self.config.walk_config(), ExtractorRegistry::default())
    }

    pub fn open_git(&self) -> Result<Git2Source, GitError> {
        Git2Source::discover(&self.root)
    }

    /// The configured model command
    pub fn generator(&self) -> Result<CommandGenerator, CoreError> {
        let command = self.llm_cmd.clone().ok_or_else(|| {
            CoreError::InvalidArgs("no model command configured (--llm-cmd, CODEBRIEF_LLM_CMD or [llm] command)".to_string())
        })?;
        Ok(CommandGenerator::new(command, &self.root))
    }
}
