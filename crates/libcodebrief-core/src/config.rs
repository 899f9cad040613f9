use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// File name of the per-repository configuration
pub const CONFIG_FILE: &str = ".codebrief.toml";

/// Repo-level configuration stored in `<root>/.codebrief.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodebriefConfig {
    pub walk: WalkConfig,
    pub docs: DocsConfig,
    pub diff: DiffConfig,
    pub llm: LlmConfig,
}

impl CodebriefConfig {
    /// Walk tables with the configured overview document excluded
    pub fn walk_config(&self) -> WalkConfig {
        let mut walk = self.walk.clone();
        walk.skip_paths.insert(self.docs.overview_path());
        walk
    }
}

/// Exclusion and recognition tables used by the tree walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Directory names skipped wherever they appear
    pub exclude_dirs: BTreeSet<String>,
    /// File names skipped wherever they appear
    pub skip_files: BTreeSet<String>,
    /// Extensions (without the dot) of files worth reading
    pub code_extensions: BTreeSet<String>,
    /// Any path containing one of these substrings is skipped
    pub skip_path_markers: Vec<String>,
    /// Exact root-relative paths that are skipped
    pub skip_paths: BTreeSet<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: to_set(&[".git", ".github", "node_modules", "vendor", "dist", "bin"]),
            skip_files: to_set(&["go.sum", "go.mod", "package-lock.json"]),
            code_extensions: to_set(&["go", "md", "tf", "py", "h", "hpp", "c", "cpp"]),
            skip_path_markers: vec!["00_overview.md".to_string()],
            skip_paths: BTreeSet::new(),
        }
    }
}

impl WalkConfig {
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name)
    }

    pub fn is_skipped_file(&self, name: &str, path: &str) -> bool {
        self.skip_files.contains(name)
            || self.skip_paths.contains(path)
            || self.skip_path_markers.iter().any(|m| path.contains(m.as_str()))
    }

    pub fn is_code_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.code_extensions.contains(ext))
    }
}

/// Location of the task documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub tasks_dir: String,
    pub overview_file: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            tasks_dir: "docs/tasks".to_string(),
            overview_file: "00_overview.md".to_string(),
        }
    }
}

impl DocsConfig {
    /// Root-relative path of the overview document, `/`-separated
    pub fn overview_path(&self) -> String {
        let dir = self.tasks_dir.trim_start_matches("./").trim_end_matches('/');
        if dir.is_empty() || dir == "." {
            self.overview_file.clone()
        } else {
            format!("{}/{}", dir, self.overview_file)
        }
    }
}

/// Base-branch resolution policy for diff contexts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Probed in order when no base branch is supplied
    pub base_candidates: Vec<String>,
    /// Used when no candidate resolves
    pub fallback_base: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            base_candidates: vec!["main".to_string(), "dev".to_string()],
            fallback_base: "main".to_string(),
        }
    }
}

/// Model capability settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Shell command that reads a prompt on stdin and answers on stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Load config from `<root>/.codebrief.toml`, falling back to defaults
pub fn load_config(root: &Path) -> Result<CodebriefConfig, CoreError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(CodebriefConfig::default());
    }
    let content = std::fs::read_to_string(&config_path)?;
    let config: CodebriefConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to `<root>/.codebrief.toml`
pub fn save_config(root: &Path, config: &CodebriefConfig) -> Result<(), CoreError> {
    std::fs::create_dir_all(root)?;
    let content = toml::to_string_pretty(config)?;
    std::fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}
