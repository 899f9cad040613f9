use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::config::DocsConfig;
use crate::error::CoreError;

const COMPLETED_SUFFIX: &str = "_completed";

/// Task documents under `<root>/<tasks_dir>`.
///
/// A task `03` is described by `03_<slug>.md`; once merged, its summary is
/// stored next to it as `03_<slug>_completed.md`.
#[derive(Debug, Clone)]
pub struct TaskDocs {
    dir: PathBuf,
    overview_file: String,
}

impl TaskDocs {
    pub fn new(root: &Path, config: &DocsConfig) -> Self {
        Self {
            dir: root.join(&config.tasks_dir),
            overview_file: config.overview_file.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Global project rules; empty when the overview is missing
    pub fn overview(&self) -> String {
        let path = self.dir.join(&self.overview_file);
        match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no overview document");
                String::new()
            }
        }
    }

    /// Path of the instruction document for `task_id`.
    /// A non-completed match is preferred; otherwise the first match is used.
    pub fn instruction_path(&self, task_id: &str) -> Result<PathBuf, CoreError> {
        let matches = self.matches(task_id, "*.md")?;
        let preferred = matches.iter().find(|p| !is_completed(p)).or(matches.first());
        preferred
            .cloned()
            .ok_or_else(|| CoreError::task_doc_not_found("instruction", task_id))
    }

    pub fn instruction(&self, task_id: &str) -> Result<String, CoreError> {
        let path = self.instruction_path(task_id)?;
        Ok(std::fs::read_to_string(path)?)
    }

    /// Completion summary of a merged task
    pub fn completed(&self, task_id: &str) -> Result<String, CoreError> {
        let matches = self.matches(task_id, &format!("*{}.md", COMPLETED_SUFFIX))?;
        let path = matches
            .first()
            .ok_or_else(|| CoreError::task_doc_not_found("completed", task_id))?;
        Ok(std::fs::read_to_string(path)?)
    }

    /// Where the completion summary for `task_id` is written
    pub fn completed_path(&self, task_id: &str) -> Result<PathBuf, CoreError> {
        let instruction = self.instruction_path(task_id)?;
        let stem = instruction
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CoreError::Internal(format!("bad file name: {}", instruction.display())))?;
        let stem = stem.strip_suffix(COMPLETED_SUFFIX).unwrap_or(stem);
        Ok(self.dir.join(format!("{}{}.md", stem, COMPLETED_SUFFIX)))
    }

    /// Summaries (or instructions) of the tasks this one depends on.
    /// Unknown ids are skipped; no dependencies renders nothing.
    pub fn dependent_context(&self, depends_on: &[String]) -> String {
        if depends_on.is_empty() {
            return String::new();
        }

        let mut b = String::from("=== DEPENDENT TASKS CONTEXT ===\n\n");
        for task_id in depends_on {
            if let Ok(completed) = self.completed(task_id) {
                let _ = write!(b, "--- Task {} (Completed) ---\n{}\n\n", task_id, completed);
                continue;
            }
            match self.instruction(task_id) {
                Ok(instruction) => {
                    let _ = write!(b, "--- Task {} (Instructions Only) ---\n{}\n\n", task_id, instruction);
                }
                Err(e) => debug!(task_id = %task_id, error = %e, "dependency has no documents"),
            }
        }
        b
    }

    fn matches(&self, task_id: &str, tail: &str) -> Result<Vec<PathBuf>, CoreError> {
        let dir = self
            .dir
            .to_str()
            .ok_or_else(|| CoreError::InvalidArgs(format!("non UTF-8 path: {}", self.dir.display())))?;
        let pattern = format!("{}/{}_{}", Pattern::escape(dir), Pattern::escape(task_id), tail);
        let paths = glob::glob(&pattern)?.filter_map(Result::ok).collect();
        Ok(paths)
    }
}

fn is_completed(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains(COMPLETED_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn docs_with(files: &[(&str, &str)]) -> (tempfile::TempDir, TaskDocs) {
        let dir = tempdir().unwrap();
        let tasks = dir.path().join("docs/tasks");
        std::fs::create_dir_all(&tasks).unwrap();
        for (name, content) in files {
            std::fs::write(tasks.join(name), content).unwrap();
        }
        let docs = TaskDocs::new(dir.path(), &DocsConfig::default());
        (dir, docs)
    }

    #[test]
    fn test_overview_missing_is_empty() {
        let (_dir, docs) = docs_with(&[]);
        assert_eq!(docs.overview(), "");
    }

    #[test]
    fn test_overview_is_read() {
        let (_dir, docs) = docs_with(&[("00_overview.md", "Use gofmt.")]);
        assert_eq!(docs.overview(), "Use gofmt.");
    }

    #[test]
    fn test_instruction_prefers_non_completed() {
        let (_dir, docs) = docs_with(&[
            ("01_auth_completed.md", "done"),
            ("01_auth.md", "do it"),
            ("010_other.md", "wrong task"),
        ]);
        assert_eq!(docs.instruction("01").unwrap(), "do it");
        assert_eq!(docs.completed("01").unwrap(), "done");
    }

    #[test]
    fn test_instruction_falls_back_to_completed() {
        let (_dir, docs) = docs_with(&[("02_db_completed.md", "summary")]);
        assert_eq!(docs.instruction("02").unwrap(), "summary");
    }

    #[test]
    fn test_missing_instruction_is_not_found() {
        let (_dir, docs) = docs_with(&[("01_auth.md", "x")]);
        let err = docs.instruction("09").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(err.to_string(), "not found: no instruction file found for Task 09");
    }

    #[test]
    fn test_completed_path_sits_next_to_instruction() {
        let (dir, docs) = docs_with(&[("03_refresh.md", "x")]);
        assert_eq!(
            docs.completed_path("03").unwrap(),
            dir.path().join("docs/tasks/03_refresh_completed.md")
        );
    }

    #[test]
    fn test_dependent_context() {
        let (_dir, docs) = docs_with(&[
            ("01_auth.md", "auth instructions"),
            ("01_auth_completed.md", "auth summary"),
            ("02_db.md", "db instructions"),
        ]);
        let ids = vec!["01".to_string(), "02".to_string(), "99".to_string()];
        let ctx = docs.dependent_context(&ids);

        assert!(ctx.starts_with("=== DEPENDENT TASKS CONTEXT ===\n\n"));
        assert!(ctx.contains("--- Task 01 (Completed) ---\nauth summary\n\n"));
        assert!(ctx.contains("--- Task 02 (Instructions Only) ---\ndb instructions\n\n"));
        assert!(!ctx.contains("auth instructions"));
        assert!(!ctx.contains("Task 99"));
        assert_eq!(docs.dependent_context(&[]), "");
    }
}
