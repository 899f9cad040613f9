//! Before/after context of a branch, for questions asked on a pull request.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Component, Path};

use libcodebrief_core::{CancelToken, DiffConfig};
use tracing::{debug, info, warn};

use crate::source::{Comparison, VcsSource, HEAD};
use crate::GitError;

const DIFF_HEADER: &str = "diff --git";

/// Changes between a base branch and the current tip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffContext {
    pub base_branch: String,
    pub current_branch: String,
    /// Full unified diff
    pub diff_text: String,
    /// In the order the diff reports them
    pub changed_files: Vec<String>,
    /// Content at the base; absent for files the branch adds
    pub files_before: BTreeMap<String, String>,
    /// Content at the tip; absent for files the branch deletes
    pub files_after: BTreeMap<String, String>,
}

/// Supplied base if non-empty, else the first candidate that resolves, else the fallback
pub fn resolve_base(source: &dyn VcsSource, base: Option<&str>, config: &DiffConfig) -> String {
    if let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) {
        return base.to_string();
    }
    for candidate in &config.base_candidates {
        if source.resolves(candidate) {
            return candidate.clone();
        }
        debug!(candidate = %candidate, "base candidate does not resolve");
    }
    config.fallback_base.clone()
}

impl DiffContext {
    /// Collect the diff, changed files and their contents.
    ///
    /// Fails only when neither comparison form yields a diff, or when
    /// cancelled. Missing refs and unreadable paths leave gaps instead.
    pub fn build(
        source: &dyn VcsSource,
        base: Option<&str>,
        config: &DiffConfig,
        cancel: &CancelToken,
    ) -> Result<Self, GitError> {
        let base_branch = resolve_base(source, base, config);

        let current_branch = source.current_branch().unwrap_or_else(|e| {
            debug!(error = %e, "current branch unknown");
            String::new()
        });

        let diff_text = match source.diff_text(&base_branch, Comparison::MergeBase) {
            Ok(text) => text,
            Err(first) => {
                warn!(base = %base_branch, error = %first, "merge-base diff failed, comparing tips");
                source
                    .diff_text(&base_branch, Comparison::Direct)
                    .map_err(|e| GitError::DiffUnavailable {
                        base: base_branch.clone(),
                        reason: e.to_string(),
                    })?
            }
        };

        let changed_files = source
            .changed_files(&base_branch, Comparison::MergeBase)
            .or_else(|_| source.changed_files(&base_branch, Comparison::Direct))
            .unwrap_or_else(|e| {
                debug!(error = %e, "changed file list unavailable");
                Vec::new()
            });

        let mut files_before = BTreeMap::new();
        let mut files_after = BTreeMap::new();
        for file in &changed_files {
            if cancel.is_cancelled() {
                return Err(GitError::Cancelled);
            }
            match source.show(&base_branch, file) {
                Ok(content) => {
                    files_before.insert(file.clone(), content);
                }
                Err(e) => debug!(path = %file, error = %e, "no base content"),
            }
            match source.show(HEAD, file) {
                Ok(content) => {
                    files_after.insert(file.clone(), content);
                }
                Err(e) => debug!(path = %file, error = %e, "no tip content"),
            }
        }

        info!(
            base = %base_branch,
            changed = changed_files.len(),
            "diff context built"
        );

        Ok(Self {
            base_branch,
            current_branch,
            diff_text,
            changed_files,
            files_before,
            files_after,
        })
    }

    /// Context for the analysis round: one targeted file, or the whole change
    pub fn for_qa(&self, target: Option<&str>, line: Option<&str>) -> String {
        let mut b = self.branch_line();

        match target {
            Some(target) => self.render_target(&mut b, target, line),
            None => {
                b.push_str("=== CHANGED FILES ===\n");
                for file in &self.changed_files {
                    let _ = writeln!(b, "- {}", file);
                }
                b.push('\n');
                let _ = write!(b, "=== FULL DIFF ===\n{}\n", self.diff_text);
            }
        }
        b
    }

    /// Context for the answering round.
    ///
    /// Every changed file is shown with both versions, followed by the
    /// caller's extra full-content files and pre-rendered signatures.
    pub fn for_qa_with_additional(
        &self,
        target: Option<&str>,
        line: Option<&str>,
        additional: &BTreeMap<String, String>,
        signatures: &str,
    ) -> String {
        let mut b = self.branch_line();
        b.push_str("=== CHANGED FILES IN THIS PR ===\n\n");

        match target {
            Some(target) => {
                self.render_target(&mut b, target, line);
                for (file, after) in self.changed_after() {
                    if file == target {
                        continue;
                    }
                    let _ = writeln!(b, "=== Changed: {} ===", file);
                    if let Some(before) = self.files_before.get(file) {
                        let _ = write!(b, "--- BEFORE (original) ---\n{}\n\n", before);
                    }
                    let _ = write!(b, "--- AFTER (current) ---\n{}\n\n", after);
                }
            }
            None => {
                b.push_str("=== CHANGED FILES ===\n");
                for (file, after) in self.changed_after() {
                    let _ = writeln!(b, "--- {} ---", file);
                    if let Some(before) = self.files_before.get(file) {
                        let _ = write!(b, "BEFORE:\n{}\n\n", before);
                    }
                    let _ = write!(b, "AFTER:\n{}\n\n", after);
                }
                let _ = write!(b, "FULL DIFF:\n{}\n\n", self.diff_text);
            }
        }

        if !additional.is_empty() {
            b.push_str("=== RELATED FILES (for context) ===\n\n");
            for (path, content) in additional {
                let _ = write!(b, "--- {} ---\n{}\n\n", path, content);
            }
        }

        if !signatures.is_empty() {
            b.push_str("=== OTHER FILES (signatures only) ===\n\n");
            b.push_str(signatures);
        }
        b
    }

    /// Content of `path` at the tip; empty if the branch does not have it
    pub fn target_file_content(&self, path: &str) -> &str {
        self.files_after.get(path).map(String::as_str).unwrap_or("")
    }

    /// Read extra files from the working tree.
    ///
    /// Files already in the diff, paths leaving the tree and unreadable files
    /// are skipped.
    pub fn load_additional_files(&self, root: &Path, paths: &[String]) -> BTreeMap<String, String> {
        let mut additional = BTreeMap::new();
        for path in paths {
            if self.files_after.contains_key(path) || additional.contains_key(path) {
                continue;
            }
            if !stays_inside(path) {
                debug!(path = %path, "ignoring path outside the tree");
                continue;
            }
            match std::fs::read_to_string(root.join(path)) {
                Ok(content) => {
                    additional.insert(path.clone(), content);
                }
                Err(e) => debug!(path = %path, error = %e, "skipping unreadable file"),
            }
        }
        if !additional.is_empty() {
            info!(count = additional.len(), "loaded related files");
        }
        additional
    }

    fn branch_line(&self) -> String {
        format!("BRANCH: {} (base branch: {})\n\n", self.current_branch, self.base_branch)
    }

    fn render_target(&self, b: &mut String, target: &str, line: Option<&str>) {
        match line {
            Some(line) => {
                let _ = write!(b, "=== TARGET FILE: {} (line {}) ===\n\n", target, line);
            }
            None => {
                let _ = write!(b, "=== TARGET FILE: {} ===\n\n", target);
            }
        }
        if let Some(before) = self.files_before.get(target) {
            let _ = write!(b, "--- BEFORE (original) ---\n{}\n\n", before);
        }
        if let Some(after) = self.files_after.get(target) {
            let _ = write!(b, "--- AFTER (current) ---\n{}\n\n", after);
        }
        let _ = write!(b, "--- DIFF ---\n{}\n\n", extract_file_diff(&self.diff_text, target));
    }

    /// Changed files still present at the tip, in diff order
    fn changed_after(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changed_files
            .iter()
            .filter_map(|f| self.files_after.get(f).map(|after| (f.as_str(), after.as_str())))
    }
}

/// The part of a unified diff that belongs to `target`.
///
/// A section starts at a `diff --git` header naming the file and runs until
/// the next header.
pub fn extract_file_diff(full_diff: &str, target: &str) -> String {
    let old_side = format!("{} a/{} ", DIFF_HEADER, target);
    let new_side = format!(" b/{}", target);

    let mut kept = Vec::new();
    let mut in_target = false;
    for line in full_diff.split('\n') {
        if line.starts_with(DIFF_HEADER) {
            in_target = line.starts_with(&old_side) || line.ends_with(&new_side);
        }
        if in_target {
            kept.push(line);
        }
    }
    kept.join("\n")
}

fn stays_inside(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    const DIFF: &str = "diff --git a/x.go b/x.go\nindex 1..2 100644\n--- a/x.go\n+++ b/x.go\n@@ -1 +1 @@\n-package x\n+package x // changed\ndiff --git a/y.go b/y.go\nnew file mode 100644\n--- /dev/null\n+++ b/y.go\n@@ -0,0 +1 @@\n+package y\n";

    #[derive(Default)]
    struct FakeSource {
        refs: Vec<&'static str>,
        merge_base_diff: Option<&'static str>,
        direct_diff: Option<&'static str>,
        files: Vec<&'static str>,
        contents: HashMap<(&'static str, &'static str), &'static str>,
    }

    fn missing(what: &str) -> GitError {
        GitError::Git(git2::Error::from_str(what))
    }

    impl VcsSource for FakeSource {
        fn current_branch(&self) -> Result<String, GitError> {
            Ok("feature".to_string())
        }

        fn resolves(&self, rev: &str) -> bool {
            self.refs.contains(&rev)
        }

        fn diff_text(&self, _base: &str, comparison: Comparison) -> Result<String, GitError> {
            let text = match comparison {
                Comparison::MergeBase => self.merge_base_diff,
                Comparison::Direct => self.direct_diff,
            };
            text.map(String::from).ok_or_else(|| missing("no diff"))
        }

        fn changed_files(&self, _base: &str, _comparison: Comparison) -> Result<Vec<String>, GitError> {
            Ok(self.files.iter().map(|f| f.to_string()).collect())
        }

        fn show(&self, rev: &str, path: &str) -> Result<String, GitError> {
            self.contents
                .iter()
                .find(|((r, p), _)| *r == rev && *p == path)
                .map(|(_, c)| c.to_string())
                .ok_or_else(|| missing("no such path"))
        }
    }

    fn added_file_source() -> FakeSource {
        let mut contents = HashMap::new();
        contents.insert(("main", "x.go"), "package x\n");
        contents.insert(("HEAD", "x.go"), "package x // changed\n");
        contents.insert(("HEAD", "y.go"), "package y\n");
        FakeSource {
            refs: vec!["main"],
            merge_base_diff: Some(DIFF),
            files: vec!["x.go", "y.go"],
            contents,
            ..Default::default()
        }
    }

    fn build(source: &FakeSource) -> DiffContext {
        DiffContext::build(source, None, &DiffConfig::default(), &CancelToken::new()).unwrap()
    }

    #[test]
    fn test_resolve_base() {
        let source = FakeSource {
            refs: vec!["dev"],
            ..Default::default()
        };
        let config = DiffConfig::default();
        assert_eq!(resolve_base(&source, Some("release"), &config), "release");
        assert_eq!(resolve_base(&source, Some("  "), &config), "dev");
        assert_eq!(resolve_base(&source, None, &config), "dev");
        assert_eq!(resolve_base(&FakeSource::default(), None, &config), "main");
    }

    #[test]
    fn test_added_file_has_no_before() {
        let ctx = build(&added_file_source());
        assert_eq!(ctx.base_branch, "main");
        assert_eq!(ctx.current_branch, "feature");
        assert_eq!(ctx.changed_files, vec!["x.go", "y.go"]);
        assert!(!ctx.files_before.contains_key("y.go"));
        assert_eq!(ctx.files_after.len(), 2);

        let rendered = ctx.for_qa(Some("y.go"), None);
        assert!(rendered.starts_with("BRANCH: feature (base branch: main)\n\n=== TARGET FILE: y.go ===\n\n"));
        assert!(rendered.contains("--- AFTER (current) ---\npackage y\n"));
        assert!(!rendered.contains("--- BEFORE"));
        assert!(rendered.contains("--- DIFF ---\ndiff --git a/y.go b/y.go\n"));
        assert!(!rendered.contains("package x // changed"));
    }

    #[test]
    fn test_full_change_view() {
        let ctx = build(&added_file_source());
        let rendered = ctx.for_qa(None, None);
        assert!(rendered.contains("=== CHANGED FILES ===\n- x.go\n- y.go\n\n=== FULL DIFF ===\ndiff --git a/x.go"));
    }

    #[test]
    fn test_target_line_in_banner() {
        let ctx = build(&added_file_source());
        assert!(ctx.for_qa(Some("x.go"), Some("3")).contains("=== TARGET FILE: x.go (line 3) ===\n\n"));
    }

    #[test]
    fn test_falls_back_to_direct_comparison() {
        let mut source = added_file_source();
        source.merge_base_diff = None;
        source.direct_diff = Some("diff --git a/x.go b/x.go\n");
        let ctx = build(&source);
        assert_eq!(ctx.diff_text, "diff --git a/x.go b/x.go\n");
    }

    #[test]
    fn test_no_diff_is_unavailable() {
        let mut source = added_file_source();
        source.merge_base_diff = None;
        let err = DiffContext::build(&source, Some("gone"), &DiffConfig::default(), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, GitError::DiffUnavailable { ref base, .. } if base == "gone"));
    }

    #[test]
    fn test_cancelled_build() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = DiffContext::build(&added_file_source(), None, &DiffConfig::default(), &cancel);
        assert!(matches!(result, Err(GitError::Cancelled)));
    }

    #[test]
    fn test_extract_file_diff_matches_exact_path() {
        let diff = "diff --git a/pkg/a.go b/pkg/a.go\n+a\ndiff --git a/a.go b/a.go\n+root a\ndiff --git a/b.go b/b.go\n+b";
        assert_eq!(extract_file_diff(diff, "a.go"), "diff --git a/a.go b/a.go\n+root a");
        assert_eq!(extract_file_diff(diff, "pkg/a.go"), "diff --git a/pkg/a.go b/pkg/a.go\n+a");
        assert_eq!(extract_file_diff(diff, "c.go"), "");
    }

    #[test]
    fn test_with_additional_sections() {
        let ctx = build(&added_file_source());
        let mut additional = BTreeMap::new();
        additional.insert("util.go".to_string(), "package util\n".to_string());

        let targeted = ctx.for_qa_with_additional(Some("x.go"), None, &additional, "--- z.go ---\nsig\n\n");
        assert!(targeted.contains("=== CHANGED FILES IN THIS PR ===\n\n=== TARGET FILE: x.go ===\n\n"));
        assert!(targeted.contains("--- BEFORE (original) ---\npackage x\n"));
        assert!(targeted.contains("=== Changed: y.go ===\n--- AFTER (current) ---\npackage y\n"));
        assert!(!targeted.contains("=== Changed: x.go ==="));
        assert!(targeted.contains("=== RELATED FILES (for context) ===\n\n--- util.go ---\npackage util\n"));
        assert!(targeted.ends_with("=== OTHER FILES (signatures only) ===\n\n--- z.go ---\nsig\n\n"));

        let full = ctx.for_qa_with_additional(None, None, &BTreeMap::new(), "");
        assert!(full.contains("--- x.go ---\nBEFORE:\npackage x\n\n\nAFTER:\npackage x // changed\n"));
        assert!(full.contains("--- y.go ---\nAFTER:\npackage y\n"));
        assert!(full.contains("FULL DIFF:\n"));
        assert!(!full.contains("RELATED FILES"));
        assert!(!full.contains("OTHER FILES"));
    }

    #[test]
    fn test_load_additional_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("util.go"), "package util\n").unwrap();
        std::fs::write(dir.path().join("x.go"), "on disk").unwrap();

        let ctx = build(&added_file_source());
        let loaded = ctx.load_additional_files(
            dir.path(),
            &[
                "util.go".to_string(),
                "x.go".to_string(),
                "missing.go".to_string(),
                "../escape.go".to_string(),
            ],
        );
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["util.go"], "package util\n");
    }

    #[test]
    fn test_target_file_content() {
        let ctx = build(&added_file_source());
        assert_eq!(ctx.target_file_content("y.go"), "package y\n");
        assert_eq!(ctx.target_file_content("gone.go"), "");
    }
}
