//! Full-content / signature-only classification of a source tree.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::config::WalkConfig;
use crate::error::CoreError;
use crate::signature::ExtractorRegistry;
use crate::task::{normalize, TaskMetadata};

const TARGET_BANNER: &str = "=== TARGET FILES (Full content) ===\n\n";
const ADDITIONAL_BANNER: &str = "=== ADDITIONAL FILES (Full content) ===\n\n";
const SIGNATURE_BANNER: &str = "=== OTHER FILES (Signatures only) ===\n\n";

/// Walks a tree once and splits it into a [`ContextBundle`]
pub struct ContextBuilder {
    root: PathBuf,
    walk: WalkConfig,
    extractors: ExtractorRegistry,
}

impl ContextBuilder {
    pub fn new(root: impl Into<PathBuf>, walk: WalkConfig, extractors: ExtractorRegistry) -> Self {
        Self {
            root: root.into(),
            walk,
            extractors,
        }
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Read every recognized file under the root.
    ///
    /// Task targets keep their full content; everything else is reduced to
    /// its signature. Unreadable entries are skipped, only cancellation
    /// aborts the walk.
    pub fn build(&self, task: &TaskMetadata, cancel: &CancelToken) -> Result<ContextBundle, CoreError> {
        let mut bundle = ContextBundle::new(&self.root);

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                !self.walk.is_excluded_dir(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            cancel.check()?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(rel) = relative_path(&self.root, entry.path()) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy();
            if self.walk.is_skipped_file(&name, &rel) || !self.walk.is_code_file(entry.path()) {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %rel, error = %e, "skipping unreadable file");
                    continue;
                }
            };

            if task.is_target_file(&rel) {
                bundle.target_files.insert(rel, content);
            } else {
                let signature = self.extractors.extract(&rel, &content);
                bundle.signature_files.insert(rel, signature);
            }
        }

        info!(
            targets = bundle.target_files.len(),
            signatures = bundle.signature_files.len(),
            "codebase walked"
        );
        Ok(bundle)
    }
}

/// Tree-relative, `/`-separated path
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

/// Three disjoint path -> content maps.
///
/// The only mutation after construction is [`ContextBundle::reload`], which
/// moves entries from the signature map to the additional map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBundle {
    root: PathBuf,
    target_files: BTreeMap<String, String>,
    signature_files: BTreeMap<String, String>,
    additional_files: BTreeMap<String, String>,
}

impl ContextBundle {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            target_files: BTreeMap::new(),
            signature_files: BTreeMap::new(),
            additional_files: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target_files(&self) -> &BTreeMap<String, String> {
        &self.target_files
    }

    pub fn signature_files(&self) -> &BTreeMap<String, String> {
        &self.signature_files
    }

    pub fn additional_files(&self) -> &BTreeMap<String, String> {
        &self.additional_files
    }

    /// Targets then signatures, for the file-discovery round
    pub fn for_analysis(&self) -> String {
        let mut b = String::new();
        render_section(&mut b, TARGET_BANNER, &self.target_files);
        render_section(&mut b, SIGNATURE_BANNER, &self.signature_files);
        b
    }

    /// Targets, promoted files, then signatures
    pub fn for_implementation(&self) -> String {
        let mut b = String::new();
        render_section(&mut b, TARGET_BANNER, &self.target_files);
        render_section(&mut b, ADDITIONAL_BANNER, &self.additional_files);
        render_section(&mut b, SIGNATURE_BANNER, &self.signature_files);
        b
    }

    /// Promote signature-only paths to full content.
    ///
    /// Paths that are already full content, or that the walk never saw, are
    /// ignored, as are files that can no longer be read. Returns the paths
    /// actually promoted.
    pub fn reload(&mut self, paths: &[String]) -> Vec<String> {
        let mut promoted = Vec::new();
        for path in paths {
            let path = normalize(path);
            if !self.signature_files.contains_key(path) {
                continue;
            }
            let content = match std::fs::read_to_string(self.root.join(path)) {
                Ok(content) => content,
                Err(e) => {
                    debug!(path, error = %e, "cannot promote unreadable file");
                    continue;
                }
            };
            self.signature_files.remove(path);
            self.additional_files.insert(path.to_string(), content);
            promoted.push(path.to_string());
        }
        if !promoted.is_empty() {
            info!(count = promoted.len(), "promoted files to full content");
        }
        promoted
    }

    /// Signature entries rendered as `--- path ---` blocks, minus `exclude`d paths
    pub fn signatures_excluding(&self, exclude: impl Fn(&str) -> bool) -> String {
        let mut b = String::new();
        for (path, sig) in &self.signature_files {
            if exclude(path) {
                continue;
            }
            let _ = write!(b, "--- {} ---\n{}\n\n", path, sig);
        }
        b
    }

    /// No path is in more than one map
    pub fn is_disjoint(&self) -> bool {
        let maps = [&self.target_files, &self.signature_files, &self.additional_files];
        maps.iter().enumerate().all(|(i, a)| {
            maps[i + 1..]
                .iter()
                .all(|b| a.keys().all(|k| !b.contains_key(k)))
        })
    }
}

fn render_section(b: &mut String, banner: &str, files: &BTreeMap<String, String>) {
    if files.is_empty() {
        return;
    }
    b.push_str(banner);
    for (path, content) in files {
        let _ = write!(b, "--- File: {} ---\n{}\n\n", path, content);
    }
}
