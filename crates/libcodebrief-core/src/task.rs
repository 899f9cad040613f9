//! Field extraction from free-text task documents.
//!
//! The grammar is informal: an optional `LANGUAGE: <tag>` line, an optional
//! `DEPENDS ON: <id>, <id>` line and an optional `TARGET FILES:` section of
//! `- path` bullets. Everything else is prose and is only kept verbatim.

use serde::Serialize;

const LANGUAGE: &str = "LANGUAGE:";
const TARGET_FILES: &str = "TARGET FILES:";
const DEPENDS_ON: [&str; 2] = ["DEPENDS ON:", "DEPENDS_ON:"];

/// What a task document declares about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskMetadata {
    /// Files shown in full, in document order; duplicates are kept
    pub target_files: Vec<String>,
    pub language: Option<String>,
    /// Ids of tasks whose results this task builds on
    pub depends_on: Vec<String>,
    /// The task text exactly as read
    #[serde(skip)]
    pub raw_content: String,
}

impl TaskMetadata {
    /// Parse a task document in a single forward scan
    pub fn parse(text: &str) -> Self {
        let mut meta = TaskMetadata {
            raw_content: text.to_string(),
            ..Default::default()
        };
        let mut in_targets = false;

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some(value) = strip_prefix_ci(trimmed, LANGUAGE) {
                let value = value.trim();
                meta.language = (!value.is_empty()).then(|| value.to_string());
                continue;
            }

            if let Some(value) = DEPENDS_ON.iter().find_map(|k| strip_prefix_ci(trimmed, k)) {
                meta.depends_on = value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect();
                continue;
            }

            if strip_prefix_ci(trimmed, TARGET_FILES).is_some() {
                in_targets = true;
                continue;
            }

            if !in_targets {
                continue;
            }

            if trimmed.starts_with('#') {
                in_targets = false;
                continue;
            }

            if let Some(item) = trimmed.strip_prefix('-') {
                if let Some(path) = bullet_path(item) {
                    meta.target_files.push(path);
                }
            }

            // A blank line right after the header does not end the section
            if trimmed.is_empty() && !meta.target_files.is_empty() {
                in_targets = false;
            }
        }

        meta
    }

    /// Whether `path` names a target file, ignoring a leading `./` on either side
    pub fn is_target_file(&self, path: &str) -> bool {
        let path = normalize(path);
        self.target_files.iter().any(|t| normalize(t) == path)
    }
}

/// Strip a leading `./`
pub fn normalize(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// `- path/to/file.go  # comment` -> `path/to/file.go`
fn bullet_path(item: &str) -> Option<String> {
    let item = match item.find('#') {
        Some(idx) => &item[..idx],
        None => item,
    };
    let path = item.trim().trim_matches('`').trim();
    (!path.is_empty()).then(|| path.to_string())
}
