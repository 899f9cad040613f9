//! First round of the two-pass protocol: ask the model which files it needs.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::prompt;

/// Failure of the model capability itself
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to start model command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("model command exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("model returned an empty response")]
    Empty,
}

/// Text-in, text-out model capability. Retries are the implementor's concern.
pub trait Generate {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Implementing a task
    Coder,
    /// Answering a question about a change
    Qa,
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    /// Task instructions, or the user's question
    pub instruction: String,
    pub context: String,
    /// Global project rules
    pub overview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAction {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub files_to_modify: Vec<FileAction>,
    pub files_to_create: Vec<FileAction>,
    pub files_to_read: Vec<FileAction>,
}

impl AnalysisResult {
    /// Paths to promote: modify list then read list, first occurrence wins.
    /// Files to create do not exist yet and are left out.
    pub fn additional_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for action in self.files_to_modify.iter().chain(&self.files_to_read) {
            if seen.insert(action.path.as_str()) {
                paths.push(action.path.clone());
            }
        }
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.files_to_modify.is_empty() && self.files_to_create.is_empty() && self.files_to_read.is_empty()
    }
}

/// Why a response was read as an empty result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Degraded {
    #[error("response contains no JSON object")]
    NoJsonObject,

    #[error("response JSON does not decode: {0}")]
    InvalidJson(String),
}

/// A parsed response, possibly degraded to an empty result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub degraded: Option<Degraded>,
}

impl AnalysisOutcome {
    fn degraded(reason: Degraded) -> Self {
        Self {
            result: AnalysisResult::default(),
            degraded: Some(reason),
        }
    }
}

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Decode a model response that should hold an [`AnalysisResult`].
///
/// Surrounding code fences are dropped, then the widest `{...}` span is
/// decoded. Nothing here fails: an undecodable response is an empty result
/// carrying the reason.
pub fn parse_analysis_response(response: &str) -> AnalysisOutcome {
    let text = strip_fences(response);

    let Some(span) = JSON_OBJECT.find(text) else {
        return AnalysisOutcome::degraded(Degraded::NoJsonObject);
    };

    match serde_json::from_str::<AnalysisResult>(span.as_str()) {
        Ok(result) => AnalysisOutcome { result, degraded: None },
        Err(e) => AnalysisOutcome::degraded(Degraded::InvalidJson(e.to_string())),
    }
}

fn strip_fences(response: &str) -> &str {
    let text = response.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// One analysis round trip.
///
/// A model failure is returned to the caller, who carries on with the
/// context it already has; a bad response is never an error.
pub fn run_analysis(model: &dyn Generate, req: &AnalysisRequest) -> Result<AnalysisOutcome, GenerateError> {
    let prompt = prompt::analysis(req);
    let response = model.generate(&prompt)?;
    let outcome = parse_analysis_response(&response);

    match &outcome.degraded {
        Some(reason) => warn!(model = model.name(), %reason, "analysis degraded to empty result"),
        None => info!(
            model = model.name(),
            modify = outcome.result.files_to_modify.len(),
            create = outcome.result.files_to_create.len(),
            read = outcome.result.files_to_read.len(),
            "analysis parsed"
        ),
    }
    Ok(outcome)
}
