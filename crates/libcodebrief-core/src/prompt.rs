//! Prompt assembly for each model round.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::analysis::{AnalysisMode, AnalysisRequest};

/// Lines kept per implemented file in a completion summary prompt
pub const SUMMARY_FILE_LINES: usize = 50;

const CODER_ANALYSIS_RULES: &str = r#"INSTRUCTIONS:
1. Analyze the task requirements
2. Review the TARGET FILES (full content) and OTHER FILES (signatures)
3. Identify which additional files need full content to complete the task

OUTPUT FORMAT (JSON only, no markdown):
{
  "files_to_modify": [
    {"path": "path/to/file.go", "sections": ["FunctionName"], "reason": "why"}
  ],
  "files_to_create": [
    {"path": "path/to/new_file.go", "reason": "why"}
  ]
}

RULES:
- Do NOT include files already shown with full content
- Only request files whose signatures suggest they need modification
- Be conservative - only request files you truly need
- Output valid JSON only"#;

const QA_ANALYSIS_RULES: &str = r#"INSTRUCTIONS:
1. Analyze what the user is asking
2. Review the DIFF (changed files) and SIGNATURES (other files)
3. Identify which additional files need full content to answer accurately

OUTPUT FORMAT (JSON only, no markdown):
{
  "files_to_read": [
    {"path": "path/to/file.go", "reason": "why this file helps answer the question"}
  ]
}

RULES:
- Do NOT include files already shown in the diff with full content
- Only request files that are necessary to understand the context
- Consider files that implement related logic, define types used or show patterns
- Be conservative - only request files you truly need
- Output valid JSON only"#;

/// File-discovery prompt for either mode
pub fn analysis(req: &AnalysisRequest) -> String {
    let mut b = String::from("You are a Senior Engineer analyzing a codebase.\n\n");
    let _ = write!(b, "GLOBAL PROJECT RULES:\n{}\n\n", req.overview);

    match req.mode {
        AnalysisMode::Coder => {
            let _ = write!(b, "TASK INSTRUCTIONS:\n{}\n\n", req.instruction);
            let _ = write!(b, "CODEBASE CONTEXT:\n{}\n\n", req.context);
            b.push_str(CODER_ANALYSIS_RULES);
        }
        AnalysisMode::Qa => {
            let _ = write!(b, "USER QUESTION:\n{}\n\n", req.instruction);
            let _ = write!(b, "CONTEXT (Diff + Signatures):\n{}\n\n", req.context);
            b.push_str(QA_ANALYSIS_RULES);
        }
    }
    b
}

/// Second coder round: produce full file contents
pub fn implementation(overview: &str, context: &str, instruction: &str, feedback: Option<&str>) -> String {
    let feedback = feedback.map(str::trim).filter(|f| !f.is_empty()).unwrap_or("None.");
    format!(
        r#"You are a Senior Engineer. Implement the following task.

GLOBAL PROJECT RULES (MUST FOLLOW):
{overview}

CONTEXT:
{context}

TASK INSTRUCTIONS:
{instruction}

REQUIREMENTS:
1. Output the FULL content of any file you create or modify.
2. Format:
   ### File: path/to/file.ext
   ```
   // content
   ```
3. FIX issues from the FEEDBACK below (if any).
4. Only modify files shown in CONTEXT - do not invent new paths.

PREVIOUS REVIEWER FEEDBACK:
{feedback}"#
    )
}

/// A question asked on a pull request, optionally anchored to a file and lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: String,
    pub file: Option<String>,
    pub start_line: Option<String>,
    pub line: Option<String>,
}

impl Question {
    /// The question with any `/ask` command prefix removed
    pub fn request(&self) -> &str {
        let text = self.text.trim();
        text.strip_prefix("/ask").unwrap_or(text).trim()
    }

    pub fn file(&self) -> Option<&str> {
        present(&self.file)
    }

    pub fn line(&self) -> Option<&str> {
        present(&self.line)
    }

    /// Question text as shown to the analysis round
    pub fn for_analysis(&self) -> String {
        match self.file() {
            Some(file) => format!("[File: {}, Line: {}] {}", file, self.line().unwrap_or(""), self.request()),
            None => self.request().to_string(),
        }
    }

    /// `TARGET FILE`/`TARGET LINE(S)` block, only when both file and line are known
    fn target_info(&self) -> String {
        let (Some(file), Some(end)) = (self.file(), self.line()) else {
            return String::new();
        };
        let lines = match present(&self.start_line) {
            Some(start) if start != end => format!("TARGET LINES: {}-{}", start, end),
            _ => format!("TARGET LINE: {}", end),
        };
        format!("\nTARGET FILE: {}\n{}\n", file, lines)
    }
}

/// Empty strings and the literal `None` (as sent by CI for a missing start line) are absent
pub fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "None")
}

/// Second Q&A round: answer the question
pub fn qa(overview: &str, context: &str, question: &Question) -> String {
    let target_info = question.target_info();
    let request = question.request();
    format!(
        r#"You are a Helpful Senior Engineer Assistant reviewing a Pull Request.

GLOBAL PROJECT RULES:
{overview}

CONTEXT:
{context}
{target_info}
USER QUESTION:
{request}

INSTRUCTIONS:
- You can see BEFORE (original) and AFTER (current) versions of changed files
- You also have full content of related files for deeper understanding
- Use this context to give accurate, specific answers
- Reference actual code when explaining
- If suggesting code changes, output the FULL file content using format:
  ### File: path/to/file.ext
"#
    )
}

pub fn reviewer(instruction: &str, context: &str) -> String {
    format!(
        r#"You are a Strict Code Reviewer (Principal Engineer).

Verify the code below against instructions:
{instruction}

GENERATED CODE:
{context}

OUTPUT FORMAT:
First line: STATUS: [PASS or FAIL]
Subsequent lines: Bullet points of critique."#
    )
}

/// Reviewer decision read from the review text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewVerdict {
    Pass,
    Fail,
}

impl ReviewVerdict {
    pub fn from_review(review: &str) -> Self {
        if review.contains("STATUS: PASS") {
            ReviewVerdict::Pass
        } else {
            ReviewVerdict::Fail
        }
    }
}

/// Completion summary of a merged task, for tasks that depend on it
pub fn summary(task_id: &str, pr: Option<&str>, instruction: &str, files: &BTreeMap<String, String>) -> String {
    let pr = pr.unwrap_or("");
    let mut file_list = String::new();
    for (path, content) in files {
        let _ = write!(
            file_list,
            "### {}\n```\n{}\n```\n\n",
            path,
            truncate_content(content, SUMMARY_FILE_LINES)
        );
    }

    format!(
        r#"You are a technical documentation writer.

A task has been completed and merged. Generate a completion summary for future reference.

TASK ID: {task_id}
PR NUMBER: {pr}

ORIGINAL TASK INSTRUCTIONS:
{instruction}

FILES IMPLEMENTED:
{file_list}
Generate a completion summary in this EXACT format:

# Task {task_id} - Completed

MERGED: [current date]
PR: #{pr}

## Final Implementation
[List each file with a brief description of what it contains]

## Key Decisions
[List important implementation decisions, patterns used, or deviations from original instructions]

## API/Interface Summary
[List public functions, types, or endpoints created - this helps dependent tasks]

## Patterns Established
[List any conventions or patterns that future tasks should follow]

## Notes for Dependent Tasks
[Any important context for tasks that build on this work]

Keep it concise but informative. Focus on what future tasks need to know."#
    )
}

fn truncate_content(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }
    format!("{}\n// ... (truncated)", lines[..max_lines].join("\n"))
}
