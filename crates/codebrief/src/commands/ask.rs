use std::collections::BTreeMap;

use libcodebrief_core::{
    prompt, run_analysis, AnalysisMode, AnalysisRequest, ContextBundle, Generate, Question, TaskMetadata,
};
use libcodebrief_git::{DiffContext, GitError};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::generator::CommandGenerator;
use crate::output::output_success;

/// Written under the root for the CI step that posts the reply
pub const ANSWER_FILE: &str = "answer.md";

#[derive(Serialize)]
struct AskOutput {
    answer_path: String,
    diff_available: bool,
    related_files: Vec<String>,
    answer: String,
}

pub fn run(cli: &Cli, ctx: &BriefContext, question: Question, base: Option<String>) -> Result<(), CliError> {
    if question.request().is_empty() {
        return Err(libcodebrief_core::CoreError::InvalidArgs("question is empty".to_string()).into());
    }
    let model = ctx.generator()?;
    let overview = ctx.docs().overview();

    // Questions are not tied to a task: every file is signature-only
    let bundle = ctx.builder().build(&TaskMetadata::default(), &ctx.cancel)?;

    let diff = match ctx
        .open_git()
        .and_then(|source| DiffContext::build(&source, base.as_deref(), &ctx.config.diff, &ctx.cancel))
    {
        Ok(diff) => Some(diff),
        Err(GitError::Cancelled) => return Err(GitError::Cancelled.into()),
        Err(e) => {
            warn!(error = %e, "diff context unavailable, answering from the codebase only");
            None
        }
    };

    let (context, related) = match &diff {
        Some(diff) => with_diff(ctx, &model, &question, &overview, diff, &bundle)?,
        None => (bundle.for_analysis(), BTreeMap::new()),
    };

    let answer = model.generate(&prompt::qa(&overview, &context, &question))?;

    let answer_path = ctx.root.join(ANSWER_FILE);
    std::fs::write(&answer_path, &answer)?;
    info!(path = %answer_path.display(), "answer written");

    let output = AskOutput {
        answer_path: answer_path.to_string_lossy().to_string(),
        diff_available: diff.is_some(),
        related_files: related.keys().cloned().collect(),
        answer: answer.clone(),
    };
    output_success(cli, output, answer.trim_end());
    Ok(())
}

/// Two-pass Q&A over the diff: discover related files, then render everything
fn with_diff(
    ctx: &BriefContext,
    model: &CommandGenerator,
    question: &Question,
    overview: &str,
    diff: &DiffContext,
    bundle: &ContextBundle,
) -> Result<(String, BTreeMap<String, String>), CliError> {
    info!(changed = diff.changed_files.len(), base = %diff.base_branch, "diff context ready");

    let in_diff = |path: &str| diff.files_after.contains_key(path);
    let mut analysis_context = diff.for_qa(question.file(), question.line());
    analysis_context.push_str("\n\n=== OTHER FILES (signatures) ===\n");
    analysis_context.push_str(&bundle.signatures_excluding(in_diff));

    let request = AnalysisRequest {
        mode: AnalysisMode::Qa,
        instruction: question.for_analysis(),
        context: analysis_context,
        overview: overview.to_string(),
    };
    let related = match run_analysis(model, &request) {
        Ok(outcome) => diff.load_additional_files(&ctx.root, &outcome.result.additional_paths()),
        Err(e) => {
            warn!(model = model.name(), error = %e, "question analysis failed");
            BTreeMap::new()
        }
    };
    ctx.cancel.check()?;

    let signatures = bundle.signatures_excluding(|p| in_diff(p) || related.contains_key(p));
    let context = diff.for_qa_with_additional(question.file(), question.line(), &related, &signatures);
    Ok((context, related))
}
