use libcodebrief_core::{
    parse_generated_files, prompt, run_analysis, write_generated_files, AnalysisMode, AnalysisRequest, Generate,
    TaskMetadata,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::commands::context::with_dependents;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct CodeOutput {
    task_id: String,
    target_files: Vec<String>,
    promoted: Vec<String>,
    written: Vec<String>,
}

pub fn run(cli: &Cli, ctx: &BriefContext, task_id: String, feedback: Option<String>) -> Result<(), CliError> {
    let model = ctx.generator()?;
    let docs = ctx.docs();

    let overview = docs.overview();
    let instruction = docs.instruction(&task_id)?;
    let metadata = TaskMetadata::parse(&instruction);
    info!(task = %task_id, targets = ?metadata.target_files, "task loaded");

    let dependent = docs.dependent_context(&metadata.depends_on);
    let mut bundle = ctx.builder().build(&metadata, &ctx.cancel)?;

    // Pass 1: which other files does the model need in full
    let request = AnalysisRequest {
        mode: AnalysisMode::Coder,
        instruction: instruction.clone(),
        context: with_dependents(&dependent, bundle.for_analysis()),
        overview: overview.clone(),
    };
    let promoted = match run_analysis(&model, &request) {
        Ok(outcome) => bundle.reload(&outcome.result.additional_paths()),
        Err(e) => {
            warn!(error = %e, "analysis failed, continuing with target files only");
            Vec::new()
        }
    };
    ctx.cancel.check()?;

    // Pass 2: implementation
    let generation = prompt::implementation(
        &overview,
        &bundle.for_implementation(),
        &instruction,
        feedback.as_deref(),
    );
    let response = model.generate(&generation)?;

    let files = parse_generated_files(&response);
    if files.is_empty() {
        warn!(model = model.name(), "model produced no file blocks");
    }
    write_generated_files(&ctx.root, &files)?;

    let written: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
    let mut text = format!("Task {}: wrote {} file(s)", task_id, written.len());
    for path in &written {
        text.push_str(&format!("\n  {}", path));
    }

    let output = CodeOutput {
        task_id,
        target_files: bundle.target_files().keys().cloned().collect(),
        promoted,
        written,
    };
    output_success(cli, output, &text);
    Ok(())
}
