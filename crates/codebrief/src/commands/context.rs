use libcodebrief_core::TaskMetadata;
use serde::Serialize;

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct ContextOutput {
    task_id: String,
    mode: &'static str,
    target_files: Vec<String>,
    signature_files: usize,
    context: String,
}

pub fn run(cli: &Cli, ctx: &BriefContext, task_id: String, implementation: bool) -> Result<(), CliError> {
    let docs = ctx.docs();
    let instruction = docs.instruction(&task_id)?;
    let metadata = TaskMetadata::parse(&instruction);

    let bundle = ctx.builder().build(&metadata, &ctx.cancel)?;

    let context = if implementation {
        bundle.for_implementation()
    } else {
        let dependent = docs.dependent_context(&metadata.depends_on);
        with_dependents(&dependent, bundle.for_analysis())
    };

    let output = ContextOutput {
        task_id,
        mode: if implementation { "implementation" } else { "analysis" },
        target_files: bundle.target_files().keys().cloned().collect(),
        signature_files: bundle.signature_files().len(),
        context: context.clone(),
    };
    output_success(cli, output, &context);
    Ok(())
}

/// Dependent-task summaries go before the codebase context
pub fn with_dependents(dependent: &str, context: String) -> String {
    if dependent.is_empty() {
        context
    } else {
        format!("{}\n\n{}", dependent, context)
    }
}
