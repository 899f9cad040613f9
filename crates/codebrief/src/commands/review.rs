use libcodebrief_core::{prompt, Generate, ReviewVerdict, TaskMetadata};
use serde::Serialize;

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct ReviewOutput {
    task_id: String,
    verdict: ReviewVerdict,
    review: String,
}

pub fn run(cli: &Cli, ctx: &BriefContext, task_id: String) -> Result<(), CliError> {
    let model = ctx.generator()?;
    let instruction = ctx.docs().instruction(&task_id)?;
    let metadata = TaskMetadata::parse(&instruction);

    let bundle = ctx.builder().build(&metadata, &ctx.cancel)?;
    let review = model.generate(&prompt::reviewer(&instruction, &bundle.for_implementation()))?;
    let verdict = ReviewVerdict::from_review(&review);

    let label = match verdict {
        ReviewVerdict::Pass => "PASS",
        ReviewVerdict::Fail => "CHANGES REQUESTED",
    };
    let text = format!(
        "=== REVIEW CONTENT ===\n{}\n=== END REVIEW ===\nVerdict: {}",
        review.trim_end(),
        label
    );

    output_success(cli, ReviewOutput { task_id, verdict, review }, &text);
    Ok(())
}
