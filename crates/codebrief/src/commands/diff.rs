use libcodebrief_core::prompt::present;
use libcodebrief_git::DiffContext;
use serde::Serialize;

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct DiffOutput {
    base_branch: String,
    current_branch: String,
    changed_files: Vec<String>,
    context: String,
}

pub fn run(
    cli: &Cli,
    ctx: &BriefContext,
    base: Option<String>,
    file: Option<String>,
    line: Option<String>,
) -> Result<(), CliError> {
    let source = ctx.open_git()?;
    let diff = DiffContext::build(&source, base.as_deref(), &ctx.config.diff, &ctx.cancel)?;

    let context = diff.for_qa(present(&file), present(&line));

    let output = DiffOutput {
        base_branch: diff.base_branch.clone(),
        current_branch: diff.current_branch.clone(),
        changed_files: diff.changed_files.clone(),
        context: context.clone(),
    };
    output_success(cli, output, &context);
    Ok(())
}
