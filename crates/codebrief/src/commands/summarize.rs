use std::collections::BTreeMap;

use libcodebrief_core::{prompt, CoreError, Generate};
use serde::Serialize;
use tracing::info;

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct SummarizeOutput {
    task_id: String,
    path: String,
}

pub fn run(cli: &Cli, ctx: &BriefContext, task_id: String, pr: Option<String>, files: Vec<String>) -> Result<(), CliError> {
    let model = ctx.generator()?;
    let docs = ctx.docs();
    let instruction = docs.instruction(&task_id)?;

    let mut implemented = BTreeMap::new();
    for file in files {
        let content = std::fs::read_to_string(ctx.root.join(&file))
            .map_err(|e| CoreError::NotFound(format!("{}: {}", file, e)))?;
        implemented.insert(file, content);
    }

    let summary = model.generate(&prompt::summary(&task_id, pr.as_deref(), &instruction, &implemented))?;

    let path = docs.completed_path(&task_id)?;
    std::fs::write(&path, &summary)?;
    info!(path = %path.display(), "completion summary written");

    let text = format!("Wrote {}", path.display());
    let output = SummarizeOutput {
        task_id,
        path: path.to_string_lossy().to_string(),
    };
    output_success(cli, output, &text);
    Ok(())
}
