use libcodebrief_core::TaskMetadata;
use serde::Serialize;

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct TaskOutput {
    task_id: String,
    instruction_path: String,
    #[serde(flatten)]
    metadata: TaskMetadata,
}

pub fn run(cli: &Cli, ctx: &BriefContext, task_id: String) -> Result<(), CliError> {
    let docs = ctx.docs();
    let path = docs.instruction_path(&task_id)?;
    let metadata = TaskMetadata::parse(&std::fs::read_to_string(&path)?);

    let mut text = format!("Task {} ({})\n", task_id, path.display());
    text.push_str(&format!(
        "Language: {}\n",
        metadata.language.as_deref().unwrap_or("-")
    ));
    if !metadata.depends_on.is_empty() {
        text.push_str(&format!("Depends on: {}\n", metadata.depends_on.join(", ")));
    }
    text.push_str("Target files:");
    if metadata.target_files.is_empty() {
        text.push_str(" none");
    }
    for target in &metadata.target_files {
        text.push_str(&format!("\n  - {}", target));
    }

    let output = TaskOutput {
        task_id,
        instruction_path: path.to_string_lossy().to_string(),
        metadata,
    };
    output_success(cli, output, &text);
    Ok(())
}
