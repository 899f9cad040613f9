use std::path::PathBuf;

use libcodebrief_core::{CoreError, ExtractorRegistry};
use serde::Serialize;

use crate::cli::Cli;
use crate::context::BriefContext;
use crate::error::CliError;
use crate::output::output_success;

#[derive(Serialize)]
struct SignatureOutput {
    path: String,
    signature: String,
}

pub fn run(cli: &Cli, ctx: &BriefContext, path: PathBuf) -> Result<(), CliError> {
    let full = if path.is_absolute() { path.clone() } else { ctx.root.join(&path) };
    let content = std::fs::read_to_string(&full)
        .map_err(|e| CoreError::NotFound(format!("{}: {}", full.display(), e)))?;

    let display = path.to_string_lossy().to_string();
    let signature = ExtractorRegistry::default().extract(&display, &content);

    let text = signature.clone();
    output_success(cli, SignatureOutput { path: display, signature }, &text);
    Ok(())
}
