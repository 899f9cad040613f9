use serde::Serialize;

use crate::cli::Cli;
use crate::error::CliError;

const SCHEMA_VERSION: u32 = 1;

/// `--json` envelope: `data` on success, `error` on failure
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

#[derive(Serialize)]
pub struct JsonError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl<T: Serialize> JsonResponse<T> {
    fn success(data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn render(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "ok": false,
                "error": { "code": "internal_error", "message": e.to_string() },
            })
            .to_string()
        })
    }
}

impl JsonResponse<()> {
    fn failure(err: &CliError) -> Self {
        let suggestions = err.suggestions();
        let details = if suggestions.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::json!({ "suggestions": suggestions })
        };
        Self {
            schema_version: SCHEMA_VERSION,
            ok: false,
            data: None,
            error: Some(JsonError {
                code: err.error_code().to_string(),
                message: err.to_string(),
                details,
            }),
        }
    }
}

/// Print a command result: the envelope with `--json`, else `text` unless `--quiet`
pub fn output_success<T: Serialize>(cli: &Cli, data: T, text: &str) {
    if cli.json {
        println!("{}", JsonResponse::success(data).render());
    } else if !cli.quiet {
        println!("{}", text);
    }
}

/// Errors always go to stderr, even with `--quiet`
pub fn output_error(cli: &Cli, err: &CliError) {
    if cli.json {
        eprintln!("{}", JsonResponse::failure(err).render());
        return;
    }

    eprintln!("error: {}", err);
    let suggestions = err.suggestions();
    if !suggestions.is_empty() {
        eprintln!("\nSuggestions:");
        for suggestion in suggestions {
            eprintln!("  - {}", suggestion);
        }
    }
}
