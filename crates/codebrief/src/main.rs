mod cli;
mod commands;
mod context;
mod error;
mod generator;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use context::BriefContext;
use error::CliError;
use libcodebrief_core::{CancelToken, Question};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %e, "could not install interrupt handler");
    }

    if let Err(e) = run_command(&cli, cancel) {
        output::output_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout stays clean for JSON and prompts
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run_command(cli: &Cli, cancel: CancelToken) -> Result<(), CliError> {
    let ctx = BriefContext::resolve(cli, cancel)?;

    match &cli.command {
        Command::Signature { path } => commands::signature::run(cli, &ctx, path.clone()),
        Command::Task { task } => commands::task::run(cli, &ctx, task.clone()),
        Command::Context { task, implementation } => commands::context::run(cli, &ctx, task.clone(), *implementation),
        Command::Diff { base, file, line } => commands::diff::run(cli, &ctx, base.clone(), file.clone(), line.clone()),
        Command::Code { task, feedback } => commands::code::run(cli, &ctx, task.clone(), feedback.clone()),
        Command::Review { task } => commands::review::run(cli, &ctx, task.clone()),
        Command::Ask {
            question,
            file,
            start_line,
            line,
            base,
        } => {
            let question = Question {
                text: question.clone(),
                file: file.clone(),
                start_line: start_line.clone(),
                line: line.clone(),
            };
            commands::ask::run(cli, &ctx, question, base.clone())
        }
        Command::Summarize { task, pr, files } => {
            commands::summarize::run(cli, &ctx, task.clone(), pr.clone(), files.clone())
        }
    }
}
