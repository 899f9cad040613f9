use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "codebrief",
    about = "Token-economical code context for LLM coding, review and pull-request Q&A",
    version
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Repository root
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Shell command that reads a prompt on stdin and answers on stdout
    #[arg(long, global = true, env = "CODEBRIEF_LLM_CMD")]
    pub llm_cmd: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the signature of a source file
    Signature {
        /// File to condense
        path: PathBuf,
    },

    /// Print the metadata parsed from a task document
    Task {
        /// Task ID (matches <tasks_dir>/<ID>_*.md)
        #[arg(long, env = "TASK_ID")]
        task: String,
    },

    /// Print the codebase context assembled for a task
    Context {
        #[arg(long, env = "TASK_ID")]
        task: String,

        /// Render the implementation view instead of the analysis view
        #[arg(long)]
        implementation: bool,
    },

    /// Print the diff context used for pull-request questions
    Diff {
        /// Base branch (default: first of the configured candidates that exists)
        #[arg(long, env = "BASE_BRANCH")]
        base: Option<String>,

        /// Focus on one changed file
        #[arg(long, env = "COMMENT_PATH")]
        file: Option<String>,

        /// Line the question is about
        #[arg(long, env = "COMMENT_END_LINE")]
        line: Option<String>,
    },

    /// Implement a task: analysis round, then generation; writes the files
    Code {
        #[arg(long, env = "TASK_ID")]
        task: String,

        /// Reviewer feedback from a previous attempt
        #[arg(long, env = "FEEDBACK")]
        feedback: Option<String>,
    },

    /// Review the current state of a task's files
    Review {
        #[arg(long, env = "TASK_ID")]
        task: String,
    },

    /// Answer a question about the current branch; writes answer.md
    Ask {
        /// The question (a leading /ask is ignored)
        #[arg(long, env = "PR_QUESTION")]
        question: String,

        /// File the question was asked on
        #[arg(long, env = "COMMENT_PATH")]
        file: Option<String>,

        /// First line of a multi-line comment
        #[arg(long, env = "COMMENT_START_LINE")]
        start_line: Option<String>,

        /// Line (or last line) the question is about
        #[arg(long, env = "COMMENT_END_LINE")]
        line: Option<String>,

        #[arg(long, env = "BASE_BRANCH")]
        base: Option<String>,
    },

    /// Write the completion summary of a merged task
    Summarize {
        #[arg(long, env = "TASK_ID")]
        task: String,

        /// Pull request number
        #[arg(long, env = "PR_NUMBER")]
        pr: Option<String>,

        /// Files the task implemented
        #[arg(required = true)]
        files: Vec<String>,
    },
}
