//! Git-backed diff contexts for codebrief
//!
//! This crate answers "what changed on this branch" for pull-request Q&A:
//! - Base-branch resolution with an ordered candidate list
//! - Merge-base diff with a direct-comparison fallback
//! - Before/after file contents per changed path
//! - Per-file diff slices and the rendered Q&A contexts

mod diff;
mod error;
mod source;

pub use diff::{extract_file_diff, resolve_base, DiffContext};
pub use error::GitError;
pub use source::{Comparison, Git2Source, VcsSource, HEAD};
