pub mod analysis;
pub mod cancel;
pub mod codebase;
pub mod config;
pub mod docs;
pub mod error;
pub mod files;
pub mod prompt;
pub mod signature;
pub mod task;

pub use analysis::{
    parse_analysis_response, run_analysis, AnalysisMode, AnalysisOutcome, AnalysisRequest, AnalysisResult,
    Degraded, FileAction, Generate, GenerateError,
};
pub use cancel::CancelToken;
pub use codebase::{ContextBuilder, ContextBundle};
pub use config::{load_config, save_config, CodebriefConfig, DiffConfig, DocsConfig, LlmConfig, WalkConfig};
pub use docs::TaskDocs;
pub use error::CoreError;
pub use files::{parse_generated_files, write_generated_files, GeneratedFile};
pub use prompt::{Question, ReviewVerdict};
pub use signature::{extract_signature, ExtractorRegistry, SignatureExtractor};
pub use task::TaskMetadata;
