pub mod ask;
pub mod code;
pub mod context;
pub mod diff;
pub mod review;
pub mod signature;
pub mod summarize;
pub mod task;
