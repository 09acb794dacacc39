//! Pipeline composition and execution for the translocation analysis.

mod runner;

pub use runner::{run_translocation, Pipeline, PipelineConfig, PipelineStage};
