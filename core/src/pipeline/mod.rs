// lambda_pipeline/src/pipeline/mod.rs

//! Defines the `Pipeline<E, C, Err>` struct, its construction and its execution.

pub mod definition;
pub mod execution;

// Re-export the main Pipeline struct and its builder
pub use definition::{Pipeline, PipelineBuilder};
