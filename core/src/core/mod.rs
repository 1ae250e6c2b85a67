// lambda_pipeline/src/core/mod.rs

pub mod dependencies;
pub mod erased;
pub mod frozen;
pub mod payload;
pub mod step;
pub mod value;

// Re-export key types for easier access from other modules (and lib.rs)
pub use dependencies::{Dependencies, Dependency, IntoDependencies};
pub use erased::{Arguments, Erased};
pub use frozen::FrozenMap;
pub use payload::PipelineData;
pub use step::{step_fn, FnStep, Step, StepInput};
pub use value::{Value, ValueKind};
