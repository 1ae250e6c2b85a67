// src/lib.rs

//! lambda_pipeline: a contract-enforcing, sequential pipeline engine for request handlers.
//!
//! A handler receives an event, builds a pipeline for it and folds an immutable payload
//! through an ordered list of steps. The engine guarantees that:
//!  - Every step declares exactly the contract derived from the event type
//!    (`(data, event, context, dependencies, logger) -> PipelineData`), checked once,
//!    before any payload flows.
//!  - Each call's actual arguments match the declared parameter types, and the payload
//!    satisfies the step's schema (with lenient coercion of scalar fields).
//!  - Each call returns exactly a `PipelineData`.
//!  - The shared execution context cannot be changed by a step: every call works on its
//!    own copy of a snapshot taken at construction.
//!  - Payloads, events and dependency bags are immutable once built.
//!
//! Step errors propagate unchanged; the first failing step ends the run.

// Declare modules according to the planned structure
pub mod contract;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod stages;

// --- Re-exports for the Public API ---

// Immutable data and the types steps work with
pub use crate::core::dependencies::{Dependencies, Dependency, IntoDependencies};
pub use crate::core::erased::{Arguments, Erased};
pub use crate::core::frozen::FrozenMap;
pub use crate::core::payload::PipelineData;
pub use crate::core::step::{step_fn, FnStep, Step, StepInput};
pub use crate::core::value::{Value, ValueKind};

// The contract and the stages enforcing it
pub use crate::contract::{FieldSpec, Param, PayloadSchema, SchemaViolation, Signature, StepContract, TypeDescriptor};
pub use crate::stages::{Invoker, Stage};

// The main Pipeline struct and its builder
pub use crate::pipeline::{Pipeline, PipelineBuilder};

pub use crate::error::{PipelineError, PipelineResult};

// Name-keyed registry for assembling pipelines from configuration
pub use crate::registry::StepRegistry;

/*
    Core Workflow:
    1. Define an event type `MyEvent` and a context type `MyCtx: Clone`.
    2. Write steps as `fn(StepInput<'_, MyEvent, MyCtx>) -> Result<PipelineData, MyError>`
       and wrap them with `step_fn(name, f)`, optionally `.with_schema(...)`.
    3. For each event: `Pipeline::<MyEvent, MyCtx, MyError>::builder().step(..).build(event, &ctx)?`.
       A step written for another event type fails here with `PipelineError::Signature`.
    4. `pipeline.run(initial_data)` returns the last step's payload or the first error.
*/
