// demos/api_handler/src/lib.rs

//! An API-gateway style request handler built on `lambda_pipeline`.
//!
//! Every request runs the same ordered steps: authorise the caller, validate the
//! `x-request-url` header, touch a flaky dependency, build a document and render it as
//! the response. Expected application failures become 400 responses; everything else
//! becomes a 500.

pub mod config;
pub mod errors;
pub mod event;
pub mod handler;
pub mod response;
pub mod steps;
pub mod third_party;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use event::{ApiEvent, LambdaContext};
pub use handler::ApiHandler;
pub use response::Response;
