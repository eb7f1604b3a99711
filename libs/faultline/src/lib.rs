//! Problem-details error handling for axum services
//!
//! Handlers return `Result<_, Fault>`. Each `Fault` is classified by the
//! [`ProblemDispatcher`] into one of five paths and rendered as an
//! `application/problem+json` response:
//!
//! 1. domain errors carrying `ErrorMeta` (declared with `#[derive(ProblemMetadata)]`)
//! 2. request validation failures
//! 3. unreadable or malformed request bodies
//! 4. storage constraint violations
//! 5. everything else, including domain errors without metadata
//!
//! Only path 1 echoes the error message to the client, and only after
//! redaction. Every path logs the original error once with the trace id
//! returned in the body.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod dispatcher;
pub mod extractors;
pub mod fallback;
pub mod fault;
pub mod panic;

#[cfg(feature = "sqlx")]
pub mod db;

pub use config::{ConfigError, ProblemConfig};
pub use dispatcher::{ProblemDispatcher, global, install, validation_detail};
pub use extractors::{ProblemJson, ProblemPath, Validate, ValidatedJson};
pub use fallback::{RouteNotFound, route_not_found};
pub use fault::{BoxError, DomainError, Fault};
pub use panic::{PanicError, catch_panic_layer};

// The error model is part of this crate's API surface
pub use faultline_errors::{
    APPLICATION_PROBLEM_JSON, ErrorMeta, Problem, ProblemBuilder, ProblemMetadata,
    TraceIdGenerator, ValidationViolation,
};
