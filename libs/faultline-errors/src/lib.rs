//! Core error types for Faultline
//!
//! This crate provides the data model and pure logic behind problem-details
//! error responses, with no dependency on an HTTP framework by default. It includes:
//! - RFC 9457 Problem Details (`Problem`)
//! - Declarative error metadata (`ErrorMeta`, `#[derive(ProblemMetadata)]`) and its extractor
//! - The response builder with fixed convenience constructors
//! - Redaction of sensitive values in client-facing text
//! - Trace id generation
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod builder;
pub mod meta;
pub mod problem;
pub mod redact;
pub mod trace;
pub mod uri;

// Re-export commonly used types
pub use builder::{
    BuildError, ProblemBuilder, data_integrity_error, generic_error, malformed_request_error,
    validation_error,
};
pub use faultline_errors_macro::ProblemMetadata;
pub use meta::{ErrorMeta, FALLBACK_TITLE, ProblemMetadata, ResolvedMeta, extract, has_metadata};
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};
pub use redact::{DEFAULT_SENSITIVE_KEYS, REDACTED, Redactor, sanitize};
pub use trace::{RandomTraceIds, TraceIdGenerator, new_trace_id};
pub use uri::{UriReferenceError, check_uri_reference};
