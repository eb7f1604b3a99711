//! Centralized error-to-problem mapping
//!
//! The dispatcher owns the classification policy: one entry point per
//! handling path, plus [`ProblemDispatcher::dispatch`] which routes a
//! [`Fault`] to the matching path. Each entry point logs the original error
//! once and returns the transport status together with the body.

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, OnceLock};

use axum::response::{IntoResponse, Response};
use faultline_errors::{
    Problem, ProblemBuilder, ProblemMetadata, RandomTraceIds, Redactor, TraceIdGenerator,
    ValidationViolation, check_uri_reference, data_integrity_error, extract, generic_error,
    malformed_request_error, validation_error,
};
use http::StatusCode;

use crate::config::{ConfigError, ProblemConfig};
use crate::fault::Fault;

static GLOBAL: OnceLock<ProblemDispatcher> = OnceLock::new();

/// Install the process-wide dispatcher used by `Fault::into_response`.
///
/// Call once during startup, before serving requests.
///
/// # Errors
/// Returns the rejected dispatcher if one is already installed or the
/// default was already materialized by [`global`].
pub fn install(dispatcher: ProblemDispatcher) -> Result<(), ProblemDispatcher> {
    GLOBAL.set(dispatcher)
}

/// The installed dispatcher, or a default one if none was installed.
#[must_use]
pub fn global() -> &'static ProblemDispatcher {
    GLOBAL.get_or_init(ProblemDispatcher::default)
}

/// Stateless error classifier and problem renderer.
///
/// Holds only immutable data and is shared freely across requests.
#[derive(Clone)]
pub struct ProblemDispatcher {
    trace_ids: Arc<dyn TraceIdGenerator>,
    redactor: Redactor,
    default_type_url: Option<String>,
}

impl Default for ProblemDispatcher {
    fn default() -> Self {
        Self {
            trace_ids: Arc::new(RandomTraceIds),
            redactor: Redactor::default(),
            default_type_url: None,
        }
    }
}

impl fmt::Debug for ProblemDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemDispatcher")
            .field("redactor", &self.redactor)
            .field("default_type_url", &self.default_type_url)
            .finish_non_exhaustive()
    }
}

impl ProblemDispatcher {
    /// Build a dispatcher from configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a sensitive key is blank, the redaction
    /// pattern cannot be compiled, or `default_type_url` is not a URI reference.
    pub fn from_config(config: &ProblemConfig) -> Result<Self, ConfigError> {
        if let Some(index) = config
            .sensitive_keys
            .iter()
            .position(|k| k.trim().is_empty())
        {
            return Err(ConfigError::BlankSensitiveKey { index });
        }
        let redactor = Redactor::new(&config.sensitive_keys)?;

        let default_type_url = match config.default_type_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                check_uri_reference(raw).map_err(|source| ConfigError::DefaultTypeUrl {
                    url: raw.to_owned(),
                    source,
                })?;
                Some(raw.to_owned())
            }
        };

        Ok(Self {
            trace_ids: Arc::new(RandomTraceIds),
            redactor,
            default_type_url,
        })
    }

    /// Replace the trace id source, e.g. with a deterministic one in tests.
    #[must_use]
    pub fn with_trace_ids(mut self, trace_ids: impl TraceIdGenerator + 'static) -> Self {
        self.trace_ids = Arc::new(trace_ids);
        self
    }

    #[must_use]
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Route `fault` to its handling path.
    #[must_use]
    pub fn dispatch(&self, fault: &Fault) -> (StatusCode, Problem) {
        match fault {
            Fault::Domain(error) => self.handle_domain(&**error),
            Fault::Validation(violations) => self.handle_validation(violations),
            Fault::MalformedBody(error) => self.handle_malformed(&**error),
            Fault::DataConflict(error) => self.handle_conflict(&**error),
            Fault::Unclassified(error) => self.handle_generic(&**error),
        }
    }

    /// Dispatch and render as an HTTP response whose status equals the body's.
    #[must_use]
    pub fn respond(&self, fault: &Fault) -> Response {
        let (status, problem) = self.dispatch(fault);
        let mut response = problem.into_response();
        *response.status_mut() = status;
        response
    }

    /// Path 1: an application error. Uses its metadata when present and falls
    /// back to [`Self::handle_generic`] otherwise.
    #[must_use]
    pub fn handle_domain<E>(&self, error: &E) -> (StatusCode, Problem)
    where
        E: ProblemMetadata + StdError + ?Sized,
    {
        let Some(meta) = extract(error) else {
            return self.handle_generic(error);
        };

        let trace_id = self.trace_ids.generate();
        let raw = error.to_string();
        let detail = self.redactor.redact(&raw);
        // An undeclared title is the raw message, so it gets the same masking
        let title = self.redactor.redact(&meta.title);

        let built = ProblemBuilder::new(meta.status, title, meta.code)
            .detail(detail)
            .doc(meta.doc)
            .trace_id(trace_id.as_str())
            .build();

        match built {
            Ok(problem) => {
                tracing::warn!(
                    trace_id = %trace_id,
                    code = meta.code,
                    status = meta.status.as_u16(),
                    error = %raw,
                    "Domain error"
                );
                self.finish(problem)
            }
            Err(build_err) => {
                tracing::error!(
                    trace_id = %trace_id,
                    code = meta.code,
                    error = %raw,
                    build_error = %build_err,
                    "Domain error declares an invalid problem type; answering generically"
                );
                self.finish(generic_error(Some(trace_id)))
            }
        }
    }

    /// Path 2: per-field validation failures, reported in order.
    #[must_use]
    pub fn handle_validation(&self, violations: &[ValidationViolation]) -> (StatusCode, Problem) {
        let trace_id = self.trace_ids.generate();
        let detail = validation_detail(violations);

        tracing::warn!(
            trace_id = %trace_id,
            violations = violations.len(),
            detail = %detail,
            "Request validation failed"
        );
        self.finish(validation_error(detail, Some(trace_id)))
    }

    /// Path 3: unreadable request body. Parser output is logged, never returned.
    #[must_use]
    pub fn handle_malformed<E>(&self, error: &E) -> (StatusCode, Problem)
    where
        E: StdError + ?Sized,
    {
        let trace_id = self.trace_ids.generate();

        tracing::warn!(trace_id = %trace_id, error = %error, "Malformed request body");
        self.finish(malformed_request_error(Some(trace_id)))
    }

    /// Path 4: storage constraint violation. Constraint names stay server-side.
    #[must_use]
    pub fn handle_conflict<E>(&self, error: &E) -> (StatusCode, Problem)
    where
        E: StdError + ?Sized,
    {
        let trace_id = self.trace_ids.generate();

        tracing::error!(
            trace_id = %trace_id,
            error = %error,
            source_chain = %source_chain(error),
            details = ?error,
            "Data integrity violation"
        );
        self.finish(data_integrity_error(Some(trace_id)))
    }

    /// Path 5: catch-all. Nothing about the error reaches the client.
    #[must_use]
    pub fn handle_generic<E>(&self, error: &E) -> (StatusCode, Problem)
    where
        E: StdError + ?Sized,
    {
        let trace_id = self.trace_ids.generate();

        tracing::error!(
            trace_id = %trace_id,
            error = %error,
            source_chain = %source_chain(error),
            details = ?error,
            "Unhandled error"
        );
        self.finish(generic_error(Some(trace_id)))
    }

    fn finish(&self, problem: Problem) -> (StatusCode, Problem) {
        let problem = problem.or_type(self.default_type_url.as_deref());
        (problem.status, problem)
    }
}

/// `"Validation failed: <field>: <message>; <field>: <message>"`
#[must_use]
pub fn validation_detail(violations: &[ValidationViolation]) -> String {
    let joined = violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("Validation failed: {joined}")
}

fn source_chain<E>(error: &E) -> String
where
    E: StdError + ?Sized,
{
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(": ")
}
