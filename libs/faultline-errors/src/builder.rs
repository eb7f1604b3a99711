//! Problem builder and the fixed convenience constructors.

use chrono::{DateTime, SecondsFormat, Utc};
use http::StatusCode;

use crate::problem::Problem;
use crate::trace::new_trace_id;
use crate::uri::{UriReferenceError, check_uri_reference};

pub const INTERNAL_SERVER_ERROR_CODE: &str = "INTERNAL_SERVER_ERROR";
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";
pub const MALFORMED_REQUEST_CODE: &str = "MALFORMED_REQUEST";
pub const DATA_INTEGRITY_VIOLATION_CODE: &str = "DATA_INTEGRITY_VIOLATION";

pub const GENERIC_ERROR_DETAIL: &str =
    "An unexpected error occurred. Please contact support if the problem persists.";
pub const MALFORMED_REQUEST_DETAIL: &str =
    "The request body is malformed or contains invalid JSON.";
pub const DATA_INTEGRITY_DETAIL: &str = "The operation conflicts with existing data constraints.";

/// Errors raised while assembling a [`Problem`].
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("invalid problem type URI '{uri}': {source}")]
    InvalidTypeUri {
        uri: String,
        #[source]
        source: UriReferenceError,
    },
}

/// Assembles a [`Problem`], filling in the trace id and timestamp when the
/// caller leaves them out.
#[derive(Debug, Clone)]
#[must_use]
pub struct ProblemBuilder {
    status: StatusCode,
    title: String,
    code: String,
    detail: Option<String>,
    doc: Option<String>,
    trace_id: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl ProblemBuilder {
    pub fn new(status: StatusCode, title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            code: code.into(),
            detail: None,
            doc: None,
            trace_id: None,
            timestamp: None,
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Documentation URI emitted as `type`. Blank values count as absent.
    pub fn doc(mut self, doc: Option<impl Into<String>>) -> Self {
        self.doc = doc.map(Into::into).filter(|d| !d.trim().is_empty());
        self
    }

    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Validate the documentation URI and produce the problem.
    ///
    /// # Errors
    /// Returns [`BuildError::InvalidTypeUri`] if `doc` is not a URI reference.
    pub fn build(self) -> Result<Problem, BuildError> {
        if let Some(doc) = self.doc.as_deref()
            && let Err(source) = check_uri_reference(doc)
        {
            return Err(BuildError::InvalidTypeUri {
                uri: doc.to_owned(),
                source,
            });
        }
        Ok(self.finish())
    }

    fn finish(self) -> Problem {
        let at = self.timestamp.unwrap_or_else(Utc::now);
        Problem {
            type_url: self.doc,
            title: self.title,
            status: self.status,
            detail: self.detail,
            code: self.code,
            trace_id: self.trace_id.unwrap_or_else(new_trace_id),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn fixed(
    status: StatusCode,
    title: &str,
    code: &str,
    detail: impl Into<String>,
    trace_id: Option<String>,
) -> Problem {
    let mut builder = ProblemBuilder::new(status, title, code).detail(detail);
    if let Some(id) = trace_id {
        builder = builder.trace_id(id);
    }
    // No doc is set, so there is nothing to validate.
    builder.finish()
}

/// 500 with the fixed generic detail; never reveals the original error.
pub fn generic_error(trace_id: Option<String>) -> Problem {
    fixed(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        INTERNAL_SERVER_ERROR_CODE,
        GENERIC_ERROR_DETAIL,
        trace_id,
    )
}

/// 400 carrying a caller-supplied validation summary.
pub fn validation_error(detail: impl Into<String>, trace_id: Option<String>) -> Problem {
    fixed(
        StatusCode::BAD_REQUEST,
        "Validation Error",
        VALIDATION_ERROR_CODE,
        detail,
        trace_id,
    )
}

/// 400 for request bodies that could not be read or parsed.
pub fn malformed_request_error(trace_id: Option<String>) -> Problem {
    fixed(
        StatusCode::BAD_REQUEST,
        "Malformed Request",
        MALFORMED_REQUEST_CODE,
        MALFORMED_REQUEST_DETAIL,
        trace_id,
    )
}

/// 409 for storage constraint violations.
pub fn data_integrity_error(trace_id: Option<String>) -> Problem {
    fixed(
        StatusCode::CONFLICT,
        "Data Conflict",
        DATA_INTEGRITY_VIOLATION_CODE,
        DATA_INTEGRITY_DETAIL,
        trace_id,
    )
}
