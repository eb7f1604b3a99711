//! Classified errors returned by request handlers.

use std::error::Error as StdError;
use std::fmt;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::response::{IntoResponse, Response};
use faultline_errors::{ProblemMetadata, ValidationViolation};

use crate::dispatcher;

/// Type-erased error carried by the framework-level fault kinds.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An application error that may declare problem metadata.
///
/// Blanket-implemented for every error type implementing [`ProblemMetadata`].
pub trait DomainError: ProblemMetadata + StdError + Send + Sync + 'static {}

impl<T> DomainError for T where T: ProblemMetadata + StdError + Send + Sync + 'static {}

/// An error raised while handling a request, tagged with its handling path.
///
/// The variant is chosen where the error is raised, so classification is an
/// exhaustive match rather than a runtime type probe. A domain error always
/// enters through [`Fault::Domain`]; its metadata takes precedence over the
/// framework kinds because it can never be routed to them.
#[derive(Debug)]
pub enum Fault {
    /// Application error; answered with its metadata when present,
    /// generically otherwise.
    Domain(Box<dyn DomainError>),
    /// Ordered per-field validation failures.
    Validation(Vec<ValidationViolation>),
    /// The request body or a path segment could not be read or parsed.
    MalformedBody(BoxError),
    /// A storage constraint rejected the operation.
    DataConflict(BoxError),
    /// Anything else.
    Unclassified(BoxError),
}

impl Fault {
    pub fn domain<E: DomainError>(error: E) -> Self {
        Self::Domain(Box::new(error))
    }

    pub fn validation<I>(violations: I) -> Self
    where
        I: IntoIterator<Item = ValidationViolation>,
    {
        Self::Validation(violations.into_iter().collect())
    }

    pub fn malformed(error: impl Into<BoxError>) -> Self {
        Self::MalformedBody(error.into())
    }

    pub fn conflict(error: impl Into<BoxError>) -> Self {
        Self::DataConflict(error.into())
    }

    pub fn unclassified(error: impl Into<BoxError>) -> Self {
        Self::Unclassified(error.into())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => fmt::Display::fmt(e, f),
            Self::Validation(v) => f.write_str(&dispatcher::validation_detail(v)),
            Self::MalformedBody(e) => write!(f, "malformed request body: {e}"),
            Self::DataConflict(e) => write!(f, "data integrity violation: {e}"),
            Self::Unclassified(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Domain(e) => e.source(),
            Self::Validation(_) => None,
            Self::MalformedBody(e) | Self::DataConflict(e) | Self::Unclassified(e) => Some(&**e),
        }
    }
}

impl From<JsonRejection> for Fault {
    fn from(rejection: JsonRejection) -> Self {
        Self::malformed(rejection)
    }
}

impl From<PathRejection> for Fault {
    fn from(rejection: PathRejection) -> Self {
        Self::malformed(rejection)
    }
}

impl From<anyhow::Error> for Fault {
    fn from(error: anyhow::Error) -> Self {
        Self::Unclassified(error.into())
    }
}

/// Renders through the process-wide dispatcher, see [`dispatcher::install`].
impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        dispatcher::global().respond(&self)
    }
}
