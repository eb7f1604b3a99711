//! Body and path extractors whose rejections are classified faults.
//!
//! `axum::Json` and `axum::extract::Path` reject with plain-text bodies. These
//! wrappers reject with a [`Fault`] instead, so a bad request is answered as
//! `application/problem+json` like every other error:
//!
//! ```ignore
//! async fn create(ValidatedJson(req): ValidatedJson<NewLoan>) -> Result<Json<Loan>, Fault> {
//!     // `req` parsed and passed `NewLoan::validate`
//! }
//! ```

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use faultline_errors::ValidationViolation;
use serde::de::DeserializeOwned;

use crate::fault::Fault;

/// Field-level checks run by [`ValidatedJson`] after deserialization.
pub trait Validate {
    /// Check the value, collecting every violation in field order.
    ///
    /// # Errors
    /// Returns the violations when at least one check fails.
    fn validate(&self) -> Result<(), Vec<ValidationViolation>>;
}

/// `Json<T>` that rejects unreadable bodies as [`Fault::MalformedBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemJson<T>(pub T);

impl<T, S> FromRequest<S> for ProblemJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Fault;

    #[allow(clippy::manual_async_fn)]
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

/// [`ProblemJson`] followed by [`Validate::validate`]; violations reject as
/// [`Fault::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Fault;

    #[allow(clippy::manual_async_fn)]
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let ProblemJson(value) = ProblemJson::<T>::from_request(req, state).await?;
            value.validate().map_err(Fault::Validation)?;
            Ok(Self(value))
        }
    }
}

/// `Path<T>` that rejects unparsable segments as [`Fault::MalformedBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ProblemPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Fault;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
            Ok(Self(value))
        }
    }
}
