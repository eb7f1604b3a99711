//! Panics inside handlers answered as generic problems.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::dispatcher;

/// A handler panic, surfaced to the dispatcher as an unclassified error.
#[derive(thiserror::Error, Debug)]
#[error("handler panicked: {message}")]
pub struct PanicError {
    pub message: String,
}

impl PanicError {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self { message }
    }
}

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer turning handler panics into `500 INTERNAL_SERVER_ERROR` problems.
///
/// The panic message is logged with the trace id and never sent to the client.
#[must_use]
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

#[allow(clippy::needless_pass_by_value)]
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let error = PanicError::from_payload(&*payload);
    let (status, problem) = dispatcher::global().handle_generic(&error);
    let mut response = problem.into_response();
    *response.status_mut() = status;
    response
}
