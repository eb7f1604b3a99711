//! Router fallback answering unmatched routes as problems.

use axum::http::{Method, Uri};
use faultline_errors::ProblemMetadata;

use crate::fault::Fault;

/// No route matched the request.
#[derive(Debug, thiserror::Error, ProblemMetadata)]
#[error("No route for {method} {path}")]
#[problem(code = "ROUTE_NOT_FOUND", status = 404, title = "Not Found")]
pub struct RouteNotFound {
    pub method: Method,
    pub path: String,
}

/// Handler for `Router::fallback`. Only the path is echoed, never the query.
#[allow(clippy::unused_async, clippy::needless_pass_by_value)]
pub async fn route_not_found(method: Method, uri: Uri) -> Fault {
    Fault::domain(RouteNotFound {
        method,
        path: uri.path().to_owned(),
    })
}
