#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end behavior of `Fault` responses through an axum router.

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::{get, post},
};
use faultline::{
    APPLICATION_PROBLEM_JSON, Fault, ProblemJson, ProblemMetadata, ProblemPath, Validate,
    ValidatedJson, ValidationViolation, catch_panic_layer, route_not_found,
};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Debug, thiserror::Error, ProblemMetadata)]
enum LoanError {
    #[error("Loan {0} not found")]
    #[problem(
        code = "LOAN_NOT_FOUND",
        status = 404,
        doc = "https://x/y",
        title = "Loan Not Found"
    )]
    NotFound(u64),

    #[error("Transfer rejected: password=hunter2")]
    #[problem(code = "TRANSFER_REJECTED", status = 422)]
    Rejected,

    #[error("ledger connection reset by peer 10.0.0.7")]
    LedgerUnavailable,
}

impl From<LoanError> for Fault {
    fn from(err: LoanError) -> Self {
        Self::domain(err)
    }
}

#[derive(Debug, Deserialize)]
struct NewLoan {
    name: String,
    email: String,
}

impl Validate for NewLoan {
    fn validate(&self) -> Result<(), Vec<ValidationViolation>> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(ValidationViolation::new("name", "Name is required"));
        }
        if !self.email.contains('@') {
            violations.push(ValidationViolation::new("email", "Email is invalid"));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

async fn get_loan(ProblemPath(id): ProblemPath<u64>) -> Result<Json<Value>, Fault> {
    Err(LoanError::NotFound(id).into())
}

async fn reject() -> Result<(), Fault> {
    Err(LoanError::Rejected.into())
}

async fn ledger() -> Result<(), Fault> {
    Err(LoanError::LedgerUnavailable.into())
}

async fn create(ValidatedJson(loan): ValidatedJson<NewLoan>) -> Json<Value> {
    Json(json!({ "name": loan.name }))
}

async fn echo(ProblemJson(body): ProblemJson<Value>) -> Json<Value> {
    Json(body)
}

async fn duplicate() -> Result<(), Fault> {
    Err(Fault::conflict(
        "duplicate key value violates unique constraint \"loans_pkey\"",
    ))
}

async fn unexpected() -> Result<(), Fault> {
    Err(anyhow::anyhow!("Something went wrong").into())
}

#[allow(clippy::unused_async)]
async fn explode() -> &'static str {
    panic!("invariant broken: balance below zero")
}

fn app() -> Router {
    Router::new()
        .route("/loans/{id}", get(get_loan))
        .route("/loans", post(create))
        .route("/echo", post(echo))
        .route("/transfer", post(reject))
        .route("/ledger", get(ledger))
        .route("/duplicate", post(duplicate))
        .route("/unexpected", get(unexpected))
        .route("/explode", get(explode))
        .fallback(route_not_found)
        .layer(catch_panic_layer())
}

async fn call(req: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app().oneshot(req).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_owned());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, body)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_req(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn assert_problem(status: StatusCode, content_type: Option<&str>, body: &Value) {
    assert_eq!(content_type, Some(APPLICATION_PROBLEM_JSON));
    assert_eq!(body["status"], status.as_u16());
    assert!(uuid::Uuid::parse_str(body["traceId"].as_str().unwrap()).is_ok());
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn annotated_domain_error() {
    let (status, ct, body) = call(get_req("/loans/123")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["type"], "https://x/y");
    assert_eq!(body["title"], "Loan Not Found");
    assert_eq!(body["detail"], "Loan 123 not found");
    assert_eq!(body["code"], "LOAN_NOT_FOUND");
}

#[tokio::test]
async fn domain_detail_is_redacted() {
    let (status, ct, body) = call(json_req("/transfer", "{}")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["detail"], "Transfer rejected: password=[REDACTED]");
    assert_eq!(body["title"], "Transfer rejected: password=[REDACTED]");
    assert!(!body.to_string().contains("hunter2"));
    assert!(body.get("type").is_none());
}

#[tokio::test]
async fn unannotated_domain_error_is_generic() {
    let (status, ct, body) = call(get_req("/ledger")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert!(!body.to_string().contains("10.0.0.7"));
}

#[tokio::test]
async fn validation_failures_in_field_order() {
    let (status, ct, body) = call(json_req("/loans", r#"{"name":"","email":"nope"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["title"], "Validation Error");
    assert_eq!(
        body["detail"],
        "Validation failed: name: Name is required; email: Email is invalid"
    );
}

#[tokio::test]
async fn valid_body_reaches_handler() {
    let (status, _, body) = call(json_req("/loans", r#"{"name":"Ada","email":"a@b.c"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Ada" }));
}

#[tokio::test]
async fn malformed_body_hides_parser_output() {
    for raw in [r#"{"name":"#, "not json", r#"{"name":1,"email":2}"#] {
        let (status, ct, body) = call(json_req("/loans", raw)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {raw}");
        assert_problem(status, ct.as_deref(), &body);
        assert_eq!(body["code"], "MALFORMED_REQUEST");
        assert!(!body["detail"].as_str().unwrap().contains("line"));
    }
}

#[tokio::test]
async fn missing_content_type_is_malformed() {
    let req = Request::post("/echo").body(Body::from("{}")).unwrap();
    let (status, ct, body) = call(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "MALFORMED_REQUEST");
}

#[tokio::test]
async fn unparsable_path_segment_is_malformed() {
    let (status, ct, body) = call(get_req("/loans/twelve")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "MALFORMED_REQUEST");
    assert!(!body.to_string().contains("twelve"));
}

#[tokio::test]
async fn unmatched_route_is_not_found() {
    let (status, ct, body) = call(json_req("/nowhere?token=abc", "{}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    assert_eq!(body["detail"], "No route for POST /nowhere");
    assert!(!body.to_string().contains("abc"));
}

#[tokio::test]
async fn data_conflict_hides_constraint() {
    let (status, ct, body) = call(json_req("/duplicate", "{}")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "DATA_INTEGRITY_VIOLATION");
    assert!(!body.to_string().contains("loans_pkey"));
}

#[tokio::test]
async fn unexpected_error_is_generic() {
    let (status, ct, body) = call(get_req("/unexpected")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["title"], "Internal Server Error");
    assert!(!body.to_string().contains("Something went wrong"));
}

#[tokio::test]
async fn handler_panic_is_generic() {
    let (status, ct, body) = call(get_req("/explode")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_problem(status, ct.as_deref(), &body);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert!(!body.to_string().contains("balance"));
}

#[tokio::test]
async fn every_request_gets_its_own_trace_id() {
    let (_, _, a) = call(get_req("/unexpected")).await;
    let (_, _, b) = call(get_req("/unexpected")).await;

    assert_ne!(a["traceId"], b["traceId"]);
}
