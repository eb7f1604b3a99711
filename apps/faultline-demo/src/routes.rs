//! Loan endpoints. Each failure mode maps onto one handling path:
//!
//! | route                         | failure                      | path        |
//! |-------------------------------|------------------------------|-------------|
//! | `GET /loans/{id}`             | unknown id                   | domain      |
//! | `GET /loans/{id}`             | non-numeric id               | malformed   |
//! | `POST /loans`                 | invalid fields / bad JSON    | validation / malformed |
//! | `POST /loans`                 | duplicate applicant email    | conflict    |
//! | `POST /loans/{id}/approve`    | already approved, over limit | domain      |
//! | `GET /ledger/balance`         | ledger down (no metadata)    | generic     |
//! | `POST /ledger/sync`           | `anyhow` failure             | generic     |
//! | `GET /debug/panic`            | handler panic                | generic     |
//! | any unmatched route           | no such route                | domain      |

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use faultline::{
    Fault, ProblemPath, Validate, ValidatedJson, ValidationViolation, catch_panic_layer,
    route_not_found,
};
use faultline_errors::ProblemMetadata;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Largest principal approved without manual review.
pub const APPROVAL_LIMIT: u64 = 1_000_000;

#[derive(Debug, thiserror::Error, ProblemMetadata)]
pub enum LoanError {
    #[error("Loan {0} not found")]
    #[problem(
        code = "LOAN_NOT_FOUND",
        status = 404,
        doc = "https://docs.faultline.dev/errors/loan-not-found",
        title = "Loan Not Found"
    )]
    NotFound(u64),

    #[error("Loan {0} is already approved")]
    #[problem(code = "LOAN_ALREADY_APPROVED", status = 409, title = "Loan Already Approved")]
    AlreadyApproved(u64),

    #[error("Loan rejected: {reason}")]
    #[problem(code = "LOAN_REJECTED", status = 422)]
    Rejected { reason: String },

    #[error("ledger unavailable")]
    LedgerUnavailable,
}

impl From<LoanError> for Fault {
    fn from(err: LoanError) -> Self {
        Self::domain(err)
    }
}

/// Storage-level failure, reported the way a database driver would.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    UniqueViolation { constraint: &'static str },
}

impl From<StoreError> for Fault {
    fn from(err: StoreError) -> Self {
        Self::conflict(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: u64,
    pub applicant: String,
    pub email: String,
    pub amount: u64,
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewLoan {
    pub applicant: String,
    pub email: String,
    pub amount: u64,
}

impl Validate for NewLoan {
    fn validate(&self) -> Result<(), Vec<ValidationViolation>> {
        let mut violations = Vec::new();
        if self.applicant.trim().is_empty() {
            violations.push(ValidationViolation::new("applicant", "Applicant is required"));
        }
        if !self.email.contains('@') {
            violations.push(ValidationViolation::new("email", "Email is invalid"));
        }
        if self.amount == 0 {
            violations.push(ValidationViolation::new("amount", "Amount must be positive"));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// In-memory loan table with a unique index on `email`.
#[derive(Debug, Default)]
pub struct LoanStore {
    loans: RwLock<HashMap<u64, Loan>>,
    next_id: AtomicU64,
}

impl LoanStore {
    async fn insert(&self, new: NewLoan) -> Result<Loan, StoreError> {
        let mut loans = self.loans.write().await;
        if loans.values().any(|l| l.email.eq_ignore_ascii_case(&new.email)) {
            return Err(StoreError::UniqueViolation {
                constraint: "loans_email_key",
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let loan = Loan {
            id,
            applicant: new.applicant,
            email: new.email,
            amount: new.amount,
            approved: false,
        };
        loans.insert(id, loan.clone());
        Ok(loan)
    }

    async fn get(&self, id: u64) -> Option<Loan> {
        self.loans.read().await.get(&id).cloned()
    }

    async fn approve(&self, id: u64) -> Result<Loan, LoanError> {
        let mut loans = self.loans.write().await;
        let loan = loans.get_mut(&id).ok_or(LoanError::NotFound(id))?;
        if loan.approved {
            return Err(LoanError::AlreadyApproved(id));
        }
        if loan.amount > APPROVAL_LIMIT {
            return Err(LoanError::Rejected {
                reason: format!("amount {} exceeds limit {APPROVAL_LIMIT}", loan.amount),
            });
        }
        loan.approved = true;
        Ok(loan.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub store: Arc<LoanStore>,
}

/// Routes, the problem fallback, and the panic and request-tracing layers.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/loans", post(create_loan))
        .route("/loans/{id}", get(get_loan))
        .route("/loans/{id}/approve", post(approve_loan))
        .route("/ledger/balance", get(ledger_balance))
        .route("/ledger/sync", post(sync_ledger))
        .route("/debug/panic", get(debug_panic))
        .fallback(route_not_found)
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
}

async fn create_loan(
    State(state): State<AppState>,
    ValidatedJson(new): ValidatedJson<NewLoan>,
) -> Result<(StatusCode, Json<Loan>), Fault> {
    let loan = state.store.insert(new).await?;
    tracing::info!(loan_id = loan.id, "loan created");
    Ok((StatusCode::CREATED, Json(loan)))
}

async fn get_loan(
    State(state): State<AppState>,
    ProblemPath(id): ProblemPath<u64>,
) -> Result<Json<Loan>, Fault> {
    let loan = state.store.get(id).await.ok_or(LoanError::NotFound(id))?;
    Ok(Json(loan))
}

async fn approve_loan(
    State(state): State<AppState>,
    ProblemPath(id): ProblemPath<u64>,
) -> Result<Json<Loan>, Fault> {
    let loan = state.store.approve(id).await?;
    tracing::info!(loan_id = id, "loan approved");
    Ok(Json(loan))
}

#[allow(clippy::unused_async)]
async fn ledger_balance() -> Result<Json<u64>, Fault> {
    Err(LoanError::LedgerUnavailable.into())
}

async fn sync_ledger() -> Result<StatusCode, Fault> {
    push_to_ledger().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[allow(clippy::unused_async)]
async fn push_to_ledger() -> anyhow::Result<()> {
    anyhow::bail!("ledger host 10.20.0.7:5432 refused connection")
}

#[allow(clippy::unused_async)]
async fn debug_panic() -> &'static str {
    panic!("debug endpoint panicked on purpose")
}
