// Proc-macro crate for faultline-errors metadata derives
//
//! # faultline-errors-macro
//!
//! ## `#[derive(ProblemMetadata)]`
//!
//! Implements `faultline_errors::ProblemMetadata` from `#[problem(...)]`
//! attributes, attaching an `ErrorMeta` to a struct or to individual enum
//! variants. Enum variants without the attribute carry no metadata and are
//! handled as unclassified errors.
//!
//! ### Example
//!
//! ```ignore
//! use faultline_errors::ProblemMetadata;
//!
//! #[derive(Debug, thiserror::Error, ProblemMetadata)]
//! pub enum LoanError {
//!     #[error("Loan {0} not found")]
//!     #[problem(
//!         code = "LOAN_NOT_FOUND",
//!         status = 404,
//!         doc = "https://errors.example.com/LOAN_NOT_FOUND",
//!         title = "Loan Not Found"
//!     )]
//!     NotFound(u64),
//!
//!     #[error("ledger unavailable")]
//!     LedgerUnavailable,
//! }
//! ```
//!
//! ### Keys
//!
//! - `code = "..."` (required, non-blank)
//! - `status = 404` (optional, 100..=599, defaults to 500)
//! - `doc = "..."` (optional, an absolute or relative URI reference)
//! - `title = "..."` (optional; a blank or missing title resolves to the error message)

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod problem_metadata;

/// Derive macro for implementing `ProblemMetadata`.
///
/// See the crate docs for the accepted `#[problem(...)]` keys.
#[proc_macro_derive(ProblemMetadata, attributes(problem))]
#[proc_macro_error]
pub fn derive_problem_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    problem_metadata::expand_derive_problem_metadata(&input).into()
}
