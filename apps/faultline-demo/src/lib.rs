//! Loan service wired with faultline error handling.
//!
//! Split from the binary so the router and configuration can be exercised
//! from integration tests.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod logging;
pub mod routes;

pub use config::AppConfig;
pub use routes::{AppState, router};
