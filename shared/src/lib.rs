//! Shared types and models for the restaurant POS
//!
//! This crate contains the domain rules shared between the backend, the
//! browser pages (via WASM) and the test suites: status machines, bill
//! totals, kitchen urgency, stock levels and input validation.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
