//! Shared types for the notebook smoke-test harness
//!
//! Contains the vocabulary every harness component agrees on: run stages,
//! marker policies, configuration errors and the tracing setup.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
