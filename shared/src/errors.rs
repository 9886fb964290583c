//! Shared error types for the notebook smoke-test harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Unknown marker policy: {input}")]
    UnknownMarkerPolicy { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
