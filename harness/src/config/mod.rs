//! Configuration Management
//!
//! This module provides the harness configuration and its builder.

pub mod builder;
pub mod harness;

// Re-export main types
pub use builder::HarnessConfigBuilder;
pub use harness::{HarnessConfig, TargetConfig, DEFAULT_BATTERY, DIAGNOSTIC_NOTEBOOK, SHUTDOWN_NOTEBOOK};
