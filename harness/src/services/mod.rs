//! Service implementations
//!
//! Real implementations of the service traits; these perform the actual
//! process spawning, signalling and file I/O.

pub mod file_system;
pub mod notebook_executor;
pub mod process_launcher;

// Re-export all service implementations
pub use file_system::RealFileSystem;
pub use notebook_executor::RealNotebookExecutor;
pub use process_launcher::{RealProcessLauncher, RealTargetProcess};
