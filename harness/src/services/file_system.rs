//! Real file system service implementation
//!
//! Access to rendered reports and the application's log files.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::error::{HarnessError, HarnessResult};
use crate::traits::FileSystem;

#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read_optional(&self, path: &Path) -> HarnessResult<Option<String>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(HarnessError::FileSystemError {
                operation: "read".to_string(),
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn remove_if_exists(&self, path: &Path) -> HarnessResult<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(HarnessError::FileSystemError {
                operation: "remove".to_string(),
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
