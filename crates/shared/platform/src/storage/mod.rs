//! Object storage for uploaded binaries.
//!
//! Objects live in a single bucket and are addressed by slash-separated
//! relative paths.

mod local;
mod memory;

use async_trait::async_trait;
use serde::Serialize;

use common::{AppError, AppResult};

pub use local::LocalObjectStorage;
pub use memory::MemoryObjectStorage;

/// Metadata of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub path: String,
    /// Publicly reachable URL
    pub url: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Access to the object storage bucket.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object, replacing any existing one at the same path
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str)
        -> AppResult<StoredObject>;

    /// Remove an object, returning whether it existed
    async fn delete(&self, path: &str) -> AppResult<bool>;

    /// Bucket name
    fn bucket(&self) -> &str;
}

/// Reject paths that could escape the bucket.
pub(crate) fn validate_path(path: &str) -> AppResult<()> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(AppError::storage(format!("invalid object path '{}'", path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("references/u1/s1/abc.png").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("references/../../secret").is_err());
        assert!(validate_path("references//x.png").is_err());
        assert!(validate_path("a\\b").is_err());
    }
}
