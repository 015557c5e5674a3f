use std::fmt;

use thiserror::Error;

/// Which store call failed, carried for operator logs and user wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Read,
    List,
    Create,
    Write,
    Delete,
    Claim,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::Read => "read",
            StoreOperation::List => "list",
            StoreOperation::Create => "create",
            StoreOperation::Write => "write",
            StoreOperation::Delete => "delete",
            StoreOperation::Claim => "claim",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GalleryError {
    #[error("gallery '{name}' not found")]
    NotFound { name: String },

    #[error("gallery '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("image #{seq} is no longer in gallery '{name}'")]
    ImageNotFound { name: String, seq: u64 },

    #[error("image index {index} out of range for gallery of {len} images")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("gallery '{name}' kept changing underneath {attempts} write attempts")]
    Contended { name: String, attempts: u32 },

    #[error("document store {operation} failed: {message}")]
    StoreUnavailable {
        operation: StoreOperation,
        message: String,
    },
}

impl GalleryError {
    pub fn not_found(name: &str) -> Self {
        GalleryError::NotFound {
            name: name.to_string(),
        }
    }

    pub fn unavailable(operation: StoreOperation, err: impl fmt::Display) -> Self {
        GalleryError::StoreUnavailable {
            operation,
            message: err.to_string(),
        }
    }
}
