//! Error types for the oa-fileserver crate.

use std::path::PathBuf;

use crate::protocol::ErrorCode;

/// File server error types.
#[derive(Debug, thiserror::Error)]
pub enum FileServerError {
    /// The requested path resolves outside the sandbox root.
    #[error("access denied: {path} is outside the allowed directory")]
    AccessDenied { path: String },

    /// File or directory not found at the specified path.
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// Resource URI does not use the `file://` scheme.
    #[error("invalid URI scheme, expected file://: {uri}")]
    InvalidUri { uri: String },

    /// Malformed glob pattern.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileServerError {
    /// Wrap an I/O error, promoting `NotFound` to [`FileServerError::NotFound`].
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// JSON-RPC error code this error surfaces as on the protocol channel.
    ///
    /// Caller mistakes (denied paths, missing files, bad URIs or patterns)
    /// are `InvalidParams`; everything else is `InternalError`.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::AccessDenied { .. }
            | Self::NotFound { .. }
            | Self::InvalidUri { .. }
            | Self::InvalidPattern { .. } => ErrorCode::InvalidParams,
            Self::Json(_) | Self::Io { .. } => ErrorCode::InternalError,
        }
    }
}

/// Convenience result type for oa-fileserver operations.
pub type FileServerResult<T> = Result<T, FileServerError>;
