//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Bucket File Manager
//!
//! Every fallible operation in the crate returns `Result<T, AppError>`. The
//! variants mirror the failure classes a session can hit: listing the bucket,
//! resolving per-object metadata or download URLs, uploading a staged batch,
//! and missing authentication. None of them is fatal; the controller turns
//! them into notifications at the page boundary.

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::storage::gateway::GatewayError;

/// Unified error type for all file manager operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Enumerating objects under a prefix failed.
    #[error("Listing failed under '{prefix}': {reason}")]
    Listing { prefix: String, reason: String },

    /// Metadata lookup for a single object failed during a refresh.
    #[error("Metadata fetch failed for '{key}': {reason}")]
    ObjectMetadata { key: String, reason: String },

    /// Download URL resolution for a single object failed during a refresh.
    #[error("Download URL fetch failed for '{key}': {reason}")]
    DownloadUrl { key: String, reason: String },

    /// One or more blobs of a staged batch were rejected.
    #[error("Upload failed ({uploaded} uploaded, {failed} failed): {reason}")]
    Upload {
        uploaded: usize,
        failed: usize,
        reason: String,
    },

    /// No user is signed in.
    #[error("Sign-in required")]
    AuthRequired,

    /// Operation superseded by a newer one.
    #[error("Operation was cancelled")]
    Cancelled,

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config could not be rendered back to TOML.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Input validation errors
    #[error("Invalid input: {field} - {message}")]
    InvalidInput {
        field: String, // "upload_path", "index", etc.
        message: String,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create a listing failure error
    pub fn listing<P: Into<String>>(prefix: P, err: &GatewayError) -> Self {
        Self::Listing {
            prefix: prefix.into(),
            reason: err.to_string(),
        }
    }

    /// Create a per-object metadata failure error
    pub fn object_metadata<K: Into<String>>(key: K, err: &GatewayError) -> Self {
        Self::ObjectMetadata {
            key: key.into(),
            reason: err.to_string(),
        }
    }

    /// Create a per-object download URL failure error
    pub fn download_url<K: Into<String>>(key: K, err: &GatewayError) -> Self {
        Self::DownloadUrl {
            key: key.into(),
            reason: err.to_string(),
        }
    }

    /// Create an upload failure error
    pub fn upload<S: Into<String>>(uploaded: usize, failed: usize, reason: S) -> Self {
        Self::Upload {
            uploaded,
            failed,
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for every failure that aborts a listing refresh.
    #[must_use]
    pub const fn is_listing_error(&self) -> bool {
        matches!(
            self,
            Self::Listing { .. } | Self::ObjectMetadata { .. } | Self::DownloadUrl { .. }
        )
    }
}

// Manual Clone implementation to handle non-Clone fields
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), e.to_string())),
            Self::Listing { prefix, reason } => Self::Listing {
                prefix: prefix.clone(),
                reason: reason.clone(),
            },
            Self::ObjectMetadata { key, reason } => Self::ObjectMetadata {
                key: key.clone(),
                reason: reason.clone(),
            },
            Self::DownloadUrl { key, reason } => Self::DownloadUrl {
                key: key.clone(),
                reason: reason.clone(),
            },
            Self::Upload {
                uploaded,
                failed,
                reason,
            } => Self::Upload {
                uploaded: *uploaded,
                failed: *failed,
                reason: reason.clone(),
            },
            Self::AuthRequired => Self::AuthRequired,
            Self::Cancelled => Self::Cancelled,
            Self::Config(e) => Self::Other(format!("Config error: {e}")),
            Self::ConfigIo { path, source } => Self::ConfigIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::ConfigSerialize(e) => Self::Other(format!("Config serialize error: {e}")),
            Self::InvalidInput { field, message } => Self::InvalidInput {
                field: field.clone(),
                message: message.clone(),
            },
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Compared by rendered message, which covers every field.
impl PartialEq for AppError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_failures_count_as_listing_errors() {
        let err = GatewayError::NotFound("files/a.txt".into());

        assert!(AppError::listing("files/", &err).is_listing_error());
        assert!(AppError::object_metadata("files/a.txt", &err).is_listing_error());
        assert!(AppError::download_url("files/a.txt", &err).is_listing_error());
        assert!(!AppError::upload(1, 1, "rejected").is_listing_error());
        assert!(!AppError::AuthRequired.is_listing_error());
    }

    #[test]
    fn clone_preserves_io_kind() {
        let err = AppError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));

        match err.clone() {
            AppError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected clone: {other:?}"),
        }
    }

    #[test]
    fn upload_error_reports_counts() {
        let err = AppError::upload(2, 1, "quota exceeded");

        assert_eq!(
            err.to_string(),
            "Upload failed (2 uploaded, 1 failed): quota exceeded"
        );
    }
}
