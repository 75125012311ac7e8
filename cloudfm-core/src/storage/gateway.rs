//! ``src/storage/gateway.rs``
//! ============================================================================
//! # `StorageGateway`: Object-Storage Capability
//!
//! The file manager never talks to a storage service directly. It consumes
//! the four operations below and treats the backend as opaque: enumerate the
//! objects under a prefix, read one object's metadata, issue a time-limited
//! download URL, and accept an uploaded blob.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Failures reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Handle to one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Full storage key, e.g. `files/report.pdf`.
    pub key: CompactString,

    /// Last path segment of the key.
    pub name: CompactString,
}

impl ObjectRef {
    /// Build a reference from a full key; the name is the last `/` segment.
    #[must_use]
    pub fn new(key: impl Into<CompactString>) -> Self {
        let key: CompactString = key.into();
        let name = CompactString::new(key.rsplit('/').next().unwrap_or(key.as_str()));

        Self { key, name }
    }
}

/// Metadata as declared by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Declared MIME type; empty when the backend has none.
    pub content_type: String,
    pub size: u64,
    pub updated: DateTime<Utc>,
}

/// A download URL that stops working at `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUrl {
    pub url: Url,
    pub expires_at: DateTime<Utc>,
}

/// Bytes handed to the backend for one upload.
#[derive(Debug, Clone)]
pub struct UploadBlob {
    pub name: CompactString,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// The object-storage capability the listing pipeline and uploader call.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Non-recursive listing of the objects directly under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectRef>, GatewayError>;

    /// Content type, byte size and last-modified time of one object.
    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMetadata, GatewayError>;

    /// A time-limited public URL for one object.
    async fn download_url(&self, object: &ObjectRef) -> Result<DownloadUrl, GatewayError>;

    /// Store `blob` under `prefix`, returning the new object's reference.
    async fn upload(&self, prefix: &str, blob: &UploadBlob) -> Result<ObjectRef, GatewayError>;
}

/// Join a listing prefix and an object name into a storage key.
#[must_use]
pub fn object_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}
