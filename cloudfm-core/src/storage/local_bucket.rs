//! ``src/storage/local_bucket.rs``
//! ============================================================================
//! # `LocalBucket`: Directory-Backed Object Storage
//!
//! Serves a directory tree as a bucket: object keys are paths relative to the
//! bucket root, a prefix is a sub-directory, and download URLs are `file://`
//! URLs stamped with an expiry.

use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs as TokioFs;
use tracing::{debug, instrument};
use url::Url;

use crate::storage::gateway::{
    DownloadUrl, GatewayError, ObjectMetadata, ObjectRef, StorageGateway, UploadBlob, object_key,
};

#[derive(Debug, Clone)]
pub struct LocalBucket {
    root: PathBuf,
    url_ttl: Duration,
}

impl LocalBucket {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, url_ttl: Duration) -> Self {
        Self {
            root: root.into(),
            url_ttl,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key or prefix onto the bucket root, refusing anything that
    /// would escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, GatewayError> {
        let relative = Path::new(key);

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(GatewayError::Rejected(format!("invalid key: {key}")));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageGateway for LocalBucket {
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectRef>, GatewayError> {
        let dir = self.resolve(prefix.trim_end_matches('/'))?;

        let mut read_dir = match TokioFs::read_dir(&dir).await {
            Ok(rd) => rd,
            // An absent prefix is an empty folder, as in hosted buckets.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects: Vec<ObjectRef> = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!("Skipping non UTF-8 object name {:?}", file_name);
                continue;
            };

            objects.push(ObjectRef::new(object_key(prefix, name)));
        }

        // Hosted listings come back in lexicographic key order.
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(objects)
    }

    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMetadata, GatewayError> {
        let path = self.resolve(&object.key)?;

        let meta = match TokioFs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(GatewayError::NotFound(object.key.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GatewayError::NotFound(object.key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        let updated: DateTime<Utc> = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH).into();

        Ok(ObjectMetadata {
            content_type,
            size: meta.len(),
            updated,
        })
    }

    async fn download_url(&self, object: &ObjectRef) -> Result<DownloadUrl, GatewayError> {
        let path = self.resolve(&object.key)?;

        let absolute = TokioFs::canonicalize(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GatewayError::NotFound(object.key.to_string())
            } else {
                GatewayError::from(e)
            }
        })?;

        let mut url = Url::from_file_path(&absolute)
            .map_err(|()| GatewayError::Rejected(format!("not a file URL: {}", absolute.display())))?;

        let ttl = chrono::Duration::from_std(self.url_ttl)
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;
        let expires_at = Utc::now() + ttl;

        url.query_pairs_mut()
            .append_pair("expires", &expires_at.timestamp().to_string());

        Ok(DownloadUrl { url, expires_at })
    }

    #[instrument(level = "debug", skip(self, blob), fields(name = %blob.name, bytes = blob.data.len()))]
    async fn upload(&self, prefix: &str, blob: &UploadBlob) -> Result<ObjectRef, GatewayError> {
        let name = Path::new(blob.name.as_str())
            .file_name()
            .and_then(OsStr::to_str)
            .filter(|n| *n == blob.name.as_str())
            .ok_or_else(|| GatewayError::Rejected(format!("invalid object name: {}", blob.name)))?;

        let key = object_key(prefix, name);
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        TokioFs::write(&path, &blob.data).await?;
        debug!("Stored {} at {}", key, path.display());

        Ok(ObjectRef::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use compact_str::CompactString;
    use tempfile::TempDir;

    async fn bucket_with_files() -> (TempDir, LocalBucket) {
        let dir = TempDir::new().unwrap();
        let files = dir.path().join("files");
        TokioFs::create_dir_all(files.join("nested")).await.unwrap();
        TokioFs::write(files.join("b.png"), b"png").await.unwrap();
        TokioFs::write(files.join("a.pdf"), b"%PDF-1.7").await.unwrap();

        let bucket = LocalBucket::new(dir.path(), Duration::from_secs(60));
        (dir, bucket)
    }

    #[tokio::test]
    async fn list_is_flat_and_sorted() {
        let (_dir, bucket) = bucket_with_files().await;

        let objects = bucket.list("files/").await.unwrap();
        let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();

        assert_eq!(keys, ["files/a.pdf", "files/b.png"]);
    }

    #[tokio::test]
    async fn missing_prefix_lists_empty() {
        let (_dir, bucket) = bucket_with_files().await;
        assert!(bucket.list("nothing/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_guesses_content_type() {
        let (_dir, bucket) = bucket_with_files().await;

        let meta = bucket.metadata(&ObjectRef::new("files/a.pdf")).await.unwrap();
        assert_eq!(meta.content_type, "application/pdf");
        assert_eq!(meta.size, 8);

        let missing = bucket.metadata(&ObjectRef::new("files/zzz.txt")).await;
        assert!(matches!(missing, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn download_url_carries_expiry() {
        let (_dir, bucket) = bucket_with_files().await;

        let url = bucket
            .download_url(&ObjectRef::new("files/b.png"))
            .await
            .unwrap();

        assert_eq!(url.url.scheme(), "file");
        assert!(url.url.query().unwrap().starts_with("expires="));
        assert!(url.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn upload_writes_under_prefix() {
        let (dir, bucket) = bucket_with_files().await;
        let blob = UploadBlob {
            name: CompactString::new("notes.txt"),
            content_type: None,
            data: Bytes::from_static(b"hello"),
        };

        let obj = bucket.upload("files/", &blob).await.unwrap();

        assert_eq!(obj.key, "files/notes.txt");
        let written = TokioFs::read(dir.path().join("files/notes.txt")).await.unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn keys_cannot_escape_root() {
        let (_dir, bucket) = bucket_with_files().await;

        assert!(matches!(
            bucket.list("../").await,
            Err(GatewayError::Rejected(_))
        ));

        let blob = UploadBlob {
            name: CompactString::new("../evil.sh"),
            content_type: None,
            data: Bytes::new(),
        };
        assert!(matches!(
            bucket.upload("files/", &blob).await,
            Err(GatewayError::Rejected(_))
        ));
    }
}
