//! ``src/storage/memory_bucket.rs``
//! ============================================================================
//! # `MemoryBucket`: In-Process Object Storage
//!
//! A bucket held entirely in memory. Backs the `--demo` mode of the binary and
//! the controller tests; faults can be injected per operation and per key, and
//! every listing and upload call is counted.

use std::{
    collections::{BTreeMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use url::Url;

use crate::storage::gateway::{
    DownloadUrl, GatewayError, ObjectMetadata, ObjectRef, StorageGateway, UploadBlob, object_key,
};

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    size: u64,
    data: Bytes,
    updated: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Faults {
    list: bool,
    metadata: HashSet<String>,
    download_url: HashSet<String>,
    upload: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct MemoryBucket {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    faults: Mutex<Faults>,
    list_delay: Mutex<Option<Duration>>,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl MemoryBucket {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object directly, bypassing `upload` and its counters.
    pub fn insert(
        &self,
        key: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
        updated: DateTime<Utc>,
    ) {
        let data: Bytes = data.into();
        self.objects.lock().insert(
            key.into(),
            StoredObject {
                content_type: content_type.into(),
                size: data.len() as u64,
                data,
                updated,
            },
        );
    }

    /// Store a placeholder object that reports `size` bytes without holding them.
    pub fn insert_placeholder(
        &self,
        key: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        updated: DateTime<Utc>,
    ) {
        self.objects.lock().insert(
            key.into(),
            StoredObject {
                content_type: content_type.into(),
                size,
                data: Bytes::new(),
                updated,
            },
        );
    }

    /// Seed a bucket with a handful of objects of every kind.
    #[must_use]
    pub fn demo(prefix: &str) -> Self {
        let bucket = Self::new();
        let now = Utc::now();
        let samples: [(&str, &str, u64); 8] = [
            ("Project Proposal.docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document", 2_516_582),
            ("Design Mockups.png", "image/png", 16_567_500),
            ("Presentation.pdf", "application/pdf", 8_598_323),
            ("Budget Report.txt", "text/plain", 1_153_434),
            ("Team Photo.jpg", "image/jpeg", 4_718_592),
            ("Product Demo.mp4", "video/mp4", 47_500_000),
            ("Archive.zip", "application/zip", 125_829_120),
            ("Meeting Recording.mp3", "audio/mpeg", 13_317_963),
        ];

        for (offset, (name, content_type, size)) in samples.into_iter().enumerate() {
            bucket.insert_placeholder(
                object_key(prefix, name),
                content_type,
                size,
                now - chrono::Duration::days(offset as i64 * 3),
            );
        }

        bucket
    }

    pub fn fail_listing(&self, fail: bool) {
        self.faults.lock().list = fail;
    }

    pub fn fail_metadata_for(&self, key: impl Into<String>) {
        self.faults.lock().metadata.insert(key.into());
    }

    pub fn fail_download_url_for(&self, key: impl Into<String>) {
        self.faults.lock().download_url.insert(key.into());
    }

    /// Reject uploads of blobs with this name.
    pub fn fail_upload_for(&self, name: impl Into<String>) {
        self.faults.lock().upload.insert(name.into());
    }

    pub fn clear_faults(&self) {
        *self.faults.lock() = Faults::default();
    }

    /// Delay every subsequent `list` call, to keep refreshes in flight.
    pub fn set_list_delay(&self, delay: Option<Duration>) {
        *self.list_delay.lock() = delay;
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::Relaxed)
    }

    /// Stored bytes of one object; placeholders read back empty.
    #[must_use]
    pub fn read(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().get(key).map(|o| o.data.clone())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().contains_key(key)
    }

    fn lookup(&self, key: &str) -> Result<StoredObject, GatewayError> {
        self.objects
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl StorageGateway for MemoryBucket {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectRef>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);

        let delay = *self.list_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.faults.lock().list {
            return Err(GatewayError::Io(format!("listing {prefix} refused")));
        }

        let objects = self.objects.lock();
        Ok(objects
            .keys()
            .filter_map(|key| key.strip_prefix(prefix).map(|rest| (key, rest)))
            .filter(|(_, rest)| !rest.is_empty() && !rest.contains('/'))
            .map(|(key, _)| ObjectRef::new(key.as_str()))
            .collect())
    }

    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMetadata, GatewayError> {
        if self.faults.lock().metadata.contains(object.key.as_str()) {
            return Err(GatewayError::Io(format!("metadata for {} unavailable", object.key)));
        }

        let stored = self.lookup(&object.key)?;

        Ok(ObjectMetadata {
            content_type: stored.content_type,
            size: stored.size,
            updated: stored.updated,
        })
    }

    async fn download_url(&self, object: &ObjectRef) -> Result<DownloadUrl, GatewayError> {
        if self.faults.lock().download_url.contains(object.key.as_str()) {
            return Err(GatewayError::Rejected(format!("no URL for {}", object.key)));
        }

        self.lookup(&object.key)?;

        let expires_at = Utc::now() + chrono::Duration::hours(1);
        let mut url = Url::parse("memory://bucket/")
            .map_err(|e| GatewayError::Rejected(e.to_string()))?
            .join(&object.key)
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("expires", &expires_at.timestamp().to_string());

        Ok(DownloadUrl { url, expires_at })
    }

    async fn upload(&self, prefix: &str, blob: &UploadBlob) -> Result<ObjectRef, GatewayError> {
        self.upload_calls.fetch_add(1, Ordering::Relaxed);

        if self.faults.lock().upload.contains(blob.name.as_str()) {
            return Err(GatewayError::Rejected(format!("upload of {} refused", blob.name)));
        }

        let key = object_key(prefix, &blob.name);
        let content_type = blob
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.insert(key.clone(), content_type, blob.data.clone(), Utc::now());

        Ok(ObjectRef::new(key))
    }
}
