//! ``src/model/upload_batch.rs``
//! ============================================================================
//! # Upload Staging
//!
//! Files dropped onto the upload zone or picked by path are normalized into
//! the same ordered list of `StagedBlob`s and appended to the `UploadBatch`.
//! The batch is append-only until it is submitted or an item is removed by
//! position; names are never deduplicated.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use compact_str::CompactString;
use smallvec::SmallVec;
use tokio::fs as TokioFs;
use url::Url;

use crate::{error::AppError, storage::gateway::UploadBlob};

/// Paths extracted from one drop or picker submission.
pub type FileList = SmallVec<[PathBuf; 4]>;

/// Where a staged blob's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobSource {
    File(PathBuf),
    Memory(Bytes),
}

/// A local blob waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBlob {
    pub name: CompactString,
    pub size: u64,
    pub source: BlobSource,
}

impl StagedBlob {
    #[must_use]
    pub fn from_bytes(name: impl Into<CompactString>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            source: BlobSource::Memory(data),
        }
    }

    /// Stat a local file and stage it under its file name.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let meta = TokioFs::metadata(path).await?;

        if !meta.is_file() {
            return Err(AppError::invalid_input(
                "upload_path",
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::invalid_input("upload_path", format!("{} has no file name", path.display()))
            })?;

        Ok(Self {
            name: CompactString::new(name),
            size: meta.len(),
            source: BlobSource::File(path.to_path_buf()),
        })
    }

    /// Read the bytes and guess a content type for submission.
    pub async fn load(&self) -> Result<UploadBlob, AppError> {
        let data = match &self.source {
            BlobSource::File(path) => Bytes::from(TokioFs::read(path).await?),
            BlobSource::Memory(bytes) => bytes.clone(),
        };

        let content_type = mime_guess::from_path(self.name.as_str())
            .first()
            .map(|m| m.essence_str().to_string());

        Ok(UploadBlob {
            name: self.name.clone(),
            content_type,
            data,
        })
    }
}

/// Ordered list of blobs staged for the next submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    items: Vec<StagedBlob>,
}

impl UploadBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append blobs in order. Returns how many were added.
    pub fn stage(&mut self, blobs: impl IntoIterator<Item = StagedBlob>) -> usize {
        let before = self.items.len();
        self.items.extend(blobs);
        self.items.len() - before
    }

    /// Remove the blob at `index`, if any.
    pub fn unstage(&mut self, index: usize) -> Option<StagedBlob> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[StagedBlob] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.items.iter().map(|b| b.size).sum()
    }
}

/// Split a drop payload or picker input into paths.
///
/// Terminals deliver dropped files as pasted text: one path per line, or
/// several on one line separated by spaces with quotes or backslash escapes
/// protecting embedded spaces, sometimes as `file://` URIs.
#[must_use]
pub fn normalize_file_list(raw: &str) -> FileList {
    let mut paths = FileList::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (None, c) if c.is_whitespace() => push_token(&mut paths, &mut current),
            (None, c) => current.push(c),
        }
    }
    push_token(&mut paths, &mut current);

    paths
}

fn push_token(paths: &mut FileList, token: &mut String) {
    if token.is_empty() {
        return;
    }

    let path = if token.starts_with("file://") {
        Url::parse(token)
            .ok()
            .and_then(|u| u.to_file_path().ok())
            .unwrap_or_else(|| PathBuf::from(token.as_str()))
    } else {
        PathBuf::from(token.as_str())
    };

    paths.push(path);
    token.clear();
}

/// Stat every path, keeping order. Paths that cannot be staged come back as
/// errors alongside the blobs that can.
pub async fn blobs_from_paths(paths: &[PathBuf]) -> (Vec<StagedBlob>, Vec<AppError>) {
    let mut blobs = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for path in paths {
        match StagedBlob::from_path(path).await {
            Ok(blob) => blobs.push(blob),
            Err(e) => errors.push(e.with_context(path.display().to_string())),
        }
    }

    (blobs, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn blob(name: &str) -> StagedBlob {
        StagedBlob::from_bytes(name, Bytes::from_static(b"data"))
    }

    #[test]
    fn stage_appends_in_order_without_dedup() {
        let mut batch = UploadBatch::new();

        assert_eq!(batch.stage([blob("a.txt"), blob("b.txt")]), 2);
        assert_eq!(batch.stage([blob("a.txt")]), 1);

        let names: Vec<&str> = batch.items().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "a.txt"]);
        assert_eq!(batch.total_bytes(), 12);
    }

    #[test]
    fn unstage_by_position() {
        let mut batch = UploadBatch::new();
        batch.stage([blob("a"), blob("b"), blob("c")]);

        assert_eq!(batch.unstage(1).map(|b| b.name), Some("b".into()));
        assert!(batch.unstage(5).is_none());

        let names: Vec<&str> = batch.items().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn normalize_handles_lines_quotes_and_escapes() {
        let raw = "/tmp/a.txt\n'/tmp/with space.png' /tmp/esc\\ aped.pdf \"/tmp/q.zip\"";
        let paths = normalize_file_list(raw);

        assert_eq!(
            paths.as_slice(),
            [
                PathBuf::from("/tmp/a.txt"),
                PathBuf::from("/tmp/with space.png"),
                PathBuf::from("/tmp/esc aped.pdf"),
                PathBuf::from("/tmp/q.zip"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn normalize_decodes_file_uris() {
        let paths = normalize_file_list("file:///tmp/My%20Doc.txt");
        assert_eq!(paths.as_slice(), [PathBuf::from("/tmp/My Doc.txt")]);
    }

    #[test]
    fn normalize_empty_input() {
        assert!(normalize_file_list("  \n ").is_empty());
    }

    #[tokio::test]
    async fn blobs_from_paths_reports_missing() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        TokioFs::write(&good, b"12345").await.unwrap();
        let missing = dir.path().join("missing.txt");

        let (blobs, errors) = blobs_from_paths(&[good.clone(), missing, dir.path().to_path_buf()]).await;

        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].name, "good.txt");
        assert_eq!(blobs[0].size, 5);
        assert_eq!(blobs[0].source, BlobSource::File(good));
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn load_reads_bytes_and_guesses_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pic.png");
        TokioFs::write(&path, b"png!").await.unwrap();

        let staged = StagedBlob::from_path(&path).await.unwrap();
        let upload = staged.load().await.unwrap();

        assert_eq!(&upload.data[..], b"png!");
        assert_eq!(upload.content_type.as_deref(), Some("image/png"));
    }
}
