//! ``src/model/file_entry.rs``
//! ============================================================================
//! # `FileEntry`: Display Record for One Stored Object
//!
//! Normalizes a storage object (reference + metadata + download URL) into the
//! record the grid and list views render. Entries are rebuilt wholesale on
//! every listing refresh; nothing here is diffed or updated in place.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use compact_str::CompactString;
use enum_map::Enum;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    storage::gateway::{DownloadUrl, ObjectMetadata, ObjectRef},
    util::humanize::human_readable_size,
};

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display category derived from a declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Document,
    Image,
    Video,
    Archive,
    Audio,
    Other,
}

impl FileKind {
    /// Classify a MIME type. Prefix rules win over substring rules, and the
    /// substring rules are deliberately loose: any type mentioning `text`
    /// counts as a document.
    #[must_use]
    pub fn classify(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else if content_type.starts_with("video/") {
            Self::Video
        } else if content_type.starts_with("audio/") {
            Self::Audio
        } else if ["zip", "rar", "archive"]
            .iter()
            .any(|needle| content_type.contains(needle))
        {
            Self::Archive
        } else if ["pdf", "document", "text"]
            .iter()
            .any(|needle| content_type.contains(needle))
        {
            Self::Document
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &'static str = match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Video => "video",
            Self::Archive => "archive",
            Self::Audio => "audio",
            Self::Other => "other",
        };

        write!(f, "{s}")
    }
}

/// One user-visible object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Storage key; unique within a listing.
    pub id: CompactString,
    pub name: CompactString,
    pub kind: FileKind,
    pub size_label: String,
    pub modified_label: String,

    /// Session-local flag, never written back to storage.
    pub starred: bool,

    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    pub content_type: String,
    pub download_url: Option<Url>,
}

impl FileEntry {
    /// Build the display record for one object.
    #[must_use]
    pub fn from_object(
        object: &ObjectRef,
        meta: &ObjectMetadata,
        url: Option<DownloadUrl>,
        date_format: &str,
    ) -> Self {
        Self {
            id: object.key.clone(),
            name: object.name.clone(),
            kind: FileKind::classify(&meta.content_type),
            size_label: human_readable_size(meta.size),
            modified_label: format_modified(meta.updated, date_format),
            starred: false,
            size_bytes: meta.size,
            modified: meta.updated,
            content_type: meta.content_type.clone(),
            download_url: url.map(|u| u.url),
        }
    }

    pub fn toggle_star(&mut self) -> bool {
        self.starred = !self.starred;
        self.starred
    }
}

/// Local calendar date of `updated`. A format string chrono cannot render
/// falls back to ISO dates instead of panicking.
#[must_use]
pub fn format_modified(updated: DateTime<Utc>, date_format: &str) -> String {
    let local: DateTime<Local> = updated.with_timezone(&Local);
    let mut out = String::new();

    if write!(out, "{}", local.format(date_format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", local.format(FALLBACK_DATE_FORMAT));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn classify_prefix_rules() {
        assert_eq!(FileKind::classify("image/png"), FileKind::Image);
        assert_eq!(FileKind::classify("image/"), FileKind::Image);
        assert_eq!(FileKind::classify("video/mp4"), FileKind::Video);
        assert_eq!(FileKind::classify("audio/mpeg"), FileKind::Audio);
    }

    #[test]
    fn classify_substring_rules() {
        assert_eq!(FileKind::classify("application/pdf"), FileKind::Document);
        assert_eq!(FileKind::classify("application/zip"), FileKind::Archive);
        assert_eq!(FileKind::classify("application/x-rar-compressed"), FileKind::Archive);
        assert_eq!(FileKind::classify("application/x-archive"), FileKind::Archive);
        assert_eq!(
            FileKind::classify("application/vnd.oasis.opendocument.text"),
            FileKind::Document
        );
    }

    #[test]
    fn classify_text_over_matches() {
        assert_eq!(FileKind::classify("text/unknown-garbage"), FileKind::Document);
    }

    #[test]
    fn classify_fallback() {
        assert_eq!(FileKind::classify(""), FileKind::Other);
        assert_eq!(FileKind::classify("application/octet-stream"), FileKind::Other);
    }

    #[test]
    fn from_object_builds_labels() {
        let obj = ObjectRef::new("files/Report.PDF");
        let meta = ObjectMetadata {
            content_type: "application/pdf".into(),
            size: 1536,
            updated: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        };

        let entry = FileEntry::from_object(&obj, &meta, None, "%Y");

        assert_eq!(entry.id, "files/Report.PDF");
        assert_eq!(entry.name, "Report.PDF");
        assert_eq!(entry.kind, FileKind::Document);
        assert_eq!(entry.size_label, "1.5 KB");
        assert_eq!(entry.modified_label, "2024");
        assert!(!entry.starred);
    }

    #[test]
    fn bad_date_format_falls_back() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let label = format_modified(ts, "%Q");

        assert_eq!(label, ts.with_timezone(&Local).format("%Y-%m-%d").to_string());
    }

    #[test]
    fn star_toggles_locally() {
        let obj = ObjectRef::new("files/a.txt");
        let meta = ObjectMetadata {
            content_type: "text/plain".into(),
            size: 0,
            updated: Utc::now(),
        };
        let mut entry = FileEntry::from_object(&obj, &meta, None, "%x");

        assert!(entry.toggle_star());
        assert!(!entry.toggle_star());
    }
}
