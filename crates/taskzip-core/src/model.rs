//! Data carried between pipeline stages.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A task in the source collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
}

/// Reference to an attachment on an item, before its detail is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub id: String,
    pub item_id: String,
}

/// Downloadable detail of an attachment as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDetail {
    pub name: String,
    pub url: String,
}

/// A fully resolved download: remote filename, source URL and owning group.
///
/// `filename` is the name reported by the catalog; only `group` is sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub filename: String,
    pub url: String,
    pub group: String,
}

/// Sanitized group name → files for that group.
///
/// Every input item has an entry, possibly empty.
pub type GroupMap = BTreeMap<String, Vec<ResolvedFile>>;

/// Result of one file download.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub group: String,
    /// Reported filename of the attachment.
    pub filename: String,
    /// Destination path inside the staging tree (after collision handling).
    pub path: PathBuf,
    /// Bytes written on success, failure reason otherwise.
    pub result: Result<u64, String>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final location of the archive.
    pub archive_path: PathBuf,
    /// Lowercase hex SHA-256 of the archive, if it could be read back.
    pub archive_sha256: Option<String>,
    pub items: usize,
    pub files_resolved: usize,
    pub files_downloaded: usize,
    pub files_failed: usize,
}
