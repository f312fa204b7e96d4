//! Pipeline orchestrator: list → resolve → download → archive.
//!
//! The only place that knows the end-to-end order. Catalog and download
//! failures are absorbed by the stages; only staging setup and archive
//! assembly can fail a run, and then the staging tree is left on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::archive::{assemble, ArchiveError};
use crate::catalog::CatalogClient;
use crate::checksum::sha256_path;
use crate::config::TaskzipConfig;
use crate::executor::{download, DownloadOptions};
use crate::fetch::Fetcher;
use crate::model::RunReport;
use crate::resolver::resolve;

/// Start/stop notifications for a presentation layer's progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSignal {
    Started,
    /// Sent once, after success or failure.
    Finished,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Parent directory of the staging tree.
    pub work_dir: PathBuf,
    /// Where the finished archive is moved.
    pub destination_dir: PathBuf,
    /// Staging/archive name prefix; the run date is appended.
    pub staging_prefix: String,
    /// In-flight catalog requests per resolver stage.
    pub catalog_concurrency: usize,
    pub download: DownloadOptions,
}

impl PipelineOptions {
    pub fn from_config(cfg: &TaskzipConfig, work_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Ok(Self {
            work_dir: work_dir.into(),
            destination_dir: cfg.effective_destination_dir()?,
            staging_prefix: cfg.staging_prefix.clone(),
            catalog_concurrency: cfg.effective_catalog_concurrency(),
            download: DownloadOptions {
                concurrency: cfg.download_concurrency.max(1),
                collision: cfg.collision,
            },
        })
    }
}

/// Fatal run failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("create staging directory {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive step failed, downloaded files kept in {}: {source}", staging.display())]
    Archive {
        staging: PathBuf,
        #[source]
        source: ArchiveError,
    },
}

impl PipelineError {
    /// Staging tree left on disk for manual recovery, if any.
    pub fn preserved_staging(&self) -> Option<&Path> {
        match self {
            PipelineError::Archive { staging, .. } => Some(staging),
            PipelineError::Staging { .. } => None,
        }
    }
}

/// Runs one full pipeline for `collection_id` and blocks until it is done.
///
/// `on_signal` receives [`RunSignal::Started`] before any work and
/// [`RunSignal::Finished`] after the last step, on success and on failure.
pub fn run_pipeline<C, F, S>(
    client: &C,
    fetcher: &F,
    collection_id: &str,
    options: &PipelineOptions,
    mut on_signal: S,
) -> Result<RunReport, PipelineError>
where
    C: CatalogClient + ?Sized,
    F: Fetcher + ?Sized,
    S: FnMut(RunSignal),
{
    on_signal(RunSignal::Started);
    let result = run_stages(client, fetcher, collection_id, options);
    match &result {
        Ok(report) => tracing::info!(
            archive = %report.archive_path.display(),
            downloaded = report.files_downloaded,
            failed = report.files_failed,
            "run complete"
        ),
        Err(e) => tracing::error!("run failed: {}", e),
    }
    on_signal(RunSignal::Finished);
    result
}

fn run_stages<C, F>(
    client: &C,
    fetcher: &F,
    collection_id: &str,
    options: &PipelineOptions,
) -> Result<RunReport, PipelineError>
where
    C: CatalogClient + ?Sized,
    F: Fetcher + ?Sized,
{
    let items = match client.list_items(collection_id) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(collection = %collection_id, "listing items failed, continuing with none: {}", e);
            Vec::new()
        }
    };
    tracing::info!(collection = %collection_id, items = items.len(), "listed items");

    let groups = resolve(client, &items, options.catalog_concurrency);
    let files_resolved = groups.values().map(Vec::len).sum();

    let today = chrono::Local::now().date_naive();
    let staging_root = create_staging_root(&options.work_dir, &options.staging_prefix, today)?;
    tracing::info!(staging = %staging_root.display(), "staging directory ready");

    let outcomes = download(fetcher, &groups, &staging_root, &options.download);
    let files_failed = outcomes.iter().filter(|o| !o.is_success()).count();

    let archive_path = assemble(&staging_root, &options.destination_dir).map_err(|source| {
        PipelineError::Archive {
            staging: staging_root.clone(),
            source,
        }
    })?;

    let archive_sha256 = match sha256_path(&archive_path) {
        Ok(digest) => Some(digest),
        Err(e) => {
            tracing::warn!(archive = %archive_path.display(), "could not checksum archive: {:#}", e);
            None
        }
    };

    Ok(RunReport {
        archive_path,
        archive_sha256,
        items: items.len(),
        files_resolved,
        files_downloaded: outcomes.len() - files_failed,
        files_failed,
    })
}

/// `<prefix>-<YYYY-MM-DD>`.
pub fn staging_dir_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}", prefix, date.format("%Y-%m-%d"))
}

/// Creates a fresh staging directory under `work_dir`. A second run on the
/// same day gets `-2`, `-3`, … appended instead of reusing the first tree.
fn create_staging_root(
    work_dir: &Path,
    prefix: &str,
    date: NaiveDate,
) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(work_dir).map_err(|source| PipelineError::Staging {
        path: work_dir.to_path_buf(),
        source,
    })?;
    let base = staging_dir_name(prefix, date);
    let mut n = 1u32;
    loop {
        let name = if n == 1 {
            base.clone()
        } else {
            format!("{}-{}", base, n)
        };
        let path = work_dir.join(name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(source) => return Err(PipelineError::Staging { path, source }),
        }
    }
}
