//! Download executor: fetch every resolved file into `staging_root/<group>/`.
//!
//! Jobs run on a bounded pool independent of the resolver's bound. Each job
//! streams into its own part file and renames it into place on success, so a
//! failed download leaves nothing at the destination path. Failures are
//! logged and recorded per file; they never cancel siblings and are not retried.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CollisionPolicy;
use crate::fetch::Fetcher;
use crate::model::{DownloadOutcome, GroupMap, ResolvedFile};
use crate::pool::run_bounded;
use crate::storage::{part_path, PartFile};

/// Default cap on concurrent downloads against the remote host.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    pub concurrency: usize,
    pub collision: CollisionPolicy,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            collision: CollisionPolicy::default(),
        }
    }
}

/// One planned download with its final destination.
struct Job {
    tag: usize,
    group: String,
    filename: String,
    url: String,
    dest: PathBuf,
}

/// Downloads every file in `groups` below `staging_root` and returns one
/// outcome per file. Returns only after all jobs have finished.
///
/// Every group gets a directory, including groups without files.
/// Destination names are planned before any job starts, so collision
/// handling never depends on completion order.
pub fn download<F>(
    fetcher: &F,
    groups: &GroupMap,
    staging_root: &Path,
    options: &DownloadOptions,
) -> Vec<DownloadOutcome>
where
    F: Fetcher + ?Sized,
{
    let mut outcomes = Vec::new();
    let mut jobs = Vec::new();

    for (group, files) in groups {
        let dir = staging_root.join(group);
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::error!(dir = %dir.display(), "cannot create group directory: {}", e);
            let reason = format!("create directory {}: {}", dir.display(), e);
            outcomes.extend(files.iter().map(|f| failed(f, dir.join(&f.filename), reason.clone())));
            continue;
        }

        // Keys are lowercased: case-insensitive filesystems map `Report.pdf`
        // and `report.pdf` onto one path.
        let mut taken: HashSet<String> = HashSet::new();
        let mut first_spelling: HashMap<String, String> = HashMap::new();
        for file in files {
            if !is_safe_filename(&file.filename) {
                tracing::warn!(group = %group, filename = %file.filename, "unsafe filename, skipping");
                outcomes.push(failed(file, dir.clone(), "unsafe filename".to_string()));
                continue;
            }
            let name = match options.collision {
                CollisionPolicy::Rename => {
                    let name = unique_name(&file.filename, &mut taken);
                    if name != file.filename {
                        tracing::warn!(group = %group, filename = %file.filename, renamed = %name, "duplicate filename, renaming");
                    }
                    name
                }
                CollisionPolicy::Overwrite => {
                    let key = file.filename.to_lowercase();
                    match first_spelling.get(&key) {
                        Some(existing) => {
                            tracing::warn!(group = %group, filename = %file.filename, "duplicate filename, last download wins");
                            existing.clone()
                        }
                        None => {
                            first_spelling.insert(key, file.filename.clone());
                            file.filename.clone()
                        }
                    }
                }
            };
            jobs.push(Job {
                tag: jobs.len(),
                group: group.clone(),
                filename: file.filename.clone(),
                url: file.url.clone(),
                dest: dir.join(name),
            });
        }
    }

    tracing::info!(
        files = jobs.len(),
        concurrency = options.concurrency,
        "starting downloads"
    );
    outcomes.extend(run_bounded(jobs, options.concurrency, |job| {
        download_one(fetcher, job)
    }));

    let failed_count = outcomes.iter().filter(|o| !o.is_success()).count();
    tracing::info!(
        downloaded = outcomes.len() - failed_count,
        failed = failed_count,
        "downloads finished"
    );
    outcomes
}

fn download_one<F>(fetcher: &F, job: Job) -> DownloadOutcome
where
    F: Fetcher + ?Sized,
{
    let result = fetch_into_place(fetcher, &job);
    match &result {
        Ok(bytes) => {
            tracing::info!(group = %job.group, file = %job.dest.display(), bytes, "downloaded");
        }
        Err(reason) => {
            tracing::warn!(group = %job.group, filename = %job.filename, url = %job.url, "download failed: {}", reason);
        }
    }
    DownloadOutcome {
        group: job.group,
        filename: job.filename,
        path: job.dest,
        result,
    }
}

fn fetch_into_place<F>(fetcher: &F, job: &Job) -> Result<u64, String>
where
    F: Fetcher + ?Sized,
{
    let mut part = PartFile::create(&job.dest, job.tag).map_err(|e| format!("{:#}", e))?;
    match fetcher.fetch(&job.url, &mut part) {
        Ok(bytes) => match part.finalize(&job.dest) {
            Ok(()) => Ok(bytes),
            Err(e) => {
                let _ = fs::remove_file(part_path(&job.dest, job.tag));
                Err(format!("{:#}", e))
            }
        },
        Err(e) => {
            part.discard();
            Err(e.to_string())
        }
    }
}

fn failed(file: &ResolvedFile, path: PathBuf, reason: String) -> DownloadOutcome {
    DownloadOutcome {
        group: file.group.clone(),
        filename: file.filename.clone(),
        path,
        result: Err(reason),
    }
}

/// A reported filename is used verbatim only if it is a single plain path component.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// `name` if not yet taken, else `stem (n).ext` with the smallest free `n`.
/// `taken` holds lowercased names; the returned name is recorded there.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_lowercase()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    };
    let mut n = 1usize;
    loop {
        let candidate = format!("{} ({}){}", stem, n, ext);
        if taken.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
