//! Archive assembler: staging tree → one deflate zip in the destination folder.
//!
//! Order is fixed: write the zip next to the staging tree, move it into the
//! destination, then delete the staging tree. The staging tree is only
//! removed after the move succeeded, so a failed run keeps every downloaded
//! file on disk for manual recovery.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Extension of the produced archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("staging directory {0} does not exist or has no name")]
    InvalidStaging(PathBuf),
    #[error("walk staging tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("write archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("move archive {} into {}: {source}", archive.display(), destination.display())]
    Move {
        archive: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(context: impl Into<String>) -> impl FnOnce(io::Error) -> ArchiveError {
    let context = context.into();
    move |source| ArchiveError::Io { context, source }
}

/// Packs `staging_root` into `<staging name>.zip`, moves it into
/// `destination_dir` (created if needed, same-named file replaced), and
/// deletes `staging_root`. Returns the archive's final path.
///
/// On any error the staging tree is left in place.
pub fn assemble(staging_root: &Path, destination_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let name = match staging_root.file_name() {
        Some(n) if staging_root.is_dir() => n.to_string_lossy().into_owned(),
        _ => return Err(ArchiveError::InvalidStaging(staging_root.to_path_buf())),
    };
    let archive_path = staging_root.with_file_name(format!("{}.{}", name, ARCHIVE_EXTENSION));

    let entries = match write_archive(staging_root, &archive_path) {
        Ok(n) => n,
        Err(e) => {
            remove_partial(&archive_path);
            return Err(e);
        }
    };
    tracing::info!(archive = %archive_path.display(), entries, "archive written");

    let final_path = move_into(&archive_path, destination_dir)?;
    tracing::info!(archive = %final_path.display(), "archive moved to destination");

    if let Err(e) = fs::remove_dir_all(staging_root) {
        tracing::warn!(staging = %staging_root.display(), "could not remove staging tree: {}", e);
    }
    Ok(final_path)
}

/// Writes every regular file under `root` as a deflate entry named by its
/// `/`-separated relative path, in sorted order. Returns the entry count.
pub fn write_archive(root: &Path, archive_path: &Path) -> Result<usize, ArchiveError> {
    let zip_err = |source| ArchiveError::Zip {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::create(archive_path)
        .map_err(io_err(format!("create {}", archive_path.display())))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0usize;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let name = entry_name(root, path)?;
        let len = entry.metadata()?.len();
        let options = base.large_file(len >= u64::from(u32::MAX));

        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        let mut src = File::open(path).map_err(io_err(format!("open {}", path.display())))?;
        io::copy(&mut src, &mut zip).map_err(io_err(format!("add {} to archive", path.display())))?;
        tracing::debug!(entry = %name, bytes = len, "archived");
        count += 1;
    }

    let writer = zip.finish().map_err(zip_err)?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .and_then(|f| f.sync_all())
        .map_err(io_err(format!("flush {}", archive_path.display())))?;
    Ok(count)
}

fn entry_name(root: &Path, path: &Path) -> Result<String, ArchiveError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ArchiveError::InvalidStaging(root.to_path_buf()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Moves `archive` into `destination_dir`, replacing a same-named file.
///
/// Tries a rename first; when that fails (e.g. across filesystems) falls back
/// to copy + remove.
fn move_into(archive: &Path, destination_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let move_err = |source| ArchiveError::Move {
        archive: archive.to_path_buf(),
        destination: destination_dir.to_path_buf(),
        source,
    };
    let file_name = archive
        .file_name()
        .ok_or_else(|| move_err(io::Error::new(io::ErrorKind::InvalidInput, "archive has no file name")))?;

    fs::create_dir_all(destination_dir).map_err(move_err)?;
    let target = destination_dir.join(file_name);

    if let Err(rename_err) = fs::rename(archive, &target) {
        tracing::debug!("rename failed ({}), falling back to copy", rename_err);
        copy_into_place(archive, &target).map_err(move_err)?;
        if let Err(e) = fs::remove_file(archive) {
            tracing::warn!(archive = %archive.display(), "copied archive but could not remove source: {}", e);
        }
    }
    Ok(target)
}

/// Copies `source` to a hidden temporary next to `target`, then renames it
/// over `target`. On failure `target` is untouched and the temporary removed.
fn copy_into_place(source: &Path, target: &Path) -> io::Result<()> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = target.with_file_name(format!(".{}.partial", name));
    let copied = fs::copy(source, &temp)
        .and_then(|_| File::open(&temp)?.sync_all())
        .and_then(|_| fs::rename(&temp, target));
    if copied.is_err() {
        remove_partial(&temp);
    }
    copied
}

fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "could not remove partial archive: {}", e);
        }
    }
}
