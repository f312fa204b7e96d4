//! Download file lifecycle in the staging tree.
//!
//! Bodies stream into `.taskzip-<tag>.part` next to the final path and are
//! renamed onto it
//! only once the download succeeded; a failed download removes its part file.
//! A file at the final path is therefore always complete.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename onto the final name.
pub const TEMP_SUFFIX: &str = ".part";

/// Prefix of part-file names.
pub const PART_PREFIX: &str = ".taskzip-";

/// Part-file path for a download: `dir/report.pdf` with tag 3 → `dir/.taskzip-3.part`.
///
/// The name does not grow with the final name, so any name the filesystem
/// accepts can be downloaded. Tags are unique per run, which keeps concurrent
/// downloads aimed at one final path apart.
pub fn part_path(final_path: &Path, tag: usize) -> PathBuf {
    final_path.with_file_name(format!("{}{}{}", PART_PREFIX, tag, TEMP_SUFFIX))
}

/// Buffered writer over a part file.
pub struct PartFile {
    writer: BufWriter<File>,
    part_path: PathBuf,
}

impl PartFile {
    /// Create (or truncate) the part file for `final_path`.
    pub fn create(final_path: &Path, tag: usize) -> Result<Self> {
        let part_path = part_path(final_path, tag);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&part_path)
            .with_context(|| format!("failed to create part file: {}", part_path.display()))?;
        Ok(Self {
            writer: BufWriter::with_capacity(64 * 1024, file),
            part_path,
        })
    }

    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    /// Flush, sync, and rename onto `final_path`, replacing any file already there.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        let part_path = self.part_path;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("flush {}", part_path.display()))?;
        file.sync_all()
            .with_context(|| format!("sync {}", part_path.display()))?;
        drop(file);
        std::fs::rename(&part_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                part_path.display(),
                final_path.display()
            )
        })?;
        Ok(())
    }

    /// Close and delete the part file. Removal failure is logged, not returned.
    pub fn discard(self) {
        let part_path = self.part_path;
        drop(self.writer);
        if let Err(e) = std::fs::remove_file(&part_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %part_path.display(), "could not remove part file: {}", e);
            }
        }
    }
}

impl Write for PartFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
