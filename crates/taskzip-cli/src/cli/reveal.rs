//! Show the finished archive in the platform file manager.

use std::path::Path;
use std::process::Command;

pub(crate) fn reveal_command(archive: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("explorer");
        cmd.arg("/select,").arg(archive);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg("-R").arg(archive);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(archive.parent().unwrap_or(archive));
        cmd
    }
}

/// Best effort: a missing file manager only logs a warning.
pub fn reveal(archive: &Path) {
    match reveal_command(archive).status() {
        // explorer.exe exits 1 even when it opened the folder.
        Ok(status) => tracing::debug!(?status, "file manager launched"),
        Err(err) => {
            tracing::warn!("could not open file manager: {}", err);
            eprintln!("File is saved at {}", archive.display());
        }
    }
}
