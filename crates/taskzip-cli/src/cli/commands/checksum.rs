//! `taskzip checksum`: SHA-256 of a file, in `sha256sum` output format.

use anyhow::{bail, Result};
use std::path::Path;
use taskzip_core::checksum;

pub async fn run_checksum(path: &Path) -> Result<()> {
    if path.is_dir() {
        bail!("{} is a directory", path.display());
    }
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
