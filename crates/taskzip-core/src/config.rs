use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Asana REST API root.
pub const DEFAULT_API_BASE_URL: &str = "https://app.asana.com/api/1.0";

/// What to do when two attachments of one task report the same filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Keep both: later duplicates get a ` (n)` suffix before the extension.
    /// Names differing only in letter case count as duplicates.
    #[default]
    Rename,
    /// Keep one: the last download to finish replaces the others. Case
    /// variants share the first spelling seen.
    Overwrite,
}

/// Global configuration loaded from `~/.config/taskzip/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskzipConfig {
    /// Root of the catalog REST API.
    pub api_base_url: String,
    /// Page size requested from paginated catalog listings.
    pub page_size: u32,
    /// Maximum in-flight catalog requests per resolver stage (None = derived from CPU count).
    #[serde(default)]
    pub catalog_concurrency: Option<usize>,
    /// Maximum concurrent attachment downloads.
    pub download_concurrency: usize,
    /// Total timeout for one catalog request, in seconds.
    pub request_timeout_secs: u64,
    /// Connect timeout for every request, in seconds.
    pub connect_timeout_secs: u64,
    /// Hard timeout for one attachment download, in seconds.
    pub download_timeout_secs: u64,
    /// Receive buffer size for streaming downloads, in bytes.
    pub chunk_size: usize,
    /// Staging directory and archive name prefix; the run date is appended.
    pub staging_prefix: String,
    /// Where finished archives are moved (None = the user's Downloads folder).
    #[serde(default)]
    pub destination_dir: Option<PathBuf>,
    /// Filename collision handling inside one task folder.
    #[serde(default)]
    pub collision: CollisionPolicy,
}

impl Default for TaskzipConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: 100,
            catalog_concurrency: None,
            download_concurrency: 8,
            request_timeout_secs: 30,
            connect_timeout_secs: 15,
            download_timeout_secs: 600,
            chunk_size: 8192,
            staging_prefix: "asana_files".to_string(),
            destination_dir: None,
            collision: CollisionPolicy::Rename,
        }
    }
}

impl TaskzipConfig {
    /// Effective catalog concurrency: configured value, else twice the
    /// available threads clamped to 4..=16.
    pub fn effective_catalog_concurrency(&self) -> usize {
        self.catalog_concurrency
            .unwrap_or_else(default_catalog_concurrency)
            .max(1)
    }

    /// Effective destination directory for finished archives.
    pub fn effective_destination_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.destination_dir {
            return Ok(dir.clone());
        }
        default_destination_dir()
    }
}

fn default_catalog_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(8)
        .clamp(4, 16)
}

/// The user's Downloads folder, or `$HOME/Downloads` when the platform has none registered.
pub fn default_destination_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::download_dir() {
        return Ok(dir);
    }
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join("Downloads"))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("taskzip")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TaskzipConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TaskzipConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: TaskzipConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
