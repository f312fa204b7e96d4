//! Streaming HTTP GET of one attachment.
//!
//! The body is handed to the sink chunk by chunk as libcurl receives it, so
//! memory use does not depend on attachment size.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::TaskzipConfig;

/// Failure of one attachment download.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Timeout, connection failure, or any other curl error.
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// Writing the body to the sink failed (disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[source] io::Error),
}

/// Streams the body at `url` into `sink`, returning the number of bytes written.
///
/// Implementations must be safe to call from many worker threads at once.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError>;
}

/// Timeouts and buffer size for [`CurlFetcher`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    /// Hard cap on one transfer.
    pub timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Receive buffer size (libcurl clamps to 1 KiB..=10 MiB).
    pub chunk_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            chunk_size: 8192,
        }
    }
}

impl FetchOptions {
    pub fn from_config(cfg: &TaskzipConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs.max(1)),
            timeout: Duration::from_secs(cfg.download_timeout_secs.max(1)),
            chunk_size: cfg.chunk_size.max(1024),
            ..Self::default()
        }
    }
}

/// libcurl-backed [`Fetcher`]; one easy handle per download.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: FetchOptions,
}

impl CurlFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let opts = &self.options;
        let mut written = 0u64;
        let mut storage_error: Option<io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // Error bodies never reach the sink; the status is read below.
        easy.fail_on_error(true)?;
        easy.buffer_size(opts.chunk_size)?;
        easy.connect_timeout(opts.connect_timeout)?;
        easy.low_speed_limit(opts.low_speed_limit)?;
        easy.low_speed_time(opts.low_speed_time)?;
        easy.timeout(opts.timeout)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    storage_error = Some(e);
                    // Short count aborts the transfer with a write error.
                    Ok(0)
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if e.is_write_error() {
                if let Some(io_err) = storage_error {
                    return Err(FetchError::Storage(io_err));
                }
            }
            if e.is_http_returned_error() {
                let code = easy.response_code().unwrap_or(0);
                return Err(FetchError::Status(code));
            }
            return Err(FetchError::Transport(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }
        sink.flush().map_err(FetchError::Storage)?;
        Ok(written)
    }
}
