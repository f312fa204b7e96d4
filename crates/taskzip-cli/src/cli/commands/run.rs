//! `taskzip run`: list → resolve → download → archive for one project.

use anyhow::{Context, Result};
use taskzip_core::catalog::{AsanaClient, AsanaClientOptions};
use taskzip_core::config::TaskzipConfig;
use taskzip_core::fetch::{CurlFetcher, FetchOptions};
use taskzip_core::pipeline::{run_pipeline, PipelineOptions, RunSignal};
use tokio::sync::mpsc;

use crate::cli::{prompt, reveal, spinner, RunArgs};

/// Config for this run: file values with command-line flags on top.
pub(crate) fn apply_overrides(cfg: &TaskzipConfig, args: &RunArgs) -> TaskzipConfig {
    let mut cfg = cfg.clone();
    if let Some(dest) = &args.dest {
        cfg.destination_dir = Some(dest.clone());
    }
    if let Some(jobs) = args.jobs {
        cfg.download_concurrency = jobs.max(1);
    }
    if let Some(jobs) = args.catalog_jobs {
        cfg.catalog_concurrency = Some(jobs.max(1));
    }
    if let Some(collision) = args.collision {
        cfg.collision = collision.into();
    }
    cfg
}

pub async fn run_archive(cfg: &TaskzipConfig, args: RunArgs) -> Result<()> {
    let cfg = apply_overrides(cfg, &args);

    let token = match args.token.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => prompt::read_token()?,
    };
    let project = match args.project.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => prompt::read_project()?,
    };

    let client = AsanaClient::new(AsanaClientOptions::from_config(&cfg, token))
        .with_context(|| format!("invalid api_base_url {:?}", cfg.api_base_url))?;
    let fetcher = CurlFetcher::new(FetchOptions::from_config(&cfg));
    let work_dir = std::env::current_dir().context("resolve working directory")?;
    let options = PipelineOptions::from_config(&cfg, work_dir)?;
    tracing::info!(
        project = %project,
        destination = %options.destination_dir.display(),
        downloads = options.download.concurrency,
        catalog = options.catalog_concurrency,
        "starting run"
    );

    let (signal_tx, signal_rx) = mpsc::unbounded_channel::<RunSignal>();
    let spinner_handle = tokio::spawn(spinner::spin(signal_rx));

    let outcome = tokio::task::spawn_blocking(move || {
        run_pipeline(&client, &fetcher, &project, &options, |signal| {
            let _ = signal_tx.send(signal);
        })
    })
    .await
    .context("pipeline task panicked")?;
    let _ = spinner_handle.await;

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            tracing::error!("run failed: {}", err);
            return Err(err.into());
        }
    };

    println!(
        "{} task(s), {} of {} attachment(s) downloaded",
        report.items, report.files_downloaded, report.files_resolved
    );
    if report.files_failed > 0 {
        println!("{} attachment(s) failed; see the log for details", report.files_failed);
    }
    println!("Archive: {}", report.archive_path.display());
    if let Some(digest) = &report.archive_sha256 {
        println!("SHA-256: {}", digest);
    }

    if args.reveal {
        reveal::reveal(&report.archive_path);
    }
    Ok(())
}
