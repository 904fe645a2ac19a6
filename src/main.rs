//! # Boomerang Spider
//!
//! Harvests cyber security news from a fixed set of sites into a CSV dataset
//! that a desktop ticker scrolls through.
//!
//! ## Sources
//!
//! - The Hacker News front page
//! - cyber.gov.au news and media (summarized and classified by an LLM)
//! - Australian Federal Police news centre
//!
//! ## Usage
//!
//! ```sh
//! boomerang_spider run             # harvest now and every 24 hours
//! boomerang_spider once            # a single cycle
//! boomerang_spider ticker          # print the published dataset
//! ```
//!
//! ## Architecture
//!
//! Each cycle runs the sources one after another:
//! 1. **Fetching**: GET the listing page, with an explicit timeout
//! 2. **Extraction**: per-site selectors produce four-field records
//! 3. **Enrichment**: cyber.gov.au items are summarized and labelled
//! 4. **Storage**: the batch is appended to the working CSV
//!
//! After the last source the working CSV is swapped into the canonical path
//! with an atomic rename. The ticker only ever reads the canonical file.

use awful_aj::{config as aj_config, config_dir, template};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod enrich;
mod error;
mod fetcher;
mod models;
mod outputs;
mod pipeline;
mod scheduler;
mod scrapers;
#[cfg(test)]
mod testing;
mod ticker;
mod utils;

use api::{AjClient, RetryAsk};
use cli::{Cli, Command};
use config::{EnrichmentConfig, SpiderConfig};
use enrich::{EnrichOptions, Enricher};
use fetcher::HttpFetcher;
use pipeline::Pipeline;
use ticker::TickerState;
use utils::{ensure_writable_dir, truncate_for_log};

type LlmClient = RetryAsk<AjClient>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = SpiderConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    info!(data_dir = %config.data_dir.display(), "boomerang_spider starting up");

    match args.command {
        Command::Ticker { delay_ms, limit } => {
            run_ticker(&config, Duration::from_millis(delay_ms), limit).await?;
        }
        Command::Once => {
            let pipeline = build_pipeline(&config).await?;
            let report = pipeline.run_cycle(&CancellationToken::new()).await;
            for source in report.sources.iter().filter(|s| s.result.is_err()) {
                warn!(source = %source.kind, url = %source.url, "Source produced no records");
            }
            info!(
                written = report.records_written(),
                failed = ?report.failed_sources(),
                success = report.is_success(),
                "Single cycle finished"
            );
        }
        Command::Run { interval_hours } => {
            if let Some(hours) = interval_hours {
                config.interval_hours = hours;
            }
            let pipeline = build_pipeline(&config).await?;
            let cancel = shutdown_token();
            scheduler::run_scheduled(&pipeline, config.interval(), cancel).await;
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received; stopping after the current source"),
            Err(e) => error!(error = %e, "Could not listen for Ctrl-C"),
        }
        trigger.cancel();
    });
    token
}

async fn build_pipeline(config: &SpiderConfig) -> Result<Pipeline<HttpFetcher, LlmClient>, Box<dyn Error>> {
    // Early check: ensure data dir is writable
    if let Err(e) = ensure_writable_dir(&config.data_dir).await {
        error!(
            path = %config.data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = HttpFetcher::new(&config.fetch)?;
    let enricher = if config.enrichment.enabled {
        match build_enricher(&config.enrichment).await {
            Ok(enricher) => Some(enricher),
            Err(e) => {
                warn!(error = %e, "Could not load LLM configuration; classified sources will be skipped");
                None
            }
        }
    } else {
        info!("Enrichment disabled; classified sources will be skipped");
        None
    };

    let pipeline = Pipeline::new(
        fetcher,
        enricher,
        config.sources.clone(),
        config.working_path(),
        config.canonical_path(),
    );
    pipeline.prepare().await?;
    info!(
        working = %pipeline.working_path().display(),
        canonical = %pipeline.canonical_path().display(),
        "Dataset ready"
    );
    Ok(pipeline)
}

async fn build_enricher(cfg: &EnrichmentConfig) -> Result<Enricher<LlmClient>, Box<dyn Error>> {
    let conf_file: PathBuf = match &cfg.llm_config {
        Some(path) => path.clone(),
        None => config_dir()?.join("config.yaml"),
    };
    let config_path = conf_file.to_str().ok_or("LLM config path is not valid UTF-8")?;
    let llm_config = Arc::new(aj_config::load_config(config_path)?);
    info!(config_path, "Loaded LLM configuration");

    let summary_template = template::load_template(&cfg.summary_template).await?;
    let classifier_template = template::load_template(&cfg.classifier_template).await?;
    info!(
        summary = %cfg.summary_template,
        classifier = %cfg.classifier_template,
        "Loaded templates"
    );

    let summarizer = RetryAsk::new(
        AjClient::new(Arc::clone(&llm_config), summary_template, &cfg.summary_template),
        cfg.max_retries,
        Duration::from_secs(1),
    );
    let classifier = RetryAsk::new(
        AjClient::new(llm_config, classifier_template, &cfg.classifier_template),
        cfg.max_retries,
        Duration::from_secs(1),
    );
    Ok(Enricher::new(
        summarizer,
        classifier,
        EnrichOptions {
            concurrency: cfg.concurrency,
            min_summary_words: cfg.min_summary_words,
            max_summary_words: cfg.max_summary_words,
        },
    ))
}

async fn run_ticker(config: &SpiderConfig, delay: Duration, limit: Option<usize>) -> Result<(), Box<dyn Error>> {
    let path = config.canonical_path();
    let mut ticker = TickerState::load(&path)?;
    if ticker.is_empty() {
        warn!(path = %path.display(), "Dataset is empty; nothing to show");
        return Ok(());
    }
    info!(path = %path.display(), count = ticker.len(), "Ticker loaded");
    debug!(marquee = %truncate_for_log(&ticker.marquee(), 300), "Ticker contents");

    let cancel = shutdown_token();
    let mut shown = 0usize;
    while let Some(record) = ticker.current() {
        println!("{}", record.headline());
        if let Some(url) = ticker.current_url() {
            println!("    {url}");
        }
        shown += 1;
        if limit.is_some_and(|l| shown >= l) {
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        ticker.next();
    }
    Ok(())
}
