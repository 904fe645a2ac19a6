//! One harvest cycle: fetch, extract, enrich and append, source by source.
//!
//! Sources run strictly one after another. A failing source is logged and
//! recorded in the [`CycleReport`]; the remaining sources still run. Once
//! every source has been tried the working dataset is published as the
//! canonical snapshot.

use crate::api::AskAsync;
use crate::enrich::Enricher;
use crate::error::{EnrichmentError, SourceError, WriteError};
use crate::fetcher::Fetch;
use crate::outputs::dataset::{append_records, ensure_dataset, publish_snapshot};
use crate::scrapers::{SourceKind, SourceSpec};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Result of one source within a cycle.
#[derive(Debug)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub url: String,
    pub result: Result<usize, SourceError>,
}

/// Everything that happened during one cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Local>,
    pub sources: Vec<SourceReport>,
    /// Bytes published to the canonical path, `None` if no publish was attempted.
    pub published: Option<Result<u64, WriteError>>,
    pub cancelled: bool,
}

impl CycleReport {
    pub fn records_written(&self) -> usize {
        self.sources.iter().filter_map(|s| s.result.as_ref().ok()).sum()
    }

    pub fn failed_sources(&self) -> Vec<SourceKind> {
        self.sources
            .iter()
            .filter(|s| s.result.is_err())
            .map(|s| s.kind)
            .collect()
    }

    /// No source failed and the snapshot was published.
    pub fn is_success(&self) -> bool {
        !self.cancelled
            && self.failed_sources().is_empty()
            && matches!(self.published, Some(Ok(_)))
    }
}

pub struct Pipeline<F, A> {
    fetcher: F,
    enricher: Option<Enricher<A>>,
    sources: Vec<SourceSpec>,
    working: PathBuf,
    canonical: PathBuf,
}

impl<F, A> Pipeline<F, A>
where
    F: Fetch,
    A: AskAsync<Response = String>,
{
    pub fn new(
        fetcher: F,
        enricher: Option<Enricher<A>>,
        sources: Vec<SourceSpec>,
        working: PathBuf,
        canonical: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            enricher,
            sources,
            working,
            canonical,
        }
    }

    pub fn working_path(&self) -> &Path {
        &self.working
    }

    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    /// First-run bootstrap: seed the working dataset and publish it if the
    /// canonical snapshot is missing. Existing files are left alone.
    #[instrument(level = "info", skip_all)]
    pub async fn prepare(&self) -> Result<(), WriteError> {
        let (working, canonical) = (self.working.clone(), self.canonical.clone());
        blocking(move || {
            if ensure_dataset(&working)? {
                info!(path = %working.display(), "Working dataset created from seed");
            }
            if !canonical.exists() {
                publish_snapshot(&working, &canonical)?;
            }
            Ok(())
        })
        .await
    }

    /// Fetch, extract, enrich and append a single source.
    #[instrument(level = "info", skip_all, fields(source = %spec.kind, url = %spec.url))]
    pub async fn run_source(&self, spec: &SourceSpec) -> Result<usize, SourceError> {
        let html = self.fetcher.fetch(&spec.url).await?;
        let mut records = spec.kind.extract(&html, &spec.url)?;
        info!(count = records.len(), "Extracted records");

        if spec.kind.needs_enrichment() && !records.is_empty() {
            let enricher = self.enricher.as_ref().ok_or_else(|| {
                EnrichmentError::Unavailable("no summarization model configured".to_string())
            })?;
            records = enricher.enrich_batch(records).await?;
        }

        let working = self.working.clone();
        Ok(blocking(move || append_records(&working, &records)).await?)
    }

    /// Run every configured source once, then publish the snapshot.
    ///
    /// Cancellation is checked before each source; a cancelled cycle does
    /// not publish.
    #[instrument(level = "info", skip_all)]
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let t0 = Instant::now();
        let mut report = CycleReport {
            started_at: Local::now(),
            sources: Vec::with_capacity(self.sources.len()),
            published: None,
            cancelled: false,
        };
        info!(sources = self.sources.len(), "Cycle starting");

        for spec in &self.sources {
            if cancel.is_cancelled() {
                warn!("Cycle cancelled before all sources ran");
                report.cancelled = true;
                return report;
            }
            let result = self.run_source(spec).await;
            match &result {
                Ok(count) => info!(source = %spec.kind, count, "Source stored"),
                Err(e) => error!(source = %spec.kind, stage = e.stage(), error = %e, "Source skipped this cycle"),
            }
            report.sources.push(SourceReport {
                kind: spec.kind,
                url: spec.url.clone(),
                result,
            });
        }

        if self.working.exists() {
            let (working, canonical) = (self.working.clone(), self.canonical.clone());
            let published = blocking(move || publish_snapshot(&working, &canonical)).await;
            if let Err(e) = &published {
                error!(error = %e, "Failed to publish dataset snapshot");
            }
            report.published = Some(published);
        } else {
            warn!(path = %self.working.display(), "No working dataset to publish");
        }

        info!(
            written = report.records_written(),
            failed = report.failed_sources().len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Cycle complete"
        );
        report
    }
}

/// Run synchronous dataset I/O on the blocking pool.
async fn blocking<T, J>(job: J) -> Result<T, WriteError>
where
    J: FnOnce() -> Result<T, WriteError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job).await?
}
