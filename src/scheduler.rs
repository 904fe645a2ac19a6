//! Periodic re-run of the harvest cycle.
//!
//! The timer is rearmed only after a cycle finishes, so a slow cycle pushes
//! every later one back by its overrun. Cancelling the token stops the loop
//! between sources or during the pause.

use crate::api::AskAsync;
use crate::fetcher::Fetch;
use crate::pipeline::Pipeline;
use chrono::{Local, TimeDelta};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Run cycles until `cancel` fires. Returns the number of completed cycles.
#[instrument(level = "info", skip_all, fields(interval_secs = interval.as_secs()))]
pub async fn run_scheduled<F, A>(pipeline: &Pipeline<F, A>, interval: Duration, cancel: CancellationToken) -> usize
where
    F: Fetch,
    A: AskAsync<Response = String>,
{
    let mut completed = 0usize;
    loop {
        let report = pipeline.run_cycle(&cancel).await;
        if report.cancelled {
            break;
        }
        completed += 1;
        if !report.is_success() {
            warn!(
                cycle = completed,
                started_at = %report.started_at.format("%Y-%m-%d %H:%M:%S"),
                failed = ?report.failed_sources(),
                "Cycle finished with failures; retrying next cycle"
            );
        }

        if let Ok(delta) = TimeDelta::from_std(interval) {
            info!(next_run = %(Local::now() + delta).format("%Y-%m-%d %H:%M:%S"), "Sleeping until next cycle");
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }
    }
    info!(completed, "Scheduler stopped");
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::dataset::read_records;
    use crate::scrapers::{SourceKind, SourceSpec};
    use crate::testing::{AFP_PAGE, Scripted, StaticPages, working_enricher};

    fn afp_only(dir: &std::path::Path) -> Pipeline<StaticPages, Scripted> {
        Pipeline::new(
            StaticPages::default().with_page(SourceKind::Afp.default_url(), AFP_PAGE),
            Some(working_enricher()),
            vec![SourceSpec::new(SourceKind::Afp)],
            dir.join("final_new.csv"),
            dir.join("news.csv"),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearms_after_each_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = afp_only(dir.path());
        let cancel = CancellationToken::new();

        let stopper = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                // Three full intervals plus change: cycles start at t=0, 10, 20, 30.
                sleep(Duration::from_secs(35)).await;
                cancel.cancel();
            })
        };

        let completed = run_scheduled(&pipeline, Duration::from_secs(10), cancel).await;
        stopper.await.unwrap();
        assert_eq!(completed, 4);
        assert_eq!(read_records(pipeline.canonical_path()).unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = afp_only(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let completed = run_scheduled(&pipeline, Duration::from_secs(3600), cancel).await;
        assert_eq!(completed, 0);
        assert!(!pipeline.working_path().exists());
    }
}
