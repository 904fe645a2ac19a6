//! Summarization and zero-shot classification of cyber.gov.au items.
//!
//! Two model clients do the work, each an [`AskAsync`] bound to its own
//! chat template:
//!
//! 1. **Summarizer** rewrites the scraped teaser as a short summary,
//!    clamped to the configured word bounds.
//! 2. **Classifier** scores the teaser against [`CANDIDATE_LABELS`] and
//!    answers with `{"labels": [...], "scores": [...]}`. The record gets the
//!    highest-scoring candidate; on a tie the one listed first in
//!    [`CANDIDATE_LABELS`] wins.
//!
//! Records in a batch are processed `concurrency` at a time with their order
//! kept. Any failure fails the whole batch so no record is stored with a
//! label outside the candidate set.

use crate::api::AskAsync;
use crate::error::EnrichmentError;
use crate::models::{ClassificationResult, NewsRecord};
use crate::utils::{clamp_words, clean_text, truncate_for_log};
use futures::stream::{self, StreamExt, TryStreamExt};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// The fixed classification vocabulary, in tie-break order.
pub const CANDIDATE_LABELS: [&str; 4] = ["cyber security", "business", "finance", "technology"];

#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    pub concurrency: usize,
    pub min_summary_words: usize,
    pub max_summary_words: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            min_summary_words: 10,
            max_summary_words: 30,
        }
    }
}

/// Summarizer and classifier pair.
#[derive(Debug)]
pub struct Enricher<A> {
    summarizer: A,
    classifier: A,
    options: EnrichOptions,
}

impl<A> Enricher<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(summarizer: A, classifier: A, options: EnrichOptions) -> Self {
        Self {
            summarizer,
            classifier,
            options,
        }
    }

    /// Summarize and label every record, or fail the whole batch.
    #[instrument(level = "info", skip_all, fields(count = records.len()))]
    pub async fn enrich_batch(&self, records: Vec<NewsRecord>) -> Result<Vec<NewsRecord>, EnrichmentError> {
        let concurrency = self.options.concurrency.max(1);
        let enriched: Vec<NewsRecord> = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| async move {
                let result = self.enrich(record).await;
                if let Err(e) = &result {
                    warn!(index, error = %e, "Enrichment failed; dropping batch");
                }
                result
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        info!(count = enriched.len(), "Enriched batch");
        Ok(enriched)
    }

    /// Replace the record's text with a summary and set its label.
    pub async fn enrich(&self, record: NewsRecord) -> Result<NewsRecord, EnrichmentError> {
        let text = record.summary.clone().ok_or(EnrichmentError::EmptySummary)?;
        let summary = self.summarize(&text).await?;
        let label = self.classify(&text).await?;
        Ok(NewsRecord {
            summary: Some(summary),
            label: label.to_string(),
            ..record
        })
    }

    pub async fn summarize(&self, text: &str) -> Result<String, EnrichmentError> {
        let reply = self
            .summarizer
            .ask(text)
            .await
            .map_err(|e| EnrichmentError::Model(e.to_string()))?;
        let unquoted = reply.trim().trim_matches(|c: char| c == '"' || c == '\'');
        let summary = clean_text(unquoted).ok_or(EnrichmentError::EmptySummary)?;

        let words = summary.split_whitespace().count();
        if words < self.options.min_summary_words {
            debug!(words, min = self.options.min_summary_words, "Summary shorter than requested");
        }
        Ok(clamp_words(&summary, self.options.max_summary_words))
    }

    pub async fn classify(&self, text: &str) -> Result<&'static str, EnrichmentError> {
        let prompt = classification_prompt(text);
        let reply = self
            .classifier
            .ask(&prompt)
            .await
            .map_err(|e| EnrichmentError::Model(e.to_string()))?;
        let result = parse_classification(&reply)?;
        pick_label(&result)
    }
}

/// Prompt sent to the classifier: the candidate list, then the text.
pub fn classification_prompt(text: &str) -> String {
    format!(
        "Candidate labels: {}\n\nText:\n{}",
        CANDIDATE_LABELS.iter().join(", "),
        text
    )
}

/// Parse the classifier's JSON reply.
///
/// Models sometimes wrap JSON in a Markdown code fence; it is stripped first.
pub fn parse_classification(reply: &str) -> Result<ClassificationResult, EnrichmentError> {
    let body = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let result: ClassificationResult = serde_json::from_str(body).map_err(|e| {
        EnrichmentError::Malformed(format!("{e}: {}", truncate_for_log(body, 200)))
    })?;
    if result.labels.len() != result.scores.len() {
        return Err(EnrichmentError::Malformed(format!(
            "{} labels but {} scores",
            result.labels.len(),
            result.scores.len()
        )));
    }
    Ok(result)
}

/// Highest-scoring candidate label; ties go to the earlier candidate.
///
/// Labels outside [`CANDIDATE_LABELS`] and NaN scores are ignored.
pub fn pick_label(result: &ClassificationResult) -> Result<&'static str, EnrichmentError> {
    let mut best: Option<(&'static str, f64)> = None;
    for candidate in CANDIDATE_LABELS {
        let score = result
            .labels
            .iter()
            .zip(&result.scores)
            .filter(|(label, score)| label.trim().eq_ignore_ascii_case(candidate) && !score.is_nan())
            .map(|(_, score)| *score)
            .reduce(f64::max);
        if let Some(score) = score {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }
    }
    best.map(|(label, _)| label).ok_or(EnrichmentError::NoCandidate)
}
