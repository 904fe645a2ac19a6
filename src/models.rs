//! Data models shared by the scrapers, the enricher and the dataset writer.
//!
//! - [`NewsRecord`]: one normalized news item, exactly one row of the dataset
//! - [`ClassificationResult`]: zero-shot classifier output as returned by the model
//!
//! Serde renames on [`NewsRecord`] fix the on-disk header to
//! `Date,Summary,Final Label,URL`.

use crate::utils::clean_text;
use serde::{Deserialize, Serialize};

/// A single news item as persisted in the dataset.
///
/// Every record has all four fields. A value the page did not provide is
/// `None` and is written as an empty CSV cell, so the table stays rectangular.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    /// Publication date or time as printed on the page.
    #[serde(rename = "Date")]
    pub date: Option<String>,
    /// Headline, or the synthesized summary for enriched sources.
    #[serde(rename = "Summary")]
    pub summary: Option<String>,
    /// Category tag.
    #[serde(rename = "Final Label")]
    pub label: String,
    /// Absolute link to the article.
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

impl NewsRecord {
    /// Build a record from raw page text.
    ///
    /// Every text field goes through [`clean_text`], so newlines never reach
    /// the dataset and blank values become `None`.
    pub fn new(
        summary: Option<&str>,
        url: Option<String>,
        date: Option<&str>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            date: date.and_then(clean_text),
            summary: summary.and_then(clean_text),
            label: label.into(),
            url: url.as_deref().and_then(clean_text),
        }
    }

    /// One-line rendering used by the ticker and in logs.
    pub fn headline(&self) -> String {
        let summary = self.summary.as_deref().unwrap_or("(untitled)");
        match self.date.as_deref() {
            Some(date) => format!("[{}] {} ({})", self.label, summary, date),
            None => format!("[{}] {}", self.label, summary),
        }
    }
}

/// Output of a zero-shot classification call.
///
/// `labels[i]` was scored `scores[i]`. The model may return the labels in
/// any order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassificationResult {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_record_new_cleans_fields() {
        let record = NewsRecord::new(
            Some("  Patch now:\n critical\r\nflaw  "),
            Some("https://example.com/a".to_string()),
            Some("\n  May 6, 2025 "),
            "cyber",
        );
        assert_eq!(record.summary.as_deref(), Some("Patch now: critical flaw"));
        assert_eq!(record.date.as_deref(), Some("May 6, 2025"));
        assert_eq!(record.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(record.label, "cyber");
    }

    #[test]
    fn test_news_record_blank_fields_become_none() {
        let record = NewsRecord::new(Some("   "), None, Some(""), "cyber");
        assert_eq!(record.summary, None);
        assert_eq!(record.date, None);
        assert_eq!(record.url, None);
    }

    #[test]
    fn test_headline() {
        let record = NewsRecord::new(Some("Breach"), None, Some("Today"), "cyber");
        assert_eq!(record.headline(), "[cyber] Breach (Today)");

        let record = NewsRecord::new(None, None, None, "afp");
        assert_eq!(record.headline(), "[afp] (untitled)");
    }

    #[test]
    fn test_classification_result_deserialization() {
        let json = r#"{"labels": ["business", "cyber security"], "scores": [0.2, 0.8]}"#;
        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.labels.len(), 2);
        assert_eq!(result.scores[1], 0.8);
    }
}
