//! Read side of the dataset: the rotating news ticker's state.
//!
//! The ticker loads the canonical snapshot once and steps through it; it does
//! not see rows published after it started.

use crate::error::WriteError;
use crate::models::NewsRecord;
use crate::outputs::dataset::read_records;
use itertools::Itertools;
use std::path::Path;

/// Separator placed between headlines in the scrolling marquee.
pub const MARQUEE_SEPARATOR: &str = " *** ";

#[derive(Debug, Clone, Default)]
pub struct TickerState {
    records: Vec<NewsRecord>,
    index: usize,
}

impl TickerState {
    pub fn new(records: Vec<NewsRecord>) -> Self {
        Self { records, index: 0 }
    }

    pub fn load(path: &Path) -> Result<Self, WriteError> {
        Ok(Self::new(read_records(path)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record currently on display.
    pub fn current(&self) -> Option<&NewsRecord> {
        self.records.get(self.index)
    }

    /// Advance to the following record, wrapping after the last one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&NewsRecord> {
        if self.records.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.records.len();
        self.current()
    }

    /// URL of the record on display.
    pub fn current_url(&self) -> Option<&str> {
        self.current().and_then(|r| r.url.as_deref())
    }

    /// All summaries joined into one scrolling line.
    pub fn marquee(&self) -> String {
        self.records
            .iter()
            .filter_map(|r| r.summary.as_deref())
            .join(MARQUEE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::dataset::append_records;

    fn records() -> Vec<NewsRecord> {
        vec![
            NewsRecord::new(Some("First"), Some("https://a.test/1".to_string()), None, "cyber"),
            NewsRecord::new(None, None, None, "cyber"),
            NewsRecord::new(Some("Third"), Some("https://a.test/3".to_string()), None, "finance"),
        ]
    }

    #[test]
    fn test_next_wraps() {
        let mut ticker = TickerState::new(records());
        assert_eq!(ticker.current_url(), Some("https://a.test/1"));
        assert_eq!(ticker.next().and_then(|r| r.summary.as_deref()), None);
        assert_eq!(ticker.next().and_then(|r| r.summary.as_deref()), Some("Third"));
        assert_eq!(ticker.next().and_then(|r| r.summary.as_deref()), Some("First"));
    }

    #[test]
    fn test_empty_ticker() {
        let mut ticker = TickerState::default();
        assert!(ticker.is_empty());
        assert!(ticker.current().is_none());
        assert!(ticker.next().is_none());
        assert_eq!(ticker.marquee(), "");
    }

    #[test]
    fn test_marquee_skips_blank_summaries() {
        let ticker = TickerState::new(records());
        assert_eq!(ticker.marquee(), "First *** Third");
    }

    #[test]
    fn test_load_from_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.csv");
        append_records(&path, &records()).unwrap();

        let ticker = TickerState::load(&path).unwrap();
        assert_eq!(ticker.len(), 3);
        assert_eq!(ticker.current().map(|r| r.label.as_str()), Some("cyber"));
    }
}
