//! Australian Federal Police news centre scraper.
//!
//! Articles are `div.node--type-article` teasers with a
//! `.field--name-node-title` headline, a site-relative link and a
//! `.card--date` date line. Missing pieces are stored as empty cells.

use super::{FIXED_LABEL, first_link, first_text, selector};
use crate::error::ExtractionError;
use crate::models::NewsRecord;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

#[instrument(level = "debug", skip_all)]
pub fn extract(html: &str, base: Option<&Url>) -> Result<Vec<NewsRecord>, ExtractionError> {
    let item_sel = selector("div.node--type-article")?;
    let title_sel = selector("div.field--name-node-title")?;
    let link_sel = selector("a[href]")?;
    let date_sel = selector("div.card--date")?;

    let document = Html::parse_document(html);
    let records: Vec<NewsRecord> = document
        .select(&item_sel)
        .map(|item| {
            NewsRecord::new(
                first_text(item, &title_sel).as_deref(),
                first_link(item, &link_sel, base),
                first_text(item, &date_sel).as_deref(),
                FIXED_LABEL,
            )
        })
        .collect();

    debug!(count = records.len(), "Extracted AFP items");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body><div class="view-content">
  <div class="node node--type-article node--view-mode-card">
    <a href="/news-centre/media-release/man-charged-over-phishing-scam">
      <div class="card--date">Tuesday, 6 May 2025</div>
      <div class="field field--name-node-title"><h3>Man charged over
        phishing scam</h3></div>
    </a>
  </div>
  <div class="node node--type-article node--view-mode-card">
    <div class="field field--name-node-title">Scam warning issued</div>
  </div>
  <div class="node node--type-page">
    <div class="field field--name-node-title">Not an article</div>
  </div>
</div></body></html>
"#;

    fn base() -> Url {
        Url::parse("https://www.afp.gov.au/news-centre").unwrap()
    }

    #[test]
    fn test_extracts_articles_only() {
        let records = extract(PAGE, Some(&base())).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.label == "cyber"));
    }

    #[test]
    fn test_full_item_fields() {
        let records = extract(PAGE, Some(&base())).unwrap();
        assert_eq!(records[0].summary.as_deref(), Some("Man charged over phishing scam"));
        assert_eq!(
            records[0].url.as_deref(),
            Some("https://www.afp.gov.au/news-centre/media-release/man-charged-over-phishing-scam")
        );
        assert_eq!(records[0].date.as_deref(), Some("Tuesday, 6 May 2025"));
    }

    #[test]
    fn test_missing_link_and_date() {
        let records = extract(PAGE, Some(&base())).unwrap();
        assert_eq!(records[1].summary.as_deref(), Some("Scam warning issued"));
        assert_eq!(records[1].url, None);
        assert_eq!(records[1].date, None);
    }
}
