//! The Hacker News front page scraper.
//!
//! Each story on [thehackernews.com](https://thehackernews.com/) is a
//! `div.body-post.clear` block holding an `h2` headline, an outbound link and
//! an `.item-label` bar with the publication date.
//!
//! Missing headline, link or date are stored as empty cells.

use super::{FIXED_LABEL, first_link, first_text, selector};
use crate::error::ExtractionError;
use crate::models::NewsRecord;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

#[instrument(level = "debug", skip_all)]
pub fn extract(html: &str, base: Option<&Url>) -> Result<Vec<NewsRecord>, ExtractionError> {
    let item_sel = selector("div.body-post.clear")?;
    let title_sel = selector("h2")?;
    let link_sel = selector("a[href]")?;
    let date_sel = selector(".item-label .h-datetime")?;

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

    debug!(count = records.len(), "Extracted Hacker News items");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
  <div class="blog-posts">
    <div class="body-post clear">
      <a class="story-link" href="https://thehackernews.com/2025/05/critical-flaw.html">
        <div class="clear home-right">
          <h2 class="home-title">Critical Flaw
            in VPN Appliance</h2>
          <div class="item-label">
            <span class="h-datetime">May 06, 2025</span>
            <span class="h-tags">Vulnerability</span>
          </div>
        </div>
      </a>
    </div>
    <div class="body-post clear">
      <a class="story-link" href="/2025/05/botnet.html">
        <h2 class="home-title">Botnet Takedown</h2>
        <div class="item-label"><span class="h-tags">Malware</span></div>
      </a>
    </div>
    <div class="body-post clear">
      <h2 class="home-title">Sponsored webinar</h2>
    </div>
  </div>
</body></html>
"#;

    fn base() -> Url {
        Url::parse("https://thehackernews.com/").unwrap()
    }

    #[test]
    fn test_extracts_every_item() {
        let records = extract(PAGE, Some(&base())).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.label == "cyber"));
    }

    #[test]
    fn test_full_item_fields() {
        let records = extract(PAGE, Some(&base())).unwrap();
        let first = &records[0];
        assert_eq!(first.summary.as_deref(), Some("Critical Flaw in VPN Appliance"));
        assert_eq!(
            first.url.as_deref(),
            Some("https://thehackernews.com/2025/05/critical-flaw.html")
        );
        assert_eq!(first.date.as_deref(), Some("May 06, 2025"));
    }

    #[test]
    fn test_missing_fields_are_null_filled() {
        let records = extract(PAGE, Some(&base())).unwrap();
        assert_eq!(
            records[1].url.as_deref(),
            Some("https://thehackernews.com/2025/05/botnet.html")
        );
        assert_eq!(records[1].date, None);
        assert_eq!(records[2].summary.as_deref(), Some("Sponsored webinar"));
        assert_eq!(records[2].url, None);
        assert_eq!(records[2].date, None);
    }

    #[test]
    fn test_no_items() {
        let records = extract("<html><body></body></html>", Some(&base())).unwrap();
        assert!(records.is_empty());
    }
}
