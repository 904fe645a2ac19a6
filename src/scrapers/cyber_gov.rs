//! cyber.gov.au news and media listing scraper.
//!
//! Every entry is an `a.card--alert` anchor: the anchor's own `href` is the
//! article link, its `header` carries the date and its first `p` the teaser
//! text. The teaser is the input to summarization, so a card without one
//! means the layout changed and the whole page is rejected.
//!
//! Records leave this module with an empty label; the pipeline fills it in
//! from the classifier before anything is written.

use super::{element_text, first_text, resolve_href, selector};
use crate::error::ExtractionError;
use crate::models::NewsRecord;
use crate::utils::clean_text;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

#[instrument(level = "debug", skip_all)]
pub fn extract(html: &str, base: Option<&Url>) -> Result<Vec<NewsRecord>, ExtractionError> {
    let card_sel = selector("a.card--alert")?;
    let body_sel = selector("p")?;
    let date_sel = selector("header")?;

    let document = Html::parse_document(html);
    let mut records = Vec::new();
    for (index, card) in document.select(&card_sel).enumerate() {
        let body = card
            .select(&body_sel)
            .next()
            .map(element_text)
            .and_then(|t| clean_text(&t))
            .ok_or(ExtractionError::MissingField {
                source_id: "cyber-gov",
                field: "summary",
                index,
            })?;
        let url = card.value().attr("href").and_then(|h| resolve_href(h, base));
        let date = first_text(card, &date_sel);
        records.push(NewsRecord::new(Some(body.as_str()), url, date.as_deref(), String::new()));
    }

    debug!(count = records.len(), "Extracted cyber.gov.au items");
    Ok(records)
}
