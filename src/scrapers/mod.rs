//! Per-site parsing rules that turn a listing page into [`NewsRecord`]s.
//!
//! Each source is a [`SourceKind`] variant with its own module holding the
//! selectors for that site. Adding a source means adding one variant and one
//! module; [`SourceKind::extract`] is the only dispatch point.
//!
//! # Supported Sources
//!
//! | Source | Module | Label | Missing fields |
//! |--------|--------|-------|----------------|
//! | The Hacker News | [`hackernews`] | `cyber` | null-filled |
//! | cyber.gov.au news | [`cyber_gov`] | classified | card text required |
//! | AFP news centre | [`afp`] | `cyber` | null-filled |
//!
//! A page whose item selector matches nothing yields an empty batch, not an
//! error.

use crate::error::ExtractionError;
use crate::models::NewsRecord;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub mod afp;
pub mod cyber_gov;
pub mod hackernews;

/// Label stamped on records from sources that are not classified.
pub const FIXED_LABEL: &str = "cyber";

/// The fixed set of scraped sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SourceKind {
    #[serde(rename = "hackernews")]
    HackerNews,
    #[serde(rename = "cyber-gov")]
    CyberGov,
    #[serde(rename = "afp")]
    Afp,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::HackerNews, SourceKind::CyberGov, SourceKind::Afp];

    /// Stable identifier used in logs and config.
    pub fn id(self) -> &'static str {
        match self {
            SourceKind::HackerNews => "hackernews",
            SourceKind::CyberGov => "cyber-gov",
            SourceKind::Afp => "afp",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            SourceKind::HackerNews => "https://thehackernews.com/",
            SourceKind::CyberGov => "https://www.cyber.gov.au/about-us/view-all-content/news-and-media",
            SourceKind::Afp => "https://www.afp.gov.au/news-centre",
        }
    }

    /// Constant label for unclassified sources, `None` for classified ones.
    pub fn fixed_label(self) -> Option<&'static str> {
        match self {
            SourceKind::HackerNews | SourceKind::Afp => Some(FIXED_LABEL),
            SourceKind::CyberGov => None,
        }
    }

    /// Whether records must be summarized and classified before they are stored.
    pub fn needs_enrichment(self) -> bool {
        self.fixed_label().is_none()
    }

    /// Run this source's parsing rule over a fetched page.
    ///
    /// `page_url` is the address the page was fetched from; relative links
    /// are resolved against it.
    pub fn extract(self, html: &str, page_url: &str) -> Result<Vec<NewsRecord>, ExtractionError> {
        let base = Url::parse(page_url).ok();
        match self {
            SourceKind::HackerNews => hackernews::extract(html, base.as_ref()),
            SourceKind::CyberGov => cyber_gov::extract(html, base.as_ref()),
            SourceKind::Afp => afp::extract(html, base.as_ref()),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One configured source: which rule to apply and where to fetch from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceSpec {
    pub kind: SourceKind,
    pub url: String,
}

impl SourceSpec {
    /// The source at its stock address.
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            url: kind.default_url().to_string(),
        }
    }
}

/// Compile a selector, reporting failures as [`ExtractionError::Selector`].
pub(crate) fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Concatenated text of the first descendant matching `sel`.
pub(crate) fn first_text(item: ElementRef<'_>, sel: &Selector) -> Option<String> {
    item.select(sel).next().map(element_text)
}

/// Text content of an element, pieces separated by spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// `href` of the first descendant matching `sel`, made absolute.
pub(crate) fn first_link(item: ElementRef<'_>, sel: &Selector, base: Option<&Url>) -> Option<String> {
    item.select(sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_href(href, base))
}

/// Resolve `href` against `base`; absolute hrefs pass through.
pub(crate) fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }
    base.and_then(|b| b.join(href).ok()).map(|u| u.to_string())
}
