//! Test doubles for the network and model seams.

use crate::api::AskAsync;
use crate::enrich::{EnrichOptions, Enricher};
use crate::error::FetchError;
use crate::fetcher::Fetch;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every prompt with the output of a fixed function.
#[derive(Debug)]
pub struct Scripted {
    reply: fn(&str) -> Result<String, String>,
    pub calls: AtomicUsize,
}

impl Scripted {
    pub fn new(reply: fn(&str) -> Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AskAsync for Scripted {
    type Response = String;

    async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(text).map_err(|e| e.into())
    }
}

pub fn echo_summary(text: &str) -> Result<String, String> {
    Ok(format!("\"Summary of {text}\""))
}

pub fn cyber_security_wins(_: &str) -> Result<String, String> {
    Ok(r#"{"labels": ["technology", "cyber security", "business", "finance"], "scores": [0.2, 0.7, 0.05, 0.05]}"#.to_string())
}

pub fn model_down(_: &str) -> Result<String, String> {
    Err("connection refused".to_string())
}

/// Enricher that summarizes by echoing and always picks "cyber security".
pub fn working_enricher() -> Enricher<Scripted> {
    Enricher::new(
        Scripted::new(echo_summary),
        Scripted::new(cyber_security_wins),
        EnrichOptions::default(),
    )
}

/// Serves fixed pages by URL; unknown URLs fail with a transport error.
#[derive(Debug, Default)]
pub struct StaticPages {
    pages: HashMap<String, Result<String, u16>>,
    pub requests: Mutex<Vec<String>>,
}

impl StaticPages {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), Err(status));
        self
    }
}

impl Fetch for StaticPages {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        match self.pages.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::Transport {
                url: url.to_string(),
                message: "simulated network failure".to_string(),
            }),
        }
    }
}

pub const HACKERNEWS_PAGE: &str = r#"<html><body>
<div class="body-post clear"><a href="https://thehackernews.com/2025/05/a.html"><h2>Zero-day in mail gateway</h2>
<div class="item-label"><span class="h-datetime">May 06, 2025</span></div></a></div>
<div class="body-post clear"><a href="https://thehackernews.com/2025/05/b.html"><h2>Ransomware gang rebrands</h2>
<div class="item-label"><span class="h-datetime">May 05, 2025</span></div></a></div>
</body></html>"#;

pub const CYBER_GOV_PAGE: &str = r#"<html><body>
<a class="card--alert flex" href="/about-us/news/advisory-1"><header>12 May 2025</header><p>Malicious actors are exploiting edge devices.</p></a>
</body></html>"#;

pub const AFP_PAGE: &str = r#"<html><body>
<div class="node--type-article"><a href="/news-centre/media-release/scam"><div class="card--date">6 May 2025</div>
<div class="field--name-node-title">Scam call centre dismantled</div></a></div>
<div class="node--type-article"><a href="/news-centre/media-release/arrest"><div class="card--date">5 May 2025</div>
<div class="field--name-node-title">Arrest over data theft</div></a></div>
<div class="node--type-article"><a href="/news-centre/media-release/warning"><div class="card--date">4 May 2025</div>
<div class="field--name-node-title">Warning on fake investment sites</div></a></div>
</body></html>"#;
