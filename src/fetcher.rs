//! Page retrieval.
//!
//! [`Fetch`] is the seam between the pipeline and the network: production
//! code uses [`HttpFetcher`], tests substitute canned pages. A fetch either
//! returns the page body or a [`FetchError`]; there is no caching.

use crate::api::jittered_backoff;
use crate::config::FetchConfig;
use crate::error::FetchError;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

pub trait Fetch {
    /// GET `url` and return the body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher with an explicit timeout and optional retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    retries: usize,
    retry_base_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            retries: config.retries,
            retry_base_delay: config.retry_base_delay(),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| FetchError::from_reqwest(url, e))
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let mut attempt = 0usize;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched page");
                    return Ok(body);
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    let delay = jittered_backoff(attempt, self.retry_base_delay, Duration::from_secs(30));
                    warn!(attempt, max = self.retries, ?delay, error = %e, "Fetch failed; backing off");
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
