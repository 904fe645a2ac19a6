//! LLM API interaction with exponential backoff retry logic.
//!
//! The enrichment step talks to an OpenAI-compatible model through the
//! `awful_aj` client. Calls go through a small trait stack:
//! - [`AskAsync`]: core trait defining async LLM interaction
//! - [`AjClient`]: one chat template bound to a loaded `awful_aj` config
//! - [`RetryAsk`]: decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Exponential backoff starting at `base_delay`
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Trait for async LLM interaction.
///
/// Implementors send text to a model and return its reply. Decorators such
/// as [`RetryAsk`] and test doubles implement it too.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Delay before retry number `attempt` (1-based), without jitter.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay)
/// ```
pub fn backoff_delay(attempt: usize, base_delay: StdDuration, max_delay: StdDuration) -> StdDuration {
    let shift = attempt.saturating_sub(1).min(31) as u32;
    base_delay.saturating_mul(1u32 << shift).min(max_delay)
}

/// [`backoff_delay`] plus 0-250ms of random jitter.
pub fn jittered_backoff(attempt: usize, base_delay: StdDuration, max_delay: StdDuration) -> StdDuration {
    let jitter_ms: u64 = rng().random_range(0..=250);
    backoff_delay(attempt, base_delay, max_delay) + StdDuration::from_millis(jitter_ms)
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Create a new retry wrapper around an existing [`AskAsync`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = AjClient::new(config, template);
    /// let retry_client = RetryAsk::new(client, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = jittered_backoff(attempt, self.base_delay, self.max_delay);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// An `awful_aj` config paired with one chat template.
///
/// The template's system prompt decides the task (summarize, classify);
/// the same config can back several clients.
pub struct AjClient {
    config: Arc<AwfulJadeConfig>,
    template: ChatTemplate,
    name: String,
}

impl AjClient {
    pub fn new(config: Arc<AwfulJadeConfig>, template: ChatTemplate, name: impl Into<String>) -> Self {
        Self {
            config,
            template,
            name: name.into(),
        }
    }
}

impl fmt::Debug for AjClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjClient").field("template", &self.name).finish()
    }
}

impl AskAsync for AjClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(template = %self.name))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = ask(&self.config, text.to_string(), &self.template, None, None).await;
        let dt = t0.elapsed();

        if let Err(e) = &res {
            warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "API call failed");
        }
        res
    }
}
