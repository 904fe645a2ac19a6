//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock setup: three sources, a 24 hour interval, and the dataset under
//! `~/BlackBoomerang`.
//!
//! ```yaml
//! data_dir: /var/lib/boomerang
//! interval_hours: 12
//! fetch:
//!   timeout_secs: 20
//!   retries: 1
//! enrichment:
//!   concurrency: 2
//! ```

use crate::error::ConfigError;
use crate::scrapers::{SourceKind, SourceSpec};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpiderConfig {
    /// Directory holding both dataset files.
    pub data_dir: PathBuf,
    /// File appended to on every successful batch.
    pub working_file: String,
    /// File the ticker reads; replaced atomically after each cycle.
    pub canonical_file: String,
    /// Pause between the end of one cycle and the start of the next.
    pub interval_hours: u64,
    pub fetch: FetchConfig,
    pub sources: Vec<SourceSpec>,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Extra attempts after the first failure. Zero means no retry.
    pub retries: usize,
    pub retry_base_delay_ms: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// `awful_aj` config file; defaults to `config.yaml` in its config dir.
    pub llm_config: Option<PathBuf>,
    pub summary_template: String,
    pub classifier_template: String,
    /// How many records are summarized and classified at once.
    pub concurrency: usize,
    pub max_retries: usize,
    pub min_summary_words: usize,
    pub max_summary_words: usize,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            working_file: "final_new.csv".to_string(),
            canonical_file: "news.csv".to_string(),
            interval_hours: 24,
            fetch: FetchConfig::default(),
            sources: SourceKind::ALL.iter().map(|k| SourceSpec::new(*k)).collect(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 0,
            retry_base_delay_ms: 1000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            llm_config: None,
            summary_template: "cyber_summary".to_string(),
            classifier_template: "cyber_classifier".to_string(),
            concurrency: 4,
            max_retries: 5,
            min_summary_words: 10,
            max_summary_words: 30,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("BlackBoomerang")
}

impl SpiderConfig {
    /// Load from `path`, or return the defaults when no path is given.
    #[instrument(level = "info", skip_all)]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), sources = config.sources.len(), "Loaded spider configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        config.enrichment.validate()?;
        Ok(config)
    }

    pub fn working_path(&self) -> PathBuf {
        self.data_dir.join(&self.working_file)
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.data_dir.join(&self.canonical_file)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(3600))
    }
}

impl EnrichmentConfig {
    /// Reject word bounds and concurrency that would produce empty
    /// summaries or stall the batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_summary_words == 0 {
            return Err(ConfigError::Invalid {
                field: "enrichment.max_summary_words",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_summary_words > self.max_summary_words {
            return Err(ConfigError::Invalid {
                field: "enrichment.min_summary_words",
                reason: format!(
                    "{} exceeds max_summary_words ({})",
                    self.min_summary_words, self.max_summary_words
                ),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "enrichment.concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
