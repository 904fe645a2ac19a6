//! Error types for each stage of a harvest cycle.
//!
//! Every stage has its own error so a failed source can be reported with
//! the stage that broke it. [`SourceError`] wraps all of them; a cycle
//! records one per failed source and moves on to the next.

use thiserror::Error;

/// Failure to retrieve a source page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// The page no longer has the structure a parsing rule expects.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("{source_id} item {index} is missing required field `{field}`")]
    MissingField {
        source_id: &'static str,
        field: &'static str,
        index: usize,
    },
}

/// Summarization or classification could not produce a usable result.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment is not available: {0}")]
    Unavailable(String),

    #[error("model call failed: {0}")]
    Model(String),

    #[error("model returned an empty summary")]
    EmptySummary,

    #[error("malformed classification response: {0}")]
    Malformed(String),

    #[error("classification scored none of the candidate labels")]
    NoCandidate,
}

/// Dataset file could not be read, written or swapped into place.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not swap dataset into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("dataset header {0:?} does not name the Date, Summary, Final Label and URL columns")]
    Header(String),

    #[error("dataset task did not finish: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Why a single source produced nothing this cycle.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl SourceError {
    /// Short stage name used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            SourceError::Fetch(_) => "fetch",
            SourceError::Extraction(_) => "extract",
            SourceError::Enrichment(_) => "enrich",
            SourceError::Write(_) => "write",
        }
    }
}
