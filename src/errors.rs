// src/errors.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::model::Namespace;
use crate::pipeline::PassKind;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Retries exhausted for one URL. Callers decide whether to skip or abort.
    #[error("fetch failed for {url} after {attempts} attempts: {last}")]
    FetchFailed {
        url: String,
        attempts: u32,
        last: String,
    },

    /// The document did not have the shape the extractor expects.
    #[error("could not extract page {page}: {reason}")]
    Extraction { page: String, reason: String },

    /// A snapshot exists but does not parse. Never treated as empty.
    #[error("corrupt snapshot {}: {source}", path.display())]
    CorruptSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pass {kind:?} is not available for {namespace}")]
    UnsupportedPass { namespace: Namespace, kind: PassKind },

    #[error("could not build http client: {0}")]
    HttpClient(String),
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io { path: path.into(), source }
    }

    pub fn extraction(page: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::Extraction { page: page.into(), reason: reason.into() }
    }
}
