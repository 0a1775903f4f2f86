// src/scrape/extract.rs
use thiserror::Error;

use crate::model::Observation;

/// `(entity_key, observations)` pulled from one document.
pub type Extracted = (String, Observation);

/// The document did not have the expected shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ExtractError(pub String);

/// Turns one fetched document into entity observations.
/// Implementations must be pure: same document in, same tuples out.
pub trait Extractor {
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Result<Vec<Extracted>, ExtractError>,
{
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError> {
        self(doc)
    }
}

/// One entry of a pass's page enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Human-readable key for reports (`"B"`, `"crd #12"`, `"Michigan"`).
    pub key: String,
    pub url: String,
    /// Observations implied by the page itself, folded into every tuple.
    pub implied: Observation,
}

impl Page {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self { key: key.into(), url: url.into(), implied: Observation::default() }
    }

    pub fn implying(mut self, implied: Observation) -> Self {
        self.implied = implied;
        self
    }
}
