// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::errors::{Result, ScrapeError};
use crate::model::Namespace;

/// Retrieval client tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Minimum spacing between the starts of two consecutive requests.
    pub min_interval_ms: u64,
    pub max_attempts: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            min_interval_ms: REQUEST_INTERVAL_MS,
            max_attempts: MAX_ATTEMPTS,
            timeout_secs: HTTP_TIMEOUT_SECS,
            user_agent: s!(USER_AGENT),
        }
    }
}

impl FetchOptions {
    pub fn min_interval(&self) -> Duration { Duration::from_millis(self.min_interval_ms) }
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

/// Whether a pass may create records for IDs it has not seen before.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// `upsert`: unknown IDs become new records.
    Create,
    /// Only enrich records already admitted by an earlier pass.
    ExistingOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassOptions {
    /// Persist after this many completed pages (and always at the end).
    pub checkpoint_every: usize,
    /// Skip this many leading pages (resume after an interrupted run).
    pub start_at: usize,
    pub admission: Admission,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            checkpoint_every: CHECKPOINT_EVERY,
            start_at: 0,
            admission: Admission::Create,
        }
    }
}

/// Runtime configuration for the whole pipeline. Loaded from an optional JSON
/// file; any missing key falls back to its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub store_dir: PathBuf,
    pub output: PathBuf,
    pub canonical_map: PathBuf,
    pub fetch: FetchOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(STORE_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            canonical_map: PathBuf::from(DEFAULT_CANONICAL_MAP),
            fetch: FetchOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Missing file → defaults. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| ScrapeError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `players_<ns>.json`: raw index listing produced by step 1.
    pub fn list_path(&self, ns: Namespace) -> PathBuf {
        self.store_dir.join(join!("players_", ns.file_tag(), ".json"))
    }

    /// `players_index_<ns>.json`: step 1's partial index, checkpointed per page.
    pub fn index_path(&self, ns: Namespace) -> PathBuf {
        self.store_dir.join(join!("players_index_", ns.file_tag(), ".json"))
    }

    /// `players_db_<ns>.json`: per-namespace database snapshot.
    pub fn db_path(&self, ns: Namespace) -> PathBuf {
        self.store_dir.join(join!("players_db_", ns.file_tag(), ".json"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.store_dir.join(LOG_FILE)
    }
}
