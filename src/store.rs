// src/store.rs
//! Entity database: one record per ID, persisted as a single JSON snapshot.
//!
//! Snapshots are written whole to a temp file in the target directory and
//! renamed over the previous one, so a kill mid-write leaves the old snapshot
//! intact. A missing snapshot loads as empty; an unreadable one is an error.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{Result, ScrapeError};
use crate::model::{EntityRecord, Namespace, Observation};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityDb {
    records: BTreeMap<String, EntityRecord>,
}

/// What an upsert did to the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    Unchanged,
}

impl EntityDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&EntityRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Records in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntityRecord> {
        self.records.values_mut()
    }

    pub fn into_records(self) -> BTreeMap<String, EntityRecord> {
        self.records
    }

    /// Create the record if absent (with `namespace`), then merge `obs`.
    /// A record's namespace is fixed at creation and never rewritten here.
    pub fn upsert(&mut self, id: &str, namespace: Namespace, obs: &Observation) -> Upsert {
        match self.records.get_mut(id) {
            Some(rec) => {
                if rec.apply(obs) { Upsert::Updated } else { Upsert::Unchanged }
            }
            None => {
                let mut rec = EntityRecord::new(id, namespace);
                rec.apply(obs);
                self.records.insert(id.to_string(), rec);
                Upsert::Created
            }
        }
    }

    /// Merge `obs` only if `id` is already known. Returns whether the record exists.
    pub fn update_existing(&mut self, id: &str, obs: &Observation) -> Option<Upsert> {
        let rec = self.records.get_mut(id)?;
        Some(if rec.apply(obs) { Upsert::Updated } else { Upsert::Unchanged })
    }

    /// Put a whole record in place, replacing any record with the same ID.
    /// Returns the record it displaced.
    pub(crate) fn replace(&mut self, rec: EntityRecord) -> Option<EntityRecord> {
        self.records.insert(rec.id().to_string(), rec)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let records: Option<BTreeMap<String, EntityRecord>> = load_json(path)?;
        let mut records = records.unwrap_or_default();
        for rec in records.values_mut() {
            rec.repair();
        }
        debug!(path = %path.display(), records = records.len(), "loaded snapshot");
        Ok(Self { records })
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        save_json_atomic(path, &self.records)?;
        debug!(path = %path.display(), records = self.records.len(), "checkpoint");
        Ok(())
    }
}

impl FromIterator<EntityRecord> for EntityDb {
    fn from_iter<I: IntoIterator<Item = EntityRecord>>(iter: I) -> Self {
        let mut db = EntityDb::new();
        for rec in iter {
            db.replace(rec);
        }
        db
    }
}

/// Read a JSON document. `Ok(None)` if the file does not exist.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ScrapeError::io(path, e)),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| ScrapeError::CorruptSnapshot { path: path.to_path_buf(), source })
}

/// Pretty-print `value` to a sibling temp file, then atomically replace `path`.
pub fn save_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| ScrapeError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ScrapeError::io(dir, e))?;
    let body = serde_json::to_string_pretty(value).map_err(|e| ScrapeError::io(path, e.into()))?;
    tmp.write_all(body.as_bytes()).map_err(|e| ScrapeError::io(tmp.path(), e))?;
    tmp.write_all(b"\n").map_err(|e| ScrapeError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| ScrapeError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| ScrapeError::io(path, e.error))?;
    Ok(())
}
