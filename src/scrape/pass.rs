// src/scrape/pass.rs
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::extract::{Extractor, Page};
use crate::config::options::{Admission, PassOptions};
use crate::core::net::{Clock, Fetcher, Transport};
use crate::errors::{Result, ScrapeError};
use crate::model::Namespace;
use crate::progress::{PassStats, Progress};
use crate::store::{self, EntityDb, Upsert};

/// A page the pass gave up on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPage {
    pub key: String,
    pub url: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub stats: PassStats,
    pub created: usize,
    pub updated: usize,
    /// Tuples dropped because the pass is existing-only and the ID was unknown.
    pub unknown: usize,
    pub skipped: Vec<SkippedPage>,
    pub checkpoints: usize,
}

/// Where an interrupted pass left off. Written next to the snapshot at every
/// checkpoint and removed once the pass reaches the end of its pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeCursor {
    /// Index of the first page the snapshot does not cover yet.
    pub next: usize,
    /// Length of the page enumeration `next` indexes into.
    pub total: usize,
}

impl ResumeCursor {
    /// `Ok(None)` when no interrupted run left a cursor behind.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        store::load_json(path)
    }
}

/// Drives fetch → extract → merge over a fixed page enumeration,
/// checkpointing the database as it goes.
pub struct Collector<'a, T, C> {
    fetcher: &'a mut Fetcher<T, C>,
    namespace: Namespace,
    options: PassOptions,
    snapshot: Option<&'a Path>,
    cursor: Option<&'a Path>,
}

impl<'a, T: Transport, C: Clock> Collector<'a, T, C> {
    pub fn new(fetcher: &'a mut Fetcher<T, C>, namespace: Namespace) -> Self {
        Self { fetcher, namespace, options: PassOptions::default(), snapshot: None, cursor: None }
    }

    pub fn options(mut self, options: PassOptions) -> Self {
        self.options = options;
        self
    }

    /// Persist the database to `path` at every checkpoint.
    pub fn checkpoint_to(mut self, path: &'a Path) -> Self {
        self.snapshot = Some(path);
        self
    }

    /// Record a [`ResumeCursor`] at `path` with every checkpoint.
    pub fn cursor_to(mut self, path: &'a Path) -> Self {
        self.cursor = Some(path);
        self
    }

    /// Visit `pages[start_at..]` in order. A page that cannot be fetched or
    /// extracted is reported and skipped; only a failed checkpoint write aborts.
    pub fn run(
        &mut self,
        pages: &[Page],
        extractor: &dyn Extractor,
        db: &mut EntityDb,
        progress: &mut dyn Progress,
    ) -> Result<PassReport> {
        let start_at = self.options.start_at.min(pages.len());
        let todo = &pages[start_at..];
        let batch = self.options.checkpoint_every.max(1);
        let started = self.fetcher.now();

        let mut report = PassReport::default();
        report.stats.total = todo.len();
        progress.begin(todo.len());

        let mut since_checkpoint = 0usize;
        for (i, page) in todo.iter().enumerate() {
            match self.visit(page, extractor, db, &mut report) {
                Ok(()) => {}
                Err(err) => {
                    let reason = err.to_string();
                    warn!(page = %page.key, url = %page.url, %reason, "skipping page");
                    progress.item_failed(&page.key, &reason);
                    report.stats.failed += 1;
                    report.skipped.push(SkippedPage {
                        key: page.key.clone(),
                        url: page.url.clone(),
                        reason,
                    });
                }
            }

            report.stats.done += 1;
            report.stats.elapsed = self.elapsed_since(started);

            since_checkpoint += 1;
            if since_checkpoint >= batch {
                self.checkpoint(db, &mut report, start_at + i + 1, pages.len())?;
                since_checkpoint = 0;
            }
            progress.item_done(&page.key, &report.stats);
        }

        if since_checkpoint > 0 || report.checkpoints == 0 {
            self.checkpoint(db, &mut report, pages.len(), pages.len())?;
        }
        self.clear_cursor()?;

        report.stats.elapsed = self.elapsed_since(started);
        progress.finish(&report.stats);
        info!(
            namespace = %self.namespace,
            pages = report.stats.done,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped.len(),
            "pass complete"
        );
        Ok(report)
    }

    /// Fetch, extract and apply one page. All observations of the page are
    /// applied before this returns.
    fn visit(
        &mut self,
        page: &Page,
        extractor: &dyn Extractor,
        db: &mut EntityDb,
        report: &mut PassReport,
    ) -> Result<()> {
        let doc = self.fetcher.fetch(&page.url)?;
        let tuples = extractor
            .extract(&doc)
            .map_err(|e| ScrapeError::extraction(page.key.clone(), e.0))?;

        for (id, obs) in tuples {
            let obs = obs.with_implied(&page.implied);
            let outcome = match self.options.admission {
                Admission::Create => Some(db.upsert(&id, self.namespace, &obs)),
                Admission::ExistingOnly => db.update_existing(&id, &obs),
            };
            match outcome {
                Some(Upsert::Created) => report.created += 1,
                Some(Upsert::Updated) => report.updated += 1,
                Some(Upsert::Unchanged) => {}
                None => report.unknown += 1,
            }
        }
        Ok(())
    }

    /// Snapshot first, cursor second: a kill in between only makes the next
    /// run redo pages it already merged.
    fn checkpoint(
        &self,
        db: &EntityDb,
        report: &mut PassReport,
        next: usize,
        total: usize,
    ) -> Result<()> {
        let Some(path) = self.snapshot else { return Ok(()) };
        db.persist(path)?;
        report.checkpoints += 1;
        if let Some(cursor) = self.cursor {
            store::save_json_atomic(cursor, &ResumeCursor { next, total })?;
        }
        Ok(())
    }

    fn clear_cursor(&self) -> Result<()> {
        let Some(cursor) = self.cursor else { return Ok(()) };
        match fs::remove_file(cursor) {
            Ok(()) => {
                debug!(path = %cursor.display(), "pass complete, cursor removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScrapeError::io(cursor, e)),
        }
    }

    fn elapsed_since(&self, started: std::time::Instant) -> Duration {
        self.fetcher.now().saturating_duration_since(started)
    }
}
