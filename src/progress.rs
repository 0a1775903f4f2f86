// src/progress.rs
use std::time::Duration;

use tracing::{info, warn};

/// Counters for one pass, with a running-average ETA.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub total: usize,
    /// Pages finished this run, failed ones included.
    pub done: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl PassStats {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.done)
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 { 100.0 } else { self.done as f64 * 100.0 / self.total as f64 }
    }

    pub fn avg_per_page(&self) -> Option<Duration> {
        if self.done == 0 { None } else { Some(self.elapsed / self.done as u32) }
    }

    /// Remaining pages × average time per completed page.
    pub fn eta(&self) -> Option<Duration> {
        self.avg_per_page().map(|avg| avg * self.remaining() as u32)
    }

    /// `Progress: 3/26 (11.5%) - Est. 1m 12s remaining`
    pub fn summary(&self) -> String {
        let eta = self.eta().map_or_else(|| s!("unknown"), fmt_mins_secs);
        format!(
            "Progress: {}/{} ({:.1}%) - Est. {} remaining",
            self.done, self.total, self.percent(), eta
        )
    }
}

pub fn fmt_mins_secs(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Lightweight progress reporting used by long-running passes.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of pages this run will visit.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one page has been applied to the database.
    fn item_done(&mut self, _page: &str, _stats: &PassStats) {}

    /// Called when a page was skipped (fetch or extraction failure).
    fn item_failed(&mut self, _page: &str, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self, _stats: &PassStats) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Sends progress to `tracing`.
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        info!(pass = %self.label, pages = total, "starting");
    }
    fn log(&mut self, msg: &str) {
        info!(pass = %self.label, "{msg}");
    }
    fn item_done(&mut self, page: &str, stats: &PassStats) {
        info!(pass = %self.label, page, "{}", stats.summary());
    }
    fn item_failed(&mut self, page: &str, reason: &str) {
        warn!(pass = %self.label, page, reason, "skipped page");
    }
    fn finish(&mut self, stats: &PassStats) {
        info!(
            pass = %self.label,
            done = stats.done,
            failed = stats.failed,
            elapsed = %fmt_mins_secs(stats.elapsed),
            "finished"
        );
    }
}
