// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use roster_scrape::config::options::FetchOptions;
use roster_scrape::core::net::{Clock, Fetcher, RawResponse, Transport, TransportError};
use roster_scrape::progress::{PassStats, Progress};

pub type Reply = Result<RawResponse, TransportError>;

/// Serves scripted replies per URL. Unknown URLs answer 404.
/// Each URL's queue is consumed front to back; the last reply repeats.
#[derive(Default)]
pub struct Routes {
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    pub log: RefCell<Vec<String>>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, body: &str) -> Self {
        self.script(url, vec![Ok(RawResponse::ok(body))])
    }

    pub fn script(self, url: &str, replies: Vec<Reply>) -> Self {
        self.replies.borrow_mut().insert(url.to_string(), replies.into());
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.log.borrow().iter().filter(|u| *u == url).count()
    }
}

impl Transport for Routes {
    fn get(&self, url: &str) -> Reply {
        self.log.borrow_mut().push(url.to_string());
        let mut replies = self.replies.borrow_mut();
        match replies.get_mut(url) {
            Some(q) if q.len() > 1 => q.pop_front().unwrap(),
            Some(q) => q.front().cloned().unwrap(),
            None => Ok(RawResponse { status: 404, retry_after: None, body: String::new() }),
        }
    }
}

/// Virtual time: `sleep` advances `now` and is recorded.
pub struct FakeClock {
    base: Instant,
    offset: RefCell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { base: Instant::now(), offset: RefCell::new(Duration::ZERO), sleeps: RefCell::new(Vec::new()) }
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.borrow()
    }
    fn sleep(&self, d: Duration) {
        *self.offset.borrow_mut() += d;
        self.sleeps.borrow_mut().push(d);
    }
}

/// Kills the pass (by panicking) once the given number of pages are done,
/// right after their checkpoint.
pub struct StopAfter(pub usize);

impl Progress for StopAfter {
    fn item_done(&mut self, _page: &str, stats: &PassStats) {
        if stats.done >= self.0 {
            panic!("killed after {} pages", stats.done);
        }
    }
}

/// Run `f` and report whether it was killed.
pub fn killed<R>(f: impl FnOnce() -> R) -> bool {
    panic::catch_unwind(AssertUnwindSafe(f)).is_err()
}

/// Fast options: one attempt, no pacing. Tests that exercise retries set their own.
pub fn quick() -> FetchOptions {
    FetchOptions { min_interval_ms: 0, max_attempts: 1, ..FetchOptions::default() }
}

pub fn fetcher(routes: Routes, opts: &FetchOptions) -> Fetcher<Routes, FakeClock> {
    Fetcher::new(routes, FakeClock::new(), opts)
}

pub fn letter_page(rows: &[(&str, &str, i32, i32)]) -> String {
    let mut body = String::from(r#"<table id="players"><thead><tr><th>Player</th></tr></thead><tbody>"#);
    for (id, name, from, to) in rows {
        body.push_str(&format!(
            r#"<tr><th data-stat="player"><a href="/players/{}/{id}.html">{name}</a></th><td data-stat="year_min">{from}</td><td data-stat="year_max">{to}</td></tr>"#,
            &id[..1]
        ));
    }
    body.push_str("</tbody></table>");
    body
}

pub fn roster_page(ids: &[&str]) -> String {
    let mut body = String::from(r#"<table id="franchise_register"><tbody>"#);
    for id in ids {
        body.push_str(&format!(
            r#"<tr><td data-stat="player"><a href="/players/{}/{id}.html">{id}</a></td></tr>"#,
            &id[..1]
        ));
    }
    body.push_str("</tbody></table>");
    body
}
