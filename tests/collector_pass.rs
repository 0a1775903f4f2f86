// tests/collector_pass.rs
mod common;

use std::time::Duration;

use common::{Routes, StopAfter, fetcher, killed, letter_page, quick, roster_page};
use roster_scrape::config::options::{Admission, FetchOptions, PassOptions};
use roster_scrape::core::net::RawResponse;
use roster_scrape::model::{Namespace, Observation};
use roster_scrape::progress::{NullProgress, PassStats, Progress};
use roster_scrape::scrape::{Collector, Page, ResumeCursor};
use roster_scrape::specs::players::PlayerIndex;
use roster_scrape::specs::rosters::FranchiseRoster;
use roster_scrape::store::EntityDb;

fn index() -> PlayerIndex {
    PlayerIndex { base_url: "https://bbr".into(), with_colleges: false }
}

fn letter_routes() -> (Routes, Vec<Page>) {
    let routes = Routes::new()
        .page("u/a", &letter_page(&[("abdelal01", "Alaa Abdelnaby", 1991, 1995)]))
        .page("u/b", &letter_page(&[("birdla01", "Larry Bird", 1980, 1992)]))
        .page("u/c", &letter_page(&[("chambwi01", "Wilt Chamberlain", 1960, 1973)]))
        .page("u/d", &letter_page(&[("duncati01", "Tim Duncan", 1998, 2016)]));
    let pages = ["a", "b", "c", "d"].iter().map(|l| Page::new(*l, format!("u/{l}"))).collect();
    (routes, pages)
}

#[test]
fn resumed_run_equals_uninterrupted_run() {
    let dir = tempfile::tempdir().unwrap();
    let snap = dir.path().join("db.json");

    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let mut full = EntityDb::new();
    Collector::new(&mut f, Namespace::Nba)
        .run(&pages, &index(), &mut full, &mut NullProgress)
        .unwrap();

    // Interrupted after page 2: only the first two pages were ever visited.
    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let mut partial = EntityDb::new();
    Collector::new(&mut f, Namespace::Nba)
        .checkpoint_to(&snap)
        .run(&pages[..2], &index(), &mut partial, &mut NullProgress)
        .unwrap();

    // Resume from the checkpoint and finish the rest.
    let mut resumed = EntityDb::load(&snap).unwrap();
    assert_eq!(resumed.len(), 2);
    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let report = Collector::new(&mut f, Namespace::Nba)
        .options(PassOptions { start_at: 2, ..PassOptions::default() })
        .checkpoint_to(&snap)
        .run(&pages, &index(), &mut resumed, &mut NullProgress)
        .unwrap();

    assert_eq!(report.stats.total, 2);
    assert_eq!(f.transport().hits("u/a"), 0);
    assert_eq!(resumed, full);
    assert_eq!(EntityDb::load(&snap).unwrap(), full);
}

#[test]
fn cursor_tracks_checkpoints_and_is_removed_on_completion() {
    let dir = tempfile::tempdir().unwrap();
    let snap = dir.path().join("db.json");
    let cursor = dir.path().join("db.cursor.json");

    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let mut db = EntityDb::new();
    assert!(killed(|| {
        Collector::new(&mut f, Namespace::Nba)
            .checkpoint_to(&snap)
            .cursor_to(&cursor)
            .run(&pages, &index(), &mut db, &mut StopAfter(2))
    }));
    assert_eq!(ResumeCursor::load(&cursor).unwrap(), Some(ResumeCursor { next: 2, total: 4 }));
    assert_eq!(EntityDb::load(&snap).unwrap().len(), 2);

    let mut db = EntityDb::load(&snap).unwrap();
    Collector::new(&mut f, Namespace::Nba)
        .options(PassOptions { start_at: 2, ..PassOptions::default() })
        .checkpoint_to(&snap)
        .cursor_to(&cursor)
        .run(&pages, &index(), &mut db, &mut NullProgress)
        .unwrap();
    assert_eq!(ResumeCursor::load(&cursor).unwrap(), None);
    assert_eq!(db.len(), 4);
}

#[test]
fn rerunning_a_pass_is_idempotent() {
    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let mut db = EntityDb::new();
    Collector::new(&mut f, Namespace::Nba).run(&pages, &index(), &mut db, &mut NullProgress).unwrap();
    let once = db.clone();

    let report = Collector::new(&mut f, Namespace::Nba).run(&pages, &index(), &mut db, &mut NullProgress).unwrap();
    assert_eq!(db, once);
    assert_eq!((report.created, report.updated), (0, 0));
}

#[test]
fn bad_pages_are_skipped_and_reported() {
    let routes = Routes::new()
        .page("u/a", &letter_page(&[("abdelal01", "Alaa Abdelnaby", 1991, 1995)]))
        .page("u/b", "<html><body>down for maintenance</body></html>")
        .page("u/d", &letter_page(&[("duncati01", "Tim Duncan", 1998, 2016)]));
    let pages: Vec<Page> = ["a", "b", "c", "d"].iter().map(|l| Page::new(*l, format!("u/{l}"))).collect();
    let mut f = fetcher(routes, &quick());
    let mut db = EntityDb::new();

    let report = Collector::new(&mut f, Namespace::Nba).run(&pages, &index(), &mut db, &mut NullProgress).unwrap();

    assert_eq!(db.len(), 2);
    assert_eq!(report.stats.done, 4);
    assert_eq!(report.stats.failed, 2);
    let keys: Vec<&str> = report.skipped.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["b", "c"]);
    assert!(report.skipped[0].reason.starts_with("could not extract page b"));
    assert!(report.skipped[1].reason.contains("u/c"));
}

#[test]
fn checkpoints_per_batch_and_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let snap = dir.path().join("db.json");
    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let mut db = EntityDb::new();

    let report = Collector::new(&mut f, Namespace::Nba)
        .options(PassOptions { checkpoint_every: 3, ..PassOptions::default() })
        .checkpoint_to(&snap)
        .run(&pages, &index(), &mut db, &mut NullProgress)
        .unwrap();
    assert_eq!(report.checkpoints, 2);

    let (routes, pages) = letter_routes();
    let mut f = fetcher(routes, &quick());
    let report = Collector::new(&mut f, Namespace::Nba)
        .checkpoint_to(&snap)
        .run(&pages, &index(), &mut db, &mut NullProgress)
        .unwrap();
    assert_eq!(report.checkpoints, 4);
}

#[test]
fn existing_only_pass_never_admits_and_applies_page_tags() {
    let routes = Routes::new()
        .page("u/BOS", &roster_page(&["birdla01", "ghost01"]))
        .page("u/LAL", &roster_page(&["birdla01"]));
    let pages = vec![
        Page::new("BOS", "u/BOS").implying(Observation::new().team("nba_BOS")),
        Page::new("LAL", "u/LAL").implying(Observation::new().team("nba_LAL")),
    ];
    let mut db = EntityDb::new();
    db.upsert("birdla01", Namespace::Nba, &Observation::new().name("Larry Bird"));

    let mut f = fetcher(routes, &quick());
    let report = Collector::new(&mut f, Namespace::Nba)
        .options(PassOptions { admission: Admission::ExistingOnly, ..PassOptions::default() })
        .run(&pages, &FranchiseRoster, &mut db, &mut NullProgress)
        .unwrap();

    assert_eq!(db.len(), 1);
    assert_eq!(report.unknown, 1);
    assert_eq!(report.updated, 2);
    assert_eq!(db.get("birdla01").unwrap().teams(), ["nba_BOS", "nba_LAL"]);
}

#[derive(Default)]
struct Recorder {
    begun: Option<usize>,
    done: Vec<String>,
    failed: Vec<String>,
    last: Option<PassStats>,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) { self.begun = Some(total); }
    fn item_done(&mut self, page: &str, _stats: &PassStats) { self.done.push(page.to_string()); }
    fn item_failed(&mut self, page: &str, _reason: &str) { self.failed.push(page.to_string()); }
    fn finish(&mut self, stats: &PassStats) { self.last = Some(stats.clone()); }
}

#[test]
fn progress_tracks_elapsed_and_remaining() {
    let (routes, pages) = letter_routes();
    let opts = FetchOptions { min_interval_ms: 1_000, max_attempts: 1, ..FetchOptions::default() };
    let mut f = fetcher(routes, &opts);
    let mut db = EntityDb::new();
    let mut rec = Recorder::default();

    Collector::new(&mut f, Namespace::Nba).run(&pages, &index(), &mut db, &mut rec).unwrap();

    assert_eq!(rec.begun, Some(4));
    assert_eq!(rec.done, ["a", "b", "c", "d"]);
    assert!(rec.failed.is_empty());
    let stats = rec.last.unwrap();
    assert_eq!(stats.remaining(), 0);
    // three paced gaps on virtual time
    assert_eq!(stats.elapsed, Duration::from_secs(3));
}

#[test]
fn rate_limit_hint_is_honored_before_retrying_same_url() {
    let routes = Routes::new().script(
        "u/a",
        vec![
            Ok(RawResponse { status: 429, retry_after: Some("5".into()), body: String::new() }),
            Ok(RawResponse::ok(letter_page(&[("abdelal01", "Alaa Abdelnaby", 1991, 1995)]))),
        ],
    );
    let opts = FetchOptions { min_interval_ms: 0, max_attempts: 3, ..FetchOptions::default() };
    let mut f = fetcher(routes, &opts);

    let doc = f.fetch("u/a").unwrap();
    assert!(doc.contains("abdelal01"));
    assert_eq!(f.transport().hits("u/a"), 2);
    assert_eq!(f.clock().sleeps.borrow().len(), 1);
    assert!(f.clock().total_slept() >= Duration::from_secs(5));
}
