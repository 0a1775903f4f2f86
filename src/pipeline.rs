// src/pipeline.rs
//! Orchestrator entry points. Each step can be resumed and re-run on its own:
//!
//! 1. [`fetch_list`]: letter index pages → player list.
//! 2. [`initialize_database`]: player list → namespace database.
//! 3. / 4. [`run_pass`]: enrich the database with teams, numbers or colleges.
//! 5. [`merge_databases`] then [`normalize`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::canon::{self, CanonicalMap};
use crate::config::consts::{CHECKPOINT_EVERY, COLLEGES_CHECKPOINT_EVERY, NBA_FRANCHISES};
use crate::config::options::{Admission, PassOptions};
use crate::core::ids::{entity_id, jersey_numbers, team_tag};
use crate::core::net::{Clock, Fetcher, Transport};
use crate::errors::{Result, ScrapeError};
use crate::merge::{self, MergeOutcome};
use crate::model::{Namespace, Observation, TagField};
use crate::progress::Progress;
use crate::scrape::{Collector, Extractor, Page, PassReport, ResumeCursor};
use crate::specs::numbers::NumbersPage;
use crate::specs::players::PlayerIndex;
use crate::specs::rosters::{FranchiseRoster, SchoolRoster};
use crate::specs::teams::{self, Franchise, School};
use crate::specs::uniform::UniformPage;
use crate::store::{self, EntityDb};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Letter index pages. Admits new players.
    Index,
    /// NFL: uniform pages per franchise × number. NBA: franchise rosters.
    Teams,
    /// NBA jersey-number pages.
    Numbers,
    /// NFL school rosters.
    Colleges,
}

impl PassKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Index => "index",
            PassKind::Teams => "teams",
            PassKind::Numbers => "numbers",
            PassKind::Colleges => "colleges",
        }
    }
}

/// One entry of the player list file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub url: String,
    pub league: Namespace,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub colleges: Vec<String>,
}

impl Listing {
    /// The list's own id, or one derived from the URL for hand-built lists.
    pub fn key(&self) -> Option<String> {
        if self.id.is_empty() { entity_id(&self.url) } else { Some(self.id.clone()) }
    }

    fn observation(&self) -> Observation {
        let mut obs = Observation::new()
            .name(self.name.clone())
            .url(self.url.clone())
            .years(self.start_year, self.end_year);
        obs.affiliations = self.colleges.clone();
        obs
    }
}

/// Page enumeration, extractor and options for one pass.
pub struct PassPlan {
    pub pages: Vec<Page>,
    pub extractor: Box<dyn Extractor>,
    pub options: PassOptions,
}

impl PassPlan {
    fn new(pages: Vec<Page>, extractor: Box<dyn Extractor>, admission: Admission) -> Self {
        let options = PassOptions { checkpoint_every: CHECKPOINT_EVERY, start_at: 0, admission };
        Self { pages, extractor, options }
    }
}

/// Build the page enumeration for `kind`. Teams (NFL) and Colleges fetch a
/// discovery page first; a failed discovery fetch fails the plan.
pub fn plan_pass<T: Transport, C: Clock>(
    fetcher: &mut Fetcher<T, C>,
    ns: Namespace,
    kind: PassKind,
) -> Result<PassPlan> {
    let base = ns.base_url();
    let plan = match (ns, kind) {
        (_, PassKind::Index) => PassPlan::new(
            index_pages(ns),
            Box::new(PlayerIndex { base_url: s!(base), with_colleges: ns == Namespace::Nba }),
            Admission::Create,
        ),
        (Namespace::Nfl, PassKind::Teams) => {
            let doc = fetcher.fetch(&join!(base, "/teams/"))?;
            let franchises = teams::active_teams(&doc);
            if franchises.is_empty() {
                warn!("no active franchises found on /teams/");
            }
            info!(franchises = franchises.len(), "discovered NFL franchises");
            PassPlan::new(uniform_pages(&franchises), Box::new(UniformPage), Admission::Create)
        }
        (Namespace::Nba, PassKind::Teams) => PassPlan::new(
            franchise_pages(NBA_FRANCHISES),
            Box::new(FranchiseRoster),
            Admission::ExistingOnly,
        ),
        (Namespace::Nba, PassKind::Numbers) => {
            PassPlan::new(number_pages(), Box::new(NumbersPage), Admission::ExistingOnly)
        }
        (Namespace::Nfl, PassKind::Colleges) => {
            let doc = fetcher.fetch(&join!(base, "/schools/"))?;
            let schools = teams::schools(&doc, base);
            if schools.is_empty() {
                warn!("no schools found on /schools/");
            }
            info!(schools = schools.len(), "discovered schools");
            let mut plan = PassPlan::new(school_pages(&schools), Box::new(SchoolRoster), Admission::ExistingOnly);
            plan.options.checkpoint_every = COLLEGES_CHECKPOINT_EVERY;
            plan
        }
        (namespace, kind) => return Err(ScrapeError::UnsupportedPass { namespace, kind }),
    };
    Ok(plan)
}

pub fn index_pages(ns: Namespace) -> Vec<Page> {
    ns.letters()
        .into_iter()
        .map(|l| {
            let url = format!("{}/players/{}/", ns.base_url(), l);
            Page::new(l, url)
        })
        .collect()
}

/// Every franchise × every jersey number, franchise-major.
pub fn uniform_pages(franchises: &[Franchise]) -> Vec<Page> {
    let base = Namespace::Nfl.base_url();
    let numbers = jersey_numbers();
    let mut pages = Vec::with_capacity(franchises.len() * numbers.len());
    for f in franchises {
        let code = f.code.to_ascii_lowercase();
        let tag = team_tag(Namespace::Nfl, &code);
        for n in &numbers {
            let url = format!("{base}/players/uniform.cgi?team={code}&number={n}");
            pages.push(
                Page::new(format!("{code} #{n}"), url)
                    .implying(Observation::new().team(tag.clone()).number(n.clone())),
            );
        }
    }
    pages
}

pub fn franchise_pages(codes: &[&str]) -> Vec<Page> {
    let base = Namespace::Nba.base_url();
    codes
        .iter()
        .map(|code| {
            Page::new(*code, format!("{base}/teams/{code}/players.html"))
                .implying(Observation::new().team(team_tag(Namespace::Nba, code)))
        })
        .collect()
}

pub fn number_pages() -> Vec<Page> {
    let base = Namespace::Nba.base_url();
    jersey_numbers()
        .into_iter()
        .map(|n| {
            let url = format!("{base}/friv/numbers.fcgi?number={n}");
            Page::new(join!("#", &n), url).implying(Observation::new().number(n))
        })
        .collect()
}

pub fn school_pages(schools: &[School]) -> Vec<Page> {
    schools
        .iter()
        .map(|s| Page::new(s.name.clone(), s.url.clone()).implying(Observation::new().affiliation(s.name.clone())))
        .collect()
}

/// Step 1: scrape every letter page of `ns` into a player list.
/// Pages that fail are skipped (see the returned report); the list holds the rest.
///
/// With a `snapshot`, the partial index is checkpointed after every page and
/// an interrupted run picks up where it stopped (see [`run_pass`] for how
/// `start_at` is resolved).
pub fn fetch_list<T: Transport, C: Clock>(
    fetcher: &mut Fetcher<T, C>,
    ns: Namespace,
    snapshot: Option<&Path>,
    start_at: Option<usize>,
    progress: &mut dyn Progress,
) -> Result<(Vec<Listing>, PassReport)> {
    let plan = plan_pass(fetcher, ns, PassKind::Index)?;
    let mut index = match snapshot {
        Some(path) => EntityDb::load(path)?,
        None => EntityDb::new(),
    };
    let report = drive(fetcher, ns, PassKind::Index, plan, &mut index, snapshot, start_at, progress)?;

    let listings = index
        .iter()
        .filter(|r| r.namespace() == ns)
        .map(|r| Listing {
            id: r.id().to_string(),
            name: r.name().to_string(),
            url: r.source_url().to_string(),
            league: r.namespace(),
            start_year: r.start_year(),
            end_year: r.end_year(),
            colleges: r.affiliations().to_vec(),
        })
        .collect::<Vec<_>>();
    info!(namespace = %ns, players = listings.len(), "player list complete");
    Ok((listings, report))
}

pub fn save_list(path: &Path, listings: &[Listing]) -> Result<()> {
    store::save_json_atomic(path, listings)
}

/// `Ok(None)` if the list file does not exist yet.
pub fn load_list(path: &Path) -> Result<Option<Vec<Listing>>> {
    store::load_json(path)
}

/// Step 2: admit every listed player. Existing records are merged, not reset.
/// Returns how many records were created.
pub fn initialize_database(listings: &[Listing], db: &mut EntityDb) -> usize {
    let mut created = 0usize;
    for l in listings {
        let Some(id) = l.key() else {
            warn!(name = %l.name, url = %l.url, "listing without a usable id, skipped");
            continue;
        };
        if db.upsert(&id, l.league, &l.observation()) == store::Upsert::Created {
            created += 1;
        }
    }
    info!(listed = listings.len(), created, total = db.len(), "database initialized");
    created
}

/// Steps 3 and 4: run one enrichment (or index) pass over `db`, checkpointing
/// to `snapshot`.
///
/// `start_at: Some(n)` starts at page `n`. `None` resumes from the cursor an
/// interrupted run of the same pass left next to the snapshot, or from the
/// first page if there is none.
pub fn run_pass<T: Transport, C: Clock>(
    fetcher: &mut Fetcher<T, C>,
    ns: Namespace,
    kind: PassKind,
    db: &mut EntityDb,
    snapshot: Option<&Path>,
    start_at: Option<usize>,
    progress: &mut dyn Progress,
) -> Result<PassReport> {
    let plan = plan_pass(fetcher, ns, kind)?;
    drive(fetcher, ns, kind, plan, db, snapshot, start_at, progress)
}

/// Sidecar for the cursor of `kind`, next to `snapshot`:
/// `players_db_nba.json` → `players_db_nba.teams.cursor.json`.
pub fn cursor_path(snapshot: &Path, kind: PassKind) -> PathBuf {
    let stem = snapshot.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    snapshot.with_file_name(format!("{stem}.{}.cursor.json", kind.as_str()))
}

#[allow(clippy::too_many_arguments)]
fn drive<T: Transport, C: Clock>(
    fetcher: &mut Fetcher<T, C>,
    ns: Namespace,
    kind: PassKind,
    mut plan: PassPlan,
    db: &mut EntityDb,
    snapshot: Option<&Path>,
    start_at: Option<usize>,
    progress: &mut dyn Progress,
) -> Result<PassReport> {
    let cursor = snapshot.map(|p| cursor_path(p, kind));
    let start_at = match start_at {
        Some(n) => n,
        None => resume_point(cursor.as_deref(), plan.pages.len())?,
    };
    plan.options.start_at = start_at;
    info!(namespace = %ns, ?kind, pages = plan.pages.len(), start_at, "running pass");
    if start_at > 0 {
        progress.log(&format!("resuming at page {start_at} of {}", plan.pages.len()));
    }

    let mut collector = Collector::new(fetcher, ns).options(plan.options);
    if let Some(path) = snapshot {
        collector = collector.checkpoint_to(path);
    }
    if let Some(path) = cursor.as_deref() {
        collector = collector.cursor_to(path);
    }
    collector.run(&plan.pages, plan.extractor.as_ref(), db, progress)
}

/// A cursor recorded against a different enumeration (the site gained a
/// franchise, say) says nothing about this one, so the pass restarts.
fn resume_point(cursor: Option<&Path>, pages: usize) -> Result<usize> {
    let Some(path) = cursor else { return Ok(0) };
    match ResumeCursor::load(path)? {
        Some(c) if c.total == pages => Ok(c.next),
        Some(c) => {
            warn!(path = %path.display(), recorded = c.total, pages, "cursor does not match the page count, restarting pass");
            Ok(0)
        }
        None => Ok(0),
    }
}

/// Step 5a. See [`merge::merge`] for the collision policy.
pub fn merge_databases(first: EntityDb, second: EntityDb) -> MergeOutcome {
    merge::merge(first, second)
}

/// Step 5b: collapse college name variants.
pub fn normalize(db: &mut EntityDb, map: &CanonicalMap) -> usize {
    canon::normalize(db, map, TagField::Affiliations)
}
