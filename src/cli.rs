// src/cli.rs
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::{error, info, warn};

use crate::canon::CanonicalMap;
use crate::config::options::PipelineConfig;
use crate::core::net::{Clock, Fetcher, Transport};
use crate::model::Namespace;
use crate::pipeline::{self, PassKind};
use crate::progress::LogProgress;
use crate::store::EntityDb;

#[derive(Debug, Parser)]
#[command(name = "roster_scrape", about = "Build the merged player database from the reference sites")]
pub struct Args {
    /// Leagues to process, in order.
    #[arg(long, num_args = 1.., default_values = ["NFL", "NBA"])]
    pub leagues: Vec<Namespace>,

    /// Steps to run: 1 list, 2 init, 3 teams, 4 colleges/numbers, 5 merge+normalize.
    #[arg(long, num_args = 1.., default_values_t = [1u8, 2, 3, 4, 5],
          value_parser = clap::value_parser!(u8).range(1..=5))]
    pub steps: Vec<u8>,

    /// Merged output file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for lists, per-league databases and the debug log.
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Grouped college variants JSON.
    #[arg(long)]
    pub canonical_map: Option<PathBuf>,

    /// Optional JSON config; flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ignore saved cursors and revisit every page of steps 1, 3 and 4.
    /// Without it, an interrupted pass resumes where it stopped.
    #[arg(long)]
    pub fresh: bool,
}

impl Args {
    fn has(&self, step: u8) -> bool {
        self.steps.contains(&step)
    }

    fn start_at(&self) -> Option<usize> {
        self.fresh.then_some(0)
    }

    pub fn resolve_config(&self) -> crate::errors::Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = &self.store_dir { cfg.store_dir = dir.clone(); }
        if let Some(out) = &self.output { cfg.output = out.clone(); }
        if let Some(map) = &self.canonical_map { cfg.canonical_map = map.clone(); }
        Ok(cfg)
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let cfg = args.resolve_config()?;
    crate::log::init(&cfg.log_path())?;

    info!(leagues = ?args.leagues, steps = ?args.steps, store = %cfg.store_dir.display(), "pipeline start");

    let mut fetcher = Fetcher::from_options(&cfg.fetch)?;
    for &ns in &args.leagues {
        if let Err(e) = run_league(&args, &cfg, &mut fetcher, ns) {
            error!(league = %ns, "{e:#}; remaining steps for this league skipped");
        }
    }

    if args.has(5) {
        merge_and_normalize(&cfg)?;
    }
    info!("pipeline complete");
    Ok(())
}

fn run_league<T: Transport, C: Clock>(
    args: &Args,
    cfg: &PipelineConfig,
    fetcher: &mut Fetcher<T, C>,
    ns: Namespace,
) -> Result<()> {
    let list_path = cfg.list_path(ns);
    let db_path = cfg.db_path(ns);

    if args.has(1) {
        info!(league = %ns, "step 1: fetch player list");
        let mut progress = LogProgress::new(join!(ns.as_str(), " index"));
        let index_path = cfg.index_path(ns);
        let (listings, report) =
            pipeline::fetch_list(fetcher, ns, Some(index_path.as_path()), args.start_at(), &mut progress)?;
        pipeline::save_list(&list_path, &listings)?;
        info!(players = listings.len(), skipped = report.skipped.len(), path = %list_path.display(), "list saved");
    }

    if args.has(2) {
        info!(league = %ns, "step 2: initialize database");
        let Some(listings) = pipeline::load_list(&list_path)? else {
            bail!("{} not found, run step 1 first", list_path.display());
        };
        let mut db = EntityDb::load(&db_path)?;
        pipeline::initialize_database(&listings, &mut db);
        db.persist(&db_path)?;
    }

    if args.has(3) {
        info!(league = %ns, "step 3: teams");
        enrich(args, fetcher, ns, PassKind::Teams, &db_path)?;
    }

    if args.has(4) {
        let kind = match ns {
            Namespace::Nfl => PassKind::Colleges,
            Namespace::Nba => PassKind::Numbers,
        };
        info!(league = %ns, ?kind, "step 4");
        enrich(args, fetcher, ns, kind, &db_path)?;
    }
    Ok(())
}

fn enrich<T: Transport, C: Clock>(
    args: &Args,
    fetcher: &mut Fetcher<T, C>,
    ns: Namespace,
    kind: PassKind,
    db_path: &std::path::Path,
) -> Result<()> {
    if !db_path.exists() {
        bail!("{} not found, run step 2 first", db_path.display());
    }
    let mut db = EntityDb::load(db_path)?;
    let mut progress = LogProgress::new(format!("{ns} {kind:?}"));
    let report = pipeline::run_pass(fetcher, ns, kind, &mut db, Some(db_path), args.start_at(), &mut progress)?;
    for page in &report.skipped {
        warn!(page = %page.key, url = %page.url, reason = %page.reason, "not collected");
    }
    info!(created = report.created, updated = report.updated, unknown = report.unknown, "{}", report.stats.summary());
    Ok(())
}

fn merge_and_normalize(cfg: &PipelineConfig) -> Result<()> {
    info!("step 5: merge and normalize");
    let load = |ns: Namespace| -> Result<EntityDb> {
        let path = cfg.db_path(ns);
        if !path.exists() {
            warn!(path = %path.display(), "database missing, merging only available data");
        }
        Ok(EntityDb::load(&path)?)
    };
    let outcome = pipeline::merge_databases(load(Namespace::Nfl)?, load(Namespace::Nba)?);
    if !outcome.collisions.is_empty() {
        warn!(collisions = outcome.collisions.len(), "id collisions occurred");
    }
    let mut merged = outcome.db;

    match CanonicalMap::load(&cfg.canonical_map) {
        Ok(map) => {
            pipeline::normalize(&mut merged, &map);
        }
        Err(e) => warn!("{e}; colleges left as scraped"),
    }

    merged.persist(&cfg.output)?;
    info!(path = %cfg.output.display(), "merged output written");
    Ok(())
}
