// src/config/consts.rs

// Sources
pub const NFL_BASE_URL: &str = "https://www.pro-football-reference.com";
pub const NBA_BASE_URL: &str = "https://www.basketball-reference.com";
pub const NFL_TEAM_PREFIX: &str = "nfl_";
pub const NBA_TEAM_PREFIX: &str = "nba_";

/// Basketball-Reference franchise codes (`/teams/{code}/players.html`).
pub const NBA_FRANCHISES: &[&str] = &[
    "ATL", "BOS", "NJN", "CHA", "CHI", "CLE", "DAL", "DEN", "DET", "GSW",
    "HOU", "IND", "LAC", "LAL", "MEM", "MIA", "MIL", "MIN", "NOH", "NYK",
    "OKC", "ORL", "PHI", "PHO", "POR", "SAC", "SAS", "TOR", "UTA", "WAS",
];

/// Jersey numbers enumerated by the number/uniform passes: "0" ..= "99".
pub const MAX_JERSEY_NUMBER: u32 = 99;

// Net
/// 20 requests/minute budget, with margin.
pub const REQUEST_INTERVAL_MS: u64 = 3_100;
pub const MAX_ATTEMPTS: u32 = 5;
pub const HTTP_TIMEOUT_SECS: u64 = 15;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) roster_scrape/0.1";

// Local store
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const DEFAULT_OUTPUT: &str = "players_merged.json";
pub const DEFAULT_CANONICAL_MAP: &str = "colleges_grouped.json";

// Checkpointing
pub const CHECKPOINT_EVERY: usize = 1;
pub const COLLEGES_CHECKPOINT_EVERY: usize = 10;
