// src/model.rs
//! Player records and the observations merged into them.
//!
//! Merge rules, per field:
//! - `name`, `url`: last write wins.
//! - `start_year`: earliest observation wins; `end_year`: latest observation wins.
//! - `teams`, `numbers`, `colleges`: insertion-ordered sets; a value is appended
//!   only if it is not already present.
//!
//! Every rule is total over `Option`/empty inputs (missing means no-op) and
//! idempotent, so re-applying a page after a crash never changes a record twice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::consts::{NBA_BASE_URL, NBA_TEAM_PREFIX, NFL_BASE_URL, NFL_TEAM_PREFIX};

/// Originating source domain. Each namespace has its own ID alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    #[serde(rename = "NFL")]
    Nfl,
    #[serde(rename = "NBA")]
    Nba,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Nfl => "NFL",
            Namespace::Nba => "NBA",
        }
    }

    /// Lowercase form used in file names (`players_db_nfl.json`).
    pub fn file_tag(self) -> &'static str {
        match self {
            Namespace::Nfl => "nfl",
            Namespace::Nba => "nba",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Namespace::Nfl => NFL_BASE_URL,
            Namespace::Nba => NBA_BASE_URL,
        }
    }

    pub fn team_prefix(self) -> &'static str {
        match self {
            Namespace::Nfl => NFL_TEAM_PREFIX,
            Namespace::Nba => NBA_TEAM_PREFIX,
        }
    }

    /// Letter keys of the player index. PFR uses uppercase paths, BBR lowercase.
    pub fn letters(self) -> Vec<String> {
        let upper = matches!(self, Namespace::Nfl);
        (b'a'..=b'z')
            .map(|b| {
                let c = b as char;
                if upper { c.to_ascii_uppercase().to_string() } else { c.to_string() }
            })
            .collect()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NFL" => Ok(Namespace::Nfl),
            "NBA" => Ok(Namespace::Nba),
            other => Err(format!("unknown league: {other}")),
        }
    }
}

/// Selects one of the tag sequences on a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagField {
    Teams,
    Numbers,
    Affiliations,
}

/// One partial observation of a player. All fields optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    pub name: Option<String>,
    pub url: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub teams: Vec<String>,
    pub numbers: Vec<String>,
    pub affiliations: Vec<String>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.teams.push(team.into());
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.numbers.push(number.into());
        self
    }

    pub fn affiliation(mut self, school: impl Into<String>) -> Self {
        self.affiliations.push(school.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.start_year.is_none()
            && self.end_year.is_none()
            && self.teams.is_empty()
            && self.numbers.is_empty()
            && self.affiliations.is_empty()
    }

    /// Fold page-implied observations (team of a roster page, number of a
    /// numbers page, ...) into what the extractor found on the row.
    /// Row values win for scalars; tags are appended after the row's own.
    pub fn with_implied(mut self, implied: &Observation) -> Self {
        if self.name.is_none() { self.name = implied.name.clone(); }
        if self.url.is_none() { self.url = implied.url.clone(); }
        if self.start_year.is_none() { self.start_year = implied.start_year; }
        if self.end_year.is_none() { self.end_year = implied.end_year; }
        self.teams.extend(implied.teams.iter().cloned());
        self.numbers.extend(implied.numbers.iter().cloned());
        self.affiliations.extend(implied.affiliations.iter().cloned());
        self
    }
}

/// One tracked player. Fields are private so the set/range invariants can only
/// change through [`EntityRecord::apply`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "url", default)]
    source_url: String,
    #[serde(rename = "league")]
    namespace: Namespace,
    #[serde(default)]
    start_year: Option<i32>,
    #[serde(default)]
    end_year: Option<i32>,
    #[serde(default)]
    teams: Vec<String>,
    #[serde(default)]
    numbers: Vec<String>,
    #[serde(rename = "colleges", default)]
    affiliations: Vec<String>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            id: id.into(),
            name: s!(),
            source_url: s!(),
            namespace,
            start_year: None,
            end_year: None,
            teams: Vec::new(),
            numbers: Vec::new(),
            affiliations: Vec::new(),
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn source_url(&self) -> &str { &self.source_url }
    pub fn namespace(&self) -> Namespace { self.namespace }
    pub fn start_year(&self) -> Option<i32> { self.start_year }
    pub fn end_year(&self) -> Option<i32> { self.end_year }
    pub fn teams(&self) -> &[String] { &self.teams }
    pub fn numbers(&self) -> &[String] { &self.numbers }
    pub fn affiliations(&self) -> &[String] { &self.affiliations }

    pub fn tags(&self, field: TagField) -> &[String] {
        match field {
            TagField::Teams => &self.teams,
            TagField::Numbers => &self.numbers,
            TagField::Affiliations => &self.affiliations,
        }
    }

    /// Replace a tag sequence wholesale. Input is deduplicated first-wins.
    pub(crate) fn set_tags(&mut self, field: TagField, values: Vec<String>) {
        let mut out = Vec::with_capacity(values.len());
        for v in values {
            push_unique(&mut out, v);
        }
        match field {
            TagField::Teams => self.teams = out,
            TagField::Numbers => self.numbers = out,
            TagField::Affiliations => self.affiliations = out,
        }
    }

    /// Merge one observation. Returns whether anything changed.
    ///
    /// Scalars are last-write-wins, `start_year` keeps the minimum and
    /// `end_year` the maximum. When lone bounds cross (a start seen after a
    /// lone, earlier end) the pair is widened to the hull, so `start_year` can
    /// end up holding a year only ever observed as an end. It is then not the
    /// minimum of the observed starts.
    pub fn apply(&mut self, obs: &Observation) -> bool {
        let mut changed = false;

        if let Some(name) = &obs.name {
            if self.name != *name {
                self.name = name.clone();
                changed = true;
            }
        }
        if let Some(url) = &obs.url {
            if self.source_url != *url {
                self.source_url = url.clone();
                changed = true;
            }
        }

        if let Some(start) = obs.start_year {
            let next = self.start_year.map_or(start, |cur| cur.min(start));
            changed |= self.start_year != Some(next);
            self.start_year = Some(next);
        }
        if let Some(end) = obs.end_year {
            let next = self.end_year.map_or(end, |cur| cur.max(end));
            changed |= self.end_year != Some(next);
            self.end_year = Some(next);
        }
        // Inconsistent observations (a lone start after a lone, earlier end)
        // widen to the hull; both bounds still move only outward.
        if let (Some(s), Some(e)) = (self.start_year, self.end_year) {
            if s > e {
                self.start_year = Some(e);
                self.end_year = Some(s);
                changed = true;
            }
        }

        for t in &obs.teams {
            changed |= push_unique(&mut self.teams, t.clone());
        }
        for n in &obs.numbers {
            changed |= push_unique(&mut self.numbers, n.clone());
        }
        for a in &obs.affiliations {
            changed |= push_unique(&mut self.affiliations, a.clone());
        }

        changed
    }

    /// Restore invariants on a record read from disk (hand-edited snapshots).
    pub(crate) fn repair(&mut self) {
        for field in [TagField::Teams, TagField::Numbers, TagField::Affiliations] {
            let values = self.tags(field).to_vec();
            self.set_tags(field, values);
        }
        if let (Some(s), Some(e)) = (self.start_year, self.end_year) {
            if s > e {
                self.start_year = Some(e);
                self.end_year = Some(s);
            }
        }
    }
}

/// Append `value` unless already present. Returns true if appended.
pub fn push_unique(list: &mut Vec<String>, value: String) -> bool {
    if list.contains(&value) {
        false
    } else {
        list.push(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_append_if_absent_in_first_seen_order() {
        let mut r = EntityRecord::new("x", Namespace::Nba);
        r.apply(&Observation::new().team("A"));
        r.apply(&Observation::new().team("A").team("B"));
        r.apply(&Observation::new().team("B").team("C").team("A"));
        assert_eq!(r.teams(), ["A", "B", "C"]);
    }

    #[test]
    fn start_year_only_decreases_end_year_only_increases() {
        let mut r = EntityRecord::new("x", Namespace::Nfl);
        r.apply(&Observation::new().years(Some(2001), Some(2004)));
        r.apply(&Observation::new().years(Some(1998), Some(2002)));
        r.apply(&Observation::new().years(Some(2003), Some(2010)));
        assert_eq!(r.start_year(), Some(1998));
        assert_eq!(r.end_year(), Some(2010));
    }

    #[test]
    fn lone_bounds_that_cross_widen_to_hull() {
        let mut r = EntityRecord::new("x", Namespace::Nfl);
        r.apply(&Observation::new().years(None, Some(2001)));
        r.apply(&Observation::new().years(Some(2005), None));
        // 2001 was only ever seen as an end year
        assert_eq!(r.start_year(), Some(2001));
        assert_eq!(r.end_year(), Some(2005));
    }

    #[test]
    fn empty_observation_is_noop() {
        let mut r = EntityRecord::new("x", Namespace::Nfl);
        r.apply(&Observation::new().name("Tom").years(Some(2000), Some(2001)));
        let before = r.clone();
        assert!(!r.apply(&Observation::new()));
        assert_eq!(r, before);
    }

    #[test]
    fn reapplying_reports_no_change() {
        let obs = Observation::new().name("Tom").url("u").years(Some(2000), Some(2003)).team("T").number("12");
        let mut r = EntityRecord::new("x", Namespace::Nfl);
        assert!(r.apply(&obs));
        assert!(!r.apply(&obs));
    }

    #[test]
    fn implied_tags_follow_row_tags() {
        let row = Observation::new().team("row");
        let implied = Observation::new().team("page").number("7").years(Some(1990), None);
        let merged = row.with_implied(&implied);
        assert_eq!(merged.teams, ["row", "page"]);
        assert_eq!(merged.numbers, ["7"]);
        assert_eq!(merged.start_year, Some(1990));
    }

    #[test]
    fn namespace_parses_case_insensitively() {
        assert_eq!("nfl".parse::<Namespace>(), Ok(Namespace::Nfl));
        assert_eq!(" NBA ".parse::<Namespace>(), Ok(Namespace::Nba));
        assert!("mlb".parse::<Namespace>().is_err());
    }

    #[test]
    fn snapshot_field_names_match_on_disk_schema() {
        let mut r = EntityRecord::new("BradTo00", Namespace::Nfl);
        r.apply(&Observation::new().name("Tom Brady").url("https://x/BradTo00.htm").affiliation("Michigan"));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["league"], "NFL");
        assert_eq!(v["url"], "https://x/BradTo00.htm");
        assert_eq!(v["colleges"][0], "Michigan");
        assert!(v["start_year"].is_null());
    }
}
