// src/specs/players.rs
//! Player index pages (`/players/{letter}/`).
//!
//! Two layouts:
//! - Basketball-Reference: `<table id="players">`, name link in the row's `<th>`,
//!   years in `data-stat="year_min"` / `"year_max"`, colleges in `data-stat="colleges"`.
//! - Pro-Football-Reference: `<div id="div_players">` of `<p>` entries,
//!   `<a href="/players/B/BradTo00.htm">Tom Brady</a> (QB) 2000-2022`.

use crate::core::html::{self, Link};
use crate::core::ids::{absolute_url, entity_id, parse_year, year_span};
use crate::model::Observation;
use crate::scrape::{ExtractError, Extracted, Extractor};

pub struct PlayerIndex {
    pub base_url: String,
    /// Only the BBR index carries colleges.
    pub with_colleges: bool,
}

impl Extractor for PlayerIndex {
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError> {
        if let Some(table) = html::element_with_attr(doc, "table", "id", "players") {
            return Ok(self.from_table(table));
        }
        if let Some(div) = html::element_with_attr(doc, "div", "id", "div_players") {
            return Ok(self.from_paragraphs(div));
        }
        Err(ExtractError(s!("no player list found (table#players / div#div_players)")))
    }
}

impl PlayerIndex {
    fn from_table(&self, table: &str) -> Vec<Extracted> {
        let mut out = Vec::new();
        for row in html::body_rows(table) {
            let Some(th) = html::blocks(row, "th").next() else { continue };
            let Some(link) = html::first_link(th) else { continue };

            let (start, end) = match (
                html::cell_by_stat(row, "year_min"),
                html::cell_by_stat(row, "year_max"),
            ) {
                (Some(min), Some(max)) => (parse_year(&html::text(min)), parse_year(&html::text(max))),
                _ => year_span(&html::text(row)).map_or((None, None), |(s, e)| (Some(s), Some(e))),
            };
            if start.is_none() { continue; }

            let colleges = if self.with_colleges { colleges(row) } else { Vec::new() };
            if let Some(item) = self.entry(&link, start, end, colleges) {
                out.push(item);
            }
        }
        out
    }

    fn from_paragraphs(&self, div: &str) -> Vec<Extracted> {
        let mut out = Vec::new();
        for p in html::blocks(div, "p") {
            let Some(link) = html::first_link(p) else { continue };
            let Some((start, end)) = year_span(&html::text(p)) else { continue };
            if let Some(item) = self.entry(&link, Some(start), Some(end), Vec::new()) {
                out.push(item);
            }
        }
        out
    }

    fn entry(&self, link: &Link, start: Option<i32>, end: Option<i32>, colleges: Vec<String>) -> Option<Extracted> {
        let id = entity_id(&link.href)?;
        let mut obs = Observation::new()
            .name(link.text.clone())
            .url(absolute_url(&self.base_url, &link.href))
            .years(start, end);
        obs.affiliations = colleges;
        Some((id, obs))
    }
}

/// College links, or the bare cell text when the site did not link them.
fn colleges(row: &str) -> Vec<String> {
    let Some(cell) = html::cell_by_stat(row, "colleges") else { return Vec::new() };
    let names: Vec<String> = html::links(cell)
        .into_iter()
        .map(|l| l.text)
        .filter(|t| !t.is_empty())
        .collect();
    if !names.is_empty() {
        return names;
    }
    let txt = html::text(cell);
    if txt.is_empty() { Vec::new() } else { vec![txt] }
}
