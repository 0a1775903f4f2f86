// src/specs/uniform.rs
//! PFR uniform-number pages (`/players/uniform.cgi?team=crd&number=12`).
//!
//! The table has no stable id. It is the first table whose header cells read
//! `Player`, `From` and `To`. The team and number come from the page, not
//! the rows (see `Page::implied`).

use crate::core::html;
use crate::core::ids::{entity_id, parse_year};
use crate::model::Observation;
use crate::scrape::{ExtractError, Extracted, Extractor};

pub struct UniformPage;

impl Extractor for UniformPage {
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError> {
        let Some(table) = html::blocks(doc, "table").find(|t| is_uniform_table(t)) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for row in html::blocks(table, "tr") {
            let Some(link) = html::first_link(row) else { continue };
            if !link.href.contains("/players/") { continue; }
            let Some(id) = entity_id(&link.href) else { continue };

            let mut years = html::cells(row).into_iter().filter_map(|c| parse_year(&html::text(c)));
            let Some(start) = years.next() else { continue };
            let end = years.next().unwrap_or(start);

            out.push((id, Observation::new().years(Some(start), Some(end))));
        }
        Ok(out)
    }
}

fn is_uniform_table(table: &str) -> bool {
    let headers: Vec<String> = html::blocks(table, "th")
        .map(|th| html::text(th).to_lowercase())
        .collect();
    ["player", "from", "to"].iter().all(|h| headers.iter().any(|x| x == h))
}
