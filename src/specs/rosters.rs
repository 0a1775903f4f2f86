// src/specs/rosters.rs
//! Roster-style pages that only list who belongs to a team or school.
//!
//! - BBR franchise register (`/teams/BOS/players.html`): `table#franchise_register`
//!   or `table#roster`; the `data-stat="player"` cell link, else the first cell's.
//! - PFR school page: `table#all_players`, body rows, `td[data-stat=player]` link.

use crate::core::html;
use crate::core::ids::entity_id;
use crate::model::Observation;
use crate::scrape::{ExtractError, Extracted, Extractor};

pub struct FranchiseRoster;

impl Extractor for FranchiseRoster {
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError> {
        let table = html::element_with_attr(doc, "table", "id", "franchise_register")
            .or_else(|| html::element_with_attr(doc, "table", "id", "roster"));
        let Some(table) = table else { return Ok(Vec::new()) };

        let mut out = Vec::new();
        for row in html::blocks(table, "tr") {
            let cells = html::cells(row);
            let link = cells
                .iter()
                .find(|c| html::attr(c, "data-stat").as_deref() == Some("player"))
                .and_then(|c| html::first_link(c))
                .or_else(|| cells.first().and_then(|c| html::first_link(c)));
            if let Some(id) = link.and_then(|l| entity_id(&l.href)) {
                out.push((id, Observation::new()));
            }
        }
        Ok(out)
    }
}

pub struct SchoolRoster;

impl Extractor for SchoolRoster {
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError> {
        let Some(table) = html::element_with_attr(doc, "table", "id", "all_players") else {
            return Ok(Vec::new());
        };
        let Some(body) = html::blocks(table, "tbody").next() else { return Ok(Vec::new()) };

        Ok(html::blocks(body, "tr")
            .filter_map(|row| {
                let cell = html::blocks(row, "td")
                    .find(|c| html::attr(c, "data-stat").as_deref() == Some("player"))?;
                let id = entity_id(&html::first_link(cell)?.href)?;
                Some((id, Observation::new()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn franchise_register_uses_player_cell_then_first_cell() {
        let doc = r#"<table id="franchise_register">
          <thead><tr><th data-stat="ranker">Rk</th><th data-stat="player">Player</th></tr></thead>
          <tbody>
            <tr><th data-stat="ranker"><a href="/about/rk.html">1</a></th><td data-stat="player"><a href="/players/b/birdla01.html">Larry Bird</a></td></tr>
            <tr><th><a href="/players/r/russebi01.html">Bill Russell</a></th><td>C</td></tr>
          </tbody></table>"#;
        let ids: Vec<String> = FranchiseRoster.extract(doc).unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["birdla01", "russebi01"]);
    }

    #[test]
    fn roster_table_fallback_and_missing_table() {
        let doc = r#"<table id="roster"><tr><td><a href="/players/t/tatumja01.html">Jayson Tatum</a></td></tr></table>"#;
        assert_eq!(FranchiseRoster.extract(doc).unwrap()[0].0, "tatumja01");
        assert!(FranchiseRoster.extract("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn school_roster_reads_body_player_cells() {
        let doc = r#"<table id="all_players">
          <thead><tr><td data-stat="player"><a href="/players/H/Head00.htm">Header</a></td></tr></thead>
          <tbody>
            <tr><th data-stat="ranker">1</th><td data-stat="player"><a href="/players/B/BradTo00.htm">Tom Brady</a></td></tr>
            <tr class="thead"><th>Rk</th></tr>
            <tr><td data-stat="player">Unlinked Walk-on</td></tr>
          </tbody></table>"#;
        let rows = SchoolRoster.extract(doc).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "BradTo00");
    }
}
