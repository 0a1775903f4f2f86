// src/specs/numbers.rs
//! BBR jersey-number pages (`/friv/numbers.fcgi?number=23`). Rows only carry
//! the player link; the number is implied by the page.

use crate::core::html;
use crate::core::ids::entity_id;
use crate::model::Observation;
use crate::scrape::{ExtractError, Extracted, Extractor};

pub struct NumbersPage;

impl Extractor for NumbersPage {
    fn extract(&self, doc: &str) -> Result<Vec<Extracted>, ExtractError> {
        let table = html::element_with_attr(doc, "table", "id", "uniform_number")
            .or_else(|| html::element_with_attr(doc, "table", "id", "numbers"));
        let Some(table) = table else { return Ok(Vec::new()) };

        let mut out = Vec::new();
        for row in html::blocks(table, "tr") {
            let link = html::blocks(row, "th")
                .next()
                .and_then(html::first_link)
                .or_else(|| html::blocks(row, "td").next().and_then(html::first_link));
            if let Some(id) = link.and_then(|l| entity_id(&l.href)) {
                out.push((id, Observation::new()));
            }
        }
        Ok(out)
    }
}
