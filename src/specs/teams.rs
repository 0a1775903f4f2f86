// src/specs/teams.rs
//! Discovery pages. These do not yield players; they enumerate the pages a
//! pass will visit.
//!
//! - PFR `/teams/`: `table#teams_active`, one `<th><a href="/teams/crd/">` per
//!   active franchise. Inactive franchises sit in a separate table and are ignored.
//! - PFR `/schools/`: `table#college_stats_table`, `td[data-stat=college_name]` links.

use crate::core::html;
use crate::core::ids::{absolute_url, franchise_code};

/// One active franchise: `("crd", "Arizona Cardinals")`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Franchise {
    pub code: String,
    pub name: String,
}

/// One school with its roster page URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct School {
    pub name: String,
    pub url: String,
}

pub fn active_teams(doc: &str) -> Vec<Franchise> {
    let Some(table) = html::element_with_attr(doc, "table", "id", "teams_active") else {
        return Vec::new();
    };
    html::body_rows(table)
        .into_iter()
        .filter_map(|row| {
            let th = html::blocks(row, "th").next()?;
            let link = html::first_link(th)?;
            let code = franchise_code(&link.href)?;
            Some(Franchise { code, name: link.text })
        })
        .collect()
}

pub fn schools(doc: &str, base_url: &str) -> Vec<School> {
    let Some(table) = html::element_with_attr(doc, "table", "id", "college_stats_table") else {
        return Vec::new();
    };
    html::body_rows(table)
        .into_iter()
        .filter_map(|row| {
            let cell = html::blocks(row, "td")
                .find(|c| html::attr(c, "data-stat").as_deref() == Some("college_name"))?;
            let link = html::first_link(cell)?;
            Some(School { name: link.text, url: absolute_url(base_url, &link.href) })
        })
        .collect()
}
