// src/core/ids.rs
//! Deterministic identifiers and small value parsers shared by specs and passes.

use crate::config::consts::MAX_JERSEY_NUMBER;
use crate::model::Namespace;

/// Entity ID from a reference locator: final path segment, extension stripped.
///
/// `/players/B/BradTo00.htm` → `BradTo00`, `https://x.com/players/a/abdelal01.html` → `abdelal01`.
/// Query strings and fragments are ignored.
pub fn entity_id(locator: &str) -> Option<String> {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .trim()
        .trim_end_matches('/');
    let last = path.rsplit('/').next().unwrap_or("");
    let stem = match last.rfind('.') {
        Some(0) | None => last,
        Some(dot) => &last[..dot],
    };
    if stem.is_empty() { None } else { Some(stem.to_string()) }
}

/// Namespaced team tag: `nfl_CRD`, `nba_BOS`.
pub fn team_tag(ns: Namespace, code: &str) -> String {
    join!(ns.team_prefix(), &code.trim().to_ascii_uppercase())
}

/// Resolve a site-relative href against the namespace base URL.
pub fn absolute_url(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base.trim_end_matches('/');
    if href.starts_with('/') {
        join!(base, href)
    } else {
        join!(base, "/", href)
    }
}

/// Franchise code from a `/teams/crd/` style link (directory name of the href).
pub fn franchise_code(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or("");
    let dir = &path[..path.rfind('/')?];
    let code = dir.rsplit('/').next().unwrap_or("");
    if code.is_empty() { None } else { Some(code.to_string()) }
}

/// Exactly four ASCII digits (surrounding whitespace allowed).
pub fn parse_year(s: &str) -> Option<i32> {
    let t = s.trim();
    if t.len() == 4 && t.bytes().all(|b| b.is_ascii_digit()) {
        t.parse().ok()
    } else {
        None
    }
}

/// First `YYYY-YYYY` span in free text (whitespace around the dash allowed).
pub fn year_span(text: &str) -> Option<(i32, i32)> {
    let b = text.as_bytes();
    let digits4 = |at: usize| -> Option<i32> {
        let chunk = b.get(at..at + 4)?;
        if chunk.iter().all(|c| c.is_ascii_digit()) {
            std::str::from_utf8(chunk).ok()?.parse().ok()
        } else {
            None
        }
    };
    let skip_ws = |mut at: usize| {
        while at < b.len() && b[at].is_ascii_whitespace() { at += 1; }
        at
    };

    for i in 0..b.len() {
        let Some(start) = digits4(i) else { continue };
        let mut j = skip_ws(i + 4);
        if b.get(j) != Some(&b'-') { continue; }
        j = skip_ws(j + 1);
        if let Some(end) = digits4(j) {
            return Some((start, end));
        }
    }
    None
}

/// Jersey number keys, in page order.
pub fn jersey_numbers() -> Vec<String> {
    (0..=MAX_JERSEY_NUMBER).map(|n| n.to_string()).collect()
}
