// src/core/html.rs
//! Tolerant, case-insensitive HTML scanning.
//!
//! No DOM is built. Callers narrow down to a known block (`<table id=..>`,
//! a `<tr>`, a `<td data-stat=..>`) and scan locally inside it. Lowercasing
//! only touches ASCII, so byte offsets in the lowered copy match the raw input.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Find `<tag` in an already-lowercased haystack, requiring a name boundary
/// so `<th` does not match `<thead` and `<a` does not match `<abbr`.
fn find_open(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = join!("<", tag);
    let mut at = from;
    while let Some(rel) = lc.get(at..)?.find(&pat) {
        let start = at + rel;
        let after = start + pat.len();
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(start),
            None => return None,
            _ => at = after,
        }
    }
    None
}

fn find_close(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = join!("</", tag);
    let mut at = from;
    while let Some(rel) = lc.get(at..)?.find(&pat) {
        let start = at + rel;
        let after = start + pat.len();
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' => return Some(start),
            None => return None,
            _ => at = after,
        }
    }
    None
}

/// Locate the element starting at or after `from`, honoring nesting of the same tag.
/// Returns `(start, end)` of the full `<tag …>…</tag>` block.
fn element_span(lc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let start = find_open(lc, tag, from)?;
    let mut cursor = lc[start..].find('>')? + start + 1;
    let mut depth = 1usize;

    loop {
        let close = find_close(lc, tag, cursor)?;
        match find_open(lc, tag, cursor) {
            Some(open) if open < close => {
                depth += 1;
                cursor = lc[open..].find('>')? + open + 1;
            }
            _ => {
                depth -= 1;
                let close_end = lc[close..].find('>')? + close + 1;
                if depth == 0 {
                    return Some((start, close_end));
                }
                cursor = close_end;
            }
        }
    }
}

/// Iterator over successive `<tag>` blocks of a document or fragment.
pub struct Blocks<'a> {
    raw: &'a str,
    lc: String,
    tag: String,
    pos: usize,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let (s, e) = element_span(&self.lc, &self.tag, self.pos)?;
        self.pos = e;
        Some(&self.raw[s..e])
    }
}

pub fn blocks<'a>(s: &'a str, tag: &str) -> Blocks<'a> {
    Blocks { raw: s, lc: to_lower(s), tag: to_lower(tag), pos: 0 }
}

/// The opening tag of a block, `<td data-stat="player" …>`.
pub fn open_tag(block: &str) -> &str {
    match block.find('>') {
        Some(i) => &block[..=i],
        None => block,
    }
}

/// Attribute value from the block's opening tag. Accepts double, single or no quotes.
pub fn attr(block: &str, name: &str) -> Option<String> {
    let tag = open_tag(block);
    let lc = to_lower(tag);
    let name = to_lower(name);
    let bytes = lc.as_bytes();
    let mut at = 0usize;

    while let Some(rel) = lc.get(at..)?.find(&name) {
        let start = at + rel;
        let before_ok = start > 0 && bytes[start - 1].is_ascii_whitespace();
        let mut i = start + name.len();
        at = i;
        if !before_ok { continue; }
        while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }
        if bytes.get(i) != Some(&b'=') { continue; }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }

        let value = match bytes.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let end = tag[i + 1..].find(q as char)? + i + 1;
                &tag[i + 1..end]
            }
            Some(_) => {
                let end = tag[i..]
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .map_or(tag.len(), |e| e + i);
                &tag[i..end]
            }
            None => return None,
        };
        return Some(normalize_entities(value));
    }
    None
}

/// First `<tag>` block whose `attr` equals `value` exactly.
pub fn element_with_attr<'a>(doc: &'a str, tag: &str, name: &str, value: &str) -> Option<&'a str> {
    blocks(doc, tag).find(|b| attr(b, name).as_deref() == Some(value))
}

/// Rows of a table's first `<tbody>`, or of the whole table if it has none.
pub fn body_rows(table: &str) -> Vec<&str> {
    match blocks(table, "tbody").next() {
        Some(body) => blocks(body, "tr").collect(),
        None => blocks(table, "tr").collect(),
    }
}

/// Header and data cells of a row, in document order.
pub fn cells(row: &str) -> Vec<&str> {
    let lc = to_lower(row);
    let body_start = row.find('>').map_or(0, |i| i + 1);
    let mut out = Vec::new();
    let mut pos = body_start;
    loop {
        let th = element_span(&lc, "th", pos);
        let td = element_span(&lc, "td", pos);
        let next = match (th, td) {
            (Some(a), Some(b)) => if a.0 < b.0 { a } else { b },
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => break,
        };
        out.push(&row[next.0..next.1]);
        pos = next.1;
    }
    out
}

/// First cell in the row carrying `data-stat="<stat>"`.
pub fn cell_by_stat<'a>(row: &'a str, stat: &str) -> Option<&'a str> {
    cells(row).into_iter().find(|c| attr(c, "data-stat").as_deref() == Some(stat))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

pub fn links(block: &str) -> Vec<Link> {
    blocks(block, "a")
        .filter_map(|a| {
            let href = attr(a, "href")?;
            Some(Link { href, text: text(a) })
        })
        .collect()
}

pub fn first_link(block: &str) -> Option<Link> {
    links(block).into_iter().next()
}

/// Visible text of a block: tags stripped, entities decoded, whitespace collapsed.
pub fn text(block: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(block)))
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}
