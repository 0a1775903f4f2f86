// src/canon.rs
//! Collapse name variants (`"UNC"`, `"North Carolina"`) onto one canonical spelling.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::{Result, ScrapeError};
use crate::model::TagField;
use crate::store::{EntityDb, load_json};

/// Variant → canonical name. Names not in the map are their own canonical form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalMap {
    map: HashMap<String, String>,
}

impl CanonicalMap {
    /// Build from `{ key: [canon, alt1, alt2, ...] }` groups.
    ///
    /// Chains across groups (a canonical listed as someone else's variant) are
    /// followed to the end, so mapping is a fixed point after one application.
    /// Every name on a cycle maps to the member that is canonical in the
    /// earliest group.
    pub fn from_groups<I, V>(groups: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[String]>,
    {
        let mut direct: HashMap<String, String> = HashMap::new();
        let mut rank: HashMap<String, usize> = HashMap::new();
        for (i, group) in groups.into_iter().enumerate() {
            let group = group.as_ref();
            let Some((canon, alts)) = group.split_first() else { continue };
            rank.entry(canon.clone()).or_insert(i);
            for alt in alts {
                if alt == canon { continue; }
                if let Some(prev) = direct.insert(alt.clone(), canon.clone()) {
                    if prev != *canon {
                        warn!(variant = %alt, first = %prev, now = %canon, "variant listed in two groups, later group wins");
                    }
                }
            }
        }

        let mut map = HashMap::with_capacity(direct.len());
        for alt in direct.keys() {
            let mut path: Vec<&str> = vec![alt.as_str()];
            let mut cur = alt.as_str();
            while let Some(next) = direct.get(cur) {
                if let Some(at) = path.iter().position(|p| *p == next.as_str()) {
                    cur = cycle_representative(&path[at..], &rank);
                    warn!(variant = %alt, canonical = %cur, "cycle in canonical groups");
                    break;
                }
                cur = next.as_str();
                path.push(cur);
            }
            if cur != alt.as_str() {
                map.insert(alt.clone(), cur.to_string());
            }
        }
        Self { map }
    }

    /// Read the grouped-variants JSON file. Groups apply in file order, so a
    /// variant listed twice belongs to the group written last.
    pub fn load(path: &Path) -> Result<Self> {
        let groups: Map<String, Value> = load_json(path)?.ok_or_else(|| {
            ScrapeError::io(path, std::io::Error::from(std::io::ErrorKind::NotFound))
        })?;
        let groups = groups
            .into_iter()
            .map(|(_, names)| serde_json::from_value::<Vec<String>>(names))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| ScrapeError::CorruptSnapshot { path: path.to_path_buf(), source })?;
        Ok(Self::from_groups(groups))
    }

    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map_or(name, String::as_str)
    }

    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }
}

fn cycle_representative<'a>(cycle: &[&'a str], rank: &HashMap<String, usize>) -> &'a str {
    cycle
        .iter()
        .copied()
        .min_by_key(|name| (rank.get(*name).copied().unwrap_or(usize::MAX), *name))
        .unwrap_or_default()
}

/// Rewrite `field` on every record through `map`, then dedupe first-wins.
/// Returns how many records had at least one element rewritten.
pub fn normalize(db: &mut EntityDb, map: &CanonicalMap, field: TagField) -> usize {
    let mut changed = 0usize;
    for rec in db.iter_mut() {
        let mut any = false;
        let rewritten: Vec<String> = rec
            .tags(field)
            .iter()
            .map(|v| {
                let c = map.canonical(v);
                any |= c != v.as_str();
                c.to_string()
            })
            .collect();
        if any {
            rec.set_tags(field, rewritten);
            changed += 1;
        }
    }
    info!(?field, records = changed, "normalized");
    changed
}
