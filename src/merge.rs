// src/merge.rs
//! Union of two namespace databases.
//!
//! IDs from different namespaces are expected not to overlap (PFR IDs are
//! mixed-case like `BradTo00`, BBR IDs lowercase like `abdelal01`). When they
//! do, the record from the later input replaces the earlier one in full, and
//! the collision is reported so it can be audited by hand.

use tracing::{info, warn};

use crate::model::Namespace;
use crate::store::EntityDb;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collision {
    pub id: String,
    /// Record that was replaced (from the earlier input).
    pub replaced: (Namespace, String),
    /// Record that won (from the later input).
    pub kept: (Namespace, String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub db: EntityDb,
    pub collisions: Vec<Collision>,
}

/// Every record of `first` and `second`, keyed by ID; `second` wins collisions.
pub fn merge(first: EntityDb, second: EntityDb) -> MergeOutcome {
    info!(first = first.len(), second = second.len(), "merging databases");

    let mut db = first;
    let mut collisions = Vec::new();

    for (_, rec) in second.into_records() {
        let kept = (rec.namespace(), rec.name().to_string());
        if let Some(old) = db.replace(rec) {
            let c = Collision {
                id: old.id().to_string(),
                replaced: (old.namespace(), old.name().to_string()),
                kept,
            };
            warn!(
                id = %c.id,
                replaced = %format!("{} ({})", c.replaced.1, c.replaced.0),
                kept = %format!("{} ({})", c.kept.1, c.kept.0),
                "id collision, later record overwrites"
            );
            collisions.push(c);
        }
    }

    info!(total = db.len(), collisions = collisions.len(), "merge complete");
    MergeOutcome { db, collisions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;

    fn db(ns: Namespace, entries: &[(&str, &str)]) -> EntityDb {
        let mut db = EntityDb::new();
        for (id, name) in entries {
            db.upsert(id, ns, &Observation::new().name(*name));
        }
        db
    }

    #[test]
    fn disjoint_inputs_union_in_either_order() {
        let a = db(Namespace::Nfl, &[("BradTo00", "Tom Brady"), ("MannPe00", "Peyton Manning")]);
        let b = db(Namespace::Nba, &[("jamesle01", "LeBron James")]);
        let ab = merge(a.clone(), b.clone());
        let ba = merge(b, a);
        assert_eq!(ab.db.len(), 3);
        assert!(ab.collisions.is_empty());
        assert_eq!(ab.db, ba.db);
    }

    #[test]
    fn collision_overwrites_in_full_and_is_reported() {
        let mut a = db(Namespace::Nfl, &[("smithjo01", "John Smith")]);
        a.upsert("smithjo01", Namespace::Nfl, &Observation::new().team("nfl_CRD"));
        let b = db(Namespace::Nba, &[("smithjo01", "Joe Smith")]);

        let out = merge(a, b);
        let rec = out.db.get("smithjo01").unwrap();
        assert_eq!(rec.name(), "Joe Smith");
        assert_eq!(rec.namespace(), Namespace::Nba);
        assert!(rec.teams().is_empty());
        assert_eq!(
            out.collisions,
            vec![Collision {
                id: s!("smithjo01"),
                replaced: (Namespace::Nfl, s!("John Smith")),
                kept: (Namespace::Nba, s!("Joe Smith")),
            }]
        );
    }
}
