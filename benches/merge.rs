// benches/merge.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use roster_scrape::canon::{self, CanonicalMap};
use roster_scrape::merge;
use roster_scrape::model::{Namespace, Observation, TagField};
use roster_scrape::store::EntityDb;

fn build(ns: Namespace, prefix: &str, n: usize) -> EntityDb {
    let mut db = EntityDb::new();
    for i in 0..n {
        let obs = Observation::new()
            .name(format!("Player {i}"))
            .years(Some(1950 + (i % 60) as i32), Some(1960 + (i % 60) as i32))
            .team(format!("{}T{}", ns.team_prefix(), i % 30))
            .number((i % 100).to_string())
            .affiliation(if i % 3 == 0 { "UNC" } else { "Duke" });
        db.upsert(&format!("{prefix}{i:05}"), ns, &obs);
    }
    db
}

fn bench_merge(c: &mut Criterion) {
    c.bench_function("upsert_reapply_5k", |b| {
        let mut db = build(Namespace::Nba, "p", 5_000);
        let obs = Observation::new().team("nba_T1").number("23").years(Some(1990), Some(2000));
        b.iter(|| {
            for i in 0..5_000 {
                db.upsert(black_box(&format!("p{i:05}")), Namespace::Nba, black_box(&obs));
            }
        })
    });

    let nfl = build(Namespace::Nfl, "Nf", 10_000);
    let nba = build(Namespace::Nba, "nb", 5_000);
    c.bench_function("merge_15k", |b| {
        b.iter(|| black_box(merge::merge(nfl.clone(), nba.clone()).db.len()))
    });

    let map = CanonicalMap::from_groups([vec!["North Carolina".to_string(), "UNC".to_string()]]);
    c.bench_function("normalize_10k", |b| {
        b.iter(|| {
            let mut db = nfl.clone();
            black_box(canon::normalize(&mut db, &map, TagField::Affiliations))
        })
    });
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
