use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use serde_json::{Map, Value};

use dnfidx::core::handler::Handler;
use dnfidx::core::types::{Cond, DocAttr};

#[derive(Debug, Clone)]
struct AdAttr {
    duration: u32,
}

impl DocAttr for AdAttr {
    fn to_text(&self) -> String {
        format!("{{duration: {}}}", self.duration)
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("duration".to_string(), self.duration.into());
        m
    }
}

const REGIONS: [&str; 8] = ["SH", "BJ", "CD", "GZ", "HZ", "SZ", "WH", "NJ"];

/// Random audience expression over a small attribute vocabulary, so interned
/// terms and conjunctions are shared across documents the way a real
/// targeting corpus shares them.
fn random_dnf(rng: &mut impl Rng) -> String {
    let r1 = REGIONS[rng.gen_range(0..REGIONS.len())];
    let r2 = REGIONS[rng.gen_range(0..REGIONS.len())];
    let age = rng.gen_range(1..9);
    let op = if rng.gen_bool(0.8) { "in" } else { "not in" };
    format!("(region in {{{}, {}}} and age {} {{{}}})", r1, r2, op, age)
}

fn build_handler(docs: usize) -> Handler<AdAttr> {
    let mut rng = rand::thread_rng();
    let handler = Handler::new();
    for i in 0..docs {
        handler
            .add_document(
                &format!("ad-{}", i),
                &i.to_string(),
                &random_dnf(&mut rng),
                AdAttr {
                    duration: rng.gen_range(5..60),
                },
            )
            .unwrap();
    }
    handler
}

fn bench_add_document(c: &mut Criterion) {
    c.bench_function("add_document", |b| {
        let mut rng = rand::thread_rng();
        let handler = Handler::new();
        let mut id = 0usize;
        b.iter(|| {
            let dnf = random_dnf(&mut rng);
            handler
                .add_document(&format!("ad-{}", id), &id.to_string(), &dnf, AdAttr {
                    duration: 30,
                })
                .unwrap();
            id += 1;
        });
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for corpus in [100usize, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(corpus),
            &corpus,
            |b, &corpus| {
                let handler = build_handler(corpus);
                let conds = vec![Cond::new("region", "BJ"), Cond::new("age", "3")];
                b.iter(|| {
                    let docs = handler
                        .search(black_box(&conds), |attr| attr.duration <= 30)
                        .unwrap();
                    black_box(docs);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_add_document, bench_search);
criterion_main!(benches);
