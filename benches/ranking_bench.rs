//! Ranking throughput over synthetic catalogs.
//!
//! Simulates catalog response sizes:
//! - page:    25 records (one catalog page)
//! - full:    100 records (largest catalog page)
//! - local:   2000 records (a large `--from` file)
//!
//! Run with: cargo bench

use bookrank::catalog::StaticCatalog;
use bookrank::normalize::normalize_all;
use bookrank::pipeline::{run_search, SearchRequest};
use bookrank::report::render_report;
use bookrank::scoring::{rank, RankerConfig};
use bookrank::types::{Field, Query, RawRecord};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// CATALOG SIMULATION
// ============================================================================

const SIZES: &[(&str, usize)] = &[("page", 25), ("full", 100), ("local", 2000)];

const WORDS: &[&str] = &[
    "distributed", "systems", "rust", "programming", "data", "design", "network", "compiler",
    "algorithms", "database", "concurrency", "patterns", "introduction", "advanced", "practical",
    "engineering", "theory", "language", "operating", "security",
];

/// Deterministic pseudo-random word picker (LCG).
struct Words(u64);

impl Words {
    fn pick(&mut self) -> &'static str {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        WORDS[(self.0 >> 33) as usize % WORDS.len()]
    }

    fn phrase(&mut self, len: usize) -> String {
        (0..len).map(|_| self.pick()).collect::<Vec<_>>().join(" ")
    }
}

fn catalog(size: usize) -> Vec<RawRecord> {
    let mut words = Words(42);
    (0..size)
        .map(|i| {
            RawRecord::new()
                .with(Field::Id, i.to_string())
                .with(Field::Title, words.phrase(4))
                .with(Field::Author, format!("{} {}", words.pick(), words.pick()))
                .with(Field::Publisher, "Example Press")
                .with(Field::Year, (1990 + i % 35) as f64)
                .with(Field::Language, "English")
                .with(Field::Size, (i * 4096) as f64)
                .with(Field::Extension, "pdf")
        })
        .collect()
}

// ============================================================================
// BENCHMARKS
// ============================================================================

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let config = RankerConfig::default();
    let query = Query::new("distributed systems programming");

    for &(name, size) in SIZES {
        let records = catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &records, |b, records| {
            b.iter(|| rank(black_box(&query), records.clone(), 25, &config))
        });
    }
    group.finish();
}

fn bench_normalize_and_report(c: &mut Criterion) {
    let config = RankerConfig::default();
    let scored = rank(&Query::new("rust"), catalog(100), 100, &config).unwrap_or_default();

    c.bench_function("normalize_100", |b| b.iter(|| normalize_all(black_box(&scored))));

    let results = normalize_all(&scored);
    c.bench_function("render_report_100", |b| b.iter(|| render_report(black_box(&results))));
}

fn bench_pipeline(c: &mut Criterion) {
    let config = RankerConfig::default();
    let catalog = StaticCatalog::new(catalog(100));
    let request = SearchRequest::new(Query::new("practical rust concurrency"), 25);

    c.bench_function("run_search_100", |b| {
        b.iter(|| run_search(black_box(&catalog), &request, &config, 100))
    });
}

criterion_group!(benches, bench_rank, bench_normalize_and_report, bench_pipeline);
criterion_main!(benches);
