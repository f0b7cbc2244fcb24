//! Benchmarks for normcheck-core.
//!
//! Run with: `cargo bench -p normcheck-core`
//!
//! Results are saved to `target/criterion/` with HTML reports.

use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use normcheck_core::fixture::parse_line;
use normcheck_core::{CategoryFilter, FixtureFile, FnNormalizer, Runner};

/// Representative fixture lines.
const LINES: &[(&str, &str)] = &[
    ("short", "123|||cardinal"),
    ("expected", "123|||cardinal|||one hundred twenty three"),
    ("tamil", "நான் 1 நாளில் 12:30 மணிக்கு ₹100 வாங்கினேன்|||mixed"),
    ("padded", "   $2.50   |||  money  ||| two dollars fifty cents  "),
    ("comment", "# a comment line that is skipped"),
    ("malformed", "badline-no-delimiter"),
];

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");
    for (name, line) in LINES {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, line| {
            b.iter(|| parse_line(black_box(line), 1))
        });
    }
    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("en.txt");
    let mut contents = String::new();
    for i in 0..1_000 {
        let category = if i % 3 == 0 { "time" } else { "cardinal" };
        writeln!(contents, "{i}|||{category}|||{i}").unwrap();
    }
    std::fs::write(&path, contents).unwrap();

    let file = FixtureFile::new("en", path);
    let identity = FnNormalizer::new("identity", |input: &str, _category: &str| {
        Ok(input.to_string())
    });
    let runner = Runner::new(&identity);

    let mut group = c.benchmark_group("run");
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("all", |b| {
        b.iter(|| runner.run(&file, &CategoryFilter::all()).unwrap())
    });
    group.bench_function("filtered", |b| {
        b.iter(|| runner.run(&file, &CategoryFilter::only("time")).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_parse_line, bench_run);
criterion_main!(benches);
