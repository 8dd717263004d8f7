//! Dump parsing and sample set statistics benchmark
//!
//! Measures the two costs paid for every imported run:
//!
//! 1. `DumpParser::parse_str` - scanning a raw dump into per-counter samples
//! 2. `SampleSet::new` - sorting plus computing `Meta` (extremes, covariance)
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench sample_set_meta
//! ```

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use proctrack::meta::PID_READING;
use proctrack::parser::DumpParser;
use proctrack::sample::Sample;
use proctrack::sample_set::{SampleSet, Validation};
use proctrack::timestamp;
use std::fmt::Write as _;

const READINGS: [&str; 6] = [
    "working set",
    "private bytes",
    "% processor time",
    "handle count",
    "thread count",
    "io read bytes/sec",
];

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Build a dump with `records` records of `processes` processes each
fn create_bench_dump(records: usize, processes: usize) -> String {
    let mut dump = String::new();
    for r in 0..records {
        let ts = base() + TimeDelta::seconds(r as i64 * 5);
        let _ = writeln!(dump, "Timestamp : {}", timestamp::format(&ts));
        for p in 0..processes {
            let _ = writeln!(dump, "\\\\host\\process(proc#{})\\{} :", p, PID_READING);
            let _ = writeln!(dump, "{}", 1000 + p);
            for (k, name) in READINGS.iter().enumerate() {
                let _ = writeln!(dump, "\\\\host\\process(proc#{})\\{} :", p, name);
                let _ = writeln!(dump, "{}", (r * 31 + k * 7 + p) % 1000);
            }
        }
        dump.push_str("End :\n");
    }
    dump
}

fn create_bench_samples(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let ts = base() + TimeDelta::seconds(i as i64 * 5);
            let pairs = std::iter::once((PID_READING, 42.0)).chain(
                READINGS
                    .iter()
                    .enumerate()
                    .map(|(k, &name)| (name, ((i * 13 + k) % 97) as f64)),
            );
            Sample::from_pairs(ts, pairs).unwrap()
        })
        .collect()
}

/// Benchmark: parsing dumps of increasing length
fn bench_dump_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dump_parse");

    for records in [10, 100, 1000] {
        let dump = create_bench_dump(records, 8);
        group.bench_with_input(BenchmarkId::from_parameter(records), &dump, |b, dump| {
            let parser = DumpParser::new();
            b.iter(|| black_box(parser.parse_str(black_box(dump)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: sample set construction, dominated by `Meta` computation
fn bench_sample_set_new(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_set_new");

    for count in [10, 100, 1000, 10_000] {
        let samples = create_bench_samples(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| {
                black_box(SampleSet::new("proc#0", samples.clone(), Validation::strict()).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dump_parse, bench_sample_set_new);
criterion_main!(benches);
