//! Benchmark – decode and encode throughput over a synthetic corpus.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lineproto::{Decoder, Encoder, Precision, Value};

/// Builds a deterministic corpus of `lines` points with a few tags and a
/// mixed bag of field types, shaped like typical telemetry traffic.
fn make_corpus(lines: usize) -> Vec<u8> {
    let mut enc = Encoder::new();
    for i in 0..lines {
        enc.start_line("benchmark measurement");
        enc.add_tag("data center", "us-west-1");
        enc.add_tag("host", format!("server-{:04}", i % 64));
        enc.add_tag("rack", "a,b=c");
        enc.add_field("free", Value::Uint(1 << 30));
        enc.add_field("load", Value::Float(0.25 + (i % 100) as f64 / 100.0));
        enc.add_field("msg", Value::from("status \"ok\" for now"));
        enc.add_field("up", Value::Bool(true));
        enc.end_line(Some(1_700_000_000_000_000_000 + i as i64));
    }
    assert!(enc.err().is_none());
    enc.bytes().to_vec()
}

/// Decodes every section of every entry and returns a checksum so the
/// work cannot be optimised away.
fn decode_all(data: &[u8]) -> usize {
    let mut total = 0usize;
    let mut dec = Decoder::new(data);
    while dec.next_entry() {
        total += dec.measurement().unwrap().map_or(0, <[u8]>::len);
        while let Some((k, v)) = dec.next_tag().unwrap() {
            total += k.len() + v.len();
        }
        while let Some((k, _)) = dec.next_field().unwrap() {
            total += k.len();
        }
        if dec.time(Precision::Nanosecond, None).unwrap().is_some() {
            total += 1;
        }
    }
    total
}

/// Decodes only the timestamps, exercising the section-skipping path.
fn decode_times_only(data: &[u8]) -> usize {
    let mut total = 0usize;
    let mut dec = Decoder::new(data);
    while dec.next_entry() {
        total += dec.time_bytes().unwrap().map_or(0, <[u8]>::len);
    }
    total
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for lines in [100usize, 10_000] {
        let corpus = make_corpus(lines);
        group.throughput(Throughput::Bytes(corpus.len() as u64));
        group.bench_with_input(BenchmarkId::new("all-sections", lines), &corpus, |b, data| {
            b.iter(|| decode_all(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("times-only", lines), &corpus, |b, data| {
            b.iter(|| decode_times_only(black_box(data)));
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let reference = make_corpus(100);
    group.throughput(Throughput::Bytes(reference.len() as u64));
    group.bench_function("100-points", |b| {
        b.iter(|| black_box(make_corpus(100).len()));
    });
    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
