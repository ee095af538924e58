//! Benchmarks for the conversion pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use curvenote_schema::{EncodeOptions, from_json, from_mdast, normalize_footnotes, to_json, to_mdast};

/// A document mixing every kind of content, repeated `sections` times.
fn sample_document(sections: usize) -> Value {
    let section = |i: usize| {
        vec![
            json!({"type": "heading", "attrs": {"level": 2}, "content": [
                {"type": "text", "text": format!("Section {i}")}
            ]}),
            json!({"type": "paragraph", "content": [
                {"type": "text", "text": "Plain, "},
                {"type": "text", "marks": [{"type": "em"}], "text": "emphasised, "},
                {"type": "text", "marks": [{"type": "em"}, {"type": "strong"}], "text": "both"},
                {"type": "footnote", "content": [{"type": "text", "text": format!("Note {i}")}]},
                {"type": "text", "text": " and "},
                {"type": "math", "content": [{"type": "text", "text": "x^2"}]},
                {"type": "range", "attrs": {"valueFunction": "x", "changeFunction": "{x: value}"}}
            ]}),
            json!({"type": "bullet_list", "content": [
                {"type": "list_item", "content": [{"type": "paragraph", "content": [
                    {"type": "text", "marks": [{"type": "link", "attrs": {"href": "https://curvenote.com"}}], "text": "link"}
                ]}]},
                {"type": "list_item", "content": [{"type": "paragraph", "content": [
                    {"type": "text", "marks": [{"type": "code"}], "text": "code"}
                ]}]}
            ]}),
            json!({"type": "image", "attrs": {"src": "figure.png", "width": 50}}),
        ]
    };
    json!({"type": "doc", "content": (0..sections).flat_map(section).collect::<Vec<_>>()})
}

// ============================================================================
// Curvenote JSON
// ============================================================================

fn bench_from_json(c: &mut Criterion) {
    let doc = sample_document(50);
    c.bench_function("from_json", |b| {
        b.iter(|| from_json(black_box(&doc), "full").unwrap());
    });
}

fn bench_to_json(c: &mut Criterion) {
    let tree = from_json(&sample_document(50), "full").unwrap();
    c.bench_function("to_json", |b| {
        b.iter(|| to_json(black_box(&tree)));
    });
}

// ============================================================================
// mdast
// ============================================================================

fn bench_to_mdast(c: &mut Criterion) {
    let tree = from_json(&sample_document(50), "full").unwrap();
    let options = EncodeOptions::new();
    c.bench_function("to_mdast", |b| {
        b.iter(|| to_mdast(black_box(&tree), &options).unwrap());
    });
}

fn bench_from_mdast(c: &mut Criterion) {
    let tree = from_json(&sample_document(50), "full").unwrap();
    let mdast = to_mdast(&tree, &EncodeOptions::new()).unwrap();
    c.bench_function("from_mdast", |b| {
        b.iter(|| from_mdast(black_box(&mdast), "full").unwrap());
    });
}

fn bench_normalize_footnotes(c: &mut Criterion) {
    let tree = from_json(&sample_document(50), "full").unwrap();
    let mdast = to_mdast(&tree, &EncodeOptions::new()).unwrap();
    c.bench_function("normalize_footnotes", |b| {
        b.iter(|| normalize_footnotes(black_box(mdast.clone())));
    });
}

// ============================================================================
// Full round trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let doc = sample_document(50);
    let options = EncodeOptions::new();
    c.bench_function("round_trip", |b| {
        b.iter(|| {
            let tree = from_json(black_box(&doc), "full").unwrap();
            let mdast = to_mdast(&tree, &options).unwrap();
            to_json(&from_mdast(&mdast, "full").unwrap())
        });
    });
}

criterion_group!(
    benches,
    // Curvenote JSON
    bench_from_json,
    bench_to_json,
    // mdast
    bench_to_mdast,
    bench_from_mdast,
    bench_normalize_footnotes,
    // Full round trip
    bench_round_trip,
);

criterion_main!(benches);
