// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Benchmarks for loop enumeration and the full analysis pipeline on
//! random sparse diagrams.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stratloop_engine::{
    AnalysisConfig, CausalLink, CldDocument, CldNode, CycleLimits, Polarity, SwotCategory,
    VariableKind, analyze, enumerate_cycles,
};

/// A random diagram with `nodes` variables and roughly `degree` outgoing
/// links per variable.
fn random_document(nodes: usize, degree: usize, seed: u64) -> CldDocument {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut doc = CldDocument::new();
    for i in 0..nodes {
        let id = format!("v{i:03}");
        doc.add_node(CldNode::new(&id, &id, SwotCategory::Strength, VariableKind::Auxiliary))
            .unwrap();
    }
    let mut n = 0;
    for from in 0..nodes {
        for _ in 0..degree {
            let to = rng.random_range(0..nodes);
            if to == from {
                continue;
            }
            let polarity = if rng.random_bool(0.5) {
                Polarity::Same
            } else {
                Polarity::Opposite
            };
            let link = CausalLink::new(
                &format!("l{n}"),
                &format!("v{from:03}"),
                &format!("v{to:03}"),
                polarity,
            );
            doc.add_link(link).unwrap();
            n += 1;
        }
    }
    doc
}

fn bench_enumerate_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_cycles");
    let limits = CycleLimits::default();

    for nodes in [8, 16, 32] {
        let doc = random_document(nodes, 2, 42);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &doc, |b, doc| {
            b.iter(|| enumerate_cycles(black_box(&doc.view()), &limits))
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let config = AnalysisConfig::default();

    for nodes in [8, 16, 32] {
        let doc = random_document(nodes, 2, 7);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &doc, |b, doc| {
            b.iter(|| analyze(black_box(doc), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enumerate_cycles, bench_analyze);
criterion_main!(benches);
