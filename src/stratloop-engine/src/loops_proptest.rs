// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for cycle enumeration and loop classification.
//!
//! These tests verify that:
//! 1. Loop counts and polarities do not depend on how nodes are named
//! 2. Loop polarity is the parity of opposite links around the loop
//! 3. Every enumerated cycle is a simple closed walk over real links
//! 4. The full pipeline is idempotent

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use crate::analysis::analyze;
use crate::config::{AnalysisConfig, CycleLimits};
use crate::cycles::enumerate_cycles;
use crate::datamodel::{CausalLink, CldNode, Polarity, SwotCategory, VariableKind};
use crate::document::CldDocument;
use crate::loops::{LoopPolarity, classify_loops};

#[derive(Clone, Debug)]
struct Graph {
    n: usize,
    edges: Vec<(usize, usize, Polarity)>,
}

fn polarity_strategy() -> impl Strategy<Value = Polarity> {
    prop_oneof![Just(Polarity::Same), Just(Polarity::Opposite)]
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    (2usize..7).prop_flat_map(|n| {
        let edge = (0..n, 0..n, polarity_strategy());
        prop::collection::vec(edge, 0..14).prop_map(move |edges| Graph {
            n,
            edges: edges.into_iter().filter(|(a, b, _)| a != b).collect(),
        })
    })
}

fn graph_and_permutation() -> impl Strategy<Value = (Graph, Vec<usize>)> {
    graph_strategy().prop_flat_map(|graph| {
        let perm = Just((0..graph.n).collect::<Vec<_>>()).prop_shuffle();
        (Just(graph), perm)
    })
}

fn build(graph: &Graph, name: impl Fn(usize) -> String) -> CldDocument {
    let mut doc = CldDocument::new();
    for i in 0..graph.n {
        let id = name(i);
        doc.add_node(CldNode::new(&id, &id, SwotCategory::Strength, VariableKind::Auxiliary))
            .unwrap();
    }
    for (i, (a, b, polarity)) in graph.edges.iter().enumerate() {
        doc.add_link(CausalLink::new(&format!("e{i}"), &name(*a), &name(*b), *polarity)).unwrap();
    }
    doc
}

fn loop_signature(doc: &CldDocument) -> Vec<(bool, usize)> {
    let view = doc.view();
    let loops = classify_loops(&view, &enumerate_cycles(&view, &CycleLimits::default()));
    let mut sig: Vec<(bool, usize)> = loops
        .iter()
        .map(|l| (l.polarity == LoopPolarity::Reinforcing, l.len()))
        .collect();
    sig.sort();
    sig
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn loops_invariant_under_relabeling((graph, perm) in graph_and_permutation()) {
        let original = build(&graph, |i| format!("n{i}"));
        let relabeled = build(&graph, |i| format!("v{}", perm[i]));
        prop_assert_eq!(loop_signature(&original), loop_signature(&relabeled));
    }

    #[test]
    fn polarity_is_parity_of_opposite_links(graph in graph_strategy()) {
        let doc = build(&graph, |i| format!("n{i}"));
        let view = doc.view();
        let loops = classify_loops(&view, &enumerate_cycles(&view, &CycleLimits::default()));
        for l in &loops {
            let opposite = l
                .links
                .iter()
                .filter(|id| doc.link(id).unwrap().polarity == Polarity::Opposite)
                .count();
            let expected = if opposite % 2 == 0 {
                LoopPolarity::Reinforcing
            } else {
                LoopPolarity::Balancing
            };
            prop_assert_eq!(expected, l.polarity);
        }
    }

    #[test]
    fn cycles_are_simple_closed_walks(graph in graph_strategy()) {
        let doc = build(&graph, |i| format!("n{i}"));
        let set = enumerate_cycles(&doc.view(), &CycleLimits::default());
        prop_assert!(!set.is_truncated());

        let mut seen = HashSet::new();
        for cycle in &set.cycles {
            prop_assert!(seen.insert(cycle.clone()));
            let distinct: HashSet<&String> = cycle.nodes.iter().collect();
            prop_assert_eq!(cycle.nodes.len(), distinct.len());
            prop_assert_eq!(cycle.nodes.iter().min(), cycle.nodes.first());

            let links: HashMap<&str, &CausalLink> =
                doc.links().iter().map(|l| (l.id.as_str(), l)).collect();
            for (i, link_id) in cycle.links.iter().enumerate() {
                let link = links[link_id.as_str()];
                prop_assert_eq!(&cycle.nodes[i], &link.source_id);
                prop_assert_eq!(&cycle.nodes[(i + 1) % cycle.len()], &link.target_id);
            }
        }
    }

    #[test]
    fn pipeline_is_idempotent(graph in graph_strategy()) {
        let doc = build(&graph, |i| format!("n{i}"));
        let config = AnalysisConfig::default();
        prop_assert_eq!(analyze(&doc, &config), analyze(&doc, &config));
    }
}
