// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use stratloop_engine::{AnalysisConfig, Archetype, CldDocument, LoopPolarity, Tier, analyze};

fn polarity_counts(polarities: impl IntoIterator<Item = LoopPolarity>) -> (usize, usize) {
    polarities.into_iter().fold((0, 0), |(r, b), p| match p {
        LoopPolarity::Reinforcing => (r + 1, b),
        LoopPolarity::Balancing => (r, b + 1),
    })
}

#[test]
fn every_archetype_produces_its_loops() {
    for archetype in Archetype::all() {
        let mut doc = CldDocument::new();
        let ids = doc.instantiate_archetype(&archetype, "x").unwrap();
        assert_eq!(archetype.template().nodes.len(), ids.len());

        let analysis = analyze(&doc, &AnalysisConfig::default());
        assert_eq!(
            polarity_counts(archetype.expected_loops()),
            polarity_counts(analysis.loops.iter().map(|l| l.polarity)),
            "{}",
            archetype.name()
        );
        assert!(analysis.truncation.is_none());
        assert!(!analysis.options.is_empty(), "{}", archetype.name());
    }
}

#[test]
fn shifting_the_burden_end_to_end() {
    let archetype = Archetype::from_json(
        r#"{
            "type": "shifting_the_burden",
            "symptom": "Missed Deadlines",
            "symptomatic_solution": "Overtime",
            "fundamental_solution": "Hiring",
            "side_effect": "Burnout"
        }"#,
    )
    .unwrap();

    let mut doc = CldDocument::new();
    doc.instantiate_archetype(&archetype, "stb").unwrap();
    let analysis = analyze(&doc, &AnalysisConfig::default());

    let descriptions: Vec<&str> = analysis
        .loops
        .iter()
        .map(|l| l.description.as_str())
        .collect();
    let fundamental = "Hiring → Missed Deadlines → Hiring (balancing), 2 delayed links";
    let symptomatic = "Missed Deadlines → Overtime → Missed Deadlines (balancing)";
    assert!(descriptions.contains(&fundamental));
    assert!(descriptions.contains(&symptomatic));

    // the symptom sits on all three loops
    let top = &analysis.leverage_points[0];
    assert_eq!("stb-symptom", top.node_id);
    assert_eq!(Tier::High, top.impact);
    assert_eq!(3, top.loop_ids.len());
}

#[test]
fn two_instances_coexist() {
    let mut doc = CldDocument::new();
    let escalation = Archetype::from_name("escalation").unwrap();
    doc.instantiate_archetype(&escalation, "one").unwrap();
    doc.instantiate_archetype(&escalation, "two").unwrap();
    assert!(doc.instantiate_archetype(&escalation, "two").is_err());

    let analysis = analyze(&doc, &AnalysisConfig::default());
    assert_eq!(4, analysis.loops.len());
    assert_eq!(6, doc.nodes().len());
}
