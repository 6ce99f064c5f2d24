// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Plain-text rendering of analysis results.

use std::fmt::Write;

use stratloop_engine::{Analysis, Archetype, FeedbackLoop, LoopPolarity};

fn loop_line(out: &mut String, l: &FeedbackLoop) {
    let tag = match l.polarity {
        LoopPolarity::Reinforcing => "R",
        LoopPolarity::Balancing => "B",
    };
    let _ = writeln!(out, "  {:<4} [{tag}] {}", l.id, l.description);
}

pub fn render_loops(analysis: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Feedback loops ({}):", analysis.loops.len());
    for l in &analysis.loops {
        loop_line(&mut out, l);
    }
    if let Some(truncation) = &analysis.truncation {
        let _ = writeln!(out, "  warning: {truncation}");
    }
    out
}

pub fn render_analysis(analysis: &Analysis) -> String {
    let mut out = render_loops(analysis);

    let _ = writeln!(out, "\nLeverage points ({}):", analysis.leverage_points.len());
    for p in &analysis.leverage_points {
        let _ = writeln!(
            out,
            "  {:<6} {:<20} score {:>2}  {}",
            p.impact.as_str(),
            p.kind.to_string(),
            p.score,
            p.description
        );
    }

    let _ = writeln!(out, "\nStrategic options ({}):", analysis.options.len());
    for o in &analysis.options {
        let _ = writeln!(out, "  {} {} (feasibility: {})", o.id, o.title, o.feasibility);
        let _ = writeln!(out, "      {}", o.description);
        let pe = &o.political_economy;
        let _ = writeln!(out, "      power:        {}", pe.power_alignment);
        let _ = writeln!(out, "      institutions: {}", pe.institutional_capacity);
        let _ = writeln!(out, "      horizon:      {}", pe.time_horizon);
        let _ = writeln!(out, "      coalition:    {}", pe.stakeholder_coalition);
    }

    if !analysis.stale_references.is_empty() {
        let _ = writeln!(out, "\nSkipped stale references:");
        for s in &analysis.stale_references {
            let _ = writeln!(out, "  {} (node {}): {}", s.leverage_point_id, s.node_id, s.reason);
        }
    }
    out
}

pub fn render_archetypes(archetypes: &[Archetype]) -> String {
    let mut out = String::new();
    for a in archetypes {
        let loops: Vec<&str> = a
            .expected_loops()
            .into_iter()
            .map(|p| match p {
                LoopPolarity::Reinforcing => "R",
                LoopPolarity::Balancing => "B",
            })
            .collect();
        let vars: Vec<&str> = a.template().nodes.iter().map(|n| n.key).collect();
        let _ = writeln!(out, "{:<28} {}", a.name(), a.title());
        let _ = writeln!(out, "    {}", a.summary());
        let _ = writeln!(out, "    loops: {}  variables: {}", loops.join(" "), vars.join(", "));
    }
    out
}
