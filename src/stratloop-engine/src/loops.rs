// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Reinforcing/balancing classification of feedback loops

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{LinkId, NodeId};
use crate::cycles::{Cycle, CycleSet};
use crate::datamodel::{CausalLink, Polarity};
use crate::document::GraphView;

/// Loop polarity (Reinforcing or Balancing)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum LoopPolarity {
    Reinforcing, // R loop - even number of opposite links
    Balancing,   // B loop - odd number of opposite links
}

impl LoopPolarity {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopPolarity::Reinforcing => "reinforcing",
            LoopPolarity::Balancing => "balancing",
        }
    }

    fn id_prefix(self) -> char {
        match self {
            LoopPolarity::Reinforcing => 'r',
            LoopPolarity::Balancing => 'b',
        }
    }
}

impl fmt::Display for LoopPolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product of link signs around a closed path: positive is reinforcing,
/// negative is balancing.
pub fn loop_polarity(polarities: impl IntoIterator<Item = Polarity>) -> LoopPolarity {
    let sign: i8 = polarities.into_iter().map(Polarity::sign).product();
    if sign > 0 {
        LoopPolarity::Reinforcing
    } else {
        LoopPolarity::Balancing
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct FeedbackLoop {
    pub id: String,
    /// Traversal order; the first node implicitly closes the loop.
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,
    pub polarity: LoopPolarity,
    pub delayed_links: usize,
    pub description: String,
}

impl FeedbackLoop {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Format a loop as its labels in traversal order, closed by the first label.
pub fn format_path(view: &GraphView<'_>, nodes: &[NodeId]) -> String {
    let Some(first) = nodes.first() else {
        return String::new();
    };
    let mut path: Vec<&str> = nodes.iter().map(|id| view.label(id)).collect();
    path.push(view.label(first));
    path.join(" → ")
}

fn classify(
    view: &GraphView<'_>,
    links: &HashMap<&str, &CausalLink>,
    cycle: &Cycle,
) -> FeedbackLoop {
    // every cycle link comes from the same view, so lookups cannot miss
    let cycle_links: Vec<&CausalLink> = cycle
        .links
        .iter()
        .filter_map(|id| links.get(id.as_str()).copied())
        .collect();

    let polarity = loop_polarity(cycle_links.iter().map(|l| l.polarity));
    let delayed_links = cycle_links.iter().filter(|l| l.has_delay).count();

    let mut description = format!("{} ({})", format_path(view, &cycle.nodes), polarity);
    if delayed_links > 0 {
        let plural = if delayed_links == 1 { "" } else { "s" };
        description.push_str(&format!(", {delayed_links} delayed link{plural}"));
    }

    FeedbackLoop {
        id: String::new(), // assigned once all loops are classified
        nodes: cycle.nodes.clone(),
        links: cycle.links.clone(),
        polarity,
        delayed_links,
        description,
    }
}

/// Classify every cycle and assign deterministic ids (`r1`, `r2`, ... and
/// `b1`, `b2`, ...) in the cycle set's sorted order.
pub fn classify_loops(view: &GraphView<'_>, cycles: &CycleSet) -> Vec<FeedbackLoop> {
    let links: HashMap<&str, &CausalLink> =
        view.links().iter().map(|l| (l.id.as_str(), l)).collect();

    let mut loops: Vec<FeedbackLoop> = cycles
        .cycles
        .iter()
        .map(|cycle| classify(view, &links, cycle))
        .collect();

    let mut r_counter = 1;
    let mut b_counter = 1;
    for loop_item in loops.iter_mut() {
        let counter = match loop_item.polarity {
            LoopPolarity::Reinforcing => &mut r_counter,
            LoopPolarity::Balancing => &mut b_counter,
        };
        loop_item.id = format!("{}{}", loop_item.polarity.id_prefix(), counter);
        *counter += 1;
    }

    loops
}
