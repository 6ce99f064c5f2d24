// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Structural leverage point identification.
//!
//! Every node is assessed against four heuristics: dominant-loop
//! counterweight, loop multiplicity, mixed polarity, and hub degree. The
//! number of satisfied heuristics and the node's loop count map to an impact
//! tier through the thresholds in [`LeveragePolicy`]:
//!
//! | tier   | condition                                                       |
//! |--------|-----------------------------------------------------------------|
//! | high   | dominant-loop counterweight, `>= high_heuristics` heuristics,   |
//! |        | or `>= high_loop_count` loops                                   |
//! | medium | at least one heuristic, or membership in a loop                 |
//! | low    | otherwise                                                       |
//!
//! Loop counts used by the counterweight heuristic are scoped to the node's
//! weakly connected component, so disjoint parts of a diagram never affect
//! each other's scores.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::NodeId;
use crate::config::LeveragePolicy;
use crate::datamodel::Tier;
use crate::document::GraphView;
use crate::loops::{FeedbackLoop, LoopPolarity};

/// Why a node is a leverage point. The first four variants are the scored
/// heuristics, in priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum LeverageKind {
    /// Member only of the minority balancing loops in a reinforcing-dominated component.
    DominantLoopCounterweight,
    /// Shared across several loops.
    LoopMultiplicity,
    /// On both reinforcing and balancing loops.
    MixedPolarity,
    /// High combined in+out degree.
    Hub,
    /// On exactly one loop, no heuristic satisfied.
    LoopMember,
    /// Linked into the diagram but on no loop.
    Peripheral,
}

impl LeverageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LeverageKind::DominantLoopCounterweight => "dominant-loop-counterweight",
            LeverageKind::LoopMultiplicity => "loop-multiplicity",
            LeverageKind::MixedPolarity => "mixed-polarity",
            LeverageKind::Hub => "hub",
            LeverageKind::LoopMember => "loop-member",
            LeverageKind::Peripheral => "peripheral",
        }
    }
}

impl fmt::Display for LeverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('-', " "))
    }
}

/// Structural role of a single node, computed for every node in the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeAssessment {
    pub node_id: NodeId,
    pub loop_ids: Vec<String>,
    pub reinforcing_loops: usize,
    pub balancing_loops: usize,
    pub degree: usize,
    /// Component-wide loop counts: (reinforcing, balancing).
    pub component_loops: (usize, usize),
    /// Satisfied heuristics, in priority order.
    pub heuristics: Vec<LeverageKind>,
    pub score: usize,
    pub impact: Tier,
}

impl NodeAssessment {
    pub fn loop_count(&self) -> usize {
        self.loop_ids.len()
    }

    pub fn kind(&self) -> LeverageKind {
        match self.heuristics.first() {
            Some(kind) => *kind,
            None if !self.loop_ids.is_empty() => LeverageKind::LoopMember,
            None => LeverageKind::Peripheral,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct LeveragePoint {
    pub id: String,
    pub node_id: NodeId,
    #[serde(rename = "type")]
    pub kind: LeverageKind,
    pub heuristics: Vec<LeverageKind>,
    pub loop_ids: Vec<String>,
    pub degree: usize,
    pub impact: Tier,
    pub score: usize,
    pub description: String,
}

pub fn leverage_point_id(node_id: &str) -> String {
    format!("lp-{node_id}")
}

/// Weakly connected components: each node maps to the smallest node id in
/// its component.
fn components<'a>(view: &GraphView<'a>) -> HashMap<&'a str, &'a str> {
    let mut neighbors: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    for link in view.links() {
        let (from, to) = (link.source_id.as_str(), link.target_id.as_str());
        neighbors.entry(from).or_default().push(to);
        neighbors.entry(to).or_default().push(from);
    }

    // node ids come out sorted, so every BFS starts at its component's
    // smallest member
    let mut component_of: HashMap<&'a str, &'a str> = HashMap::new();
    for root in view.node_ids() {
        if component_of.contains_key(root) {
            continue;
        }
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            if component_of.contains_key(id) {
                continue;
            }
            component_of.insert(id, root);
            for &next in neighbors.get(id).into_iter().flatten() {
                if !component_of.contains_key(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    component_of
}

/// Assess every node in `view`, in ascending node id order.
pub fn assess_nodes(
    view: &GraphView<'_>,
    loops: &[FeedbackLoop],
    policy: &LeveragePolicy,
) -> Vec<NodeAssessment> {
    let component_of = components(view);

    let mut component_loops: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut node_loops: BTreeMap<&str, Vec<&FeedbackLoop>> = BTreeMap::new();
    for loop_item in loops {
        if let Some(component) = loop_item
            .nodes
            .first()
            .and_then(|n| component_of.get(n.as_str()))
            .copied()
        {
            let counts = component_loops.entry(component).or_default();
            match loop_item.polarity {
                LoopPolarity::Reinforcing => counts.0 += 1,
                LoopPolarity::Balancing => counts.1 += 1,
            }
        }
        for node in &loop_item.nodes {
            node_loops.entry(node.as_str()).or_default().push(loop_item);
        }
    }

    view.node_ids()
        .map(|id| {
            let member_of = node_loops.get(id).map(|l| l.as_slice()).unwrap_or(&[]);
            let reinforcing = member_of
                .iter()
                .filter(|l| l.polarity == LoopPolarity::Reinforcing)
                .count();
            let balancing = member_of.len() - reinforcing;
            let degree = view.degree(id);
            let comp = component_of
                .get(id)
                .and_then(|c| component_loops.get(c))
                .copied()
                .unwrap_or_default();

            let mut heuristics = vec![];
            if comp.0 > comp.1 && comp.1 >= 1 && balancing >= 1 && reinforcing == 0 {
                heuristics.push(LeverageKind::DominantLoopCounterweight);
            }
            if member_of.len() >= policy.multiplicity_threshold {
                heuristics.push(LeverageKind::LoopMultiplicity);
            }
            if reinforcing >= 1 && balancing >= 1 {
                heuristics.push(LeverageKind::MixedPolarity);
            }
            if degree >= policy.hub_degree_threshold {
                heuristics.push(LeverageKind::Hub);
            }

            let loop_count = member_of.len();
            let impact = if heuristics.contains(&LeverageKind::DominantLoopCounterweight)
                || heuristics.len() >= policy.high_heuristics
                || loop_count >= policy.high_loop_count
            {
                Tier::High
            } else if !heuristics.is_empty() || loop_count >= 1 {
                Tier::Medium
            } else {
                Tier::Low
            };

            NodeAssessment {
                node_id: id.to_owned(),
                loop_ids: member_of.iter().map(|l| l.id.clone()).collect(),
                reinforcing_loops: reinforcing,
                balancing_loops: balancing,
                degree,
                component_loops: comp,
                score: 2 * heuristics.len() + loop_count,
                heuristics,
                impact,
            }
        })
        .collect()
}

fn describe(view: &GraphView<'_>, a: &NodeAssessment) -> String {
    let label = view.label(&a.node_id);
    let loop_list = a.loop_ids.join(", ");
    let primary = match a.kind() {
        LeverageKind::DominantLoopCounterweight => format!(
            "{label} sits only on balancing loop(s) {loop_list} in a structure dominated by \
             {} reinforcing vs {} balancing loops; strengthening or weakening it shifts the \
             balance of the whole structure.",
            a.component_loops.0, a.component_loops.1
        ),
        LeverageKind::LoopMultiplicity => format!(
            "{label} is shared across {} feedback loops ({loop_list}); intervening here affects \
             all of them at once.",
            a.loop_count()
        ),
        LeverageKind::MixedPolarity => format!(
            "{label} couples reinforcing and balancing feedback ({loop_list})."
        ),
        LeverageKind::Hub => format!(
            "{label} has {} causal links, coupling otherwise separate parts of the diagram.",
            a.degree
        ),
        LeverageKind::LoopMember => format!("{label} participates in loop {loop_list}."),
        LeverageKind::Peripheral => {
            format!("{label} is linked into the diagram but lies on no feedback loop.")
        }
    };

    if a.heuristics.len() > 1 {
        let also: Vec<String> = a.heuristics[1..].iter().map(|h| h.to_string()).collect();
        format!("{primary} Also flagged as: {}.", also.join(", "))
    } else {
        primary
    }
}

/// Rank nodes by structural intervention value and report those at or above
/// `policy.min_reported_impact`, ordered by impact, score, then node id.
pub fn identify_leverage_points(
    view: &GraphView<'_>,
    loops: &[FeedbackLoop],
    policy: &LeveragePolicy,
) -> Vec<LeveragePoint> {
    let mut points: Vec<LeveragePoint> = assess_nodes(view, loops, policy)
        .into_iter()
        .filter(|a| a.impact >= policy.min_reported_impact)
        // an unlinked node is never a leverage point
        .filter(|a| a.impact > Tier::Low || a.degree > 0)
        .map(|a| LeveragePoint {
            id: leverage_point_id(&a.node_id),
            description: describe(view, &a),
            kind: a.kind(),
            impact: a.impact,
            score: a.score,
            degree: a.degree,
            node_id: a.node_id,
            heuristics: a.heuristics,
            loop_ids: a.loop_ids,
        })
        .collect();

    points.sort_by(|a, b| {
        b.impact
            .cmp(&a.impact)
            .then(b.score.cmp(&a.score))
            .then(a.node_id.cmp(&b.node_id))
    });

    debug!(
        leverage_points = points.len(),
        high = points.iter().filter(|p| p.impact == Tier::High).count(),
        "identified leverage points"
    );

    points
}
