// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Enumeration of simple directed cycles in a causal loop diagram.
//!
//! Cycles are unique up to rotation but not up to edge choice: two parallel
//! links `a -> b` yield two distinct cycles through `a` and `b`.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::common::{LinkId, NodeId};
use crate::config::CycleLimits;
use crate::document::GraphView;

/// A simple cycle in canonical rotation: `nodes[0]` is the smallest node id,
/// and `links[i]` goes from `nodes[i]` to `nodes[(i + 1) % len]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cycle {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,
}

impl Cycle {
    /// Build a cycle from a closed walk given in any rotation.
    pub fn new(nodes: Vec<NodeId>, links: Vec<LinkId>) -> Self {
        debug_assert_eq!(nodes.len(), links.len());
        let mut cycle = Cycle { nodes, links };
        cycle.canonicalize();
        cycle
    }

    fn canonicalize(&mut self) {
        let Some(min_pos) = self
            .nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)
        else {
            return;
        };
        self.nodes.rotate_left(min_pos);
        self.links.rotate_left(min_pos);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum TruncationReason {
    /// The graph has more nodes than the configured ceiling; nothing was searched.
    NodeLimit,
    /// More cycles exist than the configured ceiling.
    CycleLimit,
    /// Some paths were cut at the configured maximum cycle length.
    LengthLimit,
    /// The search took more path extensions than the configured budget.
    StepLimit,
}

/// Explicit report that the cycle set is incomplete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Truncation {
    pub reason: TruncationReason,
    pub limit: usize,
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            TruncationReason::NodeLimit => {
                write!(f, "graph exceeds {} nodes; loops were not enumerated", self.limit)
            }
            TruncationReason::CycleLimit => {
                write!(f, "stopped after {} loops; more exist", self.limit)
            }
            TruncationReason::LengthLimit => {
                write!(f, "loops longer than {} links were not searched", self.limit)
            }
            TruncationReason::StepLimit => {
                write!(f, "search stopped after {} path extensions", self.limit)
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleSet {
    /// Sorted by (node sequence, link sequence).
    pub cycles: Vec<Cycle>,
    pub truncation: Option<Truncation>,
}

impl CycleSet {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

type Path = SmallVec<[(usize, usize); 16]>;

struct Search<'g> {
    /// Outgoing (target index, link index) pairs per node, in link order.
    adjacency: Vec<Vec<(usize, usize)>>,
    /// Incoming source indices per node.
    reverse: Vec<Vec<usize>>,
    on_path: Vec<bool>,
    /// Nodes that can get back to the current start through nodes above it.
    closes: Vec<bool>,
    max_len: usize,
    max_cycles: usize,
    max_steps: usize,
    steps: usize,
    found: Vec<(usize, Path)>,
    hit_cycle_limit: bool,
    hit_length_limit: bool,
    hit_step_limit: bool,
    view: &'g GraphView<'g>,
}

impl Search<'_> {
    fn stopped(&self) -> bool {
        self.hit_cycle_limit || self.hit_step_limit
    }

    /// Mark every node above `start` with a path back to `start` that stays
    /// above it. Paths through unmarked nodes can never close.
    fn mark_closing(&mut self, start: usize) {
        self.closes.fill(false);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &prev in &self.reverse[node] {
                if prev > start && !self.closes[prev] {
                    self.closes[prev] = true;
                    queue.push_back(prev);
                }
            }
        }
    }

    /// Only nodes with an index above `start` are visited, so every cycle is
    /// found exactly once, from its smallest node.
    fn dfs(&mut self, start: usize, current: usize, path: &mut Path) {
        for edge in 0..self.adjacency[current].len() {
            if self.stopped() {
                return;
            }
            let (next, link) = self.adjacency[current][edge];
            if next == start {
                if self.found.len() == self.max_cycles {
                    self.hit_cycle_limit = true;
                    return;
                }
                let mut closed = path.clone();
                closed.push((start, link));
                self.found.push((start, closed));
            } else if self.closes[next] && !self.on_path[next] {
                // path holds every node except start
                if path.len() + 1 >= self.max_len {
                    self.hit_length_limit = true;
                    continue;
                }
                if self.steps == self.max_steps {
                    self.hit_step_limit = true;
                    return;
                }
                self.steps += 1;
                self.on_path[next] = true;
                path.push((next, link));
                self.dfs(start, next, path);
                path.pop();
                self.on_path[next] = false;
            }
        }
    }

    fn into_cycles(self, ids: &[&str]) -> Vec<Cycle> {
        let links = self.view.links();
        let unique: BTreeSet<Cycle> = self
            .found
            .into_iter()
            .map(|(start, path)| {
                // path is [(n1, start->n1), (n2, n1->n2), ..., (start, nk->start)]
                let mut nodes = Vec::with_capacity(path.len());
                nodes.push(ids[start].to_owned());
                nodes.extend(path[..path.len() - 1].iter().map(|(n, _)| ids[*n].to_owned()));
                let link_ids = path.iter().map(|(_, l)| links[*l].id.clone()).collect();
                Cycle::new(nodes, link_ids)
            })
            .collect();
        unique.into_iter().collect()
    }
}

/// Find every simple directed cycle in `view`, subject to `limits`.
///
/// Self links are skipped, and a graph with no links has no cycles. When a
/// limit is hit, the cycles found so far are returned along with an explicit
/// truncation report.
pub fn enumerate_cycles(view: &GraphView<'_>, limits: &CycleLimits) -> CycleSet {
    let node_count = view.node_count();
    if node_count > limits.max_nodes {
        warn!(
            nodes = node_count,
            max_nodes = limits.max_nodes,
            "graph too large for loop enumeration"
        );
        return CycleSet {
            cycles: vec![],
            truncation: Some(Truncation {
                reason: TruncationReason::NodeLimit,
                limit: limits.max_nodes,
            }),
        };
    }

    let ids: Vec<&str> = view.node_ids().collect();
    let index = |id: &str| ids.binary_search(&id).ok();

    let mut adjacency = vec![vec![]; ids.len()];
    let mut reverse = vec![vec![]; ids.len()];
    for (link_idx, link) in view.links().iter().enumerate() {
        if link.is_self_link() {
            continue;
        }
        if let (Some(from), Some(to)) = (index(&link.source_id), index(&link.target_id)) {
            adjacency[from].push((to, link_idx));
            reverse[to].push(from);
        }
    }

    let max_len = limits
        .max_cycle_length
        .map_or(node_count, |len| len.min(node_count));

    let mut search = Search {
        adjacency,
        reverse,
        on_path: vec![false; ids.len()],
        closes: vec![false; ids.len()],
        max_len,
        max_cycles: limits.max_cycles,
        max_steps: limits.max_steps,
        steps: 0,
        found: vec![],
        hit_cycle_limit: false,
        hit_length_limit: false,
        hit_step_limit: false,
        view,
    };

    for start in 0..ids.len() {
        if search.stopped() {
            break;
        }
        search.mark_closing(start);
        let mut path = Path::new();
        search.on_path[start] = true;
        search.dfs(start, start, &mut path);
        search.on_path[start] = false;
    }

    let truncation = if search.hit_cycle_limit {
        Some(Truncation {
            reason: TruncationReason::CycleLimit,
            limit: limits.max_cycles,
        })
    } else if search.hit_step_limit {
        Some(Truncation {
            reason: TruncationReason::StepLimit,
            limit: limits.max_steps,
        })
    } else if search.hit_length_limit {
        Some(Truncation {
            reason: TruncationReason::LengthLimit,
            limit: max_len,
        })
    } else {
        None
    };
    if let Some(truncation) = &truncation {
        warn!(%truncation, "loop enumeration truncated");
    }

    let search_steps = search.steps;
    let cycles = search.into_cycles(&ids);
    debug!(
        nodes = node_count,
        links = view.links().len(),
        steps = search_steps,
        cycles = cycles.len(),
        "enumerated cycles"
    );

    CycleSet { cycles, truncation }
}
