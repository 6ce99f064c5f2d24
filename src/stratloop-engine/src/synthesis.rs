// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Strategic option synthesis: clusters leverage points into candidate
//! interventions and annotates each with feasibility and political-economy
//! context drawn from the SWOT entries behind its nodes.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::{NodeId, SwotId};
use crate::config::SynthesisPolicy;
use crate::datamodel::{
    PoliticalEconomyDimension, PoliticalEconomyDimension as Dim, SwotCategory, SwotEntry, Tier,
    TimeHorizon, TimeHorizon as Horizon,
};
use crate::document::GraphView;
use crate::leverage::{LeverageKind, LeveragePoint};
use crate::loops::{FeedbackLoop, LoopPolarity};

/// One row of the feasibility policy table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeasibilityRule {
    pub dimension: PoliticalEconomyDimension,
    pub horizon: TimeHorizon,
    pub feasibility: Tier,
}

const fn rule(
    dimension: PoliticalEconomyDimension,
    horizon: TimeHorizon,
    feasibility: Tier,
) -> FeasibilityRule {
    FeasibilityRule {
        dimension,
        horizon,
        feasibility,
    }
}

/// Feasibility of acting on a single SWOT entry, by political-economy
/// dimension and time horizon. Power and incentive levers move quickly;
/// resource and institutional change is slow and gets harder the further
/// out it is planned.
pub const FEASIBILITY_RULES: &[FeasibilityRule] = &[
    rule(Dim::Power, Horizon::ShortTerm, Tier::High),
    rule(Dim::Power, Horizon::MediumTerm, Tier::High),
    rule(Dim::Power, Horizon::LongTerm, Tier::Medium),
    rule(Dim::Incentives, Horizon::ShortTerm, Tier::High),
    rule(Dim::Incentives, Horizon::MediumTerm, Tier::Medium),
    rule(Dim::Incentives, Horizon::LongTerm, Tier::Medium),
    rule(Dim::Resources, Horizon::ShortTerm, Tier::Medium),
    rule(Dim::Resources, Horizon::MediumTerm, Tier::Medium),
    rule(Dim::Resources, Horizon::LongTerm, Tier::Low),
    rule(Dim::Institutions, Horizon::ShortTerm, Tier::Medium),
    rule(Dim::Institutions, Horizon::MediumTerm, Tier::Low),
    rule(Dim::Institutions, Horizon::LongTerm, Tier::Low),
];

pub fn feasibility_for(dimension: PoliticalEconomyDimension, horizon: TimeHorizon) -> Tier {
    FEASIBILITY_RULES
        .iter()
        .find(|r| r.dimension == dimension && r.horizon == horizon)
        .map(|r| r.feasibility)
        .unwrap_or(Tier::Medium)
}

/// Mean of tier points (high = 2, medium = 1, low = 0): a mean of at least
/// 1.5 is high, below 0.5 is low. `None` when there is nothing to aggregate.
pub fn aggregate_feasibility(tiers: impl IntoIterator<Item = Tier>) -> Option<Tier> {
    let (sum, n) = tiers
        .into_iter()
        .fold((0u32, 0u32), |(sum, n), t| (sum + t.points(), n + 1));
    if n == 0 {
        return None;
    }
    // integer form of mean >= 1.5 and mean < 0.5
    let tier = if 2 * sum >= 3 * n {
        Tier::High
    } else if 2 * sum < n {
        Tier::Low
    } else {
        Tier::Medium
    };
    Some(tier)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PoliticalEconomyAnnotation {
    pub power_alignment: String,
    pub institutional_capacity: String,
    pub time_horizon: String,
    pub stakeholder_coalition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct StrategicOption {
    pub id: String,
    pub title: String,
    pub description: String,
    pub feasibility: Tier,
    pub political_economy: PoliticalEconomyAnnotation,
    /// Sorted ids of the leverage points this option acts on.
    pub leverage_points: Vec<String>,
    pub loop_ids: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum StaleReason {
    MissingNode,
    MissingSwotEntry,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StaleReason::MissingNode => "node no longer exists",
            StaleReason::MissingSwotEntry => "SWOT entry no longer exists",
        })
    }
}

/// A leverage point skipped during synthesis because something it refers
/// to has been deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct StaleReference {
    pub leverage_point_id: String,
    pub node_id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub swot_entry_id: Option<SwotId>,
    pub reason: StaleReason,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Synthesis {
    pub options: Vec<StrategicOption>,
    pub stale_references: Vec<StaleReference>,
}

struct Cluster<'a> {
    points: Vec<&'a LeveragePoint>,
    entries: Vec<&'a SwotEntry>,
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [one] => (*one).to_owned(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn title(kind: LeverageKind, labels: &str, loop_ids: &[String]) -> String {
    match kind {
        LeverageKind::DominantLoopCounterweight => {
            format!("Strengthen balancing feedback through {labels}")
        }
        LeverageKind::LoopMultiplicity => format!("Intervene at shared loop driver {labels}"),
        LeverageKind::MixedPolarity => {
            format!("Rebalance reinforcing and balancing dynamics via {labels}")
        }
        LeverageKind::Hub => format!("Work through hub variable {labels}"),
        LeverageKind::LoopMember => {
            format!("Adjust loop {} at {labels}", loop_ids.join(", "))
        }
        LeverageKind::Peripheral => format!("Monitor {labels}"),
    }
}

fn mechanism(touched: &[&FeedbackLoop]) -> String {
    let reinforcing = touched
        .iter()
        .filter(|l| l.polarity == LoopPolarity::Reinforcing)
        .count();
    let balancing = touched.len() - reinforcing;
    let mut text = match (reinforcing > 0, balancing > 0) {
        (true, true) => "Damping the reinforcing loops while strengthening the balancing ones \
                         shifts which feedback dominates."
            .to_owned(),
        (true, false) => "Interrupting or redirecting these reinforcing loops changes the \
                          system's growth or decline trajectory."
            .to_owned(),
        (false, true) => "Adjusting the goal or strength of these balancing loops changes where \
                          the system settles."
            .to_owned(),
        (false, false) => "This variable lies on no feedback loop; acting on it changes the \
                           structure around it rather than an existing loop."
            .to_owned(),
    };
    let delayed: usize = touched.iter().map(|l| l.delayed_links).sum();
    if delayed > 0 {
        let plural = if delayed == 1 { "" } else { "s" };
        text.push_str(&format!(
            " Expect lagged effects: {delayed} delayed link{plural} in the affected loops."
        ));
    }
    text
}

fn stakeholders<'a>(entries: impl IntoIterator<Item = &'a &'a SwotEntry>) -> Vec<&'a str> {
    let set: BTreeSet<&str> = entries
        .into_iter()
        .map(|e| e.stakeholder.trim())
        .filter(|s| !s.is_empty())
        .collect();
    set.into_iter().collect()
}

fn annotate(entries: &[&SwotEntry]) -> PoliticalEconomyAnnotation {
    if entries.is_empty() {
        let none = "No SWOT metadata linked to these variables".to_owned();
        return PoliticalEconomyAnnotation {
            power_alignment: none.clone(),
            institutional_capacity: none.clone(),
            time_horizon: none.clone(),
            stakeholder_coalition: none,
        };
    }

    let power: Vec<&SwotEntry> = entries
        .iter()
        .copied()
        .filter(|e| e.political_dimension == PoliticalEconomyDimension::Power)
        .collect();
    let power_alignment = if power.is_empty() {
        "No power-dimension factors identified".to_owned()
    } else {
        let favorable = power.iter().filter(|e| e.category.is_favorable()).count();
        let actors = stakeholders(&power);
        let actors = if actors.is_empty() {
            "unnamed actors".to_owned()
        } else {
            actors.join(", ")
        };
        format!(
            "Power held by {actors} ({favorable} favorable, {} unfavorable)",
            power.len() - favorable
        )
    };

    let institutional = |category: SwotCategory| {
        entries
            .iter()
            .filter(|e| {
                e.political_dimension == PoliticalEconomyDimension::Institutions
                    && e.category == category
            })
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
    };
    let strengths = institutional(SwotCategory::Strength);
    let weaknesses = institutional(SwotCategory::Weakness);
    let mut capacity = vec![];
    if !strengths.is_empty() {
        capacity.push(format!(
            "builds on institutional strengths ({})",
            strengths.join("; ")
        ));
    }
    if !weaknesses.is_empty() {
        capacity.push(format!(
            "constrained by institutional weaknesses ({})",
            weaknesses.join("; ")
        ));
    }
    let institutional_capacity = if capacity.is_empty() {
        "No institutional factors identified".to_owned()
    } else {
        let text = capacity.join("; ");
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => text,
        }
    };

    let horizons: BTreeSet<TimeHorizon> = entries.iter().map(|e| e.time_horizon).collect();
    let time_horizon = match horizons.iter().next_back() {
        Some(longest) if horizons.len() > 1 => {
            let all: Vec<&str> = horizons.iter().map(|h| h.describe()).collect();
            format!(
                "Results over the {}; mixed horizons: {}",
                longest.describe(),
                all.join(", ")
            )
        }
        Some(longest) => format!("Results over the {}", longest.describe()),
        None => String::new(),
    };

    let coalition = stakeholders(entries);
    let stakeholder_coalition = if coalition.is_empty() {
        "No stakeholders identified".to_owned()
    } else {
        coalition.join(", ")
    };

    PoliticalEconomyAnnotation {
        power_alignment,
        institutional_capacity,
        time_horizon,
        stakeholder_coalition,
    }
}

/// Turn ranked leverage points into strategic options.
///
/// Points referring to deleted nodes or SWOT entries are skipped and
/// returned as stale references. Points touching exactly the same non-empty
/// set of loops become one option when `policy.merge_shared_loops` is set.
pub fn synthesize_options(
    view: &GraphView<'_>,
    swot_entries: &[SwotEntry],
    loops: &[FeedbackLoop],
    leverage_points: &[LeveragePoint],
    policy: &SynthesisPolicy,
) -> Synthesis {
    let entries: HashMap<&str, &SwotEntry> =
        swot_entries.iter().map(|e| (e.id.as_str(), e)).collect();
    let loops_by_id: HashMap<&str, &FeedbackLoop> =
        loops.iter().map(|l| (l.id.as_str(), l)).collect();

    let mut stale_references = vec![];
    let mut clusters: Vec<Cluster<'_>> = vec![];
    let mut cluster_by_loops: HashMap<Vec<&str>, usize> = HashMap::new();

    for point in leverage_points {
        let Some(node) = view.node(&point.node_id) else {
            warn!(
                leverage_point = %point.id,
                node = %point.node_id,
                "skipping leverage point for deleted node"
            );
            stale_references.push(StaleReference {
                leverage_point_id: point.id.clone(),
                node_id: point.node_id.clone(),
                swot_entry_id: None,
                reason: StaleReason::MissingNode,
            });
            continue;
        };

        let entry = match &node.swot_entry_id {
            Some(swot_id) => match entries.get(swot_id.as_str()) {
                Some(entry) => Some(*entry),
                None => {
                    warn!(
                        leverage_point = %point.id,
                        swot_entry = %swot_id,
                        "skipping leverage point for deleted SWOT entry"
                    );
                    stale_references.push(StaleReference {
                        leverage_point_id: point.id.clone(),
                        node_id: point.node_id.clone(),
                        swot_entry_id: Some(swot_id.clone()),
                        reason: StaleReason::MissingSwotEntry,
                    });
                    continue;
                }
            },
            None => None,
        };

        let mut key: Vec<&str> = point.loop_ids.iter().map(|s| s.as_str()).collect();
        key.sort_unstable();
        let existing = if policy.merge_shared_loops && !key.is_empty() {
            cluster_by_loops.get(&key).copied()
        } else {
            None
        };
        let idx = match existing {
            Some(idx) => idx,
            None => {
                clusters.push(Cluster {
                    points: vec![],
                    entries: vec![],
                });
                if policy.merge_shared_loops && !key.is_empty() {
                    cluster_by_loops.insert(key, clusters.len() - 1);
                }
                clusters.len() - 1
            }
        };
        let cluster = &mut clusters[idx];
        cluster.points.push(point);
        if let Some(entry) = entry {
            cluster.entries.push(entry);
        }
    }

    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut options: Vec<StrategicOption> = vec![];
    for cluster in clusters {
        let mut point_ids: Vec<String> = cluster.points.iter().map(|p| p.id.clone()).collect();
        point_ids.sort();
        if !seen.insert(point_ids.clone()) {
            continue;
        }

        // points arrive ranked, so the first one leads the cluster
        let Some(lead) = cluster.points.first() else {
            continue;
        };
        let loop_ids: Vec<String> = {
            let set: BTreeSet<&str> = cluster
                .points
                .iter()
                .flat_map(|p| p.loop_ids.iter().map(|s| s.as_str()))
                .collect();
            set.into_iter().map(str::to_owned).collect()
        };
        let touched: Vec<&FeedbackLoop> = loop_ids
            .iter()
            .filter_map(|id| loops_by_id.get(id.as_str()).copied())
            .collect();

        let labels: Vec<&str> = cluster
            .points
            .iter()
            .map(|p| view.label(&p.node_id))
            .collect();
        let labels = join_labels(&labels);

        let mut description = format!("Acts on {labels}");
        if touched.is_empty() {
            description.push_str(". ");
        } else {
            let narrated: Vec<String> = touched
                .iter()
                .map(|l| format!("{} ({})", l.id, l.description))
                .collect();
            description.push_str(&format!(", touching {}. ", narrated.join("; ")));
        }
        description.push_str(&mechanism(&touched));

        let feasibility = aggregate_feasibility(
            cluster
                .entries
                .iter()
                .map(|e| feasibility_for(e.political_dimension, e.time_horizon)),
        )
        .unwrap_or(policy.default_feasibility);

        options.push(StrategicOption {
            id: String::new(),
            title: title(lead.kind, &labels, &loop_ids),
            description,
            feasibility,
            political_economy: annotate(&cluster.entries),
            leverage_points: point_ids,
            loop_ids,
        });
    }

    options.sort_by(|a, b| {
        b.feasibility
            .cmp(&a.feasibility)
            .then_with(|| a.leverage_points.cmp(&b.leverage_points))
    });
    for (i, option) in options.iter_mut().enumerate() {
        option.id = format!("opt{}", i + 1);
    }

    debug!(
        options = options.len(),
        stale = stale_references.len(),
        "synthesized strategic options"
    );

    Synthesis {
        options,
        stale_references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CycleLimits, LeveragePolicy};
    use crate::cycles::enumerate_cycles;
    use crate::datamodel::{CausalLink, CldNode, Polarity, VariableKind};
    use crate::document::CldDocument;
    use crate::leverage::identify_leverage_points;
    use crate::loops::classify_loops;

    fn entry(
        id: &str,
        category: SwotCategory,
        dimension: PoliticalEconomyDimension,
        horizon: TimeHorizon,
        stakeholder: &str,
    ) -> SwotEntry {
        SwotEntry {
            id: id.to_owned(),
            category,
            text: format!("entry {id}"),
            variable_type: VariableKind::Auxiliary,
            time_horizon: horizon,
            political_dimension: dimension,
            stakeholder: stakeholder.to_owned(),
        }
    }

    fn run(doc: &CldDocument, policy: &SynthesisPolicy) -> Synthesis {
        let view = doc.view();
        let loops = classify_loops(&view, &enumerate_cycles(&view, &CycleLimits::default()));
        let points = identify_leverage_points(&view, &loops, &LeveragePolicy::default());
        synthesize_options(&view, doc.swot_entries(), &loops, &points, policy)
    }

    #[test]
    fn test_rule_table_is_total() {
        use PoliticalEconomyDimension::*;
        use TimeHorizon::*;
        for dimension in [Power, Institutions, Incentives, Resources] {
            for horizon in [ShortTerm, MediumTerm, LongTerm] {
                let n = FEASIBILITY_RULES
                    .iter()
                    .filter(|r| r.dimension == dimension && r.horizon == horizon)
                    .count();
                assert_eq!(1, n, "{dimension:?} {horizon:?}");
            }
        }
        assert_eq!(Tier::High, feasibility_for(Power, ShortTerm));
        assert_eq!(Tier::Low, feasibility_for(Institutions, LongTerm));
    }

    #[test]
    fn test_aggregate_feasibility() {
        assert_eq!(None, aggregate_feasibility([]));
        assert_eq!(Some(Tier::High), aggregate_feasibility([Tier::High, Tier::Medium, Tier::High]));
        // mean 1.5
        assert_eq!(Some(Tier::High), aggregate_feasibility([Tier::High, Tier::Medium]));
        // mean 1.0
        assert_eq!(Some(Tier::Medium), aggregate_feasibility([Tier::High, Tier::Low]));
        // mean 0.5
        assert_eq!(Some(Tier::Medium), aggregate_feasibility([Tier::Medium, Tier::Low]));
        // mean 0.33
        assert_eq!(
            Some(Tier::Low),
            aggregate_feasibility([Tier::Medium, Tier::Low, Tier::Low])
        );
    }

    fn loop_doc() -> CldDocument {
        let mut doc = CldDocument::new();
        doc.add_swot_entry(entry(
            "s1",
            SwotCategory::Strength,
            PoliticalEconomyDimension::Power,
            TimeHorizon::ShortTerm,
            "Board",
        ))
        .unwrap();
        doc.add_swot_entry(entry(
            "s2",
            SwotCategory::Weakness,
            PoliticalEconomyDimension::Institutions,
            TimeHorizon::LongTerm,
            "Ministry",
        ))
        .unwrap();
        doc.add_node_from_swot("s1", "a").unwrap();
        doc.add_node_from_swot("s2", "b").unwrap();
        doc.add_node(CldNode::new(
            "c",
            "Capacity",
            SwotCategory::Opportunity,
            VariableKind::Stock,
        ))
        .unwrap();
        doc.add_link(CausalLink::new("ab", "a", "b", Polarity::Same)).unwrap();
        doc.add_link(CausalLink::new("ba", "b", "a", Polarity::Opposite).delayed()).unwrap();
        doc.add_link(CausalLink::new("bc", "b", "c", Polarity::Same)).unwrap();
        doc
    }

    #[test]
    fn test_shared_loop_points_merge() {
        let doc = loop_doc();
        let synthesis = run(&doc, &SynthesisPolicy::default());
        assert!(synthesis.stale_references.is_empty());
        assert_eq!(1, synthesis.options.len());

        let option = &synthesis.options[0];
        assert_eq!("opt1", option.id);
        assert_eq!(vec!["lp-a".to_owned(), "lp-b".to_owned()], option.leverage_points);
        assert_eq!(vec!["b1".to_owned()], option.loop_ids);
        // power/short = high, institutions/long = low
        assert_eq!(Tier::Medium, option.feasibility);
        assert!(option.description.contains("1 delayed link"));
        assert_eq!(
            "Power held by Board (1 favorable, 0 unfavorable)",
            option.political_economy.power_alignment
        );
        assert_eq!(
            "Constrained by institutional weaknesses (entry s2)",
            option.political_economy.institutional_capacity
        );
        assert!(option.political_economy.time_horizon.contains("mixed horizons"));
        assert_eq!("Board, Ministry", option.political_economy.stakeholder_coalition);
    }

    #[test]
    fn test_unmerged_points_stay_separate() {
        let doc = loop_doc();
        let policy = SynthesisPolicy {
            merge_shared_loops: false,
            ..SynthesisPolicy::default()
        };
        let synthesis = run(&doc, &policy);
        let feasibility: Vec<(&str, Tier)> = synthesis
            .options
            .iter()
            .map(|o| (o.leverage_points[0].as_str(), o.feasibility))
            .collect();
        assert_eq!(vec![("lp-a", Tier::High), ("lp-b", Tier::Low)], feasibility);
    }

    #[test]
    fn test_stale_swot_reference_skipped() {
        let mut doc = loop_doc();
        let view = doc.view();
        let loops = classify_loops(&view, &enumerate_cycles(&view, &CycleLimits::default()));
        let points = identify_leverage_points(&view, &loops, &LeveragePolicy::default());
        drop(view);

        // SWOT entries are removed without cascading to their nodes
        doc.remove_swot_entry("s2").unwrap();
        let view = doc.view();
        let synthesis = synthesize_options(
            &view,
            doc.swot_entries(),
            &loops,
            &points,
            &SynthesisPolicy::default(),
        );
        assert_eq!(
            vec![StaleReference {
                leverage_point_id: "lp-b".to_owned(),
                node_id: "b".to_owned(),
                swot_entry_id: Some("s2".to_owned()),
                reason: StaleReason::MissingSwotEntry,
            }],
            synthesis.stale_references
        );
        assert_eq!(1, synthesis.options.len());
        assert_eq!(vec!["lp-a".to_owned()], synthesis.options[0].leverage_points);
    }

    #[test]
    fn test_missing_node_is_stale() {
        let doc = loop_doc();
        let view = doc.view();
        let loops = classify_loops(&view, &enumerate_cycles(&view, &CycleLimits::default()));
        let mut points = identify_leverage_points(&view, &loops, &LeveragePolicy::default());
        points[0].node_id = "gone".to_owned();

        let synthesis = synthesize_options(
            &view,
            doc.swot_entries(),
            &loops,
            &points,
            &SynthesisPolicy::default(),
        );
        assert_eq!(1, synthesis.stale_references.len());
        assert_eq!(StaleReason::MissingNode, synthesis.stale_references[0].reason);
    }

    #[test]
    fn test_no_metadata_uses_default_feasibility() {
        let mut doc = CldDocument::new();
        for id in ["x", "y"] {
            doc.add_node(CldNode::new(id, id, SwotCategory::Threat, VariableKind::Flow)).unwrap();
        }
        doc.add_link(CausalLink::new("xy", "x", "y", Polarity::Same)).unwrap();
        doc.add_link(CausalLink::new("yx", "y", "x", Polarity::Same)).unwrap();

        let synthesis = run(&doc, &SynthesisPolicy::default());
        assert_eq!(1, synthesis.options.len());
        assert_eq!(Tier::Medium, synthesis.options[0].feasibility);
        assert_eq!(
            "No SWOT metadata linked to these variables",
            synthesis.options[0].political_economy.stakeholder_coalition
        );
        assert_eq!("Adjust loop r1 at x and y", synthesis.options[0].title);
    }
}
