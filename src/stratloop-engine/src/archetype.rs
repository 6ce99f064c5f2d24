// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! System archetypes: canonical loop structures that can be stamped into a
//! document as a starting point.
//!
//! Each archetype carries its own named variables. A variable left empty
//! falls back to the archetype's default label.

use std::f64::consts::PI;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{NodeId, Result};
use crate::datamodel::{CausalLink, CldNode, Polarity, Position, SwotCategory, VariableKind};
use crate::document::CldDocument;
use crate::loops::LoopPolarity;
use crate::patch::{PatchOp, apply_patch};
use crate::{doc_err, import_err};

/// Archetype identifiers, in library order.
pub const ARCHETYPE_NAMES: &[&str] = &[
    "fixes_that_fail",
    "limits_to_growth",
    "shifting_the_burden",
    "drifting_goals",
    "success_to_the_successful",
    "growth_and_underinvestment",
    "escalation",
    "tragedy_of_the_commons",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Archetype {
    FixesThatFail {
        #[serde(default)]
        symptom: String,
        #[serde(default)]
        fix: String,
        #[serde(default)]
        consequence: String,
    },
    LimitsToGrowth {
        #[serde(default)]
        action: String,
        #[serde(default)]
        condition: String,
        #[serde(default)]
        limit: String,
    },
    ShiftingTheBurden {
        #[serde(default)]
        symptom: String,
        #[serde(default)]
        symptomatic_solution: String,
        #[serde(default)]
        fundamental_solution: String,
        #[serde(default)]
        side_effect: String,
    },
    DriftingGoals {
        #[serde(default)]
        goal: String,
        #[serde(default)]
        gap: String,
        #[serde(default)]
        pressure: String,
        #[serde(default)]
        action: String,
    },
    SuccessToTheSuccessful {
        #[serde(default)]
        resource: String,
        #[serde(default)]
        success_a: String,
        #[serde(default)]
        success_b: String,
    },
    GrowthAndUnderinvestment {
        #[serde(default)]
        growth: String,
        #[serde(default)]
        demand: String,
        #[serde(default)]
        capacity: String,
        #[serde(default)]
        investment: String,
    },
    Escalation {
        #[serde(default)]
        party_a: String,
        #[serde(default)]
        party_b: String,
        #[serde(default)]
        threat: String,
    },
    TragedyOfTheCommons {
        #[serde(default)]
        activity_a: String,
        #[serde(default)]
        activity_b: String,
        #[serde(default)]
        resource: String,
    },
}

/// A node of an archetype template. `key` is the variable name and becomes
/// the suffix of the instantiated node id.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateNode {
    pub key: &'static str,
    pub label: String,
    pub category: SwotCategory,
    pub kind: VariableKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateLink {
    pub from: &'static str,
    pub to: &'static str,
    pub polarity: Polarity,
    pub has_delay: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Template {
    pub nodes: Vec<TemplateNode>,
    pub links: Vec<TemplateLink>,
}

fn label_or(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_owned()
    } else {
        value.to_owned()
    }
}

impl Template {
    fn node(
        mut self,
        key: &'static str,
        value: &str,
        default: &str,
        category: SwotCategory,
        kind: VariableKind,
    ) -> Self {
        self.nodes.push(TemplateNode {
            key,
            label: label_or(value, default),
            category,
            kind,
        });
        self
    }

    fn link(mut self, from: &'static str, to: &'static str, polarity: Polarity) -> Self {
        self.links.push(TemplateLink {
            from,
            to,
            polarity,
            has_delay: false,
        });
        self
    }

    fn delayed_link(mut self, from: &'static str, to: &'static str, polarity: Polarity) -> Self {
        self.links.push(TemplateLink {
            from,
            to,
            polarity,
            has_delay: true,
        });
        self
    }
}

impl Archetype {
    /// An archetype with every variable left at its default label.
    pub fn from_name(name: &str) -> Result<Archetype> {
        let blank = String::new;
        let archetype = match name {
            "fixes_that_fail" => Archetype::FixesThatFail {
                symptom: blank(),
                fix: blank(),
                consequence: blank(),
            },
            "limits_to_growth" => Archetype::LimitsToGrowth {
                action: blank(),
                condition: blank(),
                limit: blank(),
            },
            "shifting_the_burden" => Archetype::ShiftingTheBurden {
                symptom: blank(),
                symptomatic_solution: blank(),
                fundamental_solution: blank(),
                side_effect: blank(),
            },
            "drifting_goals" => Archetype::DriftingGoals {
                goal: blank(),
                gap: blank(),
                pressure: blank(),
                action: blank(),
            },
            "success_to_the_successful" => Archetype::SuccessToTheSuccessful {
                resource: blank(),
                success_a: blank(),
                success_b: blank(),
            },
            "growth_and_underinvestment" => Archetype::GrowthAndUnderinvestment {
                growth: blank(),
                demand: blank(),
                capacity: blank(),
                investment: blank(),
            },
            "escalation" => Archetype::Escalation {
                party_a: blank(),
                party_b: blank(),
                threat: blank(),
            },
            "tragedy_of_the_commons" => Archetype::TragedyOfTheCommons {
                activity_a: blank(),
                activity_b: blank(),
                resource: blank(),
            },
            _ => return doc_err!(DoesNotExist, format!("archetype '{name}'")),
        };
        Ok(archetype)
    }

    /// Parse an archetype from JSON, e.g. `{"type": "fixes_that_fail", "fix": "Borrowing"}`.
    pub fn from_json(json: &str) -> Result<Archetype> {
        match serde_json::from_str(json) {
            Ok(archetype) => Ok(archetype),
            Err(err) => import_err!(BadDocument, format!("archetype: {err}")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::FixesThatFail { .. } => "fixes_that_fail",
            Archetype::LimitsToGrowth { .. } => "limits_to_growth",
            Archetype::ShiftingTheBurden { .. } => "shifting_the_burden",
            Archetype::DriftingGoals { .. } => "drifting_goals",
            Archetype::SuccessToTheSuccessful { .. } => "success_to_the_successful",
            Archetype::GrowthAndUnderinvestment { .. } => "growth_and_underinvestment",
            Archetype::Escalation { .. } => "escalation",
            Archetype::TragedyOfTheCommons { .. } => "tragedy_of_the_commons",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Archetype::FixesThatFail { .. } => "Fixes That Fail",
            Archetype::LimitsToGrowth { .. } => "Limits to Growth",
            Archetype::ShiftingTheBurden { .. } => "Shifting the Burden",
            Archetype::DriftingGoals { .. } => "Drifting Goals",
            Archetype::SuccessToTheSuccessful { .. } => "Success to the Successful",
            Archetype::GrowthAndUnderinvestment { .. } => "Growth & Underinvestment",
            Archetype::Escalation { .. } => "Escalation",
            Archetype::TragedyOfTheCommons { .. } => "Tragedy of the Commons",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Archetype::FixesThatFail { .. } => {
                "A quick fix solves the symptom but creates a long-term consequence that brings the symptom back."
            }
            Archetype::LimitsToGrowth { .. } => {
                "A process grows for a while, but then runs into a limiting condition."
            }
            Archetype::ShiftingTheBurden { .. } => {
                "A symptomatic solution is used, reducing the pressure to implement a fundamental solution."
            }
            Archetype::DriftingGoals { .. } => {
                "A gap between goal and reality is closed by lowering the goal rather than improving reality."
            }
            Archetype::SuccessToTheSuccessful { .. } => {
                "Two activities compete for limited resources; the more successful one gets more resources."
            }
            Archetype::GrowthAndUnderinvestment { .. } => {
                "Growth approaches a limit that investment could remove, but investment comes too late."
            }
            Archetype::Escalation { .. } => {
                "Two parties compete for superiority, and every action by one is met by a counter-action."
            }
            Archetype::TragedyOfTheCommons { .. } => {
                "Individuals use a common resource for personal gain until the resource is depleted."
            }
        }
    }

    /// Polarities of the loops the template produces.
    pub fn expected_loops(&self) -> Vec<LoopPolarity> {
        use LoopPolarity::{Balancing as B, Reinforcing as R};
        match self {
            Archetype::FixesThatFail { .. } => vec![B, R],
            Archetype::LimitsToGrowth { .. } => vec![B, R],
            Archetype::ShiftingTheBurden { .. } => vec![B, B, R],
            Archetype::DriftingGoals { .. } => vec![B, B],
            Archetype::SuccessToTheSuccessful { .. } => vec![R, R],
            Archetype::GrowthAndUnderinvestment { .. } => vec![B, B, R],
            Archetype::Escalation { .. } => vec![B, B],
            Archetype::TragedyOfTheCommons { .. } => vec![B, B],
        }
    }

    /// Labelled nodes and signed links forming the archetype's loops.
    pub fn template(&self) -> Template {
        use Polarity::{Opposite as Neg, Same as Pos};
        use SwotCategory::*;
        use VariableKind::*;

        let t = Template::default();
        match self {
            Archetype::FixesThatFail {
                symptom,
                fix,
                consequence,
            } => t
                .node("symptom", symptom, "Symptom", Weakness, Stock)
                .node("fix", fix, "Fix", Strength, Decision)
                .node("consequence", consequence, "Consequence", Threat, Auxiliary)
                .link("symptom", "fix", Pos)
                .link("fix", "symptom", Neg)
                .delayed_link("fix", "consequence", Pos)
                .link("consequence", "symptom", Pos),
            Archetype::LimitsToGrowth {
                action,
                condition,
                limit,
            } => t
                .node("action", action, "Growing Action", Strength, Flow)
                .node("condition", condition, "Performance", Opportunity, Stock)
                .node("limit", limit, "Limiting Condition", Threat, Auxiliary)
                .link("action", "condition", Pos)
                .link("condition", "action", Pos)
                .link("condition", "limit", Pos)
                .delayed_link("limit", "condition", Neg),
            Archetype::ShiftingTheBurden {
                symptom,
                symptomatic_solution,
                fundamental_solution,
                side_effect,
            } => t
                .node("symptom", symptom, "Problem Symptom", Weakness, Stock)
                .node(
                    "symptomatic_solution",
                    symptomatic_solution,
                    "Symptomatic Solution",
                    Strength,
                    Decision,
                )
                .node(
                    "fundamental_solution",
                    fundamental_solution,
                    "Fundamental Solution",
                    Opportunity,
                    Decision,
                )
                .node("side_effect", side_effect, "Side Effect", Threat, Auxiliary)
                .link("symptom", "symptomatic_solution", Pos)
                .link("symptomatic_solution", "symptom", Neg)
                .delayed_link("symptom", "fundamental_solution", Pos)
                .delayed_link("fundamental_solution", "symptom", Neg)
                .link("symptomatic_solution", "side_effect", Pos)
                .link("side_effect", "fundamental_solution", Neg),
            Archetype::DriftingGoals {
                goal,
                gap,
                pressure,
                action,
            } => t
                .node("goal", goal, "Goal", Strength, Stock)
                .node("gap", gap, "Gap", Weakness, Auxiliary)
                .node("pressure", pressure, "Pressure to Lower Goal", Threat, Auxiliary)
                .node("action", action, "Corrective Action", Opportunity, Decision)
                .link("goal", "gap", Pos)
                .link("gap", "pressure", Pos)
                .link("pressure", "goal", Neg)
                .link("gap", "action", Pos)
                .delayed_link("action", "gap", Neg),
            Archetype::SuccessToTheSuccessful {
                resource,
                success_a,
                success_b,
            } => t
                .node(
                    "resource",
                    resource,
                    "Resources / Allocation",
                    Opportunity,
                    Decision,
                )
                .node("success_a", success_a, "Success A", Strength, Stock)
                .node("success_b", success_b, "Success B", Weakness, Stock)
                .link("success_a", "resource", Pos)
                .link("resource", "success_a", Pos)
                .link("success_b", "resource", Neg)
                .link("resource", "success_b", Neg),
            Archetype::GrowthAndUnderinvestment {
                growth,
                demand,
                capacity,
                investment,
            } => t
                .node("growth", growth, "Growing Action", Strength, Flow)
                .node("demand", demand, "Demand", Opportunity, Stock)
                .node("capacity", capacity, "Capacity", Weakness, Stock)
                .node("investment", investment, "Investment in Capacity", Opportunity, Decision)
                .link("growth", "demand", Pos)
                .link("demand", "growth", Pos)
                .link("demand", "capacity", Neg)
                .link("capacity", "growth", Pos)
                .link("capacity", "investment", Neg)
                .delayed_link("investment", "capacity", Pos),
            Archetype::Escalation {
                party_a,
                party_b,
                threat,
            } => t
                .node("party_a", party_a, "Activity of A", Strength, Decision)
                .node("party_b", party_b, "Activity of B", Threat, Decision)
                .node("threat", threat, "Results of A relative to B", Weakness, Auxiliary)
                .link("party_a", "threat", Pos)
                .delayed_link("threat", "party_b", Pos)
                .link("party_b", "threat", Neg)
                .delayed_link("threat", "party_a", Neg),
            Archetype::TragedyOfTheCommons {
                activity_a,
                activity_b,
                resource,
            } => t
                .node("activity_a", activity_a, "Activity of A", Strength, Flow)
                .node("activity_b", activity_b, "Activity of B", Strength, Flow)
                .node("resource", resource, "Common Resource", Threat, Stock)
                .delayed_link("activity_a", "resource", Neg)
                .link("resource", "activity_a", Pos)
                .delayed_link("activity_b", "resource", Neg)
                .link("resource", "activity_b", Pos),
        }
    }

    /// Every archetype with default labels.
    pub fn all() -> Vec<Archetype> {
        ARCHETYPE_NAMES
            .iter()
            .filter_map(|name| Archetype::from_name(name).ok())
            .collect()
    }
}

/// Patch ops that add `template` under ids `{prefix}-{key}` (nodes) and
/// `{prefix}-{from}-{to}` (links). Nodes are laid out on a circle.
pub fn template_ops(template: &Template, prefix: &str) -> Vec<PatchOp> {
    let n = template.nodes.len().max(1) as f64;
    let node_id = |key: &str| format!("{prefix}-{key}");

    let nodes = template.nodes.iter().enumerate().map(|(i, t)| {
        let angle = 2.0 * PI * (i as f64) / n - PI / 2.0;
        let mut node = CldNode::new(&node_id(t.key), &t.label, t.category, t.kind);
        node.position = Position::new(200.0 + 150.0 * angle.cos(), 150.0 + 100.0 * angle.sin());
        PatchOp::AddNode { node }
    });
    let links = template.links.iter().map(|t| {
        let mut link = CausalLink::new(
            &format!("{prefix}-{}-{}", t.from, t.to),
            &node_id(t.from),
            &node_id(t.to),
            t.polarity,
        );
        link.has_delay = t.has_delay;
        PatchOp::AddLink { link }
    });

    nodes.chain(links).collect()
}

impl CldDocument {
    /// Add an archetype's nodes and links to the document. Either the whole
    /// template is added or the document is left unchanged.
    pub fn instantiate_archetype(
        &mut self,
        archetype: &Archetype,
        prefix: &str,
    ) -> Result<Vec<NodeId>> {
        if prefix.is_empty() {
            return doc_err!(EmptyIdentifier, "archetype prefix".to_owned());
        }
        let template = archetype.template();
        let ops = template_ops(&template, prefix);
        apply_patch(self, &ops)?;

        debug!(
            archetype = archetype.name(),
            prefix,
            nodes = template.nodes.len(),
            links = template.links.len(),
            "instantiated archetype"
        );

        Ok(template
            .nodes
            .iter()
            .map(|t| format!("{prefix}-{}", t.key))
            .collect())
    }
}
