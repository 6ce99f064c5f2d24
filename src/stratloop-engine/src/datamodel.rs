// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Plain data types shared between the editable document and the analysis
//! stages. Field names serialize in the workbook's camelCase document schema.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{LinkId, NodeId, SwotId};

fn is_false(val: &bool) -> bool {
    !*val
}

fn is_empty_string(val: &str) -> bool {
    val.is_empty()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum SwotCategory {
    Strength,
    Weakness,
    Opportunity,
    Threat,
}

impl SwotCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SwotCategory::Strength => "strength",
            SwotCategory::Weakness => "weakness",
            SwotCategory::Opportunity => "opportunity",
            SwotCategory::Threat => "threat",
        }
    }

    /// Strengths and opportunities are assets to build on, weaknesses and
    /// threats are pressures to manage.
    pub fn is_favorable(self) -> bool {
        matches!(self, SwotCategory::Strength | SwotCategory::Opportunity)
    }
}

/// Semantic role of a variable in the system-dynamics sense.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum VariableKind {
    Stock,
    Flow,
    Auxiliary,
    Decision,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum TimeHorizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeHorizon {
    pub fn describe(self) -> &'static str {
        match self {
            TimeHorizon::ShortTerm => "short-term (< 6 months)",
            TimeHorizon::MediumTerm => "medium-term (6-18 months)",
            TimeHorizon::LongTerm => "long-term (> 18 months)",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum PoliticalEconomyDimension {
    Power,
    Institutions,
    Incentives,
    Resources,
}

impl PoliticalEconomyDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            PoliticalEconomyDimension::Power => "power",
            PoliticalEconomyDimension::Institutions => "institutions",
            PoliticalEconomyDimension::Incentives => "incentives",
            PoliticalEconomyDimension::Resources => "resources",
        }
    }
}

/// Polarity of a causal link
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    #[default]
    Same, // Increase in source causes increase in target
    Opposite, // Increase in source causes decrease in target
}

impl Polarity {
    /// Sign used when multiplying polarities around a loop.
    pub fn sign(self) -> i8 {
        match self {
            Polarity::Same => 1,
            Polarity::Opposite => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Polarity::Same => Polarity::Opposite,
            Polarity::Opposite => Polarity::Same,
        }
    }
}

/// A strategic variable captured on the SWOT form, with the systems-thinking
/// metadata the synthesizer reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct SwotEntry {
    pub id: SwotId,
    pub category: SwotCategory,
    pub text: String,
    pub variable_type: VariableKind,
    pub time_horizon: TimeHorizon,
    #[serde(alias = "politicalEconomyDimension")]
    pub political_dimension: PoliticalEconomyDimension,
    #[serde(skip_serializing_if = "is_empty_string", default)]
    pub stakeholder: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CldNode {
    pub id: NodeId,
    #[serde(
        alias = "swotItemId",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub swot_entry_id: Option<SwotId>,
    pub label: String,
    pub category: SwotCategory,
    #[serde(rename = "nodeType", alias = "variableKind")]
    pub kind: VariableKind,
    // only meaningful to the renderer
    #[serde(flatten)]
    pub position: Position,
}

impl CldNode {
    pub fn new(id: &str, label: &str, category: SwotCategory, kind: VariableKind) -> Self {
        CldNode {
            id: id.to_owned(),
            swot_entry_id: None,
            label: label.to_owned(),
            category,
            kind,
            position: Position::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CausalLink {
    pub id: LinkId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(skip_serializing_if = "is_false", default)]
    pub has_delay: bool,
}

impl CausalLink {
    pub fn new(id: &str, source_id: &str, target_id: &str, polarity: Polarity) -> Self {
        CausalLink {
            id: id.to_owned(),
            source_id: source_id.to_owned(),
            target_id: target_id.to_owned(),
            polarity,
            has_delay: false,
        }
    }

    pub fn delayed(mut self) -> Self {
        self.has_delay = true;
        self
    }

    pub fn is_self_link(&self) -> bool {
        self.source_id == self.target_id
    }
}

/// Tiered estimate shared by leverage impact and option feasibility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }

    pub(crate) fn points(self) -> u32 {
        match self {
            Tier::Low => 0,
            Tier::Medium => 1,
            Tier::High => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_json_uses_document_schema() {
        let json = r#"{"id": "l1", "sourceId": "a", "targetId": "b", "polarity": "opposite", "hasDelay": true}"#;
        let link: CausalLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.source_id, "a");
        assert_eq!(link.target_id, "b");
        assert_eq!(link.polarity, Polarity::Opposite);
        assert!(link.has_delay);

        // polarity defaults to "same" and the delay flag is omitted when unset
        let json = r#"{"id": "l2", "sourceId": "a", "targetId": "b"}"#;
        let link: CausalLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.polarity, Polarity::Same);
        let out = serde_json::to_string(&link).unwrap();
        assert!(!out.contains("hasDelay"));
    }

    #[test]
    fn test_node_accepts_workbook_field_names() {
        let json = r#"{
            "id": "n1",
            "swotItemId": "s1",
            "label": "Brand recognition",
            "category": "strength",
            "nodeType": "stock",
            "x": 120.0,
            "y": 80.5
        }"#;
        let node: CldNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.swot_entry_id.as_deref(), Some("s1"));
        assert_eq!(node.kind, VariableKind::Stock);
        assert_eq!(node.position, Position::new(120.0, 80.5));
    }

    #[test]
    fn test_swot_entry_enums() {
        let json = r#"{
            "id": "w1",
            "category": "weakness",
            "text": "High operational costs",
            "variableType": "flow",
            "timeHorizon": "long-term",
            "politicalDimension": "institutions",
            "stakeholder": "Finance ministry"
        }"#;
        let entry: SwotEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.time_horizon, TimeHorizon::LongTerm);
        assert_eq!(
            entry.political_dimension,
            PoliticalEconomyDimension::Institutions
        );
        assert!(!entry.category.is_favorable());
    }

    #[test]
    fn test_polarity_sign() {
        assert_eq!(1, Polarity::Same.sign());
        assert_eq!(-1, Polarity::Opposite.sign());
        assert_eq!(Polarity::Same, Polarity::Opposite.flipped());
        assert!(Tier::High > Tier::Medium && Tier::Medium > Tier::Low);
    }
}
