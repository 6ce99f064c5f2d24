// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis_err;
use crate::common::Result;
use crate::datamodel::Tier;

/// Ceilings on cycle enumeration. Exceeding any of them is reported as a
/// truncation, never as a silent undercount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default)]
pub struct CycleLimits {
    /// Graphs with more nodes than this are not searched at all.
    pub max_nodes: usize,
    /// Enumeration stops once this many cycles have been found.
    pub max_cycles: usize,
    /// Optional bound on cycle length (in links). The node count always
    /// bounds the search depth.
    pub max_cycle_length: Option<usize>,
    /// Budget of DFS path extensions across the whole search. Dense graphs
    /// can have exponentially many open paths even with few cycles.
    pub max_steps: usize,
}

impl Default for CycleLimits {
    fn default() -> Self {
        Self {
            max_nodes: 64,
            max_cycles: 10_000,
            max_cycle_length: None,
            max_steps: 1_000_000,
        }
    }
}

/// Thresholds for leverage scoring and tier assignment.
///
/// - high: the dominant-loop counterweight heuristic, at least
///   `high_heuristics` satisfied heuristics, or membership in at least
///   `high_loop_count` loops
/// - medium: at least one satisfied heuristic, or membership in one loop
/// - low: otherwise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default)]
pub struct LeveragePolicy {
    /// Loop count at which the loop-multiplicity heuristic is satisfied.
    pub multiplicity_threshold: usize,
    /// Combined in+out degree at which a node counts as a hub.
    pub hub_degree_threshold: usize,
    pub high_heuristics: usize,
    pub high_loop_count: usize,
    /// Nodes ranked below this tier are not reported as leverage points.
    pub min_reported_impact: Tier,
}

impl Default for LeveragePolicy {
    fn default() -> Self {
        Self {
            multiplicity_threshold: 2,
            hub_degree_threshold: 4,
            high_heuristics: 3,
            high_loop_count: 2,
            min_reported_impact: Tier::Medium,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default)]
pub struct SynthesisPolicy {
    /// Feasibility for options with no SWOT metadata behind them.
    pub default_feasibility: Tier,
    /// Merge leverage points that touch exactly the same loops into one option.
    pub merge_shared_loops: bool,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            default_feasibility: Tier::Medium,
            merge_shared_loops: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default)]
pub struct AnalysisConfig {
    pub cycles: CycleLimits,
    pub leverage: LeveragePolicy,
    pub synthesis: SynthesisPolicy,
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = match serde_json::from_str(json) {
            Ok(config) => config,
            Err(err) => return analysis_err!(BadConfig, format!("{err}")),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycles.max_cycles == 0 {
            return analysis_err!(BadConfig, "cycles.max_cycles must be positive".to_owned());
        }
        if self.cycles.max_steps == 0 {
            return analysis_err!(BadConfig, "cycles.max_steps must be positive".to_owned());
        }
        if self.cycles.max_cycle_length.is_some_and(|len| len < 2) {
            return analysis_err!(
                BadConfig,
                "cycles.max_cycle_length must be at least 2".to_owned()
            );
        }
        if self.leverage.multiplicity_threshold < 2 {
            return analysis_err!(
                BadConfig,
                "leverage.multiplicity_threshold must be at least 2".to_owned()
            );
        }
        if self.leverage.high_heuristics == 0 || self.leverage.high_loop_count == 0 {
            return analysis_err!(
                BadConfig,
                "leverage tier thresholds must be positive".to_owned()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();

        assert_eq!(config.cycles.max_nodes, 64);
        assert_eq!(config.cycles.max_cycles, 10_000);
        assert_eq!(config.cycles.max_cycle_length, None);
        assert_eq!(config.cycles.max_steps, 1_000_000);

        assert_eq!(config.leverage.multiplicity_threshold, 2);
        assert_eq!(config.leverage.hub_degree_threshold, 4);
        assert_eq!(config.leverage.high_heuristics, 3);
        assert_eq!(config.leverage.high_loop_count, 2);
        assert_eq!(config.leverage.min_reported_impact, Tier::Medium);

        assert_eq!(config.synthesis.default_feasibility, Tier::Medium);
        assert!(config.synthesis.merge_shared_loops);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_json() {
        let json = r#"{"cycles": {"max_cycles": 5}, "leverage": {"min_reported_impact": "low"}}"#;
        let config = AnalysisConfig::from_json(json).unwrap();
        assert_eq!(config.cycles.max_cycles, 5);
        assert_eq!(config.cycles.max_nodes, 64);
        assert_eq!(config.leverage.min_reported_impact, Tier::Low);
        assert_eq!(config.leverage.hub_degree_threshold, 4);
    }

    #[test]
    fn test_invalid_config() {
        let err = AnalysisConfig::from_json(r#"{"cycles": {"max_cycles": 0}}"#).unwrap_err();
        assert_eq!(ErrorCode::BadConfig, err.code);

        let err = AnalysisConfig::from_json(r#"{"cycles": {"max_steps": 0}}"#).unwrap_err();
        assert_eq!(ErrorCode::BadConfig, err.code);

        let err = AnalysisConfig::from_json(r#"{"cycles": "lots"}"#).unwrap_err();
        assert_eq!(ErrorCode::BadConfig, err.code);
    }
}
