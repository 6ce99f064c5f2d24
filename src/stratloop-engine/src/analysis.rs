// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The full analysis pipeline and its single-entry memo.
//!
//! Derived state is a pure function of the document and configuration:
//! every call recomputes loops, leverage points and options from scratch.

use std::rc::Rc;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::analysis_err;
use crate::common::Result;
use crate::config::AnalysisConfig;
use crate::cycles::{Truncation, enumerate_cycles};
use crate::datamodel::{CausalLink, CldNode, SwotEntry};
use crate::document::CldDocument;
use crate::leverage::{LeveragePoint, identify_leverage_points};
use crate::loops::{FeedbackLoop, classify_loops};
use crate::synthesis::{StaleReference, StrategicOption, synthesize_options};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub loops: Vec<FeedbackLoop>,
    /// Present when the loop set is incomplete.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub truncation: Option<Truncation>,
    pub leverage_points: Vec<LeveragePoint>,
    pub options: Vec<StrategicOption>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stale_references: Vec<StaleReference>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty() && self.leverage_points.is_empty() && self.options.is_empty()
    }
}

/// Run cycle enumeration, loop classification, leverage identification and
/// option synthesis over `doc`.
pub fn analyze(doc: &CldDocument, config: &AnalysisConfig) -> Analysis {
    let view = doc.view();

    let cycles = enumerate_cycles(&view, &config.cycles);
    let loops = classify_loops(&view, &cycles);
    let leverage_points = identify_leverage_points(&view, &loops, &config.leverage);
    let synthesis = synthesize_options(
        &view,
        doc.swot_entries(),
        &loops,
        &leverage_points,
        &config.synthesis,
    );

    info!(
        nodes = view.node_count(),
        links = view.links().len(),
        loops = loops.len(),
        leverage_points = leverage_points.len(),
        options = synthesis.options.len(),
        truncated = cycles.is_truncated(),
        "analysis complete"
    );

    Analysis {
        loops,
        truncation: cycles.truncation,
        leverage_points,
        options: synthesis.options,
        stale_references: synthesis.stale_references,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashInput<'a> {
    swot_entries: &'a [SwotEntry],
    nodes: &'a [CldNode],
    links: &'a [CausalLink],
    config: &'a AnalysisConfig,
}

/// Hex SHA-256 over the JSON serialization of the document's nodes, links
/// and SWOT entries together with the configuration.
pub fn content_hash(doc: &CldDocument, config: &AnalysisConfig) -> Result<String> {
    let input = HashInput {
        swot_entries: doc.swot_entries(),
        nodes: doc.nodes(),
        links: doc.links(),
        config,
    };
    let mut hasher = Sha256::new();
    if let Err(err) = serde_json::to_writer(&mut hasher, &input) {
        return analysis_err!(Generic, format!("hashing document: {err}"));
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Memo of the most recent analysis, keyed by content hash.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    last: Option<(String, Rc<Analysis>)>,
    hits: usize,
    misses: usize,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis if `doc` and `config` are unchanged since
    /// the last call, otherwise recompute and replace it.
    pub fn analyze(&mut self, doc: &CldDocument, config: &AnalysisConfig) -> Result<Rc<Analysis>> {
        let hash = content_hash(doc, config)?;
        if let Some((cached_hash, analysis)) = &self.last {
            if *cached_hash == hash {
                self.hits += 1;
                debug!(hash = %hash, "analysis cache hit");
                return Ok(Rc::clone(analysis));
            }
        }

        self.misses += 1;
        let analysis = Rc::new(analyze(doc, config));
        self.last = Some((hash, Rc::clone(&analysis)));
        Ok(analysis)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
