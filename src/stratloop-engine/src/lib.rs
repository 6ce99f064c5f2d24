// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Structural analysis of causal loop diagrams built from SWOT entries:
//! feedback loop enumeration and classification, leverage point ranking,
//! and synthesis of strategic options.

#![forbid(unsafe_code)]

pub mod common;

pub mod analysis;
pub mod archetype;
pub mod config;
pub mod cycles;
pub mod datamodel;
pub mod document;
pub mod leverage;
pub mod loops;
pub mod patch;
#[cfg(feature = "schema")]
pub mod schema;
pub mod synthesis;

#[cfg(test)]
mod loops_proptest;

pub use self::analysis::{Analysis, AnalysisCache, analyze, content_hash};
pub use self::archetype::{ARCHETYPE_NAMES, Archetype};
pub use self::common::{Error, ErrorCode, ErrorKind, LinkId, NodeId, Result, SwotId};
pub use self::config::{AnalysisConfig, CycleLimits, LeveragePolicy, SynthesisPolicy};
pub use self::cycles::{Cycle, CycleSet, Truncation, TruncationReason, enumerate_cycles};
pub use self::datamodel::{
    CausalLink, CldNode, PoliticalEconomyDimension, Polarity, Position, SwotCategory, SwotEntry,
    Tier, TimeHorizon, VariableKind,
};
pub use self::document::{CldDocument, GraphView, LinkUpdate};
pub use self::leverage::{LeverageKind, LeveragePoint, identify_leverage_points};
pub use self::loops::{FeedbackLoop, LoopPolarity, classify_loops};
pub use self::patch::{PatchOp, apply_patch};
pub use self::synthesis::{
    FEASIBILITY_RULES, PoliticalEconomyAnnotation, StaleReference, StrategicOption,
    synthesize_options,
};
