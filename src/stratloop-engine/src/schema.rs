// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! JSON Schemas for the document, configuration and analysis formats.

use crate::analysis::Analysis;
use crate::analysis_err;
use crate::archetype::Archetype;
use crate::common::Result;
use crate::config::AnalysisConfig;
use crate::document::RawDocument;
use crate::patch::PatchOp;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    Document,
    Config,
    Analysis,
    Archetype,
    Patch,
}

impl SchemaKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "document" => Some(SchemaKind::Document),
            "config" => Some(SchemaKind::Config),
            "analysis" => Some(SchemaKind::Analysis),
            "archetype" => Some(SchemaKind::Archetype),
            "patch" => Some(SchemaKind::Patch),
            _ => None,
        }
    }
}

pub fn generate_schema(kind: SchemaKind) -> schemars::Schema {
    match kind {
        SchemaKind::Document => schemars::schema_for!(RawDocument),
        SchemaKind::Config => schemars::schema_for!(AnalysisConfig),
        SchemaKind::Analysis => schemars::schema_for!(Analysis),
        SchemaKind::Archetype => schemars::schema_for!(Archetype),
        SchemaKind::Patch => schemars::schema_for!(Vec<PatchOp>),
    }
}

/// Generate a JSON Schema as a formatted JSON string
pub fn generate_schema_json(kind: SchemaKind) -> Result<String> {
    match serde_json::to_string_pretty(&generate_schema(kind)) {
        Ok(json) => Ok(json),
        Err(err) => analysis_err!(Generic, format!("serializing schema: {err}")),
    }
}
