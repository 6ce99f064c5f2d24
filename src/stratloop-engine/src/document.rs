// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The editable causal loop diagram document and the read-only view the
//! analysis stages consume.
//!
//! Every mutating operation either succeeds or leaves the document exactly as
//! it was. The only structural validation is endpoint existence (plus id
//! uniqueness and the no-self-link rule); cycles and parallel links are legal.

use std::collections::BTreeMap;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{Error, Result};
use crate::datamodel::{CausalLink, CldNode, Polarity, SwotEntry};
use crate::doc_err;

/// Maximum label length for nodes derived from a SWOT entry.
pub const DERIVED_LABEL_LEN: usize = 50;

/// Partial update of a link's mutable attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct LinkUpdate {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub polarity: Option<Polarity>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub has_delay: Option<bool>,
}

/// Serialized shape of a document, before validation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    #[serde(alias = "swotItems", default)]
    pub swot_entries: Vec<SwotEntry>,
    #[serde(alias = "nodes", default)]
    pub cld_nodes: Vec<CldNode>,
    #[serde(alias = "links", default)]
    pub causal_links: Vec<CausalLink>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument", into = "RawDocument")]
pub struct CldDocument {
    swot_entries: Vec<SwotEntry>,
    nodes: Vec<CldNode>,
    links: Vec<CausalLink>,
}

impl TryFrom<RawDocument> for CldDocument {
    type Error = Error;

    fn try_from(raw: RawDocument) -> Result<Self> {
        CldDocument::from_parts(raw.swot_entries, raw.cld_nodes, raw.causal_links)
    }
}

impl From<CldDocument> for RawDocument {
    fn from(doc: CldDocument) -> Self {
        RawDocument {
            swot_entries: doc.swot_entries,
            cld_nodes: doc.nodes,
            causal_links: doc.links,
        }
    }
}

impl CldDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from raw parts, applying the same invariants as the
    /// individual add operations, in order: entries, then nodes, then links.
    pub fn from_parts(
        swot_entries: Vec<SwotEntry>,
        nodes: Vec<CldNode>,
        links: Vec<CausalLink>,
    ) -> Result<Self> {
        let mut doc = CldDocument::new();
        for entry in swot_entries {
            doc.add_swot_entry(entry)?;
        }
        for node in nodes {
            doc.add_node(node)?;
        }
        for link in links {
            doc.add_link(link)?;
        }
        Ok(doc)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(json).map_err(|err| {
            Error::new(
                crate::common::ErrorKind::Import,
                crate::common::ErrorCode::BadDocument,
                Some(format!("failed to parse document JSON: {err}")),
            )
        })?;
        CldDocument::try_from(raw)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let raw: RawDocument = serde_json::from_reader(reader).map_err(|err| {
            Error::new(
                crate::common::ErrorKind::Import,
                crate::common::ErrorCode::BadDocument,
                Some(format!("failed to parse document JSON: {err}")),
            )
        })?;
        CldDocument::try_from(raw)
    }

    pub fn nodes(&self) -> &[CldNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[CausalLink] {
        &self.links
    }

    pub fn swot_entries(&self) -> &[SwotEntry] {
        &self.swot_entries
    }

    pub fn node(&self, id: &str) -> Option<&CldNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&CausalLink> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn swot_entry(&self, id: &str) -> Option<&SwotEntry> {
        self.swot_entries.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn add_swot_entry(&mut self, entry: SwotEntry) -> Result<()> {
        if entry.id.is_empty() {
            return doc_err!(EmptyIdentifier, "swot entry".to_owned());
        }
        if self.swot_entry(&entry.id).is_some() {
            return doc_err!(DuplicateSwotEntry, entry.id);
        }
        self.swot_entries.push(entry);
        Ok(())
    }

    /// Remove a SWOT entry. Nodes derived from it keep their back-reference,
    /// which the synthesizer treats as stale.
    pub fn remove_swot_entry(&mut self, id: &str) -> Result<SwotEntry> {
        let Some(pos) = self.swot_entries.iter().position(|e| e.id == id) else {
            return doc_err!(UnknownSwotEntry, id.to_owned());
        };
        Ok(self.swot_entries.remove(pos))
    }

    /// Add a node. A `swot_entry_id` that does not resolve is kept as a
    /// stale reference, so documents with removed entries still load.
    pub fn add_node(&mut self, node: CldNode) -> Result<()> {
        if node.id.is_empty() {
            return doc_err!(EmptyIdentifier, "node".to_owned());
        }
        if self.node(&node.id).is_some() {
            return doc_err!(DuplicateNode, node.id);
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Derive a node 1:1 from a SWOT entry: the label is the start of the
    /// entry text, category and variable kind are inherited.
    pub fn add_node_from_swot(&mut self, swot_id: &str, node_id: &str) -> Result<&CldNode> {
        let Some(entry) = self.swot_entry(swot_id) else {
            return doc_err!(UnknownSwotEntry, swot_id.to_owned());
        };
        let label: String = entry.text.chars().take(DERIVED_LABEL_LEN).collect();
        let mut node = CldNode::new(node_id, &label, entry.category, entry.variable_type);
        node.swot_entry_id = Some(entry.id.clone());

        self.add_node(node)?;
        Ok(&self.nodes[self.nodes.len() - 1])
    }

    /// Remove a node and every link touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<CldNode> {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return doc_err!(UnknownNode, id.to_owned());
        };
        let node = self.nodes.remove(pos);

        let before = self.links.len();
        self.links
            .retain(|link| link.source_id != node.id && link.target_id != node.id);
        debug!(
            node = %node.id,
            removed_links = before - self.links.len(),
            "removed node"
        );

        Ok(node)
    }

    pub fn add_link(&mut self, link: CausalLink) -> Result<()> {
        if link.id.is_empty() {
            return doc_err!(EmptyIdentifier, "link".to_owned());
        }
        if self.link(&link.id).is_some() {
            return doc_err!(DuplicateLink, link.id);
        }
        if link.is_self_link() {
            return doc_err!(
                SelfLink,
                format!("link '{}' connects '{}' to itself", link.id, link.source_id)
            );
        }
        for endpoint in [&link.source_id, &link.target_id] {
            if self.node(endpoint).is_none() {
                return doc_err!(
                    UnknownEndpoint,
                    format!("link '{}' references missing node '{}'", link.id, endpoint)
                );
            }
        }
        self.links.push(link);
        Ok(())
    }

    pub fn remove_link(&mut self, id: &str) -> Result<CausalLink> {
        let Some(pos) = self.links.iter().position(|l| l.id == id) else {
            return doc_err!(UnknownLink, id.to_owned());
        };
        Ok(self.links.remove(pos))
    }

    pub fn update_link(&mut self, id: &str, update: LinkUpdate) -> Result<()> {
        let Some(link) = self.links.iter_mut().find(|l| l.id == id) else {
            return doc_err!(UnknownLink, id.to_owned());
        };
        if let Some(polarity) = update.polarity {
            link.polarity = polarity;
        }
        if let Some(has_delay) = update.has_delay {
            link.has_delay = has_delay;
        }
        Ok(())
    }

    pub fn toggle_link_polarity(&mut self, id: &str) -> Result<Polarity> {
        let Some(link) = self.links.iter_mut().find(|l| l.id == id) else {
            return doc_err!(UnknownLink, id.to_owned());
        };
        link.polarity = link.polarity.flipped();
        Ok(link.polarity)
    }

    pub fn toggle_link_delay(&mut self, id: &str) -> Result<bool> {
        let Some(link) = self.links.iter_mut().find(|l| l.id == id) else {
            return doc_err!(UnknownLink, id.to_owned());
        };
        link.has_delay = !link.has_delay;
        Ok(link.has_delay)
    }

    /// Snapshot for the analysis stages.
    pub fn view(&self) -> GraphView<'_> {
        GraphView {
            nodes: self.nodes.iter().map(|n| (n.id.as_str(), n)).collect(),
            links: &self.links,
        }
    }
}

/// Read-only view of a validated document: node id to node, and the full
/// ordered sequence of links. Every link's endpoints are present in `nodes`.
#[derive(Clone, Debug)]
pub struct GraphView<'a> {
    nodes: BTreeMap<&'a str, &'a CldNode>,
    links: &'a [CausalLink],
}

impl<'a> GraphView<'a> {
    pub fn node(&self, id: &str) -> Option<&'a CldNode> {
        self.nodes.get(id).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes.keys().copied()
    }

    pub fn links(&self) -> &'a [CausalLink] {
        self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Label for a node, falling back to its id.
    pub fn label<'s>(&'s self, id: &'s str) -> &'s str {
        self.nodes.get(id).map(|n| n.label.as_str()).unwrap_or(id)
    }

    /// Combined in+out degree, counting parallel links separately.
    pub fn degree(&self, id: &str) -> usize {
        self.links
            .iter()
            .filter(|l| l.source_id == id || l.target_id == id)
            .count()
    }
}
