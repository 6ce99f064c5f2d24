// Copyright 2026 The Stratloop Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::{NodeId, Result, SwotId};
use crate::datamodel::{CausalLink, CldNode, SwotEntry};
use crate::document::{CldDocument, LinkUpdate};

/// A single edit to a document, as issued by the editing canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PatchOp {
    AddSwotEntry {
        entry: SwotEntry,
    },
    RemoveSwotEntry {
        id: SwotId,
    },
    AddNode {
        node: CldNode,
    },
    #[serde(rename_all = "camelCase")]
    AddNodeFromSwot {
        swot_id: SwotId,
        node_id: NodeId,
    },
    RemoveNode {
        id: NodeId,
    },
    AddLink {
        link: CausalLink,
    },
    RemoveLink {
        id: String,
    },
    UpdateLink {
        id: String,
        #[serde(flatten)]
        update: LinkUpdate,
    },
}

/// Apply `ops` in order to a staged copy of `doc`; the document is only
/// replaced if every op succeeds.
pub fn apply_patch(doc: &mut CldDocument, ops: &[PatchOp]) -> Result<()> {
    let mut staged = doc.clone();

    for op in ops {
        match op {
            PatchOp::AddSwotEntry { entry } => staged.add_swot_entry(entry.clone())?,
            PatchOp::RemoveSwotEntry { id } => {
                staged.remove_swot_entry(id)?;
            }
            PatchOp::AddNode { node } => staged.add_node(node.clone())?,
            PatchOp::AddNodeFromSwot { swot_id, node_id } => {
                staged.add_node_from_swot(swot_id, node_id)?;
            }
            PatchOp::RemoveNode { id } => {
                staged.remove_node(id)?;
            }
            PatchOp::AddLink { link } => staged.add_link(link.clone())?,
            PatchOp::RemoveLink { id } => {
                staged.remove_link(id)?;
            }
            PatchOp::UpdateLink { id, update } => staged.update_link(id, *update)?,
        }
    }

    *doc = staged;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::datamodel::{Polarity, SwotCategory, VariableKind};

    fn add_node(id: &str) -> PatchOp {
        PatchOp::AddNode {
            node: CldNode::new(id, id, SwotCategory::Opportunity, VariableKind::Stock),
        }
    }

    #[test]
    fn test_patch_is_all_or_nothing() {
        let mut doc = CldDocument::new();
        let ops = vec![
            add_node("a"),
            add_node("b"),
            PatchOp::AddLink {
                link: CausalLink::new("ab", "a", "b", Polarity::Same),
            },
            PatchOp::AddLink {
                link: CausalLink::new("bx", "b", "x", Polarity::Same),
            },
        ];
        let err = apply_patch(&mut doc, &ops).unwrap_err();
        assert_eq!(ErrorCode::UnknownEndpoint, err.code);
        assert!(doc.is_empty());

        apply_patch(&mut doc, &ops[..3]).unwrap();
        assert_eq!(2, doc.nodes().len());
        assert_eq!(1, doc.links().len());
    }

    #[test]
    fn test_patch_json() {
        let json = r#"[
            {"op": "addNode", "node": {"id": "a", "label": "A", "category": "strength", "nodeType": "stock", "x": 0, "y": 0}},
            {"op": "addNode", "node": {"id": "b", "label": "B", "category": "threat", "nodeType": "decision", "x": 0, "y": 0}},
            {"op": "addLink", "link": {"id": "l1", "sourceId": "a", "targetId": "b"}},
            {"op": "updateLink", "id": "l1", "polarity": "opposite", "hasDelay": true}
        ]"#;
        let ops: Vec<PatchOp> = serde_json::from_str(json).unwrap();
        let mut doc = CldDocument::new();
        apply_patch(&mut doc, &ops).unwrap();

        let link = doc.link("l1").unwrap();
        assert_eq!(Polarity::Opposite, link.polarity);
        assert!(link.has_delay);

        apply_patch(&mut doc, &[PatchOp::RemoveNode { id: "a".to_owned() }]).unwrap();
        assert!(doc.links().is_empty());
    }
}
