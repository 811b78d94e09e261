use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::object::{NodeData, NodeId};
use crate::tree::{ChildSlot, CodeTree, CodeTreeError, NodeDraft};

/// Current on-disk layout of [`CodeTreeSnapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Flat, serialisable copy of a [`CodeTree`].  
/// 可序列化的程式碼樹扁平快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeTreeSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

/// One node of a snapshot with its payload, metadata and child ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub draft: NodeDraft,
    #[serde(default, skip_serializing_if = "NodeData::is_empty")]
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SlotRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub slot: ChildSlot,
    pub nodes: Vec<NodeId>,
}

/// Errors raised while rebuilding a tree from a snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("snapshot lists node {0} more than once")]
    DuplicateNode(NodeId),
    #[error("snapshot references unknown node {0}")]
    UnknownNode(NodeId),
    #[error(transparent)]
    Tree(#[from] CodeTreeError),
}

impl CodeTree {
    /// Captures every live node, detached ones included.
    pub fn snapshot(&self) -> CodeTreeSnapshot {
        let nodes = self
            .iter()
            .map(|object| {
                let id = object.id();
                let children = ChildSlot::ALL
                    .iter()
                    .filter_map(|slot| {
                        let ids = self.children(id, *slot).ok()?;
                        (!ids.is_empty()).then(|| SlotRecord {
                            slot: *slot,
                            nodes: ids.to_vec(),
                        })
                    })
                    .collect();
                NodeRecord {
                    id,
                    draft: NodeDraft::from_node(object.node()),
                    data: object.data().clone(),
                    children,
                }
            })
            .collect();

        CodeTreeSnapshot {
            version: SNAPSHOT_VERSION,
            revision: self.revision(),
            nodes,
        }
    }

    /// Rebuilds a tree through [`CodeTree::insert`] and [`CodeTree::append`],
    /// so every structural rule is checked again. Ids are reassigned densely
    /// in record order.  
    /// 透過一般的插入與掛載流程重建程式碼樹；識別碼會依記錄順序重新配發。
    pub fn from_snapshot(snapshot: CodeTreeSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version > SNAPSHOT_VERSION {
            warn!(
                found = snapshot.version,
                supported = SNAPSHOT_VERSION,
                "rejecting code tree snapshot from a newer format"
            );
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let mut tree = CodeTree::new();
        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(snapshot.nodes.len());
        for record in &snapshot.nodes {
            let id = tree.insert(record.draft.clone());
            if let Some(object) = tree.get_mut(id) {
                object.replace_data(record.data.clone());
            }
            if remap.insert(record.id, id).is_some() {
                return Err(SnapshotError::DuplicateNode(record.id));
            }
        }

        for record in &snapshot.nodes {
            let parent = remap[&record.id];
            for slot in &record.children {
                for child in &slot.nodes {
                    let child = remap
                        .get(child)
                        .copied()
                        .ok_or(SnapshotError::UnknownNode(*child))?;
                    tree.append(parent, slot.slot, child)?;
                }
            }
        }

        tree.set_revision(snapshot.revision);
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{Comment, CommentPosition};
    use crate::directive::UsingDirective;
    use crate::object::{CodeObject, DataValue};

    #[test]
    fn newer_version_is_rejected() {
        let snapshot = CodeTreeSnapshot {
            version: SNAPSHOT_VERSION + 1,
            revision: 0,
            nodes: Vec::new(),
        };
        let err = CodeTree::from_snapshot(snapshot).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::UnsupportedVersion {
                found: SNAPSHOT_VERSION + 1,
                supported: SNAPSHOT_VERSION
            }
        );
    }

    #[test]
    fn rebuild_preserves_structure_and_metadata() {
        let mut tree = CodeTree::new();
        let unit = tree.insert(NodeDraft::compilation_unit());
        let using = tree.insert(UsingDirective::with_namespace(Some("System.Linq")));
        tree.append(unit, ChildSlot::Usings, using).unwrap();
        tree.add_comment(using, CommentPosition::After, Comment::new("query helpers"))
            .unwrap();
        if let Some(object) = tree.get_mut(using) {
            object.data_mut().insert("origin", "generator");
        }
        let orphan = tree.insert(NodeDraft::namespace("Loose"));

        let rebuilt = CodeTree::from_snapshot(tree.snapshot()).unwrap();
        assert_eq!(rebuilt.len(), 4);
        assert_eq!(rebuilt.revision(), tree.revision());

        let roots: Vec<NodeId> = rebuilt.roots().collect();
        assert_eq!(roots.len(), 2);
        let unit = roots[0];
        let usings = rebuilt.children(unit, ChildSlot::Usings).unwrap();
        let using = rebuilt.get(usings[0]).unwrap();
        assert_eq!(using.as_using().and_then(UsingDirective::namespace), Some("System.Linq"));
        assert_eq!(
            using.data().get("origin"),
            Some(&DataValue::Text("generator".into()))
        );
        let after: Vec<&str> = rebuilt
            .comments(using.id(), CommentPosition::After)
            .unwrap()
            .map(|(_, comment)| comment.text())
            .collect();
        assert_eq!(after, vec!["query helpers"]);
        let loose = rebuilt.get(roots[1]).and_then(CodeObject::as_namespace).unwrap();
        assert_eq!(loose.name(), Some("Loose"));
        assert!(tree.contains(orphan));
    }

    #[test]
    fn dangling_child_reference_fails() {
        let snapshot = CodeTreeSnapshot {
            version: SNAPSHOT_VERSION,
            revision: 3,
            nodes: vec![NodeRecord {
                id: NodeId::from_index(0),
                draft: NodeDraft::compilation_unit(),
                data: NodeData::default(),
                children: vec![SlotRecord {
                    slot: ChildSlot::Types,
                    nodes: vec![NodeId::from_index(5)],
                }],
            }],
        };
        let err = CodeTree::from_snapshot(snapshot).unwrap_err();
        assert_eq!(err, SnapshotError::UnknownNode(NodeId::from_index(5)));
    }

    #[test]
    fn child_listed_twice_is_rejected_by_tree_rules() {
        let payload = r#"{
            "version": 1,
            "nodes": [
                { "id": 0, "draft": { "Namespace": { "name": "A" } },
                  "children": [ { "slot": "Types", "nodes": [2] } ] },
                { "id": 1, "draft": { "Namespace": { "name": "B" } },
                  "children": [ { "slot": "Types", "nodes": [2] } ] },
                { "id": 2, "draft": { "Type": { "name": "Shared" } } }
            ]
        }"#;
        let snapshot: CodeTreeSnapshot = serde_json::from_str(payload).unwrap();
        let err = CodeTree::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Tree(CodeTreeError::AlreadyAttached { .. })
        ));
    }
}
