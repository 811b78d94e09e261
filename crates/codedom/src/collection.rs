use std::slice;

use crate::object::NodeId;

/// Ordered child list bound to the node that owns it.  
/// 綁定至擁有者節點的有序子節點清單。
///
/// Only [`CodeTree`](crate::CodeTree) mutates a collection, so the child's
/// parent link and its membership here always change together.
#[derive(Debug)]
pub struct CodeObjectCollection {
    owner: NodeId,
    items: Vec<NodeId>,
}

impl CodeObjectCollection {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            owner,
            items: Vec::new(),
        }
    }

    /// Node that created and owns this collection.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.items.contains(&id)
    }

    pub fn iter(&self) -> slice::Iter<'_, NodeId> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.items
    }

    pub(crate) fn push(&mut self, id: NodeId) {
        self.items.push(id);
    }

    /// Removes `id` by identity. Returns `false` when it was not present.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self.items.iter().position(|item| *item == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a CodeObjectCollection {
    type Item = &'a NodeId;
    type IntoIter = slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
