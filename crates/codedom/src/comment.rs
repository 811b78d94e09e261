use std::slice;

use serde::{Deserialize, Serialize};

use crate::collection::CodeObjectCollection;
use crate::object::NodeId;

/// Flavour of a comment as the renderer should emit it.  
/// 註解輸出時的樣式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentType {
    #[default]
    Line,
    Inline,
    Documentation,
}

/// Comment node payload.  
/// 註解節點內容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    text: String,
    #[serde(default)]
    comment_type: CommentType,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_type(text, CommentType::Line)
    }

    pub fn with_type(text: impl Into<String>, comment_type: CommentType) -> Self {
        Self {
            text: text.into(),
            comment_type,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn comment_type(&self) -> CommentType {
        self.comment_type
    }

    pub fn set_comment_type(&mut self, comment_type: CommentType) {
        self.comment_type = comment_type;
    }
}

/// Which of the two comment sequences of a node to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentPosition {
    Before,
    After,
}

/// Ordered comment nodes owned by exactly one commentable node.  
/// 由單一節點擁有的有序註解集合。
#[derive(Debug)]
pub struct CommentCollection {
    inner: CodeObjectCollection,
}

impl CommentCollection {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            inner: CodeObjectCollection::new(owner),
        }
    }

    pub fn owner(&self) -> NodeId {
        self.inner.owner()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.contains(id)
    }

    pub fn iter(&self) -> slice::Iter<'_, NodeId> {
        self.inner.iter()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        self.inner.as_slice()
    }

    pub(crate) fn list(&self) -> &CodeObjectCollection {
        &self.inner
    }

    pub(crate) fn list_mut(&mut self) -> &mut CodeObjectCollection {
        &mut self.inner
    }
}

impl<'a> IntoIterator for &'a CommentCollection {
    type Item = &'a NodeId;
    type IntoIter = slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Capability of carrying comments before and after a node.  
/// 可於節點前後附加註解的能力。
pub trait Commentable {
    fn comments_before(&self) -> &CommentCollection;

    fn comments_after(&self) -> &CommentCollection;

    fn comments(&self, position: CommentPosition) -> &CommentCollection {
        match position {
            CommentPosition::Before => self.comments_before(),
            CommentPosition::After => self.comments_after(),
        }
    }
}

/// Both comment sequences, allocated together for one owner.
#[derive(Debug)]
pub(crate) struct CommentSlots {
    pub(crate) before: CommentCollection,
    pub(crate) after: CommentCollection,
}

impl CommentSlots {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            before: CommentCollection::new(owner),
            after: CommentCollection::new(owner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_defaults_to_line() {
        let comment = Comment::new("TODO");
        assert_eq!(comment.comment_type(), CommentType::Line);
        assert_eq!(comment.text(), "TODO");
    }

    #[test]
    fn slots_are_distinct_but_share_owner() {
        let owner = NodeId::from_index(7);
        let mut slots = CommentSlots::new(owner);
        slots.before.list_mut().push(NodeId::from_index(8));
        assert_eq!(slots.before.len(), 1);
        assert!(slots.after.is_empty());
        assert_eq!(slots.before.owner(), owner);
        assert_eq!(slots.after.owner(), owner);
    }
}
