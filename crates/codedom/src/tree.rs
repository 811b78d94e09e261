use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::collection::CodeObjectCollection;
use crate::comment::{Comment, CommentPosition, Commentable};
use crate::declaration::{
    CompilationUnit, ContainerParts, MethodArgument, MethodDeclaration, Modifiers,
    NamespaceDeclaration, TypeDeclaration, TypeKind,
};
use crate::directive::{Directive, DirectiveKind, UsingDirective};
use crate::object::{CodeObject, Node, NodeId, NodeKind};

/// Named child collection of a node.  
/// 節點的具名子集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildSlot {
    CommentsBefore,
    Usings,
    Namespaces,
    Types,
    Members,
    CommentsAfter,
}

impl ChildSlot {
    /// Every slot, in the order a renderer visits them.
    pub const ALL: [ChildSlot; 6] = [
        ChildSlot::CommentsBefore,
        ChildSlot::Usings,
        ChildSlot::Namespaces,
        ChildSlot::Types,
        ChildSlot::Members,
        ChildSlot::CommentsAfter,
    ];

    /// Returns whether nodes of `kind` may be placed in this slot.
    pub fn accepts(self, kind: NodeKind) -> bool {
        match self {
            ChildSlot::CommentsBefore | ChildSlot::CommentsAfter => kind == NodeKind::Comment,
            ChildSlot::Usings => kind == NodeKind::Directive,
            ChildSlot::Namespaces => kind == NodeKind::Namespace,
            ChildSlot::Types => kind == NodeKind::Type,
            ChildSlot::Members => matches!(kind, NodeKind::Type | NodeKind::Method),
        }
    }
}

impl From<CommentPosition> for ChildSlot {
    fn from(value: CommentPosition) -> Self {
        match value {
            CommentPosition::Before => ChildSlot::CommentsBefore,
            CommentPosition::After => ChildSlot::CommentsAfter,
        }
    }
}

impl fmt::Display for ChildSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChildSlot::CommentsBefore => "comments-before",
            ChildSlot::Usings => "usings",
            ChildSlot::Namespaces => "namespaces",
            ChildSlot::Types => "types",
            ChildSlot::Members => "members",
            ChildSlot::CommentsAfter => "comments-after",
        };
        f.write_str(label)
    }
}

/// Value description of a node before it receives an id.  
/// 節點取得識別碼之前的內容描述。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeDraft {
    CompilationUnit,
    Namespace {
        #[serde(default)]
        name: Option<String>,
    },
    Type {
        #[serde(default)]
        kind: TypeKind,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        base_type: Option<String>,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Method {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        return_type: Option<String>,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        arguments: Vec<MethodArgument>,
    },
    Directive(DirectiveKind),
    Comment(Comment),
}

impl NodeDraft {
    pub fn compilation_unit() -> Self {
        NodeDraft::CompilationUnit
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        NodeDraft::Namespace {
            name: Some(name.into()),
        }
    }

    pub fn type_declaration(kind: TypeKind, name: impl Into<String>) -> Self {
        NodeDraft::Type {
            kind,
            name: Some(name.into()),
            base_type: None,
            modifiers: Modifiers::default(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::type_declaration(TypeKind::Class, name)
    }

    pub fn method(name: impl Into<String>) -> Self {
        NodeDraft::Method {
            name: Some(name.into()),
            return_type: None,
            modifiers: Modifiers::default(),
            arguments: Vec::new(),
        }
    }

    /// Replaces the modifiers of a type or method draft; other drafts are
    /// returned unchanged.
    pub fn with_modifiers(mut self, value: Modifiers) -> Self {
        match &mut self {
            NodeDraft::Type { modifiers, .. } | NodeDraft::Method { modifiers, .. } => {
                *modifiers = value;
            }
            _ => {}
        }
        self
    }

    pub fn with_base_type(mut self, value: impl Into<String>) -> Self {
        if let NodeDraft::Type { base_type, .. } = &mut self {
            *base_type = Some(value.into());
        }
        self
    }

    pub fn with_return_type(mut self, value: impl Into<String>) -> Self {
        if let NodeDraft::Method { return_type, .. } = &mut self {
            *return_type = Some(value.into());
        }
        self
    }

    pub fn with_argument(mut self, argument: MethodArgument) -> Self {
        if let NodeDraft::Method { arguments, .. } = &mut self {
            arguments.push(argument);
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeDraft::CompilationUnit => NodeKind::CompilationUnit,
            NodeDraft::Namespace { .. } => NodeKind::Namespace,
            NodeDraft::Type { .. } => NodeKind::Type,
            NodeDraft::Method { .. } => NodeKind::Method,
            NodeDraft::Directive(_) => NodeKind::Directive,
            NodeDraft::Comment(_) => NodeKind::Comment,
        }
    }

    /// Captures the payload of an existing node, without its children.
    pub(crate) fn from_node(node: &Node) -> Self {
        match node {
            Node::CompilationUnit(_) => NodeDraft::CompilationUnit,
            Node::Namespace(namespace) => NodeDraft::Namespace {
                name: namespace.name().map(str::to_string),
            },
            Node::Type(declaration) => NodeDraft::Type {
                kind: declaration.kind(),
                name: declaration.name().map(str::to_string),
                base_type: declaration.base_type().map(str::to_string),
                modifiers: declaration.modifiers().clone(),
            },
            Node::Method(method) => NodeDraft::Method {
                name: method.name().map(str::to_string),
                return_type: method.return_type().map(str::to_string),
                modifiers: method.modifiers().clone(),
                arguments: method.arguments().to_vec(),
            },
            Node::Directive(directive) => NodeDraft::Directive(directive.kind().clone()),
            Node::Comment(comment) => NodeDraft::Comment(comment.clone()),
        }
    }

    // Collections are bound to `id` here, before the node is reachable.
    fn build(self, id: NodeId) -> Node {
        match self {
            NodeDraft::CompilationUnit => Node::CompilationUnit(CompilationUnit::new(id)),
            NodeDraft::Namespace { name } => Node::Namespace(NamespaceDeclaration::new(id, name)),
            NodeDraft::Type {
                kind,
                name,
                base_type,
                modifiers,
            } => {
                let mut declaration = TypeDeclaration::new(id, kind, name, modifiers);
                declaration.set_base_type(base_type);
                Node::Type(declaration)
            }
            NodeDraft::Method {
                name,
                return_type,
                modifiers,
                arguments,
            } => Node::Method(MethodDeclaration::new(
                id,
                name,
                return_type,
                modifiers,
                arguments,
            )),
            NodeDraft::Directive(kind) => Node::Directive(Directive::new(id, kind)),
            NodeDraft::Comment(comment) => Node::Comment(comment),
        }
    }
}

impl From<UsingDirective> for NodeDraft {
    fn from(value: UsingDirective) -> Self {
        NodeDraft::Directive(DirectiveKind::Using(value))
    }
}

impl From<DirectiveKind> for NodeDraft {
    fn from(value: DirectiveKind) -> Self {
        NodeDraft::Directive(value)
    }
}

impl From<Comment> for NodeDraft {
    fn from(value: Comment) -> Self {
        NodeDraft::Comment(value)
    }
}

/// Arena owning every node of one code-DOM tree.  
/// 擁有整棵程式碼樹所有節點的儲存區。
///
/// Nodes are addressed by [`NodeId`]. Ids are never reused, so a removed
/// node's id resolves to `None` rather than to a newer node. Removal drops
/// the node payload but keeps an empty slot per id ever issued; rebuild
/// through [`CodeTree::snapshot`] and [`CodeTree::from_snapshot`] to
/// compact a long-lived tree. The tree is not internally synchronised;
/// share it behind a lock if needed.
#[derive(Debug, Default)]
pub struct CodeTree {
    nodes: Vec<Option<CodeObject>>,
    live: usize,
    revision: u64,
}

impl CodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Counter bumped by every structural mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Allocates a detached node and returns its id.  
    /// 建立尚未掛載的節點並回傳其識別碼。
    pub fn insert(&mut self, draft: impl Into<NodeDraft>) -> NodeId {
        let draft = draft.into();
        let kind = draft.kind();
        let id = NodeId::from_index(self.nodes.len());
        let node = draft.build(id);
        self.nodes.push(Some(CodeObject::new(id, node)));
        self.live += 1;
        self.bump();
        trace!(node = %id, %kind, "inserted code node");
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&CodeObject> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CodeObject> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(CodeObject::parent)
    }

    /// Live nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CodeObject> + '_ {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Live nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|object| object.parent().is_none())
            .map(CodeObject::id)
    }

    /// Walks parent links upward, starting with the parent of `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Pre-order walk of `root` and its subtree, visiting slots in
    /// [`ChildSlot::ALL`] order. Yields nothing for an unknown root.
    pub fn walk(&self, root: NodeId) -> Walk<'_> {
        let stack = if self.contains(root) {
            vec![root]
        } else {
            Vec::new()
        };
        Walk { tree: self, stack }
    }

    /// Returns the ordered ids held in `slot` of `parent`.
    pub fn children(&self, parent: NodeId, slot: ChildSlot) -> Result<&[NodeId], CodeTreeError> {
        self.collection(parent, slot).map(CodeObjectCollection::as_slice)
    }

    /// Appends a detached `child` to `slot` of `parent`.  
    /// 將未掛載的子節點加入父節點的指定集合尾端。
    pub fn append(
        &mut self,
        parent: NodeId,
        slot: ChildSlot,
        child: NodeId,
    ) -> Result<(), CodeTreeError> {
        let child_object = self.get(child).ok_or(CodeTreeError::NodeNotFound(child))?;
        if let Some(existing) = child_object.parent() {
            return Err(CodeTreeError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        let child_kind = child_object.kind();
        // Resolves the parent and the slot before any mutation.
        self.collection(parent, slot)?;
        if !slot.accepts(child_kind) {
            return Err(CodeTreeError::InvalidChild {
                child,
                kind: child_kind,
                slot,
            });
        }
        if parent == child || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(CodeTreeError::WouldCreateCycle { parent, child });
        }

        self.collection_mut(parent, slot)?.push(child);
        if let Some(object) = self.get_mut(child) {
            object.set_parent(Some(parent));
        }
        self.bump();
        trace!(parent = %parent, child = %child, %slot, "attached code node");
        Ok(())
    }

    /// Removes `child` from `slot` of `parent` by identity and clears its
    /// parent link. Returns `false` when the child was not there.
    pub fn detach(&mut self, parent: NodeId, slot: ChildSlot, child: NodeId) -> bool {
        let removed = match self.collection_mut(parent, slot) {
            Ok(list) => list.remove(child),
            Err(_) => false,
        };
        if removed {
            if let Some(object) = self.get_mut(child) {
                object.set_parent(None);
            }
            self.bump();
            trace!(parent = %parent, child = %child, %slot, "detached code node");
        }
        removed
    }

    /// Creates a comment node and appends it to one of `owner`'s comment
    /// collections.
    pub fn add_comment(
        &mut self,
        owner: NodeId,
        position: CommentPosition,
        comment: Comment,
    ) -> Result<NodeId, CodeTreeError> {
        let object = self.get(owner).ok_or(CodeTreeError::NodeNotFound(owner))?;
        if object.as_commentable().is_none() {
            return Err(CodeTreeError::NotCommentable {
                node: owner,
                kind: object.kind(),
            });
        }
        let id = self.insert(comment);
        self.append(owner, position.into(), id)?;
        Ok(id)
    }

    /// Removes `comment` from whichever comment collection of `owner` holds
    /// it and drops the comment node, so its id no longer resolves.
    pub fn remove_comment(&mut self, owner: NodeId, comment: NodeId) -> bool {
        let detached = self.detach(owner, ChildSlot::CommentsBefore, comment)
            || self.detach(owner, ChildSlot::CommentsAfter, comment);
        if detached {
            self.release(comment);
        }
        detached
    }

    /// Comments attached at `position` of `owner`, in insertion order.
    pub fn comments(
        &self,
        owner: NodeId,
        position: CommentPosition,
    ) -> Result<impl Iterator<Item = (NodeId, &Comment)> + '_, CodeTreeError> {
        let list = self.collection(owner, position.into()).map_err(|err| match err {
            CodeTreeError::SlotNotSupported { node, kind, .. } => {
                CodeTreeError::NotCommentable { node, kind }
            }
            other => other,
        })?;
        Ok(list.iter().filter_map(move |id| {
            self.get(*id)
                .and_then(CodeObject::as_comment)
                .map(|comment| (*id, comment))
        }))
    }

    /// Detaches `id` from its parent and drops it together with its whole
    /// subtree. Returns the removed ids in walk order.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, CodeTreeError> {
        let object = self.get(id).ok_or(CodeTreeError::NodeNotFound(id))?;
        if let Some(parent) = object.parent() {
            for slot in ChildSlot::ALL {
                if self.detach(parent, slot, id) {
                    break;
                }
            }
        }

        let removed: Vec<NodeId> = self.walk(id).collect();
        for node in &removed {
            self.release(*node);
        }
        self.bump();
        debug!(root = %id, count = removed.len(), "removed code subtree");
        Ok(removed)
    }

    /// Empties the arena slot of `id`. The slot itself is kept so ids stay
    /// stable; only the payload is dropped.
    fn release(&mut self, id: NodeId) {
        if let Some(entry) = self.nodes.get_mut(id.index()) {
            if entry.take().is_some() {
                self.live -= 1;
            }
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn collection(
        &self,
        parent: NodeId,
        slot: ChildSlot,
    ) -> Result<&CodeObjectCollection, CodeTreeError> {
        let object = self.get(parent).ok_or(CodeTreeError::NodeNotFound(parent))?;
        let node = object.node();
        let list = match (node, slot) {
            (_, ChildSlot::CommentsBefore) => node
                .as_commentable()
                .map(|commentable| commentable.comments_before().list()),
            (_, ChildSlot::CommentsAfter) => node
                .as_commentable()
                .map(|commentable| commentable.comments_after().list()),
            (Node::CompilationUnit(unit), ChildSlot::Usings) => Some(unit.usings()),
            (Node::CompilationUnit(unit), ChildSlot::Namespaces) => Some(unit.namespaces()),
            (Node::CompilationUnit(unit), ChildSlot::Types) => Some(unit.types()),
            (Node::Namespace(namespace), ChildSlot::Usings) => Some(namespace.usings()),
            (Node::Namespace(namespace), ChildSlot::Namespaces) => Some(namespace.namespaces()),
            (Node::Namespace(namespace), ChildSlot::Types) => Some(namespace.types()),
            (Node::Type(declaration), ChildSlot::Members) => Some(declaration.members()),
            _ => None,
        };
        list.ok_or(CodeTreeError::SlotNotSupported {
            node: parent,
            kind: object.kind(),
            slot,
        })
    }

    fn collection_mut(
        &mut self,
        parent: NodeId,
        slot: ChildSlot,
    ) -> Result<&mut CodeObjectCollection, CodeTreeError> {
        let object = self
            .get_mut(parent)
            .ok_or(CodeTreeError::NodeNotFound(parent))?;
        let kind = object.kind();
        let parts: Option<ContainerParts<'_>> = match object.node_mut() {
            Node::CompilationUnit(unit) => Some(unit.parts_mut()),
            Node::Namespace(namespace) => Some(namespace.parts_mut()),
            Node::Type(declaration) => Some(declaration.parts_mut()),
            Node::Method(method) => Some(method.parts_mut()),
            Node::Directive(directive) => Some(directive.parts_mut()),
            Node::Comment(_) => None,
        };
        parts
            .and_then(|parts| parts.into_collection(slot))
            .ok_or(CodeTreeError::SlotNotSupported {
                node: parent,
                kind,
                slot,
            })
    }
}

/// Iterator returned by [`CodeTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a CodeTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Iterator returned by [`CodeTree::walk`].
pub struct Walk<'a> {
    tree: &'a CodeTree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        for slot in ChildSlot::ALL.iter().rev() {
            if let Ok(children) = self.tree.children(current, *slot) {
                self.stack.extend(children.iter().rev().copied());
            }
        }
        Some(current)
    }
}

/// Tree-manipulation errors.  
/// 程式碼樹操作錯誤類型。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeTreeError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("{kind} node {node} has no {slot} collection")]
    SlotNotSupported {
        node: NodeId,
        kind: NodeKind,
        slot: ChildSlot,
    },
    #[error("{slot} collection cannot hold {kind} node {child}")]
    InvalidChild {
        child: NodeId,
        kind: NodeKind,
        slot: ChildSlot,
    },
    #[error("node {child} is already attached to {parent}")]
    AlreadyAttached { child: NodeId, parent: NodeId },
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },
    #[error("{kind} node {node} does not carry comments")]
    NotCommentable { node: NodeId, kind: NodeKind },
}
