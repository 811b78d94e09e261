//! In-memory code-DOM: a tree of typed nodes describing source constructs
//! (compilation units, namespaces, types, methods, directives, comments).
//! 以節點樹描述原始碼結構的記憶體內模型。
//!
//! Nodes live in a [`CodeTree`] arena and are addressed by [`NodeId`].
//! Rendering the tree to text is left to callers walking it with
//! [`CodeTree::walk`].

mod serde_blob;
mod serde_float;
mod util;

pub mod collection;
pub mod comment;
pub mod declaration;
pub mod directive;
pub mod object;
pub mod snapshot;
pub mod store;
pub mod tree;

pub use collection::CodeObjectCollection;
pub use comment::{Comment, CommentCollection, CommentPosition, CommentType, Commentable};
pub use declaration::{
    CompilationUnit, MethodArgument, MethodDeclaration, Modifier, Modifiers, NamespaceDeclaration,
    TypeDeclaration, TypeKind,
};
pub use directive::{Directive, DirectiveKind, UsingDirective};
pub use object::{CodeObject, DataValue, Node, NodeData, NodeId, NodeKind};
pub use snapshot::{CodeTreeSnapshot, NodeRecord, SlotRecord, SnapshotError, SNAPSHOT_VERSION};
pub use store::{CodeTreeStore, CodeTreeStoreError, StoreOptions};
pub use tree::{Ancestors, ChildSlot, CodeTree, CodeTreeError, NodeDraft, Walk};
