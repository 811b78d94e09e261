use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::collection::CodeObjectCollection;
use crate::comment::{CommentCollection, CommentSlots, Commentable};
use crate::object::NodeId;
use crate::tree::ChildSlot;

/// Modifier keywords applied to a type or member.  
/// 型別或成員的修飾詞。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Abstract,
    Sealed,
    Virtual,
    Override,
    ReadOnly,
    Partial,
    Async,
}

/// Set of modifiers; insertion of an existing modifier is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(BTreeSet<Modifier>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.0.insert(modifier);
        self
    }

    pub fn insert(&mut self, modifier: Modifier) -> bool {
        self.0.insert(modifier)
    }

    pub fn remove(&mut self, modifier: Modifier) -> bool {
        self.0.remove(&modifier)
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Flavour of a type declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
}

/// Parameter of a method declaration.  
/// 方法參數。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodArgument {
    pub name: String,
    pub type_name: String,
}

impl MethodArgument {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Root of one emitted source file.  
/// 單一原始碼檔案的根節點。
#[derive(Debug)]
pub struct CompilationUnit {
    comments: CommentSlots,
    usings: CodeObjectCollection,
    namespaces: CodeObjectCollection,
    types: CodeObjectCollection,
}

impl CompilationUnit {
    pub(crate) fn new(owner: NodeId) -> Self {
        Self {
            comments: CommentSlots::new(owner),
            usings: CodeObjectCollection::new(owner),
            namespaces: CodeObjectCollection::new(owner),
            types: CodeObjectCollection::new(owner),
        }
    }

    pub fn usings(&self) -> &CodeObjectCollection {
        &self.usings
    }

    pub fn namespaces(&self) -> &CodeObjectCollection {
        &self.namespaces
    }

    pub fn types(&self) -> &CodeObjectCollection {
        &self.types
    }

    pub(crate) fn parts_mut(&mut self) -> ContainerParts<'_> {
        ContainerParts {
            comments: &mut self.comments,
            usings: Some(&mut self.usings),
            namespaces: Some(&mut self.namespaces),
            types: Some(&mut self.types),
            members: None,
        }
    }
}

/// Namespace block; nests usings, types and further namespaces.  
/// 命名空間宣告。
#[derive(Debug)]
pub struct NamespaceDeclaration {
    name: Option<String>,
    comments: CommentSlots,
    usings: CodeObjectCollection,
    namespaces: CodeObjectCollection,
    types: CodeObjectCollection,
}

impl NamespaceDeclaration {
    pub(crate) fn new(owner: NodeId, name: Option<String>) -> Self {
        Self {
            name,
            comments: CommentSlots::new(owner),
            usings: CodeObjectCollection::new(owner),
            namespaces: CodeObjectCollection::new(owner),
            types: CodeObjectCollection::new(owner),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name<S: Into<String>>(&mut self, name: Option<S>) {
        self.name = name.map(Into::into);
    }

    pub fn usings(&self) -> &CodeObjectCollection {
        &self.usings
    }

    pub fn namespaces(&self) -> &CodeObjectCollection {
        &self.namespaces
    }

    pub fn types(&self) -> &CodeObjectCollection {
        &self.types
    }

    pub(crate) fn parts_mut(&mut self) -> ContainerParts<'_> {
        ContainerParts {
            comments: &mut self.comments,
            usings: Some(&mut self.usings),
            namespaces: Some(&mut self.namespaces),
            types: Some(&mut self.types),
            members: None,
        }
    }
}

/// Class, struct, interface or enum declaration.  
/// 型別宣告。
#[derive(Debug)]
pub struct TypeDeclaration {
    kind: TypeKind,
    name: Option<String>,
    base_type: Option<String>,
    modifiers: Modifiers,
    comments: CommentSlots,
    members: CodeObjectCollection,
}

impl TypeDeclaration {
    pub(crate) fn new(
        owner: NodeId,
        kind: TypeKind,
        name: Option<String>,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            kind,
            name,
            base_type: None,
            modifiers,
            comments: CommentSlots::new(owner),
            members: CodeObjectCollection::new(owner),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: TypeKind) {
        self.kind = kind;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name<S: Into<String>>(&mut self, name: Option<S>) {
        self.name = name.map(Into::into);
    }

    pub fn base_type(&self) -> Option<&str> {
        self.base_type.as_deref()
    }

    pub fn set_base_type<S: Into<String>>(&mut self, base_type: Option<S>) {
        self.base_type = base_type.map(Into::into);
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut Modifiers {
        &mut self.modifiers
    }

    pub fn members(&self) -> &CodeObjectCollection {
        &self.members
    }

    pub(crate) fn parts_mut(&mut self) -> ContainerParts<'_> {
        ContainerParts {
            members: Some(&mut self.members),
            ..ContainerParts::comments_only(&mut self.comments)
        }
    }
}

/// Method member of a type.  
/// 方法宣告。
#[derive(Debug)]
pub struct MethodDeclaration {
    name: Option<String>,
    return_type: Option<String>,
    modifiers: Modifiers,
    arguments: Vec<MethodArgument>,
    comments: CommentSlots,
}

impl MethodDeclaration {
    pub(crate) fn new(
        owner: NodeId,
        name: Option<String>,
        return_type: Option<String>,
        modifiers: Modifiers,
        arguments: Vec<MethodArgument>,
    ) -> Self {
        Self {
            name,
            return_type,
            modifiers,
            arguments,
            comments: CommentSlots::new(owner),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name<S: Into<String>>(&mut self, name: Option<S>) {
        self.name = name.map(Into::into);
    }

    /// `None` renders as the target language's "no value" return.
    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn set_return_type<S: Into<String>>(&mut self, return_type: Option<S>) {
        self.return_type = return_type.map(Into::into);
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut Modifiers {
        &mut self.modifiers
    }

    pub fn arguments(&self) -> &[MethodArgument] {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut Vec<MethodArgument> {
        &mut self.arguments
    }

    pub(crate) fn parts_mut(&mut self) -> ContainerParts<'_> {
        ContainerParts::comments_only(&mut self.comments)
    }
}

/// Mutable borrow of every collection a node exposes.
pub(crate) struct ContainerParts<'a> {
    pub(crate) comments: &'a mut CommentSlots,
    pub(crate) usings: Option<&'a mut CodeObjectCollection>,
    pub(crate) namespaces: Option<&'a mut CodeObjectCollection>,
    pub(crate) types: Option<&'a mut CodeObjectCollection>,
    pub(crate) members: Option<&'a mut CodeObjectCollection>,
}

impl<'a> ContainerParts<'a> {
    pub(crate) fn comments_only(comments: &'a mut CommentSlots) -> Self {
        Self {
            comments,
            usings: None,
            namespaces: None,
            types: None,
            members: None,
        }
    }

    pub(crate) fn into_collection(self, slot: ChildSlot) -> Option<&'a mut CodeObjectCollection> {
        match slot {
            ChildSlot::CommentsBefore => Some(self.comments.before.list_mut()),
            ChildSlot::CommentsAfter => Some(self.comments.after.list_mut()),
            ChildSlot::Usings => self.usings,
            ChildSlot::Namespaces => self.namespaces,
            ChildSlot::Types => self.types,
            ChildSlot::Members => self.members,
        }
    }
}

macro_rules! impl_commentable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Commentable for $ty {
                fn comments_before(&self) -> &CommentCollection {
                    &self.comments.before
                }

                fn comments_after(&self) -> &CommentCollection {
                    &self.comments.after
                }
            }
        )+
    };
}

impl_commentable!(
    CompilationUnit,
    NamespaceDeclaration,
    TypeDeclaration,
    MethodDeclaration,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_deduplicate() {
        let mut modifiers = Modifiers::new().with(Modifier::Public).with(Modifier::Static);
        assert!(!modifiers.insert(Modifier::Public));
        assert!(modifiers.contains(Modifier::Static));
        assert!(modifiers.remove(Modifier::Static));
        let collected: Vec<Modifier> = modifiers.iter().collect();
        assert_eq!(collected, vec![Modifier::Public]);
    }

    #[test]
    fn collections_are_bound_to_owner() {
        let owner = NodeId::from_index(11);
        let namespace = NamespaceDeclaration::new(owner, Some("Acme".into()));
        assert_eq!(namespace.usings().owner(), owner);
        assert_eq!(namespace.types().owner(), owner);
        assert_eq!(namespace.comments_before().owner(), owner);
        assert!(namespace.comments_after().is_empty());
        assert_eq!(namespace.name(), Some("Acme"));
    }
}
