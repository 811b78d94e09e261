use serde::{Deserialize, Serialize};

use crate::comment::{CommentCollection, CommentSlots, Commentable};
use crate::declaration::ContainerParts;
use crate::object::NodeId;

/// Import statement such as `using System.Linq;`.  
/// 匯入指示詞（例如 `using System.Linq;`）。
///
/// The namespace is not validated; `None` marks a directive whose target
/// has not been assigned yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingDirective {
    #[serde(default)]
    namespace: Option<String>,
}

impl UsingDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace<S: Into<String>>(namespace: Option<S>) -> Self {
        Self {
            namespace: namespace.map(Into::into),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace<S: Into<String>>(&mut self, namespace: Option<S>) {
        self.namespace = namespace.map(Into::into);
    }
}

/// Concrete directive variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    Using(UsingDirective),
}

impl From<UsingDirective> for DirectiveKind {
    fn from(value: UsingDirective) -> Self {
        DirectiveKind::Using(value)
    }
}

/// Standalone element of a file that carries comments.  
/// 可獨立出現在檔案中並附帶註解的元素。
#[derive(Debug)]
pub struct Directive {
    comments: CommentSlots,
    kind: DirectiveKind,
}

impl Directive {
    pub(crate) fn new(owner: NodeId, kind: DirectiveKind) -> Self {
        Self {
            comments: CommentSlots::new(owner),
            kind,
        }
    }

    pub fn kind(&self) -> &DirectiveKind {
        &self.kind
    }

    pub fn as_using(&self) -> Option<&UsingDirective> {
        match &self.kind {
            DirectiveKind::Using(using) => Some(using),
        }
    }

    pub fn as_using_mut(&mut self) -> Option<&mut UsingDirective> {
        match &mut self.kind {
            DirectiveKind::Using(using) => Some(using),
        }
    }

    pub(crate) fn parts_mut(&mut self) -> ContainerParts<'_> {
        ContainerParts::comments_only(&mut self.comments)
    }
}

impl Commentable for Directive {
    fn comments_before(&self) -> &CommentCollection {
        &self.comments.before
    }

    fn comments_after(&self) -> &CommentCollection {
        &self.comments.after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ChildSlot;

    #[test]
    fn default_using_has_no_namespace() {
        let mut using = UsingDirective::new();
        assert_eq!(using.namespace(), None);
        using.set_namespace(Some("System"));
        assert_eq!(using.namespace(), Some("System"));
        using.set_namespace(Some("System.IO"));
        assert_eq!(using.namespace(), Some("System.IO"));
    }

    #[test]
    fn explicit_none_namespace_is_kept() {
        let using = UsingDirective::with_namespace(None::<String>);
        assert_eq!(using.namespace(), None);
        let using = UsingDirective::with_namespace(Some("System.Linq"));
        assert_eq!(using.namespace(), Some("System.Linq"));
    }

    #[test]
    fn setting_namespace_leaves_comments_alone() {
        let owner = NodeId::from_index(3);
        let mut directive = Directive::new(owner, UsingDirective::new().into());
        if let Some(list) = directive.parts_mut().into_collection(ChildSlot::CommentsBefore) {
            list.push(NodeId::from_index(4));
        }
        if let Some(using) = directive.as_using_mut() {
            using.set_namespace(Some("System"));
        }
        assert_eq!(directive.comments_before().as_slice(), &[NodeId::from_index(4)]);
        assert!(directive.comments_after().is_empty());
        assert_eq!(directive.comments_before().owner(), owner);
    }
}
