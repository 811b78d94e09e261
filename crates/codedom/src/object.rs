use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comment::{Comment, Commentable};
use crate::declaration::{
    CompilationUnit, MethodDeclaration, NamespaceDeclaration, TypeDeclaration,
};
use crate::directive::{Directive, UsingDirective};

/// Stable handle addressing a node inside a [`CodeTree`](crate::CodeTree).  
/// 指向程式碼樹中節點的穩定識別碼。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u64)
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value stored in a node's metadata bag.  
/// 節點中繼資料的值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    Text(String),
    Integer(i64),
    Float(#[serde(with = "crate::serde_float")] f64),
    Boolean(bool),
    Blob(#[serde(with = "crate::serde_blob")] Vec<u8>),
}

impl DataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DataValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<Vec<u8>> for DataValue {
    fn from(value: Vec<u8>) -> Self {
        DataValue::Blob(value)
    }
}

/// Generator-specific annotations attached to a node. Keys and values are
/// caller-defined and never interpreted here; the last write wins.  
/// 產生器專用的節點附註；鍵值由呼叫端定義，後寫入者覆蓋。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeData(BTreeMap<String, DataValue>);

impl NodeData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DataValue>,
    ) -> Option<DataValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<DataValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, DataValue> {
        self.0.iter()
    }
}

/// Discriminant of a node payload.  
/// 節點類型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    CompilationUnit,
    Namespace,
    Type,
    Method,
    Directive,
    Comment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::CompilationUnit => "compilation unit",
            NodeKind::Namespace => "namespace",
            NodeKind::Type => "type",
            NodeKind::Method => "method",
            NodeKind::Directive => "directive",
            NodeKind::Comment => "comment",
        };
        f.write_str(label)
    }
}

/// Typed payload carried by a [`CodeObject`].  
/// 節點承載的具型別內容。
#[derive(Debug)]
pub enum Node {
    CompilationUnit(CompilationUnit),
    Namespace(NamespaceDeclaration),
    Type(TypeDeclaration),
    Method(MethodDeclaration),
    Directive(Directive),
    Comment(Comment),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::CompilationUnit(_) => NodeKind::CompilationUnit,
            Node::Namespace(_) => NodeKind::Namespace,
            Node::Type(_) => NodeKind::Type,
            Node::Method(_) => NodeKind::Method,
            Node::Directive(_) => NodeKind::Directive,
            Node::Comment(_) => NodeKind::Comment,
        }
    }

    pub fn as_commentable(&self) -> Option<&dyn Commentable> {
        match self {
            Node::CompilationUnit(unit) => Some(unit),
            Node::Namespace(namespace) => Some(namespace),
            Node::Type(declaration) => Some(declaration),
            Node::Method(method) => Some(method),
            Node::Directive(directive) => Some(directive),
            Node::Comment(_) => None,
        }
    }
}

/// Arena entry shared by every node of the tree. The parent link is a
/// lookup relation only and never keeps the parent alive.  
/// 所有節點共用的樹狀儲存項目；父節點連結僅供查詢，不具擁有權。
#[derive(Debug)]
pub struct CodeObject {
    id: NodeId,
    parent: Option<NodeId>,
    data: NodeData,
    node: Node,
}

impl CodeObject {
    pub(crate) fn new(id: NodeId, node: Node) -> Self {
        Self {
            id,
            parent: None,
            data: NodeData::default(),
            node,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    pub(crate) fn replace_data(&mut self, data: NodeData) {
        self.data = data;
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn as_commentable(&self) -> Option<&dyn Commentable> {
        self.node.as_commentable()
    }

    pub fn as_compilation_unit(&self) -> Option<&CompilationUnit> {
        match &self.node {
            Node::CompilationUnit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match &self.node {
            Node::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn as_using(&self) -> Option<&UsingDirective> {
        self.as_directive().and_then(Directive::as_using)
    }

    pub fn as_using_mut(&mut self) -> Option<&mut UsingDirective> {
        match &mut self.node {
            Node::Directive(directive) => directive.as_using_mut(),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&NamespaceDeclaration> {
        match &self.node {
            Node::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn as_namespace_mut(&mut self) -> Option<&mut NamespaceDeclaration> {
        match &mut self.node {
            Node::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDeclaration> {
        match &self.node {
            Node::Type(declaration) => Some(declaration),
            _ => None,
        }
    }

    pub fn as_type_mut(&mut self) -> Option<&mut TypeDeclaration> {
        match &mut self.node {
            Node::Type(declaration) => Some(declaration),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDeclaration> {
        match &self.node {
            Node::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut MethodDeclaration> {
        match &mut self.node {
            Node::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match &self.node {
            Node::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match &mut self.node {
            Node::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_last_write_wins() {
        let mut data = NodeData::new();
        assert!(data.insert("generator", "dto").is_none());
        let previous = data.insert("generator", 3_i64);
        assert_eq!(previous, Some(DataValue::Text("dto".into())));
        assert_eq!(data.get("generator").and_then(DataValue::as_integer), Some(3));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn data_iterates_in_key_order() {
        let mut data = NodeData::new();
        data.insert("zeta", true);
        data.insert("alpha", 1.5_f64);
        data.insert("mid", vec![0_u8, 1, 2]);
        let keys: Vec<&str> = data.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
        assert_eq!(data.remove("zeta"), Some(DataValue::Boolean(true)));
        assert!(!data.contains_key("zeta"));
    }

    #[test]
    fn blob_values_serialize_as_base64() {
        let mut data = NodeData::new();
        data.insert("raw", vec![0xde_u8, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["raw"]["type"], "blob");
        assert_eq!(json["raw"]["value"], "3q2+7w==");

        let restored: NodeData = serde_json::from_value(json).unwrap();
        assert_eq!(restored, data);
    }
}
