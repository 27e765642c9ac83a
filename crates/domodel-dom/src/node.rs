//! DOM Node
//!
//! Nodes link to their relatives through [`NodeId`]s rather than pointers,
//! so the whole tree lives in one `Vec` owned by [`DomTree`](crate::DomTree).

use crate::NodeId;

/// One arena slot. Relatives are ids, `NodeId::NONE` when absent.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: NodeId,
    pub first_child: NodeId,
    /// Kept so appending does not walk the sibling chain
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn element(tag_name: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag_name)))
    }

    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Detached grouping container
    pub fn fragment() -> Self {
        Self::with_data(NodeData::Fragment)
    }

    pub(crate) fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment(_))
    }

    #[inline]
    pub fn is_fragment(&self) -> bool {
        matches!(self.data, NodeData::Fragment)
    }

    /// Whether this node may hold children
    #[inline]
    pub fn can_have_children(&self) -> bool {
        matches!(self.data, NodeData::Document | NodeData::Element(_) | NodeData::Fragment)
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// Node kind and payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Slot 0 of every tree
    Document,
    Element(ElementData),
    Text(String),
    /// Also used as an insertion marker
    Comment(String),
    /// Grouping container that dissolves on insertion
    Fragment,
}

/// Tag and attributes of an element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag_name: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find_map(|attr| (attr.name == name).then_some(attr.value.as_str()))
    }

    /// Set an attribute, keeping its original position when it already exists
    pub fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attribute { name: name.to_string(), value }),
        }
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

/// Name/value pair, name already lowercased by the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}
