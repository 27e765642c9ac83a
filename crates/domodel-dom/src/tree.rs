//! DOM Tree (arena-based allocation)
//!
//! All structural mutation happens here. [`Document`](crate::Document) wraps a
//! tree in a shared handle and forwards to these methods.

use crate::{DomError, DomResult, Node, NodeData, NodeId};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes ever allocated, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its document node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(Node::element(tag_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Create an empty document fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(Node::fragment())
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.some())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.some())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.some())
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.some())
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Snapshot of the direct children of a node
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Inclusive ancestor check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.get(current).map_or(NodeId::NONE, |n| n.parent);
        }
        false
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(self.root(), id)
    }

    /// Unlink a node from its parent. No-op when already detached.
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Link a detached node before `reference` (NONE appends).
    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let prev = if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling
        } else {
            self.nodes[parent.index()].last_child
        };
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
    }

    fn ensure_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if !self.node(parent)?.can_have_children() {
            return Err(DomError::InvalidNodeType(parent));
        }
        if matches!(self.node(child)?.data, NodeData::Document) {
            return Err(DomError::InvalidNodeType(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Insert `new_child` under `parent` before `reference`, or last when
    /// `reference` is `None`. Inserting a fragment moves its children and
    /// leaves it empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.ensure_insertable(parent, new_child)?;
        let mut reference = reference.unwrap_or(NodeId::NONE);
        if reference.is_valid() && self.node(reference)?.parent != parent {
            return Err(DomError::NotAChild { parent, child: reference });
        }
        if reference == new_child {
            reference = self.nodes[new_child.index()].next_sibling;
        }

        if self.nodes[new_child.index()].is_fragment() {
            for child in self.child_nodes(new_child) {
                self.detach(child);
                self.link_before(parent, child, reference);
            }
        } else {
            self.detach(new_child);
            self.link_before(parent, new_child, reference);
        }
        tracing::trace!(%parent, child = %new_child, "inserted node");
        Ok(())
    }

    /// Append as last child
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert as first child
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let first = self.node(parent)?.first_child.some();
        self.insert_before(parent, child, first)
    }

    /// Insert `new_node` as the previous sibling of `node`.
    /// Does nothing when `node` has no parent.
    pub fn before(&mut self, node: NodeId, new_node: NodeId) -> DomResult<()> {
        match self.node(node)?.parent.some() {
            Some(parent) => self.insert_before(parent, new_node, Some(node)),
            None => Ok(()),
        }
    }

    /// Insert `new_node` as the next sibling of `node`.
    /// Does nothing when `node` has no parent.
    pub fn after(&mut self, node: NodeId, new_node: NodeId) -> DomResult<()> {
        let current = self.node(node)?;
        let (parent, next) = (current.parent, current.next_sibling);
        match parent.some() {
            Some(parent) => self.insert_before(parent, new_node, next.some()),
            None => Ok(()),
        }
    }

    /// Put `new_node` in the place of `node`, detaching `node`.
    /// Does nothing when `node` has no parent.
    pub fn replace_with(&mut self, node: NodeId, new_node: NodeId) -> DomResult<()> {
        let Some(parent) = self.node(node)?.parent.some() else {
            return Ok(());
        };
        if node == new_node {
            return Ok(());
        }
        self.insert_before(parent, new_node, Some(node))?;
        self.detach(node);
        Ok(())
    }

    /// Detach a node from its parent
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        self.node(node)?;
        self.detach(node);
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, node: NodeId) -> DomResult<()> {
        for child in self.child_nodes(node) {
            self.detach(child);
        }
        Ok(())
    }

    /// Copy a node (and its subtree when `deep`) into new detached nodes
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        let data = self.node(node)?.data.clone();
        if matches!(data, NodeData::Document) {
            return Err(DomError::InvalidNodeType(node));
        }
        let mut copy = Node::fragment();
        copy.data = data;
        let copy = self.push(copy);
        if deep {
            for child in self.child_nodes(node) {
                let child_copy = self.clone_node(child, true)?;
                self.link_before(copy, child_copy, NodeId::NONE);
            }
        }
        Ok(copy)
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.get(node).map(|n| &n.data) {
            Some(NodeData::Text(text)) | Some(NodeData::Comment(text)) => out.push_str(text),
            Some(_) => {
                for (child, _) in self.children(node) {
                    if !matches!(self.nodes[child.index()].data, NodeData::Comment(_)) {
                        self.collect_text(child, out);
                    }
                }
            }
            None => {}
        }
    }

    /// Replace the contents of a node with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(content) | NodeData::Comment(content) => {
                *content = text.to_string();
                return Ok(());
            }
            NodeData::Document => return Err(DomError::InvalidNodeType(node)),
            NodeData::Element(_) | NodeData::Fragment => {}
        }
        self.remove_children(node)?;
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.link_before(node, text_node, NodeId::NONE);
        }
        Ok(())
    }

    /// Tag name of an element
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.as_element().map(|e| e.tag_name.as_str())
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node)?.as_element()?.get_attr(name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(node))?
            .set_attr(&name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(node))?
            .remove_attr(&name.to_ascii_lowercase());
        Ok(())
    }

    /// Pre-order list of descendants, excluding the node itself
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_nodes(node).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.child_nodes(current).into_iter().rev());
        }
        out
    }

    /// Descendant elements with the given tag name, in document order
    pub fn elements_by_tag_name(&self, node: NodeId, tag_name: &str) -> Vec<NodeId> {
        let tag_name = tag_name.to_ascii_lowercase();
        self.descendants(node)
            .into_iter()
            .filter(|&id| self.tag_name(id) == Some(tag_name.as_str()))
            .collect()
    }

    /// First connected element whose `id` attribute matches
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.get_attribute(node, "id") == Some(id))
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.some()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
