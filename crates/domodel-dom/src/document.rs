//! Document - High-level document API
//!
//! [`Document`] is a cheaply clonable handle over the tree, the native event
//! registry and the placeholder anchors. Every method borrows the shared state
//! only for its own duration, so event handlers and lifecycle hooks are free to
//! call back into the document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::events::{EventRegistry, Phase};
use crate::{properties, serialize};
use crate::{DomEvent, DomResult, DomTree, EventHandler, EventTarget, ListenerOptions, NodeId};

struct DocumentState {
    tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    events: EventRegistry,
    /// Node -> placeholder marker it was inserted against
    anchors: HashMap<NodeId, NodeId>,
}

impl DocumentState {
    /// Drop anchor entries for a detached subtree, both as anchored nodes
    /// and as markers
    fn forget_anchors(&mut self, node: NodeId) {
        let mut gone = self.tree.descendants(node);
        gone.push(node);
        self.anchors
            .retain(|anchored, marker| !gone.contains(anchored) && !gone.contains(marker));
    }
}

/// HTML Document
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentState>>,
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under fresh parents cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self::from_state(tree, html, head, body)
    }

    /// Create an empty document (no structure)
    pub fn empty() -> Self {
        Self::from_state(DomTree::new(), NodeId::NONE, NodeId::NONE, NodeId::NONE)
    }

    fn from_state(tree: DomTree, html: NodeId, head: NodeId, body: NodeId) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentState {
                tree,
                html_element: html,
                head_element: head,
                body_element: body,
                events: EventRegistry::default(),
                anchors: HashMap::new(),
            })),
        }
    }

    /// Whether both handles point at the same document
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.inner.borrow().html_element
    }

    /// Get `<head>` element
    pub fn head(&self) -> NodeId {
        self.inner.borrow().head_element
    }

    /// Get `<body>` element
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body_element
    }

    /// The window, as an event target
    pub fn default_view(&self) -> EventTarget {
        EventTarget::Window
    }

    /// Read access to the underlying tree
    pub fn with_tree<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        f(&self.inner.borrow().tree)
    }

    /// Write access to the underlying tree. Do not call back into the
    /// document from `f`.
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut DomTree) -> R) -> R {
        f(&mut self.inner.borrow_mut().tree)
    }

    /// New detached element
    pub fn create_element(&self, tag_name: &str) -> NodeId {
        self.with_tree_mut(|tree| tree.create_element(tag_name))
    }

    /// New detached text node
    pub fn create_text(&self, content: &str) -> NodeId {
        self.with_tree_mut(|tree| tree.create_text(content))
    }

    /// New detached comment, usable as a placeholder marker
    pub fn create_comment(&self, content: &str) -> NodeId {
        self.with_tree_mut(|tree| tree.create_comment(content))
    }

    /// New empty fragment
    pub fn create_fragment(&self) -> NodeId {
        self.with_tree_mut(|tree| tree.create_fragment())
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.append_child(parent, child))
    }

    /// Insert `child` before `reference`, or at the end when `None`
    pub fn insert_before(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.insert_before(parent, child, reference))
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.prepend(parent, child))
    }

    /// Insert `new_node` just before `node`
    pub fn before(&self, node: NodeId, new_node: NodeId) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.before(node, new_node))
    }

    /// Insert `new_node` just after `node`
    pub fn after(&self, node: NodeId, new_node: NodeId) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.after(node, new_node))
    }

    /// Put `new_node` in place of `node`, detaching `node`
    pub fn replace_with(&self, node: NodeId, new_node: NodeId) -> DomResult<()> {
        let mut state = self.inner.borrow_mut();
        state.tree.replace_with(node, new_node)?;
        state.forget_anchors(node);
        Ok(())
    }

    /// Detach `node` from its parent
    pub fn remove(&self, node: NodeId) -> DomResult<()> {
        let mut state = self.inner.borrow_mut();
        state.tree.remove(node)?;
        state.forget_anchors(node);
        Ok(())
    }

    /// Copy `node`, with its subtree when `deep`
    pub fn clone_node(&self, node: NodeId, deep: bool) -> DomResult<NodeId> {
        self.with_tree_mut(|tree| tree.clone_node(node, deep))
    }

    /// Insert `node` after the last sibling already placed against the
    /// placeholder `marker`, so successive insertions keep call order.
    pub fn insert_at_marker(&self, marker: NodeId, node: NodeId) -> DomResult<()> {
        let mut state = self.inner.borrow_mut();
        let mut last = marker;
        while let Some(next) = state.tree.next_sibling(last) {
            if state.anchors.get(&next) != Some(&marker) {
                break;
            }
            last = next;
        }
        let inserted = if state.tree.get(node).is_some_and(|n| n.is_fragment()) {
            state.tree.child_nodes(node)
        } else {
            vec![node]
        };
        state.tree.after(last, node)?;
        for id in inserted {
            state.anchors.insert(id, marker);
        }
        Ok(())
    }

    /// Assign a property, reflecting it onto attributes or children
    pub fn set_property(&self, node: NodeId, name: &str, value: &Value) -> DomResult<()> {
        self.with_tree_mut(|tree| properties::assign(tree, node, name, value))
    }

    /// Set an attribute verbatim
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.set_attribute(node, name, value))
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.remove_attribute(node, name))
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_tree(|tree| tree.get_attribute(node, name).map(str::to_string))
    }

    pub fn set_text_content(&self, node: NodeId, text: &str) -> DomResult<()> {
        self.with_tree_mut(|tree| tree.set_text_content(node, text))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.with_tree(|tree| tree.text_content(node))
    }

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.with_tree(|tree| tree.tag_name(node).map(str::to_string))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_tree(|tree| tree.parent(node))
    }

    pub fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.with_tree(|tree| tree.child_nodes(node))
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.with_tree(|tree| tree.is_connected(node))
    }

    pub fn is_fragment(&self, node: NodeId) -> bool {
        self.with_tree(|tree| tree.get(node).is_some_and(|n| n.is_fragment()))
    }

    pub fn is_comment(&self, node: NodeId) -> bool {
        self.with_tree(|tree| tree.get(node).is_some_and(|n| n.is_comment()))
    }

    pub fn elements_by_tag_name(&self, node: NodeId, tag_name: &str) -> Vec<NodeId> {
        self.with_tree(|tree| tree.elements_by_tag_name(node, tag_name))
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.with_tree(|tree| tree.element_by_id(id))
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| serialize::inner_html(tree, node))
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| serialize::outer_html(tree, node))
    }

    /// Register a native handler. Returns false when the same handler is
    /// already registered for the same phase.
    pub fn add_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> bool {
        let target = target.into();
        tracing::trace!(?target, event_type, "add event listener");
        self.inner.borrow_mut().events.add(target, event_type, handler, options)
    }

    pub fn remove_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) -> bool {
        let target = target.into();
        tracing::trace!(?target, event_type, "remove event listener");
        self.inner.borrow_mut().events.remove(target, event_type, handler, options.capture)
    }

    /// Number of native handlers registered on a target for one event type
    pub fn event_listener_count(&self, target: impl Into<EventTarget>, event_type: &str) -> usize {
        self.inner.borrow().events.count(target.into(), event_type)
    }

    /// Dispatch an event: capture from the window down, the target, then
    /// bubble back up when the event bubbles. Returns false when a handler
    /// prevented the default action.
    pub fn dispatch_event(&self, target: impl Into<EventTarget>, mut event: DomEvent) -> bool {
        let target = target.into();
        event.target = target;
        let path = self.propagation_path(target);
        tracing::debug!(?target, event_type = %event.event_type, "dispatch event");

        for &current in path.iter().rev() {
            self.invoke(current, Phase::Capturing, &mut event);
            if event.is_propagation_stopped() {
                return !event.is_default_prevented();
            }
        }
        self.invoke(target, Phase::AtTarget, &mut event);
        if event.bubbles {
            for &current in &path {
                if event.is_propagation_stopped() {
                    break;
                }
                self.invoke(current, Phase::Bubbling, &mut event);
            }
        }
        event.current_target = None;
        !event.is_default_prevented()
    }

    /// Ancestors of the target, nearest first, ending with the window when
    /// the target is connected.
    fn propagation_path(&self, target: EventTarget) -> Vec<EventTarget> {
        let EventTarget::Node(node) = target else {
            return Vec::new();
        };
        let state = self.inner.borrow();
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = state.tree.parent(current) {
            path.push(EventTarget::Node(parent));
            current = parent;
        }
        if current == NodeId::ROOT {
            path.push(EventTarget::Window);
        }
        path
    }

    fn invoke(&self, target: EventTarget, phase: Phase, event: &mut DomEvent) {
        let handlers = self
            .inner
            .borrow_mut()
            .events
            .take_for_phase(target, &event.event_type, phase);
        event.current_target = Some(target);
        for (handler, options) in handlers {
            event.set_passive(options.passive);
            handler(event);
        }
        event.set_passive(false);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &state.tree.len())
            .field("event_listeners", &state.events.total())
            .finish()
    }
}
