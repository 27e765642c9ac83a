//! Engine - turn models into nodes and place them
//!
//! [`run`] works in two phases. The build phase walks the model depth-first,
//! creating nodes, assigning properties and attributes, registering
//! identifiers and running nested components into the node being assembled.
//! The attach phase records the root on the binding, wires its event
//! listener, calls `on_created`, places the root according to [`Method`] and,
//! when the result is connected, runs the connected pass.

use domodel_dom::{Document, NodeId, attribute_value};
use serde::{Deserialize, Serialize};

use crate::binding::{Binding, RunParams};
use crate::error::{BindingError, Result};
use crate::model::{Model, ModelKind, RESERVED_KEYS};

/// How the built root is placed relative to the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    /// Last child of the target. A placeholder target receives the root
    /// right after it, behind earlier insertions.
    #[default]
    AppendChild,
    /// Previous sibling of the target
    InsertBefore,
    /// Next sibling of the target
    InsertAfter,
    /// Takes the target's place
    ReplaceNode,
    /// Takes the target's place with a deep clone of the target inside
    WrapNode,
    /// First child of the target
    Prepend,
}

/// Options for [`run`]
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Parent node, or reference node for the sibling methods
    pub target: NodeId,
    /// Binding for the subtree; a plain one when absent
    pub binding: Option<Binding>,
    pub method: Method,
}

impl RunOptions {
    /// Append to `target` with a fresh plain binding
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            binding: None,
            method: Method::AppendChild,
        }
    }

    /// Run with `binding`, which must not have been run before
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Placement relative to the target
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

/// Build `model` and place it relative to `options.target`.
///
/// Returns the root node. For a fragment model that is the fragment itself,
/// which is empty once placed; its initial children are tracked on the
/// binding.
pub fn run(document: &Document, model: &Model, options: RunOptions) -> Result<NodeId> {
    let RunOptions { target, binding, method } = options;
    let binding = binding.unwrap_or_default();
    if binding.root().is_some() {
        return Err(BindingError::AlreadySet("root").into());
    }
    tracing::debug!(kind = ?model.kind(), ?method, %target, "run model");

    binding.attach_document(document)?;
    let element = create_element(document, model, &binding, None)?;
    binding.set_root(element)?;
    binding.set_model(model.clone())?;
    if document.is_fragment(element) {
        binding.track_fragment_children(document.child_nodes(element));
    }

    binding.wire_event_listener();
    binding.created()?;

    connect_element(document, target, element, method)?;
    if binding.is_connected() {
        binding.connected_pass()?;
    }
    Ok(element)
}

/// Build one model node. `container` is the node currently being assembled,
/// `None` at the top of a run.
fn create_element(document: &Document, model: &Model, binding: &Binding, container: Option<NodeId>) -> Result<NodeId> {
    let element = match model.kind() {
        ModelKind::Element => {
            let tag_name = model.tag_name.as_deref().unwrap_or_default();
            let element = document.create_element(tag_name);
            for (name, value) in &model.properties {
                if RESERVED_KEYS.contains(&name.as_str()) {
                    continue;
                }
                document.set_property(element, name, value)?;
            }
            for (name, value) in &model.attributes {
                if let Some(value) = attribute_value(value) {
                    document.set_attribute(element, name, &value)?;
                }
            }
            append_children(document, model, binding, element)?;
            element
        }
        ModelKind::Fragment => {
            let fragment = document.create_fragment();
            append_children(document, model, binding, fragment)?;
            fragment
        }
        ModelKind::Placeholder => document.create_comment(""),
        ModelKind::Component => {
            let Some(component) = model.component.as_ref() else {
                return Ok(document.create_comment(""));
            };
            // Nested runs place themselves, so a top-level component gets a
            // detached container to land in.
            let scratch = match container {
                Some(_) => None,
                None => Some(document.create_fragment()),
            };
            let target = container.or(scratch).unwrap_or(NodeId::NONE);
            let mut params = RunParams::new()
                .with_binding(component.instantiate())
                .with_target(target);
            if let Some(identifier) = &model.identifier {
                params = params.with_identifier(identifier);
            }
            let nested = binding.run(&component.model, params)?;
            return Ok(scratch.unwrap_or(nested));
        }
    };

    if let Some(identifier) = &model.identifier {
        binding.register_identifier(identifier, element, model.clone(), binding);
    }
    Ok(element)
}

fn append_children(document: &Document, model: &Model, binding: &Binding, element: NodeId) -> Result<()> {
    for child in &model.children {
        let node = create_element(document, child, binding, Some(element))?;
        if child.kind() != ModelKind::Component {
            document.append_child(element, node)?;
        }
    }
    Ok(())
}

fn connect_element(document: &Document, target: NodeId, element: NodeId, method: Method) -> Result<()> {
    tracing::trace!(%target, %element, ?method, "connect element");
    match method {
        Method::AppendChild if document.is_comment(target) => document.insert_at_marker(target, element)?,
        Method::AppendChild => document.append_child(target, element)?,
        Method::InsertBefore => document.before(target, element)?,
        Method::InsertAfter => document.after(target, element)?,
        Method::ReplaceNode => document.replace_with(target, element)?,
        Method::WrapNode => {
            let copy = document.clone_node(target, true)?;
            document.append_child(element, copy)?;
            document.replace_with(target, element)?;
        }
        Method::Prepend => document.prepend(target, element)?,
    }
    Ok(())
}
