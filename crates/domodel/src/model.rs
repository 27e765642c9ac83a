//! Model - declarative description of a subtree
//!
//! A [`Model`] mirrors the plain object shape callers write by hand:
//!
//! ```json
//! { "tagName": "div", "identifier": "box", "className": "box",
//!   "attributes": { "role": "group" }, "children": [ ... ] }
//! ```
//!
//! Keys other than the structural ones are native properties assigned to the
//! created element. A model without a tag name but with children is a
//! fragment; one with neither is a placeholder. A model carrying a
//! [`ComponentRef`] is built by its own binding.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::binding::{Binding, Properties};

/// Keys consumed by the engine, never assigned as element properties
pub const RESERVED_KEYS: &[&str] = &[
    "tagName",
    "children",
    "identifier",
    "attributes",
    "childModel",
    "model",
    "binding",
    "arguments",
];

/// Builds the binding for a component reference from its arguments
pub type BindingFactory = Rc<dyn Fn(&[Value]) -> Binding>;

/// What a model node turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Native element for the tag name
    Element,
    /// Grouping container for several top-level siblings
    Fragment,
    /// Nested model run by its own binding
    Component,
    /// Empty marker that later runs can target
    Placeholder,
}

/// Model node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Assigned with `setAttribute`
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Model>,

    #[serde(skip)]
    pub component: Option<ComponentRef>,

    /// Native properties, assigned in declaration order
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Model {
    /// Element node for a tag name
    pub fn element(tag_name: &str) -> Self {
        Self {
            tag_name: Some(tag_name.to_string()),
            ..Self::default()
        }
    }

    /// Fragment node grouping several siblings
    pub fn fragment(children: impl IntoIterator<Item = Model>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Empty marker node
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Component reference node
    pub fn component(component: ComponentRef) -> Self {
        Self {
            component: Some(component),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ModelKind {
        if self.component.is_some() {
            ModelKind::Component
        } else if self.tag_name.is_some() {
            ModelKind::Element
        } else if !self.children.is_empty() {
            ModelKind::Fragment
        } else {
            ModelKind::Placeholder
        }
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Shorthand for the `textContent` property
    pub fn with_text(self, text: &str) -> Self {
        self.with_property("textContent", text)
    }

    /// Shorthand for the `className` property
    pub fn with_class(self, class_name: &str) -> Self {
        self.with_property("className", class_name)
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: Model) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Model>) -> Self {
        self.children.extend(children);
        self
    }

    /// Parse the plain JSON shape
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Reference to a nested component: its model, how to build its binding,
/// the arguments handed to that factory and property overrides.
#[derive(Clone)]
pub struct ComponentRef {
    pub model: Box<Model>,
    factory: BindingFactory,
    pub arguments: Vec<Value>,
    pub properties: Properties,
}

impl ComponentRef {
    pub fn new(model: Model, factory: impl Fn(&[Value]) -> Binding + 'static) -> Self {
        Self {
            model: Box::new(model),
            factory: Rc::new(factory),
            arguments: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Component backed by a default binding with no behaviour
    pub fn plain(model: Model) -> Self {
        Self::new(model, |_| Binding::default())
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Value>) -> Self {
        self.arguments = arguments.into_iter().collect();
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Build a fresh binding, applying the property overrides
    pub fn instantiate(&self) -> Binding {
        let binding = (self.factory)(&self.arguments);
        binding.extend_properties(&self.properties);
        binding
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.factory, &other.factory)
            && self.model == other.model
            && self.arguments == other.arguments
            && self.properties == other.properties
    }
}

impl std::fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRef")
            .field("model", &self.model)
            .field("arguments", &self.arguments)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
