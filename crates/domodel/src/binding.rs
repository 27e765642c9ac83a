//! Binding - lifecycle and ownership of one built subtree
//!
//! A [`Binding`] is a shared handle. The engine assigns its root, model and
//! document exactly once; afterwards the binding accumulates child bindings,
//! observable listeners and native event registrations, all of which
//! [`Binding::remove`] releases.
//!
//! Behaviour is supplied by composition: a [`Component`] holds the state and
//! the lifecycle hooks, the binding holds the bookkeeping.

use std::any::{Any, TypeId};
use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use domodel_dom::{Document, EventHandler, EventTarget, ListenerOptions, NodeId};
use serde_json::{Map, Value};

use crate::engine::{self, Method, RunOptions};
use crate::error::{BindingError, Result};
use crate::event_listener::EventWiring;
use crate::listener::{Listener, Subscription};
use crate::model::Model;
use crate::observable::{Listenable, Observable};

/// Properties inherited down the binding tree
pub type Properties = Map<String, Value>;

/// Lifecycle hooks of a component. Both default to doing nothing.
pub trait Component: 'static {
    /// Called once, after the root is built and before it is placed.
    fn on_created(&mut self, binding: &Binding) -> Result<()> {
        let _ = binding;
        Ok(())
    }

    /// Called once, when the root is found connected to the document.
    fn on_connected(&mut self, binding: &Binding) -> Result<()> {
        let _ = binding;
        Ok(())
    }
}

/// Component with no behaviour
#[derive(Debug, Default, Clone, Copy)]
pub struct Plain;

impl Component for Plain {}

type Hook = Box<dyn FnMut(&Binding) -> Result<()>>;

/// Component assembled from closures
#[derive(Default)]
pub struct Hooks {
    created: Option<Hook>,
    connected: Option<Hook>,
}

impl Hooks {
    /// No hooks set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `on_created` hook
    pub fn on_created(mut self, hook: impl FnMut(&Binding) -> Result<()> + 'static) -> Self {
        self.created = Some(Box::new(hook));
        self
    }

    /// Set the `on_connected` hook
    pub fn on_connected(mut self, hook: impl FnMut(&Binding) -> Result<()> + 'static) -> Self {
        self.connected = Some(Box::new(hook));
        self
    }
}

impl Component for Hooks {
    fn on_created(&mut self, binding: &Binding) -> Result<()> {
        match self.created.as_mut() {
            Some(hook) => hook(binding),
            None => Ok(()),
        }
    }

    fn on_connected(&mut self, binding: &Binding) -> Result<()> {
        match self.connected.as_mut() {
            Some(hook) => hook(binding),
            None => Ok(()),
        }
    }
}

/// Node or component registered under an identifier
#[derive(Debug, Clone)]
pub struct Identified {
    /// Built node (for components, the nested binding's root)
    pub element: NodeId,
    pub model: Model,
    binding: WeakBinding,
}

impl Identified {
    /// Binding that owns the node: the enclosing binding for plain
    /// elements, the nested binding for components
    pub fn binding(&self) -> Option<Binding> {
        self.binding.upgrade()
    }
}

/// Entry in a binding's children list
#[derive(Debug, Clone)]
pub struct ChildBinding {
    pub binding: Binding,
    pub identifier: Option<String>,
}

/// Native event registration owned by a binding
#[derive(Clone)]
pub struct RemoteEventListener {
    pub target: EventTarget,
    pub event_type: String,
    pub handler: EventHandler,
    pub options: ListenerOptions,
}

impl std::fmt::Debug for RemoteEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEventListener")
            .field("target", &self.target)
            .field("event_type", &self.event_type)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Parameters for [`Binding::run`]
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    /// Child binding; a plain one is created when absent
    pub binding: Option<Binding>,
    /// Register the result under this identifier
    pub identifier: Option<String>,
    /// Target node; defaults to this binding's root
    pub target: Option<NodeId>,
    pub method: Method,
}

impl RunParams {
    /// Plain child binding, appended to this binding's root
    pub fn new() -> Self {
        Self::default()
    }

    /// Run with `binding` instead of a plain one
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Register the built node under `identifier`
    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    /// Place relative to `target` instead of the root
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Placement relative to the target
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}

struct BindingInner {
    component: RefCell<Box<dyn Component>>,
    parent: OnceCell<WeakBinding>,
    document: OnceCell<Document>,
    root: OnceCell<NodeId>,
    model: OnceCell<Model>,
    event_listener: OnceCell<Rc<dyn EventWiring>>,
    /// Children of a fragment root, recorded before insertion dissolves it
    fragment_children: RefCell<Vec<NodeId>>,
    children: RefCell<Vec<ChildBinding>>,
    listeners: RefCell<Vec<Box<dyn Subscription>>>,
    remote_event_listeners: RefCell<Vec<RemoteEventListener>>,
    identifier: RefCell<HashMap<String, Identified>>,
    properties: RefCell<Properties>,
    registry: RefCell<HashMap<(String, TypeId), Box<dyn Any>>>,
    connected: Cell<bool>,
}

/// Lifecycle and ownership object for one built subtree
#[derive(Clone)]
pub struct Binding(Rc<BindingInner>);

/// Non-owning reference to a [`Binding`]
#[derive(Clone, Default)]
pub struct WeakBinding(Weak<BindingInner>);

impl WeakBinding {
    /// The binding, if it is still alive
    pub fn upgrade(&self) -> Option<Binding> {
        self.0.upgrade().map(Binding)
    }
}

impl std::fmt::Debug for WeakBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0.strong_count() > 0 { "WeakBinding(live)" } else { "WeakBinding(dropped)" })
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self::new(Plain)
    }
}

impl Binding {
    /// Binding driven by `component`
    pub fn new(component: impl Component) -> Self {
        BindingBuilder::new(component).build()
    }

    /// Start configuring a binding with an event listener or properties
    pub fn builder(component: impl Component) -> BindingBuilder {
        BindingBuilder::new(component)
    }

    /// Non-owning handle to this binding
    pub fn downgrade(&self) -> WeakBinding {
        WeakBinding(Rc::downgrade(&self.0))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Binding) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Owning binding, `None` for a root binding
    pub fn parent(&self) -> Option<Binding> {
        self.0.parent.get().and_then(WeakBinding::upgrade)
    }

    /// Node built for this binding
    pub fn root(&self) -> Option<NodeId> {
        self.0.root.get().copied()
    }

    /// Model used to build the root
    pub fn model(&self) -> Option<&Model> {
        self.0.model.get()
    }

    /// Document the binding was run in
    pub fn document(&self) -> Option<Document> {
        self.0.document.get().cloned()
    }

    /// The document's default view
    pub fn window(&self) -> Option<EventTarget> {
        self.0.document.get().map(Document::default_view)
    }

    pub fn event_listener(&self) -> Option<Rc<dyn EventWiring>> {
        self.0.event_listener.get().cloned()
    }

    /// Attach an event listener after construction. Write-once.
    pub fn set_event_listener(&self, event_listener: Rc<dyn EventWiring>) -> Result<()> {
        self.0
            .event_listener
            .set(event_listener)
            .map_err(|_| BindingError::AlreadySet("event_listener").into())
    }

    pub fn children(&self) -> Vec<ChildBinding> {
        self.0.children.borrow().clone()
    }

    /// Number of observable listeners this binding registered and still owns
    pub fn listeners_len(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    pub fn remote_event_listeners(&self) -> Vec<RemoteEventListener> {
        self.0.remote_event_listeners.borrow().clone()
    }

    /// Component or element registered under `key`
    pub fn get_identifier(&self, key: &str) -> Option<Identified> {
        self.0.identifier.borrow().get(key).cloned()
    }

    /// Node registered under `key`
    pub fn element(&self, key: &str) -> Option<NodeId> {
        self.0.identifier.borrow().get(key).map(|entry| entry.element)
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.identifier.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn properties(&self) -> Properties {
        self.0.properties.borrow().clone()
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.0.properties.borrow().get(key).cloned()
    }

    /// Merge `properties` over the current ones
    pub fn extend_properties(&self, properties: &Properties) {
        let mut current = self.0.properties.borrow_mut();
        for (key, value) in properties {
            current.insert(key.clone(), value.clone());
        }
    }

    /// Whether the root (or, for a fragment root, any of its initial
    /// children) is connected to the document
    pub fn is_connected(&self) -> bool {
        let (Some(document), Some(root)) = (self.0.document.get(), self.root()) else {
            return false;
        };
        let fragment_children = self.0.fragment_children.borrow();
        if fragment_children.is_empty() {
            document.is_connected(root)
        } else {
            fragment_children.iter().any(|&node| document.is_connected(node))
        }
    }

    /// Subscribe to `source` and keep the listener for removal.
    /// `unshift` places the callback ahead of existing listeners.
    pub fn listen<T: 'static, S: Listenable<T> + ?Sized>(
        &self,
        source: &S,
        event_name: &str,
        callback: impl Fn(&T) + 'static,
        unshift: bool,
    ) -> Listener<T> {
        let listener = source.subscribe(event_name, Rc::new(callback), unshift);
        self.0.listeners.borrow_mut().push(Box::new(listener.clone()));
        listener
    }

    /// Observable shared by the whole binding tree under `key`, allocated on
    /// first use by the root binding. Lets bindings exchange events about a
    /// foreign object without owning an observable for it.
    pub fn registry_observable<T: 'static>(&self, key: &str) -> Observable<T> {
        let owner = self.tree_root();
        let mut registry = owner.0.registry.borrow_mut();
        let entry = registry
            .entry((key.to_string(), TypeId::of::<T>()))
            .or_insert_with(|| Box::new(Observable::<T>::new()) as Box<dyn Any>);
        match entry.downcast_ref::<Observable<T>>() {
            Some(observable) => observable.clone(),
            None => Observable::new(),
        }
    }

    fn tree_root(&self) -> Binding {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Register a native event handler on any target, typically the document
    /// or the window, and keep it for removal.
    pub fn add_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> Result<()> {
        let document = self.0.document.get().ok_or(BindingError::NoDocument)?;
        let target = target.into();
        document.add_event_listener(target, event_type, handler.clone(), options);
        self.0.remote_event_listeners.borrow_mut().push(RemoteEventListener {
            target,
            event_type: event_type.to_string(),
            handler,
            options,
        });
        Ok(())
    }

    /// Run `model` as a child of this binding, under its root unless a
    /// target is given. The child is linked before its build starts.
    /// A rejected call leaves both bindings untouched.
    pub fn run(&self, model: &Model, params: RunParams) -> Result<NodeId> {
        let RunParams { binding, identifier, target, method } = params;
        let child = binding.unwrap_or_default();
        let document = self.document().ok_or(BindingError::NoDocument)?;
        let target = target.or_else(|| self.root()).ok_or(BindingError::NotRendered)?;
        if child.root().is_some() {
            return Err(BindingError::AlreadySet("root").into());
        }
        if child.0.parent.get().is_some() {
            return Err(BindingError::AlreadySet("parent").into());
        }

        let _ = child.0.parent.set(self.downgrade());
        let inherited = {
            let mut merged = self.properties();
            for (key, value) in child.properties() {
                merged.insert(key, value);
            }
            merged
        };
        *child.0.properties.borrow_mut() = inherited;
        self.0.children.borrow_mut().push(ChildBinding {
            binding: child.clone(),
            identifier: identifier.clone(),
        });

        let element = engine::run(
            &document,
            model,
            RunOptions::new(target).with_binding(child.clone()).with_method(method),
        )?;

        if let Some(identifier) = identifier {
            self.register_identifier(&identifier, element, model.clone(), &child);
        }
        Ok(element)
    }

    /// Tear down this binding and everything below it: native handlers,
    /// observable listeners, child bindings, the link from the parent and
    /// finally the nodes. Calling it again is harmless.
    pub fn remove(&self) -> Result<()> {
        tracing::debug!(root = ?self.root(), "removing binding");
        let document = self.document();

        let remote: Vec<RemoteEventListener> = self.0.remote_event_listeners.borrow_mut().drain(..).collect();
        if let Some(document) = &document {
            for entry in &remote {
                document.remove_event_listener(entry.target, &entry.event_type, &entry.handler, entry.options);
            }
        }

        let listeners: Vec<Box<dyn Subscription>> = self.0.listeners.borrow_mut().drain(..).collect();
        for listener in &listeners {
            listener.remove();
        }

        let children: Vec<Binding> = self.0.children.borrow().iter().map(|c| c.binding.clone()).collect();
        for child in children {
            child.remove()?;
        }

        if let Some(parent) = self.parent() {
            parent.0.children.borrow_mut().retain(|c| !c.binding.ptr_eq(self));
        }

        if let (Some(document), Some(root)) = (&document, self.root()) {
            let fragment_children = std::mem::take(&mut *self.0.fragment_children.borrow_mut());
            if fragment_children.is_empty() {
                document.remove(root)?;
            } else {
                for node in fragment_children {
                    document.remove(node)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn attach_document(&self, document: &Document) -> Result<()> {
        match self.0.document.get() {
            Some(current) if current.ptr_eq(document) => Ok(()),
            Some(_) => Err(BindingError::AlreadySet("document").into()),
            None => {
                let _ = self.0.document.set(document.clone());
                Ok(())
            }
        }
    }

    pub(crate) fn set_root(&self, root: NodeId) -> Result<()> {
        self.0.root.set(root).map_err(|_| BindingError::AlreadySet("root").into())
    }

    pub(crate) fn set_model(&self, model: Model) -> Result<()> {
        self.0.model.set(model).map_err(|_| BindingError::AlreadySet("model").into())
    }

    pub(crate) fn track_fragment_children(&self, nodes: Vec<NodeId>) {
        *self.0.fragment_children.borrow_mut() = nodes;
    }

    pub(crate) fn register_identifier(&self, key: &str, element: NodeId, model: Model, owner: &Binding) {
        self.0.identifier.borrow_mut().insert(
            key.to_string(),
            Identified {
                element,
                model,
                binding: owner.downgrade(),
            },
        );
    }

    pub(crate) fn wire_event_listener(&self) {
        if let Some(event_listener) = self.event_listener() {
            event_listener.wire(self);
        }
    }

    fn call_hook(&self, hook: impl FnOnce(&mut dyn Component, &Binding) -> Result<()>) -> Result<()> {
        let mut component = self.0.component.borrow_mut();
        hook(&mut **component, self)
    }

    pub(crate) fn created(&self) -> Result<()> {
        self.call_hook(|component, binding| component.on_created(binding))
    }

    /// Fire `on_connected` once for this binding, then visit the children
    /// that are connected at this moment.
    pub(crate) fn connected_pass(&self) -> Result<()> {
        if !self.0.connected.replace(true) {
            self.call_hook(|component, binding| component.on_connected(binding))?;
        }
        let children: Vec<Binding> = self.0.children.borrow().iter().map(|c| c.binding.clone()).collect();
        for child in children {
            if child.is_connected() {
                child.connected_pass()?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("root", &self.root())
            .field("children", &self.0.children.borrow().len())
            .field("listeners", &self.0.listeners.borrow().len())
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

/// Builder for a [`Binding`] with an event listener or initial properties
pub struct BindingBuilder {
    component: Box<dyn Component>,
    event_listener: Option<Rc<dyn EventWiring>>,
    properties: Properties,
}

impl BindingBuilder {
    pub fn new(component: impl Component) -> Self {
        Self {
            component: Box::new(component),
            event_listener: None,
            properties: Properties::new(),
        }
    }

    /// Event handlers wired when the binding runs
    pub fn event_listener(mut self, event_listener: impl EventWiring + 'static) -> Self {
        self.event_listener = Some(Rc::new(event_listener));
        self
    }

    /// Initial properties, merged over the parent's on `run`
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Set one initial property
    pub fn property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Binding {
        let event_listener = OnceCell::new();
        if let Some(wiring) = self.event_listener {
            let _ = event_listener.set(wiring);
        }
        Binding(Rc::new(BindingInner {
            component: RefCell::new(self.component),
            parent: OnceCell::new(),
            document: OnceCell::new(),
            root: OnceCell::new(),
            model: OnceCell::new(),
            event_listener,
            fragment_children: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            remote_event_listeners: RefCell::new(Vec::new()),
            identifier: RefCell::new(HashMap::new()),
            properties: RefCell::new(self.properties),
            registry: RefCell::new(HashMap::new()),
            connected: Cell::new(false),
        }))
    }
}
