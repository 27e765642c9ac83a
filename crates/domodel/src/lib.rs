//! domodel
//!
//! Declarative DOM construction with component bindings.
//!
//! A [`Model`] describes a subtree, [`engine::run`] builds it into a
//! [`Document`] and places it, and a [`Binding`] owns what was built: child
//! bindings, observable listeners and native event handlers, all released by
//! [`Binding::remove`].
//!
//! # Example
//! ```rust,ignore
//! use domodel::{engine, Binding, Document, Hooks, Model, RunOptions};
//!
//! let document = Document::new();
//! let binding = Binding::new(Hooks::new().on_connected(|binding| {
//!     tracing::info!(root = ?binding.root(), "connected");
//!     Ok(())
//! }));
//! let model = Model::element("ul").with_child(Model::element("li").with_text("First"));
//! engine::run(&document, &model, RunOptions::new(document.body()).with_binding(binding))?;
//! ```

mod error;
pub mod engine;
mod binding;
mod observable;
mod listener;
mod event_listener;
mod model;
pub mod model_chain;

pub use error::{Error, Result, BindingError};
pub use engine::{run, Method, RunOptions};
pub use binding::{
    Binding, BindingBuilder, WeakBinding, Component, Plain, Hooks, Properties, Identified, ChildBinding,
    RemoteEventListener, RunParams,
};
pub use observable::{Observable, ObservableError, Callback, Listenable};
pub use listener::{Listener, Subscription};
pub use event_listener::{EventListener, EventWiring, Handler};
pub use model::{Model, ModelKind, ComponentRef, BindingFactory, RESERVED_KEYS};
pub use model_chain::{ModelChain, ModelChainError};

// Re-export the host document for callers
pub use domodel_dom as dom;
pub use domodel_dom::{Document, DomEvent, EventTarget, EventHandler, ListenerOptions, NodeId};
