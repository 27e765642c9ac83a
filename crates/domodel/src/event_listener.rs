//! EventListener - declared event handlers wired at creation
//!
//! An [`EventListener`] lists, up front, the event names it handles on its
//! [`Observable`]. When the owning binding is run, each handler is subscribed
//! with front priority and receives the binding alongside the payload.
//!
//! Ordering: wired handlers fire before every listener already registered on
//! the observable at wiring time and before anything the binding or others
//! add later with a plain `listen`. Handlers declared for the same event keep
//! their declaration order. Only a later `unshift` subscription can overtake
//! them.

use std::rc::Rc;

use crate::binding::Binding;
use crate::observable::Observable;

/// Handler bound to the binding that owns the event listener
pub type Handler<T> = Rc<dyn Fn(&Binding, &T)>;

/// Event names with their handlers, targeting one observable
pub struct EventListener<T: 'static> {
    observable: Observable<T>,
    handlers: Vec<(String, Handler<T>)>,
}

impl<T: 'static> EventListener<T> {
    pub fn new(observable: Observable<T>) -> Self {
        Self {
            observable,
            handlers: Vec::new(),
        }
    }

    /// Declare a handler for `event_name`
    pub fn on(mut self, event_name: &str, handler: impl Fn(&Binding, &T) + 'static) -> Self {
        self.handlers.push((event_name.to_string(), Rc::new(handler)));
        self
    }

    pub fn observable(&self) -> &Observable<T> {
        &self.observable
    }
}

impl<T: 'static> std::fmt::Debug for EventListener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListener")
            .field("events", &self.event_names())
            .finish()
    }
}

/// Type-erased wiring step run by the engine
pub trait EventWiring {
    /// Declared event names, in declaration order
    fn event_names(&self) -> Vec<String>;

    /// Subscribe every declared handler through `binding` so the binding
    /// releases them on removal
    fn wire(&self, binding: &Binding);
}

impl<T: 'static> EventWiring for EventListener<T> {
    fn event_names(&self) -> Vec<String> {
        self.handlers.iter().map(|(name, _)| name.clone()).collect()
    }

    fn wire(&self, binding: &Binding) {
        // Reverse so that repeated front insertion keeps declaration order
        for (event_name, handler) in self.handlers.iter().rev() {
            let owner = binding.downgrade();
            let handler = handler.clone();
            binding.listen(
                &self.observable,
                event_name,
                move |args: &T| {
                    if let Some(binding) = owner.upgrade() {
                        handler(&binding, args);
                    }
                },
                true,
            );
        }
        tracing::trace!(count = self.handlers.len(), "wired event listener");
    }
}
