//! Observable - named-event publish/subscribe
//!
//! Emits are synchronous and run callbacks in registration order. Dispatch
//! iterates over a snapshot, so callbacks may add or remove listeners for the
//! event being emitted without affecting the current round.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::listener::Listener;

/// Subscriber callback
pub type Callback<T> = Rc<dyn Fn(&T)>;

/// Observable errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservableError {
    /// Emitting an event nobody listens to usually means a typo or a
    /// subscription that happens too late.
    #[error("Cannot emit the event '{0}' as there is no listener for this event.")]
    NoListener(String),
}

pub(crate) struct ObservableInner<T: 'static> {
    listeners: RefCell<HashMap<String, Vec<Listener<T>>>>,
    next_id: Cell<u64>,
}

/// Multi-event publish/subscribe registry carrying payloads of type `T`
pub struct Observable<T: 'static = ()> {
    inner: Rc<ObservableInner<T>>,
}

impl<T: 'static> Observable<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                listeners: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ObservableInner<T>>) -> Self {
        Self { inner }
    }

    /// Whether both handles share one registry
    pub fn ptr_eq(&self, other: &Observable<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Subscribe at the end of the event's list
    pub fn listen(&self, event_name: &str, callback: impl Fn(&T) + 'static) -> Listener<T> {
        self.subscribe(event_name, Rc::new(callback), false)
    }

    /// Subscribe at the front of the event's list
    pub fn listen_unshift(&self, event_name: &str, callback: impl Fn(&T) + 'static) -> Listener<T> {
        self.subscribe(event_name, Rc::new(callback), true)
    }

    /// Subscribe an already shared callback. `unshift` inserts it ahead of
    /// every listener currently registered for the event.
    pub fn subscribe(&self, event_name: &str, callback: Callback<T>, unshift: bool) -> Listener<T> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let listener = Listener {
            id,
            observable: Rc::downgrade(&self.inner),
            event_name: Rc::from(event_name),
            callback,
        };
        let mut listeners = self.inner.listeners.borrow_mut();
        let list = listeners.entry(event_name.to_string()).or_default();
        if unshift {
            list.insert(0, listener.clone());
        } else {
            list.push(listener.clone());
        }
        tracing::trace!(event_name, unshift, count = list.len(), "listen");
        listener
    }

    /// Filter the listener out of its event's list. Idempotent.
    pub fn remove_listener(&self, listener: &Listener<T>) {
        if let Some(list) = self.inner.listeners.borrow_mut().get_mut(listener.event_name()) {
            list.retain(|l| l != listener);
        }
    }

    /// Invoke every callback registered for `event_name`, in order.
    pub fn emit(&self, event_name: &str, args: &T) -> Result<(), ObservableError> {
        let snapshot: Vec<Callback<T>> = self
            .inner
            .listeners
            .borrow()
            .get(event_name)
            .map(|list| list.iter().map(|l| l.callback.clone()).collect())
            .unwrap_or_default();
        if snapshot.is_empty() {
            tracing::warn!(event_name, "emit without listener");
            return Err(ObservableError::NoListener(event_name.to_string()));
        }
        for callback in snapshot {
            callback(args);
        }
        Ok(())
    }

    /// Number of listeners currently registered for an event
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.inner.listeners.borrow().get(event_name).map_or(0, Vec::len)
    }

    /// Snapshot of the listeners registered for an event, in firing order
    pub fn listeners(&self, event_name: &str) -> Vec<Listener<T>> {
        self.inner.listeners.borrow().get(event_name).cloned().unwrap_or_default()
    }

    /// Every event name that has been listened to, including ones whose
    /// list has since become empty
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.listeners.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn contains(&self, listener: &Listener<T>) -> bool {
        self.inner
            .listeners
            .borrow()
            .get(listener.event_name())
            .is_some_and(|list| list.contains(listener))
    }
}

impl<T: 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.inner.listeners.borrow();
        let mut map = f.debug_map();
        for (name, list) in listeners.iter() {
            map.entry(name, &list.len());
        }
        map.finish()
    }
}

/// Anything a binding can subscribe to. Foreign event sources take part by
/// implementing this, usually by forwarding to an inner [`Observable`].
pub trait Listenable<T: 'static> {
    fn subscribe(&self, event_name: &str, callback: Callback<T>, unshift: bool) -> Listener<T>;
}

impl<T: 'static> Listenable<T> for Observable<T> {
    fn subscribe(&self, event_name: &str, callback: Callback<T>, unshift: bool) -> Listener<T> {
        Observable::subscribe(self, event_name, callback, unshift)
    }
}
