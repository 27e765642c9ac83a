//! Listener - removable subscription handle

use std::rc::{Rc, Weak};

use crate::observable::{Callback, Observable, ObservableInner};

/// Handle returned by [`Observable::listen`]. Cloning keeps the same identity.
pub struct Listener<T: 'static> {
    pub(crate) id: u64,
    pub(crate) observable: Weak<ObservableInner<T>>,
    pub(crate) event_name: Rc<str>,
    pub(crate) callback: Callback<T>,
}

impl<T: 'static> Listener<T> {
    /// Event this listener is subscribed to
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn callback(&self) -> &Callback<T> {
        &self.callback
    }

    /// Source observable, if it is still alive
    pub fn observable(&self) -> Option<Observable<T>> {
        self.observable.upgrade().map(Observable::from_inner)
    }

    /// Whether the listener is still registered on its source
    pub fn is_registered(&self) -> bool {
        self.observable().is_some_and(|o| o.contains(self))
    }

    /// Remove a listener. Safe to call more than once.
    pub fn remove(&self) {
        if let Some(observable) = self.observable() {
            observable.remove_listener(self);
        }
    }
}

impl<T: 'static> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            observable: self.observable.clone(),
            event_name: self.event_name.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<T: 'static> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.observable, &other.observable)
    }
}

impl<T: 'static> Eq for Listener<T> {}

impl<T: 'static> std::fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("event_name", &self.event_name)
            .finish()
    }
}

/// Type-erased subscription, so a binding can release listeners of any
/// payload type in one pass.
pub trait Subscription {
    fn event_name(&self) -> &str;

    fn remove(&self);
}

impl<T: 'static> Subscription for Listener<T> {
    fn event_name(&self) -> &str {
        Listener::event_name(self)
    }

    fn remove(&self) {
        Listener::remove(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_twice() {
        let observable: Observable<()> = Observable::new();
        let listener = observable.listen("test", |_| {});
        let other = observable.listen("test", |_| {});

        listener.remove();
        listener.remove();
        assert!(!listener.is_registered());
        assert!(other.is_registered());
        assert_eq!(observable.listener_count("test"), 1);
    }

    #[test]
    fn test_outlives_observable() {
        let observable: Observable<u8> = Observable::new();
        let listener = observable.listen("test", |_| {});
        drop(observable);

        assert!(listener.observable().is_none());
        listener.remove();
    }

    #[test]
    fn test_erased_removal() {
        let observable: Observable<String> = Observable::new();
        let subscription: Box<dyn Subscription> = Box::new(observable.listen("name", |_| {}));
        assert_eq!(subscription.event_name(), "name");

        subscription.remove();
        assert_eq!(observable.listener_count("name"), 0);
    }
}
