//! DOM Events
//!
//! Native event registration and the event object passed to handlers.

use std::collections::HashMap;
use std::rc::Rc;

use crate::NodeId;

/// Something that can receive native events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// A node of the document, including the document node itself
    Node(NodeId),
    /// The document's default view
    Window,
}

impl From<NodeId> for EventTarget {
    fn from(node: NodeId) -> Self {
        EventTarget::Node(node)
    }
}

/// Native event handler. Identity (pointer equality) is what removal matches on.
pub type EventHandler = Rc<dyn Fn(&mut DomEvent)>;

/// Options accepted by `add_event_listener`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Fire during the capture phase
    pub capture: bool,
    /// Remove after the first invocation
    pub once: bool,
    /// Handler promises not to call `prevent_default`
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self { capture: true, ..Self::default() }
    }

    pub fn once() -> Self {
        Self { once: true, ..Self::default() }
    }
}

/// Event dispatched through the document
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: String,
    pub target: EventTarget,
    pub current_target: Option<EventTarget>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    passive: bool,
}

impl DomEvent {
    /// Non-bubbling, non-cancelable event
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: EventTarget::Window,
            current_target: None,
            bubbles: false,
            cancelable: false,
            default_prevented: false,
            propagation_stopped: false,
            passive: false,
        }
    }

    /// Event that bubbles from its target up to the window
    pub fn bubbling(event_type: &str) -> Self {
        Self { bubbles: true, ..Self::new(event_type) }
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.passive {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub(crate) fn set_passive(&mut self, passive: bool) {
        self.passive = passive;
    }
}

struct Registration {
    handler: EventHandler,
    options: ListenerOptions,
}

/// Listeners keyed by target and event type
#[derive(Default)]
pub(crate) struct EventRegistry {
    listeners: HashMap<(EventTarget, String), Vec<Registration>>,
}

impl EventRegistry {
    /// Returns false when the same handler is already registered for the
    /// same phase.
    pub fn add(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> bool {
        let list = self.listeners.entry((target, event_type.to_string())).or_default();
        if list.iter().any(|r| Rc::ptr_eq(&r.handler, &handler) && r.options.capture == options.capture) {
            return false;
        }
        list.push(Registration { handler, options });
        true
    }

    pub fn remove(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: &EventHandler,
        capture: bool,
    ) -> bool {
        let key = (target, event_type.to_string());
        let Some(list) = self.listeners.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| !(Rc::ptr_eq(&r.handler, handler) && r.options.capture == capture));
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&key);
        }
        removed
    }

    /// Handlers to run for one phase at one target. `once` registrations are
    /// removed as they are taken.
    pub fn take_for_phase(
        &mut self,
        target: EventTarget,
        event_type: &str,
        phase: Phase,
    ) -> Vec<(EventHandler, ListenerOptions)> {
        let key = (target, event_type.to_string());
        let Some(list) = self.listeners.get_mut(&key) else {
            return Vec::new();
        };
        let selected: Vec<_> = list
            .iter()
            .filter(|r| phase.accepts(r.options.capture))
            .map(|r| (r.handler.clone(), r.options))
            .collect();
        list.retain(|r| !(r.options.once && phase.accepts(r.options.capture)));
        if list.is_empty() {
            self.listeners.remove(&key);
        }
        selected
    }

    pub fn count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners
            .get(&(target, event_type.to_string()))
            .map_or(0, Vec::len)
    }

    pub fn total(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Capturing,
    AtTarget,
    Bubbling,
}

impl Phase {
    fn accepts(self, capture: bool) -> bool {
        match self {
            Phase::Capturing => capture,
            Phase::AtTarget => true,
            Phase::Bubbling => !capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut registry = EventRegistry::default();
        let handler: EventHandler = Rc::new(|_| {});
        let target = EventTarget::Window;

        assert!(registry.add(target, "click", handler.clone(), ListenerOptions::default()));
        assert!(!registry.add(target, "click", handler.clone(), ListenerOptions::default()));
        assert!(registry.add(target, "click", handler.clone(), ListenerOptions::capture()));
        assert_eq!(registry.count(target, "click"), 2);

        assert!(registry.remove(target, "click", &handler, false));
        assert!(!registry.remove(target, "click", &handler, false));
        assert_eq!(registry.count(target, "click"), 1);
    }

    #[test]
    fn test_once_taken_out() {
        let mut registry = EventRegistry::default();
        let hits = Rc::new(Cell::new(0));
        let hits_ = hits.clone();
        let handler: EventHandler = Rc::new(move |_| hits_.set(hits_.get() + 1));
        let target = EventTarget::Node(NodeId::ROOT);
        registry.add(target, "load", handler, ListenerOptions::once());

        assert_eq!(registry.take_for_phase(target, "load", Phase::AtTarget).len(), 1);
        assert_eq!(registry.take_for_phase(target, "load", Phase::AtTarget).len(), 0);
        assert_eq!(registry.total(), 0);
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut event = DomEvent::new("submit");
        event.prevent_default();
        assert!(!event.is_default_prevented());

        let mut event = DomEvent::new("submit").with_cancelable(true);
        event.prevent_default();
        assert!(event.is_default_prevented());
    }
}
