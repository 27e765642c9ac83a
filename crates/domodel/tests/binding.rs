//! Binding ownership: children, listeners, native events and removal

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use domodel::{
    engine, Binding, BindingError, Document, DomEvent, Error, EventHandler, EventTarget, Hooks, ListenerOptions,
    Model, Observable, RunOptions, RunParams,
};

fn my_model() -> Model {
    Model::element("div").with_property("id", "test")
}

fn listening(observable: &Observable) -> Binding {
    let observable = observable.clone();
    Binding::new(Hooks::new().on_created(move |binding| {
        binding.listen(&observable, "test", |_| {}, false);
        binding.listen(&observable, "test2", |_| {}, false);
        Ok(())
    }))
}

fn counter() -> (Rc<Cell<u32>>, EventHandler) {
    let count = Rc::new(Cell::new(0));
    let count_ = count.clone();
    let handler: EventHandler = Rc::new(move |_: &mut DomEvent| count_.set(count_.get() + 1));
    (count, handler)
}

#[test]
fn test_add_event_listener() {
    let document = Document::new();
    let binding = Binding::default();
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding.clone())).unwrap();

    let (_, f) = counter();
    let (_, f2) = counter();
    binding
        .add_event_listener(document.body(), "click", f.clone(), ListenerOptions::capture())
        .unwrap();
    binding
        .add_event_listener(document.default_view(), "keydown", f2.clone(), ListenerOptions::default())
        .unwrap();

    let remote = binding.remote_event_listeners();
    assert_eq!(remote.len(), 2);
    assert_eq!(remote[0].target, EventTarget::Node(document.body()));
    assert_eq!(remote[0].event_type, "click");
    assert!(Rc::ptr_eq(&remote[0].handler, &f));
    assert!(remote[0].options.capture);
    assert_eq!(remote[1].target, EventTarget::Window);
    assert_eq!(remote[1].event_type, "keydown");
    assert!(Rc::ptr_eq(&remote[1].handler, &f2));
    assert_eq!(document.event_listener_count(document.body(), "click"), 1);
    assert_eq!(document.event_listener_count(EventTarget::Window, "keydown"), 1);
}

#[test]
fn test_add_event_listener_before_run_fails() {
    let binding = Binding::default();
    let (_, f) = counter();
    let err = binding
        .add_event_listener(EventTarget::Window, "click", f, ListenerOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Binding(BindingError::NoDocument)));
}

#[test]
fn test_run() {
    let document = Document::new();
    let child_slot: Rc<RefCell<Option<Binding>>> = Rc::default();
    let child_slot_ = child_slot.clone();
    let binding = Binding::new(Hooks::new().on_created(move |binding| {
        let child = Binding::new(Hooks::new().on_created(|binding| {
            assert!(binding.parent().is_some());
            binding.document().unwrap().set_text_content(binding.root().unwrap(), "test")?;
            Ok(())
        }));
        binding.run(&my_model(), RunParams::new().with_binding(child.clone()))?;
        *child_slot_.borrow_mut() = Some(child);
        Ok(())
    }));
    let root = engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding.clone()))
        .unwrap();

    let child = child_slot.borrow().clone().unwrap();
    assert!(binding.parent().is_none());
    assert_eq!(binding.root(), Some(root));
    assert_eq!(document.get_element_by_id("test"), Some(root));
    assert_eq!(binding.model(), Some(&my_model()));
    assert_eq!(binding.children().len(), 1);
    assert!(binding.children()[0].binding.ptr_eq(&child));
    assert!(binding.document().unwrap().ptr_eq(&document));
    assert_eq!(binding.window(), Some(EventTarget::Window));
    assert!(child.parent().unwrap().ptr_eq(&binding));
    assert!(child.children().is_empty());
    assert_eq!(document.inner_html(document.body()), r#"<div id="test"><div id="test">test</div></div>"#);
}

#[test]
fn test_run_identifier() {
    let document = Document::new();
    let binding = Binding::new(Hooks::new().on_created(|binding| {
        binding.run(&my_model(), RunParams::new().with_identifier("test"))?;
        Ok(())
    }));
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding.clone())).unwrap();

    let entry = binding.get_identifier("test").unwrap();
    let child = entry.binding().unwrap();
    assert!(child.ptr_eq(&binding.children()[0].binding));
    assert_eq!(binding.children()[0].identifier.as_deref(), Some("test"));
    assert_eq!(entry.element, document.child_nodes(binding.root().unwrap())[0]);
    assert_eq!(entry.model, my_model());
}

#[test]
fn test_listen() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let binding = listening(&observable);
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding.clone())).unwrap();

    assert_eq!(observable.listener_count("test"), 1);
    let first = binding.listen(&observable, "test", |_| {}, true);
    assert_eq!(observable.listener_count("test"), 2);
    assert_eq!(observable.listener_count("test2"), 1);
    assert_eq!(observable.listeners("test")[0], first);
    assert_eq!(binding.listeners_len(), 3);
    assert_eq!(observable.event_names(), ["test", "test2"]);
}

#[test]
fn test_remove() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let binding = listening(&observable);
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding.clone())).unwrap();
    assert_eq!(document.inner_html(document.body()), r#"<div id="test"></div>"#);

    binding.remove().unwrap();
    assert_eq!(document.inner_html(document.body()), "");
    assert_eq!(observable.listener_count("test"), 0);
    assert_eq!(observable.listener_count("test2"), 0);
    assert_eq!(binding.listeners_len(), 0);

    binding.remove().unwrap();
}

#[test]
fn test_remove_event_listeners() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let (click_a, on_document) = counter();
    let (click_b, on_window) = counter();
    let observable_ = observable.clone();
    let binding = Binding::new(Hooks::new().on_created(move |binding| {
        let document = binding.document().unwrap();
        binding.add_event_listener(document.root(), "click", on_document.clone(), ListenerOptions::default())?;
        binding.add_event_listener(binding.window().unwrap(), "click", on_window.clone(), ListenerOptions::default())?;
        binding.listen(&observable_, "test", |_| {}, false);
        binding.listen(&observable_, "test2", |_| {}, false);
        Ok(())
    }));
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding.clone())).unwrap();
    assert_eq!(document.inner_html(document.body()), r#"<div id="test"></div>"#);

    document.dispatch_event(document.root(), DomEvent::new("click"));
    assert_eq!((click_a.get(), click_b.get()), (1, 0));
    document.dispatch_event(EventTarget::Window, DomEvent::new("click"));
    assert_eq!((click_a.get(), click_b.get()), (1, 1));

    binding.remove().unwrap();
    document.dispatch_event(document.root(), DomEvent::new("click"));
    document.dispatch_event(EventTarget::Window, DomEvent::new("click"));
    assert_eq!((click_a.get(), click_b.get()), (1, 1));
    assert!(binding.remote_event_listeners().is_empty());
    assert_eq!(document.inner_html(document.body()), "");
    assert_eq!(observable.listener_count("test"), 0);
    assert_eq!(observable.listener_count("test2"), 0);
}

#[test]
fn test_remove_tree() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let observable_ = observable.clone();
    let parent = Binding::new(Hooks::new().on_created(move |binding| {
        binding.listen(&observable_, "shared", |_| {}, false);
        for _ in 0..2 {
            binding.run(&my_model(), RunParams::new().with_binding(listening(&observable_)))?;
        }
        Ok(())
    }));
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(parent.clone())).unwrap();
    assert_eq!(observable.listener_count("test"), 2);
    assert_eq!(observable.listener_count("shared"), 1);

    parent.remove().unwrap();
    assert_eq!(observable.listener_count("test"), 0);
    assert_eq!(observable.listener_count("test2"), 0);
    assert_eq!(observable.listener_count("shared"), 0);
    assert!(parent.children().is_empty());
    assert_eq!(document.inner_html(document.body()), "");
}

#[test]
fn test_remove_child_unlinks_from_parent() {
    let document = Document::new();
    let parent = Binding::default();
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(parent.clone())).unwrap();
    let first = Binding::default();
    let second = Binding::default();
    parent.run(&Model::element("a"), RunParams::new().with_binding(first.clone())).unwrap();
    parent.run(&Model::element("b"), RunParams::new().with_binding(second.clone())).unwrap();

    first.remove().unwrap();
    let children = parent.children();
    assert_eq!(children.len(), 1);
    assert!(children[0].binding.ptr_eq(&second));
    assert_eq!(document.inner_html(document.body()), r#"<div id="test"><b></b></div>"#);
}

#[test]
fn test_run_rejected_child_stays_unlinked() {
    let document = Document::new();
    let parent = Binding::default();
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(parent.clone())).unwrap();
    let other = Binding::default();
    engine::run(&document, &Model::element("aside"), RunOptions::new(document.body()).with_binding(other.clone()))
        .unwrap();

    let err = parent
        .run(&Model::element("p"), RunParams::new().with_binding(other.clone()))
        .unwrap_err();
    assert!(matches!(err, Error::Binding(BindingError::AlreadySet("root"))));
    assert!(parent.children().is_empty());
    assert!(other.parent().is_none());

    parent.remove().unwrap();
    assert_eq!(document.inner_html(document.body()), "<aside></aside>");
}

#[test]
fn test_on_connected() {
    let document = Document::new();
    let binding = Binding::new(Hooks::new().on_created(|binding| {
        let child = Binding::new(Hooks::new().on_connected(|binding| {
            let document = binding.document().unwrap();
            let root = binding.root().unwrap();
            assert!(document.is_connected(root));
            document.set_text_content(root, "connected")?;
            Ok(())
        }));
        binding.run(&Model::element("button"), RunParams::new().with_binding(child))?;
        Ok(())
    }));
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding)).unwrap();

    assert_eq!(document.inner_html(document.body()), r#"<div id="test"><button>connected</button></div>"#);
}

#[test]
fn test_on_connected_multiples() {
    let document = Document::new();
    let calls = Rc::new(Cell::new(0));
    let calls_ = calls.clone();
    let binding = Binding::new(Hooks::new().on_created(move |binding| {
        for _ in 0..2 {
            let calls = calls_.clone();
            let child = Binding::new(Hooks::new().on_connected(move |binding| {
                calls.set(calls.get() + 1);
                binding.document().unwrap().set_text_content(binding.root().unwrap(), "connected")?;
                Ok(())
            }));
            binding.run(&Model::element("button"), RunParams::new().with_binding(child))?;
        }
        Ok(())
    }));
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding)).unwrap();

    assert_eq!(calls.get(), 2);
    assert_eq!(
        document.inner_html(document.body()),
        r#"<div id="test"><button>connected</button><button>connected</button></div>"#
    );
}

#[test]
fn test_on_connected_fires_once() {
    let document = Document::new();
    let calls = Rc::new(Cell::new(0));
    let calls_ = calls.clone();
    let parent = Binding::default();
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(parent.clone())).unwrap();

    let child = Binding::new(Hooks::new().on_connected(move |_| {
        calls_.set(calls_.get() + 1);
        Ok(())
    }));
    parent.run(&Model::element("p"), RunParams::new().with_binding(child)).unwrap();
    assert_eq!(calls.get(), 1);

    parent.run(&Model::element("p"), RunParams::new()).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_hook_error_propagates() {
    let document = Document::new();
    let binding = Binding::new(Hooks::new().on_created(|_| Err(anyhow::anyhow!("setup failed").into())));
    let err = engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(binding)).unwrap_err();

    assert!(matches!(err, Error::Component(_)));
    assert_eq!(err.to_string(), "setup failed");
    assert_eq!(document.inner_html(document.body()), "");
}

#[test]
fn test_registry_observable() {
    let document = Document::new();
    let parent = Binding::default();
    engine::run(&document, &my_model(), RunOptions::new(document.body()).with_binding(parent.clone())).unwrap();
    let child = Binding::default();
    parent.run(&Model::element("p"), RunParams::new().with_binding(child.clone())).unwrap();

    let seen = Rc::new(Cell::new(0));
    let seen_ = seen.clone();
    let sizes = child.registry_observable::<(u32, u32)>("window");
    child.listen(&sizes, "resize", move |size: &(u32, u32)| seen_.set(size.0), false);

    parent.registry_observable::<(u32, u32)>("window").emit("resize", &(800, 600)).unwrap();
    assert_eq!(seen.get(), 800);
}
