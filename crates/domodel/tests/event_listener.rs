//! Auto-wired event handlers and their firing order

use std::cell::RefCell;
use std::rc::Rc;

use domodel::{engine, Binding, Document, EventListener, EventWiring, Hooks, Model, Observable, Plain, RunOptions};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn push(log: &Log, entry: &'static str) -> impl Fn(&()) + use<> {
    let log = log.clone();
    move |_: &()| log.borrow_mut().push(entry)
}

#[test]
fn test_instance() {
    let observable: Observable = Observable::new();
    let event_listener = EventListener::new(observable.clone()).on("a", |_, _| {}).on("b", |_, _| {});

    assert!(event_listener.observable().ptr_eq(&observable));
    assert_eq!(event_listener.event_names(), ["a", "b"]);
}

#[test]
fn test_handlers_receive_binding() {
    let document = Document::new();
    let observable: Observable<u32> = Observable::new();
    let seen: Rc<RefCell<Vec<(bool, u32)>>> = Rc::default();
    let seen_ = seen.clone();
    let binding = Binding::builder(Plain)
        .event_listener(EventListener::new(observable.clone()).on("count", move |binding, value| {
            seen_.borrow_mut().push((binding.root().is_some(), *value));
        }))
        .build();
    engine::run(&document, &Model::element("div"), RunOptions::new(document.body()).with_binding(binding.clone()))
        .unwrap();

    observable.emit("count", &7).unwrap();
    assert_eq!(*seen.borrow(), [(true, 7)]);

    binding.remove().unwrap();
    assert_eq!(observable.listener_count("count"), 0);
    assert!(observable.emit("count", &8).is_err());
}

#[test]
fn test_wired_handlers_fire_first() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let log: Log = Rc::default();
    observable.listen("save", push(&log, "existing"));

    let (first, second) = (log.clone(), log.clone());
    let observable_ = observable.clone();
    let log_ = log.clone();
    let binding = Binding::builder(Hooks::new().on_created(move |binding| {
        binding.listen(&observable_, "save", push(&log_, "created"), false);
        Ok(())
    }))
    .event_listener(
        EventListener::new(observable.clone())
            .on("save", move |_, _| first.borrow_mut().push("wired 1"))
            .on("save", move |_, _| second.borrow_mut().push("wired 2")),
    )
    .build();
    engine::run(&document, &Model::element("form"), RunOptions::new(document.body()).with_binding(binding.clone()))
        .unwrap();
    binding.listen(&observable, "save", push(&log, "later"), false);

    observable.emit("save", &()).unwrap();
    assert_eq!(*log.borrow(), ["wired 1", "wired 2", "existing", "created", "later"]);
    assert_eq!(binding.listeners_len(), 4);
}

#[test]
fn test_unshift_overtakes_wired_handlers() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let log: Log = Rc::default();
    let wired = log.clone();
    let binding = Binding::builder(Plain)
        .event_listener(EventListener::new(observable.clone()).on("save", move |_, _| wired.borrow_mut().push("wired")))
        .build();
    engine::run(&document, &Model::element("form"), RunOptions::new(document.body()).with_binding(binding.clone()))
        .unwrap();
    binding.listen(&observable, "save", push(&log, "unshifted"), true);

    observable.emit("save", &()).unwrap();
    assert_eq!(*log.borrow(), ["unshifted", "wired"]);
}

#[test]
fn test_set_after_construction() {
    let document = Document::new();
    let observable: Observable = Observable::new();
    let binding = Binding::default();
    binding
        .set_event_listener(Rc::new(EventListener::new(observable.clone()).on("ping", |_, _| {})))
        .unwrap();
    engine::run(&document, &Model::element("div"), RunOptions::new(document.body()).with_binding(binding.clone()))
        .unwrap();

    assert_eq!(observable.listener_count("ping"), 1);
    assert_eq!(binding.event_listener().unwrap().event_names(), ["ping"]);
}
