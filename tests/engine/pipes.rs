//! Integration tests for pipes

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::{LocalPool, block_on};
use trellis_engine::{Dispatcher, DispatcherConfig, Event, Outcome, Response, System};
use trellis_foundation::{ErrorKind, Record, Value};

fn int_field(event: &Event, name: &str) -> i64 {
    event.field(name).and_then(Value::as_int).unwrap_or(0)
}

#[test]
fn three_stage_pipe_resolves_with_last_output() {
    let pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());
    let y_input = Rc::new(RefCell::new(None));

    dispatcher.register(&System::new("x").on("X", |event: &Event, _: &Dispatcher| {
        let seed = int_field(event, "seed");
        Response::with_output(Record::new().with("count", seed + 1).with("label", "from-x"))
    }));
    let seen = Rc::clone(&y_input);
    dispatcher.register(&System::new("y").on("Y", move |event: &Event, _: &Dispatcher| {
        *seen.borrow_mut() = event.data.clone();
        Response::with_output(int_field(event, "count") * int_field(event, "factor"))
    }));
    dispatcher.register(&System::new("z").on("Z", |event: &Event, _: &Dispatcher| {
        let n = event.data.as_ref().and_then(Value::as_int).unwrap_or(0);
        Response::with_output(format!("total {n}"))
    }));

    let result = block_on(dispatcher.pipe([
        Event::new("X").with_data(Record::new().with("seed", 1)),
        Event::new("Y").with_data(Record::new().with("factor", 5).with("label", "own")),
        Event::new("Z"),
    ]))
    .unwrap();

    assert_eq!(result, Some(Value::from("total 10")));
    let y = y_input.borrow().clone().unwrap();
    assert_eq!(y.field("count"), Some(&Value::Int(2)));
    // The stage's own data wins over injected output
    assert_eq!(y.field("label"), Some(&Value::from("own")));
}

#[test]
fn scalar_output_replaces_stage_data() {
    let pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());

    dispatcher.register(&System::new("a").on("A", |_, _| Response::with_output(7)));
    dispatcher.register(&System::new("b").on("B", |event: &Event, _: &Dispatcher| {
        Response::with_output(event.data.clone().unwrap_or(Value::Nil))
    }));

    let result = block_on(dispatcher.pipe([
        Event::new("A"),
        Event::new("B").with_data(Record::new().with("ignored", true)),
    ]))
    .unwrap();
    assert_eq!(result, Some(Value::Int(7)));
}

#[test]
fn missing_output_leaves_stage_data_alone() {
    let pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());

    dispatcher.register(&System::new("a").on("A", |_, _| {}));
    dispatcher.register(&System::new("b").on("B", |event: &Event, _: &Dispatcher| {
        Response::with_output(event.data.clone().unwrap_or(Value::Nil))
    }));

    let result = block_on(dispatcher.pipe([Event::new("A"), Event::new("B").with_data("kept")])).unwrap();
    assert_eq!(result, Some(Value::from("kept")));
}

#[test]
fn last_stage_without_output_resolves_to_none() {
    let pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());
    dispatcher.register(&System::new("a").on("A", |_, _| {}));

    assert_eq!(block_on(dispatcher.pipe([Event::new("A")])).unwrap(), None);
}

#[test]
fn empty_pipe_is_immediate() {
    let pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());
    assert_eq!(block_on(dispatcher.pipe(Vec::<Event>::new())).unwrap(), None);
}

#[test]
fn concurrent_pipes_resolve_independently() {
    let mut pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());
    dispatcher.register(&System::new("echo").on("ECHO", |event: &Event, _: &Dispatcher| {
        let data = event.data.clone().unwrap_or(Value::Nil);
        Outcome::deferred(async move { Response::with_output(data) })
    }));

    let first = dispatcher.pipe([Event::new("ECHO").with_data(1)]);
    let second = dispatcher.pipe([Event::new("ECHO").with_data(2)]);
    assert_ne!(first.id(), second.id());

    let (a, b) = pool.run_until(futures::future::join(first, second));
    assert_eq!(a.unwrap(), Some(Value::Int(1)));
    assert_eq!(b.unwrap(), Some(Value::Int(2)));
}

#[test]
fn custom_completion_event() {
    let pool = LocalPool::new();
    let config = DispatcherConfig::new().with_completion_event("CHAIN_DONE");
    let dispatcher = Dispatcher::with_config(pool.spawner(), config);
    let completions = Rc::new(RefCell::new(0));

    dispatcher.register(&System::new("a").on("A", |_, _| Response::with_output("ok")));
    let count = Rc::clone(&completions);
    dispatcher.register(&System::new("watch").on("CHAIN_DONE", move |_, _| *count.borrow_mut() += 1));

    let result = block_on(dispatcher.pipe([Event::new("A")])).unwrap();
    assert_eq!(result, Some(Value::from("ok")));
    assert_eq!(*completions.borrow(), 1);
}

#[test]
fn stalled_pipe_reports_abandonment_when_dispatcher_drops() {
    let pool = LocalPool::new();
    let dispatcher = Dispatcher::new(pool.spawner());
    let pipe = dispatcher.pipe([Event::new("NOBODY_LISTENS")]);
    drop(dispatcher);

    let err = block_on(pipe).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::PipeAbandoned(_)));
}
