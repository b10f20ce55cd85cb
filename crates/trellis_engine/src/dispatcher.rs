//! The event queue.
//!
//! A [`Dispatcher`] owns a FIFO queue of events, the subscriptions that
//! route them to handlers, and the [`World`] those handlers share.
//!
//! The queue moves between two phases:
//!
//! - `Idle`: nothing is being processed. Dispatching an event enqueues it,
//!   switches to `Draining`, and drains the queue before returning.
//! - `Draining`: the head event's handlers are running. Dispatching only
//!   appends to the queue; the running drain picks the event up after
//!   everything already queued ahead of it. When the queue empties the
//!   dispatcher returns to `Idle`.
//!
//! Deferred handler results are spawned on the configured local spawner.
//! When one settles, its follow-on events go through the same enqueue path,
//! so they land behind whatever was queued in the meantime.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use trellis_foundation::{Error, ErrorContext, Record, Result, Value};
use trellis_storage::World;

use crate::config::DispatcherConfig;
use crate::event::Event;
use crate::handler::{Handler, System};
use crate::pipe::PipeId;
use crate::response::{Outcome, Response};

/// The world shared by every handler of a dispatcher.
pub type SharedWorld = Rc<RefCell<World>>;

/// Identifies one handler subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Queue processing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No drain is running.
    Idle,
    /// A drain is running; new events are only appended.
    Draining,
}

// =============================================================================
// Continuations
// =============================================================================

/// One remaining step of a pipe.
#[derive(Clone, Debug)]
pub(crate) enum Stage {
    /// The next event in the chain.
    Event(Event),
    /// Emit the completion event for this pipe.
    Complete(PipeId),
}

/// Remaining stages of a pipe, shared by every event of the chain.
pub(crate) type Continuation = Rc<RefCell<VecDeque<Stage>>>;

/// Merges a stage's output into the next stage's data.
///
/// Two records merge with the next stage's own fields winning; anything
/// else is replaced by the output.
fn inject(output: &Value, data: Option<Value>) -> Value {
    match (output, data) {
        (Value::Record(output), Some(Value::Record(data))) => Value::Record(output.merge(&data)),
        _ => output.clone(),
    }
}

/// Names the handler and event a failure happened under.
fn handler_error(error: Error, handler: &str, event_type: &str) -> Error {
    error.or_context(|| ErrorContext::new().with_handler(handler).with_event(event_type))
}

// =============================================================================
// Dispatcher
// =============================================================================

struct Queued {
    event: Event,
    continuation: Option<Continuation>,
}

struct State {
    phase: Phase,
    queue: VecDeque<Queued>,
    subscriptions: HashMap<String, Vec<(SubscriptionId, Handler)>>,
    next_subscription: u64,
}

impl State {
    fn subscribers(&self, event_type: &str) -> Vec<Handler> {
        self.subscriptions
            .get(event_type)
            .map(|subscribed| subscribed.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

/// Returns the dispatcher to `Idle` when a drain ends, including by unwinding.
struct DrainGuard<'a>(&'a RefCell<State>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.0.try_borrow_mut() {
            state.phase = Phase::Idle;
        }
    }
}

struct Inner {
    world: SharedWorld,
    spawner: Box<dyn LocalSpawn>,
    config: DispatcherConfig,
    state: RefCell<State>,
}

/// Single-threaded event dispatcher.
///
/// Cloning yields another handle to the same queue and world.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Rc<Inner>,
}

impl Dispatcher {
    /// Creates a dispatcher over an empty world.
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self::from_parts(World::new(), spawner, DispatcherConfig::default())
    }

    /// Creates a dispatcher over an empty world with the given config.
    pub fn with_config(spawner: impl LocalSpawn + 'static, config: DispatcherConfig) -> Self {
        Self::from_parts(World::new(), spawner, config)
    }

    /// Creates a dispatcher over an existing world.
    pub fn from_parts(
        world: World,
        spawner: impl LocalSpawn + 'static,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                world: Rc::new(RefCell::new(world)),
                spawner: Box::new(spawner),
                config,
                state: RefCell::new(State {
                    phase: Phase::Idle,
                    queue: VecDeque::new(),
                    subscriptions: HashMap::new(),
                    next_subscription: 0,
                }),
            }),
        }
    }

    /// The shared world.
    #[must_use]
    pub fn world(&self) -> &SharedWorld {
        &self.inner.world
    }

    /// The dispatcher configuration.
    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    /// The current queue phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    /// Number of events waiting behind the one being processed.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.inner.state.borrow().queue.len()
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Subscribes every handler of `system` to `event_type`.
    ///
    /// Handlers bound to a different type stay subscribed but never run for
    /// these events.
    pub fn subscribe(&self, event_type: &str, system: &System) -> Vec<SubscriptionId> {
        system
            .handlers()
            .iter()
            .map(|handler| self.subscribe_handler(event_type, handler.clone()))
            .collect()
    }

    /// Subscribes every handler of `system` to the type it is bound to.
    pub fn register(&self, system: &System) -> Vec<SubscriptionId> {
        system
            .handlers()
            .iter()
            .map(|handler| self.subscribe_handler(handler.event_type(), handler.clone()))
            .collect()
    }

    /// Subscribes one handler to `event_type`.
    pub fn subscribe_handler(&self, event_type: &str, handler: Handler) -> SubscriptionId {
        let mut state = self.inner.state.borrow_mut();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        tracing::trace!(event = event_type, handler = handler.name(), "subscribed");
        state
            .subscriptions
            .entry(event_type.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes a subscription. Returns false if it was not present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let found = state.subscriptions.iter_mut().find_map(|(event_type, subscribed)| {
            let position = subscribed.iter().position(|(sub, _)| *sub == id)?;
            subscribed.remove(position);
            Some((event_type.clone(), subscribed.is_empty()))
        });
        match found {
            Some((event_type, emptied)) => {
                if emptied {
                    state.subscriptions.remove(&event_type);
                }
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Queues an event.
    ///
    /// When the dispatcher is idle this drains the queue before returning.
    /// During a drain the event is only appended.
    pub fn dispatch(&self, event: impl Into<Event>) {
        self.enqueue(event.into(), None);
    }

    pub(crate) fn enqueue(&self, event: Event, continuation: Option<Continuation>) {
        let start = {
            let mut state = self.inner.state.borrow_mut();
            state.queue.push_back(Queued {
                event,
                continuation,
            });
            if state.phase == Phase::Idle {
                state.phase = Phase::Draining;
                true
            } else {
                false
            }
        };
        if start {
            self.drain();
        }
    }

    fn drain(&self) {
        let _guard = DrainGuard(&self.inner.state);
        loop {
            let next = {
                let mut state = self.inner.state.borrow_mut();
                state.queue.pop_front().map(|queued| {
                    let handlers = state.subscribers(&queued.event.event_type);
                    (queued, handlers)
                })
            };
            let Some((queued, handlers)) = next else {
                break;
            };

            self.log_event(&queued.event);
            for handler in &handlers {
                self.invoke(handler, &queued.event, queued.continuation.as_ref());
            }
        }
    }

    fn log_event(&self, event: &Event) {
        let config = &self.inner.config;
        if !config.log_events {
            return;
        }
        if config.is_quiet(&event.event_type) {
            tracing::trace!(event = %event, "processing event");
        } else {
            tracing::debug!(event = %event, "processing event");
        }
    }

    fn invoke(&self, handler: &Handler, event: &Event, continuation: Option<&Continuation>) {
        let Some(outcome) = handler.execute(event, self) else {
            return;
        };

        match outcome {
            Outcome::Ready(result) => {
                self.settle(handler.name(), &event.event_type, result, continuation.cloned());
            }
            Outcome::Deferred(future) => {
                let dispatcher = self.clone();
                let name = handler.name().to_string();
                let event_type = event.event_type.clone();
                let continuation = continuation.cloned();
                let task = async move {
                    let result = future.await;
                    dispatcher.settle(&name, &event_type, result, continuation);
                };
                if let Err(error) = self.inner.spawner.spawn_local(task) {
                    let error = handler_error(
                        Error::spawn(error.to_string()),
                        handler.name(),
                        &event.event_type,
                    );
                    tracing::error!(
                        handler = handler.name(),
                        event = %event,
                        context = ?error.context,
                        error = %error,
                        "dropped handler result"
                    );
                }
            }
        }
    }

    fn settle(
        &self,
        handler: &str,
        event_type: &str,
        result: Result<Option<Response>>,
        continuation: Option<Continuation>,
    ) {
        match result {
            Ok(response) => self.follow_on(response.unwrap_or_default(), continuation),
            Err(error) => {
                let error = handler_error(error, handler, event_type);
                tracing::error!(
                    handler,
                    event = event_type,
                    context = ?error.context,
                    error = %error,
                    "handler failed"
                );
            }
        }
    }

    /// Queues whatever comes after a settled handler result.
    fn follow_on(&self, mut response: Response, continuation: Option<Continuation>) {
        let events = match response.events.take() {
            Some(events) => events,
            None => continuation
                .as_ref()
                .and_then(|continuation| self.advance(continuation, &response))
                .into_iter()
                .collect(),
        };

        for mut event in events {
            if event.data.is_none() {
                event.data = response.payload_for(&event.event_type);
            }
            self.enqueue(event, continuation.clone());
        }
    }

    /// Pops the next pipe stage and prepares it from `response`.
    fn advance(&self, continuation: &Continuation, response: &Response) -> Option<Event> {
        let stage = continuation.borrow_mut().pop_front()?;
        Some(match stage {
            Stage::Complete(pipe) => {
                let result = response.output.clone().unwrap_or(Value::Nil);
                Event::new(self.inner.config.completion_event.as_str())
                    .with_data(Record::new().with("id", pipe).with("result", result))
            }
            Stage::Event(mut event) => {
                if let Some(output) = response.output.as_ref().filter(|o| !o.is_nil()) {
                    event.data = Some(inject(output, event.data.take()));
                }
                event
            }
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Dispatcher")
            .field("phase", &state.phase)
            .field("queued", &state.queue.len())
            .field("event_types", &state.subscriptions.len())
            .finish_non_exhaustive()
    }
}
