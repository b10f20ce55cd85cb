//! Handlers and systems.
//!
//! A [`Handler`] is a named function bound to exactly one event type. A
//! [`System`] is a flat, ordered list of handlers built from a set of
//! `event type -> function` bindings plus already-built sub-systems.

use std::fmt;
use std::rc::Rc;

use crate::dispatcher::Dispatcher;
use crate::event::Event;
use crate::response::Outcome;

/// Shared, type-erased handler function.
pub type HandlerFn = Rc<dyn Fn(&Event, &Dispatcher) -> Outcome>;

/// A named function bound to one event type.
#[derive(Clone)]
pub struct Handler {
    name: Rc<str>,
    event_type: Rc<str>,
    execute: HandlerFn,
}

impl Handler {
    /// Creates a handler named `name` acting on `event_type` events.
    pub fn new<F, O>(name: &str, event_type: &str, f: F) -> Self
    where
        F: Fn(&Event, &Dispatcher) -> O + 'static,
        O: Into<Outcome>,
    {
        Self {
            name: name.into(),
            event_type: event_type.into(),
            execute: Rc::new(move |event, dispatcher| f(event, dispatcher).into()),
        }
    }

    /// Name of the system this handler belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event type this handler is bound to.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns true if this handler acts on `event`.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        event.is(&self.event_type)
    }

    /// Runs the handler.
    ///
    /// Returns `None` without calling the wrapped function when the event
    /// type differs from the bound type.
    #[must_use]
    pub fn execute(&self, event: &Event, dispatcher: &Dispatcher) -> Option<Outcome> {
        self.matches(event)
            .then(|| (self.execute)(event, dispatcher))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({} on {})", self.name, self.event_type)
    }
}

// =============================================================================
// System
// =============================================================================

/// An ordered bundle of handlers.
///
/// Handlers bound directly come first in binding order, followed by the
/// handlers of each sub-system in the order they were added.
#[derive(Clone, Debug)]
pub struct System {
    name: Rc<str>,
    handlers: Vec<Handler>,
}

impl System {
    /// Creates an empty system.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    /// Builder method binding `f` to `event_type`.
    #[must_use]
    pub fn on<F, O>(mut self, event_type: &str, f: F) -> Self
    where
        F: Fn(&Event, &Dispatcher) -> O + 'static,
        O: Into<Outcome>,
    {
        self.handlers.push(Handler::new(&self.name, event_type, f));
        self
    }

    /// Builder method appending every handler of `sub`.
    #[must_use]
    pub fn with(mut self, sub: impl Into<System>) -> Self {
        self.handlers.extend(sub.into().handlers);
        self
    }

    /// The system name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flattened handler list.
    #[must_use]
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Returns true if any handler is bound to `event_type`.
    #[must_use]
    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.iter().any(|h| h.event_type() == event_type)
    }
}

impl From<Handler> for System {
    fn from(handler: Handler) -> Self {
        Self {
            name: handler.name.clone(),
            handlers: vec![handler],
        }
    }
}

/// Builds a system from `(event type, handler)` bindings and sub-systems.
///
/// Each binding becomes a handler named `name` guarded on its event type.
pub fn system<I, K>(name: &str, bindings: I, sub_systems: impl IntoIterator<Item = System>) -> System
where
    I: IntoIterator<Item = (K, HandlerFn)>,
    K: Into<String>,
{
    let mut built = System::new(name);
    for (event_type, f) in bindings {
        built.handlers.push(Handler {
            name: built.name.clone(),
            event_type: Rc::from(event_type.into()),
            execute: f,
        });
    }
    sub_systems.into_iter().fold(built, |acc, sub| acc.with(sub))
}

/// Boxes a handler function for use with [`system`].
pub fn handler_fn<F, O>(f: F) -> HandlerFn
where
    F: Fn(&Event, &Dispatcher) -> O + 'static,
    O: Into<Outcome>,
{
    Rc::new(move |event, dispatcher| f(event, dispatcher).into())
}
