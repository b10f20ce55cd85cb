//! Events carried through the dispatcher queue.

use std::fmt;

use trellis_foundation::Value;

/// Built-in event type names.
pub mod types {
    /// Sent once by [`Bootstrap::run`](crate::Bootstrap::run) to start every system.
    pub const SETUP: &str = "SETUP";
    /// Follow-on of a system's setup reply, carrying `{system: name}`.
    pub const SYSTEM_READY: &str = "SYSTEM_READY";
    /// Default completion type used by pipes.
    pub const PIPE_COMPLETE: &str = "PIPE_COMPLETE";
}

/// A typed message with an optional payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Event {
    /// Event type name, used for routing.
    pub event_type: String,
    /// Optional payload.
    pub data: Option<Value>,
}

impl Event {
    /// Creates an event without data.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: None,
        }
    }

    /// Builder method to attach data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Returns true if this event has the given type.
    #[must_use]
    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    /// Looks up a field of the payload when it is a record.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.field(name))
    }
}

impl From<&str> for Event {
    fn from(event_type: &str) -> Self {
        Self::new(event_type)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "Event({} {data:?})", self.event_type),
            None => write!(f, "Event({})", self.event_type),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event_type)
    }
}
