//! Handler results.
//!
//! A handler returns an [`Outcome`]: either a [`Response`] available right
//! away or a future that produces one later. The response tells the
//! dispatcher what to queue next.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use trellis_foundation::{Error, Record, Result, Value};

use crate::event::{Event, types};

/// Maps a handler's output to the payload of one follow-on event type.
pub type Transform = Rc<dyn Fn(&Value) -> Value>;

/// Describes what a handler produced.
///
/// - `output` is the handler's result. It seeds follow-on events that carry
///   no data of their own and is injected into the next pipe stage.
/// - `events`, when present, are queued next and take precedence over any
///   pipe continuation.
/// - `transforms` derive per-type payloads from `output`.
#[derive(Clone, Default)]
pub struct Response {
    /// Handler output.
    pub output: Option<Value>,
    /// Explicit follow-on events.
    pub events: Option<Vec<Event>>,
    /// Per-event-type output transforms.
    pub transforms: HashMap<String, Transform>,
}

impl Response {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a response that only carries output.
    #[must_use]
    pub fn with_output(output: impl Into<Value>) -> Self {
        Self::new().output(output)
    }

    /// The reply a system gives to `SETUP` once it is ready.
    #[must_use]
    pub fn ready(system: &str) -> Self {
        Self::new()
            .output(Record::new().with("system", system))
            .event(Event::new(types::SYSTEM_READY))
    }

    /// Sets the output.
    #[must_use]
    pub fn output(mut self, output: impl Into<Value>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Appends one explicit follow-on event.
    #[must_use]
    pub fn event(mut self, event: impl Into<Event>) -> Self {
        self.events.get_or_insert_with(Vec::new).push(event.into());
        self
    }

    /// Appends several explicit follow-on events.
    #[must_use]
    pub fn events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.get_or_insert_with(Vec::new).extend(events);
        self
    }

    /// Registers a transform for follow-on events of `event_type`.
    #[must_use]
    pub fn transform(
        mut self,
        event_type: impl Into<String>,
        transform: impl Fn(&Value) -> Value + 'static,
    ) -> Self {
        self.transforms.insert(event_type.into(), Rc::new(transform));
        self
    }

    /// Computes the payload for a follow-on of `event_type`.
    #[must_use]
    pub fn payload_for(&self, event_type: &str) -> Option<Value> {
        let output = self.output.as_ref()?;
        Some(match self.transforms.get(event_type) {
            Some(transform) => transform(output),
            None => output.clone(),
        })
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut transforms: Vec<_> = self.transforms.keys().collect();
        transforms.sort();
        f.debug_struct("Response")
            .field("output", &self.output)
            .field("events", &self.events)
            .field("transforms", &transforms)
            .finish()
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// What a handler invocation returns.
pub enum Outcome {
    /// The result is available now.
    Ready(Result<Option<Response>>),
    /// The result is produced by a future run on the dispatcher's spawner.
    Deferred(LocalBoxFuture<'static, Result<Option<Response>>>),
}

impl Outcome {
    /// Wraps a future whose value becomes the handler result.
    #[must_use]
    pub fn deferred<F, R>(future: F) -> Self
    where
        F: Future<Output = R> + 'static,
        R: Into<Outcome> + 'static,
    {
        Self::Deferred(
            future
                .map(|result| match result.into() {
                    Self::Ready(result) => result,
                    Self::Deferred(_) => Err(Error::internal(
                        "deferred handler resolved to another deferred outcome",
                    )),
                })
                .boxed_local(),
        )
    }

    /// Returns true if the outcome still has to be awaited.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Self::Ready(Ok(None))
    }
}

impl From<Response> for Outcome {
    fn from(response: Response) -> Self {
        Self::Ready(Ok(Some(response)))
    }
}

impl From<Option<Response>> for Outcome {
    fn from(response: Option<Response>) -> Self {
        Self::Ready(Ok(response))
    }
}

impl From<Result<Response>> for Outcome {
    fn from(result: Result<Response>) -> Self {
        Self::Ready(result.map(Some))
    }
}

impl From<Result<Option<Response>>> for Outcome {
    fn from(result: Result<Option<Response>>) -> Self {
        Self::Ready(result)
    }
}

impl From<Result<()>> for Outcome {
    fn from(result: Result<()>) -> Self {
        Self::Ready(result.map(|()| None))
    }
}
