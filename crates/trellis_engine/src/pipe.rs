//! Pipes: event chains collapsed into one awaited result.
//!
//! `dispatcher.pipe([x, y, z])` dispatches `x` and attaches the remaining
//! stages as its continuation. Each stage's output is injected into the
//! next stage's data. After the last stage the dispatcher emits a
//! completion event carrying `{id, result}`, which a one-shot handler
//! registered by the pipe turns into the value of the returned [`Pipe`].
//!
//! A chain that never reaches its completion (a stage with no handler, a
//! failing handler) leaves the pipe pending forever.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use trellis_foundation::{Error, Result, Value};

use crate::dispatcher::{Dispatcher, Stage, SubscriptionId};
use crate::event::Event;
use crate::handler::Handler;

static NEXT_PIPE: AtomicU64 = AtomicU64::new(1);

/// Process-unique pipe identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipeId(u64);

impl PipeId {
    fn next() -> Self {
        Self(NEXT_PIPE.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PipeId> for Value {
    #[allow(clippy::cast_possible_wrap)]
    fn from(id: PipeId) -> Self {
        Value::Int(id.0 as i64)
    }
}

/// The pending result of a pipe.
///
/// Resolves to the last stage's output, or `None` if it produced none.
/// Resolves to [`ErrorKind::PipeAbandoned`](trellis_foundation::ErrorKind)
/// if the dispatcher is dropped before the chain completes.
#[must_use = "a pipe's result is only observable by awaiting it"]
#[derive(Debug)]
pub struct Pipe {
    id: Option<PipeId>,
    receiver: Option<oneshot::Receiver<Option<Value>>>,
}

impl Pipe {
    fn empty() -> Self {
        Self {
            id: None,
            receiver: None,
        }
    }

    /// The pipe identifier, or `None` for an empty pipe.
    #[must_use]
    pub fn id(&self) -> Option<PipeId> {
        self.id
    }
}

impl Future for Pipe {
    type Output = Result<Option<Value>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Ready(Ok(None));
        };
        match receiver.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(Ok(result)),
            Poll::Ready(Err(oneshot::Canceled)) => {
                let id = this.id.map_or(0, PipeId::get);
                Poll::Ready(Err(Error::pipe_abandoned(id)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Dispatcher {
    /// Runs `events` as a chain and returns a future for the final output.
    ///
    /// An empty sequence resolves to `Ok(None)` without touching the queue.
    pub fn pipe(&self, events: impl IntoIterator<Item = Event>) -> Pipe {
        let mut events = events.into_iter();
        let Some(first) = events.next() else {
            return Pipe::empty();
        };

        let id = PipeId::next();
        let (sender, receiver) = oneshot::channel();
        let sender = RefCell::new(Some(sender));
        let subscription: Rc<Cell<Option<SubscriptionId>>> = Rc::default();

        let completion_event = self.config().completion_event.clone();
        let own_subscription = Rc::clone(&subscription);
        let completion = Handler::new(
            &format!("pipe-{id}"),
            &completion_event,
            move |event: &Event, dispatcher: &Dispatcher| {
                if event.field("id") != Some(&Value::from(id)) {
                    return;
                }
                if let Some(subscription) = own_subscription.take() {
                    dispatcher.unsubscribe(subscription);
                }
                let result = event.field("result").filter(|v| !v.is_nil()).cloned();
                if let Some(sender) = sender.borrow_mut().take() {
                    if sender.send(result).is_err() {
                        tracing::trace!(pipe = %id, "pipe result dropped by caller");
                    }
                }
            },
        );
        subscription.set(Some(self.subscribe_handler(&completion_event, completion)));

        let mut stages: VecDeque<Stage> = events.map(Stage::Event).collect();
        stages.push_back(Stage::Complete(id));
        tracing::trace!(pipe = %id, stages = stages.len(), "pipe started");
        self.enqueue(first, Some(Rc::new(RefCell::new(stages))));

        Pipe {
            id: Some(id),
            receiver: Some(receiver),
        }
    }
}
