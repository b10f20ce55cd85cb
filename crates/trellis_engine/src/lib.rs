//! Event dispatch, handler systems, pipes, and bootstrap for Trellis.
//!
//! This crate provides:
//! - [`Dispatcher`] - Single-threaded FIFO event queue with subscriptions
//! - [`System`] - Flat, ordered bundles of guarded [`Handler`]s
//! - [`Response`] / [`Outcome`] - What a handler hands back to the queue
//! - [`Pipe`] - A chain of events collapsed into one awaited result
//! - [`setup`] - Bootstrap that waits for every system to report ready
//!
//! All handlers share one [`World`](trellis_storage::World) through the
//! dispatcher. At most one handler body runs at a time; deferred handler
//! results are spawned on a local executor and resubmit their follow-on
//! events through the same queue when they settle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bootstrap;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod handler;
pub mod pipe;
pub mod response;

pub use bootstrap::{Bootstrap, setup};
pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, Phase, SharedWorld, SubscriptionId};
pub use event::Event;
pub use handler::{Handler, HandlerFn, System, handler_fn, system};
pub use pipe::{Pipe, PipeId};
pub use response::{Outcome, Response};
