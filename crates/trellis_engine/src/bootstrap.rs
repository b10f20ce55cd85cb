//! Startup coordination.
//!
//! [`setup`] registers a set of systems on a dispatcher together with an
//! internal `setup` system. Every system that binds a handler to `SETUP` is
//! expected to answer it with [`Response::ready`], which emits
//! `SYSTEM_READY {system: name}`. Once every such system (and `setup`
//! itself) has reported, the queued after-setup events are dispatched and
//! [`Bootstrap::run`] returns.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use futures::channel::oneshot;
use trellis_foundation::{Error, Result, Value};

use crate::dispatcher::Dispatcher;
use crate::event::{Event, types};
use crate::handler::System;
use crate::response::Response;

/// Name of the internal system registered by [`setup`].
pub const SETUP_SYSTEM: &str = "setup";

#[derive(Debug)]
struct Readiness {
    required: BTreeSet<String>,
    ready: BTreeSet<String>,
    after: Vec<Event>,
    done: Option<oneshot::Sender<()>>,
}

impl Readiness {
    /// Records a report. Returns the after-setup events and the completion
    /// signal the first time every required system is ready.
    fn report(&mut self, system: &str) -> Option<(Vec<Event>, oneshot::Sender<()>)> {
        if !self.required.contains(system) {
            tracing::warn!(system, "readiness report from a system that does not handle setup");
            return None;
        }
        self.ready.insert(system.to_string());
        tracing::debug!(system, ready = self.ready.len(), required = self.required.len(), "system ready");

        if self.required.is_subset(&self.ready) {
            let done = self.done.take()?;
            Some((std::mem::take(&mut self.after), done))
        } else {
            None
        }
    }

    fn pending(&self) -> Vec<String> {
        self.required.difference(&self.ready).cloned().collect()
    }
}

/// Handle returned by [`setup`].
#[must_use = "setup does nothing until the bootstrap is run"]
#[derive(Debug)]
pub struct Bootstrap {
    dispatcher: Dispatcher,
    readiness: Rc<RefCell<Readiness>>,
    done: oneshot::Receiver<()>,
}

impl Bootstrap {
    /// Systems that have not reported ready yet.
    #[must_use]
    pub fn pending(&self) -> Vec<String> {
        self.readiness.borrow().pending()
    }

    /// Dispatches `SETUP` and waits until every system has reported ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher drops the readiness tracker before
    /// setup completes.
    pub async fn run(self) -> Result<()> {
        self.dispatcher.dispatch(types::SETUP);
        self.done
            .await
            .map_err(|_| Error::internal("bootstrap abandoned before every system reported ready"))
    }
}

/// Registers `systems` plus the internal setup system on `dispatcher`.
///
/// `after_events` are dispatched in order once setup completes.
pub fn setup(
    dispatcher: &Dispatcher,
    systems: impl IntoIterator<Item = System>,
    after_events: impl IntoIterator<Item = Event>,
) -> Bootstrap {
    let systems: Vec<System> = systems.into_iter().collect();

    let mut required: BTreeSet<String> = systems
        .iter()
        .flat_map(System::handlers)
        .filter(|handler| handler.event_type() == types::SETUP)
        .map(|handler| handler.name().to_string())
        .collect();
    required.insert(SETUP_SYSTEM.to_string());

    let (sender, receiver) = oneshot::channel();
    let readiness = Rc::new(RefCell::new(Readiness {
        required,
        ready: BTreeSet::new(),
        after: after_events.into_iter().collect(),
        done: Some(sender),
    }));

    let tracker = Rc::clone(&readiness);
    let internal = System::new(SETUP_SYSTEM)
        .on(types::SETUP, |_, _| Response::ready(SETUP_SYSTEM))
        .on(types::SYSTEM_READY, move |event: &Event, dispatcher: &Dispatcher| {
            let Some(system) = event.field("system").and_then(Value::as_str) else {
                tracing::warn!("readiness report without a system name");
                return;
            };
            let finished = tracker.borrow_mut().report(system);
            if let Some((after, done)) = finished {
                for event in after {
                    dispatcher.dispatch(event);
                }
                // The receiver is gone only if the bootstrap was dropped
                let _ = done.send(());
            }
        });

    for system in &systems {
        dispatcher.register(system);
    }
    dispatcher.register(&internal);

    Bootstrap {
        dispatcher: dispatcher.clone(),
        readiness,
        done: receiver,
    }
}
