//! Dispatcher configuration.

use crate::event::types;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Event type used for pipe completion events.
    pub completion_event: String,
    /// Event types logged at `trace` instead of `debug`.
    pub quiet_events: Vec<String>,
    /// Whether processed events are logged at all.
    pub log_events: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            completion_event: types::PIPE_COMPLETE.to_string(),
            quiet_events: vec![types::SYSTEM_READY.to_string()],
            log_events: true,
        }
    }
}

impl DispatcherConfig {
    /// Creates a new dispatcher configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to rename the pipe completion event.
    #[must_use]
    pub fn with_completion_event(mut self, event_type: impl Into<String>) -> Self {
        self.completion_event = event_type.into();
        self
    }

    /// Builder method to mark event types as quiet.
    #[must_use]
    pub fn quiet(mut self, event_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.quiet_events
            .extend(event_types.into_iter().map(Into::into));
        self
    }

    /// Builder method to turn per-event logging off.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.log_events = false;
        self
    }

    /// Returns true if `event_type` is logged at `trace` level.
    #[must_use]
    pub fn is_quiet(&self, event_type: &str) -> bool {
        event_type == self.completion_event || self.quiet_events.iter().any(|q| q == event_type)
    }
}
