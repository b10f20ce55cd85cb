//! Error types for the Trellis system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Storage lookups never produce errors; missing data is an empty result.
//! Errors exist for handler failures and for the event engine's plumbing.

use std::fmt;

use thiserror::Error;

/// The main error type for Trellis operations.
///
/// Displays as the kind's message followed by the context, if any.
#[derive(Debug, Error)]
#[error("{kind}{}", context_suffix(.context))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Adds context unless the error already carries some.
    #[must_use]
    pub fn or_context(self, context: impl FnOnce() -> ErrorContext) -> Self {
        if self.context.is_some() {
            self
        } else {
            self.with_context(context())
        }
    }

    /// Creates a handler failure error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler(message.into()))
    }

    /// Creates an abandoned pipe error.
    #[must_use]
    pub fn pipe_abandoned(pipe: u64) -> Self {
        Self::new(ErrorKind::PipeAbandoned(pipe))
    }

    /// Creates a task spawn failure error.
    #[must_use]
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Spawn(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A handler reported a failure.
    #[error("handler failed: {0}")]
    Handler(String),

    /// A pipe's completion handler was dropped before the pipe completed.
    #[error("pipe {0} abandoned before completion")]
    PipeAbandoned(u64),

    /// A deferred handler result could not be scheduled.
    #[error("failed to spawn deferred handler: {0}")]
    Spawn(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Name of the handler that was running.
    pub handler: Option<String>,
    /// Type of the event being handled.
    pub event: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler name.
    #[must_use]
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Sets the event type.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Returns true if neither the handler nor the event is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handler.is_none() && self.event.is_none()
    }
}

#[allow(clippy::ref_option)]
fn context_suffix(context: &Option<ErrorContext>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!(" ({context})"),
        _ => String::new(),
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.handler, &self.event) {
            (Some(handler), Some(event)) => write!(f, "in {handler} handling {event}"),
            (Some(handler), None) => write!(f, "in {handler}"),
            (None, Some(event)) => write!(f, "handling {event}"),
            (None, None) => Ok(()),
        }
    }
}
