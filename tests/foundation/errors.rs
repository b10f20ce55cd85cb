//! Integration tests for error types

use trellis_foundation::{Error, ErrorContext, ErrorKind, Result};

fn failing_handler() -> Result<()> {
    Err(Error::handler("inventory full")
        .with_context(ErrorContext::new().with_handler("loot").with_event("PICK_UP")))
}

#[test]
fn errors_propagate_with_context() {
    let err = failing_handler().unwrap_err();
    assert_eq!(err.to_string(), "handler failed: inventory full (in loot handling PICK_UP)");
    assert!(matches!(err.kind, ErrorKind::Handler(ref msg) if msg == "inventory full"));

    let context = err.context.unwrap();
    assert_eq!(context.to_string(), "in loot handling PICK_UP");
}

#[test]
fn kinds_render_messages() {
    assert_eq!(Error::pipe_abandoned(4).to_string(), "pipe 4 abandoned before completion");
    assert_eq!(
        Error::spawn("executor shut down").to_string(),
        "failed to spawn deferred handler: executor shut down"
    );
    assert_eq!(Error::internal("oops").to_string(), "internal error: oops");
}

#[test]
fn partial_context_display() {
    assert_eq!(ErrorContext::new().with_event("SETUP").to_string(), "handling SETUP");
    assert_eq!(ErrorContext::new().with_handler("combat").to_string(), "in combat");
    assert_eq!(ErrorContext::new().to_string(), "");
}
