//! Cross-layer integration tests for Trellis
//!
//! Tests where handlers drive the shared world through events and pipes.
