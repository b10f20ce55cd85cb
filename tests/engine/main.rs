//! Integration tests for Layer 2: Engine
//!
//! Tests for dispatch ordering, handler systems, pipes, and bootstrap.

mod pipes;
