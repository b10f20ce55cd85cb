//! Trellis - Event-driven entity, attribute, and relation store
//!
//! This crate re-exports all layers of the Trellis system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: trellis_engine      - Event dispatcher, pipes, systems, bootstrap
//! Layer 1: trellis_storage     - Entity allocator, attributes, relation index, world
//! Layer 0: trellis_foundation  - Core types (Value, Record, Criteria, EntityId, Error)
//! ```

pub use trellis_engine as engine;
pub use trellis_foundation as foundation;
pub use trellis_storage as storage;
