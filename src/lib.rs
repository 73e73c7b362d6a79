//! Trellis - Incremental Rete network builder
//!
//! This crate re-exports all layers of the Trellis system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: trellis_runtime    — Reference session, agenda, refraction
//! Layer 2: trellis_network    — Shared network, node factory, condition-tree compiler
//! Layer 1: trellis_model      — Variables, constraints, patterns, rules
//! Layer 0: trellis_foundation — Core types (Value, Fact, ObjectType, Error)
//! ```

pub use trellis_foundation as foundation;
pub use trellis_model as model;
pub use trellis_network as network;
pub use trellis_runtime as runtime;
