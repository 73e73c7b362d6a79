//! Core values, facts, runtime types, and errors for Trellis.
//!
//! This crate provides:
//! - [`Value`] - The value type flowing through the network (facts and primitives)
//! - [`Fact`] - A typed record inserted into an entry point
//! - [`ObjectType`] - Runtime type descriptors used by object-type nodes
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`Seq`], [`FieldMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod fact;
pub mod types;
pub mod value;

pub use collections::{FieldMap, Seq};
pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use fact::Fact;
pub use types::ObjectType;
pub use value::Value;

/// Result type alias using the Trellis error.
pub type Result<T> = std::result::Result<T, Error>;
