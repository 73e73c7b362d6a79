//! Reference session for compiled Trellis networks.
//!
//! This crate provides:
//! - [`Session`] - Working memory, agenda, and rule firing over a knowledge base
//! - [`Evaluator`] - Recomputes the output of any network node
//! - [`Activation`] - A complete match with refraction support
//! - [`SessionConfig`] - The activation kill switch

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod activation;
pub mod config;
pub mod evaluate;
pub mod memory;
pub mod session;

pub use activation::Activation;
pub use config::SessionConfig;
pub use evaluate::{Evaluator, Token};
pub use memory::{FactHandle, WorkingMemory};
pub use session::Session;
