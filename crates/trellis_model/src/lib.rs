//! Condition trees and rule declarations for Trellis.
//!
//! The flow is: authoring surface → [`Rule`] (condition tree + consequence)
//! → network builder → shared Rete network.
//!
//! This crate provides:
//! - [`Variable`] - Pattern variables with a declared runtime type
//! - [`Constraint`] / [`Predicate`] - Opaque filters over bound variables
//! - [`Pattern`] / [`PatternKind`] - Plain, existential, accumulate, and invocation patterns
//! - [`Condition`] - The closed condition-tree sum type
//! - [`Rule`] / [`Consequence`] - A complete rule ready for compilation
//! - Accumulate functions ([`sum`], [`average`], [`count`], [`min`], [`max`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accumulate;
pub mod condition;
pub mod constraint;
pub mod invocation;
pub mod pattern;
pub mod rule;
pub mod variable;

pub use accumulate::{
    AccumulateBinding, AccumulateFn, AccumulateFunction, Extractor, FnAccumulate, average, count,
    max, min, sum,
};
pub use condition::{Condition, ObjectPath};
pub use constraint::{Constraint, Predicate, SingleConstraint};
pub use invocation::Invocation;
pub use pattern::{
    DEFAULT_ENTRY_POINT, DataSource, ExistentialKind, Pattern, PatternKind, SourceKind,
};
pub use rule::{Consequence, Rule};
pub use variable::{VarId, Variable};
