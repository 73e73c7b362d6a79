//! Shared Rete network and condition-tree compiler for Trellis.
//!
//! This crate provides:
//! - [`Network`] - The node arena with structural sharing and rollback
//! - [`NodeFactory`] - The boundary through which nodes are materialized
//! - [`ReteBuilder`] - Compiles a rule's condition tree into the network
//! - [`KnowledgeBase`] - The network plus the rules compiled into it
//! - [`BuildTracer`] - Records what each compilation did to the network

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod classify;
pub mod config;
pub mod context;
pub mod factory;
pub mod knowledge_base;
pub mod network;
pub mod node;
pub mod registry;
pub mod trace;

pub use builder::{ReteBuilder, RuleHandle};
pub use classify::{Classified, ConstraintClass, classify, partition};
pub use config::BuildConfig;
pub use context::BuildContext;
pub use factory::{NodeFactory, ReteNodeFactory};
pub use knowledge_base::KnowledgeBase;
pub use network::{Attached, Network};
pub use node::{
    AccumulateSpec, ArgRef, BetaConstraints, BoundConstraint, Node, NodeId, NodeKind,
};
pub use registry::{IdGenerator, RootRegistry};
pub use trace::{BuildEvent, BuildTracer, TraceRecord, TracerConfig};
