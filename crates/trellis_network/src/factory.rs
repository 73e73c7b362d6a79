//! The node factory boundary.
//!
//! The compiler never constructs nodes itself: it allocates an id, asks a
//! [`NodeFactory`] to materialize the node, and hands the result to
//! [`crate::Network::attach`], which reuses an equivalent node when one
//! exists. A runtime with its own node representation implements the trait
//! and keeps the compiler unchanged.

use std::sync::Arc;

use trellis_foundation::{ObjectType, Result};
use trellis_model::{Consequence, Invocation, Predicate};

use crate::node::{AccumulateSpec, BetaConstraints, Node, NodeId, NodeKind};

/// Materializes network nodes.
///
/// A factory may reject a node by returning an error, which aborts the
/// rule being compiled.
pub trait NodeFactory {
    /// Root of a polled entry point.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_entry_point_root(&self, id: NodeId, name: &str) -> Result<Node>;

    /// Root of a reactive stream whose values have `object_type`.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_stream_root(
        &self,
        id: NodeId,
        name: &str,
        object_type: &ObjectType,
    ) -> Result<Node>;

    /// Object-type filter beneath a root.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_object_type_filter(
        &self,
        id: NodeId,
        parent: NodeId,
        object_type: &ObjectType,
    ) -> Result<Node>;

    /// Single-object filter. The object is passed `arity` times.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_alpha_filter(
        &self,
        id: NodeId,
        parent: NodeId,
        predicate: &Predicate,
        arity: usize,
    ) -> Result<Node>;

    /// Adapter from an object stream to a tuple stream.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_left_input_adapter(&self, id: NodeId, parent: NodeId) -> Result<Node>;

    /// Join of a tuple stream and an object stream.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_join(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        constraints: BetaConstraints,
    ) -> Result<Node>;

    /// Negated existence test.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_not(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        constraints: BetaConstraints,
    ) -> Result<Node>;

    /// Existence test.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_exists(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        constraints: BetaConstraints,
    ) -> Result<Node>;

    /// Accumulation of matching objects.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_accumulate(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        source_binder: BetaConstraints,
        results_binder: BetaConstraints,
        functions: Vec<AccumulateSpec>,
    ) -> Result<Node>;

    /// Function invocation over tuple offsets.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_invoker(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        invocation: &Invocation,
        args: Vec<usize>,
        constraints: BetaConstraints,
    ) -> Result<Node>;

    /// Rule sink.
    ///
    /// # Errors
    /// Implementation-defined.
    fn create_terminal(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        rule: Arc<str>,
        salience: i32,
        consequence: &Consequence,
        bindings: Vec<usize>,
    ) -> Result<Node>;
}

/// The default factory producing plain [`Node`] values.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReteNodeFactory;

impl NodeFactory for ReteNodeFactory {
    fn create_entry_point_root(&self, id: NodeId, name: &str) -> Result<Node> {
        Ok(Node::new(id, NodeKind::EntryPoint { name: name.into() }))
    }

    fn create_stream_root(
        &self,
        id: NodeId,
        name: &str,
        object_type: &ObjectType,
    ) -> Result<Node> {
        Ok(Node::new(
            id,
            NodeKind::StreamRoot {
                name: name.into(),
                object_type: object_type.clone(),
            },
        ))
    }

    fn create_object_type_filter(
        &self,
        id: NodeId,
        parent: NodeId,
        object_type: &ObjectType,
    ) -> Result<Node> {
        Ok(Node::new(
            id,
            NodeKind::ObjectType {
                object_type: object_type.clone(),
            },
        )
        .with_object_parent(parent))
    }

    fn create_alpha_filter(
        &self,
        id: NodeId,
        parent: NodeId,
        predicate: &Predicate,
        arity: usize,
    ) -> Result<Node> {
        Ok(Node::new(
            id,
            NodeKind::Alpha {
                predicate: predicate.clone(),
                arity,
            },
        )
        .with_object_parent(parent))
    }

    fn create_left_input_adapter(&self, id: NodeId, parent: NodeId) -> Result<Node> {
        Ok(Node::new(id, NodeKind::LeftInputAdapter).with_object_parent(parent))
    }

    fn create_join(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        constraints: BetaConstraints,
    ) -> Result<Node> {
        Ok(Node::new(id, NodeKind::Join { constraints })
            .with_tuple_parent(tuple_parent)
            .with_object_parent(object_parent))
    }

    fn create_not(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        constraints: BetaConstraints,
    ) -> Result<Node> {
        Ok(Node::new(id, NodeKind::Not { constraints })
            .with_tuple_parent(tuple_parent)
            .with_object_parent(object_parent))
    }

    fn create_exists(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        constraints: BetaConstraints,
    ) -> Result<Node> {
        Ok(Node::new(id, NodeKind::Exists { constraints })
            .with_tuple_parent(tuple_parent)
            .with_object_parent(object_parent))
    }

    fn create_accumulate(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        object_parent: NodeId,
        source_binder: BetaConstraints,
        results_binder: BetaConstraints,
        functions: Vec<AccumulateSpec>,
    ) -> Result<Node> {
        Ok(Node::new(
            id,
            NodeKind::Accumulate {
                source_binder,
                results_binder,
                functions,
            },
        )
        .with_tuple_parent(tuple_parent)
        .with_object_parent(object_parent))
    }

    fn create_invoker(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        invocation: &Invocation,
        args: Vec<usize>,
        constraints: BetaConstraints,
    ) -> Result<Node> {
        Ok(Node::new(
            id,
            NodeKind::Invoker {
                invocation: invocation.clone(),
                args,
                constraints,
            },
        )
        .with_tuple_parent(tuple_parent))
    }

    fn create_terminal(
        &self,
        id: NodeId,
        tuple_parent: NodeId,
        rule: Arc<str>,
        salience: i32,
        consequence: &Consequence,
        bindings: Vec<usize>,
    ) -> Result<Node> {
        Ok(Node::new(
            id,
            NodeKind::Terminal {
                rule,
                salience,
                consequence: consequence.clone(),
                bindings,
            },
        )
        .with_tuple_parent(tuple_parent))
    }
}
