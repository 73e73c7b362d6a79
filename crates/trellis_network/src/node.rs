//! Network nodes.
//!
//! Nodes live in an arena ([`crate::Network`]) and refer to each other by
//! [`NodeId`]. A node has at most two parents: the object parent feeding it
//! single objects and the tuple parent feeding it partial matches.

use std::fmt;
use std::sync::Arc;

use trellis_foundation::{Error, ObjectType, Result, Value};
use trellis_model::{AccumulateFn, Consequence, Invocation, Predicate};

// =============================================================================
// Node Identity
// =============================================================================

/// Stable identifier of a node, unique for the lifetime of a network.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Beta Constraints
// =============================================================================

/// Where a constraint argument is read from when a beta node evaluates it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArgRef {
    /// The value at this offset of the left tuple.
    Tuple(usize),
    /// The right-hand object being joined.
    Object,
}

/// A predicate with its variables resolved to tuple offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundConstraint {
    /// The predicate.
    pub predicate: Predicate,
    /// Argument sources, in predicate argument order.
    pub args: Vec<ArgRef>,
}

impl BoundConstraint {
    /// Evaluates against a tuple and an optional right-hand object.
    ///
    /// # Errors
    /// Fails if an argument is missing or the predicate fails.
    pub fn evaluate(&self, tuple: &[Value], object: Option<&Value>) -> Result<bool> {
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let value = match arg {
                ArgRef::Tuple(offset) => tuple.get(*offset),
                ArgRef::Object => object,
            };
            let value = value.ok_or_else(|| {
                Error::structural(format!(
                    "constraint {} reads {arg:?} outside a tuple of length {}",
                    self.predicate.key(),
                    tuple.len()
                ))
            })?;
            args.push(value.clone());
        }
        self.predicate.test(&args)
    }
}

/// The constraints of one beta node. All must hold.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BetaConstraints {
    constraints: Vec<BoundConstraint>,
}

impl BetaConstraints {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint.
    pub fn push(&mut self, constraint: BoundConstraint) {
        self.constraints.push(constraint);
    }

    /// Returns the number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns true if there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterates the constraints in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundConstraint> {
        self.constraints.iter()
    }

    /// Returns true if every constraint holds.
    ///
    /// # Errors
    /// Propagates the first evaluation failure.
    pub fn is_satisfied(&self, tuple: &[Value], object: Option<&Value>) -> Result<bool> {
        for constraint in &self.constraints {
            if !constraint.evaluate(tuple, object)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl FromIterator<BoundConstraint> for BetaConstraints {
    fn from_iter<I: IntoIterator<Item = BoundConstraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

/// One aggregation of an accumulate node and the tuple offset of its result.
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulateSpec {
    /// The aggregation.
    pub function: AccumulateFn,
    /// Offset the result is appended at.
    pub offset: usize,
}

// =============================================================================
// Node Kinds
// =============================================================================

/// What a node does.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Root of a polled entry point.
    EntryPoint {
        /// Source name.
        name: Arc<str>,
    },
    /// Root of a reactive stream. Also narrows to `object_type`.
    StreamRoot {
        /// Source name.
        name: Arc<str>,
        /// Type of the values on the stream.
        object_type: ObjectType,
    },
    /// Narrows an object stream to one runtime type.
    ObjectType {
        /// Accepted type.
        object_type: ObjectType,
    },
    /// Single-object filter.
    Alpha {
        /// The filter.
        predicate: Predicate,
        /// How many times the object is passed to the predicate.
        arity: usize,
    },
    /// Wraps each object into a one-element tuple.
    LeftInputAdapter,
    /// Extends a tuple with each matching object.
    Join {
        /// Join constraints.
        constraints: BetaConstraints,
    },
    /// Propagates a tuple iff no object matches.
    Not {
        /// Match constraints.
        constraints: BetaConstraints,
    },
    /// Propagates a tuple iff some object matches.
    Exists {
        /// Match constraints.
        constraints: BetaConstraints,
    },
    /// Folds matching objects into result values.
    Accumulate {
        /// Constraints relating the tuple to each contributing object.
        source_binder: BetaConstraints,
        /// Constraints relating the results back to the tuple.
        results_binder: BetaConstraints,
        /// Aggregations, in result order.
        functions: Vec<AccumulateSpec>,
    },
    /// Extends a tuple with the result of a function call.
    Invoker {
        /// The function.
        invocation: Invocation,
        /// Tuple offsets of the arguments.
        args: Vec<usize>,
        /// Filters over the tuple and the invocation result.
        constraints: BetaConstraints,
    },
    /// Fires a consequence for each tuple.
    Terminal {
        /// Rule name.
        rule: Arc<str>,
        /// Rule priority.
        salience: i32,
        /// The action.
        consequence: Consequence,
        /// Tuple offsets of the consequence arguments.
        bindings: Vec<usize>,
    },
}

impl NodeKind {
    /// Short lowercase name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EntryPoint { .. } => "entry-point",
            Self::StreamRoot { .. } => "stream",
            Self::ObjectType { .. } => "object-type",
            Self::Alpha { .. } => "alpha",
            Self::LeftInputAdapter => "left-input-adapter",
            Self::Join { .. } => "join",
            Self::Not { .. } => "not",
            Self::Exists { .. } => "exists",
            Self::Accumulate { .. } => "accumulate",
            Self::Invoker { .. } => "invoker",
            Self::Terminal { .. } => "terminal",
        }
    }

    /// Returns true for nodes with no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::EntryPoint { .. } | Self::StreamRoot { .. })
    }

    /// Returns true for nodes an object chain may start from when a
    /// left-input adapter looks for its root.
    #[must_use]
    pub fn is_object_type_root(&self) -> bool {
        matches!(self, Self::ObjectType { .. } | Self::StreamRoot { .. })
    }

    /// Returns true for nodes consuming a tuple stream.
    #[must_use]
    pub fn is_beta(&self) -> bool {
        matches!(
            self,
            Self::Join { .. }
                | Self::Not { .. }
                | Self::Exists { .. }
                | Self::Accumulate { .. }
                | Self::Invoker { .. }
        )
    }

    /// Returns true if a node of this kind may stand in for `other`.
    ///
    /// Terminals never do.
    #[must_use]
    pub fn shares_with(&self, other: &NodeKind) -> bool {
        match (self, other) {
            (Self::EntryPoint { name: a }, Self::EntryPoint { name: b }) => a == b,
            (
                Self::StreamRoot {
                    name: a,
                    object_type: ta,
                },
                Self::StreamRoot {
                    name: b,
                    object_type: tb,
                },
            ) => a == b && ta == tb,
            (Self::ObjectType { object_type: a }, Self::ObjectType { object_type: b }) => a == b,
            (
                Self::Alpha {
                    predicate: pa,
                    arity: na,
                },
                Self::Alpha {
                    predicate: pb,
                    arity: nb,
                },
            ) => pa == pb && na == nb,
            (Self::LeftInputAdapter, Self::LeftInputAdapter) => true,
            (Self::Join { constraints: a }, Self::Join { constraints: b })
            | (Self::Not { constraints: a }, Self::Not { constraints: b })
            | (Self::Exists { constraints: a }, Self::Exists { constraints: b }) => a == b,
            (
                Self::Accumulate {
                    source_binder: sa,
                    results_binder: ra,
                    functions: fa,
                },
                Self::Accumulate {
                    source_binder: sb,
                    results_binder: rb,
                    functions: fb,
                },
            ) => sa == sb && ra == rb && fa == fb,
            (
                Self::Invoker {
                    invocation: ia,
                    args: aa,
                    constraints: ca,
                },
                Self::Invoker {
                    invocation: ib,
                    args: ab,
                    constraints: cb,
                },
            ) => ia == ib && aa == ab && ca == cb,
            _ => false,
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// A node of the shared network.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    object_parent: Option<NodeId>,
    tuple_parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Creates a parentless node.
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            object_parent: None,
            tuple_parent: None,
            children: Vec::new(),
        }
    }

    /// Sets the object parent.
    #[must_use]
    pub fn with_object_parent(mut self, parent: NodeId) -> Self {
        self.object_parent = Some(parent);
        self
    }

    /// Sets the tuple parent.
    #[must_use]
    pub fn with_tuple_parent(mut self, parent: NodeId) -> Self {
        self.tuple_parent = Some(parent);
        self
    }

    /// Returns the node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns what the node does.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the object parent.
    #[must_use]
    pub fn object_parent(&self) -> Option<NodeId> {
        self.object_parent
    }

    /// Returns the tuple parent.
    #[must_use]
    pub fn tuple_parent(&self) -> Option<NodeId> {
        self.tuple_parent
    }

    /// Returns the children, in attach order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns both parents, tuple parent first.
    pub fn parents(&self) -> impl Iterator<Item = NodeId> {
        self.tuple_parent.into_iter().chain(self.object_parent)
    }

    /// Returns true if `other` can be replaced by this node.
    #[must_use]
    pub fn is_equivalent(&self, other: &Node) -> bool {
        self.object_parent == other.object_parent
            && self.tuple_parent == other.tuple_parent
            && self.kind.shares_with(&other.kind)
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|c| *c != child);
    }
}
