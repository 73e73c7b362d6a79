//! Build event and record types.

use std::sync::Arc;

use crate::node::NodeId;

// =============================================================================
// Build Event
// =============================================================================

/// Events recorded while rules are compiled.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildEvent {
    /// Compilation of a rule started.
    RuleStart {
        /// Rule name.
        rule: Arc<str>,
    },

    /// A node was inserted into the network.
    NodeCreated {
        /// The new node.
        node: NodeId,
        /// Node kind name.
        kind: &'static str,
    },

    /// An equivalent existing node was reused.
    NodeShared {
        /// The reused node.
        node: NodeId,
        /// Node kind name.
        kind: &'static str,
    },

    /// A left-input adapter now stands at the tuple cursor.
    AdapterInserted {
        /// The adapter.
        node: NodeId,
        /// Object-type node the adapter's chain starts at.
        root: NodeId,
    },

    /// The implicit initial-fact pattern was built.
    InitialFactInserted {
        /// The initial-fact object-type node.
        node: NodeId,
    },

    /// A constraint reading no variables was dropped.
    ConstraintSkipped {
        /// Predicate key.
        key: String,
    },

    /// A rule compiled successfully.
    RuleComplete {
        /// Rule name.
        rule: Arc<str>,
        /// The rule's terminal node.
        terminal: NodeId,
    },

    /// A rule failed to compile.
    RuleFailed {
        /// Rule name.
        rule: Arc<str>,
        /// Error message.
        message: String,
    },

    /// Nodes attached by a failed rule were removed.
    RolledBack {
        /// Rule name.
        rule: Arc<str>,
        /// Number of nodes removed.
        removed: usize,
    },
}

impl BuildEvent {
    /// Returns a short name for the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RuleStart { .. } => "rule-start",
            Self::NodeCreated { .. } => "node-created",
            Self::NodeShared { .. } => "node-shared",
            Self::AdapterInserted { .. } => "adapter-inserted",
            Self::InitialFactInserted { .. } => "initial-fact-inserted",
            Self::ConstraintSkipped { .. } => "constraint-skipped",
            Self::RuleComplete { .. } => "rule-complete",
            Self::RuleFailed { .. } => "rule-failed",
            Self::RolledBack { .. } => "rolled-back",
        }
    }

    /// Returns true if this event starts or ends a rule.
    #[must_use]
    pub fn is_rule_boundary(&self) -> bool {
        matches!(
            self,
            Self::RuleStart { .. } | Self::RuleComplete { .. } | Self::RuleFailed { .. }
        )
    }

    /// Returns true if this event reports a node being placed.
    #[must_use]
    pub fn is_node_event(&self) -> bool {
        matches!(
            self,
            Self::NodeCreated { .. }
                | Self::NodeShared { .. }
                | Self::AdapterInserted { .. }
                | Self::InitialFactInserted { .. }
        )
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A timestamped build event.
#[derive(Clone, Debug)]
pub struct TraceRecord {
    /// Unique record ID within the tracer.
    pub id: u64,
    /// Sequence number of the rule being compiled.
    pub rule_seq: u64,
    /// Timestamp in nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The event.
    pub event: BuildEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, rule_seq: u64, timestamp_ns: u64, event: BuildEvent) -> Self {
        Self {
            id,
            rule_seq,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
