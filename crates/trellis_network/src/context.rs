//! Per-rule build state.
//!
//! A [`BuildContext`] is created fresh for each rule and threaded by
//! mutable reference through the recursive compile. Between pattern steps
//! at most one cursor is set, and after a pattern step exactly the tuple
//! cursor is set.

use std::sync::Arc;

use trellis_foundation::{Error, ErrorContext, Result};
use trellis_model::Variable;

use crate::node::NodeId;

/// Cursor and binding state for one rule compilation.
#[derive(Clone, Debug)]
pub struct BuildContext {
    rule: Arc<str>,
    object_cursor: Option<NodeId>,
    tuple_cursor: Option<NodeId>,
    entry_point: Option<NodeId>,
    root_object_type: Option<NodeId>,
    /// Length of the tuple produced at the tuple cursor.
    next_offset: usize,
    bound: Vec<(Variable, usize)>,
    patterns: usize,
    frames: Vec<String>,
}

impl BuildContext {
    /// Creates an empty context for the named rule.
    #[must_use]
    pub fn new(rule: impl Into<Arc<str>>) -> Self {
        Self {
            rule: rule.into(),
            object_cursor: None,
            tuple_cursor: None,
            entry_point: None,
            root_object_type: None,
            next_offset: 0,
            bound: Vec::new(),
            patterns: 0,
            frames: Vec::new(),
        }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    // -------------------------------------------------------------------------
    // Cursors
    // -------------------------------------------------------------------------

    /// Node the next object-consuming node attaches beneath.
    #[must_use]
    pub fn object_cursor(&self) -> Option<NodeId> {
        self.object_cursor
    }

    /// Node producing the current partial matches.
    #[must_use]
    pub fn tuple_cursor(&self) -> Option<NodeId> {
        self.tuple_cursor
    }

    /// Moves the object cursor.
    pub fn set_object_cursor(&mut self, node: NodeId) {
        self.object_cursor = Some(node);
    }

    /// Replaces the object stream by a tuple stream produced at `node`.
    pub fn absorb(&mut self, node: NodeId) {
        self.object_cursor = None;
        self.tuple_cursor = Some(node);
    }

    /// Returns the object cursor or a structural violation naming `what`.
    ///
    /// # Errors
    /// Fails if the object cursor is unset.
    pub fn require_object_cursor(&self, what: &str) -> Result<NodeId> {
        self.object_cursor
            .ok_or_else(|| Error::structural(format!("{what} needs an object cursor")))
    }

    /// Returns the tuple cursor or a structural violation naming `what`.
    ///
    /// # Errors
    /// Fails if the tuple cursor is unset.
    pub fn require_tuple_cursor(&self, what: &str) -> Result<NodeId> {
        self.tuple_cursor
            .ok_or_else(|| Error::structural(format!("{what} needs a tuple cursor")))
    }

    /// Checks the state expected after a pattern step.
    ///
    /// # Errors
    /// Fails unless exactly the tuple cursor is set.
    pub fn check_pattern_complete(&self) -> Result<()> {
        match (self.object_cursor, self.tuple_cursor) {
            (None, Some(_)) => Ok(()),
            (object, tuple) => Err(Error::structural(format!(
                "pattern left object cursor {object:?} and tuple cursor {tuple:?}"
            ))),
        }
    }

    /// Current entry point root.
    #[must_use]
    pub fn entry_point(&self) -> Option<NodeId> {
        self.entry_point
    }

    /// Sets the current entry point root.
    pub fn set_entry_point(&mut self, node: Option<NodeId>) {
        self.entry_point = node;
    }

    /// Object-type node the most recent adapter was built over.
    #[must_use]
    pub fn root_object_type(&self) -> Option<NodeId> {
        self.root_object_type
    }

    /// Records the object-type node an adapter was built over.
    pub fn set_root_object_type(&mut self, node: NodeId) {
        self.root_object_type = Some(node);
    }

    // -------------------------------------------------------------------------
    // Bindings
    // -------------------------------------------------------------------------

    /// Binds `variable` at the next tuple offset and returns it.
    pub fn bind(&mut self, variable: &Variable) -> usize {
        let offset = self.reserve_offset();
        self.bound.push((variable.clone(), offset));
        offset
    }

    /// Claims the next tuple offset without binding a visible variable.
    pub fn reserve_offset(&mut self) -> usize {
        let offset = self.next_offset;
        self.next_offset += 1;
        offset
    }

    /// Returns the offset a variable is bound at.
    #[must_use]
    pub fn offset_of(&self, variable: &Variable) -> Option<usize> {
        self.bound
            .iter()
            .find(|(bound, _)| bound == variable)
            .map(|(_, offset)| *offset)
    }

    /// Returns the offset of `variable` or a structural violation.
    ///
    /// # Errors
    /// Fails if `variable` is unbound.
    pub fn require_offset(&self, variable: &Variable, reader: &str) -> Result<usize> {
        self.offset_of(variable).ok_or_else(|| {
            Error::structural(format!("{reader} reads unbound variable {variable:?}"))
        })
    }

    /// Bound variables with their offsets, in binding order.
    #[must_use]
    pub fn bound(&self) -> &[(Variable, usize)] {
        &self.bound
    }

    /// Offset of the most recently claimed tuple slot.
    #[must_use]
    pub fn pattern_offset(&self) -> Option<usize> {
        self.next_offset.checked_sub(1)
    }

    /// Number of tuple slots claimed so far.
    #[must_use]
    pub fn tuple_len(&self) -> usize {
        self.next_offset
    }

    // -------------------------------------------------------------------------
    // Error frames
    // -------------------------------------------------------------------------

    /// Counts a pattern and returns its 1-based index.
    pub fn next_pattern(&mut self) -> usize {
        self.patterns += 1;
        self.patterns
    }

    /// Enters a condition frame.
    pub fn push_frame(&mut self, frame: impl Into<String>) {
        self.frames.push(frame.into());
    }

    /// Leaves the innermost condition frame.
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Builds an error context from the rule name and the open frames.
    #[must_use]
    pub fn error_context(&self) -> ErrorContext {
        self.frames
            .iter()
            .fold(ErrorContext::new().with_rule(self.rule.as_ref()), |ctx, f| {
                ctx.with_frame(f.clone())
            })
    }
}
