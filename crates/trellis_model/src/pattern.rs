//! Patterns: a variable bound to objects from a data source.
//!
//! A pattern is the leaf of a condition tree. Its [`PatternKind`] decides
//! the network topology the compiler builds for it:
//!
//! - `Plain` filters a source and joins the result into the match tuple
//! - `Existential` tests for (non-)existence without binding anything visible
//! - `Accumulate` folds matching objects into result variables
//! - `Invoker` derives a value by calling a function of bound variables

use std::fmt;
use std::sync::Arc;

use trellis_foundation::{Error, Result, Value};

use crate::accumulate::AccumulateBinding;
use crate::constraint::{Constraint, Predicate};
use crate::invocation::Invocation;
use crate::variable::Variable;

/// Name of the entry point used when a pattern names no source.
pub const DEFAULT_ENTRY_POINT: &str = "DEFAULT";

// =============================================================================
// Data Sources
// =============================================================================

/// How facts arrive from a data source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A polled entry point that facts are inserted into.
    EntryPoint,
    /// A reactive stream that values are emitted onto.
    Stream,
}

/// A named origin of facts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataSource {
    name: Arc<str>,
    kind: SourceKind,
}

impl DataSource {
    /// A polled entry point.
    #[must_use]
    pub fn entry_point(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::EntryPoint,
        }
    }

    /// A reactive stream.
    #[must_use]
    pub fn stream(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Stream,
        }
    }

    /// Returns the source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how facts arrive from this source.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Returns true for reactive streams.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        self.kind == SourceKind::Stream
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::entry_point(DEFAULT_ENTRY_POINT)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SourceKind::EntryPoint => write!(f, "entry-point {}", self.name),
            SourceKind::Stream => write!(f, "stream {}", self.name),
        }
    }
}

// =============================================================================
// Pattern Kinds
// =============================================================================

/// The existential quantifier of an existential pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExistentialKind {
    /// At least one matching object exists.
    Exists,
    /// No matching object exists.
    Not,
}

impl fmt::Display for ExistentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists => write!(f, "exists"),
            Self::Not => write!(f, "not"),
        }
    }
}

/// What a pattern does with the objects it filters.
#[derive(Clone, Debug)]
pub enum PatternKind {
    /// Filter and bind.
    Plain,
    /// Test for existence or absence.
    Existential(ExistentialKind),
    /// Fold matching objects into one result variable per binding.
    Accumulate(Vec<AccumulateBinding>),
    /// Bind the variable to the result of a function call.
    Invoker(Invocation),
}

impl PatternKind {
    /// Returns true for kinds that need a tuple stream before they can be
    /// built.
    #[must_use]
    pub fn needs_tuple_input(&self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// Short lowercase name, used in trace output and error frames.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "pattern",
            Self::Existential(ExistentialKind::Exists) => "exists",
            Self::Existential(ExistentialKind::Not) => "not",
            Self::Accumulate(_) => "accumulate",
            Self::Invoker(_) => "invoke",
        }
    }
}

// =============================================================================
// Pattern
// =============================================================================

/// A condition-tree leaf binding a variable to objects from a source.
#[derive(Clone, Debug)]
pub struct Pattern {
    variable: Variable,
    source: DataSource,
    constraint: Constraint,
    kind: PatternKind,
}

impl Pattern {
    fn with_kind(variable: &Variable, kind: PatternKind) -> Self {
        Self {
            variable: variable.clone(),
            source: DataSource::default(),
            constraint: Constraint::none(),
            kind,
        }
    }

    /// A plain pattern over the default entry point.
    #[must_use]
    pub fn filter(variable: &Variable) -> Self {
        Self::with_kind(variable, PatternKind::Plain)
    }

    /// An `exists` pattern.
    #[must_use]
    pub fn exists(variable: &Variable) -> Self {
        Self::with_kind(variable, PatternKind::Existential(ExistentialKind::Exists))
    }

    /// A `not` pattern.
    #[must_use]
    pub fn not(variable: &Variable) -> Self {
        Self::with_kind(variable, PatternKind::Existential(ExistentialKind::Not))
    }

    /// An accumulate pattern over `variable`'s objects.
    ///
    /// Each binding's result variable becomes visible to later conditions.
    #[must_use]
    pub fn accumulate(variable: &Variable, bindings: Vec<AccumulateBinding>) -> Self {
        Self::with_kind(variable, PatternKind::Accumulate(bindings))
    }

    /// Binds `variable` to the result of `invocation`.
    #[must_use]
    pub fn invoke(variable: &Variable, invocation: Invocation) -> Self {
        Self::with_kind(variable, PatternKind::Invoker(invocation))
    }

    /// Reads objects from `source` instead of the default entry point.
    #[must_use]
    pub fn from(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    /// Adds an arbitrary constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = self.constraint.and(constraint);
        self
    }

    /// Adds a single-object filter over the pattern's own variable.
    #[must_use]
    pub fn with<F>(self, key: impl Into<Arc<str>>, test: F) -> Self
    where
        F: Fn(&Value) -> Result<bool> + Send + Sync + 'static,
    {
        let key: Arc<str> = key.into();
        let name = key.clone();
        let predicate = Predicate::new(key, move |args| match args {
            [own] => test(own),
            _ => Err(arity_error(&name, 1, args.len())),
        });
        let variable = self.variable.clone();
        self.constraint(Constraint::single(predicate, vec![variable]))
    }

    /// Adds a filter relating the pattern's own variable to `other`.
    ///
    /// The callable receives the pattern's object first.
    #[must_use]
    pub fn join<F>(self, key: impl Into<Arc<str>>, other: &Variable, test: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<bool> + Send + Sync + 'static,
    {
        let key: Arc<str> = key.into();
        let name = key.clone();
        let predicate = Predicate::new(key, move |args| match args {
            [own, other] => test(own, other),
            _ => Err(arity_error(&name, 2, args.len())),
        });
        let variables = vec![self.variable.clone(), other.clone()];
        self.constraint(Constraint::single(predicate, variables))
    }

    /// Returns the pattern variable.
    #[must_use]
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Returns the data source.
    #[must_use]
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Returns the pattern's constraint.
    #[must_use]
    pub fn constraint_ref(&self) -> &Constraint {
        &self.constraint
    }

    /// Returns the pattern kind.
    #[must_use]
    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }
}

fn arity_error(name: &str, expected: usize, actual: usize) -> Error {
    Error::evaluator(
        name,
        format!("expected {expected} argument(s), got {actual}"),
    )
}
