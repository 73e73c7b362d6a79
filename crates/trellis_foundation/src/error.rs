//! Error types for the Trellis system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::types::ObjectType;

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unsupported construct error.
    #[must_use]
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedConstruct(what.into()))
    }

    /// Creates a structural violation error.
    #[must_use]
    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StructuralViolation(message.into()))
    }

    /// Creates an evaluator failure error.
    #[must_use]
    pub fn evaluator(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EvaluatorFailure {
            name: name.into(),
            message: message.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: ObjectType, actual: ObjectType) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unknown entry point error.
    #[must_use]
    pub fn unknown_entry_point(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownEntryPoint(name.into()))
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Returns true if this error aborted a rule because of a construct
    /// the compiler does not implement.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedConstruct(_))
    }

    /// Returns true if this error reports a broken build invariant.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, ErrorKind::StructuralViolation(_))
    }
}

/// Categorized error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A condition kind or capability that is not implemented.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// A build-context invariant was broken.
    #[error("structural violation: {0}")]
    StructuralViolation(String),

    /// An opaque predicate, function, or consequence failed.
    #[error("evaluator {name} failed: {message}")]
    EvaluatorFailure {
        /// Name (key) of the failing callable.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// A value had an unexpected runtime type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: ObjectType,
        /// The actual type encountered.
        actual: ObjectType,
    },

    /// No entry point with this name exists in the network.
    #[error("unknown entry point: {0}")]
    UnknownEntryPoint(String),

    /// Semantic limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Semantic limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Maximum rule activations per session run exceeded.
    MaxActivations {
        /// The configured limit.
        limit: u32,
        /// Additional context about which rule(s) caused the issue.
        context: Option<String>,
    },
    /// The node id space of one network is exhausted.
    MaxNodes {
        /// Size of the id space.
        limit: u32,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxActivations { limit, context } => {
                write!(f, "max activations ({limit}) exceeded")?;
                if let Some(ctx) = context {
                    write!(f, ": {ctx}")?;
                }
                Ok(())
            }
            Self::MaxNodes { limit } => write!(f, "max nodes ({limit}) exceeded"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Rule being compiled or fired.
    pub rule: Option<String>,
    /// Stack of condition frames, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rule: None,
            stack: Vec::new(),
        }
    }

    /// Sets the rule name.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "in rule {rule}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  at {frame}")?;
            }
        }
        Ok(())
    }
}
