//! Function invocations that derive a new binding from bound variables.

use std::fmt;
use std::sync::Arc;

use trellis_foundation::{Result, Value};

use crate::variable::Variable;

type InvokeFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A call of an opaque function over already-bound variables.
///
/// When `iterable` is set the result must be a vector and the target
/// variable is bound once per element.
#[derive(Clone)]
pub struct Invocation {
    key: Arc<str>,
    func: Arc<InvokeFn>,
    params: Vec<Variable>,
    iterable: bool,
}

impl Invocation {
    /// Creates an invocation whose result binds the target variable once.
    pub fn new<F>(key: impl Into<Arc<str>>, params: Vec<Variable>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            func: Arc::new(func),
            params,
            iterable: false,
        }
    }

    /// Binds the target variable to each element of the result instead.
    #[must_use]
    pub fn iterable(mut self) -> Self {
        self.iterable = true;
        self
    }

    /// Returns the sharing key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the parameters, in argument order.
    #[must_use]
    pub fn params(&self) -> &[Variable] {
        &self.params
    }

    /// Returns true if the result is expanded element by element.
    #[must_use]
    pub fn is_iterable(&self) -> bool {
        self.iterable
    }

    /// Calls the function.
    ///
    /// # Errors
    /// Returns whatever the underlying callable returns.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl PartialEq for Invocation {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.iterable == other.iterable
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<invoke {}", self.key)?;
        if self.iterable {
            write!(f, " *")?;
        }
        write!(f, ">")
    }
}
