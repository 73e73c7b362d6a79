//! Rules: a condition tree plus a consequence.

use std::fmt;
use std::sync::Arc;

use trellis_foundation::{Result, Value};

use crate::condition::Condition;
use crate::variable::Variable;

type ActionFn = dyn Fn(&[Value]) -> Result<()> + Send + Sync;

/// The action fired for each complete match.
///
/// The action receives the values of `bindings`, in order.
#[derive(Clone)]
pub struct Consequence {
    bindings: Vec<Variable>,
    action: Arc<ActionFn>,
}

impl Consequence {
    /// Creates a consequence over the given output bindings.
    pub fn new<F>(bindings: Vec<Variable>, action: F) -> Self
    where
        F: Fn(&[Value]) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            bindings,
            action: Arc::new(action),
        }
    }

    /// Returns the output bindings.
    #[must_use]
    pub fn bindings(&self) -> &[Variable] {
        &self.bindings
    }

    /// Runs the action.
    ///
    /// # Errors
    /// Returns whatever the action returns.
    pub fn execute(&self, args: &[Value]) -> Result<()> {
        (self.action)(args)
    }
}

impl fmt::Debug for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consequence")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

/// A complete rule ready for compilation.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Rule name
    pub name: Arc<str>,
    /// Priority (higher fires first), default 0
    pub salience: i32,
    /// Condition tree
    pub view: Condition,
    /// Action over the view's bindings
    pub consequence: Consequence,
}

impl Rule {
    /// Creates a rule with salience 0.
    pub fn new(
        name: impl Into<Arc<str>>,
        view: impl Into<Condition>,
        consequence: Consequence,
    ) -> Self {
        Self {
            name: name.into(),
            salience: 0,
            view: view.into(),
            consequence,
        }
    }

    /// Sets the salience.
    #[must_use]
    pub fn with_salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }
}
