//! Accumulate functions.
//!
//! An accumulate function folds the objects matched by an accumulate
//! pattern into one result value per partial match. The running state is
//! an ordinary [`Value`] so it can be inspected and cloned freely.
//!
//! Built-ins:
//! - [`sum`], [`average`], [`count`] - reversible
//! - [`min`], [`max`] - not reversible; reversing fails with
//!   `UnsupportedConstruct`

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use trellis_foundation::{Error, ObjectType, Result, Seq, Value};

use crate::variable::Variable;

// =============================================================================
// Contract
// =============================================================================

/// The aggregation contract used by accumulate nodes.
pub trait AccumulateFunction: Send + Sync {
    /// Identifies the function for node sharing.
    fn key(&self) -> &str;

    /// Returns a fresh running state.
    fn init(&self) -> Value;

    /// Folds one contributing object into the state.
    ///
    /// # Errors
    /// Fails if the object cannot be aggregated.
    fn accumulate(&self, state: &mut Value, input: &Value) -> Result<()>;

    /// Returns true if [`reverse`](Self::reverse) is implemented.
    fn supports_reverse(&self) -> bool {
        false
    }

    /// Removes one previously accumulated object from the state.
    ///
    /// # Errors
    /// Fails with `UnsupportedConstruct` unless the function is reversible.
    fn reverse(&self, state: &mut Value, input: &Value) -> Result<()> {
        let _ = (state, input);
        Err(Error::unsupported(format!(
            "reverse of accumulate function {}",
            self.key()
        )))
    }

    /// Reads the result out of the state.
    ///
    /// # Errors
    /// Fails if the state is malformed.
    fn result(&self, state: &Value) -> Result<Value>;
}

// =============================================================================
// Extractor
// =============================================================================

type ExtractFn = dyn Fn(&Value) -> Result<Value> + Send + Sync;

/// Maps a contributing object to the value that is aggregated.
#[derive(Clone)]
pub struct Extractor {
    key: Arc<str>,
    func: Arc<ExtractFn>,
}

impl Extractor {
    /// Creates an extractor from a closure.
    pub fn new<F>(key: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            func: Arc::new(func),
        }
    }

    /// Aggregates the object itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::new("it", |value| Ok(value.clone()))
    }

    /// Aggregates a named field of a fact.
    #[must_use]
    pub fn field(name: &str) -> Self {
        let field: Arc<str> = name.into();
        Self::new(field.clone(), move |value| {
            let fact = value
                .as_fact()
                .ok_or_else(|| Error::type_mismatch(ObjectType::Any, value.object_type()))?;
            fact.field(&field).cloned()
        })
    }

    /// Returns the sharing key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Applies the extractor.
    ///
    /// # Errors
    /// Returns whatever the underlying callable returns.
    pub fn extract(&self, value: &Value) -> Result<Value> {
        (self.func)(value)
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<extract {}>", self.key)
    }
}

// =============================================================================
// Handles and bindings
// =============================================================================

/// Shared handle to an accumulate function.
#[derive(Clone)]
pub struct AccumulateFn(Arc<dyn AccumulateFunction>);

impl AccumulateFn {
    /// Wraps an implementation.
    pub fn new(function: impl AccumulateFunction + 'static) -> Self {
        Self(Arc::new(function))
    }

    /// Builds a non-reversible function from closures.
    pub fn from_fns<A, R>(key: impl Into<Arc<str>>, init: Value, accumulate: A, result: R) -> Self
    where
        A: Fn(&mut Value, &Value) -> Result<()> + Send + Sync + 'static,
        R: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(FnAccumulate::new(key, init, accumulate, result))
    }

    /// Binds the function's result to `result`.
    #[must_use]
    pub fn bind(&self, result: &Variable) -> AccumulateBinding {
        AccumulateBinding {
            function: self.clone(),
            result: result.clone(),
        }
    }

    /// Returns the underlying function.
    #[must_use]
    pub fn function(&self) -> &dyn AccumulateFunction {
        self.0.as_ref()
    }

    /// Returns the sharing key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.0.key()
    }
}

impl PartialEq for AccumulateFn {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Debug for AccumulateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<accumulate {}>", self.key())
    }
}

/// One accumulate function and the variable its result is bound to.
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulateBinding {
    /// The aggregation.
    pub function: AccumulateFn,
    /// Variable bound to the aggregated result.
    pub result: Variable,
}

// =============================================================================
// Closure-built functions
// =============================================================================

type StepFn = dyn Fn(&mut Value, &Value) -> Result<()> + Send + Sync;
type ResultFn = dyn Fn(&Value) -> Result<Value> + Send + Sync;

/// An accumulate function assembled from closures.
#[derive(Clone)]
pub struct FnAccumulate {
    key: Arc<str>,
    init: Value,
    accumulate: Arc<StepFn>,
    reverse: Option<Arc<StepFn>>,
    result: Arc<ResultFn>,
}

impl FnAccumulate {
    /// Creates a function with the given initial state, step, and result.
    pub fn new<A, R>(key: impl Into<Arc<str>>, init: Value, accumulate: A, result: R) -> Self
    where
        A: Fn(&mut Value, &Value) -> Result<()> + Send + Sync + 'static,
        R: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            init,
            accumulate: Arc::new(accumulate),
            reverse: None,
            result: Arc::new(result),
        }
    }

    /// Makes the function reversible.
    #[must_use]
    pub fn with_reverse<V>(mut self, reverse: V) -> Self
    where
        V: Fn(&mut Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.reverse = Some(Arc::new(reverse));
        self
    }
}

impl AccumulateFunction for FnAccumulate {
    fn key(&self) -> &str {
        &self.key
    }

    fn init(&self) -> Value {
        self.init.clone()
    }

    fn accumulate(&self, state: &mut Value, input: &Value) -> Result<()> {
        (self.accumulate)(state, input)
    }

    fn supports_reverse(&self) -> bool {
        self.reverse.is_some()
    }

    fn reverse(&self, state: &mut Value, input: &Value) -> Result<()> {
        match &self.reverse {
            Some(reverse) => reverse(state, input),
            None => Err(Error::unsupported(format!(
                "reverse of accumulate function {}",
                self.key
            ))),
        }
    }

    fn result(&self, state: &Value) -> Result<Value> {
        (self.result)(state)
    }
}

// =============================================================================
// Built-ins
// =============================================================================

fn add(key: &str, a: &Value, b: &Value, negate: bool) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            let sum = if negate { x.checked_sub(*y) } else { x.checked_add(*y) };
            sum.map(Value::Int)
                .ok_or_else(|| Error::evaluator(key, "integer overflow"))
        }
        _ => {
            let x = number(a)?;
            let y = number(b)?;
            Ok(Value::Float(if negate { x - y } else { x + y }))
        }
    }
}

fn number(value: &Value) -> Result<f64> {
    value
        .as_number()
        .ok_or_else(|| Error::type_mismatch(ObjectType::Float, value.object_type()))
}

struct Sum {
    key: String,
    extractor: Extractor,
}

impl AccumulateFunction for Sum {
    fn key(&self) -> &str {
        &self.key
    }

    fn init(&self) -> Value {
        Value::Int(0)
    }

    fn accumulate(&self, state: &mut Value, input: &Value) -> Result<()> {
        let x = self.extractor.extract(input)?;
        *state = add(&self.key, state, &x, false)?;
        Ok(())
    }

    fn supports_reverse(&self) -> bool {
        true
    }

    fn reverse(&self, state: &mut Value, input: &Value) -> Result<()> {
        let x = self.extractor.extract(input)?;
        *state = add(&self.key, state, &x, true)?;
        Ok(())
    }

    fn result(&self, state: &Value) -> Result<Value> {
        Ok(state.clone())
    }
}

/// Sums the extracted numbers. Integers stay integers until a float is
/// seen.
#[must_use]
pub fn sum(extractor: Extractor) -> AccumulateFn {
    AccumulateFn::new(Sum {
        key: format!("sum({})", extractor.key()),
        extractor,
    })
}

// Average state: [running sum, count].
struct Average {
    key: String,
    extractor: Extractor,
}

impl Average {
    fn parts(&self, state: &Value) -> Result<(Value, i64)> {
        let parts = state.as_vec();
        match (
            parts.and_then(Seq::first),
            parts.and_then(|v| v.get(1)).and_then(Value::as_int),
        ) {
            (Some(total), Some(n)) => Ok((total.clone(), n)),
            _ => Err(Error::evaluator(&self.key, "malformed running state")),
        }
    }

    fn step(&self, state: &mut Value, input: &Value, negate: bool) -> Result<()> {
        let x = self.extractor.extract(input)?;
        let (total, n) = self.parts(state)?;
        let total = add(&self.key, &total, &x, negate)?;
        let n = if negate { n.checked_sub(1) } else { n.checked_add(1) }
            .ok_or_else(|| Error::evaluator(&self.key, "count overflow"))?;
        *state = Value::from(vec![total, Value::Int(n)]);
        Ok(())
    }
}

impl AccumulateFunction for Average {
    fn key(&self) -> &str {
        &self.key
    }

    fn init(&self) -> Value {
        Value::from(vec![Value::Int(0), Value::Int(0)])
    }

    fn accumulate(&self, state: &mut Value, input: &Value) -> Result<()> {
        self.step(state, input, false)
    }

    fn supports_reverse(&self) -> bool {
        true
    }

    fn reverse(&self, state: &mut Value, input: &Value) -> Result<()> {
        self.step(state, input, true)
    }

    #[allow(clippy::cast_precision_loss)]
    fn result(&self, state: &Value) -> Result<Value> {
        let (total, n) = self.parts(state)?;
        if n == 0 {
            return Ok(Value::Nil);
        }
        Ok(Value::Float(number(&total)? / n as f64))
    }
}

/// Averages the extracted numbers. The average of nothing is nil.
#[must_use]
pub fn average(extractor: Extractor) -> AccumulateFn {
    AccumulateFn::new(Average {
        key: format!("average({})", extractor.key()),
        extractor,
    })
}

/// Counts contributing objects.
#[must_use]
pub fn count() -> AccumulateFn {
    fn bump(state: &mut Value, delta: i64) -> Result<()> {
        let n = state
            .as_int()
            .ok_or_else(|| Error::type_mismatch(ObjectType::Int, state.object_type()))?;
        let n = n
            .checked_add(delta)
            .ok_or_else(|| Error::evaluator("count", "integer overflow"))?;
        *state = Value::Int(n);
        Ok(())
    }
    AccumulateFn::new(
        FnAccumulate::new(
            "count",
            Value::Int(0),
            |state, _| bump(state, 1),
            |state| Ok(state.clone()),
        )
        .with_reverse(|state, _| bump(state, -1)),
    )
}

struct Extreme {
    key: String,
    extractor: Extractor,
    keep: Ordering,
}

impl AccumulateFunction for Extreme {
    fn key(&self) -> &str {
        &self.key
    }

    fn init(&self) -> Value {
        Value::Nil
    }

    fn accumulate(&self, state: &mut Value, input: &Value) -> Result<()> {
        let x = self.extractor.extract(input)?;
        if state.is_nil() {
            *state = x;
            return Ok(());
        }
        match x.partial_cmp(state) {
            Some(ord) if ord == self.keep => *state = x,
            Some(_) => {}
            None => return Err(Error::type_mismatch(state.object_type(), x.object_type())),
        }
        Ok(())
    }

    fn result(&self, state: &Value) -> Result<Value> {
        Ok(state.clone())
    }
}

/// Smallest extracted value. Not reversible.
#[must_use]
pub fn min(extractor: Extractor) -> AccumulateFn {
    AccumulateFn::new(Extreme {
        key: format!("min({})", extractor.key()),
        extractor,
        keep: Ordering::Less,
    })
}

/// Largest extracted value. Not reversible.
#[must_use]
pub fn max(extractor: Extractor) -> AccumulateFn {
    AccumulateFn::new(Extreme {
        key: format!("max({})", extractor.key()),
        extractor,
        keep: Ordering::Greater,
    })
}
