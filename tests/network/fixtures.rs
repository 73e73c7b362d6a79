//! Shared rule builders.

use trellis_foundation::{ObjectType, Result, Value};
use trellis_model::{Consequence, Pattern, Variable};

pub fn person(name: &str) -> Variable {
    Variable::new(name, ObjectType::fact("Person"))
}

pub fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_fact().and_then(|f| f.get(name))
}

pub fn name_is(expected: &'static str) -> impl Fn(&Value) -> Result<bool> + Send + Sync {
    move |v| Ok(field(v, "name").and_then(Value::as_str) == Some(expected))
}

pub fn name_is_not(excluded: &'static str) -> impl Fn(&Value) -> Result<bool> + Send + Sync {
    move |v| Ok(field(v, "name").and_then(Value::as_str) != Some(excluded))
}

pub fn older(a: &Value, b: &Value) -> Result<bool> {
    Ok(field(a, "age") > field(b, "age"))
}

/// `?var : Person(name == "Mark")`
pub fn mark_pattern(var: &Variable) -> Pattern {
    Pattern::filter(var).with("name == Mark", name_is("Mark"))
}

pub fn noop(bindings: Vec<Variable>) -> Consequence {
    Consequence::new(bindings, |_| Ok(()))
}
