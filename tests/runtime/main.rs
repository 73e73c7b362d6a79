//! Integration tests for Layer 3: Runtime
//!
//! End-to-end scenarios: compile rules, insert facts, fire, and check the
//! matches each rule saw.

mod invocations;
mod scenarios;
mod streams;

use std::sync::{Arc, Mutex};

use trellis_foundation::{Fact, ObjectType, Result, Value};
use trellis_model::{Consequence, Variable};

pub fn person(name: &str) -> Variable {
    Variable::new(name, ObjectType::fact("Person"))
}

pub fn fact(name: &str, age: i64) -> Value {
    Fact::new("Person").with("name", name).with("age", age).into()
}

pub fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_fact().and_then(|f| f.get(name))
}

pub fn name_of(value: &Value) -> Option<&str> {
    field(value, "name").and_then(Value::as_str)
}

pub fn older(a: &Value, b: &Value) -> Result<bool> {
    Ok(field(a, "age") > field(b, "age"))
}

/// Mark, Edson, Mario, inserted in that order.
pub fn people() -> Vec<Value> {
    vec![fact("Mark", 37), fact("Edson", 35), fact("Mario", 40)]
}

/// A consequence recording the values of `bindings` for each match.
pub fn collect(bindings: Vec<Variable>) -> (Consequence, Arc<Mutex<Vec<Vec<Value>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let consequence = Consequence::new(bindings, move |args| {
        sink.lock().unwrap().push(args.to_vec());
        Ok(())
    });
    (consequence, seen)
}
