//! Integration tests for Value

use trellis_foundation::{Fact, ObjectType, Seq, Value};

#[test]
fn value_runtime_types() {
    assert_eq!(Value::Nil.object_type(), ObjectType::Nil);
    assert_eq!(Value::from(3).object_type(), ObjectType::Int);
    assert_eq!(Value::from(3.5).object_type(), ObjectType::Float);
    assert_eq!(Value::from("x").object_type(), ObjectType::String);
    assert_eq!(Value::from(vec![1, 2]).object_type(), ObjectType::Vec);
    assert_eq!(
        Value::from(Fact::new("Person")).object_type(),
        ObjectType::fact("Person")
    );
}

#[test]
fn value_accessors() {
    assert_eq!(Value::Int(7).as_int(), Some(7));
    assert_eq!(Value::Int(7).as_number(), Some(7.0));
    assert_eq!(Value::from("hi").as_str(), Some("hi"));
    assert!(Value::Nil.as_fact().is_none());
}

#[test]
fn value_vec_from_iterator() {
    let parents: Seq<Value> = ["Mimmo", "Tina"].into_iter().map(Value::from).collect();
    let value = Value::Vec(parents);
    assert_eq!(value.as_vec().map(Seq::len), Some(2));
    assert_eq!(format!("{value}"), "[Mimmo Tina]");
}

#[test]
fn value_ordering_within_type() {
    assert!(Value::Int(35) < Value::Int(40));
    assert!(Value::from("Edson") < Value::from("Mark"));
}
