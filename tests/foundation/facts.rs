//! Integration tests for Fact and ObjectType

use trellis_foundation::{Fact, ObjectType, Value};

#[test]
fn fact_fields_and_type() {
    let mark = Fact::new("Person").with("name", "Mark").with("age", 37);
    assert_eq!(mark.object_type(), &ObjectType::fact("Person"));
    assert_eq!(mark.get("age"), Some(&Value::Int(37)));
    assert_eq!(mark.field_names(), vec!["age", "name"]);
}

#[test]
fn fact_missing_field_is_an_evaluator_failure() {
    let mark = Fact::new("Person");
    let err = mark.field("age").unwrap_err();
    assert!(format!("{err}").contains("Person.age"));
}

#[test]
fn fact_with_is_persistent() {
    let base = Fact::new("Person").with("name", "Mark");
    let older = base.with("age", 38);
    assert!(base.get("age").is_none());
    assert_eq!(older.get("name"), Some(&Value::from("Mark")));
}

#[test]
fn initial_fact_is_hidden_from_any() {
    let initial = Value::from(Fact::initial());
    assert!(initial.object_type().is_initial_fact());
    assert!(!ObjectType::Any.accepts(&initial.object_type()));
    assert!(ObjectType::InitialFact.accepts(&initial.object_type()));
}

#[test]
fn object_types_do_not_promote() {
    assert!(!ObjectType::Float.accepts(&ObjectType::Int));
    assert!(ObjectType::Any.accepts(&ObjectType::Int));
    assert!(!ObjectType::fact("Person").accepts(&ObjectType::fact("Pet")));
}

#[test]
fn fact_display_sorts_fields() {
    let mark = Fact::new("Person").with("name", "Mark").with("age", 37);
    assert_eq!(format!("{mark}"), "Person{age: 37, name: Mark}");
}
