//! Invocation patterns.

use trellis_foundation::{Error, ErrorKind, ObjectType, Value};
use trellis_model::{Condition, Invocation, Pattern, Rule, Variable};
use trellis_network::KnowledgeBase;
use trellis_runtime::Session;

use crate::{collect, field, name_of, people, person};

fn describe(args: &[Value]) -> trellis_foundation::Result<Value> {
    let [p] = args else {
        return Err(Error::evaluator("describe", "expected one argument"));
    };
    let name = name_of(p).unwrap_or("?");
    let age = field(p, "age").and_then(Value::as_int).unwrap_or_default();
    Ok(format!("{name} is {age} years old").into())
}

fn parents(args: &[Value]) -> trellis_foundation::Result<Value> {
    Ok(match args.first().and_then(name_of) {
        Some("Mario") => Value::Vec(["Mimmo", "Tina"].into_iter().map(Value::from).collect()),
        _ => Value::Nil,
    })
}

#[test]
fn invocation_binds_its_result() {
    let mark = person("mark");
    let text = Variable::new("text", ObjectType::String);
    let (consequence, seen) = collect(vec![text.clone()]);
    let rule = Rule::new(
        "describe-mark",
        Condition::and([
            Pattern::filter(&mark)
                .with("name == Mark", |v| Ok(name_of(v) == Some("Mark")))
                .into(),
            Pattern::invoke(&text, Invocation::new("describe", vec![mark.clone()], describe))
                .into(),
        ]),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    let mut session = Session::new(&kb);
    for p in people() {
        session.insert(p);
    }
    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec![Value::from("Mark is 37 years old")]]
    );
}

#[test]
fn iterable_invocation_binds_each_element() {
    let child = person("child");
    let parent = Variable::new("parent", ObjectType::String);
    let (consequence, seen) = collect(vec![child.clone(), parent.clone()]);
    let rule = Rule::new(
        "parents",
        Condition::and([
            Pattern::filter(&child).into(),
            Pattern::invoke(
                &parent,
                Invocation::new("parents", vec![child.clone()], parents).iterable(),
            )
            .into(),
        ]),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    let mut session = Session::new(&kb);
    for p in people() {
        session.insert(p);
    }
    assert_eq!(session.fire_all_rules().unwrap(), 2);
    let parents: Vec<Value> = seen.lock().unwrap().iter().map(|row| row[1].clone()).collect();
    assert_eq!(parents, vec![Value::from("Mimmo"), Value::from("Tina")]);
    assert!(
        seen.lock()
            .unwrap()
            .iter()
            .all(|row| name_of(&row[0]) == Some("Mario"))
    );
}

#[test]
fn invocation_constraints_filter_results() {
    let child = person("child");
    let parent = Variable::new("parent", ObjectType::String);
    let (consequence, seen) = collect(vec![parent.clone()]);
    let rule = Rule::new(
        "mothers",
        Condition::and([
            Pattern::filter(&child).into(),
            Pattern::invoke(
                &parent,
                Invocation::new("parents", vec![child.clone()], parents).iterable(),
            )
            .with("parent == Tina", |v| Ok(v.as_str() == Some("Tina")))
            .into(),
        ]),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();
    assert_eq!(kb.network().count_by_kind("alpha"), 0);

    let mut session = Session::new(&kb);
    for p in people() {
        session.insert(p);
    }
    session.fire_all_rules().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![vec![Value::from("Tina")]]);
}

#[test]
fn non_iterable_result_of_iterable_invocation_is_a_type_mismatch() {
    let child = person("child");
    let parent = Variable::new("parent", ObjectType::String);
    let rule = Rule::new(
        "bad",
        Condition::and([
            Pattern::filter(&child).into(),
            Pattern::invoke(
                &parent,
                Invocation::new("scalar", vec![child.clone()], |_| Ok(Value::Int(1))).iterable(),
            )
            .into(),
        ]),
        collect(vec![]).0,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();
    let mut session = Session::new(&kb);
    session.insert(crate::fact("Mark", 37));
    let err = session.fire_all_rules().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    assert_eq!(err.context.and_then(|c| c.rule).as_deref(), Some("bad"));
}
