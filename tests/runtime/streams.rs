//! Reactive streams and named entry points.

use trellis_foundation::{ErrorKind, ObjectType, Value};
use trellis_model::{Condition, DataSource, Pattern, Rule, Variable};
use trellis_network::KnowledgeBase;
use trellis_runtime::Session;

use crate::{collect, fact, name_of, person};

#[test]
fn stream_rules_share_one_root_and_see_every_value() {
    let mut kb = KnowledgeBase::new();
    let mut sinks = Vec::new();
    for name in ["small", "large"] {
        let t = Variable::new("t", ObjectType::Int);
        let (consequence, seen) = collect(vec![t.clone()]);
        let limit = if name == "small" { 0 } else { 10 };
        kb.add_rule(&Rule::new(
            name,
            Pattern::filter(&t)
                .from(DataSource::stream("ticks"))
                .with(format!("t > {limit}"), move |v| {
                    Ok(v.as_int().is_some_and(|n| n > limit))
                }),
            consequence,
        ))
        .unwrap();
        sinks.push(seen);
    }
    assert_eq!(kb.network().count_by_kind("stream"), 1);

    let mut session = Session::new(&kb);
    for n in [5, 50] {
        session.emit("ticks", n).unwrap();
    }
    assert_eq!(session.fire_all_rules().unwrap(), 3);
    assert_eq!(sinks[0].lock().unwrap().len(), 2);
    assert_eq!(*sinks[1].lock().unwrap(), vec![vec![Value::Int(50)]]);
}

#[test]
fn stream_read_as_another_type_is_rejected() {
    let t = Variable::new("t", ObjectType::Int);
    let s = Variable::new("s", ObjectType::String);
    let (ints, seen_ints) = collect(vec![t.clone()]);
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new(
        "ints",
        Pattern::filter(&t).from(DataSource::stream("mixed")),
        ints,
    ))
    .unwrap();
    let err = kb
        .add_rule(&Rule::new(
            "strs",
            Pattern::filter(&s).from(DataSource::stream("mixed")),
            collect(vec![s.clone()]).0,
        ))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedConstruct(_)));
    assert_eq!(kb.rules().len(), 1);

    let mut session = Session::new(&kb);
    session.emit("mixed", 1).unwrap();
    session.emit("mixed", "hello").unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(*seen_ints.lock().unwrap(), vec![vec![Value::Int(1)]]);
}

#[test]
fn untyped_stream_feeds_every_typed_reader() {
    let any = Variable::new("any", ObjectType::Any);
    let t = Variable::new("t", ObjectType::Int);
    let (all, seen_all) = collect(vec![any.clone()]);
    let (ints, seen_ints) = collect(vec![t.clone()]);
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new(
        "all",
        Pattern::filter(&any).from(DataSource::stream("mixed")),
        all,
    ))
    .unwrap();
    kb.add_rule(&Rule::new(
        "ints",
        Pattern::filter(&t).from(DataSource::stream("mixed")),
        ints,
    ))
    .unwrap();

    let mut session = Session::new(&kb);
    session.emit("mixed", 1).unwrap();
    session.emit("mixed", "hello").unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 3);
    assert_eq!(seen_all.lock().unwrap().len(), 2);
    assert_eq!(*seen_ints.lock().unwrap(), vec![vec![Value::Int(1)]]);
}

#[test]
fn named_entry_points_are_separate_partitions() {
    let p = person("p");
    let (consequence, seen) = collect(vec![p.clone()]);
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new(
        "staff",
        Pattern::filter(&p).from(DataSource::entry_point("staff")),
        consequence,
    ))
    .unwrap();

    let mut session = Session::new(&kb);
    session.insert(fact("Mark", 37));
    session.insert_into("staff", fact("Edson", 35)).unwrap();
    session.fire_all_rules().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(name_of(&seen[0][0]), Some("Edson"));
}

#[test]
fn joins_across_entry_points() {
    let a = person("a");
    let b = person("b");
    let (consequence, seen) = collect(vec![a.clone(), b.clone()]);
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new(
        "pairs",
        Condition::and([
            Pattern::filter(&a).into(),
            Pattern::filter(&b).from(DataSource::entry_point("staff")).into(),
        ]),
        consequence,
    ))
    .unwrap();

    let mut session = Session::new(&kb);
    session.insert(fact("Mark", 37));
    session.insert_into("staff", fact("Edson", 35)).unwrap();
    session.insert_into("staff", fact("Mario", 40)).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 2);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn emitting_to_an_unread_stream_fails() {
    let kb = KnowledgeBase::new();
    let mut session = Session::new(&kb);
    let err = session.emit("ticks", 1).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownEntryPoint(_)));
}

#[test]
fn retraction_removes_future_matches() {
    let p = person("p");
    let (consequence, seen) = collect(vec![p.clone()]);
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new("all", Pattern::filter(&p), consequence))
        .unwrap();

    let mut session = Session::new(&kb);
    let mark = session.insert(fact("Mark", 37));
    session.insert(fact("Edson", 35));
    assert!(session.retract(mark));
    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(name_of(&seen.lock().unwrap()[0][0]), Some("Edson"));
}
