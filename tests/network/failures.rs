//! Failing rules and rollback.

use trellis_foundation::ErrorKind;
use trellis_model::{Condition, ObjectPath, Pattern, Rule};
use trellis_network::{BuildConfig, KnowledgeBase};

use crate::fixtures::{mark_pattern, noop, person};

#[test]
fn disjunction_is_unsupported() {
    let a = person("a");
    let b = person("b");
    let mut kb = KnowledgeBase::new();
    let err = kb
        .add_rule(&Rule::new(
            "either",
            Condition::or([mark_pattern(&a).into(), Pattern::filter(&b).into()]),
            noop(vec![]),
        ))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedConstruct(_)));
    assert_eq!(err.context.unwrap().stack, vec!["or".to_string()]);
}

#[test]
fn object_path_is_unsupported() {
    let a = person("a");
    let pet = person("pet");
    let path = Condition::ObjectPath(ObjectPath {
        root: a.clone(),
        path: vec!["pet".into()],
        target: pet,
    });
    let mut kb = KnowledgeBase::new();
    let err = kb
        .add_rule(&Rule::new(
            "path",
            Condition::and([Pattern::filter(&a).into(), path]),
            noop(vec![]),
        ))
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn rollback_leaves_node_count_unchanged() {
    let a = person("a");
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new("ok", mark_pattern(&a), noop(vec![])))
        .unwrap();
    let nodes = kb.node_count();
    let entry_points = kb.network().count_by_kind("entry-point");

    let b = person("b");
    let broken = Rule::new(
        "broken",
        Condition::and([
            Pattern::filter(&b).from(trellis_model::DataSource::entry_point("other")).into(),
            Condition::or(Vec::new()),
        ]),
        noop(vec![]),
    );
    assert!(kb.add_rule(&broken).is_err());

    assert_eq!(kb.node_count(), nodes);
    assert_eq!(kb.network().count_by_kind("entry-point"), entry_points);
    assert!(kb.entry_point("other").is_none());
    assert_eq!(kb.rules().len(), 1);
    assert_eq!(kb.tracer().rule_seq(), 2);
}

#[test]
fn ids_are_not_reused_after_rollback() {
    let a = person("a");
    let mut kb = KnowledgeBase::new();
    let broken = Rule::new(
        "broken",
        Condition::and([Pattern::filter(&a).into(), Condition::or(Vec::new())]),
        noop(vec![]),
    );
    assert!(kb.add_rule(&broken).is_err());
    let mark = kb.high_water_mark();
    assert!(mark > 0);

    let handle = kb
        .add_rule(&Rule::new("ok", Pattern::filter(&a), noop(vec![])))
        .unwrap();
    assert!(handle.terminal.index() >= mark);
    assert!(kb.network().iter().all(|n| n.id().index() >= mark));
}

#[test]
fn without_rollback_partial_nodes_remain() {
    let a = person("a");
    let mut kb = KnowledgeBase::with_config(BuildConfig::default().with_rollback(false));
    let broken = Rule::new(
        "broken",
        Condition::and([Pattern::filter(&a).into(), Condition::or(Vec::new())]),
        noop(vec![]),
    );
    assert!(kb.add_rule(&broken).is_err());
    assert!(kb.node_count() > 0);
    assert_eq!(kb.network().count_by_kind("terminal"), 0);
}
