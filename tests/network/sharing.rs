//! Node sharing between rules.

use trellis_foundation::ObjectType;
use trellis_model::{Condition, DataSource, Pattern, Rule, Variable};
use trellis_network::{BuildConfig, KnowledgeBase, NodeKind};

use crate::fixtures::{mark_pattern, name_is_not, noop, older, person};

#[test]
fn identical_alpha_chains_are_shared() {
    let mut kb = KnowledgeBase::new();
    let a = person("a");
    kb.add_rule(&Rule::new("first", mark_pattern(&a), noop(vec![a.clone()])))
        .unwrap();
    let object_types = kb.network().count_by_kind("object-type");
    let alphas = kb.network().count_by_kind("alpha");
    let before = kb.node_count();

    let b = person("b");
    kb.add_rule(&Rule::new("second", mark_pattern(&b), noop(vec![b.clone()])))
        .unwrap();

    assert_eq!(kb.network().count_by_kind("object-type"), object_types);
    assert_eq!(kb.network().count_by_kind("alpha"), alphas);
    // Only the terminal is new.
    assert_eq!(kb.node_count(), before + 1);
    assert_eq!(kb.network().count_by_kind("terminal"), 2);
}

#[test]
fn same_rule_twice_does_not_double_nodes() {
    let mark = person("mark");
    let other = person("older");
    let rule = Rule::new(
        "beta",
        Condition::and([
            mark_pattern(&mark).into(),
            Pattern::filter(&other)
                .with("name != Mark", name_is_not("Mark"))
                .join("older.age > mark.age", &mark, older)
                .into(),
        ]),
        noop(vec![other.clone(), mark.clone()]),
    );

    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();
    let counts = |kb: &KnowledgeBase| {
        (
            kb.network().count_by_kind("object-type"),
            kb.network().count_by_kind("alpha"),
            kb.network().count_by_kind("join"),
        )
    };
    let first = counts(&kb);
    kb.add_rule(&rule).unwrap();
    assert_eq!(counts(&kb), first);
    assert_eq!(first, (1, 2, 1));
}

#[test]
fn diverging_filters_branch_the_chain() {
    let mut kb = KnowledgeBase::new();
    let a = person("a");
    let b = person("b");
    kb.add_rule(&Rule::new("mark", mark_pattern(&a), noop(vec![])))
        .unwrap();
    kb.add_rule(&Rule::new(
        "not-mark",
        Pattern::filter(&b).with("name != Mark", name_is_not("Mark")),
        noop(vec![]),
    ))
    .unwrap();

    assert_eq!(kb.network().count_by_kind("object-type"), 1);
    assert_eq!(kb.network().count_by_kind("alpha"), 2);
    assert_eq!(kb.network().count_by_kind("left-input-adapter"), 2);
}

#[test]
fn no_sharing_keeps_roots_and_object_types_shared() {
    let mut kb = KnowledgeBase::with_config(BuildConfig::no_sharing());
    let a = person("a");
    let b = person("b");
    kb.add_rule(&Rule::new("a", mark_pattern(&a), noop(vec![])))
        .unwrap();
    kb.add_rule(&Rule::new("b", mark_pattern(&b), noop(vec![])))
        .unwrap();

    assert_eq!(kb.network().count_by_kind("entry-point"), 1);
    assert_eq!(kb.network().count_by_kind("object-type"), 1);
    assert_eq!(kb.network().count_by_kind("alpha"), 2);
    assert_eq!(kb.network().count_by_kind("left-input-adapter"), 2);
}

#[test]
fn stream_roots_are_shared_by_name() {
    let mut kb = KnowledgeBase::new();
    for name in ["a", "b", "c"] {
        let t = Variable::new("t", ObjectType::Int);
        kb.add_rule(&Rule::new(
            name,
            Pattern::filter(&t).from(DataSource::stream("ticks")),
            noop(vec![]),
        ))
        .unwrap();
    }
    let root = kb.stream_root("ticks").unwrap();
    assert_eq!(kb.network().count_by_kind("stream"), 1);
    match kb.network().node(root).unwrap().kind() {
        NodeKind::StreamRoot { object_type, .. } => assert_eq!(object_type, &ObjectType::Int),
        other => panic!("unexpected {other:?}"),
    }
    // An entry point with the same name is a different root.
    let p = person("p");
    kb.add_rule(&Rule::new(
        "polled",
        Pattern::filter(&p).from(DataSource::entry_point("ticks")),
        noop(vec![]),
    ))
    .unwrap();
    assert_ne!(kb.entry_point("ticks"), Some(root));
    assert!(kb.entry_point("ticks").is_some());
}

#[test]
fn terminals_are_never_shared() {
    let mut kb = KnowledgeBase::new();
    let a = person("a");
    let first = kb
        .add_rule(&Rule::new("same", mark_pattern(&a), noop(vec![])))
        .unwrap();
    let second = kb
        .add_rule(&Rule::new("same", mark_pattern(&a), noop(vec![])))
        .unwrap();
    assert_ne!(first.terminal, second.terminal);
    assert_eq!(kb.network().terminals(), vec![first.terminal, second.terminal]);
}
