//! Tuple offset assignment.

use proptest::prelude::*;
use trellis_foundation::ObjectType;
use trellis_model::{Condition, Extractor, Invocation, Pattern, Rule, Variable, count, sum};
use trellis_network::{BuildContext, KnowledgeBase, NodeKind, ReteBuilder};

use crate::fixtures::{mark_pattern, noop, older, person};

fn terminal_bindings(kb: &KnowledgeBase, rule: &str) -> Vec<usize> {
    let handle = kb.rule(rule).unwrap();
    match kb.network().node(handle.terminal).unwrap().kind() {
        NodeKind::Terminal { bindings, .. } => bindings.clone(),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn offsets_follow_binding_order() {
    let a = person("a");
    let b = person("b");
    let c = person("c");
    let rule = Rule::new(
        "three",
        Condition::and([
            Pattern::filter(&a).into(),
            Pattern::filter(&b).into(),
            Pattern::filter(&c).join("c > a", &a, older).into(),
        ]),
        noop(vec![c.clone(), b.clone(), a.clone()]),
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();
    assert_eq!(terminal_bindings(&kb, "three"), vec![2, 1, 0]);
}

#[test]
fn existential_and_initial_fact_consume_offsets() {
    let x = person("x");
    let other = person("other");
    let total = Variable::new("total", ObjectType::Int);
    let n = Variable::new("n", ObjectType::Int);
    let rule = Rule::new(
        "mixed",
        Condition::and([
            Pattern::exists(&other).into(),
            Pattern::filter(&x).into(),
            Pattern::accumulate(
                &person("p"),
                vec![
                    sum(Extractor::field("age")).bind(&total),
                    count().bind(&n),
                ],
            )
            .into(),
        ]),
        noop(vec![x.clone(), total.clone(), n.clone()]),
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();
    // 0: initial fact, 1: exists pad, 2: x, 3: total, 4: n
    assert_eq!(terminal_bindings(&kb, "mixed"), vec![2, 3, 4]);
}

#[test]
fn invocation_binds_its_target() {
    let mark = person("mark");
    let text = Variable::new("text", ObjectType::String);
    let rule = Rule::new(
        "describe",
        Condition::and([
            mark_pattern(&mark).into(),
            Pattern::invoke(
                &text,
                Invocation::new("describe", vec![mark.clone()], |_| Ok("x".into())),
            )
            .into(),
        ]),
        noop(vec![text.clone(), mark.clone()]),
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();
    assert_eq!(terminal_bindings(&kb, "describe"), vec![1, 0]);
}

proptest! {
    #[test]
    fn offsets_are_strictly_increasing(n in 1usize..8) {
        let vars: Vec<Variable> = (0..n).map(|i| person(&format!("p{i}"))).collect();
        let view = Condition::and(vars.iter().map(|v| Pattern::filter(v).into()));
        let mut builder = ReteBuilder::default();
        let mut ctx = BuildContext::new("chain");
        builder.compile(&view, &mut ctx).unwrap();

        let offsets: Vec<usize> = ctx.bound().iter().map(|(_, offset)| *offset).collect();
        prop_assert_eq!(offsets.len(), n);
        prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        for (var, (bound, _)) in vars.iter().zip(ctx.bound()) {
            prop_assert_eq!(var, bound);
        }
        prop_assert_eq!(ctx.tuple_len(), n);
    }
}
