//! Constraint classification and adapter insertion.

use proptest::prelude::*;
use trellis_model::{Constraint, Predicate, SingleConstraint, Variable};
use trellis_network::{BuildContext, ConstraintClass, ReteBuilder, classify, partition};

use crate::fixtures::person;

fn single(key: &str, variables: Vec<Variable>) -> Constraint {
    Constraint::single(Predicate::new(key, |_| Ok(true)), variables)
}

fn single_ref(constraint: &Constraint) -> &SingleConstraint {
    constraint.singles()[0]
}

/// A context in which `bound` is already bound.
fn context_with(bound: &Variable) -> BuildContext {
    let mut ctx = BuildContext::new("r");
    ctx.bind(bound);
    ctx
}

#[test]
fn own_variable_only_is_alpha() {
    let own = person("own");
    let ctx = BuildContext::new("r");
    let c = single("own.age > 30", vec![own.clone()]);
    assert_eq!(classify(single_ref(&c), &own, &ctx).unwrap(), ConstraintClass::Alpha);
}

#[test]
fn other_bound_variable_is_beta() {
    let own = person("own");
    let other = person("other");
    let ctx = context_with(&other);
    let c = single("own.age > other.age", vec![own.clone(), other.clone()]);
    assert_eq!(classify(single_ref(&c), &own, &ctx).unwrap(), ConstraintClass::Beta);
}

#[test]
fn no_variables_is_constant() {
    let own = person("own");
    let ctx = BuildContext::new("r");
    let c = single("true", vec![]);
    assert_eq!(classify(single_ref(&c), &own, &ctx).unwrap(), ConstraintClass::Constant);
}

#[test]
fn unbound_variable_is_structural() {
    let own = person("own");
    let stranger = person("stranger");
    let ctx = BuildContext::new("r");
    let c = single("own == stranger", vec![own.clone(), stranger]);
    assert!(classify(single_ref(&c), &own, &ctx).unwrap_err().is_structural());
}

#[test]
fn adapter_is_inserted_once() {
    let own = person("own");
    let mut builder = ReteBuilder::default();
    let mut ctx = BuildContext::new("r");
    builder
        .compile(&trellis_model::Pattern::filter(&own).into(), &mut ctx)
        .unwrap();
    let first = ctx.tuple_cursor().unwrap();
    let nodes = builder.network().len();
    for _ in 0..3 {
        assert_eq!(builder.ensure_left_input_adapter(&mut ctx).unwrap(), first);
    }
    assert_eq!(builder.network().len(), nodes);
    assert_eq!(builder.network().count_by_kind("left-input-adapter"), 1);
}

proptest! {
    #[test]
    fn classification_ignores_declaration_order(
        mask in proptest::collection::vec(any::<bool>(), 1..10)
    ) {
        let own = person("own");
        let other = person("other");
        let ctx = context_with(&other);

        let mut conjunction = Constraint::none();
        for (i, is_beta) in mask.iter().enumerate() {
            let vars = if *is_beta {
                vec![own.clone(), other.clone()]
            } else {
                vec![own.clone()]
            };
            conjunction = conjunction.and(single(&format!("c{i}"), vars));
        }
        let classified = partition(&conjunction, &own, &ctx).unwrap();

        let betas = mask.iter().filter(|b| **b).count();
        prop_assert_eq!(classified.beta.len(), betas);
        prop_assert_eq!(classified.alpha.len(), mask.len() - betas);
        prop_assert!(classified.constant.is_empty());
        for beta in &classified.beta {
            prop_assert_eq!(beta.variables.len(), 2);
        }
    }
}
