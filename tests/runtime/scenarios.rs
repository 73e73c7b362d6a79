//! The Mark / Edson / Mario scenarios.

use trellis_foundation::{ObjectType, Value};
use trellis_model::{Condition, Extractor, Pattern, Rule, Variable, average, sum};
use trellis_network::KnowledgeBase;
use trellis_runtime::Session;

use crate::{collect, name_of, older, people, person};

fn run(kb: &KnowledgeBase) -> usize {
    let mut session = Session::new(kb);
    for p in people() {
        session.insert(p);
    }
    session.fire_all_rules().unwrap()
}

#[test]
fn single_alpha_filter() {
    let mark = person("mark");
    let (consequence, seen) = collect(vec![mark.clone()]);
    let rule = Rule::new(
        "find-mark",
        Pattern::filter(&mark).with("name == Mark", |v| Ok(name_of(v) == Some("Mark"))),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    assert_eq!(run(&kb), 1);
    assert_eq!(*seen.lock().unwrap(), vec![vec![crate::fact("Mark", 37)]]);
}

#[test]
fn beta_join_finds_older_person() {
    let mark = person("mark");
    let other = person("older");
    let (consequence, seen) = collect(vec![other.clone(), mark.clone()]);
    let rule = Rule::new(
        "older-than-mark",
        Condition::and([
            Pattern::filter(&mark)
                .with("name == Mark", |v| Ok(name_of(v) == Some("Mark")))
                .into(),
            Pattern::filter(&other)
                .with("name != Mark", |v| Ok(name_of(v) != Some("Mark")))
                .join("older.age > mark.age", &mark, older)
                .into(),
        ]),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    assert_eq!(run(&kb), 1);
    let seen = seen.lock().unwrap();
    let names: Vec<Option<&str>> = seen[0].iter().map(name_of).collect();
    assert_eq!(names, vec![Some("Mario"), Some("Mark")]);
}

#[test]
fn not_finds_the_oldest() {
    let x = person("x");
    let other = person("other");
    let (consequence, seen) = collect(vec![x.clone()]);
    let rule = Rule::new(
        "oldest",
        Condition::and([
            Pattern::filter(&x).into(),
            Pattern::not(&other)
                .join("other.age > x.age", &x, older)
                .into(),
        ]),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    assert_eq!(run(&kb), 1);
    assert_eq!(*seen.lock().unwrap(), vec![vec![crate::fact("Mario", 40)]]);
}

#[test]
fn accumulate_sums_and_averages() {
    let p = person("p");
    let total = Variable::new("total", ObjectType::Int);
    let mean = Variable::new("mean", ObjectType::Float);
    let (consequence, seen) = collect(vec![total.clone(), mean.clone()]);
    let rule = Rule::new(
        "m-ages",
        Pattern::accumulate(
            &p,
            vec![
                sum(Extractor::field("age")).bind(&total),
                average(Extractor::field("age")).bind(&mean),
            ],
        )
        .with("name starts with M", |v| {
            Ok(name_of(v).is_some_and(|n| n.starts_with('M')))
        }),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    assert_eq!(run(&kb), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec![Value::Int(77), Value::Float(38.5)]]
    );
}

#[test]
fn same_pattern_twice_keeps_node_counts() {
    let build = |name: &str| {
        let mark = person("mark");
        Rule::new(
            name,
            Pattern::filter(&mark).with("name == Mark", |v| Ok(name_of(v) == Some("Mark"))),
            collect(vec![mark.clone()]).0,
        )
    };
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&build("first")).unwrap();
    let object_types = kb.network().count_by_kind("object-type");
    let alphas = kb.network().count_by_kind("alpha");
    kb.add_rule(&build("second")).unwrap();
    assert_eq!(kb.network().count_by_kind("object-type"), object_types);
    assert_eq!(kb.network().count_by_kind("alpha"), alphas);

    // Both rules still see Mark.
    assert_eq!(run(&kb), 2);
}

#[test]
fn exists_fires_once_per_left_match() {
    let x = person("x");
    let other = person("other");
    let (consequence, seen) = collect(vec![x.clone()]);
    let rule = Rule::new(
        "has-elder",
        Condition::and([
            Pattern::filter(&x).into(),
            Pattern::exists(&other)
                .join("other.age > x.age", &x, older)
                .into(),
        ]),
        consequence,
    );
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&rule).unwrap();

    assert_eq!(run(&kb), 2);
    let mut names: Vec<String> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|row| name_of(&row[0]).map(str::to_string))
        .collect();
    names.sort();
    assert_eq!(names, vec!["Edson".to_string(), "Mark".to_string()]);
}

#[test]
fn rule_without_patterns_fires_once() {
    let (consequence, seen) = collect(vec![]);
    let mut kb = KnowledgeBase::new();
    kb.add_rule(&Rule::new("always", Condition::and(Vec::new()), consequence))
        .unwrap();
    assert_eq!(run(&kb), 1);
    assert_eq!(seen.lock().unwrap().len(), 1);
}
