use std::rc::Rc;

use deltaforge_config::SessionConfig;
use deltaforge_core::{ConstraintRef, HardSoftScore};

use super::*;
use crate::fact::FactRef;

#[derive(Debug)]
struct Shift(&'static str);

fn constraint_match(name: &str, score: HardSoftScore, facts: &[&FactRef]) -> ConstraintMatch<HardSoftScore> {
    let facts: Vec<FactRef> = facts.iter().map(|f| (*f).clone()).collect();
    ConstraintMatch {
        constraint_ref: ConstraintRef::new("", name),
        score,
        justification: Rc::new(DefaultJustification { facts: facts.clone() }),
        indicted_facts: facts,
    }
}

#[test]
fn test_indictments_in_first_appearance_order() {
    let a: FactRef = Rc::new(Shift("a"));
    let b: FactRef = Rc::new(Shift("b"));
    let c: FactRef = Rc::new(Shift("c"));

    let matches = vec![
        constraint_match("Overlap", HardSoftScore::of_hard(-1), &[&b, &a]),
        constraint_match("Overlap", HardSoftScore::of_hard(-1), &[&c, &a]),
        constraint_match("Preference", HardSoftScore::of_soft(-3), &[&c]),
    ];
    let map = IndictmentMap::from_matches(&HardSoftScore::ZERO, &matches);

    let order: Vec<_> = map.iter().map(|i| format!("{:?}", i.fact)).collect();
    assert_eq!(order, vec!["Shift(\"b\")", "Shift(\"a\")", "Shift(\"c\")"]);

    let a_indictment = map.get(&a).unwrap();
    assert_eq!(a_indictment.score, HardSoftScore::of_hard(-2));
    assert_eq!(a_indictment.match_count(), 2);
    assert_eq!(a_indictment.constraint_count(), 1);

    let c_indictment = map.get(&c).unwrap();
    assert_eq!(c_indictment.score, HardSoftScore::of(-1, -3));
    assert_eq!(c_indictment.constraint_count(), 2);

    assert_eq!(format!("{:?}", map.worst()[0].fact), "Shift(\"a\")");
}

#[test]
fn test_fact_blamed_twice_by_one_match_counts_once() {
    let a: FactRef = Rc::new(Shift("a"));
    let matches = vec![constraint_match("Self", HardSoftScore::of_soft(-1), &[&a, &a])];
    let map = IndictmentMap::from_matches(&HardSoftScore::ZERO, &matches);

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&a).unwrap().score, HardSoftScore::of_soft(-1));
}

#[test]
fn test_custom_justification_downcast() {
    #[derive(Debug, PartialEq)]
    struct Clash {
        room: u32,
    }

    let m = ConstraintMatch {
        constraint_ref: ConstraintRef::new("timetable", "Room conflict"),
        score: HardSoftScore::of_hard(-1),
        justification: Rc::new(Clash { room: 4 }),
        indicted_facts: Vec::new(),
    };
    assert_eq!(m.justification_as::<Clash>(), Some(&Clash { room: 4 }));
    assert!(m.justification_as::<DefaultJustification>().is_none());
}

#[test]
fn test_weight_overrides_from_config() {
    let config = SessionConfig::new()
        .with_constraint_weight("Overlap", "2hard/0soft")
        .with_constraint_weight("timetable/Preference", "0hard/5soft");
    let overrides = ConstraintWeightOverrides::<HardSoftScore>::from_config(&config).unwrap();

    assert_eq!(overrides.len(), 2);
    assert_eq!(overrides.get("Overlap"), Some(&HardSoftScore::of_hard(2)));
    assert_eq!(
        overrides.get_or_default("Missing", HardSoftScore::ONE_SOFT),
        HardSoftScore::ONE_SOFT
    );

    let known = vec!["Overlap".to_string()];
    let unknown: Vec<_> = overrides.unknown_ids(&known).collect();
    assert_eq!(unknown, vec!["timetable/Preference"]);
}

#[test]
fn test_weight_overrides_reject_unparseable_weight() {
    let config = SessionConfig::new().with_constraint_weight("Overlap", "heavy");
    assert!(ConstraintWeightOverrides::<HardSoftScore>::from_config(&config).is_err());
}
