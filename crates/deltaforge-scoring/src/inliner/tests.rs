use std::rc::Rc;

use deltaforge_core::{BendableScore, ConstraintRef, HardMediumSoftScore, HardSoftScore, Score};

use super::*;
use crate::fact::FactRef;

fn inliner(match_enabled: bool) -> (ScoreInliner<HardSoftScore>, usize, usize) {
    let mut inliner = ScoreInliner::new(HardSoftScore::ZERO, match_enabled);
    let hard = inliner.add_constraint(ConstraintRef::new("", "Overlap"), HardSoftScore::of_hard(-2));
    let soft = inliner.add_constraint(ConstraintRef::new("", "Preference"), HardSoftScore::of_soft(3));
    (inliner, hard, soft)
}

#[test]
fn test_impacter_shape_follows_weight() {
    assert_eq!(
        WeightedScoreImpacter::for_weight(&[0_i64, -2, 0]),
        WeightedScoreImpacter::SingleLevel { level: 1, weight: -2 }
    );
    assert_eq!(
        WeightedScoreImpacter::for_weight(&[1_i64, 0, -1]),
        WeightedScoreImpacter::MultiLevel {
            weights: vec![1, 0, -1]
        }
    );
}

#[test]
fn test_apply_and_revert_restore_totals() {
    let (mut inliner, hard, soft) = inliner(false);
    let a = inliner.apply(Impact {
        constraint: hard,
        match_weight: 1,
        facts: &[],
    });
    let b = inliner.apply(Impact {
        constraint: soft,
        match_weight: 4,
        facts: &[],
    });
    assert_eq!(inliner.score(), HardSoftScore::of(-2, 12));
    assert_eq!(inliner.constraint_score(soft), Some(HardSoftScore::of_soft(12)));
    assert_eq!(inliner.match_count(hard), 1);

    inliner.revert(b).unwrap();
    assert_eq!(inliner.score(), HardSoftScore::of_hard(-2));
    inliner.revert(a).unwrap();
    assert_eq!(inliner.score(), HardSoftScore::ZERO);
    assert_eq!(inliner.match_count(hard), 0);
    assert_eq!(inliner.extract_score(3).unassigned_count(), 3);
}

#[test]
fn test_multi_level_weight_touches_every_level() {
    let mut inliner = ScoreInliner::new(HardMediumSoftScore::ZERO, false);
    let c = inliner.add_constraint(ConstraintRef::new("", "Mixed"), HardMediumSoftScore::of(-1, 0, 5));
    assert!(matches!(inliner.impacter(c), Some(WeightedScoreImpacter::MultiLevel { .. })));

    let undo = inliner.apply(Impact {
        constraint: c,
        match_weight: 2,
        facts: &[],
    });
    assert_eq!(inliner.score(), HardMediumSoftScore::of(-2, 0, 10));
    inliner.revert(undo).unwrap();
    assert!(inliner.score().is_zero());
}

#[test]
fn test_bendable_totals_keep_shape() {
    let zero = BendableScore::zero_with_levels(1, 2);
    let mut inliner = ScoreInliner::new(zero, false);
    let c = inliner.add_constraint(ConstraintRef::new("", "Soft 2"), BendableScore::of(vec![0], vec![0, -1]));
    inliner.apply(Impact {
        constraint: c,
        match_weight: 7,
        facts: &[],
    });
    assert_eq!(inliner.score(), BendableScore::of(vec![0], vec![0, -7]));
}

#[test]
fn test_matches_recorded_in_insertion_order() {
    let (mut inliner, hard, soft) = inliner(true);
    let x: FactRef = Rc::new("x");
    let y: FactRef = Rc::new("y");

    let first = inliner.apply(Impact {
        constraint: hard,
        match_weight: 1,
        facts: &[x.clone(), y.clone()],
    });
    inliner.apply(Impact {
        constraint: hard,
        match_weight: 3,
        facts: &[y.clone()],
    });
    inliner.revert(first).unwrap();
    inliner.apply(Impact {
        constraint: hard,
        match_weight: 1,
        facts: &[x.clone()],
    });

    let totals = inliner.constraint_match_totals();
    let overlap = &totals["Overlap"];
    assert_eq!(overlap.score, HardSoftScore::of_hard(-8));
    let scores: Vec<_> = overlap.matches.iter().map(|m| m.score.clone()).collect();
    assert_eq!(scores, vec![HardSoftScore::of_hard(-6), HardSoftScore::of_hard(-2)]);

    // Constraints without matches are still reported.
    let preference = &totals["Preference"];
    assert_eq!(preference.match_count(), 0);
    assert_eq!(preference.weight, HardSoftScore::of_soft(3));
    let _ = soft;

    let indictments = inliner.indictment_map();
    assert_eq!(indictments.len(), 2);
    assert_eq!(indictments.get(&y).unwrap().score, HardSoftScore::of_hard(-6));
    assert_eq!(indictments.get(&x).unwrap().score, HardSoftScore::of_hard(-2));
}

#[test]
fn test_fact_totals_follow_apply_and_revert() {
    let (mut inliner, hard, soft) = inliner(true);
    let x: FactRef = Rc::new("x");
    let y: FactRef = Rc::new("y");

    let pair = inliner.apply(Impact {
        constraint: hard,
        match_weight: 1,
        facts: &[x.clone(), y.clone()],
    });
    // Named twice by one match, charged once.
    let twice = inliner.apply(Impact {
        constraint: soft,
        match_weight: 2,
        facts: &[x.clone(), x.clone()],
    });
    assert_eq!(inliner.indictment_score(&x), Some(HardSoftScore::of(-2, 6)));
    assert_eq!(inliner.indictment_score(&y), Some(HardSoftScore::of_hard(-2)));
    assert_eq!(inliner.indicted_match_count(&x), 2);
    assert_eq!(inliner.indicted_fact_count(), 2);

    inliner.revert(pair).unwrap();
    assert_eq!(inliner.indictment_score(&x), Some(HardSoftScore::of_soft(6)));
    assert_eq!(inliner.indictment_score(&y), None);
    assert_eq!(inliner.indicted_fact_count(), 1);

    let indictments = inliner.indictment_map();
    assert_eq!(indictments.len(), 1);
    let indictment = indictments.get(&x).unwrap();
    assert_eq!(indictment.score, HardSoftScore::of_soft(6));
    assert_eq!(indictment.match_count(), 1);

    inliner.revert(twice).unwrap();
    assert_eq!(inliner.indicted_fact_count(), 0);
    assert!(inliner.indictment_map().is_empty());
}

#[test]
fn test_match_tracking_disabled_keeps_no_matches() {
    let (mut inliner, hard, _) = inliner(false);
    let x: FactRef = Rc::new(1_u8);
    inliner.apply(Impact {
        constraint: hard,
        match_weight: 1,
        facts: &[x],
    });
    assert!(inliner.constraint_match_totals()["Overlap"].matches.is_empty());
    assert!(inliner.indictment_map().is_empty());
    let other: FactRef = Rc::new(2_u8);
    assert_eq!(inliner.indictment_score(&other), None);
}

#[test]
fn test_custom_justification() {
    let (mut inliner, hard, _) = inliner(true);
    inliner.set_justification(
        hard,
        Arc::new(|facts: &[FactRef], score: &HardSoftScore| {
            Some(Rc::new(format!("{} facts, {score}", facts.len())) as Rc<dyn Justification>)
        }),
    );
    let x: FactRef = Rc::new('x');
    inliner.apply(Impact {
        constraint: hard,
        match_weight: 1,
        facts: &[x],
    });

    let totals = inliner.constraint_match_totals();
    let justification = totals["Overlap"].matches[0].justification_as::<String>().cloned();
    assert_eq!(justification.as_deref(), Some("1 facts, -2hard/0soft"));
}
