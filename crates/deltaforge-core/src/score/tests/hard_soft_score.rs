use std::cmp::Ordering;

use crate::score::*;

#[test]
fn test_level_accessors() {
    let score = HardSoftScore::of(-2, -100);
    assert_eq!((score.hard(), score.soft()), (-2, -100));
    assert_eq!(score.hard_score(), HardSoftScore::of_hard(-2));
    assert_eq!(score.soft_score(), HardSoftScore::of_soft(-100));
    assert_eq!(HardSoftScore::ONE_HARD, HardSoftScore::of(1, 0));
}

#[test]
fn test_feasibility_ignores_soft() {
    assert!(HardSoftScore::of(0, -1000).is_feasible());
    assert!(!HardSoftScore::of(-1, 500).is_feasible());
}

#[test]
fn test_hard_dominates_soft() {
    let broken = HardSoftScore::of(-1, 0);
    let costly = HardSoftScore::of(0, -1000);
    assert!(costly.is_better_than(&broken));
    assert_eq!(costly.compare(&HardSoftScore::of(0, -999)), Ordering::Less);
    assert!(HardSoftScore::of(0, -5).is_equal_to(&HardSoftScore::of_soft(-5)));
}

#[test]
fn test_impacts_add_per_level() {
    let mut total = HardSoftScore::ZERO;
    total = total + HardSoftScore::of_hard(-1) + HardSoftScore::of_soft(-30);
    assert_eq!(total, HardSoftScore::of(-1, -30));
    assert_eq!(total - HardSoftScore::of(-1, -10), HardSoftScore::of(0, -20));
    assert_eq!(-total, HardSoftScore::of(1, 30));
}

#[test]
fn test_text_form() {
    let score = HardSoftScore::of(-1, -100);
    assert_eq!(score.to_string(), "-1hard/-100soft");
    assert_eq!(HardSoftScore::parse(&score.to_string_repr()).unwrap(), score);
    assert_eq!(HardSoftScore::parse("0hard / 3soft").unwrap(), HardSoftScore::of_soft(3));
}

#[test]
fn test_parse_rejects_wrong_levels() {
    assert!(HardSoftScore::parse("-1hard").is_err());
    assert!(HardSoftScore::parse("-1medium/0soft").is_err());
    assert!(HardSoftScore::parse("0hard/xsoft").is_err());
}

#[test]
fn test_level_numbers() {
    let score = HardSoftScore::of(-2, -50);
    assert_eq!(score.to_level_numbers(), vec![-2, -50]);
    assert_eq!(HardSoftScore::ZERO.with_level_numbers(&[-2, -50]), score);
    assert_eq!(score.level_label(1), ScoreLevel::Soft);
}

#[test]
#[should_panic(expected = "requires exactly 2 levels")]
fn test_with_level_numbers_rejects_wrong_arity() {
    HardSoftScore::ZERO.with_level_numbers(&[1, 2, 3]);
}
