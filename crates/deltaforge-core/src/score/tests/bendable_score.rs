use crate::score::*;

#[test]
fn test_hard_and_soft_views() {
    let score = BendableScore::of(vec![-1, -2], vec![-10, -20, -30]);
    assert_eq!((score.hard_levels_count(), score.soft_levels_count()), (2, 3));
    assert_eq!(score.hard_scores(), &[-1, -2]);
    assert_eq!(score.soft_score(2), -30);
    assert_eq!(score.to_level_numbers(), vec![-1, -2, -10, -20, -30]);
}

#[test]
fn test_unit_scores() {
    assert_eq!(BendableScore::one_hard(2, 1, 1), BendableScore::of(vec![0, 1], vec![0]));
    assert_eq!(BendableScore::one_soft(2, 1, 0), BendableScore::of(vec![0, 0], vec![1]));
}

#[test]
fn test_earlier_levels_dominate() {
    let hard_broken = BendableScore::of(vec![-1, 0], vec![0]);
    let second_hard = BendableScore::of(vec![0, -100], vec![-1000]);
    let soft_only = BendableScore::of(vec![0, 0], vec![-1000]);
    assert!(hard_broken < second_hard);
    assert!(second_hard < soft_only);
    assert!(!second_hard.is_feasible());
    assert!(soft_only.is_feasible());
}

#[test]
fn test_arithmetic_keeps_shape() {
    let total = BendableScore::of(vec![-1], vec![-10, -20]) + BendableScore::of(vec![-2], vec![-5, -10]);
    assert_eq!(total, BendableScore::of(vec![-3], vec![-15, -30]));
    assert_eq!((-total.clone()).soft_scores(), &[15, 30]);
    assert_eq!(total.abs().hard_scores(), &[3]);
}

#[test]
fn test_shape_preserving_levels() {
    let shape = BendableScore::zero_with_levels(1, 2);
    let score = shape.with_level_numbers(&[-1, -2, -3]);
    assert_eq!(score, BendableScore::of(vec![-1], vec![-2, -3]));
    assert_eq!(score.zeroed(), shape);
    assert_eq!(score.level_label(0), ScoreLevel::Hard);
    assert_eq!(score.level_label(2), ScoreLevel::Soft);
}

#[test]
#[should_panic(expected = "Incompatible")]
fn test_incompatible_shapes_panic() {
    let _ = BendableScore::of(vec![0], vec![0]) + BendableScore::of(vec![0, 0], vec![0]);
}

#[test]
fn test_text_form() {
    let score = BendableScore::parse(" [0/-1]hard/[-3]soft ").unwrap();
    assert_eq!(score, BendableScore::of(vec![0, -1], vec![-3]));
    assert_eq!(score.to_string(), "[0/-1]hard/[-3]soft");
    assert_eq!(BendableScore::parse("[]hard/[2]soft").unwrap(), BendableScore::of(vec![], vec![2]));
    assert!(BendableScore::parse("[0]hard/[-3]").is_err());
    assert!(BendableScore::parse("0hard/-3soft").is_err());
}
