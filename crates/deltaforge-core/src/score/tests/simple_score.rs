use crate::score::*;

#[test]
fn test_feasible_from_zero_up() {
    assert!(SimpleScore::ZERO.is_feasible());
    assert!(SimpleScore::of(3).is_feasible());
    assert!(!SimpleScore::of(-1).is_feasible());
}

#[test]
fn test_higher_is_better() {
    let mut scores = vec![SimpleScore::of(0), SimpleScore::of(-7), SimpleScore::of(-2)];
    scores.sort();
    assert_eq!(scores, vec![SimpleScore::of(-7), SimpleScore::of(-2), SimpleScore::of(0)]);
    assert!(SimpleScore::of(-7).is_worse_than(&SimpleScore::of(-2)));
}

#[test]
fn test_impacts_add_and_undo() {
    let total = SimpleScore::ZERO + SimpleScore::of(-4) + SimpleScore::of(-2);
    assert_eq!(total.score(), -6);
    assert_eq!(total - SimpleScore::of(-4), SimpleScore::of(-2));
    assert_eq!(-total, SimpleScore::of(6));
    assert_eq!(total.abs(), SimpleScore::of(6));
}

#[test]
fn test_parse_accepts_bare_and_init_forms() {
    assert_eq!(SimpleScore::parse(" -12 ").unwrap(), SimpleScore::of(-12));
    assert_eq!(SimpleScore::parse("0init").unwrap(), SimpleScore::ZERO);
    assert!(SimpleScore::parse("ten").is_err());
    assert!(SimpleScore::parse("1/2").is_err());
}

#[test]
fn test_single_level_round_trip() {
    let score = SimpleScore::of(-5);
    assert_eq!(score.to_string(), "-5");
    assert_eq!(score.levels_count(), 1);
    assert_eq!(score.level_label(0), ScoreLevel::Hard);
    assert_eq!(SimpleScore::ONE.with_level_numbers(&score.to_level_numbers()), score);
    assert_eq!(score.zeroed(), SimpleScore::ZERO);
}
