use crate::score::*;

#[test]
fn test_three_levels() {
    let score = HardMediumSoftScore::of(-2, -10, -100);
    assert_eq!((score.hard(), score.medium(), score.soft()), (-2, -10, -100));
    assert_eq!(score.levels_count(), 3);
    assert_eq!(score.level_label(1), ScoreLevel::Medium);
}

#[test]
fn test_medium_between_hard_and_soft() {
    assert!(HardMediumSoftScore::of(0, -1000, -1000) > HardMediumSoftScore::of_hard(-1));
    assert!(HardMediumSoftScore::of(0, -5, -1000) > HardMediumSoftScore::of_medium(-10));
    assert!(HardMediumSoftScore::of_medium(-1).is_feasible());
}

#[test]
fn test_text_form() {
    let score = HardMediumSoftScore::parse("0hard/-10medium/-100soft").unwrap();
    assert_eq!(score, HardMediumSoftScore::of(0, -10, -100));
    assert_eq!(score.to_string(), "0hard/-10medium/-100soft");
    assert_eq!(HardMediumSoftScore::ONE_MEDIUM.to_string(), "0hard/1medium/0soft");
    assert!(HardMediumSoftScore::parse("0hard/-1soft/0medium").is_err());
}
