use crate::score::*;

#[test]
fn test_fewer_unassigned_always_wins() {
    let partial = InnerScore::new(HardSoftScore::of(10, 10), 1);
    let complete = InnerScore::fully_assigned(HardSoftScore::of(-10, -10));
    assert!(complete > partial);
}

#[test]
fn test_same_unassigned_compares_raw_score() {
    let a = InnerScore::new(SimpleScore::of(-3), 2);
    let b = InnerScore::new(SimpleScore::of(-1), 2);
    assert!(b > a);
}

#[test]
fn test_feasibility_requires_full_assignment() {
    assert!(!InnerScore::new(SimpleScore::of(0), 1).is_feasible());
    assert!(InnerScore::fully_assigned(SimpleScore::of(0)).is_feasible());
}

#[test]
fn test_display() {
    assert_eq!(InnerScore::new(SimpleScore::of(-4), 3).to_string(), "-3init/-4");
    assert_eq!(InnerScore::fully_assigned(SimpleScore::of(-4)).to_string(), "-4");
}
