//! Three-level hard/medium/soft scores.

use rust_decimal::Decimal;

level_score! {
    /// A score with hard, medium and soft levels.
    ///
    /// Medium sits between feasibility and preference, typically for
    /// "assign as much as possible" constraints.
    ///
    /// ```
    /// use deltaforge_core::HardMediumSoftScore;
    ///
    /// let unassigned = HardMediumSoftScore::of(0, -3, 0);
    /// let costly = HardMediumSoftScore::of(0, -1, -500);
    /// assert!(costly > unassigned);
    /// ```
    HardMediumSoftScore(i64) {
        hard: Hard => "hard", ONE_HARD, of_hard;
        medium: Medium => "medium", ONE_MEDIUM, of_medium;
        soft: Soft => "soft", ONE_SOFT, of_soft;
    }
}

level_score! {
    HardMediumSoftDecimalScore(Decimal) {
        hard: Hard => "hard", ONE_HARD, of_hard;
        medium: Medium => "medium", ONE_MEDIUM, of_medium;
        soft: Soft => "soft", ONE_SOFT, of_soft;
    }
}

impl HardMediumSoftDecimalScore {
    pub fn of_integers(hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftDecimalScore::of(Decimal::from(hard), Decimal::from(medium), Decimal::from(soft))
    }
}
