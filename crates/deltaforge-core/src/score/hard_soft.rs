//! Two-level hard/soft scores.

use rust_decimal::Decimal;

level_score! {
    /// A score split into a hard level and a soft level.
    ///
    /// The hard level decides feasibility. Soft only breaks ties between
    /// scores with the same hard level.
    ///
    /// # Examples
    ///
    /// ```
    /// use deltaforge_core::HardSoftScore;
    ///
    /// let broken = HardSoftScore::of(-1, -100);
    /// let feasible = HardSoftScore::of(0, -200);
    /// assert!(feasible > broken);
    /// assert!(HardSoftScore::of(0, -50) > feasible);
    /// ```
    HardSoftScore(i64) {
        hard: Hard => "hard", ONE_HARD, of_hard;
        soft: Soft => "soft", ONE_SOFT, of_soft;
    }
}

impl HardSoftScore {
    /// The hard level alone.
    pub const fn hard_score(&self) -> HardSoftScore {
        HardSoftScore::of_hard(self.hard)
    }

    /// The soft level alone.
    pub const fn soft_score(&self) -> HardSoftScore {
        HardSoftScore::of_soft(self.soft)
    }
}

level_score! {
    /// [`HardSoftScore`] with exact decimal levels, so fractional weights
    /// such as `0.25soft` add up without drift.
    HardSoftDecimalScore(Decimal) {
        hard: Hard => "hard", ONE_HARD, of_hard;
        soft: Soft => "soft", ONE_SOFT, of_soft;
    }
}

impl HardSoftDecimalScore {
    pub fn of_integers(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore::of(Decimal::from(hard), Decimal::from(soft))
    }
}
