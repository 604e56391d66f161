//! Single-level scores.

use rust_decimal::Decimal;

level_score! {
    /// A score with one integer level.
    ///
    /// Useful when every constraint weighs on the same scale.
    ///
    /// # Examples
    ///
    /// ```
    /// use deltaforge_core::{Score, SimpleScore};
    ///
    /// let worse = SimpleScore::of(-5);
    /// let better = SimpleScore::of(-3);
    /// assert!(better > worse);
    /// assert!(!worse.is_feasible());
    /// ```
    SimpleScore(i64) {
        score: Hard => "";
    }
}

impl SimpleScore {
    /// A score of one, the usual constraint weight.
    pub const ONE: SimpleScore = SimpleScore::of(1);
}

level_score! {
    /// A single-level score with an exact decimal value.
    ///
    /// ```
    /// use deltaforge_core::{Score, SimpleDecimalScore};
    /// use rust_decimal::Decimal;
    ///
    /// let score = SimpleDecimalScore::of(Decimal::new(-15, 1));
    /// assert_eq!(score.to_string(), "-1.5");
    /// assert!(!score.is_feasible());
    /// ```
    SimpleDecimalScore(Decimal) {
        score: Hard => "";
    }
}

impl SimpleDecimalScore {
    pub const ONE: SimpleDecimalScore = SimpleDecimalScore::of(Decimal::ONE);
}
