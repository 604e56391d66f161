//! Macros shared by the uni, bi and tri streams.

/// Wraps a typed closure over the facts of a tuple into a closure over the
/// tuple itself. The result is `None` when a fact has an unexpected type.
macro_rules! tuple_fn {
    ($f:ident; $($fact:ident : $index:tt),+) => {
        move |tuple: &$crate::tuple::Tuple| Some($f($(tuple.fact_as::<$fact>($index)?),+))
    };
}

/// Generates `penalize*`, `reward*` and `impact*` for a stream whose
/// tuples hold the listed fact types.
macro_rules! impl_scoring_methods {
    ($($fact:ident : $index:tt),+) => {
        /// Subtracts `weight` from the score for every match.
        pub fn penalize(self, weight: Sc) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc> {
            self.terminal(weight, deltaforge_core::ImpactType::Penalty, $crate::node::MatchWeigher::Unit)
        }

        /// Subtracts `weight × match_weight` for every match.
        pub fn penalize_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc>
        where
            W: Fn($(&$fact),+) -> i64 + Send + Sync + 'static,
        {
            self.terminal(
                weight,
                deltaforge_core::ImpactType::Penalty,
                $crate::node::MatchWeigher::Long(std::sync::Arc::new(tuple_fn!(match_weight; $($fact : $index),+))),
            )
        }

        /// Like [`penalize_with`](Self::penalize_with) with a decimal match
        /// weight; only valid for decimal scores.
        pub fn penalize_decimal_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc>
        where
            W: Fn($(&$fact),+) -> rust_decimal::Decimal + Send + Sync + 'static,
        {
            self.terminal(
                weight,
                deltaforge_core::ImpactType::Penalty,
                $crate::node::MatchWeigher::Decimal(std::sync::Arc::new(tuple_fn!(match_weight; $($fact : $index),+))),
            )
        }

        /// Adds `weight` to the score for every match.
        pub fn reward(self, weight: Sc) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc> {
            self.terminal(weight, deltaforge_core::ImpactType::Reward, $crate::node::MatchWeigher::Unit)
        }

        pub fn reward_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc>
        where
            W: Fn($(&$fact),+) -> i64 + Send + Sync + 'static,
        {
            self.terminal(
                weight,
                deltaforge_core::ImpactType::Reward,
                $crate::node::MatchWeigher::Long(std::sync::Arc::new(tuple_fn!(match_weight; $($fact : $index),+))),
            )
        }

        pub fn reward_decimal_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc>
        where
            W: Fn($(&$fact),+) -> rust_decimal::Decimal + Send + Sync + 'static,
        {
            self.terminal(
                weight,
                deltaforge_core::ImpactType::Reward,
                $crate::node::MatchWeigher::Decimal(std::sync::Arc::new(tuple_fn!(match_weight; $($fact : $index),+))),
            )
        }

        /// Applies `weight` as declared; the sign of the match weight
        /// decides between penalty and reward.
        pub fn impact(self, weight: Sc) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc> {
            self.terminal(weight, deltaforge_core::ImpactType::Mixed, $crate::node::MatchWeigher::Unit)
        }

        pub fn impact_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc>
        where
            W: Fn($(&$fact),+) -> i64 + Send + Sync + 'static,
        {
            self.terminal(
                weight,
                deltaforge_core::ImpactType::Mixed,
                $crate::node::MatchWeigher::Long(std::sync::Arc::new(tuple_fn!(match_weight; $($fact : $index),+))),
            )
        }

        pub fn impact_decimal_with<W>(self, weight: Sc, match_weight: W) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc>
        where
            W: Fn($(&$fact),+) -> rust_decimal::Decimal + Send + Sync + 'static,
        {
            self.terminal(
                weight,
                deltaforge_core::ImpactType::Mixed,
                $crate::node::MatchWeigher::Decimal(std::sync::Arc::new(tuple_fn!(match_weight; $($fact : $index),+))),
            )
        }

        fn terminal(
            self,
            weight: Sc,
            impact: deltaforge_core::ImpactType,
            weigher: $crate::node::MatchWeigher,
        ) -> $crate::stream::ConstraintBuilder<($($fact,)+), Sc> {
            $crate::stream::ConstraintBuilder::new(self.graph, self.node, weight, impact, weigher)
        }
    };
}
