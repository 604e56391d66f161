//! The `level_score!` macro behind every fixed-level score type.
//!
//! A fixed-level score is a struct with one field per level, highest
//! priority first. The macro derives everything that follows from that
//! field list and the level number type: constants, constructors, level
//! access, lexicographic ordering, arithmetic, formatting and parsing.

/// Declares a fixed-level score.
///
/// Each level is written `field: Label => "suffix"`, optionally followed by
/// the names of its unit constant and single-level constructor:
///
/// ```ignore
/// level_score! {
///     /// A two-level score.
///     HardSoftScore(i64) {
///         hard: Hard => "hard", ONE_HARD, of_hard;
///         soft: Soft => "soft", ONE_SOFT, of_soft;
///     }
/// }
/// ```
///
/// A score is feasible when its first level is not negative. A level with
/// an empty suffix also accepts a trailing `init` when parsed.
macro_rules! level_score {
    (
        $(#[$meta:meta])*
        $type:ident($level:ty) {
            $( $field:ident : $label:ident => $suffix:literal $(, $one:ident, $of_level:ident)? );+ $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $type {
            $( $field: $level, )+
        }

        impl $type {
            const LEVELS: &'static [($crate::score::ScoreLevel, &'static str)] =
                &[ $( ($crate::score::ScoreLevel::$label, $suffix) ),+ ];

            /// The zero score.
            pub const ZERO: $type = $type {
                $( $field: <$level as $crate::score::ScoreLevelNumber>::ZERO_LEVEL, )+
            };

            $($(
                #[doc = concat!("A score of one on the `", stringify!($field), "` level.")]
                pub const $one: $type = $type::$of_level(<$level as $crate::score::ScoreLevelNumber>::ONE_LEVEL);

                #[doc = concat!("A score with only the `", stringify!($field), "` level set.")]
                #[inline]
                pub const fn $of_level($field: $level) -> Self {
                    $type { $field, ..$type::ZERO }
                }
            )?)+

            #[inline]
            pub const fn of($( $field: $level ),+) -> Self {
                $type { $( $field ),+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> $level {
                    self.$field
                }
            )+
        }

        impl $crate::score::Score for $type {
            type Level = $level;

            fn is_feasible(&self) -> bool {
                [ $( self.$field ),+ ][0] >= <$level as $crate::score::ScoreLevelNumber>::ZERO_LEVEL
            }

            fn zero() -> Self {
                $type::ZERO
            }

            #[inline]
            fn levels_count(&self) -> usize {
                Self::LEVELS.len()
            }

            fn to_level_numbers(&self) -> Vec<$level> {
                vec![ $( self.$field ),+ ]
            }

            fn with_level_numbers(&self, levels: &[$level]) -> Self {
                assert_eq!(
                    levels.len(),
                    Self::LEVELS.len(),
                    "{} requires exactly {} levels",
                    stringify!($type),
                    Self::LEVELS.len()
                );
                let mut levels = levels.iter().copied();
                $type {
                    $( $field: levels.next().unwrap_or_default(), )+
                }
            }

            fn abs(&self) -> Self {
                $type {
                    $( $field: self.$field.abs(), )+
                }
            }

            fn level_label(&self, index: usize) -> $crate::score::ScoreLevel {
                match Self::LEVELS.get(index) {
                    Some((label, _)) => *label,
                    None => panic!("{} has {} levels, got index {}", stringify!($type), Self::LEVELS.len(), index),
                }
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                ( $( self.$field, )+ ).cmp(&( $( other.$field, )+ ))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type { $( $field: self.$field + other.$field, )+ }
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type { $( $field: self.$field - other.$field, )+ }
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type { $( $field: -self.$field, )+ }
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($type))
                    $( .field(&self.$field) )+
                    .finish()
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let values = [ $( self.$field ),+ ];
                for (index, (value, (_, suffix))) in values.iter().zip(Self::LEVELS).enumerate() {
                    if index > 0 {
                        f.write_str("/")?;
                    }
                    write!(f, "{value}{suffix}")?;
                }
                Ok(())
            }
        }

        impl $crate::score::ParseableScore for $type {
            fn parse(text: &str) -> Result<Self, $crate::score::ScoreParseError> {
                let levels = $crate::score::level::parse_levels::<$level>(text, stringify!($type), Self::LEVELS)?;
                Ok(<Self as $crate::score::Score>::with_level_numbers(&$type::ZERO, &levels))
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }
    };
}
