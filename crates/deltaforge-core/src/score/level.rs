use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{AddAssign, SubAssign};
use std::str::FromStr;

use num_traits::{FromPrimitive, Signed, ToPrimitive};
use rust_decimal::Decimal;

use super::ScoreParseError;

/// Score level representing different constraint priorities.
///
/// Maps to the semantic meaning of each level index within a [`Score`](super::Score).
/// Used by [`Score::level_label`](super::Score::level_label) to classify what
/// a given level index represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Hard constraints - must be satisfied for feasibility.
    Hard,
    /// Medium constraints - secondary priority.
    Medium,
    /// Soft constraints - optimization objectives.
    Soft,
}

/// Numeric type stored in each level of a score.
///
/// Implemented for `i64` (integer and long levels) and
/// [`Decimal`] (arbitrary-precision levels). The incremental scorer
/// multiplies constraint weights by match weights in this type, so it must
/// be closed under the usual signed arithmetic.
pub trait ScoreLevelNumber:
    Copy
    + Debug
    + Display
    + Default
    + Eq
    + Ord
    + Hash
    + Send
    + Sync
    + Signed
    + FromPrimitive
    + AddAssign
    + SubAssign
    + 'static
{
    /// Whether the level holds fractional values.
    const IS_DECIMAL: bool;

    const ZERO_LEVEL: Self;

    const ONE_LEVEL: Self;

    /// Converts a decimal match weight, if it is representable.
    fn from_decimal(value: Decimal) -> Option<Self>;

    /// Parses the textual form used by `ParseableScore`.
    fn parse_level(text: &str) -> Result<Self, String>;
}

impl ScoreLevelNumber for i64 {
    const IS_DECIMAL: bool = false;
    const ZERO_LEVEL: Self = 0;
    const ONE_LEVEL: Self = 1;

    fn from_decimal(value: Decimal) -> Option<Self> {
        if value.fract().is_zero() {
            value.to_i64()
        } else {
            None
        }
    }

    fn parse_level(text: &str) -> Result<Self, String> {
        text.parse::<i64>().map_err(|e| e.to_string())
    }
}

impl ScoreLevelNumber for Decimal {
    const IS_DECIMAL: bool = true;
    const ZERO_LEVEL: Self = Decimal::ZERO;
    const ONE_LEVEL: Self = Decimal::ONE;

    fn from_decimal(value: Decimal) -> Option<Self> {
        Some(value)
    }

    fn parse_level(text: &str) -> Result<Self, String> {
        Decimal::from_str(text).map_err(|e| e.to_string())
    }
}

/// Splits `"Xa/Yb"` into level numbers, checking each part's suffix
/// against `levels`.
pub(crate) fn parse_levels<L: ScoreLevelNumber>(
    text: &str,
    type_name: &str,
    levels: &[(ScoreLevel, &str)],
) -> Result<Vec<L>, ScoreParseError> {
    let text = text.trim();
    let parts: Vec<&str> = text.split('/').map(str::trim).collect();
    if parts.len() != levels.len() {
        return Err(ScoreParseError {
            message: format!(
                "Invalid {type_name} '{text}': expected {} parts separated by '/'",
                levels.len()
            ),
        });
    }
    parts
        .iter()
        .zip(levels)
        .map(|(&part, (_, suffix))| {
            let number = if suffix.is_empty() {
                part.strip_suffix("init").unwrap_or(part)
            } else {
                part.strip_suffix(suffix).ok_or_else(|| ScoreParseError {
                    message: format!("{type_name} part '{part}' must end with '{suffix}'"),
                })?
            };
            L::parse_level(number).map_err(|e| ScoreParseError {
                message: format!("Invalid {type_name} level '{part}': {e}"),
            })
        })
        .collect()
}
