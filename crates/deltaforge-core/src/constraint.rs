//! Constraint identity and impact direction.

use std::fmt;

/// Identifies a constraint by package and name.
///
/// Its [`full_name`](ConstraintRef::full_name) is the constraint id that keys
/// match totals and weight overrides.
///
/// ```
/// use deltaforge_core::ConstraintRef;
///
/// assert_eq!(ConstraintRef::new("scheduling", "NoOverlap").full_name(), "scheduling/NoOverlap");
/// assert_eq!(ConstraintRef::new("", "Simple").full_name(), "Simple");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintRef {
    pub package: String,
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// `package/name`, or `name` alone for an empty package.
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}/", self.package)?;
        }
        f.write_str(&self.name)
    }
}

/// Direction in which a constraint moves the score.
///
/// ```
/// use deltaforge_core::ImpactType;
///
/// assert_eq!(ImpactType::Penalty.sign(), -1);
/// assert_eq!(ImpactType::Reward.sign(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    Penalty,
    Reward,
    /// The weight applies unsigned and each match weight picks the direction.
    Mixed,
}

impl ImpactType {
    /// Multiplier for the declared weight.
    pub fn sign(self) -> i64 {
        match self {
            ImpactType::Penalty => -1,
            ImpactType::Reward | ImpactType::Mixed => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_package_and_name() {
        let qualified = ConstraintRef::new("timetable", "Room conflict");
        assert_eq!(qualified.full_name(), "timetable/Room conflict");
        assert_eq!(ConstraintRef::new("", "Room conflict").full_name(), "Room conflict");
    }

    #[test]
    fn test_constraint_ref_ordering_follows_package_then_name() {
        let a = ConstraintRef::new("a", "z");
        let b = ConstraintRef::new("b", "a");
        assert!(a < b);
    }

    #[test]
    fn test_mixed_keeps_weight_sign() {
        assert_eq!(ImpactType::Mixed.sign(), ImpactType::Reward.sign());
    }
}
