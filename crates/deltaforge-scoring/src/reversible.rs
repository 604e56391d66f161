//! The apply/revert discipline shared by collectors and score impacts.

use thiserror::Error;

/// An incremental fold whose every application can be reverted exactly.
///
/// `apply` returns an explicit undo token; `revert` consumes it. Because the
/// token is moved into `revert`, the same application cannot be reverted
/// twice. Forgetting to revert shows up as a wrong running value, which the
/// from-scratch check catches.
///
/// # Example
///
/// ```
/// use deltaforge_scoring::collector::{sum, Accumulator, UniCollector};
/// use deltaforge_scoring::Reversible;
///
/// let collector = sum(|x: &i64| *x);
/// let mut acc = collector.create_accumulator();
///
/// let five = acc.apply(collector.extract(&5));
/// let _three = acc.apply(collector.extract(&3));
/// assert_eq!(acc.finish(), 8);
///
/// acc.revert(five).unwrap();
/// assert_eq!(acc.finish(), 3);
/// ```
pub trait Reversible<I> {
    type Undo;

    fn apply(&mut self, input: I) -> Self::Undo;

    fn revert(&mut self, undo: Self::Undo) -> Result<(), UndoError>;
}

/// An undo token that no longer matches the state it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("undo token does not match an applied change: {0}")]
pub struct UndoError(pub String);
