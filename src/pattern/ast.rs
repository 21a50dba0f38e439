//! Pattern types.

use std::ops::{Bound, RangeBounds};

/// A reusable description of a run of elements.
///
/// Patterns hold no search state and never borrow the sequence they are
/// matched against, so one value can be shared by any number of searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern<T> {
    /// Elements matched one-to-one, in order.
    Literal(Vec<T>),
    /// Candidates tried in declaration order.
    Alternative(Vec<Pattern<T>>),
    /// A sub-pattern repeated `min..=max` times (`max = None` is unbounded).
    Repetition {
        pattern: Box<Pattern<T>>,
        min: usize,
        max: Option<usize>,
        consumption: Consumption,
    },
    /// Sub-patterns that must match back to back.
    Composite(Vec<Pattern<T>>),
}

/// How a [`Pattern::Repetition`] orders its candidate lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Consumption {
    /// Most repetitions first.
    #[default]
    Greedy,
    /// Fewest repetitions first.
    Lazy,
}

impl<T> Pattern<T> {
    pub fn literal(elements: impl IntoIterator<Item = T>) -> Self {
        Pattern::Literal(elements.into_iter().collect())
    }

    pub fn alternative(patterns: impl IntoIterator<Item = Pattern<T>>) -> Self {
        Pattern::Alternative(patterns.into_iter().collect())
    }

    pub fn composite(patterns: impl IntoIterator<Item = Pattern<T>>) -> Self {
        Pattern::Composite(patterns.into_iter().collect())
    }

    /// Repeat `pattern` a number of times within `count`.
    ///
    /// Both inclusive and exclusive ranges are accepted; `2..5` and `2..=4`
    /// are the same repetition. An empty count range yields a repetition
    /// that can never match.
    pub fn repetition(
        pattern: Pattern<T>,
        count: impl RangeBounds<usize>,
        consumption: Consumption,
    ) -> Self {
        let min = match count.start_bound() {
            Bound::Included(&n) => Some(n),
            Bound::Excluded(&n) => n.checked_add(1),
            Bound::Unbounded => Some(0),
        };
        let max = match count.end_bound() {
            Bound::Included(&n) => Some(Some(n)),
            Bound::Excluded(&n) => n.checked_sub(1).map(Some),
            Bound::Unbounded => Some(None),
        };
        // A bound past either end of `usize` admits no count at all.
        let (min, max) = match (min, max) {
            (Some(min), Some(max)) => (min, max),
            _ => (1, Some(0)),
        };
        Pattern::Repetition {
            pattern: Box::new(pattern),
            min,
            max,
            consumption,
        }
    }

    /// Zero or more, greedy.
    pub fn zero_or_more(pattern: Pattern<T>) -> Self {
        Self::repetition(pattern, 0.., Consumption::Greedy)
    }

    /// One or more, greedy.
    pub fn one_or_more(pattern: Pattern<T>) -> Self {
        Self::repetition(pattern, 1.., Consumption::Greedy)
    }

    /// True if the count range admits at least one repetition count.
    pub(crate) fn is_satisfiable_count(min: usize, max: Option<usize>) -> bool {
        max.is_none_or(|max| min <= max)
    }
}

impl<T: Clone> Pattern<T> {
    /// The pattern that matches the same runs read back to front.
    ///
    /// Used for reversed searches (last match, suffix tests). Alternatives
    /// keep their declaration order and repetitions keep their consumption
    /// policy; only the direction of consumption flips.
    pub fn reversed(&self) -> Self {
        match self {
            Pattern::Literal(elements) => {
                Pattern::Literal(elements.iter().rev().cloned().collect())
            }
            Pattern::Alternative(patterns) => {
                Pattern::Alternative(patterns.iter().map(Pattern::reversed).collect())
            }
            Pattern::Repetition {
                pattern,
                min,
                max,
                consumption,
            } => Pattern::Repetition {
                pattern: Box::new(pattern.reversed()),
                min: *min,
                max: *max,
                consumption: *consumption,
            },
            Pattern::Composite(patterns) => {
                Pattern::Composite(patterns.iter().rev().map(Pattern::reversed).collect())
            }
        }
    }
}

impl<T: Clone> From<&[T]> for Pattern<T> {
    fn from(elements: &[T]) -> Self {
        Pattern::Literal(elements.to_vec())
    }
}

impl<T> From<Vec<T>> for Pattern<T> {
    fn from(elements: Vec<T>) -> Self {
        Pattern::Literal(elements)
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for Pattern<T> {
    fn from(elements: [T; N]) -> Self {
        Pattern::Literal(elements.to_vec())
    }
}

impl From<&str> for Pattern<char> {
    fn from(text: &str) -> Self {
        Pattern::Literal(text.chars().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(count: impl RangeBounds<usize>) -> (usize, Option<usize>) {
        match Pattern::repetition(Pattern::literal([1]), count, Consumption::Greedy) {
            Pattern::Repetition { min, max, .. } => (min, max),
            _ => unreachable!(),
        }
    }

    #[test]
    fn repetition_count_bounds() {
        assert_eq!(rep(2..5), (2, Some(4)));
        assert_eq!(rep(2..=4), (2, Some(4)));
        assert_eq!(rep(3..), (3, None));
        assert_eq!(rep(..), (0, None));
        assert_eq!(rep(..=2), (0, Some(2)));
    }

    #[test]
    fn empty_count_range_is_unsatisfiable() {
        let (min, max) = rep(..0);
        assert!(!Pattern::<u8>::is_satisfiable_count(min, max));
        let (min, max) = rep(3..3);
        assert!(!Pattern::<u8>::is_satisfiable_count(min, max));
    }

    #[test]
    fn excluded_start_at_usize_max_is_unsatisfiable() {
        let (min, max) = rep((Bound::Excluded(usize::MAX), Bound::Unbounded));
        assert!(!Pattern::<u8>::is_satisfiable_count(min, max));
        assert_eq!(rep((Bound::Excluded(4), Bound::Included(6))), (5, Some(6)));
    }

    #[test]
    fn reversed_composite() {
        let p = Pattern::composite([Pattern::from("ab"), Pattern::from("cd")]);
        assert_eq!(
            p.reversed(),
            Pattern::composite([Pattern::from("dc"), Pattern::from("ba")])
        );
    }

    #[test]
    fn reversed_keeps_alternative_order() {
        let p = Pattern::alternative([Pattern::from("ab"), Pattern::from("c")]);
        assert_eq!(
            p.reversed(),
            Pattern::alternative([Pattern::from("ba"), Pattern::from("c")])
        );
    }
}
