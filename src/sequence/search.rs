//! Search operations: first/last/all matches, affixes, components and
//! nesting levels.

use std::ops::Range;

use tracing::debug;

use crate::pattern::Pattern;
use crate::pattern::matcher::{Steps, View, match_at};
use crate::span::{Match, NestingLevel};

use super::ranges_between;

/// Pattern searches over a sequence.
///
/// Candidate start positions are the positions inside the searched range;
/// a match may end at the range end but never starts there. Every `_in`
/// variant panics if the range does not lie within the sequence.
pub trait SequenceSearch<T: PartialEq + Clone> {
    /// Match `pattern` starting exactly at `at` (no scanning).
    fn primary_match(&self, pattern: &Pattern<T>, at: usize) -> Option<Match<'_, T>>;

    fn first_match(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>>;

    /// Leftmost match starting inside `range` and ending at or before its end.
    fn first_match_in(&self, pattern: &Pattern<T>, range: Range<usize>) -> Option<Match<'_, T>>;

    fn matches(&self, pattern: &Pattern<T>) -> Vec<Match<'_, T>>;

    /// All non-overlapping matches, left to right.
    ///
    /// Scanning resumes at the end of each match (one past it for an empty
    /// match).
    fn matches_in(&self, pattern: &Pattern<T>, range: Range<usize>) -> Vec<Match<'_, T>>;

    fn last_match(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>>;

    /// The first match found when reading `range` back to front with the
    /// reversed pattern.
    ///
    /// This is not always the last of [`matches_in`](Self::matches_in): in
    /// `[0, 0, 0, 0, 0]` the pattern `[0, 0]` has last match `3..5`, while
    /// the forward scan ends with `2..4`.
    fn last_match_in(&self, pattern: &Pattern<T>, range: Range<usize>) -> Option<Match<'_, T>>;

    /// The longest run at the start of `self` that equals the start of `other`.
    fn common_prefix(&self, other: &[T]) -> Match<'_, T>;

    /// The longest run at the end of `self` that equals the end of `other`.
    fn common_suffix(&self, other: &[T]) -> Match<'_, T>;

    fn first_nesting_level(
        &self,
        opening: &Pattern<T>,
        closing: &Pattern<T>,
    ) -> Option<NestingLevel<'_, T>>;

    /// The first balanced `opening` ... `closing` span inside `range`.
    ///
    /// Nested openings raise the level, closings lower it; the span closes
    /// when the level returns to zero. A closing token wins a tie with an
    /// opening token at the same position. Returns `None` both when no
    /// opening is found and when the input ends while a level is still open.
    fn first_nesting_level_in(
        &self,
        opening: &Pattern<T>,
        closing: &Pattern<T>,
        range: Range<usize>,
    ) -> Option<NestingLevel<'_, T>>;

    /// Everything before the first match.
    fn prefix_up_to(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>>;

    /// Everything up to and including the first match.
    fn prefix_through(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>>;

    /// The first match and everything after it.
    fn suffix_from(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>>;

    /// Everything after the first match.
    fn suffix_after(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>>;

    /// The runs between matches of `separator`, including empty ones.
    fn components(&self, separator: &Pattern<T>) -> Vec<Match<'_, T>>;

    fn contains_pattern(&self, pattern: &Pattern<T>) -> bool;

    fn has_prefix(&self, pattern: &Pattern<T>) -> bool;

    fn has_suffix(&self, pattern: &Pattern<T>) -> bool;

    /// Move `index` past a match of `pattern` starting there.
    ///
    /// Returns `false` and leaves `index` untouched if there is none.
    fn advance(&self, index: &mut usize, over: &Pattern<T>) -> bool;
}

impl<T: PartialEq + Clone> SequenceSearch<T> for [T] {
    fn primary_match(&self, pattern: &Pattern<T>, at: usize) -> Option<Match<'_, T>> {
        assert!(at <= self.len(), "position {at} is past the end ({})", self.len());
        let mut steps = Steps::for_len(self.len());
        let end = match_at(pattern, &View::forward(self), at, &mut steps)?;
        Some(Match::new(at..end, self))
    }

    fn first_match(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>> {
        self.first_match_in(pattern, 0..self.len())
    }

    fn first_match_in(&self, pattern: &Pattern<T>, range: Range<usize>) -> Option<Match<'_, T>> {
        check_range(&range, self.len());
        let view = View::forward(&self[range.clone()]);
        let mut steps = Steps::for_len(view.len());
        for start in 0..view.len() {
            if let Some(end) = match_at(pattern, &view, start, &mut steps) {
                return Some(Match::new(range.start + start..range.start + end, self));
            }
            if steps.exhausted() {
                debug!(?range, "forward search gave up at the step limit");
                return None;
            }
        }
        None
    }

    fn matches(&self, pattern: &Pattern<T>) -> Vec<Match<'_, T>> {
        self.matches_in(pattern, 0..self.len())
    }

    fn matches_in(&self, pattern: &Pattern<T>, range: Range<usize>) -> Vec<Match<'_, T>> {
        check_range(&range, self.len());
        let mut found = Vec::new();
        let mut cursor = range.start;
        while cursor < range.end {
            let Some(m) = self.first_match_in(pattern, cursor..range.end) else {
                break;
            };
            cursor = if m.is_empty() { m.end() + 1 } else { m.end() };
            found.push(m);
        }
        found
    }

    fn last_match(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>> {
        self.last_match_in(pattern, 0..self.len())
    }

    fn last_match_in(&self, pattern: &Pattern<T>, range: Range<usize>) -> Option<Match<'_, T>> {
        check_range(&range, self.len());
        let reversed = pattern.reversed();
        let view = View::reversed(&self[range.clone()]);
        let len = view.len();
        let mut steps = Steps::for_len(len);
        for start in 0..len {
            if let Some(end) = match_at(&reversed, &view, start, &mut steps) {
                return Some(Match::new(range.start + len - end..range.start + len - start, self));
            }
            if steps.exhausted() {
                debug!(?range, "backward search gave up at the step limit");
                return None;
            }
        }
        None
    }

    fn common_prefix(&self, other: &[T]) -> Match<'_, T> {
        let n = self
            .iter()
            .zip(other)
            .take_while(|(a, b)| a == b)
            .count();
        Match::new(0..n, self)
    }

    fn common_suffix(&self, other: &[T]) -> Match<'_, T> {
        let n = self
            .iter()
            .rev()
            .zip(other.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        Match::new(self.len() - n..self.len(), self)
    }

    fn first_nesting_level(
        &self,
        opening: &Pattern<T>,
        closing: &Pattern<T>,
    ) -> Option<NestingLevel<'_, T>> {
        self.first_nesting_level_in(opening, closing, 0..self.len())
    }

    fn first_nesting_level_in(
        &self,
        opening: &Pattern<T>,
        closing: &Pattern<T>,
        range: Range<usize>,
    ) -> Option<NestingLevel<'_, T>> {
        let open = self.first_match_in(opening, range.clone())?;
        let mut level = 1usize;
        let mut cursor = open.end();
        loop {
            let close = self.first_match_in(closing, cursor..range.end)?;
            let nested = self
                .first_match_in(opening, cursor..range.end)
                .filter(|nested| nested.start() < close.start());
            match nested {
                Some(nested) => {
                    level += 1;
                    // An empty opening token still has to make progress.
                    cursor = nested.end().max(nested.start() + 1);
                }
                None => {
                    level -= 1;
                    cursor = close.end();
                    if level == 0 {
                        return Some(NestingLevel {
                            container: Match::new(open.start()..close.end(), self),
                            contents: Match::new(open.end()..close.start(), self),
                        });
                    }
                }
            }
        }
    }

    fn prefix_up_to(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>> {
        let m = self.first_match(pattern)?;
        Some(Match::new(0..m.start(), self))
    }

    fn prefix_through(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>> {
        let m = self.first_match(pattern)?;
        Some(Match::new(0..m.end(), self))
    }

    fn suffix_from(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>> {
        let m = self.first_match(pattern)?;
        Some(Match::new(m.start()..self.len(), self))
    }

    fn suffix_after(&self, pattern: &Pattern<T>) -> Option<Match<'_, T>> {
        let m = self.first_match(pattern)?;
        Some(Match::new(m.end()..self.len(), self))
    }

    fn components(&self, separator: &Pattern<T>) -> Vec<Match<'_, T>> {
        let separators: Vec<Range<usize>> =
            self.matches(separator).iter().map(Match::range).collect();
        ranges_between(&separators, 0..self.len())
            .into_iter()
            .map(|r| Match::new(r, self))
            .collect()
    }

    fn contains_pattern(&self, pattern: &Pattern<T>) -> bool {
        self.first_match(pattern).is_some()
    }

    fn has_prefix(&self, pattern: &Pattern<T>) -> bool {
        self.primary_match(pattern, 0).is_some()
    }

    fn has_suffix(&self, pattern: &Pattern<T>) -> bool {
        let mut steps = Steps::for_len(self.len());
        match_at(&pattern.reversed(), &View::reversed(self), 0, &mut steps).is_some()
    }

    fn advance(&self, index: &mut usize, over: &Pattern<T>) -> bool {
        match self.primary_match(over, *index) {
            Some(m) => {
                *index = m.end();
                true
            }
            None => false,
        }
    }
}

fn check_range(range: &Range<usize>, len: usize) {
    assert!(
        range.start <= range.end && range.end <= len,
        "search range {range:?} is outside 0..{len}"
    );
}
