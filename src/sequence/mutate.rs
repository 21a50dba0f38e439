//! Rewriting every match of a pattern.

use std::ops::Range;

use tracing::trace;

use crate::pattern::Pattern;
use crate::span::Match;

use super::ranges_between;
use super::search::SequenceSearch;

/// Copying rewrites: the source sequence is left untouched.
pub trait SequenceMutation<T: PartialEq + Clone> {
    /// Rebuild the sequence with each non-overlapping match replaced by the
    /// output of `mutation`.
    ///
    /// Elements outside the matches are copied verbatim, exactly once, in
    /// their original order.
    fn mutating_matches<F>(&self, pattern: &Pattern<T>, mutation: F) -> Vec<T>
    where
        F: FnMut(Match<'_, T>) -> Vec<T>;

    /// Rebuild the sequence with each match replaced by `replacement`.
    fn replacing_matches(&self, pattern: &Pattern<T>, replacement: &[T]) -> Vec<T> {
        self.mutating_matches(pattern, |_| replacement.to_vec())
    }
}

impl<T: PartialEq + Clone> SequenceMutation<T> for [T] {
    fn mutating_matches<F>(&self, pattern: &Pattern<T>, mut mutation: F) -> Vec<T>
    where
        F: FnMut(Match<'_, T>) -> Vec<T>,
    {
        let found = self.matches(pattern);
        let spans: Vec<Range<usize>> = found.iter().map(Match::range).collect();
        let kept = ranges_between(&spans, 0..self.len());
        trace!(matches = found.len(), len = self.len(), "rewriting matches");

        let mut rebuilt = Vec::with_capacity(self.len());
        for (keep, m) in kept.iter().zip(found) {
            rebuilt.extend_from_slice(&self[keep.clone()]);
            rebuilt.extend(mutation(m));
        }
        if let Some(tail) = kept.last() {
            rebuilt.extend_from_slice(&self[tail.clone()]);
        }
        rebuilt
    }
}

/// In-place rewrites for growable sequences.
pub trait InPlaceMutation<T: PartialEq + Clone> {
    fn mutate_matches<F>(&mut self, pattern: &Pattern<T>, mutation: F)
    where
        F: FnMut(Match<'_, T>) -> Vec<T>;

    fn replace_matches(&mut self, pattern: &Pattern<T>, replacement: &[T]) {
        self.mutate_matches(pattern, |_| replacement.to_vec());
    }
}

impl<T: PartialEq + Clone> InPlaceMutation<T> for Vec<T> {
    fn mutate_matches<F>(&mut self, pattern: &Pattern<T>, mutation: F)
    where
        F: FnMut(Match<'_, T>) -> Vec<T>,
    {
        let rebuilt = self.as_slice().mutating_matches(pattern, mutation);
        *self = rebuilt;
    }
}
