//! Match results: ranges into a searched sequence.
//!
//! A [`Match`] borrows the sequence it was found in, so it cannot outlive a
//! mutation of that sequence.

use std::ops::Range;

/// A half-open range of positions in a searched sequence.
#[derive(Debug, PartialEq, Eq)]
pub struct Match<'a, T> {
    range: Range<usize>,
    base: &'a [T],
}

impl<T> Clone for Match<'_, T> {
    fn clone(&self) -> Self {
        Self {
            range: self.range.clone(),
            base: self.base,
        }
    }
}

impl<'a, T> Match<'a, T> {
    pub(crate) fn new(range: Range<usize>, base: &'a [T]) -> Self {
        debug_assert!(range.start <= range.end && range.end <= base.len());
        Self { range, base }
    }

    /// The matched positions.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The matched elements.
    pub fn contents(&self) -> &'a [T] {
        &self.base[self.range.clone()]
    }

    /// The whole sequence the match was found in.
    pub fn base(&self) -> &'a [T] {
        self.base
    }
}

impl Match<'_, char> {
    /// The matched characters collected into a `String`.
    pub fn text(&self) -> String {
        self.contents().iter().collect()
    }
}

/// A balanced span between an opening and a closing token.
#[derive(Debug, PartialEq, Eq)]
pub struct NestingLevel<'a, T> {
    /// From the start of the opening token through the end of the closing token.
    pub container: Match<'a, T>,
    /// Strictly between the two tokens.
    pub contents: Match<'a, T>,
}

impl<T> Clone for NestingLevel<'_, T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            contents: self.contents.clone(),
        }
    }
}
