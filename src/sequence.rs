//! Searching and rewriting ordered sequences with [`Pattern`](crate::Pattern)s.
//!
//! Both traits are implemented for slices, so they apply to anything that
//! derefs to `[T]` (`Vec<T>`, arrays, boxed slices).

use std::ops::Range;

mod mutate;
mod search;

pub use mutate::{InPlaceMutation, SequenceMutation};
pub use search::SequenceSearch;

/// The parts of `bounds` not covered by `separators`.
///
/// Always returns `separators.len() + 1` ranges, some possibly empty.
///
/// # Panics
///
/// If `separators` are unsorted, overlap, or fall outside `bounds`.
pub(crate) fn ranges_between(
    separators: &[Range<usize>],
    bounds: Range<usize>,
) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(separators.len() + 1);
    let mut cursor = bounds.start;
    for sep in separators {
        assert!(
            cursor <= sep.start && sep.start <= sep.end && sep.end <= bounds.end,
            "separator {sep:?} is out of order or outside {bounds:?}"
        );
        ranges.push(cursor..sep.start);
        cursor = sep.end;
    }
    ranges.push(cursor..bounds.end);
    ranges
}
