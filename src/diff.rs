//! Longest-common-subsequence diffing.
//!
//! [`changes`] describes how to turn a `source` sequence into a `target`
//! sequence as a list of ranged [`Change`]s: keeps and removals index the
//! source, insertions index the target.
//!
//! The shared prefix of the two sequences is emitted as a single keep and
//! excluded from the table. The rest costs `O(n × m)` time and space in the
//! lengths left over.

use std::ops::Range;

use itertools::Itertools;
use tracing::debug;

/// One ranged edit. Ranges are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Change {
    /// Elements present in both sequences (source positions).
    Keep(Range<usize>),
    /// Elements only in the source (source positions).
    Remove(Range<usize>),
    /// Elements only in the target (target positions).
    Insert(Range<usize>),
}

impl Change {
    pub fn range(&self) -> Range<usize> {
        match self {
            Change::Keep(r) | Change::Remove(r) | Change::Insert(r) => r.clone(),
        }
    }

    /// Extend `self` with `next` if both are the same kind and contiguous.
    fn merge(self, next: Change) -> Result<Change, (Change, Change)> {
        match (self, next) {
            (Change::Keep(a), Change::Keep(b)) if a.end == b.start => {
                Ok(Change::Keep(a.start..b.end))
            }
            (Change::Remove(a), Change::Remove(b)) if a.end == b.start => {
                Ok(Change::Remove(a.start..b.end))
            }
            (Change::Insert(a), Change::Insert(b)) if a.end == b.start => {
                Ok(Change::Insert(a.start..b.end))
            }
            (a, b) => Err((a, b)),
        }
    }
}

/// Element-granularity step produced by the traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndividualChange {
    Keep(usize),
    Remove(usize),
    Insert(usize),
}

impl From<IndividualChange> for Change {
    fn from(change: IndividualChange) -> Self {
        match change {
            IndividualChange::Keep(i) => Change::Keep(i..i + 1),
            IndividualChange::Remove(i) => Change::Remove(i..i + 1),
            IndividualChange::Insert(i) => Change::Insert(i..i + 1),
        }
    }
}

/// Diffing against another sequence.
pub trait SequenceDiff<T: PartialEq> {
    /// The changes that turn `other` into `self`.
    fn difference(&self, other: &[T]) -> Vec<Change>;
}

impl<T: PartialEq> SequenceDiff<T> for [T] {
    fn difference(&self, other: &[T]) -> Vec<Change> {
        changes(other, self)
    }
}

/// The changes that turn `source` into `target`.
pub fn changes<T: PartialEq>(source: &[T], target: &[T]) -> Vec<Change> {
    let prefix = source
        .iter()
        .zip(target)
        .take_while(|(a, b)| a == b)
        .count();
    let source_rest = &source[prefix..];
    let target_rest = &target[prefix..];

    let table = LcsTable::build(source_rest, target_rest);
    debug!(
        prefix,
        rows = source_rest.len() + 1,
        cols = target_rest.len() + 1,
        "built LCS table"
    );

    let leading = (prefix > 0).then(|| Change::Keep(0..prefix));
    let traced = table
        .traceback(source_rest, target_rest)
        .into_iter()
        .map(|change| shift(change, prefix))
        .map(Change::from);

    let consolidated: Vec<Change> = leading
        .into_iter()
        .chain(traced)
        .coalesce(Change::merge)
        .collect();
    debug!(changes = consolidated.len(), "consolidated diff");
    consolidated
}

/// Rebuild the target from `source`, `target` and the changes between them.
///
/// Keeps copy from the source, insertions copy from the target.
pub fn apply_changes<T: Clone>(changes: &[Change], source: &[T], target: &[T]) -> Vec<T> {
    let mut rebuilt = Vec::with_capacity(target.len());
    for change in changes {
        match change {
            Change::Keep(r) => rebuilt.extend_from_slice(&source[r.clone()]),
            Change::Insert(r) => rebuilt.extend_from_slice(&target[r.clone()]),
            Change::Remove(_) => {}
        }
    }
    rebuilt
}

fn shift(change: IndividualChange, by: usize) -> IndividualChange {
    match change {
        IndividualChange::Keep(i) => IndividualChange::Keep(i + by),
        IndividualChange::Remove(i) => IndividualChange::Remove(i + by),
        IndividualChange::Insert(i) => IndividualChange::Insert(i + by),
    }
}

/// `cells[i * width + j]` is the LCS length of `source[..i]` and `target[..j]`.
struct LcsTable {
    cells: Vec<usize>,
    width: usize,
}

impl LcsTable {
    fn build<T: PartialEq>(source: &[T], target: &[T]) -> Self {
        let width = target.len() + 1;
        let mut cells = vec![0usize; (source.len() + 1) * width];
        for i in 1..=source.len() {
            for j in 1..=target.len() {
                cells[i * width + j] = if source[i - 1] == target[j - 1] {
                    cells[(i - 1) * width + (j - 1)] + 1
                } else {
                    cells[i * width + (j - 1)].max(cells[(i - 1) * width + j])
                };
            }
        }
        Self { cells, width }
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }

    /// Walk from the final cell back to the origin.
    ///
    /// When the elements differ, an insertion (moving left) is taken
    /// whenever the left cell is at least the upper one. Walking backwards
    /// this puts removals ahead of insertions within a replaced run.
    fn traceback<T: PartialEq>(&self, source: &[T], target: &[T]) -> Vec<IndividualChange> {
        let mut steps = Vec::with_capacity(source.len() + target.len());
        let (mut i, mut j) = (source.len(), target.len());
        while i > 0 || j > 0 {
            if i > 0 && j > 0 && source[i - 1] == target[j - 1] {
                steps.push(IndividualChange::Keep(i - 1));
                i -= 1;
                j -= 1;
            } else if j > 0 && (i == 0 || self.get(i, j - 1) >= self.get(i - 1, j)) {
                steps.push(IndividualChange::Insert(j - 1));
                j -= 1;
            } else {
                steps.push(IndividualChange::Remove(i - 1));
                i -= 1;
            }
        }
        steps.reverse();
        steps
    }
}
