//! Validated element-level differences with optional move pairing.

use std::collections::HashMap;
use std::hash::Hash;

use itertools::Itertools;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::diff::{self, Change};

/// A single inserted or removed element.
///
/// Removal offsets index the original sequence; insertion offsets index the
/// result. `associated_with` links a removal and an insertion that together
/// describe a move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementChange<T> {
    Insert {
        offset: usize,
        element: T,
        associated_with: Option<usize>,
    },
    Remove {
        offset: usize,
        element: T,
        associated_with: Option<usize>,
    },
}

impl<T> ElementChange<T> {
    pub fn offset(&self) -> usize {
        match self {
            Self::Insert { offset, .. } | Self::Remove { offset, .. } => *offset,
        }
    }

    pub fn element(&self) -> &T {
        match self {
            Self::Insert { element, .. } | Self::Remove { element, .. } => element,
        }
    }

    pub fn associated_with(&self) -> Option<usize> {
        match self {
            Self::Insert {
                associated_with, ..
            }
            | Self::Remove {
                associated_with, ..
            } => *associated_with,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove { .. })
    }

    /// The same change in the opposite direction.
    fn inverted(self) -> Self {
        match self {
            Self::Insert {
                offset,
                element,
                associated_with,
            } => Self::Remove {
                offset,
                element,
                associated_with,
            },
            Self::Remove {
                offset,
                element,
                associated_with,
            } => Self::Insert {
                offset,
                element,
                associated_with,
            },
        }
    }

    fn with_association(self, associated_with: Option<usize>) -> Self {
        match self {
            Self::Insert {
                offset, element, ..
            } => Self::Insert {
                offset,
                element,
                associated_with,
            },
            Self::Remove {
                offset, element, ..
            } => Self::Remove {
                offset,
                element,
                associated_with,
            },
        }
    }
}

/// Persisted form of an [`ElementChange`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeRecordRef<'a, T> {
    is_remove: bool,
    offset: usize,
    element: &'a T,
    associated_offset: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeRecord<T> {
    is_remove: bool,
    offset: usize,
    element: T,
    #[serde(default)]
    associated_offset: Option<usize>,
}

impl<T: Serialize> Serialize for ElementChange<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChangeRecordRef {
            is_remove: self.is_remove(),
            offset: self.offset(),
            element: self.element(),
            associated_offset: self.associated_with(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ElementChange<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = ChangeRecord::<T>::deserialize(deserializer)?;
        Ok(if record.is_remove {
            Self::Remove {
                offset: record.offset,
                element: record.element,
                associated_with: record.associated_offset,
            }
        } else {
            Self::Insert {
                offset: record.offset,
                element: record.element,
                associated_with: record.associated_offset,
            }
        })
    }
}

/// An ordered set of removals and insertions between two sequences.
///
/// Removal offsets are unique and ascending, as are insertion offsets, and
/// every move link is reciprocated. Values are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDifference<T> {
    removals: Vec<ElementChange<T>>,
    insertions: Vec<ElementChange<T>>,
}

impl<T> CollectionDifference<T> {
    /// Validate and order `changes`.
    ///
    /// Returns `None` if two removals (or two insertions) share an offset,
    /// or if a move link is not matched by the reverse link.
    pub fn new(changes: impl IntoIterator<Item = ElementChange<T>>) -> Option<Self> {
        let (mut removals, mut insertions): (Vec<_>, Vec<_>) =
            changes.into_iter().partition(ElementChange::is_remove);
        removals.sort_by_key(ElementChange::offset);
        insertions.sort_by_key(ElementChange::offset);

        if !strictly_ascending(&removals) || !strictly_ascending(&insertions) {
            debug!("rejected difference: duplicate offsets");
            return None;
        }
        if !links_reciprocated(&removals, &insertions)
            || !links_reciprocated(&insertions, &removals)
        {
            debug!("rejected difference: unmatched move association");
            return None;
        }
        Some(Self {
            removals,
            insertions,
        })
    }

    /// Removals, ascending by offset.
    pub fn removals(&self) -> &[ElementChange<T>] {
        &self.removals
    }

    /// Insertions, ascending by offset.
    pub fn insertions(&self) -> &[ElementChange<T>] {
        &self.insertions
    }

    pub fn len(&self) -> usize {
        self.removals.len() + self.insertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty()
    }

    /// Removals (highest offset first), then insertions (lowest offset
    /// first): the order in which they can be applied one at a time.
    pub fn iter(&self) -> impl Iterator<Item = &ElementChange<T>> {
        self.removals.iter().rev().chain(self.insertions.iter())
    }
}

impl<T: Clone> CollectionDifference<T> {
    /// The difference turning `source` into `target`.
    pub fn between(source: &[T], target: &[T]) -> Self
    where
        T: PartialEq,
    {
        Self::from_changes(&diff::changes(source, target), source, target)
    }

    /// Expand ranged changes between `source` and `target` into one entry
    /// per removed or inserted element, with no move associations.
    ///
    /// # Panics
    ///
    /// If a removal range lies outside `source` or an insertion range
    /// outside `target`.
    pub fn from_changes(changes: &[Change], source: &[T], target: &[T]) -> Self {
        let mut removals = Vec::new();
        let mut insertions = Vec::new();
        for change in changes.iter().cloned() {
            match change {
                Change::Keep(_) => {}
                Change::Remove(r) => removals.extend(r.map(|offset| ElementChange::Remove {
                    offset,
                    element: source[offset].clone(),
                    associated_with: None,
                })),
                Change::Insert(r) => insertions.extend(r.map(|offset| ElementChange::Insert {
                    offset,
                    element: target[offset].clone(),
                    associated_with: None,
                })),
            }
        }
        Self {
            removals,
            insertions,
        }
    }

    /// The difference in the opposite direction: removals become insertions
    /// and vice versa, offsets and links unchanged.
    pub fn inverse(&self) -> Self {
        Self {
            removals: self.insertions.iter().cloned().map(ElementChange::inverted).collect(),
            insertions: self.removals.iter().cloned().map(ElementChange::inverted).collect(),
        }
    }

    /// Apply to `base`, or `None` if the offsets do not fit it.
    ///
    /// Removed elements are dropped by offset; their values are not checked.
    pub fn apply(&self, base: &[T]) -> Option<Vec<T>> {
        if self.removals.last().is_some_and(|r| r.offset() >= base.len()) {
            return None;
        }

        let mut removed = self.removals.iter().map(ElementChange::offset).peekable();
        let mut kept = Vec::with_capacity(base.len());
        for (offset, element) in base.iter().enumerate() {
            if removed.next_if_eq(&offset).is_none() {
                kept.push(element.clone());
            }
        }

        let total = kept.len() + self.insertions.len();
        let mut inserted = self.insertions.iter().peekable();
        let mut kept = kept.into_iter();
        let mut result = Vec::with_capacity(total);
        for position in 0..total {
            match inserted.next_if(|c| c.offset() == position) {
                Some(change) => result.push(change.element().clone()),
                None => result.push(kept.next()?),
            }
        }
        Some(result)
    }
}

impl<T: Clone + Eq + Hash> CollectionDifference<T> {
    /// Pair each removal with an insertion of the same value when that value
    /// is removed exactly once and inserted exactly once.
    ///
    /// Values that are not uniquely identifiable on both sides are left
    /// unpaired. The original value is not modified.
    pub fn inferring_moves(&self) -> Self {
        let unique_offsets = |changes: &[ElementChange<T>]| -> HashMap<T, usize> {
            changes
                .iter()
                .map(|c| (c.element().clone(), c.offset()))
                .into_group_map()
                .into_iter()
                .filter_map(|(element, offsets)| match offsets.as_slice() {
                    [offset] => Some((element, *offset)),
                    _ => None,
                })
                .collect()
        };
        let removed = unique_offsets(&self.removals);
        let inserted = unique_offsets(&self.insertions);

        let pair = |change: &ElementChange<T>,
                    this_side: &HashMap<T, usize>,
                    other_side: &HashMap<T, usize>| {
            let element = change.element();
            let link = this_side
                .contains_key(element)
                .then(|| other_side.get(element).copied())
                .flatten();
            change.clone().with_association(link)
        };

        let removals: Vec<_> = self
            .removals
            .iter()
            .map(|c| pair(c, &removed, &inserted))
            .collect();
        let insertions: Vec<_> = self
            .insertions
            .iter()
            .map(|c| pair(c, &inserted, &removed))
            .collect();
        debug!(
            moves = removals.iter().filter(|c| c.associated_with().is_some()).count(),
            "inferred moves"
        );
        Self {
            removals,
            insertions,
        }
    }
}

impl<T: Serialize> Serialize for CollectionDifference<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.removals.iter().chain(self.insertions.iter()))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CollectionDifference<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let changes = Vec::<ElementChange<T>>::deserialize(deserializer)?;
        Self::new(changes).ok_or_else(|| {
            D::Error::custom("duplicate offsets or unmatched move associations in difference")
        })
    }
}

fn strictly_ascending<T>(changes: &[ElementChange<T>]) -> bool {
    changes.windows(2).all(|w| w[0].offset() < w[1].offset())
}

/// Every link in `from` points at a change in `to` that links back.
fn links_reciprocated<T>(from: &[ElementChange<T>], to: &[ElementChange<T>]) -> bool {
    from.iter().all(|change| match change.associated_with() {
        None => true,
        Some(target) => to
            .binary_search_by_key(&target, ElementChange::offset)
            .is_ok_and(|i| to[i].associated_with() == Some(change.offset())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remove(offset: usize, element: char, associated_with: Option<usize>) -> ElementChange<char> {
        ElementChange::Remove {
            offset,
            element,
            associated_with,
        }
    }

    fn insert(offset: usize, element: char, associated_with: Option<usize>) -> ElementChange<char> {
        ElementChange::Insert {
            offset,
            element,
            associated_with,
        }
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    // --- Construction ---

    #[test]
    fn new_orders_changes() {
        let d = CollectionDifference::new([
            insert(3, 'c', None),
            remove(2, 'b', None),
            insert(0, 'a', None),
            remove(0, 'x', None),
        ])
        .unwrap();
        let removals: Vec<_> = d.removals().iter().map(ElementChange::offset).collect();
        let insertions: Vec<_> = d.insertions().iter().map(ElementChange::offset).collect();
        assert_eq!(removals, vec![0, 2]);
        assert_eq!(insertions, vec![0, 3]);
    }

    #[test]
    fn duplicate_removal_offset_rejected() {
        assert!(CollectionDifference::new([remove(1, 'a', None), remove(1, 'b', None)]).is_none());
    }

    #[test]
    fn duplicate_insertion_offset_rejected() {
        assert!(CollectionDifference::new([insert(0, 'a', None), insert(0, 'a', None)]).is_none());
    }

    #[test]
    fn same_offset_on_both_sides_is_fine() {
        assert!(CollectionDifference::new([remove(0, 'a', None), insert(0, 'b', None)]).is_some());
    }

    #[test]
    fn one_sided_association_rejected() {
        assert!(
            CollectionDifference::new([remove(0, 'a', Some(2)), insert(2, 'a', None)]).is_none()
        );
        assert!(CollectionDifference::new([remove(0, 'a', Some(2))]).is_none());
    }

    #[test]
    fn mismatched_association_rejected() {
        assert!(
            CollectionDifference::new([
                remove(0, 'a', Some(2)),
                insert(2, 'a', Some(1)),
                remove(1, 'b', None),
            ])
            .is_none()
        );
    }

    #[test]
    fn reciprocal_association_accepted() {
        let d =
            CollectionDifference::new([remove(0, 'a', Some(2)), insert(2, 'a', Some(0))]).unwrap();
        assert_eq!(d.len(), 2);
    }

    // --- between / apply ---

    #[test]
    fn between_identical_is_empty() {
        let s = chars("same");
        assert!(CollectionDifference::between(&s, &s).is_empty());
    }

    #[test]
    fn between_and_apply() {
        for (a, b) in [("kitten", "sitting"), ("abc", ""), ("", "abc"), ("abcabba", "cbabac")] {
            let (a, b) = (chars(a), chars(b));
            let d = CollectionDifference::between(&a, &b);
            assert_eq!(d.apply(&a), Some(b.clone()));
            assert_eq!(d.inverse().apply(&b), Some(a.clone()));
        }
    }

    #[test]
    fn from_changes_matches_between() {
        let (a, b) = (chars("abcabba"), chars("cbabac"));
        let ranged = diff::changes(&a, &b);
        assert_eq!(
            CollectionDifference::from_changes(&ranged, &a, &b),
            CollectionDifference::between(&a, &b)
        );
    }

    #[test]
    fn apply_rejects_offsets_past_end() {
        let d = CollectionDifference::new([remove(5, 'a', None)]).unwrap();
        assert_eq!(d.apply(&chars("abc")), None);
        let d = CollectionDifference::new([insert(7, 'a', None)]).unwrap();
        assert_eq!(d.apply(&chars("abc")), None);
    }

    #[test]
    fn iter_order() {
        let d = CollectionDifference::new([
            remove(0, 'a', None),
            remove(2, 'c', None),
            insert(1, 'x', None),
            insert(0, 'y', None),
        ])
        .unwrap();
        let order: Vec<_> = d.iter().map(|c| (c.is_remove(), c.offset())).collect();
        assert_eq!(order, vec![(true, 2), (true, 0), (false, 0), (false, 1)]);
    }

    // --- inverse ---

    #[test]
    fn inverse_swaps_roles() {
        let d =
            CollectionDifference::new([remove(0, 'a', Some(3)), insert(3, 'a', Some(0))]).unwrap();
        let inv = d.inverse();
        assert_eq!(inv.removals(), &[remove(3, 'a', Some(0))]);
        assert_eq!(inv.insertions(), &[insert(0, 'a', Some(3))]);
        assert_eq!(inv.inverse(), d);
    }

    // --- moves ---

    #[test]
    fn unique_element_becomes_move() {
        let d = CollectionDifference::new([remove(0, 'x', None), insert(3, 'x', None)]).unwrap();
        let moved = d.inferring_moves();
        assert_eq!(moved.removals(), &[remove(0, 'x', Some(3))]);
        assert_eq!(moved.insertions(), &[insert(3, 'x', Some(0))]);
        // The original is untouched.
        assert_eq!(d.removals()[0].associated_with(), None);
    }

    #[test]
    fn ambiguous_elements_are_not_paired() {
        let d = CollectionDifference::new([
            remove(0, 'a', None),
            remove(1, 'a', None),
            insert(4, 'a', None),
            remove(2, 'b', None),
            insert(5, 'c', None),
        ])
        .unwrap();
        let moved = d.inferring_moves();
        assert!(moved.iter().all(|c| c.associated_with().is_none()));
    }

    #[test]
    fn inferring_moves_keeps_elements() {
        let a = chars("abcdef");
        let b = chars("bcdeaf");
        let d = CollectionDifference::between(&a, &b);
        let moved = d.inferring_moves();
        let elements = |d: &CollectionDifference<char>| -> Vec<(bool, usize, char)> {
            d.iter().map(|c| (c.is_remove(), c.offset(), *c.element())).collect()
        };
        assert_eq!(elements(&d), elements(&moved));
        assert_eq!(moved.removals(), &[remove(0, 'a', Some(4))]);
        assert_eq!(moved.apply(&a), Some(b));
        // Result still satisfies the construction invariants.
        assert_eq!(CollectionDifference::new(moved.iter().cloned()), Some(moved.clone()));
    }

    // --- Serialization ---

    #[test]
    fn change_record_shape() {
        let json = serde_json::to_value(remove(2, 'q', Some(5))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isRemove": true,
                "offset": 2,
                "element": "q",
                "associatedOffset": 5,
            })
        );
    }

    #[test]
    fn change_record_decodes() {
        let change: ElementChange<char> = serde_json::from_str(
            r#"{"isRemove": false, "offset": 4, "element": "z", "associatedOffset": null}"#,
        )
        .unwrap();
        assert_eq!(change, insert(4, 'z', None));

        let change: ElementChange<char> = serde_json::from_str(
            r#"{"isRemove": true, "offset": 1, "element": "y", "associatedOffset": 7}"#,
        )
        .unwrap();
        assert_eq!(change, remove(1, 'y', Some(7)));
    }

    #[test]
    fn negative_offset_fails_to_decode() {
        let decoded: Result<ElementChange<char>, _> =
            serde_json::from_str(r#"{"isRemove": true, "offset": -1, "element": "y"}"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn difference_round_trips_and_validates() {
        let d = CollectionDifference::between(&chars("abcdef"), &chars("bcdeaf")).inferring_moves();
        let json = serde_json::to_string(&d).unwrap();
        let back: CollectionDifference<char> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);

        let invalid = r#"[
            {"isRemove": true, "offset": 0, "element": "a", "associatedOffset": null},
            {"isRemove": true, "offset": 0, "element": "b", "associatedOffset": null}
        ]"#;
        assert!(serde_json::from_str::<CollectionDifference<char>>(invalid).is_err());
    }
}
