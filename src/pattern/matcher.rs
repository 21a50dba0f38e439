//! Primary matching: try a [`Pattern`] at one fixed position.
//!
//! Every pattern yields its candidate end positions in preference order.
//! The primary match is the first candidate; later candidates are only
//! consulted when an enclosing composite needs a shorter (or longer) run to
//! let its following sub-patterns succeed.

use itertools::Itertools;

use super::ast::{Consumption, Pattern};

/// A read-only window onto a slice, read either front to back or back to
/// front.
///
/// Positions are always `0..=len`, counted from the reading end.
#[derive(Debug, Clone, Copy)]
pub(crate) struct View<'a, T> {
    elements: &'a [T],
    reversed: bool,
}

impl<'a, T> View<'a, T> {
    pub fn forward(elements: &'a [T]) -> Self {
        Self {
            elements,
            reversed: false,
        }
    }

    pub fn reversed(elements: &'a [T]) -> Self {
        Self {
            elements,
            reversed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, pos: usize) -> Option<&'a T> {
        if self.reversed {
            let len = self.elements.len();
            if pos < len {
                self.elements.get(len - 1 - pos)
            } else {
                None
            }
        } else {
            self.elements.get(pos)
        }
    }
}

/// Backtracking work one search may spend before it gives up.
const MAX_STEPS: usize = 100_000;

/// Extra steps granted per searched element, so cheap patterns still scan
/// long sequences to the end.
const STEPS_PER_ELEMENT: usize = 64;

/// Step counter shared by every match attempt of one search.
///
/// Each call into the matcher takes one step. Once the limit is passed every
/// further call yields no candidates, and the search reports no match.
#[derive(Debug)]
pub(crate) struct Steps {
    taken: usize,
    limit: usize,
}

impl Steps {
    pub fn for_len(len: usize) -> Self {
        Self {
            taken: 0,
            limit: MAX_STEPS.saturating_add(len.saturating_mul(STEPS_PER_ELEMENT)),
        }
    }

    pub fn exhausted(&self) -> bool {
        self.taken > self.limit
    }

    fn take(&mut self) -> bool {
        self.taken += 1;
        !self.exhausted()
    }
}

/// The end of the preferred match of `pattern` starting exactly at `pos`.
///
/// Returns `None` if `steps` runs out, even when a partial answer was found.
pub(crate) fn match_at<T: PartialEq>(
    pattern: &Pattern<T>,
    view: &View<T>,
    pos: usize,
    steps: &mut Steps,
) -> Option<usize> {
    let end = candidate_ends(pattern, view, pos, steps).into_iter().next();
    if steps.exhausted() { None } else { end }
}

/// All end positions `pattern` can reach from `pos`, most preferred first,
/// without duplicates.
pub(crate) fn candidate_ends<T: PartialEq>(
    pattern: &Pattern<T>,
    view: &View<T>,
    pos: usize,
    steps: &mut Steps,
) -> Vec<usize> {
    if !steps.take() {
        return vec![];
    }
    match pattern {
        Pattern::Literal(elements) => match_literal(elements, view, pos).into_iter().collect(),
        Pattern::Alternative(patterns) => patterns
            .iter()
            .flat_map(|p| candidate_ends(p, view, pos, steps))
            .unique()
            .collect(),
        Pattern::Composite(patterns) => {
            let mut ends = vec![pos];
            for p in patterns {
                ends = ends
                    .iter()
                    .flat_map(|&start| candidate_ends(p, view, start, steps))
                    .unique()
                    .collect();
                if ends.is_empty() {
                    break;
                }
            }
            ends
        }
        Pattern::Repetition {
            pattern,
            min,
            max,
            consumption,
        } => repetition_ends(pattern, *min, *max, *consumption, view, pos, steps),
    }
}

fn match_literal<T: PartialEq>(elements: &[T], view: &View<T>, pos: usize) -> Option<usize> {
    let mut cur = pos;
    for expected in elements {
        if view.get(cur)? != expected {
            return None;
        }
        cur += 1;
    }
    Some(cur)
}

/// Collect end positions level by level, one level per repetition count.
///
/// Greedy consumption prefers the highest count, lazy the lowest. Within one
/// level the inner pattern's own preference order is kept.
fn repetition_ends<T: PartialEq>(
    pattern: &Pattern<T>,
    min: usize,
    max: Option<usize>,
    consumption: Consumption,
    view: &View<T>,
    start: usize,
    steps: &mut Steps,
) -> Vec<usize> {
    if !Pattern::<T>::is_satisfiable_count(min, max) {
        return vec![];
    }

    let mut levels: Vec<Vec<usize>> = Vec::new();
    if min == 0 {
        levels.push(vec![start]);
    }

    let mut frontier = vec![start];
    let mut count = 0usize;
    while !frontier.is_empty() && max.is_none_or(|max| count < max) && !steps.exhausted() {
        count += 1;
        // Zero-width repetitions may only pad the count up to `min`;
        // beyond that they would never terminate.
        let allow_empty = count <= min;
        frontier = frontier
            .iter()
            .flat_map(|&from| {
                candidate_ends(pattern, view, from, steps)
                    .into_iter()
                    .filter(move |&to| allow_empty || to != from)
            })
            .unique()
            .collect();
        if count >= min && !frontier.is_empty() {
            levels.push(frontier.clone());
        }
    }

    match consumption {
        Consumption::Greedy => levels.into_iter().rev().flatten().unique().collect(),
        Consumption::Lazy => levels.into_iter().flatten().unique().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn fwd(pattern: &Pattern<char>, text: &str, pos: usize) -> Option<usize> {
        let text = chars(text);
        match_at(pattern, &View::forward(&text), pos, &mut Steps::for_len(text.len()))
    }

    fn ends(pattern: &Pattern<char>, text: &str, pos: usize) -> Vec<usize> {
        let text = chars(text);
        candidate_ends(pattern, &View::forward(&text), pos, &mut Steps::for_len(text.len()))
    }

    // --- Literals ---

    #[test]
    fn literal_matches_in_order() {
        assert_eq!(fwd(&"hel".into(), "hello", 0), Some(3));
    }

    #[test]
    fn literal_mismatch() {
        assert_eq!(fwd(&"hex".into(), "hello", 0), None);
    }

    #[test]
    fn literal_runs_out_of_elements() {
        assert_eq!(fwd(&"lox".into(), "hello", 3), None);
    }

    #[test]
    fn empty_literal_matches_empty_run() {
        assert_eq!(fwd(&Pattern::literal([]), "abc", 1), Some(1));
    }

    // --- Alternatives ---

    #[test]
    fn alternative_declaration_order_wins() {
        let p: Pattern<char> = Pattern::alternative(["a".into(), "ab".into()]);
        assert_eq!(fwd(&p, "abc", 0), Some(1));
        let p: Pattern<char> = Pattern::alternative(["ab".into(), "a".into()]);
        assert_eq!(fwd(&p, "abc", 0), Some(2));
    }

    #[test]
    fn alternative_falls_through() {
        let p: Pattern<char> = Pattern::alternative(["x".into(), "b".into()]);
        assert_eq!(fwd(&p, "abc", 1), Some(2));
        assert_eq!(fwd(&p, "abc", 0), None);
    }

    // --- Composites ---

    #[test]
    fn composite_is_consecutive() {
        let p: Pattern<char> = Pattern::composite(["ab".into(), "c".into()]);
        assert_eq!(fwd(&p, "abcd", 0), Some(3));
        assert_eq!(fwd(&p, "abxc", 0), None);
    }

    #[test]
    fn composite_uses_later_alternative_when_needed() {
        let p: Pattern<char> = Pattern::composite([
            Pattern::alternative(["a".into(), "ab".into()]),
            "c".into(),
        ]);
        assert_eq!(fwd(&p, "abc", 0), Some(3));
    }

    // --- Repetitions ---

    #[test]
    fn greedy_takes_most() {
        let p: Pattern<char> = Pattern::zero_or_more("a".into());
        assert_eq!(ends(&p, "aaab", 0), vec![3, 2, 1, 0]);
    }

    #[test]
    fn lazy_takes_fewest() {
        let p: Pattern<char> = Pattern::repetition("a".into(), 1.., Consumption::Lazy);
        assert_eq!(ends(&p, "aaab", 0), vec![1, 2, 3]);
    }

    #[test]
    fn greedy_backs_off_for_following_literal() {
        let p: Pattern<char> = Pattern::composite([Pattern::zero_or_more("a".into()), "ab".into()]);
        assert_eq!(fwd(&p, "aaab", 0), Some(4));
    }

    #[test]
    fn repetition_respects_maximum() {
        let p: Pattern<char> = Pattern::repetition("a".into(), 1..=2, Consumption::Greedy);
        assert_eq!(fwd(&p, "aaaa", 0), Some(2));
    }

    #[test]
    fn repetition_below_minimum_fails() {
        let p: Pattern<char> = Pattern::repetition("a".into(), 3.., Consumption::Greedy);
        assert_eq!(fwd(&p, "aab", 0), None);
    }

    #[test]
    fn repetition_of_empty_pattern_terminates() {
        let p: Pattern<char> = Pattern::zero_or_more(Pattern::literal([]));
        assert_eq!(fwd(&p, "abc", 0), Some(0));
        let p: Pattern<char> = Pattern::repetition(Pattern::literal([]), 2.., Consumption::Greedy);
        assert_eq!(fwd(&p, "abc", 0), Some(0));
    }

    // --- Reversed views ---

    #[test]
    fn reversed_view_reads_back_to_front() {
        let text = chars("abc");
        let view = View::reversed(&text);
        assert_eq!(view.get(0), Some(&'c'));
        assert_eq!(view.get(2), Some(&'a'));
        assert_eq!(view.get(3), None);
    }

    #[test]
    fn reversed_pattern_on_reversed_view() {
        let text = chars("xxabc");
        let p: Pattern<char> = "abc".into();
        let mut steps = Steps::for_len(text.len());
        assert_eq!(match_at(&p.reversed(), &View::reversed(&text), 0, &mut steps), Some(3));
    }

    // --- Step limit ---

    #[test]
    fn exhausted_steps_report_no_match() {
        let text = chars("aaaa");
        let p: Pattern<char> = Pattern::one_or_more("a".into());
        let mut steps = Steps::for_len(text.len());
        steps.taken = steps.limit;
        assert_eq!(match_at(&p, &View::forward(&text), 0, &mut steps), None);
        assert!(steps.exhausted());
    }

    #[test]
    fn nested_repetition_stops_at_step_limit() {
        let mut text = vec!['a'; 1_000];
        text.push('b');
        let p: Pattern<char> = Pattern::composite([
            Pattern::one_or_more(Pattern::one_or_more("a".into())),
            "c".into(),
        ]);
        let mut steps = Steps::for_len(text.len());
        assert_eq!(match_at(&p, &View::forward(&text), 0, &mut steps), None);
        assert!(steps.exhausted());
    }
}
