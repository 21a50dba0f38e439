//! Pattern matching, nesting search and diffing over ordered sequences.
//!
//! Anything that derefs to a slice of `PartialEq` elements can be searched
//! with a [`Pattern`], rewritten match by match, or compared against another
//! sequence to produce an edit script.
//!
//! # Example
//!
//! ```rust
//! use seqpat::{CollectionDifference, Pattern, SequenceMutation, SequenceSearch};
//!
//! let text: Vec<char> = "2(3x - (y + 4)) = z".chars().collect();
//!
//! let level = text
//!     .first_nesting_level(&"(".into(), &")".into())
//!     .unwrap();
//! assert_eq!(level.contents.text(), "3x - (y + 4)");
//!
//! let zeros = [0, 0, 0, 0, 0];
//! let pair = Pattern::literal([0, 0]);
//! assert_eq!(zeros.last_match(&pair).unwrap().range(), 3..5);
//! assert_eq!(zeros.matches(&pair).last().unwrap().range(), 2..4);
//!
//! let spaced: Vec<char> = "a  b".chars().collect();
//! let squeezed = spaced.replacing_matches(&Pattern::one_or_more(" ".into()), &[' ']);
//! assert_eq!(squeezed.iter().collect::<String>(), "a b");
//!
//! let moved = CollectionDifference::between(&['x', 'a', 'b'], &['a', 'b', 'x']).inferring_moves();
//! assert_eq!(moved.removals()[0].associated_with(), Some(2));
//! ```

pub mod diff;
pub mod difference;
pub mod pattern;
pub mod sequence;
mod span;

pub use diff::{Change, SequenceDiff, apply_changes};
pub use difference::{CollectionDifference, ElementChange};
pub use pattern::{Consumption, Pattern, PatternError, parse};
pub use sequence::{InPlaceMutation, SequenceMutation, SequenceSearch};
pub use span::{Match, NestingLevel};
