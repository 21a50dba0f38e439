//! Sequence patterns.
//!
//! A [`Pattern`] describes a run of elements: a literal, an ordered set of
//! alternatives, a bounded repetition, or a composite of sub-patterns. Any
//! element type with `PartialEq` can be matched.
//!
//! For `char` sequences patterns can also be written as text:
//!
//! | Token          | Meaning                                        |
//! |----------------|------------------------------------------------|
//! | `"text"`       | Literal (exact case)                           |
//! | `'text'`       | Literal (ASCII case-folded)                    |
//! | `(…)`          | Grouping                                       |
//! | `X\|Y`         | Alternative (first declared wins)              |
//! | `X Y`          | Composite                                      |
//! | `*X`           | Zero or more                                   |
//! | `+X`           | One or more                                    |
//! | `nX`           | Exactly n                                      |
//! | `[n]X`         | Exactly n                                      |
//! | `[n,]X`        | At least n                                     |
//! | `[,m]X`        | At most m                                      |
//! | `[n,m]X`       | Between n and m                                |
//! | `*?X`, `[n,m]?X` | Lazy repetition (fewest first)               |

pub mod ast;
pub(crate) mod matcher;
pub mod parser;

pub use ast::{Consumption, Pattern};
pub use parser::{PatternError, parse};
