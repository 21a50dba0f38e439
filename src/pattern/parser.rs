//! Recursive descent parser for textual `Pattern<char>` strings.

use std::iter::Peekable;
use std::str::Chars;

use super::ast::{Consumption, Pattern};

/// Errors that can occur while parsing a pattern string.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    UnexpectedChar(char),
    UnexpectedEnd,
    InvalidNumber,
    UnclosedGroup,
    UnclosedString,
    InvalidQuantifierRange,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedChar(c) => write!(f, "Unexpected character in pattern: {c:?}"),
            Self::UnexpectedEnd => write!(f, "Unexpected end of pattern"),
            Self::InvalidNumber => write!(f, "Invalid number in pattern"),
            Self::UnclosedGroup => write!(f, "Unclosed group '(' in pattern"),
            Self::UnclosedString => write!(f, "Unclosed string literal in pattern"),
            Self::InvalidQuantifierRange => write!(f, "Invalid quantifier range [n,m]"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Parse a pattern string into a [`Pattern<char>`].
pub fn parse(input: &str) -> Result<Pattern<char>, PatternError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
    };
    let pattern = parser.parse_alternative()?;
    parser.skip_space();
    match parser.chars.next() {
        None => Ok(pattern),
        // The only terminator left unconsumed at top level is a stray ')'.
        Some(c) => Err(PatternError::UnexpectedChar(c)),
    }
}

/// Repetition bounds as written, before consumption is known.
struct Quantifier {
    min: usize,
    max: Option<usize>,
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn parse_alternative(&mut self) -> Result<Pattern<char>, PatternError> {
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.parse_sequence()?);
            self.skip_space();
            if self.chars.peek() == Some(&'|') {
                self.chars.next(); // consume '|'
            } else {
                break;
            }
        }
        if alternatives.len() == 1 {
            return Ok(alternatives.remove(0));
        }
        Ok(Pattern::Alternative(alternatives))
    }

    fn parse_sequence(&mut self) -> Result<Pattern<char>, PatternError> {
        let mut items = Vec::new();
        while let Some(item) = self.parse_item()? {
            items.push(item);
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(Pattern::Composite(items))
    }

    /// Parse one item (optional quantifier + element).
    ///
    /// Returns `None` at sequence terminators: `|`, `)`, end-of-input.
    fn parse_item(&mut self) -> Result<Option<Pattern<char>>, PatternError> {
        self.skip_space();

        match self.chars.peek() {
            None | Some('|') | Some(')') => return Ok(None),
            _ => {}
        }

        let quantifier = self.parse_quantifier()?;
        let consumption = if quantifier.is_some() && self.chars.peek() == Some(&'?') {
            self.chars.next();
            Consumption::Lazy
        } else {
            Consumption::Greedy
        };

        self.skip_space();
        match self.chars.peek() {
            None | Some('|') | Some(')') => {
                if quantifier.is_some() {
                    // A quantifier with no following element is an error
                    return Err(PatternError::UnexpectedEnd);
                }
                return Ok(None);
            }
            _ => {}
        }

        let element = self.parse_element()?;
        Ok(Some(match quantifier {
            None => element,
            Some(Quantifier { min, max }) => Pattern::Repetition {
                pattern: Box::new(element),
                min,
                max,
                consumption,
            },
        }))
    }

    /// Try to parse a quantifier prefix.  Returns `None` if the next token is
    /// not a quantifier.
    fn parse_quantifier(&mut self) -> Result<Option<Quantifier>, PatternError> {
        match self.chars.peek() {
            Some('*') => {
                self.chars.next();
                Ok(Some(Quantifier { min: 0, max: None }))
            }
            Some('+') => {
                self.chars.next();
                Ok(Some(Quantifier { min: 1, max: None }))
            }
            Some('[') => {
                self.chars.next();
                Ok(Some(self.parse_bracket_quantifier()?))
            }
            Some(&c) if c.is_ascii_digit() => {
                let n = self.parse_number()?;
                Ok(Some(Quantifier { min: n, max: Some(n) }))
            }
            _ => Ok(None),
        }
    }

    /// Parse a `[n,m]`-style quantifier (the opening `[` has already been consumed).
    fn parse_bracket_quantifier(&mut self) -> Result<Quantifier, PatternError> {
        let first = if matches!(self.chars.peek(), Some(',') | Some(']')) {
            None
        } else {
            Some(self.parse_number()?)
        };

        // Single-number form: [n] = exactly n
        if self.chars.peek() == Some(&']') {
            self.chars.next();
            let n = first.ok_or(PatternError::InvalidQuantifierRange)?;
            return Ok(Quantifier { min: n, max: Some(n) });
        }

        match self.chars.next() {
            Some(',') => {}
            _ => return Err(PatternError::InvalidQuantifierRange),
        }

        let second = if self.chars.peek() == Some(&']') {
            None
        } else {
            Some(self.parse_number()?)
        };

        match self.chars.next() {
            Some(']') => {}
            _ => return Err(PatternError::InvalidQuantifierRange),
        }

        match (first, second) {
            (n, None) => Ok(Quantifier {
                min: n.unwrap_or(0),
                max: None,
            }),
            (None, Some(m)) => Ok(Quantifier { min: 0, max: Some(m) }),
            (Some(n), Some(m)) if n <= m => Ok(Quantifier { min: n, max: Some(m) }),
            _ => Err(PatternError::InvalidQuantifierRange),
        }
    }

    fn parse_number(&mut self) -> Result<usize, PatternError> {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if s.is_empty() {
            return Err(PatternError::InvalidNumber);
        }
        s.parse::<usize>().map_err(|_| PatternError::InvalidNumber)
    }

    fn parse_element(&mut self) -> Result<Pattern<char>, PatternError> {
        match self.chars.peek() {
            None => Err(PatternError::UnexpectedEnd),
            Some(&'(') => {
                self.chars.next();
                let inner = self.parse_alternative()?;
                match self.chars.next() {
                    Some(')') => {}
                    _ => return Err(PatternError::UnclosedGroup),
                }
                Ok(inner)
            }
            Some(&'"') => Ok(Pattern::Literal(self.parse_string()?.chars().collect())),
            Some(&'\'') => Ok(case_folded(&self.parse_string()?)),
            Some(&c) => Err(PatternError::UnexpectedChar(c)),
        }
    }

    /// Parse a `'...'` or `"..."` string literal.
    fn parse_string(&mut self) -> Result<String, PatternError> {
        let delim = self.chars.next().ok_or(PatternError::UnexpectedEnd)?;
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == delim => break,
                Some(c) => text.push(c),
                None => return Err(PatternError::UnclosedString),
            }
        }
        Ok(text)
    }

    fn skip_space(&mut self) {
        while matches!(self.chars.peek(), Some(' ') | Some('\t')) {
            self.chars.next();
        }
    }
}

/// An ASCII case-insensitive literal: one alternative per cased character.
fn case_folded(text: &str) -> Pattern<char> {
    let parts: Vec<Pattern<char>> = text
        .chars()
        .map(|c| {
            let (lower, upper) = (c.to_ascii_lowercase(), c.to_ascii_uppercase());
            if lower == upper {
                Pattern::Literal(vec![c])
            } else {
                Pattern::alternative([Pattern::Literal(vec![lower]), Pattern::Literal(vec![upper])])
            }
        })
        .collect();
    Pattern::Composite(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(s: &str) -> Pattern<char> {
        parse(s).expect("parse should succeed")
    }
    fn parse_err(s: &str) -> PatternError {
        parse(s).expect_err("parse should fail")
    }

    // --- Literals ---

    #[test]
    fn test_double_quote_literal() {
        assert_eq!(parse_ok(r#""hello""#), Pattern::from("hello"));
    }

    #[test]
    fn test_single_quote_literal_case_fold() {
        match parse_ok("'a1'") {
            Pattern::Composite(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(
                    parts[0],
                    Pattern::alternative([Pattern::from("a"), Pattern::from("A")])
                );
                assert_eq!(parts[1], Pattern::from("1"));
            }
            other => panic!("expected Composite, got {other:?}"),
        }
    }

    // --- Quantifiers ---

    fn bounds(p: Pattern<char>) -> (usize, Option<usize>, Consumption) {
        match p {
            Pattern::Repetition {
                min,
                max,
                consumption,
                ..
            } => (min, max, consumption),
            other => panic!("expected Repetition, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_or_more() {
        assert_eq!(bounds(parse_ok(r#"*"a""#)), (0, None, Consumption::Greedy));
    }

    #[test]
    fn test_one_or_more() {
        assert_eq!(bounds(parse_ok(r#"+"a""#)), (1, None, Consumption::Greedy));
    }

    #[test]
    fn test_lazy_marker() {
        assert_eq!(bounds(parse_ok(r#"*?"a""#)), (0, None, Consumption::Lazy));
        assert_eq!(bounds(parse_ok(r#"[2,4]? "a""#)), (2, Some(4), Consumption::Lazy));
    }

    #[test]
    fn test_exactly_n() {
        assert_eq!(bounds(parse_ok(r#"3"a""#)), (3, Some(3), Consumption::Greedy));
        assert_eq!(bounds(parse_ok(r#"[3]"a""#)), (3, Some(3), Consumption::Greedy));
    }

    #[test]
    fn test_bracket_forms() {
        assert_eq!(bounds(parse_ok(r#"[3,]"a""#)).0, 3);
        assert_eq!(bounds(parse_ok(r#"[3,]"a""#)).1, None);
        assert_eq!(bounds(parse_ok(r#"[,5]"a""#)).1, Some(5));
        assert_eq!(bounds(parse_ok(r#"[2,5]"a""#)).0, 2);
        assert_eq!(bounds(parse_ok(r#"[,]"a""#)).1, None);
    }

    // --- Structure ---

    #[test]
    fn test_alternation() {
        assert_eq!(
            parse_ok(r#""a"|"b""#),
            Pattern::alternative([Pattern::from("a"), Pattern::from("b")])
        );
    }

    #[test]
    fn test_sequence_is_composite() {
        assert_eq!(
            parse_ok(r#""a" "b""#),
            Pattern::composite([Pattern::from("a"), Pattern::from("b")])
        );
    }

    #[test]
    fn test_group() {
        assert_eq!(
            parse_ok(r#"("a"|"b") "c""#),
            Pattern::composite([
                Pattern::alternative([Pattern::from("a"), Pattern::from("b")]),
                Pattern::from("c"),
            ])
        );
    }

    // --- Errors ---

    #[test]
    fn test_unclosed_group() {
        assert_eq!(parse_err(r#"("a""#), PatternError::UnclosedGroup);
    }

    #[test]
    fn test_unclosed_string() {
        assert_eq!(parse_err("'hello"), PatternError::UnclosedString);
    }

    #[test]
    fn test_stray_close() {
        assert_eq!(parse_err(r#""a")"#), PatternError::UnexpectedChar(')'));
    }

    #[test]
    fn test_dangling_quantifier() {
        assert_eq!(parse_err("*"), PatternError::UnexpectedEnd);
    }

    #[test]
    fn test_bare_word_rejected() {
        assert_eq!(parse_err("abc"), PatternError::UnexpectedChar('a'));
    }

    #[test]
    fn test_invalid_bracket_range() {
        assert_eq!(
            parse_err(r#"[5,2]"a""#),
            PatternError::InvalidQuantifierRange
        );
    }
}
