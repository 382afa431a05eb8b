//! Token pattern matcher
//!
//! A pattern is a space-separated list of atoms matched one-to-one against
//! consecutive tokens:
//!
//! | Atom          | Matches                                           |
//! |---------------|---------------------------------------------------|
//! | `text`        | a token with exactly this text                    |
//! | `%var%`       | an identifier (letter or underscore first)        |
//! | `%type%`      | same as `%var%`, spelled for readability          |
//! | `%num%`       | a token starting with a digit                     |
//! | `%str%`       | a string literal                                  |
//! | `[abc]`       | a one-character token that is one of `a`, `b`, `c`|
//! | `atom|`       | `atom`, or nothing                                |
//!
//! There is no backtracking: the first atom that fails ends the match.

use super::token::{is_name, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom<'p> {
    Literal(&'p str),
    Name,
    Number,
    Str,
    OneOf(&'p str),
}

impl<'p> Atom<'p> {
    /// Parse one atom, returning it with its optional flag.
    fn parse(raw: &'p str) -> (Self, bool) {
        let (raw, optional) = match raw.strip_suffix('|') {
            Some(stripped) if !stripped.is_empty() && raw != "||" => (stripped, true),
            _ => (raw, false),
        };
        let atom = match raw {
            "%var%" | "%type%" => Atom::Name,
            "%num%" => Atom::Number,
            "%str%" => Atom::Str,
            _ if raw.len() > 2 && raw.starts_with('[') && raw.ends_with(']') => {
                Atom::OneOf(&raw[1..raw.len() - 1])
            }
            _ => Atom::Literal(raw),
        };
        (atom, optional)
    }

    fn accepts(&self, token: &Token) -> bool {
        match self {
            Atom::Literal(text) => token.text == *text,
            Atom::Name => is_name(&token.text),
            Atom::Number => token.is_number(),
            Atom::Str => token.text.starts_with('"'),
            Atom::OneOf(chars) => token.is_one_of(chars),
        }
    }
}

/// Match `pattern` against the tokens starting at `start`.
///
/// Never mutates or looks behind `start`. Running off the end of `tokens`
/// before a required atom is satisfied is a mismatch.
pub fn matches<T: AsRef<Token>>(tokens: &[T], start: usize, pattern: &str) -> bool {
    let mut pos = start;
    for raw in pattern.split_whitespace() {
        let (atom, optional) = Atom::parse(raw);
        let hit = tokens.get(pos).is_some_and(|t| atom.accepts(t.as_ref()));
        if hit {
            pos += 1;
        } else if !optional {
            return false;
        }
    }
    true
}

/// Text of the token at `pos`, or `""` past the end.
pub fn text_at<T: AsRef<Token>>(tokens: &[T], pos: usize) -> &str {
    tokens.get(pos).map_or("", |t| t.as_ref().text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        src.split_whitespace().map(|t| Token::new(t, 0, 1)).collect()
    }

    #[test]
    fn test_literals() {
        let t = tokens("class Fred {");
        assert!(matches(&t, 0, "class Fred {"));
        assert!(!matches(&t, 0, "struct Fred {"));
        assert!(matches(&t, 1, "Fred"));
    }

    #[test]
    fn test_name_atoms() {
        let t = tokens("int _x 42 \"s\"");
        assert!(matches(&t, 0, "%type% %var% %num% %str%"));
        assert!(!matches(&t, 2, "%var%"));
        assert!(!matches(&t, 0, "%num%"));
    }

    #[test]
    fn test_bracket_atom() {
        let t = tokens("( ; [ ==");
        assert!(matches(&t, 0, "[,;()[] [,;()[] [,;()[]"));
        assert!(!matches(&t, 3, "[=!]"));
        // a lone bracket is a literal
        assert!(matches(&t, 2, "["));
    }

    #[test]
    fn test_optional_atom() {
        let with = tokens(") const {");
        let without = tokens(") {");
        assert!(matches(&with, 0, ") const| {"));
        assert!(matches(&without, 0, ") const| {"));
        assert!(!matches(&tokens(") ;"), 0, ") const| {"));
    }

    #[test]
    fn test_logical_or_is_not_optional() {
        let t = tokens("a || b");
        assert!(matches(&t, 1, "|| %var%"));
        assert!(!matches(&tokens("a b"), 1, "|| %var%"));
    }

    #[test]
    fn test_end_of_sequence() {
        let t = tokens("struct Fred");
        assert!(!matches(&t, 0, "struct Fred ;"));
        assert!(!matches(&t, 5, "struct"));
        assert!(matches(&t, 0, "struct %var%"));
        assert_eq!(text_at(&t, 1), "Fred");
        assert_eq!(text_at(&t, 2), "");
    }

    #[test]
    fn test_token_refs() {
        let t = tokens("Fred * fred )");
        let view: Vec<&Token> = t.iter().collect();
        assert!(matches(&view, 0, "%type% * %var%"));
        assert!(matches(&view, 3, "[,;()[]"));
    }
}
