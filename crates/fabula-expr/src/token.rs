//! Tokenizer for prerequisite expressions.
//!
//! Single pass over the source with one character of lookahead. Two-character
//! comparators are matched before one-character ones, string literals accept
//! either quote style, and identifiers are classified into the reserved words
//! (`includes`, `exists`, `true`, `false`) or PATH tokens. Path tokens keep
//! their dots and bracket accessors (`prop[0]`, `prop["key"]`) intact; the
//! path resolver splits them later.

use crate::error::ExprError;

/// One lexical token of a prerequisite expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// Numeric literal.
    Number(f64),
    /// Quoted string literal (quotes stripped).
    Str(String),
    /// `true` or `false`.
    Bool(bool),
    /// The `includes` membership keyword.
    Includes,
    /// The `exists` existence keyword.
    Exists,
    /// A dotted context path, e.g. `actor.stats.wealth`.
    Path(String),
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Eq => f.write_str("=="),
            Self::Ne => f.write_str("!="),
            Self::Gt => f.write_str(">"),
            Self::Ge => f.write_str(">="),
            Self::Lt => f.write_str("<"),
            Self::Le => f.write_str("<="),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Includes => f.write_str("includes"),
            Self::Exists => f.write_str("exists"),
            Self::Path(p) => f.write_str(p),
        }
    }
}

/// Whether `c` may continue an identifier/path token.
///
/// Brackets are included so keyed accessors like `prop[0]` stay inside a
/// single PATH token; quoted accessor keys are consumed verbatim by the
/// tokenizer itself, so a key may contain any character but its quote.
fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '[' || c == ']'
}

/// Tokenize an expression string.
///
/// # Errors
///
/// Returns [`ExprError::UnexpectedChar`] for characters outside the
/// expression alphabet, [`ExprError::UnterminatedString`] for an unclosed
/// quote, and [`ExprError::InvalidNumber`] for malformed numeric literals.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Eq);
                } else {
                    return Err(ExprError::UnexpectedChar('='));
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    return Err(ExprError::UnexpectedChar('!'));
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            quote @ ('\'' | '"') => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => literal.push(ch),
                        None => return Err(ExprError::UnterminatedString),
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' {
                        literal.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '"' || ch == '\'' {
                        // A quoted accessor key is taken verbatim through
                        // its closing quote, so keys may contain spaces.
                        ident.push(ch);
                        chars.next();
                        loop {
                            match chars.next() {
                                Some(inner) => {
                                    ident.push(inner);
                                    if inner == ch {
                                        break;
                                    }
                                }
                                None => return Err(ExprError::UnterminatedString),
                            }
                        }
                    } else if is_path_char(ch) {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match ident.as_str() {
                    "includes" => Token::Includes,
                    "exists" => Token::Exists,
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Path(ident),
                });
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_comparison_expression() {
        let tokens = tokenize("actor.stats.wealth >= 100").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Path(String::from("actor.stats.wealth")),
                Token::Ge,
                Token::Number(100.0),
            ],
        );
    }

    #[test]
    fn two_char_comparators_win_over_one_char() {
        let tokens = tokenize("a<=b a<b a==b a!=b").unwrap();
        let comparators: Vec<&Token> = tokens
            .iter()
            .filter(|t| !matches!(t, Token::Path(_)))
            .collect();
        assert_eq!(
            comparators,
            vec![&Token::Le, &Token::Lt, &Token::Eq, &Token::Ne],
        );
    }

    #[test]
    fn keywords_and_booleans_are_reserved() {
        let tokens = tokenize("actor.offices includes true exists false").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Path(String::from("actor.offices")),
                Token::Includes,
                Token::Bool(true),
                Token::Exists,
                Token::Bool(false),
            ],
        );
    }

    #[test]
    fn string_literals_accept_both_quotes() {
        let tokens = tokenize("'powers.SUBPOENA' \"loc_forum\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Str(String::from("powers.SUBPOENA")),
                Token::Str(String::from("loc_forum")),
            ],
        );
    }

    #[test]
    fn path_keeps_bracket_accessors() {
        let tokens = tokenize("world.locations[0] world.global[\"unrest\"]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Path(String::from("world.locations[0]")),
                Token::Path(String::from("world.global[\"unrest\"]")),
            ],
        );
    }

    #[test]
    fn quoted_accessor_key_may_contain_spaces() {
        let tokens = tokenize("world.global[\"grain price\"] > 10").unwrap();
        assert_eq!(
            tokens.first(),
            Some(&Token::Path(String::from("world.global[\"grain price\"]"))),
        );
        assert_eq!(tokens.get(1), Some(&Token::Gt));
    }

    #[test]
    fn unterminated_accessor_key_is_error() {
        assert_eq!(
            tokenize("world.global[\"grain price"),
            Err(ExprError::UnterminatedString),
        );
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(tokenize("'oops"), Err(ExprError::UnterminatedString));
    }

    #[test]
    fn stray_equals_is_error() {
        assert_eq!(tokenize("a = b"), Err(ExprError::UnexpectedChar('=')));
    }

    #[test]
    fn unknown_character_is_error() {
        assert_eq!(tokenize("a & b"), Err(ExprError::UnexpectedChar('&')));
    }

    #[test]
    fn malformed_number_is_error() {
        assert_eq!(
            tokenize("1.2.3"),
            Err(ExprError::InvalidNumber(String::from("1.2.3"))),
        );
    }

    #[test]
    fn division_and_parens_tokenize() {
        let tokens = tokenize("(a + b) / 2").unwrap();
        assert_eq!(tokens.first(), Some(&Token::LParen));
        assert!(tokens.contains(&Token::Slash));
        assert!(tokens.contains(&Token::RParen));
    }
}
