//! Error types for the `fabula-expr` crate.
//!
//! Every fallible step of the expression pipeline -- tokenizing, parsing,
//! path resolution, evaluation -- returns [`ExprError`]. The public
//! evaluator surface never propagates these as `Err`; it folds them into
//! result reports so a single malformed operator definition cannot abort a
//! batch prerequisite check.

/// Errors produced while compiling or evaluating a prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// The tokenizer hit a character outside the expression alphabet.
    #[error("unexpected character '{0}' in expression")]
    UnexpectedChar(char),

    /// A string literal was opened but never closed.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A numeric literal could not be parsed (e.g. `1.2.3`).
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    /// The parser hit a token it cannot use at this position.
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    /// The expression ended where a value or operator was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A parenthesized group was opened but never closed.
    #[error("expected closing parenthesis")]
    ExpectedClosingParen,

    /// `exists` was applied to something other than a bare path.
    #[error("`exists` requires a path operand")]
    ExistsWithoutPath,

    /// The first path segment is not a known context root.
    #[error("unknown context root: {0}")]
    UnknownContext(String),

    /// The path's context root was not supplied in the evaluation context.
    #[error("context not available: {0}")]
    ContextNotAvailable(String),

    /// The path did not resolve to a value.
    #[error("could not resolve path: {0}")]
    UnresolvablePath(String),

    /// Arithmetic or an ordered comparison was given a non-number.
    #[error("expected number, got {0}")]
    ExpectedNumber(String),

    /// Arithmetic overflowed to a non-finite result.
    #[error("arithmetic produced a non-finite result")]
    NonFinite,
}
