//! Recursive-descent parser for prerequisite expressions.
//!
//! Grammar (informal):
//!
//! ```text
//! expression := membership | existence | comparison
//! comparison := arithmetic (comparator arithmetic)?
//! arithmetic := value (('+'|'-'|'*'|'/') value)*
//! value      := NUMBER | STRING | BOOLEAN | PATH | '(' arithmetic ')'
//! ```
//!
//! Arithmetic folds left to right with no operator precedence, matching the
//! behavior prerequisite authors rely on. A trailing unconsumed token is a
//! parse error.

use crate::error::ExprError;
use crate::token::Token;

/// Comparator between two arithmetic operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    /// `==` deep equality.
    Eq,
    /// `!=` deep inequality.
    Ne,
    /// `>` numeric greater-than.
    Gt,
    /// `>=` numeric greater-or-equal.
    Ge,
    /// `<` numeric less-than.
    Lt,
    /// `<=` numeric less-or-equal.
    Le,
}

/// Arithmetic operator inside a flat fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (division by zero yields 0, not an error).
    Div,
}

/// A leaf value in an arithmetic chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Context path, resolved at evaluation time.
    Path(String),
    /// Parenthesized sub-chain.
    Group(Box<Arith>),
}

/// A flat left-associative arithmetic chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Arith {
    /// The first operand.
    pub first: Operand,
    /// Remaining (operator, operand) pairs, applied in order.
    pub rest: Vec<(ArithOp, Operand)>,
}

impl Arith {
    /// Whether the chain is a single bare operand with no operators.
    pub fn single(&self) -> Option<&Operand> {
        if self.rest.is_empty() {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// A parsed prerequisite expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `path exists` -- true iff the path resolves to a non-null value.
    Exists {
        /// The path to probe.
        path: String,
    },
    /// `haystack includes needle` -- array membership or substring match.
    Includes {
        /// The collection or string searched.
        haystack: Arith,
        /// The element or substring looked for.
        needle: Arith,
    },
    /// `lhs <cmp> rhs`.
    Compare {
        /// Left arithmetic chain.
        lhs: Arith,
        /// The comparator.
        cmp: Cmp,
        /// Right arithmetic chain.
        rhs: Arith,
    },
    /// A bare chain with no comparator, evaluated truthily.
    Truthy {
        /// The chain.
        value: Arith,
    },
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    const fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos = self.pos.saturating_add(1);
        }
        token
    }

    fn parse_expression(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_arith()?;

        let expr = match self.peek() {
            None => Expr::Truthy { value: lhs },
            Some(Token::Exists) => {
                self.next();
                match lhs.single() {
                    Some(Operand::Path(path)) => Expr::Exists { path: path.clone() },
                    _ => return Err(ExprError::ExistsWithoutPath),
                }
            }
            Some(Token::Includes) => {
                self.next();
                let needle = self.parse_arith()?;
                Expr::Includes {
                    haystack: lhs,
                    needle,
                }
            }
            Some(token) => {
                let cmp = match token {
                    Token::Eq => Cmp::Eq,
                    Token::Ne => Cmp::Ne,
                    Token::Gt => Cmp::Gt,
                    Token::Ge => Cmp::Ge,
                    Token::Lt => Cmp::Lt,
                    Token::Le => Cmp::Le,
                    other => return Err(ExprError::UnexpectedToken(other.to_string())),
                };
                self.next();
                let rhs = self.parse_arith()?;
                Expr::Compare { lhs, cmp, rhs }
            }
        };

        match self.peek() {
            None => Ok(expr),
            Some(trailing) => Err(ExprError::UnexpectedToken(trailing.to_string())),
        }
    }

    fn parse_arith(&mut self) -> Result<Arith, ExprError> {
        let first = self.parse_value()?;
        let mut rest = Vec::new();

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Plus => ArithOp::Add,
                Token::Minus => ArithOp::Sub,
                Token::Star => ArithOp::Mul,
                Token::Slash => ArithOp::Div,
                _ => break,
            };
            self.next();
            let operand = self.parse_value()?;
            rest.push((op, operand));
        }

        Ok(Arith { first, rest })
    }

    fn parse_value(&mut self) -> Result<Operand, ExprError> {
        match self.next() {
            None => Err(ExprError::UnexpectedEnd),
            Some(Token::Number(n)) => Ok(Operand::Number(*n)),
            Some(Token::Str(s)) => Ok(Operand::Str(s.clone())),
            Some(Token::Bool(b)) => Ok(Operand::Bool(*b)),
            Some(Token::Path(p)) => Ok(Operand::Path(p.clone())),
            Some(Token::LParen) => {
                let inner = self.parse_arith()?;
                match self.next() {
                    Some(Token::RParen) => Ok(Operand::Group(Box::new(inner))),
                    _ => Err(ExprError::ExpectedClosingParen),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken(other.to_string())),
        }
    }
}

/// Parse a token stream into an expression.
///
/// # Errors
///
/// Returns a parse [`ExprError`] for malformed syntax, including trailing
/// tokens after a complete expression.
pub fn parse(tokens: &[Token]) -> Result<Expr, ExprError> {
    Parser::new(tokens).parse_expression()
}
