//! Boolean query language: terms combined with `and`, `or`, `not` and parentheses.
//!
//! Queries are lexed into tokens, parsed into an [`Expr`] with a shunting-yard
//! pass (`not` binds tighter than `and`, which binds tighter than `or`), then
//! evaluated against an [`InvertedIndex`](crate::InvertedIndex) as set algebra.

mod eval;
mod generate;
mod lexer;
mod parser;

pub use eval::evaluate;
pub use generate::{generate_queries, QueryShape};
pub use lexer::{lex, Token};
pub use parser::parse;

use crate::{DocId, InvertedIndex};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Not,
    And,
    Or,
}

impl Operator {
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Not => 3,
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("not") {
            Some(Operator::Not)
        } else if word.eq_ignore_ascii_case("and") {
            Some(Operator::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Operator::Or)
        } else {
            None
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Not => f.write_str("not"),
            Operator::And => f.write_str("and"),
            Operator::Or => f.write_str("or"),
        }
    }
}

/// Parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn term(t: impl Into<String>) -> Self { Expr::Term(t.into()) }

    pub fn and(l: Expr, r: Expr) -> Self { Expr::And(Box::new(l), Box::new(r)) }

    pub fn or(l: Expr, r: Expr) -> Self { Expr::Or(Box::new(l), Box::new(r)) }

    #[allow(clippy::should_implement_trait)]
    pub fn not(x: Expr) -> Self { Expr::Not(Box::new(x)) }

    pub fn evaluate(&self, index: &InvertedIndex) -> BTreeSet<DocId> {
        evaluate(self, index)
    }
}

/// Fully parenthesised; parses back to the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(t) => f.write_str(t),
            Expr::And(l, r) => write!(f, "({l} and {r})"),
            Expr::Or(l, r) => write!(f, "({l} or {r})"),
            Expr::Not(x) => write!(f, "(not {x})"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("query does not reduce to a single expression")]
    EmptyExpression,
    #[error("operator `{0}` is missing an operand")]
    MissingOperand(Operator),
}

/// Parse `query` and evaluate it against `index`.
pub fn boolean_search(query: &str, index: &InvertedIndex) -> Result<BTreeSet<DocId>, ParseError> {
    let expr = parse(query)?;
    Ok(evaluate(&expr, index))
}
