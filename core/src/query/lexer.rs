use super::Operator;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEXEME: Regex = Regex::new(r"(?u)\(|\)|\w+").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    Op(Operator),
    Term(String),
}

/// Split a query into tokens. Characters outside parentheses and word runs are
/// separators; keywords only match whole words, so `nothing` is a term.
pub fn lex(query: &str) -> Vec<Token> {
    LEXEME
        .find_iter(query)
        .map(|m| match m.as_str() {
            "(" => Token::LParen,
            ")" => Token::RParen,
            word => match Operator::from_keyword(word) {
                Some(op) => Token::Op(op),
                None => Token::Term(word.to_lowercase()),
            },
        })
        .collect()
}
