use super::lexer::{lex, Token};
use super::{Expr, Operator, ParseError};

enum Pending {
    Open,
    Op(Operator),
}

/// Parse a boolean query into an [`Expr`].
///
/// Shunting-yard over two stacks: finished sub-trees in `output`, operators and
/// open parentheses in `ops`. Binary operators are left-associative; `not` is a
/// prefix operator and is pushed without reducing anything.
pub fn parse(query: &str) -> Result<Expr, ParseError> {
    let mut output: Vec<Expr> = Vec::new();
    let mut ops: Vec<Pending> = Vec::new();

    for token in lex(query) {
        match token {
            Token::Term(t) => output.push(Expr::Term(t)),
            Token::Op(Operator::Not) => ops.push(Pending::Op(Operator::Not)),
            Token::Op(op) => {
                while let Some(Pending::Op(top)) = ops.last() {
                    if top.precedence() < op.precedence() { break; }
                    let top = *top;
                    ops.pop();
                    reduce(&mut output, top)?;
                }
                ops.push(Pending::Op(op));
            }
            Token::LParen => ops.push(Pending::Open),
            Token::RParen => loop {
                match ops.pop() {
                    Some(Pending::Op(op)) => reduce(&mut output, op)?,
                    Some(Pending::Open) => break,
                    None => return Err(ParseError::UnbalancedParens),
                }
            },
        }
    }

    if ops.iter().any(|p| matches!(p, Pending::Open)) {
        return Err(ParseError::UnbalancedParens);
    }
    while let Some(Pending::Op(op)) = ops.pop() {
        reduce(&mut output, op)?;
    }

    match (output.pop(), output.is_empty()) {
        (Some(expr), true) => Ok(expr),
        _ => Err(ParseError::EmptyExpression),
    }
}

fn reduce(output: &mut Vec<Expr>, op: Operator) -> Result<(), ParseError> {
    let node = match op {
        Operator::Not => {
            let x = output.pop().ok_or(ParseError::MissingOperand(op))?;
            Expr::not(x)
        }
        Operator::And | Operator::Or => {
            let (Some(r), Some(l)) = (output.pop(), output.pop()) else {
                return Err(ParseError::MissingOperand(op));
            };
            if op == Operator::And { Expr::and(l, r) } else { Expr::or(l, r) }
        }
    };
    output.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Expr { Expr::term(s) }

    #[test]
    fn single_term() {
        assert_eq!(parse("Cat"), Ok(t("cat")));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(parse("a or b and c"), Ok(Expr::or(t("a"), Expr::and(t("b"), t("c")))));
        assert_eq!(parse("a and b or c"), Ok(Expr::or(Expr::and(t("a"), t("b")), t("c"))));
    }

    #[test]
    fn not_binds_tightest() {
        assert_eq!(parse("not a and b"), Ok(Expr::and(Expr::not(t("a")), t("b"))));
        assert_eq!(parse("a or not b"), Ok(Expr::or(t("a"), Expr::not(t("b")))));
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(parse("a or b or c"), Ok(Expr::or(Expr::or(t("a"), t("b")), t("c"))));
        assert_eq!(parse("a and b and c"), Ok(Expr::and(Expr::and(t("a"), t("b")), t("c"))));
    }

    #[test]
    fn stacked_not() {
        assert_eq!(parse("not not a"), Ok(Expr::not(Expr::not(t("a")))));
        assert_eq!(parse("not (not a)"), Ok(Expr::not(Expr::not(t("a")))));
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(parse("(a or b) and c"), Ok(Expr::and(Expr::or(t("a"), t("b")), t("c"))));
        assert_eq!(parse("not (a or b)"), Ok(Expr::not(Expr::or(t("a"), t("b")))));
    }

    #[test]
    fn unbalanced_parens() {
        assert_eq!(parse("(cat and dog"), Err(ParseError::UnbalancedParens));
        assert_eq!(parse("cat and dog)"), Err(ParseError::UnbalancedParens));
        assert_eq!(parse(")("), Err(ParseError::UnbalancedParens));
        assert_eq!(parse("(cat and"), Err(ParseError::UnbalancedParens));
        assert_eq!(parse("(cat or"), Err(ParseError::UnbalancedParens));
        assert_eq!(parse("dog and (cat or"), Err(ParseError::UnbalancedParens));
    }

    #[test]
    fn empty_and_dangling_input() {
        assert_eq!(parse(""), Err(ParseError::EmptyExpression));
        assert_eq!(parse("  ,; "), Err(ParseError::EmptyExpression));
        assert_eq!(parse("()"), Err(ParseError::EmptyExpression));
        assert_eq!(parse("cat dog"), Err(ParseError::EmptyExpression));
    }

    #[test]
    fn missing_operands() {
        assert_eq!(parse("cat and"), Err(ParseError::MissingOperand(Operator::And)));
        assert_eq!(parse("or dog"), Err(ParseError::MissingOperand(Operator::Or)));
        assert_eq!(parse("not"), Err(ParseError::MissingOperand(Operator::Not)));
    }
}
