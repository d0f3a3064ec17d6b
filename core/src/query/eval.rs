use super::Expr;
use crate::{DocId, InvertedIndex};
use std::collections::BTreeSet;

/// Evaluate `expr` as set algebra over the index. Unknown terms match nothing;
/// `not` complements against `1..=index.num_docs()`.
pub fn evaluate(expr: &Expr, index: &InvertedIndex) -> BTreeSet<DocId> {
    match expr {
        Expr::Term(t) => index.postings(t).cloned().unwrap_or_default(),
        Expr::And(l, r) => {
            let left = evaluate(l, index);
            if left.is_empty() {
                return left;
            }
            let right = evaluate(r, index);
            left.intersection(&right).copied().collect()
        }
        Expr::Or(l, r) => {
            let mut left = evaluate(l, index);
            left.extend(evaluate(r, index));
            left
        }
        Expr::Not(x) => {
            let inner = evaluate(x, index);
            (1..=index.num_docs()).filter(|id| !inner.contains(id)).collect()
        }
    }
}
