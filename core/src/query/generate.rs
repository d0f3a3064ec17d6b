use super::lexer::{lex, Token};
use crate::InvertedIndex;
use rand::Rng;

/// Bounds on the size of generated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryShape {
    pub min_terms: usize,
    pub max_terms: usize,
    /// Nesting depth at which a branch stops splitting and becomes a term.
    pub max_depth: usize,
}

impl Default for QueryShape {
    fn default() -> Self {
        Self { min_terms: 3, max_terms: 8, max_depth: 3 }
    }
}

const NOT_PROBABILITY: f64 = 0.3;
const PAREN_PROBABILITY: f64 = 0.5;

/// Random well-formed queries over the index vocabulary.
///
/// Each query splits its term budget between the two sides of a random `and` /
/// `or`, negates either side with probability 0.3 and parenthesises the pair
/// with probability 0.5. Returns nothing if the index has no usable terms.
pub fn generate_queries<R: Rng>(index: &InvertedIndex, count: usize, shape: QueryShape, rng: &mut R) -> Vec<String> {
    let vocab = vocabulary(index);
    if vocab.is_empty() {
        return Vec::new();
    }
    let min = shape.min_terms.max(1);
    let max = shape.max_terms.max(min);
    (0..count)
        .map(|_| {
            let num_terms = rng.random_range(min..=max);
            expression(&vocab, num_terms, shape.max_depth, rng)
        })
        .collect()
}

/// Sorted terms that read back as exactly one query term.
fn vocabulary(index: &InvertedIndex) -> Vec<&str> {
    let mut terms: Vec<&str> = index
        .terms()
        .map(|(term, _)| term)
        .filter(|term| matches!(lex(term).as_slice(), [Token::Term(t)] if t == term))
        .collect();
    terms.sort_unstable();
    terms
}

fn expression<R: Rng>(vocab: &[&str], num_terms: usize, depth: usize, rng: &mut R) -> String {
    if num_terms <= 1 || depth == 0 {
        return vocab[rng.random_range(0..vocab.len())].to_string();
    }
    let op = if rng.random_bool(0.5) { "and" } else { "or" };
    let left_terms = rng.random_range(1..num_terms);
    let mut left = expression(vocab, left_terms, depth - 1, rng);
    let mut right = expression(vocab, num_terms - left_terms, depth - 1, rng);
    if rng.random_bool(NOT_PROBABILITY) {
        left = negate(left);
    }
    if rng.random_bool(NOT_PROBABILITY) {
        right = negate(right);
    }
    let expr = format!("{left} {op} {right}");
    if rng.random_bool(PAREN_PROBABILITY) { format!("({expr})") } else { expr }
}

fn negate(expr: String) -> String {
    if expr.starts_with("not ") { expr } else { format!("not {expr}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::boolean_search;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeMap, BTreeSet};

    fn index() -> InvertedIndex {
        let map = BTreeMap::from([
            ("cat".to_string(), BTreeSet::from([1, 2])),
            ("dog".to_string(), BTreeSet::from([2, 3])),
            ("bird".to_string(), BTreeSet::from([4])),
            ("don't".to_string(), BTreeSet::from([1])),
        ]);
        InvertedIndex::from_postings(map, 4).unwrap()
    }

    #[test]
    fn generated_queries_parse_and_stay_in_universe() {
        let index = index();
        let mut rng = StdRng::seed_from_u64(7);
        let shape = QueryShape { min_terms: 2, max_terms: 6, max_depth: 3 };
        let queries = generate_queries(&index, 200, shape, &mut rng);
        assert_eq!(queries.len(), 200);
        for q in &queries {
            let hits = boolean_search(q, &index).unwrap_or_else(|e| panic!("{q:?}: {e}"));
            assert!(hits.is_subset(&index.universe()), "{q:?}");
            let terms = lex(q).into_iter().filter(|t| matches!(t, Token::Term(_))).count();
            assert!((1..=6).contains(&terms), "{q:?}");
            assert!(!q.contains("don"), "{q:?}");
        }
    }

    #[test]
    fn zero_depth_yields_single_terms() {
        let mut rng = StdRng::seed_from_u64(1);
        let shape = QueryShape { min_terms: 5, max_terms: 5, max_depth: 0 };
        for q in generate_queries(&index(), 20, shape, &mut rng) {
            assert!(["bird", "cat", "dog"].contains(&q.as_str()), "{q:?}");
        }
    }

    #[test]
    fn same_seed_same_queries() {
        let shape = QueryShape::default();
        let a = generate_queries(&index(), 10, shape, &mut StdRng::seed_from_u64(42));
        let b = generate_queries(&index(), 10, shape, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_index_generates_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_queries(&InvertedIndex::new(), 5, QueryShape::default(), &mut rng).is_empty());
    }
}
