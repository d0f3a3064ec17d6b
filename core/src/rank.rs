//! Cosine ranking of documents against a lemma query.
//!
//! The weight of a query lemma is the largest TF-IDF that lemma reaches in any
//! document of the corpus, not a TF-IDF computed from the query itself. Each
//! document vector is cut down to the query's dimensions before comparing.

use crate::{DocId, WeightTable};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub doc_id: DocId,
    pub score: f64,
}

/// term -> query weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    weights: BTreeMap<String, f64>,
}

impl QueryVector {
    pub fn build(query_lemmas: &BTreeSet<String>, table: &WeightTable) -> Self {
        let weights = query_lemmas
            .iter()
            .map(|lemma| (lemma.clone(), table.max_weight(lemma)))
            .collect();
        Self { weights }
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn values(&self) -> Vec<f64> {
        self.weights.values().copied().collect()
    }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    /// The document's weights on this vector's dimensions, 0 where absent.
    pub fn restrict(&self, table: &WeightTable, doc_id: DocId) -> Vec<f64> {
        self.terms().map(|t| table.weight(doc_id, t)).collect()
    }
}

/// `dot(a, b) / (|a| |b|)`, 0 when either norm is 0. Clamped into `[0, 1]`
/// for non-negative inputs.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Score every document in `table` against `query_lemmas` and keep the best
/// `top_n`, highest score first, ties by ascending document id.
pub fn rank(query_lemmas: &BTreeSet<String>, table: &WeightTable, top_n: usize) -> Vec<Ranked> {
    if top_n == 0 || table.is_empty() {
        return Vec::new();
    }
    let query = QueryVector::build(query_lemmas, table);
    let q = query.values();

    let doc_ids: Vec<DocId> = table.doc_ids().collect();
    let mut scored: Vec<Ranked> = doc_ids
        .par_iter()
        .map(|&doc_id| {
            let d = query.restrict(table, doc_id);
            Ranked { doc_id, score: cosine_similarity(&q, &d) }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    scored.truncate(top_n);
    tracing::debug!(terms = query.len(), returned = scored.len(), "ranked documents");
    scored
}
