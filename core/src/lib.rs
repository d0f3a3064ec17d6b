//! Inverted index, boolean query engine and TF-IDF ranking over a normalized corpus.
//!
//! Document ids are dense and one-based: a corpus of `N` documents uses the ids
//! `1..=N`. The indexer enforces this, the boolean `not` complements against it
//! and IDF divides by the same `N`.

pub mod engine;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod rank;
pub mod weights;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use engine::{Engine, SharedEngine};
pub use index::{InvertedIndex, TermSource};
pub use normalize::{Language, Normalized, Normalizer, StemmingNormalizer};
pub use query::{boolean_search, parse, Expr, Operator, ParseError};
pub use rank::{rank, Ranked};
pub use weights::{compute_weights, TermWeight, WeightTable};

pub type DocId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    pub title: String,
    pub url: Option<String>,
}

/// A document reduced to its terms.
///
/// `token_counts` keeps occurrence counts because term frequency needs
/// repetitions; the token set used for indexing is its key set. `lemmas` maps
/// each lemma to the token surface forms it covers in this document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub token_counts: BTreeMap<String, u32>,
    pub lemmas: BTreeMap<String, BTreeSet<String>>,
}

impl Document {
    pub fn new<T, L, F>(id: DocId, tokens: T, lemmas: L) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        L: IntoIterator<Item = (String, F)>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        let mut token_counts = BTreeMap::new();
        for token in tokens {
            *token_counts.entry(token.as_ref().to_string()).or_insert(0) += 1;
        }
        let lemmas = lemmas
            .into_iter()
            .map(|(lemma, forms)| {
                let forms = forms.into_iter().map(|f| f.as_ref().to_string()).collect();
                (lemma, forms)
            })
            .collect();
        Self { id, token_counts, lemmas }
    }

    pub fn from_normalized(id: DocId, normalized: Normalized) -> Self {
        Self::new(id, normalized.tokens, normalized.lemmas)
    }

    /// Distinct tokens of the document.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.token_counts.keys().map(String::as_str)
    }

    /// Total token occurrences, `|T_d|`.
    pub fn token_total(&self) -> u32 {
        self.token_counts.values().sum()
    }

    /// Occurrence counts with keys folded to lowercase, merging forms that differ only in case.
    pub fn folded_counts(&self) -> BTreeMap<String, u32> {
        let mut folded = BTreeMap::new();
        for (token, count) in &self.token_counts {
            *folded.entry(token.to_lowercase()).or_insert(0) += count;
        }
        folded
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CorpusError {
    #[error("document id {id} is outside 1..={num_docs}")]
    IdOutOfRange { id: DocId, num_docs: u32 },
    #[error("document id {0} appears more than once")]
    DuplicateId(DocId),
}
