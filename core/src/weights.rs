//! TF-IDF weights per term per document, for tokens and for lemmas.

use crate::{DocId, Document, InvertedIndex};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// TF and IDF of one term in one document; the stored weight is their product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermWeight {
    pub tf: f64,
    pub idf: f64,
}

impl TermWeight {
    pub fn tf_idf(&self) -> f64 { self.tf * self.idf }
}

/// doc id -> term -> weight. Every document of the corpus has an entry, possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    docs: BTreeMap<DocId, BTreeMap<String, TermWeight>>,
}

impl WeightTable {
    pub fn new() -> Self { Self::default() }

    pub fn insert_document(&mut self, doc_id: DocId, terms: BTreeMap<String, TermWeight>) {
        self.docs.insert(doc_id, terms);
    }

    pub fn document(&self, doc_id: DocId) -> Option<&BTreeMap<String, TermWeight>> {
        self.docs.get(&doc_id)
    }

    pub fn term(&self, doc_id: DocId, term: &str) -> Option<&TermWeight> {
        self.docs.get(&doc_id)?.get(term)
    }

    /// TF-IDF of `term` in `doc_id`, 0 when absent.
    pub fn weight(&self, doc_id: DocId, term: &str) -> f64 {
        self.term(doc_id, term).map_or(0.0, TermWeight::tf_idf)
    }

    /// Largest TF-IDF `term` reaches in any document, 0 when it appears nowhere.
    pub fn max_weight(&self, term: &str) -> f64 {
        self.docs
            .values()
            .filter_map(|terms| terms.get(term))
            .map(TermWeight::tf_idf)
            .fold(0.0, f64::max)
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &BTreeMap<String, TermWeight>)> {
        self.docs.iter().map(|(id, terms)| (*id, terms))
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
}

/// `ln(N / df)`, or 0 when the term is in no document.
pub fn idf(num_docs: u32, doc_freq: usize) -> f64 {
    if doc_freq == 0 || num_docs == 0 {
        return 0.0;
    }
    (num_docs as f64 / doc_freq as f64).ln()
}

/// Token TF: `count / |T_d|` over the document's raw occurrences.
pub fn token_tf(doc: &Document) -> BTreeMap<String, f64> {
    let counts = doc.folded_counts();
    let total: u32 = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .into_iter()
        .map(|(token, count)| (token, count as f64 / total as f64))
        .collect()
}

/// Weights for the tokens of one document.
pub fn token_weights(doc: &Document, index: &InvertedIndex) -> BTreeMap<String, TermWeight> {
    weigh_tokens(&token_tf(doc), index)
}

fn weigh_tokens(tf_tokens: &BTreeMap<String, f64>, index: &InvertedIndex) -> BTreeMap<String, TermWeight> {
    tf_tokens
        .iter()
        .map(|(token, &tf)| {
            let weight = TermWeight { tf, idf: idf(index.num_docs(), index.doc_freq(token)) };
            (token.clone(), weight)
        })
        .collect()
}

/// Weights for the lemmas of one document. A lemma's TF sums its forms' TF in
/// this document; its document frequency is the union of its forms' postings.
pub fn lemma_weights(
    doc: &Document,
    tf_tokens: &BTreeMap<String, f64>,
    index: &InvertedIndex,
) -> BTreeMap<String, TermWeight> {
    let mut out = BTreeMap::new();
    for (lemma, forms) in &doc.lemmas {
        let forms: Vec<String> = forms.iter().map(|f| f.to_lowercase()).collect();
        let tf = forms.iter().filter_map(|f| tf_tokens.get(f)).sum::<f64>();
        let df = index.union_postings(forms.iter().map(String::as_str)).len();
        let weight = TermWeight { tf, idf: idf(index.num_docs(), df) };
        out.entry(lemma.to_lowercase())
            .and_modify(|w: &mut TermWeight| w.tf += weight.tf)
            .or_insert(weight);
    }
    out
}

/// Token and lemma weight tables for a corpus. `index` must be the token index
/// built from the same documents; it supplies `N` and the posting sets.
pub fn compute_weights(documents: &[Document], index: &InvertedIndex) -> (WeightTable, WeightTable) {
    let per_doc: Vec<_> = documents
        .par_iter()
        .map(|doc| {
            let tf_tokens = token_tf(doc);
            let tokens = weigh_tokens(&tf_tokens, index);
            let lemmas = lemma_weights(doc, &tf_tokens, index);
            (doc.id, tokens, lemmas)
        })
        .collect();

    let mut token_table = WeightTable::new();
    let mut lemma_table = WeightTable::new();
    for (id, tokens, lemmas) in per_doc {
        token_table.insert_document(id, tokens);
        lemma_table.insert_document(id, lemmas);
    }
    tracing::debug!(num_docs = documents.len(), "computed tf-idf weights");
    (token_table, lemma_table)
}
