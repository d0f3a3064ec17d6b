//! Everything a query needs, built once and shared read-only.

use crate::normalize::{query_lemmas, Normalizer};
use crate::persist::{self, IndexPaths, WeightKind};
use crate::query::{boolean_search, ParseError};
use crate::rank::{rank, Ranked};
use crate::{compute_weights, CorpusError, DocId, DocMeta, Document, InvertedIndex, TermSource, WeightTable};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

/// Token index, both weight tables and the document catalog of one corpus.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub index: InvertedIndex,
    pub token_weights: WeightTable,
    pub lemma_weights: WeightTable,
    pub docs: HashMap<DocId, DocMeta>,
}

impl Engine {
    pub fn build(documents: &[Document], docs: HashMap<DocId, DocMeta>) -> Result<Self, CorpusError> {
        let start = Instant::now();
        let index = InvertedIndex::build(documents, TermSource::Tokens)?;
        let (token_weights, lemma_weights) = compute_weights(documents, &index);
        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.len(),
            took_s = start.elapsed().as_secs_f64(),
            "engine built"
        );
        Ok(Self { index, token_weights, lemma_weights, docs })
    }

    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let index = persist::load_index(paths)?;
        let num_docs = index.num_docs();
        let token_weights = persist::load_weight_table(paths, WeightKind::Tokens, num_docs)?;
        let lemma_weights = persist::load_weight_table(paths, WeightKind::Lemmas, num_docs)?;
        let docs = if paths.docs().exists() { persist::load_docs(paths)? } else { HashMap::new() };
        tracing::info!(root = %paths.root.display(), num_docs = index.num_docs(), "engine loaded");
        Ok(Self { index, token_weights, lemma_weights, docs })
    }

    /// Write index, weight tables and catalog. The meta file is the caller's.
    pub fn save(&self, paths: &IndexPaths) -> Result<()> {
        persist::save_index(paths, &self.index)?;
        persist::save_weight_table(paths, WeightKind::Tokens, &self.token_weights)?;
        persist::save_weight_table(paths, WeightKind::Lemmas, &self.lemma_weights)?;
        persist::save_docs(paths, &self.docs)?;
        Ok(())
    }

    pub fn num_docs(&self) -> u32 { self.index.num_docs() }

    pub fn boolean(&self, query: &str) -> Result<BTreeSet<DocId>, ParseError> {
        boolean_search(query, &self.index)
    }

    pub fn rank(&self, lemmas: &BTreeSet<String>, top_n: usize) -> Vec<Ranked> {
        rank(lemmas, &self.lemma_weights, top_n)
    }

    /// Normalize free text into lemmas and rank against the lemma table.
    pub fn search(&self, normalizer: &dyn Normalizer, text: &str, top_n: usize) -> Vec<Ranked> {
        self.rank(&query_lemmas(normalizer, text), top_n)
    }
}

/// Handle readers clone snapshots from. A rebuilt engine is swapped in whole;
/// snapshots already handed out stay valid and unchanged.
#[derive(Debug, Default)]
pub struct SharedEngine {
    current: RwLock<Arc<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self { current: RwLock::new(Arc::new(engine)) }
    }

    pub fn current(&self) -> Arc<Engine> {
        self.current.read().clone()
    }

    /// Publish `engine` and return the one it replaces.
    pub fn publish(&self, engine: Engine) -> Arc<Engine> {
        let next = Arc::new(engine);
        std::mem::replace(&mut *self.current.write(), next)
    }
}
