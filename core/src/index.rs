use crate::{CorpusError, DocId, Document};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Which per-document term set feeds the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSource {
    Tokens,
    Lemmas,
}

/// Term to posting-set map over a corpus of `num_docs` documents.
///
/// Keys are always lowercase and every id in a posting set lies in `1..=num_docs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    postings: HashMap<String, BTreeSet<DocId>>,
    num_docs: u32,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn build(documents: &[Document], source: TermSource) -> Result<Self, CorpusError> {
        let num_docs = validate_ids(documents)?;

        let postings = documents
            .par_iter()
            .fold(HashMap::new, |mut acc: HashMap<String, BTreeSet<DocId>>, doc| {
                match source {
                    TermSource::Tokens => {
                        for term in doc.tokens() {
                            acc.entry(term.to_lowercase()).or_default().insert(doc.id);
                        }
                    }
                    TermSource::Lemmas => {
                        for lemma in doc.lemmas.keys() {
                            acc.entry(lemma.to_lowercase()).or_default().insert(doc.id);
                        }
                    }
                }
                acc
            })
            .reduce(HashMap::new, merge_postings);

        tracing::debug!(num_docs, num_terms = postings.len(), ?source, "built inverted index");
        Ok(Self { postings, num_docs })
    }

    /// Wrap an existing posting map, e.g. one read back from disk.
    pub fn from_postings<I>(postings: I, num_docs: u32) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = (String, BTreeSet<DocId>)>,
    {
        let mut out: HashMap<String, BTreeSet<DocId>> = HashMap::new();
        for (term, ids) in postings {
            if let Some(&id) = ids.iter().find(|&&id| id == 0 || id > num_docs) {
                return Err(CorpusError::IdOutOfRange { id, num_docs });
            }
            out.entry(term.to_lowercase()).or_default().extend(ids);
        }
        Ok(Self { postings: out, num_docs })
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeSet<DocId>> {
        match self.postings.get(term) {
            Some(set) => Some(set),
            None => self.postings.get(&term.to_lowercase()),
        }
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings(term).map_or(0, BTreeSet::len)
    }

    /// Documents containing any of `terms`; each document counts once.
    pub fn union_postings<'a, I>(&self, terms: I) -> BTreeSet<DocId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = BTreeSet::new();
        for term in terms {
            if let Some(set) = self.postings(term) {
                out.extend(set.iter().copied());
            }
        }
        out
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    /// All document ids, `1..=num_docs`.
    pub fn universe(&self) -> BTreeSet<DocId> {
        (1..=self.num_docs).collect()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &BTreeSet<DocId>)> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }
}

fn merge_postings(
    mut left: HashMap<String, BTreeSet<DocId>>,
    right: HashMap<String, BTreeSet<DocId>>,
) -> HashMap<String, BTreeSet<DocId>> {
    for (term, ids) in right {
        left.entry(term).or_default().extend(ids);
    }
    left
}

/// Check the ids form exactly `1..=N` and return `N`.
fn validate_ids(documents: &[Document]) -> Result<u32, CorpusError> {
    let num_docs = documents.len() as u32;
    let mut seen = HashSet::with_capacity(documents.len());
    for doc in documents {
        if doc.id == 0 || doc.id > num_docs {
            return Err(CorpusError::IdOutOfRange { id: doc.id, num_docs });
        }
        if !seen.insert(doc.id) {
            return Err(CorpusError::DuplicateId(doc.id));
        }
    }
    Ok(num_docs)
}
