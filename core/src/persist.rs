use crate::{CorpusError, DocId, DocMeta, InvertedIndex, TermWeight, WeightTable};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

/// Which weight table a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    Tokens,
    Lemmas,
}

impl WeightKind {
    fn file_prefix(self) -> &'static str {
        match self {
            WeightKind::Tokens => "tokens_tf_idf_",
            WeightKind::Lemmas => "lemmas_tf_idf_",
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("inverted_index.json") }
    pub fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn weights_dir(&self) -> PathBuf { self.root.join("tf_idf") }
    fn weight_file(&self, kind: WeightKind, doc_id: DocId) -> PathBuf {
        self.weights_dir().join(format!("{}{doc_id}.txt", kind.file_prefix()))
    }
}

/// Render the index as a JSON object with one term per line and each id list
/// inline, e.g. `    "cat": [1, 2]`. Terms and ids are sorted.
pub fn index_to_json(index: &InvertedIndex) -> Result<String> {
    let mut terms: Vec<(&str, &BTreeSet<DocId>)> = index.terms().collect();
    terms.sort_unstable_by_key(|(term, _)| *term);

    let mut lines = Vec::with_capacity(terms.len());
    for (term, ids) in terms {
        let ids = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        lines.push(format!("    {}: [{ids}]", serde_json::to_string(term)?));
    }
    Ok(format!("{{\n{}\n}}", lines.join(",\n")))
}

/// Parse any JSON object of `term -> [doc ids]`.
pub fn index_from_json(json: &str, num_docs: u32) -> Result<InvertedIndex> {
    let raw: BTreeMap<String, Vec<DocId>> = serde_json::from_str(json)?;
    let postings = raw.into_iter().map(|(term, ids)| (term, ids.into_iter().collect()));
    Ok(InvertedIndex::from_postings(postings, num_docs)?)
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    f.write_all(index_to_json(index)?.as_bytes())?;
    Ok(())
}

/// Load the index; `N` comes from the meta file.
pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    let json = fs::read_to_string(paths.index())
        .with_context(|| format!("reading {}", paths.index().display()))?;
    index_from_json(&json, meta.num_docs)
}

/// One `<term> <tf> <idf>` line per term.
pub fn weights_to_text(terms: &BTreeMap<String, TermWeight>) -> String {
    let mut out = String::new();
    for (term, w) in terms {
        let _ = writeln!(out, "{term} {} {}", w.tf, w.idf);
    }
    out
}

pub fn weights_from_text(text: &str) -> Result<BTreeMap<String, TermWeight>> {
    let mut terms = BTreeMap::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() { continue; }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[term, tf, idf] = fields.as_slice() else {
            bail!("line {}: expected `<term> <tf> <idf>`, got {line:?}", lineno + 1);
        };
        let tf: f64 = tf.parse().with_context(|| format!("line {}: bad tf", lineno + 1))?;
        let idf: f64 = idf.parse().with_context(|| format!("line {}: bad idf", lineno + 1))?;
        terms.insert(term.to_string(), TermWeight { tf, idf });
    }
    Ok(terms)
}

/// Write one file per document, replacing any file of the same kind left by an
/// earlier build.
pub fn save_weight_table(paths: &IndexPaths, kind: WeightKind, table: &WeightTable) -> Result<()> {
    let dir = paths.weights_dir();
    create_dir_all(&dir)?;
    for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let stale = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| parse_weight_file_name(name, kind).is_some());
        if stale {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        }
    }
    for (doc_id, terms) in table.iter() {
        let mut f = File::create(paths.weight_file(kind, doc_id))?;
        f.write_all(weights_to_text(terms).as_bytes())?;
    }
    Ok(())
}

/// Load the table for a corpus of `num_docs` documents. Every id in
/// `1..=num_docs` must have a file and no other id may.
pub fn load_weight_table(paths: &IndexPaths, kind: WeightKind, num_docs: u32) -> Result<WeightTable> {
    let mut table = WeightTable::new();
    let dir = paths.weights_dir();
    for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        let Some(doc_id) = parse_weight_file_name(name, kind) else { continue };
        if doc_id == 0 || doc_id > num_docs {
            return Err(CorpusError::IdOutOfRange { id: doc_id, num_docs })
                .with_context(|| format!("weight file {}", path.display()));
        }
        let text = fs::read_to_string(&path)?;
        let terms = weights_from_text(&text).with_context(|| format!("parsing {}", path.display()))?;
        table.insert_document(doc_id, terms);
    }
    if let Some(missing) = (1..=num_docs).find(|id| table.document(*id).is_none()) {
        bail!("missing weight file {}", paths.weight_file(kind, missing).display());
    }
    Ok(table)
}

fn parse_weight_file_name(name: &str, kind: WeightKind) -> Option<DocId> {
    name.strip_prefix(kind.file_prefix())?.strip_suffix(".txt")?.parse().ok()
}

pub fn save_docs(paths: &IndexPaths, docs: &HashMap<DocId, DocMeta>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.docs())?;
    let bytes = bincode::serialize(docs)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_docs(paths: &IndexPaths) -> Result<HashMap<DocId, DocMeta>> {
    let mut f = File::open(paths.docs())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let docs = bincode::deserialize(&buf)?;
    Ok(docs)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    if meta.version != FORMAT_VERSION {
        return Err(anyhow!("unsupported index format version {}", meta.version));
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_json_layout() {
        let map = BTreeMap::from([
            ("dog".to_string(), BTreeSet::from([3, 2])),
            ("cat".to_string(), BTreeSet::from([1, 2])),
        ]);
        let idx = InvertedIndex::from_postings(map, 3).unwrap();
        assert_eq!(index_to_json(&idx).unwrap(), "{\n    \"cat\": [1, 2],\n    \"dog\": [2, 3]\n}");
    }

    #[test]
    fn empty_index_json() {
        assert_eq!(index_to_json(&InvertedIndex::new()).unwrap(), "{\n\n}");
        assert!(index_from_json("{\n\n}", 0).unwrap().is_empty());
    }

    #[test]
    fn reads_standard_json_arrays() {
        let idx = index_from_json(r#"{"cat":[2,1,2],"dog":[]}"#, 2).unwrap();
        assert_eq!(idx.postings("cat").unwrap(), &BTreeSet::from([1, 2]));
        assert_eq!(idx.doc_freq("dog"), 0);
        assert!(index_from_json(r#"{"cat":[5]}"#, 2).is_err());
    }

    #[test]
    fn weight_lines() {
        let text = "cat 0.5 0.6931471805599453\ndog 0.25 0\n";
        let terms = weights_from_text(text).unwrap();
        assert_eq!(terms["cat"], TermWeight { tf: 0.5, idf: std::f64::consts::LN_2 });
        assert_eq!(weights_to_text(&terms), text);
        assert!(weights_from_text("cat 0.5").is_err());
        assert!(weights_from_text("cat x 1").is_err());
    }

    #[test]
    fn weight_file_names() {
        assert_eq!(parse_weight_file_name("tokens_tf_idf_12.txt", WeightKind::Tokens), Some(12));
        assert_eq!(parse_weight_file_name("tokens_tf_idf_12.txt", WeightKind::Lemmas), None);
        assert_eq!(parse_weight_file_name("lemmas_tf_idf_x.txt", WeightKind::Lemmas), None);
    }
}
