use anyhow::{Context, Result};
use boolrank_core::{DocId, DocMeta, Document, Normalizer};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

/// `.json` / `.jsonl` files under `input` (or `input` itself), sorted by path.
pub fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files.sort();
    files
}

pub fn read_file(file: &Path) -> Result<Vec<InputDoc>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut docs = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let doc: InputDoc = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
            docs.push(doc);
        }
        return Ok(docs);
    }
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| Ok(serde_json::from_value(v)?))
            .collect(),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(json)?]),
        _ => Ok(Vec::new()),
    }
}

/// Normalized corpus with ids `1..=N` assigned in read order.
pub struct Corpus {
    pub documents: Vec<Document>,
    pub docs: HashMap<DocId, DocMeta>,
}

pub fn load_corpus(input: &Path, normalizer: &dyn Normalizer) -> Result<Corpus> {
    let mut inputs = Vec::new();
    for file in collect_files(input) {
        inputs.extend(read_file(&file)?);
    }

    let documents: Vec<Document> = inputs
        .par_iter()
        .enumerate()
        .map(|(i, doc)| Document::from_normalized(i as DocId + 1, normalizer.normalize(&doc.body)))
        .collect();

    let docs = inputs
        .into_iter()
        .enumerate()
        .map(|(i, doc)| {
            let meta = DocMeta { external_id: doc.id, title: doc.title, url: doc.url };
            (i as DocId + 1, meta)
        })
        .collect();

    Ok(Corpus { documents, docs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use boolrank_core::StemmingNormalizer;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_json_array_object_and_jsonl() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"id":"x1","title":"X1","body":"cats sleep"},{"id":"x2","title":"X2","body":"dogs bark"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), r#"{"id":"y","title":"Y","body":"birds sing","url":"http://y"}"#).unwrap();
        fs::write(
            dir.path().join("c.jsonl"),
            "{\"id\":\"z1\",\"body\":\"cats purr\"}\n\n{\"id\":\"z2\",\"body\":\"fish swim\"}\n",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.txt"), "not a corpus file").unwrap();

        let corpus = load_corpus(dir.path(), &StemmingNormalizer::default()).unwrap();
        assert_eq!(corpus.documents.len(), 5);
        let ids: Vec<DocId> = corpus.documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(corpus.docs[&1].external_id, "x1");
        assert_eq!(corpus.docs[&3].url.as_deref(), Some("http://y"));
        assert_eq!(corpus.docs[&5].external_id, "z2");
        assert!(corpus.documents[3].token_counts.contains_key("purr"));
    }

    #[test]
    fn malformed_jsonl_line_is_an_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.jsonl");
        fs::write(&file, "{\"id\":\"ok\",\"body\":\"fine\"}\n{not json}\n").unwrap();
        let err = read_file(&file).unwrap_err();
        assert!(format!("{err:#}").contains("bad.jsonl:2"));
    }
}
