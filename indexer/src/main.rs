mod ingest;

use anyhow::{Context, Result};
use boolrank_core::persist::{save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use boolrank_core::query::{generate_queries, QueryShape};
use boolrank_core::{DocId, Engine, Language, StemmingNormalizer};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "boolrank")]
#[command(about = "Build an inverted index, run boolean queries and rank documents by TF-IDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and weight tables from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long, env = "BOOLRANK_INDEX", default_value = "./index")]
        output: String,
        /// Stemmer and stopword language
        #[arg(long, env = "BOOLRANK_LANGUAGE", default_value = "english")]
        language: Language,
    },
    /// Evaluate a boolean query, e.g. `(cat and dog) or not bird`
    Query {
        /// Index directory
        #[arg(long, env = "BOOLRANK_INDEX", default_value = "./index")]
        index: String,
        query: String,
    },
    /// Generate random boolean queries from the index vocabulary and run them
    Queries {
        /// Index directory
        #[arg(long, env = "BOOLRANK_INDEX", default_value = "./index")]
        index: String,
        /// Number of queries
        #[arg(long, default_value_t = 10)]
        count: usize,
        #[arg(long, default_value_t = 3)]
        min_terms: usize,
        #[arg(long, default_value_t = 8)]
        max_terms: usize,
        /// Maximum nesting depth
        #[arg(long, default_value_t = 3)]
        max_depth: usize,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank documents against a free-text query
    Rank {
        /// Index directory
        #[arg(long, env = "BOOLRANK_INDEX", default_value = "./index")]
        index: String,
        /// Stemmer and stopword language; must match the one used to build
        #[arg(long, env = "BOOLRANK_LANGUAGE", default_value = "english")]
        language: Language,
        /// Number of results
        #[arg(long, default_value_t = 10)]
        top_n: usize,
        text: String,
    },
    /// Print the TF and IDF of every term of one document
    Inspect {
        /// Index directory
        #[arg(long, env = "BOOLRANK_INDEX", default_value = "./index")]
        index: String,
        doc_id: DocId,
        /// Show lemma weights instead of token weights
        #[arg(long, default_value_t = false)]
        lemmas: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, language } => build(&input, &output, language),
        Commands::Query { index, query } => boolean(&index, &query),
        Commands::Queries { index, count, min_terms, max_terms, max_depth, seed } => {
            let shape = QueryShape { min_terms, max_terms, max_depth };
            queries(&index, count, shape, seed)
        }
        Commands::Rank { index, language, top_n, text } => rank(&index, language, top_n, &text),
        Commands::Inspect { index, doc_id, lemmas } => inspect(&index, doc_id, lemmas),
    }
}

fn build(input: &str, output: &str, language: Language) -> Result<()> {
    let start = Instant::now();
    let normalizer = StemmingNormalizer::new(language);
    let corpus = ingest::load_corpus(Path::new(input), &normalizer)?;
    tracing::info!(num_docs = corpus.documents.len(), %language, "ingested documents");

    let engine = Engine::build(&corpus.documents, corpus.docs)?;
    let paths = IndexPaths::new(output);
    engine.save(&paths)?;

    let meta = MetaFile {
        num_docs: engine.num_docs(),
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output, took_s = start.elapsed().as_secs_f64(), "index build complete");
    Ok(())
}

fn open(index: &str) -> Result<Engine> {
    Engine::open(&IndexPaths::new(index)).with_context(|| format!("opening index at {index}"))
}

fn title(engine: &Engine, doc_id: DocId) -> &str {
    engine.docs.get(&doc_id).map_or("", |m| m.title.as_str())
}

/// `title<TAB>url`, either part empty when unknown.
fn title_and_url(engine: &Engine, doc_id: DocId) -> String {
    let url = engine.docs.get(&doc_id).and_then(|m| m.url.as_deref()).unwrap_or("");
    format!("{}\t{url}", title(engine, doc_id))
}

fn boolean(index: &str, query: &str) -> Result<()> {
    let engine = open(index)?;
    let hits = engine.boolean(query).with_context(|| format!("invalid query {query:?}"))?;
    println!("Documents: {}", hits.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));
    for doc_id in &hits {
        println!("{doc_id}\t{}", title(&engine, *doc_id));
    }
    Ok(())
}

fn queries(index: &str, count: usize, shape: QueryShape, seed: Option<u64>) -> Result<()> {
    let engine = open(index)?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    tracing::debug!(seed, "generating queries");
    let mut rng = StdRng::seed_from_u64(seed);
    for query in generate_queries(&engine.index, count, shape, &mut rng) {
        let hits = engine.boolean(&query).with_context(|| format!("generated query {query:?}"))?;
        println!("{query}\t{} documents", hits.len());
    }
    Ok(())
}

fn rank(index: &str, language: Language, top_n: usize, text: &str) -> Result<()> {
    let engine = open(index)?;
    let normalizer = StemmingNormalizer::new(language);
    for hit in engine.search(&normalizer, text, top_n) {
        println!("Document {}: relevance = {:.4}\t{}", hit.doc_id, hit.score, title_and_url(&engine, hit.doc_id));
    }
    Ok(())
}

fn inspect(index: &str, doc_id: DocId, lemmas: bool) -> Result<()> {
    let engine = open(index)?;
    let table = if lemmas { &engine.lemma_weights } else { &engine.token_weights };
    let terms = table
        .document(doc_id)
        .with_context(|| format!("document {doc_id} is not in the index"))?;
    for (term, w) in terms {
        println!("{term} {} {} {:.6}", w.tf, w.idf, w.tf_idf());
    }
    Ok(())
}
