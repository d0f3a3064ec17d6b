use boolrank_core::{boolean_search, parse, rank, Document, Engine, Normalizer, StemmingNormalizer};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;

const TEXT: &str = "The inverted index maps every term to the documents that contain it. \
    Boolean queries combine posting sets with intersection, union and complement, \
    while ranked retrieval weighs terms by frequency and rarity before comparing vectors.";

fn engine() -> Engine {
    let normalizer = StemmingNormalizer::default();
    let words: Vec<&str> = TEXT.split_whitespace().collect();
    let docs: Vec<Document> = (0..500)
        .map(|i| {
            let start = i % words.len();
            let slice = words[start..].iter().chain(&words[..start]).take(12 + i % 17);
            let text = slice.copied().collect::<Vec<_>>().join(" ");
            Document::from_normalized(i as u32 + 1, normalizer.normalize(&text))
        })
        .collect();
    Engine::build(&docs, HashMap::new()).expect("valid corpus")
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = StemmingNormalizer::default();
    c.bench_function("normalize_paragraph", |b| b.iter(|| normalizer.normalize(black_box(TEXT))));
}

fn bench_boolean(c: &mut Criterion) {
    let engine = engine();
    let query = "(index or vectors) and not (union or rarity) or term and documents";
    c.bench_function("parse_query", |b| b.iter(|| parse(black_box(query))));
    c.bench_function("boolean_search", |b| b.iter(|| boolean_search(black_box(query), &engine.index)));
}

fn bench_rank(c: &mut Criterion) {
    let engine = engine();
    let normalizer = StemmingNormalizer::default();
    let lemmas = normalizer.normalize("ranked vectors of rare terms").lemma_set();
    c.bench_function("rank_top10", |b| b.iter(|| rank(black_box(&lemmas), &engine.lemma_weights, 10)));
}

criterion_group!(benches, bench_normalize, bench_boolean, bench_rank);
criterion_main!(benches);
