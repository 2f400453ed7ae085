use criterion::{Criterion, criterion_group, criterion_main};
use rag_router::document::{Document, DocumentFormat};
use rag_router::embeddings::{ChunkingConfig, split_document, split_text};
use rag_router::store::{InMemoryEmbeddingStore, SearchRequest};
use std::hint::black_box;
use std::path::Path;

fn sample_markdown() -> String {
    (0..200)
        .map(|i| {
            format!(
                "## Section {i}\n\nLa génération augmentée par récupération combine un modèle de langage \
                 et une base documentaire. Chaque segment {i} est indexé avec son embedding. \
                 Les segments pertinents sont injectés dans le prompt.\n\n- point {i}\n- `code_{i}`\n"
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let markdown = sample_markdown();
    let config = ChunkingConfig::default();

    c.bench_function("split_text", |b| {
        b.iter(|| split_text(black_box(&markdown), "bench.txt", black_box(&config)));
    });

    c.bench_function("markdown_document", |b| {
        b.iter(|| {
            let document =
                Document::from_text(Path::new("bench.md"), DocumentFormat::Markdown, &markdown);
            split_document(black_box(&document), black_box(&config))
        });
    });

    let mut store = InMemoryEmbeddingStore::new();
    for segment in split_text(&markdown, "bench.txt", &config) {
        let angle = segment.index as f32 * 0.01;
        store.add(vec![angle.cos(), angle.sin(), 0.5], segment);
    }
    let query = [1.0_f32, 0.0, 0.5];
    c.bench_function("store_search", |b| {
        b.iter(|| {
            store.search(black_box(&SearchRequest {
                query_embedding: &query,
                max_results: 2,
                min_score: 0.5,
            }))
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
