use super::*;

fn segment(text: &str, index: usize) -> TextSegment {
    TextSegment {
        text: text.to_string(),
        source: "test.txt".to_string(),
        index,
    }
}

/// Unit vector whose relevance score against `[1, 0]` is `score`
fn vector_with_score(score: f64) -> Vec<f32> {
    let cosine = 2.0_f64.mul_add(score, -1.0);
    let sine = (1.0 - cosine * cosine).sqrt();
    vec![cosine as f32, sine as f32]
}

#[test]
fn cosine_similarity_basics() {
    let same = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).expect("vectors are comparable");
    assert!((same - 1.0).abs() < 1e-9);

    let opposite = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).expect("vectors are comparable");
    assert!((opposite + 1.0).abs() < 1e-9);

    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
    assert_eq!(cosine_similarity(&[], &[]), None);
}

#[test]
fn relevance_score_is_rescaled() {
    let orthogonal = relevance_score(&[1.0, 0.0], &[0.0, 1.0]).expect("vectors are comparable");
    assert!((orthogonal - 0.5).abs() < 1e-9);

    let opposite = relevance_score(&[1.0, 0.0], &[-1.0, 0.0]).expect("vectors are comparable");
    assert!(opposite.abs() < 1e-9);
}

#[test]
fn add_all_requires_matching_counts() {
    let mut store = InMemoryEmbeddingStore::new();
    let result = store.add_all(vec![vec![1.0]], vec![segment("a", 0), segment("b", 1)]);

    assert!(matches!(result, Err(RagError::Embedding(_))));
    assert!(store.is_empty());
}

#[test]
fn add_all_creates_one_entry_per_segment() {
    let mut store = InMemoryEmbeddingStore::new();
    let ids = store
        .add_all(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![segment("a", 0), segment("b", 1)],
        )
        .expect("counts match");

    assert_eq!(ids.len(), 2);
    assert_eq!(store.len(), 2);
    assert_eq!(store.entries()[1].segment.text, "b");
}

#[test]
fn search_filters_below_min_score() {
    let mut store = InMemoryEmbeddingStore::new();
    store.add(vector_with_score(0.9), segment("A", 0));
    store.add(vector_with_score(0.4), segment("B", 1));

    let matches = store.search(&SearchRequest {
        query_embedding: &[1.0, 0.0],
        max_results: 2,
        min_score: 0.5,
    });

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].segment.text, "A");
    assert!((matches[0].score - 0.9).abs() < 1e-6);
}

#[test]
fn search_orders_by_descending_score_and_caps_results() {
    let mut store = InMemoryEmbeddingStore::new();
    for (i, score) in [0.55, 0.95, 0.7, 0.85, 0.3, 0.6].into_iter().enumerate() {
        store.add(vector_with_score(score), segment(&format!("s{}", i), i));
    }

    let matches = store.search(&SearchRequest {
        query_embedding: &[1.0, 0.0],
        max_results: 3,
        min_score: 0.5,
    });

    assert_eq!(matches.len(), 3);
    assert!(matches.windows(2).all(|pair| pair[0].score >= pair[1].score));
    assert!(matches.iter().all(|m| m.score >= 0.5));
    let texts: Vec<&str> = matches.iter().map(|m| m.segment.text.as_str()).collect();
    assert_eq!(texts, vec!["s1", "s3", "s2"]);
}

#[test]
fn search_skips_mismatched_dimensions() {
    let mut store = InMemoryEmbeddingStore::new();
    store.add(vec![1.0, 0.0, 0.0], segment("wrong", 0));
    store.add(vec![1.0, 0.0], segment("right", 1));

    let matches = store.search(&SearchRequest {
        query_embedding: &[1.0, 0.0],
        max_results: 5,
        min_score: 0.0,
    });

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].segment.text, "right");
}

#[test]
fn empty_store_returns_nothing() {
    let store = InMemoryEmbeddingStore::new();
    let matches = store.search(&SearchRequest {
        query_embedding: &[1.0],
        max_results: 2,
        min_score: 0.0,
    });
    assert!(matches.is_empty());
}
