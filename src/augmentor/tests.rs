use super::*;
use crate::config::RetrievalConfig;
use crate::embeddings::TextSegment;
use crate::retrieval::{ContentRetriever, EmbeddingStoreRetriever};
use crate::router::{GateRouter, MaybePolicy, StaticRouter};
use crate::store::InMemoryEmbeddingStore;
use crate::testing::{ScriptedChatModel, StaticRetriever, TableEmbedder};

fn segment(text: &str, index: usize) -> TextSegment {
    TextSegment {
        text: text.to_string(),
        source: "rag.md".to_string(),
        index,
    }
}

#[test]
fn only_segments_above_threshold_reach_the_message() {
    let mut store = InMemoryEmbeddingStore::new();
    // Relevance against [1, 0]: A = 0.9, B = 0.4
    store.add(vec![0.8, 0.6], segment("Segment A sur le RAG.", 0));
    store.add(vec![-0.2, 0.979_795_9], segment("Segment B hors sujet.", 1));
    let embedder = TableEmbedder::new(&[("Qu'est-ce que le RAG ?", vec![1.0, 0.0])], vec![0.0, 1.0]);
    let retriever: Arc<dyn ContentRetriever> = Arc::new(EmbeddingStoreRetriever::new(
        "ia",
        store,
        Arc::new(embedder),
        &RetrievalConfig {
            max_results: 2,
            min_score: 0.5,
        },
    ));
    let augmentor = RetrievalAugmentor::new(Arc::new(StaticRouter::new(vec![retriever])));

    let message = augmentor
        .augment("Qu'est-ce que le RAG ?")
        .expect("augmentation should succeed");

    assert_eq!(message.contents.len(), 1);
    assert!(message.text.contains("Segment A sur le RAG."));
    assert!(!message.text.contains("Segment B"));
    assert_eq!(
        message.text,
        "Qu'est-ce que le RAG ?\n\nAnswer using the following information:\nSegment A sur le RAG."
    );
}

#[test]
fn contents_follow_retriever_order() {
    let pdf: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("pdf", &["p1", "p2"]));
    let web: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("web", &["w1"]));
    let augmentor = RetrievalAugmentor::new(Arc::new(StaticRouter::new(vec![pdf, web])));

    let message = augmentor.augment("q").expect("augmentation should succeed");

    assert!(message.is_augmented());
    assert_eq!(message.text, format!("q\n\n{}\np1\n\np2\n\nw1", CONTEXT_HEADER));
}

#[test]
fn no_route_leaves_query_unchanged() {
    let model = Arc::new(ScriptedChatModel::new(["non"]));
    let retriever = Arc::new(StaticRetriever::new("ia", &["ne doit pas apparaître"]));
    let router = GateRouter::new(
        model,
        Arc::clone(&retriever) as Arc<dyn ContentRetriever>,
        MaybePolicy::Retrieve,
    );
    let augmentor = RetrievalAugmentor::new(Arc::new(router));

    let message = augmentor
        .augment("Quelle est la capitale du Pérou ?")
        .expect("augmentation should succeed");

    assert!(!message.is_augmented());
    assert_eq!(message.text, "Quelle est la capitale du Pérou ?");
    assert!(retriever.calls.borrow().is_empty());
}

#[test]
fn empty_retrieval_leaves_query_unchanged() {
    let empty: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("ia", &[]));
    let augmentor = RetrievalAugmentor::new(Arc::new(StaticRouter::new(vec![empty])));

    let message = augmentor.augment("bonjour").expect("augmentation should succeed");

    assert_eq!(message.text, "bonjour");
}

#[test]
fn router_errors_propagate() {
    let model = Arc::new(ScriptedChatModel::failing("quota exceeded"));
    let retriever: Arc<dyn ContentRetriever> = Arc::new(StaticRetriever::new("ia", &[]));
    let router = GateRouter::new(model, retriever, MaybePolicy::Retrieve);
    let augmentor = RetrievalAugmentor::new(Arc::new(router));

    assert!(augmentor.augment("q").is_err());
}
