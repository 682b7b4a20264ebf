use researchdb_core::traits::{ChunkStore, EmbedProvider, SourceProvider};
use researchdb_core::types::{Chunk, ChunkLevel, SearchFilters, Source, SourceKind, SourceNamespace};
use researchdb_embed::HashEmbedder;
use researchdb_store::{cosine_similarity, MemoryChunkStore, MemorySourceProvider};

fn row(
    id: &str,
    source_id: &str,
    namespace: SourceNamespace,
    content: &str,
    embedding: Vec<f32>,
    level: ChunkLevel,
    order: u32,
    parent_id: Option<&str>,
) -> Chunk {
    Chunk {
        id: id.to_string(),
        source_id: source_id.to_string(),
        namespace,
        content: content.to_string(),
        embedding,
        authority_weight: 1.0,
        level,
        order,
        parent_id: parent_id.map(str::to_string),
    }
}

#[tokio::test]
async fn delete_by_source_is_scoped_to_the_namespace() {
    let store = MemoryChunkStore::new();
    store
        .insert_batch(vec![
            row("a", "doc-1", SourceNamespace::Report, "report text", vec![1.0], ChunkLevel::Summary, 0, None),
            row("b", "doc-1", SourceNamespace::Primary, "primary text", vec![1.0], ChunkLevel::Summary, 0, None),
            row("c", "doc-2", SourceNamespace::Report, "other doc", vec![1.0], ChunkLevel::Summary, 0, None),
        ])
        .await
        .expect("insert");

    let removed = store
        .delete_by_source("doc-1", SourceNamespace::Report)
        .await
        .expect("delete");

    assert_eq!(removed, 1);
    assert_eq!(store.len(), 2);
    // the same source id under the other namespace is untouched
    assert!(store.get("b").await.expect("get").is_some());
    assert!(store.get("a").await.expect("get").is_none());
}

#[tokio::test]
async fn get_children_returns_document_order() {
    let store = MemoryChunkStore::new();
    store
        .insert_batch(vec![
            row("p", "doc-1", SourceNamespace::Report, "summary", vec![1.0], ChunkLevel::Summary, 0, None),
            row("d2", "doc-1", SourceNamespace::Report, "second", vec![1.0], ChunkLevel::Detail, 2, Some("p")),
            row("d1", "doc-1", SourceNamespace::Report, "first", vec![1.0], ChunkLevel::Detail, 1, Some("p")),
            row("x", "doc-1", SourceNamespace::Report, "unrelated", vec![1.0], ChunkLevel::Detail, 3, Some("q")),
        ])
        .await
        .expect("insert");

    let children = store.get_children("p").await.expect("children");

    let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
}

#[tokio::test]
async fn similarity_search_applies_filters_and_skips_missing_embeddings() {
    let store = MemoryChunkStore::new();
    let embedder = HashEmbedder::new(64);
    let target = "memory pricing strengthened through the quarter";
    let other = "agricultural exports fell on weather";
    store
        .insert_batch(vec![
            row(
                "hit",
                "doc-1",
                SourceNamespace::Primary,
                target,
                embedder.embed(target).expect("embed"),
                ChunkLevel::Detail,
                1,
                Some("p"),
            ),
            row(
                "wrong-ns",
                "doc-2",
                SourceNamespace::Report,
                target,
                embedder.embed(target).expect("embed"),
                ChunkLevel::Detail,
                1,
                Some("q"),
            ),
            row(
                "no-vector",
                "doc-3",
                SourceNamespace::Primary,
                target,
                Vec::new(),
                ChunkLevel::Detail,
                1,
                Some("r"),
            ),
            row(
                "far",
                "doc-4",
                SourceNamespace::Primary,
                other,
                embedder.embed(other).expect("embed"),
                ChunkLevel::Detail,
                1,
                Some("s"),
            ),
        ])
        .await
        .expect("insert");

    let filters = SearchFilters {
        namespace: Some(SourceNamespace::Primary),
        level: Some(ChunkLevel::Detail),
        min_similarity: Some(0.5),
    };
    let query = embedder.embed(target).expect("embed");
    let hits = store.similarity_search(&query, &filters, 10).await.expect("search");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, "hit");
    assert!(hits[0].1 > 0.99);
}

#[tokio::test]
async fn similarity_search_truncates_to_k_best() {
    let store = MemoryChunkStore::new();
    store
        .insert_batch(vec![
            row("near", "d", SourceNamespace::Report, "a", vec![1.0, 0.0], ChunkLevel::Summary, 0, None),
            row("mid", "d", SourceNamespace::Report, "b", vec![0.6, 0.8], ChunkLevel::Summary, 1, None),
            row("farther", "d", SourceNamespace::Report, "c", vec![0.0, 1.0], ChunkLevel::Summary, 2, None),
        ])
        .await
        .expect("insert");

    let hits = store
        .similarity_search(&[1.0, 0.0], &SearchFilters::default(), 2)
        .await
        .expect("search");

    let ids: Vec<&str> = hits.iter().map(|(c, _)| c.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "mid"]);
}

#[test]
fn cosine_similarity_handles_degenerate_vectors() {
    assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn source_provider_round_trips_and_reports_missing_ids() {
    let provider = MemorySourceProvider::new();
    provider.insert(Source {
        id: "doc-1".to_string(),
        namespace: SourceNamespace::Primary,
        kind: SourceKind::EarningsCall,
        body: "Some transcript.".to_string(),
        authority_weight: 1.0,
    });

    let found = provider
        .get_source("doc-1", SourceNamespace::Primary)
        .await
        .expect("found");
    assert_eq!(found.kind, SourceKind::EarningsCall);

    let err = provider
        .get_source("doc-1", SourceNamespace::Report)
        .await
        .expect_err("wrong namespace");
    assert!(matches!(
        err,
        researchdb_core::error::Error::SourceNotFound { .. }
    ));
}
