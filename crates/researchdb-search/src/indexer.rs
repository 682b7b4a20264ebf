//! Reindexing orchestration: source body -> chunk tree -> embeddings ->
//! full-replacement persistence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use uuid::Uuid;

use researchdb_core::chunker::{chunk, ChunkerConfig};
use researchdb_core::error::Result;
use researchdb_core::traits::{ChunkStore, EmbedProvider, SourceProvider};
use researchdb_core::types::{Chunk, ChunkLevel, IndexResult, Source, SourceNamespace};

type LockKey = (String, SourceNamespace);

/// Serializes reindex runs per `(source_id, namespace)` so that the
/// delete+insert sequences of two concurrent runs never interleave for the
/// same source. Different sources proceed in parallel.
#[derive(Default)]
struct SourceLocks {
    inner: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SourceLocks {
    fn lock_for(&self, source_id: &str, namespace: SourceNamespace) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry((source_id.to_string(), namespace))
            .or_default()
            .clone()
    }
}

pub struct Indexer<S, P> {
    store: Arc<S>,
    sources: Arc<P>,
    embedder: Arc<dyn EmbedProvider>,
    chunker: ChunkerConfig,
    locks: SourceLocks,
}

impl<S: ChunkStore, P: SourceProvider> Indexer<S, P> {
    pub fn new(store: Arc<S>, sources: Arc<P>, embedder: Arc<dyn EmbedProvider>) -> Self {
        Self::with_chunker(store, sources, embedder, ChunkerConfig::default())
    }

    pub fn with_chunker(
        store: Arc<S>,
        sources: Arc<P>,
        embedder: Arc<dyn EmbedProvider>,
        chunker: ChunkerConfig,
    ) -> Self {
        Self { store, sources, embedder, chunker, locks: SourceLocks::default() }
    }

    /// Rebuild the chunk set for one source. Fails with `SourceNotFound`
    /// when the provider cannot resolve the id.
    pub async fn reindex(
        &self,
        source_id: &str,
        namespace: SourceNamespace,
    ) -> Result<IndexResult> {
        let source = self.sources.get_source(source_id, namespace).await?;
        self.index_source(&source).await
    }

    /// Same as [`reindex`](Self::reindex) for callers that already hold the
    /// source document.
    ///
    /// The prior chunk set is removed and the new one inserted under a
    /// per-source lock; a chunk whose embedding fails is stored with an
    /// empty vector instead of aborting the run. Re-running is idempotent
    /// in effect, though generated ids differ.
    pub async fn index_source(&self, source: &Source) -> Result<IndexResult> {
        let lock = self.locks.lock_for(&source.id, source.namespace);
        let _guard = lock.lock().await;

        let drafts = chunk(&source.body, &self.chunker);
        let texts: Vec<String> = drafts.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts);

        let ids: Vec<String> = drafts.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let mut summary_count = 0usize;
        let mut detail_count = 0usize;
        let mut rows = Vec::with_capacity(drafts.len());
        for (order, (draft, embedding)) in drafts.into_iter().zip(embeddings).enumerate() {
            let embedding = match embedding {
                Ok(vector) => vector,
                Err(err) => {
                    warn!(
                        source_id = %source.id,
                        order,
                        error = %err,
                        "embedding failed, storing chunk without a vector"
                    );
                    Vec::new()
                }
            };
            match draft.level {
                ChunkLevel::Summary => summary_count += 1,
                ChunkLevel::Detail => detail_count += 1,
            }
            rows.push(Chunk {
                id: ids[order].clone(),
                source_id: source.id.clone(),
                namespace: source.namespace,
                content: draft.content,
                embedding,
                authority_weight: source.authority_weight,
                level: draft.level,
                order: order as u32,
                parent_id: draft.parent_index.map(|i| ids[i].clone()),
            });
        }

        let removed = self.store.delete_by_source(&source.id, source.namespace).await?;
        let total = rows.len();
        self.store.insert_batch(rows).await?;
        info!(
            source_id = %source.id,
            namespace = %source.namespace,
            removed,
            total,
            summary_count,
            detail_count,
            "reindexed source"
        );
        Ok(IndexResult { total, summary_count, detail_count, chunk_ids: ids })
    }
}
