use std::future::Future;

use crate::error::Result;
use crate::types::{Chunk, SearchFilters, Source, SourceNamespace};

/// Embedding provider boundary.
///
/// Implementations may run a local model or call a remote API. Vectors must
/// be L2-normalized and of fixed dimensionality `dim()`.
pub trait EmbedProvider: Send + Sync {
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Batch embedding. Providers with a native batch endpoint should
    /// override this; the default maps `embed` over the slice. Failures are
    /// reported per item so indexing can degrade chunk by chunk instead of
    /// aborting a whole source.
    fn embed_batch(&self, texts: &[String]) -> Vec<Result<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Resolves source documents by id. Implemented by the document store
/// collaborator; fails with `Error::SourceNotFound` for unknown ids.
pub trait SourceProvider: Send + Sync {
    fn get_source(
        &self,
        source_id: &str,
        namespace: SourceNamespace,
    ) -> impl Future<Output = Result<Source>> + Send;
}

/// Persistence and query primitives for chunk rows.
///
/// Chunks are written in bulk per source and removed in bulk per source;
/// there is no in-place mutation. `similarity_search` returns
/// `1 - cosine_distance` as the similarity and never returns chunks whose
/// embedding is missing. Store failures surface as
/// `Error::StoreUnavailable`; retries are the caller's policy.
pub trait ChunkStore: Send + Sync {
    fn insert_batch(&self, chunks: Vec<Chunk>) -> impl Future<Output = Result<()>> + Send;

    /// Remove every chunk of `(source_id, namespace)`, returning how many
    /// rows were deleted.
    fn delete_by_source(
        &self,
        source_id: &str,
        namespace: SourceNamespace,
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Top-`k` by similarity, honoring the filter set.
    fn similarity_search(
        &self,
        query: &[f32],
        filters: &SearchFilters,
        k: usize,
    ) -> impl Future<Output = Result<Vec<(Chunk, f32)>>> + Send;

    /// All detail chunks of a summary, ordered by `order`.
    fn get_children(&self, parent_id: &str) -> impl Future<Output = Result<Vec<Chunk>>> + Send;

    fn get(&self, chunk_id: &str) -> impl Future<Output = Result<Option<Chunk>>> + Send;
}
