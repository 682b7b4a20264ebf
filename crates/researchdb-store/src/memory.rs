//! In-memory chunk store: a `HashMap` behind a `RwLock` with a linear
//! cosine scan. Reference semantics for the store contract.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use researchdb_core::error::{Error, Result};
use researchdb_core::traits::ChunkStore;
use researchdb_core::types::{Chunk, SearchFilters, SourceNamespace};

#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: RwLock<HashMap<String, Chunk>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full scan of one source's chunks, in `order`. Test/diagnostic helper,
    /// not part of the store contract.
    pub fn scan_source(&self, source_id: &str, namespace: SourceNamespace) -> Vec<Chunk> {
        let Ok(guard) = self.chunks.read() else {
            return Vec::new();
        };
        let mut chunks: Vec<Chunk> = guard
            .values()
            .filter(|c| c.source_id == source_id && c.namespace == namespace)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.order);
        chunks
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Chunk>>> {
        self.chunks
            .read()
            .map_err(|_| Error::StoreUnavailable("chunk map lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Chunk>>> {
        self.chunks
            .write()
            .map_err(|_| Error::StoreUnavailable("chunk map lock poisoned".to_string()))
    }
}

/// Cosine similarity, 0.0 for empty, mismatched or zero-norm vectors (a
/// missing embedding has no meaningful similarity).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn matches_filters(chunk: &Chunk, filters: &SearchFilters) -> bool {
    if let Some(ns) = filters.namespace {
        if chunk.namespace != ns {
            return false;
        }
    }
    if let Some(level) = filters.level {
        if chunk.level != level {
            return false;
        }
    }
    true
}

impl ChunkStore for MemoryChunkStore {
    async fn insert_batch(&self, chunks: Vec<Chunk>) -> Result<()> {
        let mut map = self.write()?;
        for chunk in chunks {
            map.insert(chunk.id.clone(), chunk);
        }
        Ok(())
    }

    async fn delete_by_source(
        &self,
        source_id: &str,
        namespace: SourceNamespace,
    ) -> Result<usize> {
        let mut map = self.write()?;
        let before = map.len();
        map.retain(|_, c| !(c.source_id == source_id && c.namespace == namespace));
        Ok(before - map.len())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        filters: &SearchFilters,
        k: usize,
    ) -> Result<Vec<(Chunk, f32)>> {
        let map = self.read()?;
        let mut hits: Vec<(Chunk, f32)> = Vec::new();
        for chunk in map.values() {
            if chunk.embedding.is_empty() || !matches_filters(chunk, filters) {
                continue;
            }
            let similarity = cosine_similarity(query, &chunk.embedding);
            if let Some(min) = filters.min_similarity {
                if similarity < min {
                    continue;
                }
            }
            hits.push((chunk.clone(), similarity));
        }
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn get_children(&self, parent_id: &str) -> Result<Vec<Chunk>> {
        let map = self.read()?;
        let mut children: Vec<Chunk> = map
            .values()
            .filter(|c| c.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|c| c.order);
        Ok(children)
    }

    async fn get(&self, chunk_id: &str) -> Result<Option<Chunk>> {
        Ok(self.read()?.get(chunk_id).cloned())
    }
}
