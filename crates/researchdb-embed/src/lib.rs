//! Embedding providers.
//!
//! The engine consumes embeddings through `researchdb_core::traits::
//! EmbedProvider`; production deployments implement that trait against
//! their model or API. This crate ships a deterministic token-hashing
//! embedder used for tests, offline runs and the CLI: fast, dependency
//! free, and stable across runs, which is what index idempotency tests
//! need. It is not a semantic model.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use twox_hash::XxHash64;

use researchdb_core::error::Result;
use researchdb_core::traits::EmbedProvider;

/// Default vector width, matching the store's fixed-size vector column.
pub const DEFAULT_DIM: usize = 1024;

/// Deterministic bag-of-tokens embedder: each case-folded token hashes to a
/// bucket, values are L2-normalized. Identical text always embeds to the
/// identical vector.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

impl EmbedProvider for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0f32; self.dim];
        for (position, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let hashed = hasher.finish();
            let bucket = (hashed as usize) % self.dim;
            let value = (((hashed >> 32) as u32) as f32) / (u32::MAX as f32);
            vector[bucket] += value + (position as f32 % 3.0) * 0.01;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut vector {
            *x /= norm;
        }
        Ok(vector)
    }
}

/// The provider used when nothing else is wired up.
pub fn default_provider() -> Arc<dyn EmbedProvider> {
    Arc::new(HashEmbedder::default())
}
