//! Chunk store implementations.
//!
//! `LanceChunkStore` persists chunk rows in a LanceDB table and serves
//! cosine top-K queries from it. `MemoryChunkStore` is a linear-scan
//! in-memory implementation with the same contract, used by engine tests
//! and small corpora. `MemorySourceProvider` is the matching in-memory
//! document collaborator.

pub mod lance;
pub mod memory;
pub mod schema;
pub mod sources;

pub use lance::LanceChunkStore;
pub use memory::{cosine_similarity, MemoryChunkStore};
pub use sources::MemorySourceProvider;
