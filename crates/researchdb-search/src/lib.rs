//! Indexing orchestration and authority-weighted retrieval.
//!
//! `Indexer` turns one source document into a persisted two-level chunk
//! tree; `WeightedSearchEngine` serves ranked queries over the store with
//! `similarity * authority_weight + keyword_bonus` scoring, optional
//! parent/sibling context reconstruction, and a weighted-vs-unweighted
//! ranking diagnostic.

pub mod engine;
pub mod indexer;
pub mod score;

pub use engine::WeightedSearchEngine;
pub use indexer::Indexer;
