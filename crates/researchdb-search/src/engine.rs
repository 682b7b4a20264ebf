//! Authority-weighted retrieval over the chunk store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use researchdb_core::error::{Error, Result};
use researchdb_core::traits::{ChunkStore, EmbedProvider};
use researchdb_core::types::{
    Chunk, ChunkGroup, ChunkLevel, RankComparison, ScoredChunk, SearchFilters,
};

use crate::score::{keyword_bonus, weighted_score};

/// Candidates fetched per requested result before reranking; weighting can
/// promote rows the raw similarity order would have cut off.
const CANDIDATE_POOL_FACTOR: usize = 10;
/// Pool factor for context reconstruction, where matches collapse into
/// fewer per-parent groups.
const CONTEXT_POOL_FACTOR: usize = 5;
/// Similarity floor applied while collecting context matches.
const CONTEXT_MIN_SIMILARITY: f32 = 0.1;
/// Keyword bonus weight used by the context reconstruction path.
pub const DEFAULT_KEYWORD_BONUS_WEIGHT: f32 = 0.1;

pub struct WeightedSearchEngine<S> {
    store: Arc<S>,
    embedder: Arc<dyn EmbedProvider>,
    high_authority_threshold: f32,
}

impl<S: ChunkStore> WeightedSearchEngine<S> {
    pub fn new(store: Arc<S>, embedder: Arc<dyn EmbedProvider>) -> Self {
        Self { store, embedder, high_authority_threshold: 0.85 }
    }

    /// Threshold above which a chunk's snapshot weight counts as
    /// high-authority in the comparison diagnostic.
    pub fn with_high_authority_threshold(mut self, threshold: f32) -> Self {
        self.high_authority_threshold = threshold;
        self
    }

    /// Ranked search: `similarity * authority_weight + keyword_bonus`,
    /// descending. Detail results carry their parent summary's content.
    ///
    /// Parameters are validated before any I/O. A query that cannot be
    /// embedded returns an empty result set rather than an error.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        keyword_bonus_weight: f32,
    ) -> Result<Vec<ScoredChunk>> {
        validate_limit(limit)?;
        validate_unit_interval("keyword_bonus_weight", keyword_bonus_weight)?;
        filters.validate()?;

        let Some(query_vector) = self.embed_query(query) else {
            return Ok(Vec::new());
        };
        let candidates = self
            .store
            .similarity_search(
                &query_vector,
                filters,
                limit.saturating_mul(CANDIDATE_POOL_FACTOR),
            )
            .await?;
        let mut results = score_candidates(candidates, query, keyword_bonus_weight, None);
        rank(&mut results);
        results.truncate(limit);
        self.attach_parent_content(&mut results).await?;
        Ok(results)
    }

    /// Group matches under their effective parent summary and return the
    /// groups ranked by their best member.
    ///
    /// A matched summary groups under itself; a matched detail groups under
    /// its parent. With `expand_siblings`, each group also carries the
    /// parent's complete detail set in document order, not only the details
    /// that matched.
    pub async fn search_with_context(
        &self,
        query: &str,
        limit: usize,
        expand_siblings: bool,
    ) -> Result<Vec<ChunkGroup>> {
        validate_limit(limit)?;
        let filters = SearchFilters {
            min_similarity: Some(CONTEXT_MIN_SIMILARITY),
            ..SearchFilters::default()
        };
        let matches = self
            .search(
                query,
                &filters,
                limit.saturating_mul(CONTEXT_POOL_FACTOR),
                DEFAULT_KEYWORD_BONUS_WEIGHT,
            )
            .await?;

        let mut insertion_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, ChunkGroup> = HashMap::new();
        for matched in matches {
            let parent_id = match effective_parent_id(&matched.chunk) {
                Some(id) => id,
                None => {
                    warn!(chunk_id = %matched.chunk.id, "detail chunk without parent, skipping");
                    continue;
                }
            };
            if !groups.contains_key(&parent_id) {
                let parent = if matched.chunk.level == ChunkLevel::Summary {
                    matched.chunk.clone()
                } else {
                    match self.store.get(&parent_id).await? {
                        Some(parent) => parent,
                        None => {
                            warn!(parent_id = %parent_id, "matched chunk references missing parent");
                            continue;
                        }
                    }
                };
                insertion_order.push(parent_id.clone());
                groups.insert(
                    parent_id.clone(),
                    ChunkGroup {
                        parent,
                        matches: Vec::new(),
                        siblings: Vec::new(),
                        max_score: f32::NEG_INFINITY,
                    },
                );
            }
            if let Some(group) = groups.get_mut(&parent_id) {
                group.max_score = group.max_score.max(matched.weighted_score);
                group.matches.push(matched);
            }
        }

        let mut out: Vec<ChunkGroup> = insertion_order
            .into_iter()
            .filter_map(|id| groups.remove(&id))
            .collect();
        out.sort_by(|a, b| b.max_score.partial_cmp(&a.max_score).unwrap_or(Ordering::Equal));
        out.truncate(limit);
        if expand_siblings {
            for group in &mut out {
                group.siblings = self.store.get_children(&group.parent.id).await?;
            }
        }
        Ok(out)
    }

    /// Diagnostic: the same query ranked with real authority weights and
    /// with every weight forced to 1.0, plus the rank positions of
    /// high-authority chunks in each list. Verifies that weighting actually
    /// changes outcomes; not a production query path.
    pub async fn compare_weighted_vs_unweighted(
        &self,
        query: &str,
        limit: usize,
        keyword_bonus_weight: f32,
    ) -> Result<RankComparison> {
        validate_limit(limit)?;
        validate_unit_interval("keyword_bonus_weight", keyword_bonus_weight)?;

        let Some(query_vector) = self.embed_query(query) else {
            return Ok(RankComparison::default());
        };
        let candidates = self
            .store
            .similarity_search(
                &query_vector,
                &SearchFilters::default(),
                limit.saturating_mul(CANDIDATE_POOL_FACTOR),
            )
            .await?;

        let mut weighted = score_candidates(candidates.clone(), query, keyword_bonus_weight, None);
        rank(&mut weighted);
        weighted.truncate(limit);
        let mut unweighted = score_candidates(candidates, query, keyword_bonus_weight, Some(1.0));
        rank(&mut unweighted);
        unweighted.truncate(limit);

        let threshold = self.high_authority_threshold;
        let high_authority_ranks = |results: &[ScoredChunk]| -> Vec<usize> {
            results
                .iter()
                .enumerate()
                .filter(|(_, scored)| scored.chunk.authority_weight >= threshold)
                .map(|(rank, _)| rank)
                .collect()
        };
        Ok(RankComparison {
            weighted_high_authority_ranks: high_authority_ranks(&weighted),
            unweighted_high_authority_ranks: high_authority_ranks(&unweighted),
            weighted,
            unweighted,
        })
    }

    fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(query) {
            Ok(vector) => Some(vector),
            Err(err) => {
                warn!(error = %err, "query embedding failed, returning no results");
                None
            }
        }
    }

    async fn attach_parent_content(&self, results: &mut [ScoredChunk]) -> Result<()> {
        let mut cache: HashMap<String, Option<String>> = HashMap::new();
        for result in results.iter_mut() {
            let Some(parent_id) = result.chunk.parent_id.clone() else {
                continue;
            };
            if !cache.contains_key(&parent_id) {
                let content = self.store.get(&parent_id).await?.map(|c| c.content);
                cache.insert(parent_id.clone(), content);
            }
            result.parent_content = cache.get(&parent_id).cloned().flatten();
        }
        Ok(())
    }
}

fn effective_parent_id(chunk: &Chunk) -> Option<String> {
    match chunk.level {
        ChunkLevel::Summary => Some(chunk.id.clone()),
        ChunkLevel::Detail => chunk.parent_id.clone(),
    }
}

fn score_candidates(
    candidates: Vec<(Chunk, f32)>,
    query: &str,
    keyword_bonus_weight: f32,
    authority_override: Option<f32>,
) -> Vec<ScoredChunk> {
    candidates
        .into_iter()
        .map(|(chunk, similarity)| {
            let bonus = keyword_bonus(query, &chunk.content, keyword_bonus_weight);
            let authority = authority_override.unwrap_or(chunk.authority_weight);
            let score = weighted_score(similarity, authority, bonus);
            ScoredChunk {
                chunk,
                similarity,
                keyword_bonus: bonus,
                weighted_score: score,
                parent_content: None,
            }
        })
        .collect()
}

/// Descending by weighted score; ties broken by descending similarity,
/// then ascending document order, so result order is deterministic.
fn rank(results: &mut [ScoredChunk]) {
    results.sort_by(|a, b| {
        b.weighted_score
            .partial_cmp(&a.weighted_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.chunk.order.cmp(&b.chunk.order))
    });
}

fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::validation("limit", "must be at least 1"));
    }
    Ok(())
}

fn validate_unit_interval(field: &'static str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::validation(field, format!("{value} is outside [0, 1]")));
    }
    Ok(())
}
