//! Domain types shared by the chunking, indexing and search engines.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

pub type ChunkId = String;

/// Logical collection a source belongs to. Source ids are only unique
/// within a namespace, so chunks carry one next to their `source_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceNamespace {
    Report,
    Primary,
}

impl SourceNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Primary => "primary",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "report" => Ok(Self::Report),
            "primary" => Ok(Self::Primary),
            other => Err(Error::validation(
                "namespace",
                format!("unknown namespace '{other}', expected 'report' or 'primary'"),
            )),
        }
    }
}

impl fmt::Display for SourceNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of material a source is. Drives the default authority weight:
/// primary material (calls, filings) outranks derivative commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    EarningsCall,
    Filing,
    IrMaterial,
    AnalystReport,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarningsCall => "earnings-call",
            Self::Filing => "filing",
            Self::IrMaterial => "ir-material",
            Self::AnalystReport => "analyst-report",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "earnings-call" => Ok(Self::EarningsCall),
            "filing" => Ok(Self::Filing),
            "ir-material" => Ok(Self::IrMaterial),
            "analyst-report" => Ok(Self::AnalystReport),
            other => Err(Error::validation(
                "kind",
                format!("unknown source kind '{other}'"),
            )),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a chunk in the two-level hierarchy.
///
/// `Summary` chunks are short multi-sentence passages and never have a
/// parent; `Detail` chunks are single sentences linked to the `Summary`
/// they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkLevel {
    Summary,
    Detail,
}

impl ChunkLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detail => "detail",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "summary" => Ok(Self::Summary),
            "detail" => Ok(Self::Detail),
            other => Err(Error::validation(
                "level",
                format!("unknown chunk level '{other}', expected 'summary' or 'detail'"),
            )),
        }
    }
}

impl fmt::Display for ChunkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of indexing and retrieval.
///
/// `authority_weight` is a snapshot copied from the source at index time;
/// it never changes for a stored chunk. An empty `embedding` means the
/// provider failed for this chunk; such chunks are kept for context
/// reconstruction but never match a similarity query. `order` is the
/// emission position within the source (summaries first, then details
/// grouped by parent) and is unique per `(source_id, namespace)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source_id: String,
    pub namespace: SourceNamespace,
    pub content: String,
    pub embedding: Vec<f32>,
    pub authority_weight: f32,
    pub level: ChunkLevel,
    pub order: u32,
    pub parent_id: Option<ChunkId>,
}

/// A document to be indexed. Owned by an external collaborator; the engine
/// only reads `body` and snapshots `authority_weight` onto chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub namespace: SourceNamespace,
    pub kind: SourceKind,
    pub body: String,
    pub authority_weight: f32,
}

/// Outcome of one reindex run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexResult {
    pub total: usize,
    pub summary_count: usize,
    pub detail_count: usize,
    pub chunk_ids: Vec<ChunkId>,
}

/// Closed filter set for similarity queries. The store translates this to
/// its native query language; callers never build predicates by hand.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub namespace: Option<SourceNamespace>,
    pub level: Option<ChunkLevel>,
    pub min_similarity: Option<f32>,
}

impl SearchFilters {
    pub fn validate(&self) -> Result<()> {
        if let Some(min) = self.min_similarity {
            if !(0.0..=1.0).contains(&min) {
                return Err(Error::validation(
                    "min_similarity",
                    format!("{min} is outside [0, 1]"),
                ));
            }
        }
        Ok(())
    }
}

/// A chunk with its ranking breakdown.
///
/// `weighted_score = similarity * authority_weight + keyword_bonus`.
/// `parent_content` is pre-joined for detail chunks so callers can show
/// the surrounding passage without a second round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
    pub keyword_bonus: f32,
    pub weighted_score: f32,
    pub parent_content: Option<String>,
}

/// A matched summary with the matched members beneath it.
///
/// `matches` holds the chunks that actually matched the query (the summary
/// itself and/or its details); `siblings` holds the parent's full detail
/// set when sibling expansion was requested, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkGroup {
    pub parent: Chunk,
    pub matches: Vec<ScoredChunk>,
    pub siblings: Vec<Chunk>,
    pub max_score: f32,
}

/// Diagnostic output comparing rankings with and without authority
/// weighting. Rank vectors are 0-based positions of chunks whose snapshot
/// weight clears the high-authority threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankComparison {
    pub weighted: Vec<ScoredChunk>,
    pub unweighted: Vec<ScoredChunk>,
    pub weighted_high_authority_ranks: Vec<usize>,
    pub unweighted_high_authority_ranks: Vec<usize>,
}
