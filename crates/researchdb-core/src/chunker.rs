//! Two-level chunking of free-text documents.
//!
//! Pure text processing, no I/O: a document body becomes an ordered list of
//! draft chunks — multi-sentence summaries first, then one detail chunk per
//! sentence, each detail pointing at the summary it came from. Parent links
//! are expressed as indexes into the draft list; the indexer resolves them
//! to real ids once ids exist.

use serde::{Deserialize, Serialize};

use crate::types::ChunkLevel;

/// Flush an accumulated summary once it holds this many sentences.
pub const SUMMARY_FLUSH_SENTENCES: usize = 3;
/// Flush early at a paragraph boundary once at least this many sentences
/// have accumulated, so topic breaks are respected.
pub const PARAGRAPH_FLUSH_MIN_SENTENCES: usize = 2;
/// Sentences shorter than this (in Unicode scalar values, trimmed) are
/// dropped from the detail level as noise.
pub const MIN_DETAIL_CHARS: usize = 10;

/// Tunable chunking thresholds. The defaults are empirical and likely need
/// adjustment per corpus and language, so they stay configuration rather
/// than literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    pub summary_flush_sentences: usize,
    pub paragraph_flush_min_sentences: usize,
    pub min_detail_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            summary_flush_sentences: SUMMARY_FLUSH_SENTENCES,
            paragraph_flush_min_sentences: PARAGRAPH_FLUSH_MIN_SENTENCES,
            min_detail_chars: MIN_DETAIL_CHARS,
        }
    }
}

/// A chunk before ids are assigned. `parent_index` points into the output
/// list and is `None` exactly for summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftChunk {
    pub content: String,
    pub level: ChunkLevel,
    pub parent_index: Option<usize>,
}

/// Chunk a document body into summaries and details.
///
/// Emission order is fixed: all summaries in document order, then details
/// grouped by parent summary, in document order within each parent. An
/// empty or whitespace-only body yields no chunks.
pub fn chunk(body: &str, cfg: &ChunkerConfig) -> Vec<DraftChunk> {
    let normalized = normalize_whitespace(body);
    if normalized.is_empty() {
        return Vec::new();
    }

    let paragraphs = split_paragraphs(&normalized);
    let summaries = build_summaries(&paragraphs, cfg);

    let mut drafts: Vec<DraftChunk> = summaries
        .iter()
        .map(|content| DraftChunk {
            content: content.clone(),
            level: ChunkLevel::Summary,
            parent_index: None,
        })
        .collect();

    // Details are re-derived from each summary's own text so that a summary
    // and its details always agree, even if accumulation crossed paragraphs.
    for (summary_index, summary) in summaries.iter().enumerate() {
        for paragraph in split_paragraphs(summary) {
            for sentence in split_sentences(paragraph) {
                if sentence.chars().count() < cfg.min_detail_chars {
                    continue;
                }
                drafts.push(DraftChunk {
                    content: sentence,
                    level: ChunkLevel::Detail,
                    parent_index: Some(summary_index),
                });
            }
        }
    }

    drafts
}

/// Collapse runs of blank lines to one blank line, runs of intra-line
/// whitespace to a single space, and trim the ends.
fn normalize_whitespace(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut newlines = 0usize;
    let mut pending_space = false;
    for ch in body.chars() {
        match ch {
            '\r' => {}
            '\n' => {
                newlines += 1;
                pending_space = false;
            }
            c if c.is_whitespace() => {
                pending_space = true;
            }
            c => {
                if newlines > 0 {
                    if !out.is_empty() {
                        for _ in 0..newlines.min(2) {
                            out.push('\n');
                        }
                    }
                    newlines = 0;
                    pending_space = false;
                }
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }
    out
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split on terminal punctuation, keeping each sentence's trailing
/// punctuation run attached so a joined summary re-splits into the same
/// sentences. Punctuation-only segments count as empty.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if is_terminal(c) {
            while let Some(&next) = chars.peek() {
                if !is_terminal(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(out: &mut Vec<String>, raw: &str) {
    let sentence = raw.trim();
    if sentence.is_empty() || sentence.chars().all(is_terminal) {
        return;
    }
    out.push(sentence.to_string());
}

/// Accumulate sentences across the document into summary texts: flush at
/// `summary_flush_sentences`, flush early at a paragraph boundary once
/// `paragraph_flush_min_sentences` have accumulated, and flush any
/// remainder at end of document regardless of size.
fn build_summaries(paragraphs: &[&str], cfg: &ChunkerConfig) -> Vec<String> {
    let mut summaries = Vec::new();
    let mut accumulated: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        for sentence in split_sentences(paragraph) {
            accumulated.push(sentence);
            if accumulated.len() >= cfg.summary_flush_sentences {
                summaries.push(accumulated.join(" "));
                accumulated.clear();
            }
        }
        if accumulated.len() >= cfg.paragraph_flush_min_sentences {
            summaries.push(accumulated.join(" "));
            accumulated.clear();
        }
    }
    if !accumulated.is_empty() {
        summaries.push(accumulated.join(" "));
    }
    summaries
}
