use researchdb_core::chunker::{chunk, ChunkerConfig};
use researchdb_core::types::ChunkLevel;

fn summaries(drafts: &[researchdb_core::chunker::DraftChunk]) -> Vec<&str> {
    drafts
        .iter()
        .filter(|d| d.level == ChunkLevel::Summary)
        .map(|d| d.content.as_str())
        .collect()
}

fn details(drafts: &[researchdb_core::chunker::DraftChunk]) -> Vec<(&str, usize)> {
    drafts
        .iter()
        .filter(|d| d.level == ChunkLevel::Detail)
        .map(|d| (d.content.as_str(), d.parent_index.expect("detail parent")))
        .collect()
}

#[test]
fn empty_and_whitespace_bodies_yield_no_chunks() {
    let cfg = ChunkerConfig::default();
    assert!(chunk("", &cfg).is_empty());
    assert!(chunk("   \n\n  ", &cfg).is_empty());
    assert!(chunk("...", &cfg).is_empty(), "bare punctuation is not a sentence");
}

#[test]
fn three_sentences_build_one_summary_with_three_details() {
    let body = "HBM revenue grew. Margins improved. Guidance raised for Q4.";
    let drafts = chunk(body, &ChunkerConfig::default());

    assert_eq!(summaries(&drafts), vec![body]);
    assert_eq!(
        details(&drafts),
        vec![
            ("HBM revenue grew.", 0),
            ("Margins improved.", 0),
            ("Guidance raised for Q4.", 0),
        ]
    );
    // summaries are emitted before any detail
    assert_eq!(drafts[0].level, ChunkLevel::Summary);
    assert!(drafts[1..].iter().all(|d| d.level == ChunkLevel::Detail));
}

#[test]
fn detail_length_threshold_is_exclusive_below_ten_chars() {
    // "Was flat." is 9 chars, "Had grown." is 10.
    let drafts = chunk("Was flat. Had grown.", &ChunkerConfig::default());

    assert_eq!(summaries(&drafts), vec!["Was flat. Had grown."]);
    assert_eq!(details(&drafts), vec![("Had grown.", 0)]);
}

#[test]
fn detail_length_counts_unicode_scalars_not_bytes() {
    // First sentence is 4 chars but 10 bytes; a byte count would keep it.
    let drafts = chunk("가나다. 가나다라마바사아자차.", &ChunkerConfig::default());

    assert_eq!(details(&drafts), vec![("가나다라마바사아자차.", 0)]);
}

#[test]
fn paragraph_boundary_flushes_groups_of_two_or_more() {
    let body = "Alpha first sentence here. Alpha second sentence here.\n\n\
                Beta first sentence here. Beta second sentence here. Beta third sentence here.";
    let drafts = chunk(body, &ChunkerConfig::default());

    assert_eq!(
        summaries(&drafts),
        vec![
            "Alpha first sentence here. Alpha second sentence here.",
            "Beta first sentence here. Beta second sentence here. Beta third sentence here.",
        ]
    );
    let parents: Vec<usize> = details(&drafts).iter().map(|(_, p)| *p).collect();
    assert_eq!(parents, vec![0, 0, 1, 1, 1]);
}

#[test]
fn single_sentence_paragraph_carries_into_the_next_group() {
    let body = "Solo opener sentence here.\n\nFollow up sentence one. Follow up sentence two.";
    let drafts = chunk(body, &ChunkerConfig::default());

    assert_eq!(
        summaries(&drafts),
        vec!["Solo opener sentence here. Follow up sentence one. Follow up sentence two."]
    );
}

#[test]
fn trailing_remainder_flushes_even_alone() {
    let drafts = chunk("Lone closing sentence.", &ChunkerConfig::default());

    assert_eq!(summaries(&drafts), vec!["Lone closing sentence."]);
    assert_eq!(details(&drafts), vec![("Lone closing sentence.", 0)]);
}

#[test]
fn short_document_may_have_a_summary_with_no_details() {
    let drafts = chunk("Tiny. Ok.", &ChunkerConfig::default());

    assert_eq!(summaries(&drafts), vec!["Tiny. Ok."]);
    assert!(details(&drafts).is_empty());
}

#[test]
fn whitespace_runs_are_collapsed_before_chunking() {
    let body = "Spaced    out    words here.\n\n\n\n\nNext paragraph sentence here.";
    let drafts = chunk(body, &ChunkerConfig::default());

    assert_eq!(
        summaries(&drafts),
        vec!["Spaced out words here. Next paragraph sentence here."]
    );
}

#[test]
fn punctuation_runs_stay_attached_to_their_sentence() {
    let drafts = chunk("Really?! Are you sure... Yes.", &ChunkerConfig::default());

    assert_eq!(summaries(&drafts), vec!["Really?! Are you sure... Yes."]);
    // "Really?!" and "Yes." fall under the detail length floor.
    assert_eq!(details(&drafts), vec![("Are you sure...", 0)]);
}

#[test]
fn thresholds_are_tunable() {
    let cfg = ChunkerConfig {
        summary_flush_sentences: 2,
        paragraph_flush_min_sentences: 2,
        min_detail_chars: 1,
    };
    let drafts = chunk("One two three. Four five six. Seven eight nine.", &cfg);

    assert_eq!(
        summaries(&drafts),
        vec!["One two three. Four five six.", "Seven eight nine."]
    );
    assert_eq!(
        details(&drafts),
        vec![
            ("One two three.", 0),
            ("Four five six.", 0),
            ("Seven eight nine.", 1),
        ]
    );
}
