use researchdb_search::score::{keyword_bonus, weighted_score};

const EPS: f32 = 1e-6;

#[test]
fn substring_match_earns_the_full_bonus() {
    let bonus = keyword_bonus("HBM revenue", "Samsung HBM revenue grew again.", 0.2);
    assert!((bonus - 0.2).abs() < EPS);
}

#[test]
fn substring_match_is_case_insensitive() {
    let bonus = keyword_bonus("hbm REVENUE", "Samsung HBM revenue grew again.", 0.2);
    assert!((bonus - 0.2).abs() < EPS);
}

#[test]
fn partial_word_overlap_scales_the_bonus() {
    // one of two query words present -> half the bonus
    let bonus = keyword_bonus("HBM revenue", "revenue commentary only here", 0.2);
    assert!((bonus - 0.1).abs() < EPS);
}

#[test]
fn no_overlap_earns_nothing() {
    let bonus = keyword_bonus("HBM revenue", "completely unrelated text", 0.2);
    assert!(bonus.abs() < EPS);
}

#[test]
fn empty_or_whitespace_query_earns_nothing() {
    assert!(keyword_bonus("", "any content", 0.2).abs() < EPS);
    assert!(keyword_bonus("   ", "any content", 0.2).abs() < EPS);
}

#[test]
fn zero_weight_disables_the_bonus() {
    assert!(keyword_bonus("HBM revenue", "Samsung HBM revenue grew.", 0.0).abs() < EPS);
}

#[test]
fn weighted_score_is_similarity_times_authority_plus_bonus() {
    assert!((weighted_score(0.8, 0.5, 0.1) - 0.5).abs() < EPS);
    assert!((weighted_score(0.8, 1.0, 0.0) - 0.8).abs() < EPS);
}

#[test]
fn higher_authority_strictly_wins_at_equal_similarity_and_bonus() {
    let low = weighted_score(0.6, 0.4, 0.05);
    let high = weighted_score(0.6, 0.9, 0.05);
    assert!(high > low);
}
