use super::*;

#[test]
fn splits_after_terminal_punctuation() {
    let out = summarize(
        "OpenAI launched X today. It does Y. Users say Z. Pricing starts at $10.",
        DEFAULT_MAX_FRAGMENTS,
    );
    assert_eq!(
        out,
        vec![
            "OpenAI launched X today.",
            "It does Y.",
            "Users say Z.",
            "Pricing starts at $10.",
        ]
    );
}

#[test]
fn truncates_to_max_fragments() {
    let out = summarize("A. B! C? D. E.", 3);
    assert_eq!(out, vec!["A.", "B!", "C?"]);
}

#[test]
fn no_terminal_punctuation_is_one_fragment() {
    assert_eq!(
        summarize("A headline without a period", 4),
        vec!["A headline without a period"]
    );
}

#[test]
fn punctuation_without_following_space_is_not_a_boundary() {
    assert_eq!(
        summarize("Version 2.5 ships.Now with more", 4),
        vec!["Version 2.5 ships.Now with more"]
    );
}

#[test]
fn collapses_whitespace_and_drops_empty() {
    let out = summarize("  First\n\n line.   \t Second   line!  ", 4);
    assert_eq!(out, vec!["First line.", "Second line!"]);
    assert!(summarize("   \n ", 4).is_empty());
}

#[test]
fn resummarizing_own_output_is_stable() {
    let first = summarize("One. Two! Three? Four. Five.", 4);
    let again = summarize(&first.join(" "), 4);
    assert_eq!(first, again);
}
