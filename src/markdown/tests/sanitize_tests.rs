//! Tests for MarkdownSanitizer

use crate::markdown::sanitize::{is_separator_row, sanitize};

// ============================================================================
// Emphasis
// ============================================================================

#[test]
fn test_stray_emphasis_unwrapped() {
    assert_eq!(sanitize("Great job**,** keep going**!**"), "Great job, keep going!");
}

#[test]
fn test_nested_stray_emphasis_unwrapped() {
    assert_eq!(sanitize("Wait****?****"), "Wait?");
}

#[test]
fn test_real_emphasis_untouched() {
    assert_eq!(sanitize("This is **important**."), "This is **important**.");
}

// ============================================================================
// Table repair
// ============================================================================

#[test]
fn test_missing_separator_inserted() {
    assert_eq!(
        sanitize("| A | B |\n| 1 | 2 |\n"),
        "| A | B |\n| --- | --- |\n| 1 | 2 |\n"
    );
}

#[test]
fn test_empty_row_removed() {
    assert_eq!(sanitize("| | |\n"), "");
    assert_eq!(sanitize("Text\n||\nMore"), "Text\nMore");
}

#[test]
fn test_trailing_double_pipe_collapsed() {
    assert_eq!(
        sanitize("| A | B ||\n| --- | --- |\n| 1 | 2 |"),
        "| A | B |\n| --- | --- |\n| 1 | 2 |"
    );
}

#[test]
fn test_orphan_separator_removed() {
    assert_eq!(sanitize("Some text\n| --- |\nMore"), "Some text\nMore");
}

#[test]
fn test_separator_with_wrong_column_count_replaced() {
    assert_eq!(
        sanitize("| A | B |\n| --- |\n| 1 | 2 |"),
        "| A | B |\n| --- | --- |\n| 1 | 2 |"
    );
}

#[test]
fn test_lone_hyphen_removed_but_rule_kept() {
    assert_eq!(sanitize("A\n-\nB"), "A\nB");
    assert_eq!(sanitize("A\n---\nB"), "A\n---\nB");
}

#[test]
fn test_table_separated_from_following_text() {
    assert_eq!(
        sanitize("| A | B |\n| --- | --- |\n| 1 | 2 |\nAfter"),
        "| A | B |\n| --- | --- |\n| 1 | 2 |\n\nAfter"
    );
}

#[test]
fn test_is_separator_row() {
    assert!(is_separator_row("| --- | :---: |"));
    assert!(is_separator_row("|---|"));
    assert!(!is_separator_row("| A | --- |"));
    assert!(!is_separator_row("---"));
    assert!(!is_separator_row("| |"));
}

// ============================================================================
// Pros / Cons blocks
// ============================================================================

#[test]
fn test_pros_cons_block_becomes_table() {
    let text = "1. Harvard:\nPros:\n- Prestige\n- Research\nCons:\n- Cost";
    assert_eq!(
        sanitize(text),
        "| Option | Pros | Cons |\n| --- | --- | --- |\n| 1. Harvard | Prestige, Research | Cost |"
    );
}

#[test]
fn test_consecutive_pros_cons_blocks_share_a_table() {
    let text = "1. Harvard:\nPros:\n- Prestige\nCons:\n- Cost\n\n2. MIT:\nPros:\n- Labs\nCons:\n- Winters";
    assert_eq!(
        sanitize(text),
        "| Option | Pros | Cons |\n| --- | --- | --- |\n| 1. Harvard | Prestige | Cost |\n| 2. MIT | Labs | Winters |"
    );
}

#[test]
fn test_pros_cons_table_starts_below_existing_table() {
    let text = "| A | B |\n| --- | --- |\n| 1 | 2 |\n1. X:\nPros:\n- a\nCons:\n- b";
    assert_eq!(
        sanitize(text),
        "| A | B |\n| --- | --- |\n| 1 | 2 |\n\n| Option | Pros | Cons |\n| --- | --- | --- |\n| 1. X | a | b |"
    );
}

#[test]
fn test_pros_cons_table_starts_below_lone_header() {
    let text = "| A | B |\n1. X:\nPros:\n- a\nCons:\n- b";
    assert_eq!(
        sanitize(text),
        "| A | B |\n\n| Option | Pros | Cons |\n| --- | --- | --- |\n| 1. X | a | b |"
    );
}

#[test]
fn test_incomplete_pros_cons_block_untouched() {
    let text = "1. Harvard:\nPros:\n- Prestige\nThat is all.";
    assert_eq!(sanitize(text), text);
}

// ============================================================================
// Fenced code and idempotence
// ============================================================================

#[test]
fn test_fenced_code_untouched() {
    let text = "```\n| | |\n**,**\n| A | B |\n| 1 | 2 |\n```";
    assert_eq!(sanitize(text), text);
}

#[test]
fn test_sanitize_is_idempotent() {
    let samples = [
        "| A | B |\n| 1 | 2 |\n",
        "| A | B ||\n| --- |\n| 1 | 2 ||\ntext after",
        "1. Harvard:\nPros:\n- Prestige\nCons:\n- Cost\nClosing words",
        "| | |\n-\n---\nok**!**",
        "```\n| x |\n```\n| A | B |\n| 1 | 2 |",
        "| A | B |\n| --- | --- |\n| 1 | 2 |\n1. X:\nPros:\n- a\nCons:\n- b",
        "| A | B |\n1. X:\nPros:\n- a\nCons:\n- b",
    ];
    for sample in samples {
        let once = sanitize(sample);
        assert_eq!(sanitize(&once), once, "not idempotent for {:?}", sample);
    }
}
