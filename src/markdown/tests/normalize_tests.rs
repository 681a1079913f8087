//! Tests for TextNormalizer

use crate::markdown::normalize::{normalize, TextNormalizer};

// ============================================================================
// Blank-line collapsing
// ============================================================================

#[test]
fn test_blank_runs_collapse_before_heading() {
    assert_eq!(normalize("Header\n\n\n\n## Body"), "Header\n\n## Body");
}

#[test]
fn test_plain_lines_lose_blank_runs() {
    assert_eq!(normalize("First\n\n\nSecond"), "First\nSecond");
}

#[test]
fn test_crlf_is_unified() {
    assert_eq!(normalize("First\r\n\r\nSecond"), "First\nSecond");
}

#[test]
fn test_empty_input() {
    assert_eq!(normalize(""), "");
}

#[test]
fn test_lone_bold_markers_dropped() {
    assert_eq!(normalize("A\n**\nB"), "A\nB");
}

// ============================================================================
// Structural gaps
// ============================================================================

#[test]
fn test_rule_gets_blank_lines_around() {
    assert_eq!(normalize("Intro\n---\nMore"), "Intro\n\n---\n\nMore");
}

#[test]
fn test_numbered_items_and_bold_lines_get_gap() {
    let out = normalize("Steps\n1. Read\n**Important**\ndone");
    assert_eq!(out, "Steps\n\n1. Read\n\n**Important**\ndone");
}

#[test]
fn test_no_gap_at_start() {
    assert_eq!(normalize("## Title\ntext"), "## Title\ntext");
}

// ============================================================================
// Section titles
// ============================================================================

#[test]
fn test_section_title_gets_rule() {
    assert_eq!(
        normalize("Intro\nSummary: good work"),
        "Intro\n\n---\n\nSummary: good work"
    );
}

#[test]
fn test_section_title_after_rule_keeps_single_rule() {
    assert_eq!(normalize("Intro\n---\n## Summary"), "Intro\n\n---\n\n## Summary");
}

#[test]
fn test_title_must_be_whole_word_at_line_start() {
    assert_eq!(normalize("Summaryzing things"), "Summaryzing things");
    assert_eq!(normalize("In Summary we agree"), "In Summary we agree");
}

#[test]
fn test_custom_titles() {
    let normalizer = TextNormalizer::new(&["Verdict"]);
    assert_eq!(normalizer.normalize("Essay\nVerdict: pass"), "Essay\n\n---\n\nVerdict: pass");
    assert_eq!(normalizer.normalize("Essay\nSummary: pass"), "Essay\nSummary: pass");
}

// ============================================================================
// Fenced code
// ============================================================================

#[test]
fn test_fenced_lines_are_not_regrouped() {
    let text = "Text\n```\n1. not a list\n## not a heading\n```";
    assert_eq!(normalize(text), text);
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_normalize_is_idempotent() {
    let samples = [
        "Header\n\n\n\n## Body",
        "Intro\nSummary: good work\nNext Steps\n1. Revise\n2. Submit",
        "A\n---\n---\nB",
        "**Bold**\n\n\n**\nKey Takeaways:\n- one\n- two",
        "```\ncode\n\n\nmore\n```\nafter",
        "\n\nleading blanks\n\n",
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
    }
}
