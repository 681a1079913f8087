//! TextNormalizer - blank-line collapsing and section regrouping
//!
//! The grader over-produces blank lines, so every run of blank lines is
//! first squeezed out and blank lines are then re-inserted only where the
//! structure asks for them:
//! - around standalone `---` rules
//! - before promoted section titles ("Summary", "Next Steps", ...), which
//!   also get a `---` rule in front of them
//! - before numbered items, `#` headings and bold-only lines
//!
//! Lines that are only `**` are dropped. Fenced code is left alone apart
//! from the initial collapse.
//!
//! `normalize(normalize(x)) == normalize(x)` for every input.

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;

use super::fence_mask;

/// Section titles promoted to a visual break by default
pub const SECTION_TITLES: [&str; 4] = [
    "What You Should Do Now",
    "Summary",
    "Key Takeaways",
    "Next Steps",
];

const RULE: &str = "---";

/// Line-oriented normalizer. Build once, reuse for every response.
pub struct TextNormalizer {
    /// None when the title automaton could not be built; titles are then not promoted
    titles: Option<AhoCorasick>,
    blank_runs: Regex,
    excess_blank: Regex,
    numbered_item: Regex,
    heading: Regex,
    bold_line: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(&SECTION_TITLES)
    }
}

impl TextNormalizer {
    /// Create a normalizer that promotes the given section titles
    pub fn new<P: AsRef<str>>(section_titles: &[P]) -> Self {
        let titles = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(section_titles.iter().map(|t| t.as_ref()))
            .map_err(|e| log::warn!("failed to build section title automaton: {}", e))
            .ok();

        Self {
            titles,
            blank_runs: Regex::new(r"\n{2,}").unwrap(),
            excess_blank: Regex::new(r"\n{4,}").unwrap(),
            // "1. First step"
            numbered_item: Regex::new(r"^\d+\.\s").unwrap(),
            // "## Heading"
            heading: Regex::new(r"^#+\s").unwrap(),
            // "**Bold line**" and nothing else
            bold_line: Regex::new(r"^\*\*[^*]+\*\*\s*$").unwrap(),
        }
    }

    /// Normalize a response. Total: never fails, any input is accepted.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        // Rule 1
        let unified = text.replace("\r\n", "\n");
        let collapsed = self.blank_runs.replace_all(&unified, "\n");

        let lines: Vec<&str> = collapsed.split('\n').collect();
        let fenced = fence_mask(&lines);

        let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 8);
        let mut gap_pending = false;

        for (line, in_fence) in lines.iter().copied().zip(fenced) {
            if in_fence {
                push_gap_if(&mut out, gap_pending, line);
                out.push(line);
                gap_pending = false;
                continue;
            }

            let trimmed = line.trim();

            // Rule 5
            if trimmed == "**" {
                continue;
            }

            let is_title = self.is_section_title(line);

            // Rule 3
            if is_title && last_content_line(&out) != Some(RULE) {
                push_gap(&mut out);
                out.push(RULE);
                gap_pending = true;
            }

            // Rules 2 and 4
            let is_rule = trimmed == RULE;
            let gap_before = gap_pending || is_rule || is_title || self.wants_gap_before(line);
            push_gap_if(&mut out, gap_before, line);
            out.push(line);

            gap_pending = is_rule || is_title;
        }

        // Rule 6
        let joined = out.join("\n");
        let result = self.excess_blank.replace_all(&joined, "\n\n\n").into_owned();
        log::trace!("normalized {} -> {} bytes", text.len(), result.len());
        result
    }

    /// Numbered items, `#` headings and bold-only lines get a blank line above
    fn wants_gap_before(&self, line: &str) -> bool {
        self.numbered_item.is_match(line) || self.heading.is_match(line) || self.bold_line.is_match(line)
    }

    /// A title line starts with one of the section phrases, optionally
    /// decorated with `#`/`*`, and the phrase is a whole word.
    fn is_section_title(&self, line: &str) -> bool {
        let Some(titles) = &self.titles else {
            return false;
        };
        let body = line.trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace());
        match titles.find(body) {
            Some(m) if m.start() == 0 => body[m.end()..]
                .chars()
                .next()
                .map_or(true, |c| c == ':' || c == '*' || c.is_whitespace()),
            _ => false,
        }
    }
}

/// Last line in `out` that is not blank
fn last_content_line<'a>(out: &[&'a str]) -> Option<&'a str> {
    out.iter().rev().copied().map(str::trim).find(|l| !l.is_empty())
}

/// Append a blank line unless the output is empty or already ends blank
fn push_gap(out: &mut Vec<&str>) {
    if out.last().is_some_and(|last| !last.trim().is_empty()) {
        out.push("");
    }
}

fn push_gap_if(out: &mut Vec<&str>, wanted: bool, next_line: &str) {
    if wanted && !next_line.trim().is_empty() {
        push_gap(out);
    }
}

fn shared() -> &'static TextNormalizer {
    static NORMALIZER: OnceLock<TextNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(TextNormalizer::default)
}

/// Normalize with the default section titles
pub fn normalize(text: &str) -> String {
    shared().normalize(text)
}
