//! MarkdownSanitizer - deterministic repair of grader markdown
//!
//! Two failure classes show up in grader output:
//! - emphasis wrapped around lone punctuation (`**,**`), unwrapped to `,`
//! - broken pipe tables, repaired in order:
//!   1. rows made only of pipes are deleted
//!   2. separator-looking lines that are not a valid separator directly
//!      under a matching header are deleted (lone `-` lines included,
//!      plain `---` rules are kept)
//!   3. trailing `||` collapses to `|`
//!   4. a header row followed by a data row gets a `| --- |` separator
//!   5. "N. Title:" / "Pros:" / "Cons:" bullet blocks become table rows
//!
//! Finally a blank line is put between a table and the text after it.
//! Fenced code is never touched. `sanitize(sanitize(x)) == sanitize(x)`.

use std::sync::OnceLock;

use regex::Regex;

use super::{fence_mask, is_table_row};

const PROS_CONS_HEADER: &str = "| Option | Pros | Cons |";

#[derive(Debug, Clone)]
struct Line {
    text: String,
    fenced: bool,
}

impl Line {
    fn plain(text: String) -> Self {
        Self { text, fenced: false }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Unfenced pipe-table row
    fn is_row(&self) -> bool {
        !self.fenced && is_table_row(&self.text)
    }
}

/// Table and emphasis repair pass
pub struct MarkdownSanitizer {
    stray_emphasis: Regex,
    numbered_title: Regex,
}

impl Default for MarkdownSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownSanitizer {
    pub fn new() -> Self {
        Self {
            // **,**  **"**  **?** ...
            stray_emphasis: Regex::new(r#"\*\*(["',;:!?])\*\*"#).unwrap(),
            // "1. University Name:"
            numbered_title: Regex::new(r"^\s*(\d+\.\s+[^:]+?)\s*:\s*$").unwrap(),
        }
    }

    /// Sanitize a response. Total: never fails, any input is accepted.
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let raw: Vec<&str> = text.split('\n').collect();
        let fenced = fence_mask(&raw);
        let mut lines: Vec<Line> = raw
            .iter()
            .zip(fenced)
            .map(|(text, fenced)| Line {
                text: text.to_string(),
                fenced,
            })
            .collect();

        for line in lines.iter_mut().filter(|l| !l.fenced) {
            self.unwrap_emphasis(&mut line.text);
        }

        lines.retain(|l| l.fenced || !is_empty_row(&l.text));
        let mut lines = drop_broken_separators(lines);
        for line in lines.iter_mut().filter(|l| !l.fenced) {
            collapse_trailing_pipes(&mut line.text);
        }
        let lines = insert_missing_separators(lines);
        let lines = self.rewrite_pros_cons(lines);
        let lines = separate_tables(lines);

        let result = lines
            .into_iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n");
        log::trace!("sanitized {} -> {} bytes", text.len(), result.len());
        result
    }

    fn unwrap_emphasis(&self, text: &mut String) {
        // Unwrapping can expose a new match ("****,****"), so run to a fixpoint
        while self.stray_emphasis.is_match(text) {
            let unwrapped = self.stray_emphasis.replace_all(text, "$1").into_owned();
            *text = unwrapped;
        }
    }

    /// Rule 5: rewrite every exact Pros/Cons block into a table row. Runs of
    /// blocks separated only by blank lines share one table.
    fn rewrite_pros_cons(&self, lines: Vec<Line>) -> Vec<Line> {
        let mut out: Vec<Line> = Vec::with_capacity(lines.len());
        let mut in_run = false;
        let mut i = 0;

        while i < lines.len() {
            if let Some((row, consumed)) = self.match_pros_cons(&lines[i..]) {
                if in_run {
                    // Blank lines between two blocks would split the table
                    while out.last().is_some_and(Line::is_blank) {
                        out.pop();
                    }
                } else {
                    // The new header must start its own table, not extend one above it
                    if out.last().is_some_and(Line::is_row) {
                        out.push(Line::plain(String::new()));
                    }
                    out.push(Line::plain(PROS_CONS_HEADER.to_string()));
                    out.push(Line::plain(separator_row(3)));
                    in_run = true;
                }
                out.push(Line::plain(row));
                i += consumed;
                continue;
            }

            if !lines[i].is_blank() {
                in_run = false;
            }
            out.push(lines[i].clone());
            i += 1;
        }
        out
    }

    /// Match `N. Title:` / `Pros:` / bullets / `Cons:` / bullets at the start
    /// of `lines`. Returns the table row and the number of lines consumed.
    fn match_pros_cons(&self, lines: &[Line]) -> Option<(String, usize)> {
        if lines.iter().take(3).any(|l| l.fenced) {
            return None;
        }
        let title = self
            .numbered_title
            .captures(&lines.first()?.text)?
            .get(1)?
            .as_str()
            .to_string();

        let mut i = 1;
        if lines.get(i)?.text.trim() != "Pros:" {
            return None;
        }
        i += 1;
        let pros = take_bullets(&lines[i..]);
        if pros.is_empty() {
            return None;
        }
        i += pros.len();

        if lines.get(i).map(|l| l.fenced || l.text.trim() != "Cons:").unwrap_or(true) {
            return None;
        }
        i += 1;
        let cons = take_bullets(&lines[i..]);
        if cons.is_empty() {
            return None;
        }
        i += cons.len();

        let row = format!(
            "| {} | {} | {} |",
            escape_cell(&title),
            escape_cell(&pros.join(", ")),
            escape_cell(&cons.join(", "))
        );
        Some((row, i))
    }
}

/// Leading run of `- item` bullets, returned without their markers
fn take_bullets(lines: &[Line]) -> Vec<String> {
    lines
        .iter()
        .take_while(|l| !l.fenced && l.text.trim().starts_with('-'))
        .map(|l| l.text.trim()[1..].trim().to_string())
        .collect()
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Rule 1: `| | |`, `|`, `||` ...
fn is_empty_row(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('|') && trimmed.chars().all(|c| c == '|' || c.is_whitespace())
}

/// Only dashes, pipes, colons and spaces, with at least one dash
fn is_separator_like(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.contains('-') && trimmed.chars().all(|c| matches!(c, '-' | '|' | ':') || c.is_whitespace())
}

/// A thematic break made of dashes (`---`, `- - -`), kept as a rule
fn is_dash_rule(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.contains('|') && !trimmed.contains(':') && trimmed.chars().filter(|&c| c == '-').count() >= 3
}

/// Well-formed header separator: `| --- | :--: |`
pub fn is_separator_row(text: &str) -> bool {
    separator_columns(text).is_some()
}

fn separator_columns(text: &str) -> Option<usize> {
    let trimmed = text.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('|') || !trimmed.ends_with('|') {
        return None;
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    let mut columns = 0;
    for cell in inner.split('|') {
        let cell = cell.trim();
        let dashes = cell.trim_start_matches(':').trim_end_matches(':');
        if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
            return None;
        }
        columns += 1;
    }
    Some(columns)
}

/// Header column count: pipes minus one, ignoring a doubled trailing pipe
fn header_columns(text: &str) -> usize {
    let trimmed = text.trim().trim_end_matches('|');
    trimmed.matches('|').count()
}

/// Genuine header shape: starts and ends with `|` with at least one interior `|`
fn is_header_shape(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('|') && trimmed.ends_with('|') && header_columns(trimmed) >= 2
}

/// `| --- |` repeated once per column
fn separator_row(columns: usize) -> String {
    format!("|{}", " --- |".repeat(columns))
}

/// Rule 2. A separator survives only directly under the first row of a
/// table whose column count it matches.
fn drop_broken_separators(lines: Vec<Line>) -> Vec<Line> {
    let mut out: Vec<Line> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.fenced || !is_separator_like(&line.text) || is_dash_rule(&line.text) {
            out.push(line);
            continue;
        }

        let n = out.len();
        let header = n.checked_sub(1).map(|h| &out[h]);
        let starts_table = n < 2 || !out[n - 2].is_row();
        let keep = match (header, separator_columns(&line.text)) {
            (Some(h), Some(cols)) => {
                h.is_row() && starts_table && is_header_shape(&h.text) && header_columns(&h.text) == cols
            }
            _ => false,
        };
        if keep {
            out.push(line);
        } else {
            log::trace!("dropping separator artifact {:?}", line.text);
        }
    }
    out
}

/// Rule 3
fn collapse_trailing_pipes(text: &mut String) {
    let body = text.trim_end();
    if body.ends_with("||") {
        let kept = body.trim_end_matches('|').len();
        text.truncate(kept);
        text.push('|');
    }
}

/// Rule 4
fn insert_missing_separators(lines: Vec<Line>) -> Vec<Line> {
    let mut out: Vec<Line> = Vec::with_capacity(lines.len() + 2);
    for i in 0..lines.len() {
        let line = &lines[i];
        out.push(line.clone());

        let first_row = i == 0 || !lines[i - 1].is_row();
        if !(line.is_row() && first_row && is_header_shape(&line.text)) {
            continue;
        }
        if let Some(next) = lines.get(i + 1) {
            if next.is_row() && !is_separator_row(&next.text) {
                out.push(Line::plain(separator_row(header_columns(&line.text))));
            }
        }
    }
    out
}

/// Blank line between the last row of a table and whatever follows it
fn separate_tables(lines: Vec<Line>) -> Vec<Line> {
    let mut out: Vec<Line> = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();
    while let Some(line) = iter.next() {
        let ends_table = line.is_row()
            && iter
                .peek()
                .is_some_and(|next| !next.is_blank() && (next.fenced || !is_table_row(&next.text)));
        out.push(line);
        if ends_table {
            out.push(Line::plain(String::new()));
        }
    }
    out
}

fn shared() -> &'static MarkdownSanitizer {
    static SANITIZER: OnceLock<MarkdownSanitizer> = OnceLock::new();
    SANITIZER.get_or_init(MarkdownSanitizer::new)
}

/// Sanitize with the shared sanitizer
pub fn sanitize(text: &str) -> String {
    shared().sanitize(text)
}
