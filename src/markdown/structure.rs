//! StructureScanner - line classification and reveal units
//!
//! Splits prepared text into an ordered list of `RevealUnit`s that cover the
//! text exactly: concatenating every unit's text gives back the input, with
//! no gaps and no overlaps.
//!
//! # Unit rules
//! - a line starting with `|` opens a table; every following non-blank line
//!   containing `|` belongs to it (`Table`)
//! - a line starting with a fence opens a code block that runs through the
//!   closing fence, or to the end of the text (`Atomic`)
//! - rules (`---`, `***`, `===`), block quotes (`>`) and short headings
//!   (`#` lines of at most 3 characters) stand alone (`Atomic`)
//! - everything else is revealed one grapheme at a time, the line's newline
//!   being the last granule (`CharByChar`)

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::sanitize::is_separator_row;

// ==================== TYPE DEFINITIONS ====================

/// Structural category of a single line
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    TableRow,
    TableSeparator,
    FenceDelimiter,
    Heading,
    Rule,
    Quote,
    Plain,
    Blank,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TableRow => "table_row",
            Category::TableSeparator => "table_separator",
            Category::FenceDelimiter => "fence_delimiter",
            Category::Heading => "heading",
            Category::Rule => "rule",
            Category::Quote => "quote",
            Category::Plain => "plain",
            Category::Blank => "blank",
        }
    }
}

/// One line of text (terminator included) and its category
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StructuralLine {
    pub raw_text: String,
    pub category: Category,
}

/// How a unit is revealed
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Whole table in one frame
    Table,
    /// Whole unit (fenced block, rule, quote, short heading) in one frame
    Atomic,
    /// One grapheme per frame, then the newline
    CharByChar,
}

/// A contiguous slice of the text revealed as one piece or grapheme by grapheme
#[derive(Serialize, Clone, Debug)]
pub struct RevealUnit {
    pub kind: UnitKind,
    /// Byte offset of the unit in the scanned text
    pub start: usize,
    pub lines: Vec<StructuralLine>,
    #[serde(skip)]
    text: String,
    /// End offsets (relative to `start`) of each granule, strictly increasing
    #[serde(skip)]
    granule_ends: Vec<usize>,
}

impl RevealUnit {
    fn new(kind: UnitKind, start: usize, lines: Vec<StructuralLine>) -> Self {
        let text: String = lines.iter().map(|l| l.raw_text.as_str()).collect();
        debug_assert!(!text.is_empty(), "scanner produced an empty unit");

        let granule_ends = match kind {
            UnitKind::Table | UnitKind::Atomic => vec![text.len()],
            UnitKind::CharByChar => {
                let body = text.strip_suffix('\n').unwrap_or(&text);
                let mut ends: Vec<usize> = body
                    .grapheme_indices(true)
                    .map(|(offset, g)| offset + g.len())
                    .collect();
                if body.len() < text.len() {
                    ends.push(text.len());
                }
                ends
            }
        };

        Self {
            kind,
            start,
            lines,
            text,
            granule_ends,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset just past the unit
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_atomic(&self) -> bool {
        self.kind != UnitKind::CharByChar
    }

    /// Number of frames needed to reveal the unit
    pub fn granule_count(&self) -> usize {
        self.granule_ends.len()
    }

    /// Absolute offset reached after revealing `count` granules
    pub fn offset_after(&self, count: usize) -> usize {
        match count {
            0 => self.start,
            n => self.start + self.granule_ends[n - 1],
        }
    }
}

// ==================== CLASSIFICATION ====================

/// Category of a line seen on its own
pub fn classify(line: &str) -> Category {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Category::Blank
    } else if trimmed.starts_with("```") {
        Category::FenceDelimiter
    } else if trimmed.starts_with('|') {
        if is_separator_row(trimmed) {
            Category::TableSeparator
        } else {
            Category::TableRow
        }
    } else if trimmed.starts_with('#') {
        Category::Heading
    } else if is_rule_marker(trimmed) {
        Category::Rule
    } else if trimmed.starts_with('>') {
        Category::Quote
    } else {
        Category::Plain
    }
}

fn is_rule_marker(trimmed: &str) -> bool {
    trimmed.starts_with("---") || trimmed.starts_with("***") || trimmed.starts_with("===")
}

/// Bare `#`, `##`, `###` (or anything `#`-led of at most 3 characters)
fn is_short_heading(trimmed: &str) -> bool {
    trimmed.starts_with('#') && trimmed.chars().count() <= 3
}

/// Lines revealed whole even outside tables and fences
fn is_atomic_line(trimmed: &str) -> bool {
    is_rule_marker(trimmed) || is_short_heading(trimmed) || trimmed.starts_with('>')
}

fn continues_table(line: &str) -> bool {
    !line.trim().is_empty() && line.contains('|')
}

fn structural(raw: &str, category: Category) -> StructuralLine {
    StructuralLine {
        raw_text: raw.to_string(),
        category,
    }
}

// ==================== SCANNER ====================

/// Classify every line of `text`, terminators included
pub fn scan_lines(text: &str) -> Vec<StructuralLine> {
    text.split_inclusive('\n')
        .map(|line| structural(line, classify(line)))
        .collect()
}

/// Split `text` into reveal units covering it exactly
pub fn scan(text: &str) -> Vec<RevealUnit> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut units = Vec::new();
    let mut offset = 0;
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();

        let (kind, end) = if trimmed.starts_with("```") {
            // Unclosed fences run to the end of the text
            let close = (i + 1..lines.len()).find(|&j| lines[j].trim().starts_with("```"));
            (UnitKind::Atomic, close.map_or(lines.len(), |j| j + 1))
        } else if trimmed.starts_with('|') {
            let stop = (i + 1..lines.len())
                .find(|&j| !continues_table(lines[j]))
                .unwrap_or(lines.len());
            (UnitKind::Table, stop)
        } else if is_atomic_line(trimmed) {
            (UnitKind::Atomic, i + 1)
        } else {
            (UnitKind::CharByChar, i + 1)
        };

        let members: Vec<StructuralLine> = lines[i..end]
            .iter()
            .map(|line| {
                let category = match (kind, classify(line)) {
                    (UnitKind::Table, Category::TableSeparator) => Category::TableSeparator,
                    (UnitKind::Table, _) => Category::TableRow,
                    (UnitKind::Atomic, c) if trimmed.starts_with("```") && c != Category::FenceDelimiter => {
                        Category::Plain
                    }
                    (_, c) => c,
                };
                structural(line, category)
            })
            .collect();

        let unit = RevealUnit::new(kind, offset, members);
        offset = unit.end();
        units.push(unit);
        i = end;
    }

    log::debug!("scanned {} bytes into {} reveal units", text.len(), units.len());
    units
}
