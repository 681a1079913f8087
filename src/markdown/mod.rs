//! Markdown preparation passes
//!
//! Raw grader output goes through three pure passes before it is revealed:
//! - `normalize.rs` - TextNormalizer: blank-line collapsing and section regrouping
//! - `sanitize.rs` - MarkdownSanitizer: table and emphasis repair
//! - `structure.rs` - StructureScanner: line classification and reveal units
//! - `wasm.rs` - free functions exposing the passes to JavaScript

pub mod normalize;
pub mod sanitize;
pub mod structure;
pub mod wasm;

pub use normalize::*;
pub use sanitize::*;
pub use structure::*;

#[cfg(test)]
mod tests;

/// True for a line that opens or closes a fenced code block
pub(crate) fn is_fence_delimiter(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// True for a line that belongs to a pipe table (`| ... |`)
pub(crate) fn is_table_row(line: &str) -> bool {
    line.trim().starts_with('|')
}

/// Flag every line that sits inside a fenced code block, delimiters included.
///
/// An unterminated fence runs to the end of the text.
pub(crate) fn fence_mask<S: AsRef<str>>(lines: &[S]) -> Vec<bool> {
    let mut in_fence = false;
    lines
        .iter()
        .map(|line| {
            if is_fence_delimiter(line.as_ref()) {
                in_fence = !in_fence;
                true
            } else {
                in_fence
            }
        })
        .collect()
}
