//! Heading extraction and outline state.
//!
//! This module turns raw markdown text into an ordered list of normalized
//! heading entries and provides the query helpers the navigator builds on:
//! offset-to-line resolution, substring filtering with selection carry-over,
//! and cursor-to-heading lookup.

pub mod extract;
pub mod filter;
pub mod line_index;

pub use extract::extract;
pub use filter::{FilterOutcome, apply_filter};
pub use line_index::LineIndex;

use serde::Serialize;

/// Stable identity of a heading: its starting byte offset.
///
/// Survives re-extraction as long as the text before the heading is
/// unchanged, which is what popup refreshes rely on to keep the user's
/// selection in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HeadingId(pub usize);

/// One heading of the document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Display text with inline markup stripped and whitespace collapsed.
    pub text: String,
    /// Heading level, 1-6.
    pub level: u8,
    /// Byte offset where the heading's source span begins.
    pub from: usize,
    /// Byte offset just past the heading's source span.
    pub to: usize,
    /// Zero-based line number of `from`.
    pub line: usize,
}

impl HeadingEntry {
    pub fn id(&self) -> HeadingId {
        HeadingId(self.from)
    }
}

/// Find the heading the cursor is "inside": the last entry starting at or
/// before `cursor`. Returns `None` when the cursor sits above the first
/// heading or the document has none.
pub fn active_heading(headings: &[HeadingEntry], cursor: usize) -> Option<HeadingId> {
    let idx = headings.partition_point(|h| h.from <= cursor);
    idx.checked_sub(1).map(|i| headings[i].id())
}
