//! Byte offset to line number resolution.
//!
//! Built once per document text, then queried repeatedly while assigning
//! line numbers to extracted headings and laying out the document pane.

/// Maps byte offsets to zero-based line numbers.
///
/// Construction is a single pass over the text; lookups are a binary
/// search over the recorded line-start offsets.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first character of each line, ascending.
    /// Always contains at least offset 0.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for the given text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Zero-based line number containing `offset`.
    ///
    /// Offsets past the end of the text resolve to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        // partition_point never returns 0 here: line_starts[0] == 0 <= offset.
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// Byte offset at which `line` begins, if the line exists.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
