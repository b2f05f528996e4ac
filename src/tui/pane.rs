//! The scrollable document pane.
//!
//! Holds the raw text, a soft-wrap layout for the current width, and the
//! scroll/selection state. This is the terminal implementation of
//! [`EditorView`]: geometry is measured in rows, and the wrap layout is
//! built lazily during rendering, so measurements asked before the first
//! draw (or right after a resize) genuinely come back as `None`.

use unicode_width::UnicodeWidthChar;

use crate::navigator::{EditorView, SpanRect};
use crate::outline::LineIndex;

/// One visual row: a byte slice of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRow {
    /// Zero-based source line this row belongs to.
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// Greedy display-width wrap of the whole text at one width.
#[derive(Debug)]
struct WrapLayout {
    width: u16,
    rows: Vec<VisualRow>,
}

impl WrapLayout {
    fn build(text: &str, width: u16) -> Self {
        let max_cols = width.max(1) as usize;
        let mut rows = Vec::new();

        let mut offset = 0;
        for (line, line_text) in text.split('\n').enumerate() {
            let mut row_start = offset;
            let mut cols = 0usize;

            for (i, ch) in line_text.char_indices() {
                let w = cell_width(ch);
                // Never break before the first character of a row, even if
                // it alone overflows (a wide char in a 1-cell pane).
                if cols + w > max_cols && cols > 0 {
                    rows.push(VisualRow {
                        line,
                        start: row_start,
                        end: offset + i,
                    });
                    row_start = offset + i;
                    cols = 0;
                }
                cols += w;
            }

            rows.push(VisualRow {
                line,
                start: row_start,
                end: offset + line_text.len(),
            });
            offset += line_text.len() + 1;
        }

        Self { width, rows }
    }

    /// Visual row containing `offset`. Row starts are strictly ascending,
    /// so this is a plain binary search.
    fn row_of(&self, offset: usize) -> usize {
        self.rows.partition_point(|r| r.start <= offset) - 1
    }
}

fn cell_width(ch: char) -> usize {
    if ch == '\t' {
        return 4;
    }
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub struct DocumentPane {
    text: String,
    index: LineIndex,
    selection: (usize, usize),
    highlight: Option<(usize, usize)>,
    scroll_top: f64,
    view_width: u16,
    view_height: u16,
    layout: Option<WrapLayout>,
    /// Offset whose row should be revealed once a layout exists.
    pending_reveal: Option<usize>,
}

impl DocumentPane {
    pub fn new(text: String) -> Self {
        let index = LineIndex::new(&text);
        Self {
            text,
            index,
            selection: (0, 0),
            highlight: None,
            scroll_top: 0.0,
            view_width: 0,
            view_height: 0,
            layout: None,
            pending_reveal: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the document text, keeping scroll and selection as close to
    /// their previous positions as the new text allows.
    pub fn set_text(&mut self, text: String) {
        self.index = LineIndex::new(&text);
        self.text = text;
        self.layout = None;
        self.selection = (
            self.clamp_offset(self.selection.0),
            self.clamp_offset(self.selection.1),
        );
        self.highlight = None;
    }

    pub fn cursor(&self) -> usize {
        self.selection.0
    }

    pub fn highlight(&self) -> Option<(usize, usize)> {
        self.highlight
    }

    /// Record the content area size. A width change invalidates the wrap
    /// layout until the next render.
    pub fn set_view_size(&mut self, width: u16, height: u16) {
        if width != self.view_width {
            self.layout = None;
        }
        self.view_width = width;
        self.view_height = height;
    }

    /// Build the wrap layout for the current width if it is missing, then
    /// settle any deferred reveal and re-clamp the scroll. Called from the
    /// render path once the area size is known.
    pub fn ensure_layout(&mut self) {
        let needs_build = match self.layout {
            Some(ref layout) => layout.width != self.view_width,
            None => true,
        };
        if needs_build {
            self.layout = Some(WrapLayout::build(&self.text, self.view_width));
        }

        if let Some(offset) = self.pending_reveal.take() {
            self.reveal_offset(offset);
        }
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
    }

    /// All visual rows, when a layout exists.
    pub fn rows(&self) -> &[VisualRow] {
        self.layout.as_ref().map_or(&[], |l| l.rows.as_slice())
    }

    pub fn row_text(&self, row: &VisualRow) -> &str {
        &self.text[row.start..row.end]
    }

    /// First visible row index.
    pub fn scroll_row(&self) -> usize {
        self.scroll_top as usize
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.set_scroll_top(self.scroll_top + delta as f64);
    }

    pub fn scroll_page(&mut self, down: bool) {
        let page = self.view_height.max(1) as isize - 1;
        self.scroll_by(if down { page } else { -page });
    }

    pub fn scroll_half_page(&mut self, down: bool) {
        let half = (self.view_height.max(2) / 2) as isize;
        self.scroll_by(if down { half } else { -half });
    }

    pub fn scroll_to_start(&mut self) {
        self.set_scroll_top(0.0);
    }

    pub fn scroll_to_end(&mut self) {
        self.set_scroll_top(self.max_scroll());
    }

    fn max_scroll(&self) -> f64 {
        (self.content_height() - self.view_height as f64).max(0.0)
    }

    /// Scroll just enough to bring the row holding `offset` into view.
    fn reveal_offset(&mut self, offset: usize) {
        let Some(ref layout) = self.layout else {
            return;
        };
        let row = layout.row_of(self.clamp_offset(offset)) as f64;
        let height = self.view_height.max(1) as f64;

        if row < self.scroll_top {
            self.scroll_top = row;
        } else if row >= self.scroll_top + height {
            self.scroll_top = row - height + 1.0;
        }
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
    }

    /// Largest char boundary at or below `offset`, within the text.
    fn clamp_offset(&self, offset: usize) -> usize {
        let mut o = offset.min(self.text.len());
        while o > 0 && !self.text.is_char_boundary(o) {
            o -= 1;
        }
        o
    }

    fn layout_current(&self) -> Option<&WrapLayout> {
        self.layout
            .as_ref()
            .filter(|layout| layout.width == self.view_width)
    }
}

impl EditorView for DocumentPane {
    fn selection(&self) -> (usize, usize) {
        self.selection
    }

    fn apply_selection(&mut self, from: usize, to: usize, scroll_into_view: bool) {
        let from = self.clamp_offset(from);
        let to = self.clamp_offset(to.max(from));
        self.selection = (from, to);

        if scroll_into_view {
            if self.layout_current().is_some() {
                self.reveal_offset(from);
            } else {
                // No layout yet; honor the request at the next render.
                self.pending_reveal = Some(from);
            }
        }
    }

    fn measure_span(&self, from: usize, to: usize) -> Option<SpanRect> {
        let layout = self.layout_current()?;

        let from = self.clamp_offset(from);
        let last = self.clamp_offset(to.saturating_sub(1).max(from));
        let first_row = layout.row_of(from);
        let last_row = layout.row_of(last).max(first_row);

        Some(SpanRect {
            top: first_row as f64 - self.scroll_top,
            bottom: (last_row + 1) as f64 - self.scroll_top,
        })
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, top: f64) {
        self.scroll_top = top.round().clamp(0.0, self.max_scroll());
    }

    fn content_height(&self) -> f64 {
        match self.layout {
            Some(ref layout) => layout.rows.len() as f64,
            // Unwrapped line count is the best available estimate before
            // the first render.
            None => self.index.line_count() as f64,
        }
    }

    fn viewport_height(&self) -> f64 {
        self.view_height as f64
    }

    fn set_highlight(&mut self, span: Option<(usize, usize)>) {
        self.highlight = span;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane(text: &str, width: u16, height: u16) -> DocumentPane {
        let mut pane = DocumentPane::new(text.to_string());
        pane.set_view_size(width, height);
        pane.ensure_layout();
        pane
    }

    #[test]
    fn test_wrap_splits_long_lines() {
        let pane = pane("abcdefgh\nxy", 3, 10);
        let texts: Vec<_> = pane.rows().iter().map(|r| pane.row_text(r)).collect();
        assert_eq!(texts, vec!["abc", "def", "gh", "xy"]);
        assert_eq!(pane.rows()[2].line, 0);
        assert_eq!(pane.rows()[3].line, 1);
    }

    #[test]
    fn test_empty_lines_keep_a_row() {
        let pane = pane("a\n\nb", 10, 10);
        let texts: Vec<_> = pane.rows().iter().map(|r| pane.row_text(r)).collect();
        assert_eq!(texts, vec!["a", "", "b"]);
    }

    #[test]
    fn test_wide_chars_wrap_by_display_width() {
        let pane = pane("日本語", 4, 10);
        let texts: Vec<_> = pane.rows().iter().map(|r| pane.row_text(r)).collect();
        assert_eq!(texts, vec!["日本", "語"]);
    }

    #[test]
    fn test_measure_requires_a_layout() {
        let mut pane = DocumentPane::new("# One\n\ntext\n".to_string());
        assert_eq!(pane.measure_span(0, 5), None);

        pane.set_view_size(20, 5);
        pane.ensure_layout();
        assert!(pane.measure_span(0, 5).is_some());
    }

    #[test]
    fn test_resize_invalidates_measurements() {
        let mut pane = pane("some text here", 20, 5);
        assert!(pane.measure_span(0, 4).is_some());

        pane.set_view_size(10, 5);
        assert_eq!(pane.measure_span(0, 4), None);
    }

    #[test]
    fn test_measure_is_relative_to_scroll() {
        let text = (0..20).map(|i| format!("line {i}")).collect::<Vec<_>>();
        let mut pane = pane(&text.join("\n"), 20, 5);

        let line3_start = pane.text().find("line 3").unwrap();
        let span = pane.measure_span(line3_start, line3_start + 6).unwrap();
        assert_eq!(span.top, 3.0);
        assert_eq!(span.bottom, 4.0);

        pane.set_scroll_top(3.0);
        let span = pane.measure_span(line3_start, line3_start + 6).unwrap();
        assert_eq!(span.top, 0.0);
    }

    #[test]
    fn test_multirow_span_measurement() {
        // One source line wrapped over three rows.
        let pane = pane("abcdefgh", 3, 10);
        let span = pane.measure_span(0, 8).unwrap();
        assert_eq!(span.top, 0.0);
        assert_eq!(span.bottom, 3.0);
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut pane = pane("a\nb\nc\nd", 10, 2);
        pane.set_scroll_top(100.0);
        assert_eq!(pane.scroll_top(), 2.0);

        pane.set_scroll_top(-5.0);
        assert_eq!(pane.scroll_top(), 0.0);
    }

    #[test]
    fn test_reveal_scrolls_minimally() {
        let text = (0..30).map(|i| format!("line {i}")).collect::<Vec<_>>();
        let mut pane = pane(&text.join("\n"), 20, 5);

        // Below the viewport: bottom-aligns.
        let line9 = pane.text().find("line 9").unwrap();
        pane.apply_selection(line9, line9, true);
        assert_eq!(pane.scroll_top(), 5.0);

        // Already visible: no movement.
        let line7 = pane.text().find("line 7").unwrap();
        pane.apply_selection(line7, line7, true);
        assert_eq!(pane.scroll_top(), 5.0);

        // Above the viewport: top-aligns.
        pane.apply_selection(0, 0, true);
        assert_eq!(pane.scroll_top(), 0.0);
    }

    #[test]
    fn test_reveal_before_layout_is_deferred() {
        let text = (0..30).map(|i| format!("line {i}")).collect::<Vec<_>>();
        let joined = text.join("\n");
        let mut pane = DocumentPane::new(joined.clone());
        pane.set_view_size(20, 5);

        let line20 = joined.find("line 20").unwrap();
        pane.apply_selection(line20, line20, true);
        assert_eq!(pane.scroll_top(), 0.0);

        pane.ensure_layout();
        assert_eq!(pane.scroll_top(), 16.0);
    }

    #[test]
    fn test_set_text_drops_stale_layout() {
        let mut pane = pane("short", 10, 5);
        assert!(pane.measure_span(0, 5).is_some());

        pane.set_text("different".to_string());
        assert_eq!(pane.measure_span(0, 5), None);
    }

    #[test]
    fn test_selection_clamped_to_char_boundaries() {
        let mut pane = pane("héllo", 10, 5);
        // Offset 2 lands inside the two-byte 'é'.
        pane.apply_selection(2, 2, false);
        assert_eq!(pane.selection(), (1, 1));

        pane.apply_selection(400, 500, false);
        assert_eq!(pane.selection(), (6, 6));
    }

    #[test]
    fn test_page_scroll() {
        let text = (0..30).map(|i| i.to_string()).collect::<Vec<_>>();
        let mut pane = pane(&text.join("\n"), 10, 10);

        pane.scroll_page(true);
        assert_eq!(pane.scroll_top(), 9.0);
        pane.scroll_page(false);
        assert_eq!(pane.scroll_top(), 0.0);
    }
}
