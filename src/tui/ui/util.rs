//! Utility functions for UI rendering
//!
//! Pure functions for popup layout and filter-match styling.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;

/// Calculate a centered rectangular area within a parent area.
///
/// Returns a `Rect` of at most `width` by `height` cells, centered both
/// horizontally and vertically and shrunk to fit the parent.
pub fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let [area] = horizontal.areas(area);
    let [area] = vertical.areas(area);
    area
}

/// Scroll offset that keeps `selected_line` roughly centered in a list of
/// `total_lines` rendered through a `visible`-row window, without scrolling
/// past the end.
pub fn list_scroll(selected_line: usize, total_lines: usize, visible: usize) -> usize {
    if visible == 0 || selected_line == 0 {
        return 0;
    }
    let center = visible / 2;
    if selected_line > center {
        (selected_line - center).min(total_lines.saturating_sub(visible))
    } else {
        0
    }
}

/// Style the portions of `text` that match the filter query.
///
/// Performs case-insensitive matching and splits the text into segments,
/// applying the highlight style to matched portions. Matches that would
/// split a multi-byte character are skipped.
pub fn highlight_filter_matches(
    text: &str,
    query: &str,
    base_style: Style,
    highlight_style: Style,
) -> Vec<Span<'static>> {
    let query = query.trim();
    if query.is_empty() {
        return vec![Span::styled(text.to_string(), base_style)];
    }

    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let mut spans = Vec::new();
    let mut last_end = 0;
    let mut search_start = 0;

    while let Some(rel_pos) = text_lower[search_start..].find(&query_lower) {
        let match_start = search_start + rel_pos;
        let match_end = match_start + query_lower.len();

        // Lowercasing can change byte lengths; only slice on boundaries
        // that exist in the original text.
        if !text.is_char_boundary(match_start) || !text.is_char_boundary(match_end) {
            search_start = match_start + 1;
            continue;
        }

        if match_start > last_end {
            spans.push(Span::styled(
                text[last_end..match_start].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[match_start..match_end].to_string(),
            highlight_style,
        ));

        last_end = match_end;
        search_start = match_end;
        if search_start >= text.len() {
            break;
        }
    }

    if last_end < text.len() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
    }

    spans
}
