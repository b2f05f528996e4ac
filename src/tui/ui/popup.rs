//! The outline popup overlay.
//!
//! A centered modal over the document pane: a filter input on top, the
//! matching headings below, the selection marked and kept visible.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::outline::HeadingEntry;
use crate::tui::app::App;

use super::util::{highlight_filter_matches, list_scroll, popup_area};

pub fn render(frame: &mut Frame, app: &App, host: Rect) {
    let nav = &app.navigator;
    let display = nav.display();
    let (matching, total) = nav.match_counts();

    // Filter row, spacer, then one row per match (or one message row).
    let content_rows = 2 + matching.max(1);
    let max_height = ((f64::from(host.height)) * display.max_height_ratio()) as u16;
    let height = (content_rows as u16 + 2).min(max_height.max(5)).min(host.height);
    let area = popup_area(host, display.width(), height);

    frame.render_widget(Clear, area);

    let mut lines = vec![filter_line(nav.filter_text()), Line::from("")];

    let selected = nav.selected_index();
    let mut selected_line = 0;
    for (idx, entry) in nav.filtered_entries().enumerate() {
        let is_selected = selected == Some(idx);
        if is_selected {
            selected_line = lines.len();
        }
        lines.push(entry_line(entry, nav.filter_text(), is_selected));
    }

    if total == 0 {
        lines.push(Line::from(Span::styled(
            "  No headings in this document",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    } else if matching == 0 {
        lines.push(Line::from(Span::styled(
            "  No headings match the filter",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let total_lines = lines.len();
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll_offset = list_scroll(selected_line, total_lines, inner_height);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Outline {matching}/{total} ")),
        )
        .scroll((scroll_offset as u16, 0));

    frame.render_widget(paragraph, area);

    if total_lines > inner_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .style(Style::default().fg(Color::Cyan));

        let mut scrollbar_state = ScrollbarState::new(total_lines).position(scroll_offset);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn filter_line(filter: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::Cyan)),
        Span::styled(filter.to_string(), Style::default().fg(Color::White)),
        Span::styled("▌", Style::default().fg(Color::White)),
    ])
}

fn entry_line(entry: &HeadingEntry, filter: &str, is_selected: bool) -> Line<'static> {
    let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));

    if is_selected {
        Line::from(vec![
            Span::styled(
                "▶ ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{indent}{}", entry.text),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let mut spans = vec![Span::raw(format!("  {indent}"))];
        spans.extend(highlight_filter_matches(
            &entry.text,
            filter,
            Style::default().fg(Color::Gray),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        Line::from(spans)
    }
}
