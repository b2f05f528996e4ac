//! Rendering for the document pane, status chrome, and the outline popup.

mod popup;
mod util;

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &mut App) {
    let [title_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_title_bar(frame, app, title_area);
    render_document(frame, app, content_area);
    render_status_bar(frame, app, status_area);

    if app.navigator.is_open() {
        popup::render(frame, app, content_area);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title_text = format!(
        "mdhop - {} - {} headings",
        app.path.display(),
        app.headings.len()
    );

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_document(frame: &mut Frame, app: &mut App, area: Rect) {
    // The rightmost column is left to the scrollbar.
    app.pane
        .set_view_size(area.width.saturating_sub(1), area.height);
    app.pane.ensure_layout();

    let heading_levels: HashMap<usize, u8> =
        app.headings.iter().map(|h| (h.line, h.level)).collect();
    let highlight = app.pane.highlight();

    let top = app.pane.scroll_row();
    let pane = &app.pane;
    let lines: Vec<Line> = pane
        .rows()
        .iter()
        .skip(top)
        .take(area.height as usize)
        .map(|row| {
            let mut style = match heading_levels.get(&row.line) {
                Some(1) => Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                Some(2) => Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
                Some(3) => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                Some(_) => Style::default().fg(Color::Green),
                None => Style::default(),
            };
            if let Some((from, to)) = highlight {
                if row.start < to && from < row.end {
                    style = style.bg(Color::Rgb(40, 40, 60));
                }
            }
            Line::styled(pane.row_text(row).to_string(), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);

    let total = pane.rows().len();
    if total > area.height as usize {
        let mut scrollbar_state = ScrollbarState::new(total).position(top);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // A status message takes over the whole row until the next key.
    if let Some(ref msg) = app.status {
        let status = Paragraph::new(msg.clone()).style(
            Style::default()
                .bg(Color::Rgb(0, 80, 120))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status, area);
        return;
    }

    let status_text = if app.navigator.is_open() {
        "Type:Filter • ↑↓:Move • Enter:Jump • Tab:Close • Esc:Cancel"
    } else {
        "j/k:Scroll • o:Outline • g/G:Top/Bottom • r:Reload • q:Quit"
    };

    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}
