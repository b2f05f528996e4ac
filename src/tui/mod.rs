//! Terminal interface: the event loop and key dispatch.

pub mod app;
pub mod pane;
pub mod watcher;

mod ui;

pub use app::App;

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

use crate::navigator::CloseReason;
use watcher::DocumentWatcher;

/// Idle poll period; keeps the watcher and status row responsive.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Run the main event loop until the user quits.
///
/// Each iteration draws, waits for input at most until the next scheduled
/// viewport verification, checks the file watcher on idle, and pumps the
/// verification protocol.
pub fn run(
    terminal: &mut DefaultTerminal,
    mut app: App,
    mut watcher: Option<DocumentWatcher>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if event::poll(poll_timeout(&app))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key);
                }
            }
        } else if let Some(ref mut watcher) = watcher {
            if watcher.poll_change() {
                app.reload_document();
            }
        }

        app.tick(Instant::now());
    }

    Ok(())
}

fn poll_timeout(app: &App) -> Duration {
    match app.next_due() {
        Some(due) => due.saturating_duration_since(Instant::now()).min(IDLE_POLL),
        None => IDLE_POLL,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    app.status = None;

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.navigator.is_open() {
        handle_popup_key(app, key);
    } else {
        handle_normal_key(app, key);
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.pane.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.pane.scroll_by(-1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.pane.scroll_half_page(true);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.pane.scroll_half_page(false);
        }
        KeyCode::PageDown => app.pane.scroll_page(true),
        KeyCode::PageUp => app.pane.scroll_page(false),
        KeyCode::Char('g') | KeyCode::Home => app.pane.scroll_to_start(),
        KeyCode::Char('G') | KeyCode::End => app.pane.scroll_to_end(),
        KeyCode::Char('o') | KeyCode::Tab => app.open_navigator(),
        KeyCode::Char('r') => app.reload_document(),
        _ => {}
    }
}

fn handle_popup_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_navigator(CloseReason::Cancelled),
        KeyCode::Tab => app.close_navigator(CloseReason::Dismissed),
        KeyCode::Enter => app.confirm_navigator(),
        KeyCode::Down => app.move_navigator_selection(1),
        KeyCode::Up => app.move_navigator_selection(-1),
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_navigator_selection(1);
        }
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.move_navigator_selection(-1);
        }
        KeyCode::Backspace => app.pop_navigator_char(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.push_navigator_char(c);
        }
        _ => {}
    }
}
