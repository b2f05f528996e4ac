//! Application state and the actions the key handlers invoke.

use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::navigator::{
    Alignment, CloseReason, EditorView, Navigator, NavigatorEvent, ScrollSync, ViewportSnapshot,
};
use crate::outline::{HeadingEntry, active_heading, extract};

use super::pane::DocumentPane;

pub struct App {
    pub path: PathBuf,
    pub pane: DocumentPane,
    pub headings: Vec<HeadingEntry>,
    pub navigator: Navigator,
    pub scroll_sync: ScrollSync,
    preview_alignment: Alignment,
    confirm_alignment: Alignment,
    /// One-line notice for the status row.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(path: PathBuf, text: String, config: &Config) -> Self {
        let headings = extract(&text);
        Self {
            path,
            pane: DocumentPane::new(text),
            headings,
            navigator: Navigator::new(config.popup_display()),
            scroll_sync: ScrollSync::new(config.scroll_tuning()),
            preview_alignment: config.preview_alignment(),
            confirm_alignment: config.confirm_alignment(),
            status: None,
            should_quit: false,
        }
    }

    /// Open the outline popup seeded with the heading the cursor is in.
    /// The viewport snapshot taken here is what a later cancel restores.
    pub fn open_navigator(&mut self) {
        let snapshot = ViewportSnapshot::capture(&self.pane);
        let active = active_heading(&self.headings, self.pane.cursor());
        let event = self.navigator.open(self.headings.clone(), active, snapshot);
        self.dispatch(event);
    }

    /// Jump to the selected heading and close the popup. Does nothing when
    /// no heading is selected, leaving the popup open.
    pub fn confirm_navigator(&mut self) {
        if let Some(event) = self.navigator.confirm() {
            self.dispatch(Some(event));
            self.navigator.close(CloseReason::Confirmed);
        }
    }

    /// Close the popup. Cancelling puts the viewport back where it was at
    /// open time; dismissing keeps the view where it sits and drops any
    /// preview verification still in flight. A confirm's final scroll is
    /// scheduled before this runs and keeps settling after the close.
    pub fn close_navigator(&mut self, reason: CloseReason) {
        let Some(closed) = self.navigator.close(reason) else {
            return;
        };
        self.pane.set_highlight(None);
        match closed.reason {
            CloseReason::Cancelled => self.scroll_sync.restore(&mut self.pane, &closed.snapshot),
            CloseReason::Dismissed => self.scroll_sync.cancel(),
            CloseReason::Confirmed => {}
        }
    }

    pub fn move_navigator_selection(&mut self, delta: isize) {
        let event = self.navigator.move_selection(delta);
        self.dispatch(event);
    }

    pub fn push_navigator_char(&mut self, c: char) {
        let event = self.navigator.push_filter_char(c);
        self.dispatch(event);
    }

    pub fn pop_navigator_char(&mut self) {
        let event = self.navigator.pop_filter_char();
        self.dispatch(event);
    }

    /// Re-read the document from disk. The outline is re-extracted and an
    /// open popup keeps its filter; a failed read keeps the old text.
    pub fn reload_document(&mut self) {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                self.headings = extract(&text);
                self.pane.set_text(text);
                let active = active_heading(&self.headings, self.pane.cursor());
                self.navigator.update(self.headings.clone(), active, true);
                if self.navigator.is_open() {
                    self.refresh_highlight();
                }
                self.status = Some("document reloaded".to_string());
            }
            Err(err) => {
                self.status = Some(format!("reload failed: {err}"));
            }
        }
    }

    /// Pump the viewport verification protocol.
    pub fn tick(&mut self, now: Instant) {
        self.scroll_sync.on_tick(&mut self.pane, now);
    }

    /// Deadline of the next verification attempt, for the poll timeout.
    pub fn next_due(&self) -> Option<Instant> {
        self.scroll_sync.next_due()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn dispatch(&mut self, event: Option<NavigatorEvent>) {
        match event {
            Some(NavigatorEvent::Preview(entry)) => {
                self.pane.set_highlight(Some((entry.from, entry.to)));
                self.scroll_sync.navigate(
                    &mut self.pane,
                    &entry,
                    self.preview_alignment,
                    Instant::now(),
                );
            }
            Some(NavigatorEvent::Select(entry)) => {
                self.pane.set_highlight(None);
                self.scroll_sync.navigate(
                    &mut self.pane,
                    &entry,
                    self.confirm_alignment,
                    Instant::now(),
                );
            }
            None => {}
        }
    }

    /// Re-point the preview band at the selected heading's current span,
    /// after a reload moved the offsets around.
    fn refresh_highlight(&mut self) {
        let span = self.navigator.selected().and_then(|id| {
            self.headings
                .iter()
                .find(|h| h.id() == id)
                .map(|h| (h.from, h.to))
        });
        self.pane.set_highlight(span);
    }
}
