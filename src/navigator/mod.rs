//! The heading navigator: popup state, filtering, and jump semantics.
//!
//! The controller is deliberately host-free. It holds the popup's state
//! while it is open (heading list, filter text, selection, preview
//! bookkeeping) and hands side effects back as [`NavigatorEvent`] values;
//! the host decides how to scroll, highlight, and render. Everything that
//! touches the actual document view lives in [`scroll`] and behind the
//! [`EditorView`] trait.

pub mod scroll;
pub mod view;

pub use scroll::{Alignment, ScrollSync, ScrollTuning};
pub use view::{EditorView, SpanRect, ViewportSnapshot};

use crate::outline::{HeadingEntry, HeadingId, apply_filter};

/// Side effect requested by the controller, for the host to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorEvent {
    /// Non-committal navigation: align the view with this heading while the
    /// popup stays open.
    Preview(HeadingEntry),
    /// The user confirmed this heading; perform the final jump.
    Select(HeadingEntry),
}

/// Why the popup went away. Only `Cancelled` restores the captured viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Confirmed,
    Dismissed,
    Cancelled,
}

/// Popup sizing preferences. Out-of-range values are clamped, never honored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayOptions {
    width: u16,
    max_height_ratio: f64,
}

impl DisplayOptions {
    pub const MIN_WIDTH: u16 = 24;
    pub const MAX_WIDTH: u16 = 120;

    pub fn new(width: u16, max_height_ratio: f64) -> Self {
        Self {
            width: width.clamp(Self::MIN_WIDTH, Self::MAX_WIDTH),
            max_height_ratio: max_height_ratio.clamp(0.2, 0.9),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Popup height cap as a fraction of the host viewport height.
    pub fn max_height_ratio(&self) -> f64 {
        self.max_height_ratio
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::new(56, 0.6)
    }
}

/// Handed back by [`Navigator::close`] so the host can decide whether to
/// restore the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedSession {
    pub reason: CloseReason,
    pub snapshot: ViewportSnapshot,
}

/// State that exists only while the popup is open.
struct Session {
    headings: Vec<HeadingEntry>,
    filter_text: String,
    /// Indices into `headings` that survive the current filter.
    filtered: Vec<usize>,
    selected: Option<HeadingId>,
    /// Dedup gate: the heading the host was last told to preview.
    last_previewed: Option<HeadingId>,
    snapshot: ViewportSnapshot,
}

/// The popup controller. Closed is the absence of a session.
pub struct Navigator {
    display: DisplayOptions,
    session: Option<Session>,
}

impl Navigator {
    /// Longest accepted filter text, to keep per-keystroke refiltering cheap.
    const MAX_FILTER_LEN: usize = 256;

    pub fn new(display: DisplayOptions) -> Self {
        Self {
            display,
            session: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    pub fn set_display_options(&mut self, width: u16, max_height_ratio: f64) {
        self.display = DisplayOptions::new(width, max_height_ratio);
    }

    /// Open the popup over `headings`, seeded with the heading the cursor
    /// is in. The snapshot is kept for the whole session and returned on
    /// close. Previews the seeded selection (first entry when `active` is
    /// `None`).
    pub fn open(
        &mut self,
        headings: Vec<HeadingEntry>,
        active: Option<HeadingId>,
        snapshot: ViewportSnapshot,
    ) -> Option<NavigatorEvent> {
        let outcome = apply_filter(&headings, "", active);
        self.session = Some(Session {
            headings,
            filter_text: String::new(),
            filtered: outcome.filtered,
            selected: outcome.selected,
            last_previewed: None,
            snapshot,
        });
        self.preview(false)
    }

    /// Replace the heading list while the popup is open, typically after a
    /// document change or an external cursor move. Re-runs the filter with
    /// `active` as the reselection candidate. Never previews: the view
    /// already shows whatever caused this update.
    pub fn update(
        &mut self,
        headings: Vec<HeadingEntry>,
        active: Option<HeadingId>,
        preserve_filter: bool,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !preserve_filter {
            session.filter_text.clear();
        }
        let outcome = apply_filter(&headings, &session.filter_text, active);
        session.headings = headings;
        session.filtered = outcome.filtered;
        session.selected = outcome.selected;
        // A vanished selection also voids the dedup memory, so the heading
        // previews again if a later update brings it back.
        if session.selected.is_none() {
            session.last_previewed = None;
        }
    }

    /// Move the selection by `delta` within the filtered list, wrapping at
    /// both ends. No-op while nothing matches.
    pub fn move_selection(&mut self, delta: isize) -> Option<NavigatorEvent> {
        let session = self.session.as_mut()?;
        if session.filtered.is_empty() {
            return None;
        }

        let len = session.filtered.len() as isize;
        let index = session
            .selected
            .and_then(|id| {
                session
                    .filtered
                    .iter()
                    .position(|&i| session.headings[i].id() == id)
            })
            .map_or(-1, |i| i as isize);

        let next = (index + delta).rem_euclid(len) as usize;
        session.selected = Some(session.headings[session.filtered[next]].id());
        self.preview(false)
    }

    /// Append one character to the filter. Control characters and input
    /// past the length cap are ignored.
    pub fn push_filter_char(&mut self, c: char) -> Option<NavigatorEvent> {
        let session = self.session.as_mut()?;
        if session.filter_text.len() >= Self::MAX_FILTER_LEN {
            return None;
        }
        if c.is_control() && c != '\t' {
            return None;
        }
        session.filter_text.push(c);
        self.refilter()
    }

    /// Remove the last filter character, if any.
    pub fn pop_filter_char(&mut self) -> Option<NavigatorEvent> {
        let session = self.session.as_mut()?;
        session.filter_text.pop()?;
        self.refilter()
    }

    /// Replace the whole filter text.
    pub fn set_filter(&mut self, text: impl Into<String>) -> Option<NavigatorEvent> {
        let session = self.session.as_mut()?;
        session.filter_text = text.into();
        self.refilter()
    }

    /// Resolve the current selection against the full heading list and ask
    /// the host to jump there. `None` (and the popup stays open) when
    /// nothing is selected or the selection no longer resolves.
    pub fn confirm(&self) -> Option<NavigatorEvent> {
        let session = self.session.as_ref()?;
        let id = session.selected?;
        session
            .headings
            .iter()
            .find(|h| h.id() == id)
            .map(|h| NavigatorEvent::Select(h.clone()))
    }

    /// Close the popup and discard its state. Returns the session snapshot
    /// with the reason so the host can restore the viewport on a cancel.
    pub fn close(&mut self, reason: CloseReason) -> Option<ClosedSession> {
        self.session.take().map(|session| ClosedSession {
            reason,
            snapshot: session.snapshot,
        })
    }

    pub fn filter_text(&self) -> &str {
        self.session
            .as_ref()
            .map_or("", |s| s.filter_text.as_str())
    }

    pub fn selected(&self) -> Option<HeadingId> {
        self.session.as_ref().and_then(|s| s.selected)
    }

    /// Position of the selection within the filtered list.
    pub fn selected_index(&self) -> Option<usize> {
        let session = self.session.as_ref()?;
        let id = session.selected?;
        session
            .filtered
            .iter()
            .position(|&i| session.headings[i].id() == id)
    }

    /// Entries surviving the filter, in document order.
    pub fn filtered_entries(&self) -> impl Iterator<Item = &HeadingEntry> {
        self.session
            .iter()
            .flat_map(|s| s.filtered.iter().map(|&i| &s.headings[i]))
    }

    /// (matching, total) heading counts for the popup title.
    pub fn match_counts(&self) -> (usize, usize) {
        self.session
            .as_ref()
            .map_or((0, 0), |s| (s.filtered.len(), s.headings.len()))
    }

    /// A filter edit re-runs the engine and always previews the outcome,
    /// even when the selected heading did not change.
    fn refilter(&mut self) -> Option<NavigatorEvent> {
        let session = self.session.as_mut()?;
        let outcome = apply_filter(&session.headings, &session.filter_text, session.selected);
        session.filtered = outcome.filtered;
        session.selected = outcome.selected;
        self.preview(true)
    }

    /// Issue a preview for the current selection through the dedup gate.
    /// `force` bypasses the comparison but still records the heading.
    fn preview(&mut self, force: bool) -> Option<NavigatorEvent> {
        let session = self.session.as_mut()?;
        match session.selected {
            None => {
                session.last_previewed = None;
                None
            }
            Some(id) => {
                if !force && session.last_previewed == Some(id) {
                    return None;
                }
                let entry = session.headings.iter().find(|h| h.id() == id)?;
                session.last_previewed = Some(id);
                Some(NavigatorEvent::Preview(entry.clone()))
            }
        }
    }
}
