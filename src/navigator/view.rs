//! The seam between the navigator and the host document view.
//!
//! The navigator never touches a widget or a DOM: everything it needs from
//! the surrounding editor is behind [`EditorView`]. Geometry is expressed in
//! abstract view units relative to the scroll container's visible top; the
//! terminal host measures in rows, a pixel-based host would measure in
//! pixels.

/// Vertical extent of a byte range on screen, relative to the visible top
/// of the scroll container. Values may be negative or exceed the viewport
/// height when the range is scrolled out of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanRect {
    pub top: f64,
    pub bottom: f64,
}

impl SpanRect {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// What the navigator requires of the hosting document view.
///
/// `apply_selection` must perform the cursor move and the optional
/// scroll-into-view request as one operation, so no intermediate state is
/// observable between them. `measure_span` returns `None` whenever layout
/// for the requested range has not materialized yet; callers treat that as
/// retryable, not as an error.
pub trait EditorView {
    /// Current selection as a half-open byte range (collapsed when equal).
    fn selection(&self) -> (usize, usize);

    /// Set the selection, optionally requesting the view to scroll the
    /// selection head into view. Offsets out of range are clamped by the
    /// host.
    fn apply_selection(&mut self, from: usize, to: usize, scroll_into_view: bool);

    /// On-screen extent of a byte range, if layout can answer right now.
    fn measure_span(&self, from: usize, to: usize) -> Option<SpanRect>;

    /// Current scroll offset from the top of the content.
    fn scroll_top(&self) -> f64;

    /// Set the scroll offset. The host clamps to its valid range.
    fn set_scroll_top(&mut self, top: f64);

    /// Total content height in view units.
    fn content_height(&self) -> f64;

    /// Visible height of the scroll container.
    fn viewport_height(&self) -> f64;

    /// Transient highlight of a byte range (`None` clears it).
    fn set_highlight(&mut self, span: Option<(usize, usize)>);
}

/// Everything needed to put the viewport back where it was: captured when
/// the popup opens, applied only when the session ends in a cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSnapshot {
    pub selection_from: usize,
    pub selection_to: usize,
    /// Screen extent of the selection at capture time, when measurable.
    pub span: Option<SpanRect>,
    /// Raw scroll offset at capture time; the fallback when the selection
    /// can no longer be measured at restore time.
    pub scroll_top: f64,
}

impl ViewportSnapshot {
    /// Record the current selection, its screen position, and the scroll
    /// offset.
    pub fn capture(view: &dyn EditorView) -> Self {
        let (selection_from, selection_to) = view.selection();
        Self {
            selection_from,
            selection_to,
            span: view.measure_span(selection_from, selection_to),
            scroll_top: view.scroll_top(),
        }
    }
}
