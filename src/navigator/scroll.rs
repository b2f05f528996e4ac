//! Selection and viewport alignment after a navigation action.
//!
//! Placing the cursor is synchronous, but the host view may reflow, reveal
//! lazy layout, or clamp the scroll after the fact. So every navigation is
//! followed by a short verification sequence: wait, measure where the target
//! span actually landed, correct the scroll if it drifted out of tolerance,
//! and try again on an increasing delay schedule until the attempt budget
//! runs out. The host loop drives the timing by calling [`ScrollSync::on_tick`]
//! with the current instant; nothing here blocks or spawns.

use std::time::{Duration, Instant};

use crate::outline::HeadingEntry;

use super::view::{EditorView, SpanRect, ViewportSnapshot};

/// Where the target span should sit in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Span top at the container top. Used while previewing.
    Top,
    /// Span centered vertically. Used for a confirmed jump.
    Center,
}

/// Tunable knobs for the verification protocol.
#[derive(Debug, Clone)]
pub struct ScrollTuning {
    /// Band, in view units, within which the span counts as aligned.
    pub tolerance: f64,
    /// Delay before each verification attempt; the length is the attempt
    /// budget.
    pub attempt_delays: Vec<Duration>,
    /// Extra verification cycles to run after alignment is reached, to
    /// catch layout that shifts late.
    pub watch_cycles: u8,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            attempt_delays: vec![
                Duration::from_millis(50),
                Duration::from_millis(150),
                Duration::from_millis(400),
            ],
            watch_cycles: 1,
        }
    }
}

/// One verification attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// Span is where it belongs (or cannot get any closer).
    Hold,
    /// Layout could not answer; reissue the scroll request and retry.
    Reissue,
    /// Scroll to this absolute offset and verify again.
    Correct(f64),
}

/// Decide what a verification attempt should do, given a measurement and
/// the view geometry. Pure so the protocol is testable without timers.
fn plan_step(
    span: Option<SpanRect>,
    scroll_top: f64,
    viewport_height: f64,
    content_height: f64,
    alignment: Alignment,
    tolerance: f64,
) -> Step {
    let Some(span) = span else {
        return Step::Reissue;
    };

    let desired_top = match alignment {
        Alignment::Top => 0.0,
        // Tall spans keep their start visible instead of centering past it.
        Alignment::Center => ((viewport_height - span.height()) / 2.0).max(0.0),
    };

    let delta = span.top - desired_top;
    if delta.abs() <= tolerance {
        return Step::Hold;
    }

    let max_scroll = (content_height - viewport_height).max(0.0);
    let target = (scroll_top + delta).clamp(0.0, max_scroll);
    if (target - scroll_top).abs() < 1e-6 {
        // Pinned at a scroll extreme; no closer position exists.
        return Step::Hold;
    }
    Step::Correct(target)
}

#[derive(Debug)]
struct Pending {
    target_from: usize,
    target_to: usize,
    alignment: Alignment,
    /// Attempts consumed so far; indexes into `attempt_delays`.
    attempt: usize,
    due: Instant,
    watch_left: u8,
}

/// Drives cursor placement and viewport alignment for one document view.
///
/// At most one verification sequence is live at a time: a new `navigate`
/// replaces whatever was pending, so a stale correction can never fire after
/// the user has moved on.
pub struct ScrollSync {
    tuning: ScrollTuning,
    pending: Option<Pending>,
}

impl ScrollSync {
    pub fn new(tuning: ScrollTuning) -> Self {
        Self {
            tuning,
            pending: None,
        }
    }

    /// Move the cursor to `entry` and start verifying the viewport.
    ///
    /// The selection collapses at the heading start and carries the
    /// scroll-into-view request in the same operation. Any verification
    /// still pending from an earlier navigation is dropped.
    pub fn navigate(
        &mut self,
        view: &mut dyn EditorView,
        entry: &HeadingEntry,
        alignment: Alignment,
        now: Instant,
    ) {
        view.apply_selection(entry.from, entry.from, true);

        self.pending = self
            .tuning
            .attempt_delays
            .first()
            .map(|&delay| Pending {
                target_from: entry.from,
                target_to: entry.to,
                alignment,
                attempt: 0,
                due: now + delay,
                watch_left: self.tuning.watch_cycles,
            });
    }

    /// Drop any pending verification.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a verification sequence is still running.
    pub fn is_settling(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the next verification attempt, for sizing poll timeouts.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Run the verification attempt that is due, if any.
    pub fn on_tick(&mut self, view: &mut dyn EditorView, now: Instant) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        if now < pending.due {
            self.pending = Some(pending);
            return;
        }

        if view.selection() != (pending.target_from, pending.target_from) {
            // Something newer owns the cursor; this sequence is obsolete.
            return;
        }

        let span = view.measure_span(pending.target_from, pending.target_to);
        let step = plan_step(
            span,
            view.scroll_top(),
            view.viewport_height(),
            view.content_height(),
            pending.alignment,
            self.tuning.tolerance,
        );

        match step {
            Step::Hold => {
                if pending.watch_left > 0 {
                    pending.watch_left -= 1;
                    if self.reschedule(&mut pending, now) {
                        self.pending = Some(pending);
                    }
                }
            }
            Step::Reissue => {
                view.apply_selection(pending.target_from, pending.target_from, true);
                self.continue_or_give_up(pending, now, "span never became measurable");
            }
            Step::Correct(target) => {
                view.set_scroll_top(target);
                self.continue_or_give_up(pending, now, "span stayed out of tolerance");
            }
        }
    }

    fn reschedule(&self, pending: &mut Pending, now: Instant) -> bool {
        pending.attempt += 1;
        match self.tuning.attempt_delays.get(pending.attempt) {
            Some(&delay) => {
                pending.due = now + delay;
                true
            }
            None => false,
        }
    }

    fn continue_or_give_up(&mut self, mut pending: Pending, now: Instant, why: &str) {
        if self.reschedule(&mut pending, now) {
            self.pending = Some(pending);
        } else {
            log::warn!(
                "viewport alignment for offset {} stopped after {} attempts: {}",
                pending.target_from,
                pending.attempt,
                why
            );
        }
    }

    /// Put the viewport back where a snapshot recorded it.
    ///
    /// The exact selection range is restored first, without a scroll
    /// request. The scroll offset is then recomputed so the selection sits
    /// at the same relative position it had at capture time; if the range
    /// can no longer be measured, the raw captured offset is used instead.
    pub fn restore(&mut self, view: &mut dyn EditorView, snapshot: &ViewportSnapshot) {
        self.pending = None;

        view.apply_selection(snapshot.selection_from, snapshot.selection_to, false);

        let target = match snapshot.span {
            Some(captured) => {
                match view.measure_span(snapshot.selection_from, snapshot.selection_to) {
                    Some(current) => view.scroll_top() + current.top - captured.top,
                    None => {
                        log::warn!(
                            "viewport restore could not re-measure selection {}..{}; \
                             falling back to the raw scroll offset",
                            snapshot.selection_from,
                            snapshot.selection_to
                        );
                        snapshot.scroll_top
                    }
                }
            }
            None => snapshot.scroll_top,
        };

        let max_scroll = (view.content_height() - view.viewport_height()).max(0.0);
        view.set_scroll_top(target.clamp(0.0, max_scroll));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// A scripted document view: spans live at fixed absolute offsets and
    /// measurement reports them relative to the current scroll, exactly as
    /// a real layout would.
    struct TestView {
        selection: (usize, usize),
        scroll_top: f64,
        viewport_height: f64,
        content_height: f64,
        /// Absolute (top, bottom) per byte range.
        spans: HashMap<(usize, usize), (f64, f64)>,
        measurable: bool,
        scroll_requests: usize,
        highlight: Option<(usize, usize)>,
    }

    impl TestView {
        fn new(content_height: f64, viewport_height: f64) -> Self {
            Self {
                selection: (0, 0),
                scroll_top: 0.0,
                viewport_height,
                content_height,
                spans: HashMap::new(),
                measurable: true,
                scroll_requests: 0,
                highlight: None,
            }
        }

        fn with_span(mut self, from: usize, to: usize, top: f64, bottom: f64) -> Self {
            self.spans.insert((from, to), (top, bottom));
            self
        }
    }

    impl EditorView for TestView {
        fn selection(&self) -> (usize, usize) {
            self.selection
        }

        fn apply_selection(&mut self, from: usize, to: usize, scroll_into_view: bool) {
            self.selection = (from, to);
            if scroll_into_view {
                self.scroll_requests += 1;
            }
        }

        fn measure_span(&self, from: usize, to: usize) -> Option<SpanRect> {
            if !self.measurable {
                return None;
            }
            self.spans.get(&(from, to)).map(|&(top, bottom)| SpanRect {
                top: top - self.scroll_top,
                bottom: bottom - self.scroll_top,
            })
        }

        fn scroll_top(&self) -> f64 {
            self.scroll_top
        }

        fn set_scroll_top(&mut self, top: f64) {
            let max = (self.content_height - self.viewport_height).max(0.0);
            self.scroll_top = top.clamp(0.0, max);
        }

        fn content_height(&self) -> f64 {
            self.content_height
        }

        fn viewport_height(&self) -> f64 {
            self.viewport_height
        }

        fn set_highlight(&mut self, span: Option<(usize, usize)>) {
            self.highlight = span;
        }
    }

    fn heading(from: usize, to: usize) -> HeadingEntry {
        HeadingEntry {
            text: "Section".to_string(),
            level: 2,
            from,
            to,
            line: 0,
        }
    }

    fn tuning() -> ScrollTuning {
        ScrollTuning::default()
    }

    /// Advance past every scheduled deadline, driving ticks, for at most
    /// `limit` rounds.
    fn settle(sync: &mut ScrollSync, view: &mut TestView, mut now: Instant, limit: usize) {
        for _ in 0..limit {
            let Some(due) = sync.next_due() else { return };
            now = due + Duration::from_millis(1);
            sync.on_tick(view, now);
        }
    }

    #[test]
    fn test_navigate_places_cursor_and_schedules() {
        let mut view = TestView::new(200.0, 20.0).with_span(100, 110, 100.0, 101.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);

        assert_eq!(view.selection, (100, 100));
        assert_eq!(view.scroll_requests, 1);
        assert!(sync.is_settling());
        assert_eq!(sync.next_due(), Some(now + Duration::from_millis(50)));
    }

    #[test]
    fn test_tick_before_due_is_a_noop() {
        let mut view = TestView::new(200.0, 20.0).with_span(100, 110, 100.0, 101.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        sync.on_tick(&mut view, now + Duration::from_millis(10));

        assert!(sync.is_settling());
        assert_eq!(view.scroll_top, 0.0);
    }

    #[test]
    fn test_out_of_tolerance_gets_corrected() {
        let mut view = TestView::new(200.0, 20.0).with_span(100, 110, 100.0, 101.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        sync.on_tick(&mut view, now + Duration::from_millis(60));

        // Span top was at 100 with scroll 0; top alignment puts scroll there.
        assert_eq!(view.scroll_top, 100.0);
        assert!(sync.is_settling());

        // Subsequent attempts find it aligned and the sequence winds down.
        settle(&mut sync, &mut view, now + Duration::from_millis(60), 4);
        assert!(!sync.is_settling());
        assert_eq!(view.scroll_top, 100.0);
    }

    #[test]
    fn test_center_alignment_math() {
        // Span of height 2 in a 20-row viewport wants its top at row 9.
        let mut view = TestView::new(400.0, 20.0).with_span(50, 60, 100.0, 102.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(50, 60), Alignment::Center, now);
        sync.on_tick(&mut view, now + Duration::from_millis(60));

        assert_eq!(view.scroll_top, 91.0);
    }

    #[test]
    fn test_correction_clamps_at_document_end() {
        // Heading near the bottom: top alignment is unreachable, the scroll
        // pins at max and the sequence finishes without thrashing.
        let mut view = TestView::new(200.0, 20.0).with_span(500, 510, 190.0, 191.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(500, 510), Alignment::Top, now);
        settle(&mut sync, &mut view, now, 5);

        assert_eq!(view.scroll_top, 180.0);
        assert!(!sync.is_settling());
    }

    #[test]
    fn test_aligned_view_is_left_alone() {
        let mut view = TestView::new(200.0, 20.0).with_span(0, 10, 0.0, 1.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(0, 10), Alignment::Top, now);
        settle(&mut sync, &mut view, now, 5);

        assert_eq!(view.scroll_top, 0.0);
        assert!(!sync.is_settling());
    }

    #[test]
    fn test_unmeasurable_span_retries_then_corrects() {
        let mut view = TestView::new(200.0, 20.0).with_span(100, 110, 100.0, 101.0);
        view.measurable = false;
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        sync.on_tick(&mut view, now + Duration::from_millis(60));

        // First attempt reissued the scroll request instead of giving up.
        assert_eq!(view.scroll_requests, 2);
        assert!(sync.is_settling());

        // Layout shows up before the next attempt.
        view.measurable = true;
        settle(&mut sync, &mut view, now + Duration::from_millis(60), 4);

        assert_eq!(view.scroll_top, 100.0);
        assert!(!sync.is_settling());
    }

    #[test]
    fn test_unmeasurable_span_exhausts_budget() {
        let mut view = TestView::new(200.0, 20.0);
        view.measurable = false;
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        settle(&mut sync, &mut view, now, 10);

        // Gave up, but the cursor placement stands.
        assert!(!sync.is_settling());
        assert_eq!(view.selection, (100, 100));
    }

    #[test]
    fn test_new_navigation_supersedes_pending() {
        let mut view = TestView::new(400.0, 20.0)
            .with_span(100, 110, 100.0, 101.0)
            .with_span(300, 310, 300.0, 301.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        sync.navigate(&mut view, &heading(300, 310), Alignment::Top, now);
        settle(&mut sync, &mut view, now, 5);

        // Only the second target was verified and aligned.
        assert_eq!(view.scroll_top, 300.0);
    }

    #[test]
    fn test_stale_cursor_abandons_silently() {
        let mut view = TestView::new(200.0, 20.0).with_span(100, 110, 100.0, 101.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        // The user (or some other actor) moved the cursor meanwhile.
        view.selection = (5, 5);
        sync.on_tick(&mut view, now + Duration::from_millis(60));

        assert!(!sync.is_settling());
        assert_eq!(view.scroll_top, 0.0);
        assert_eq!(view.scroll_requests, 1);
    }

    #[test]
    fn test_empty_delay_schedule_skips_verification() {
        let mut view = TestView::new(200.0, 20.0);
        let mut sync = ScrollSync::new(ScrollTuning {
            attempt_delays: Vec::new(),
            ..tuning()
        });

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, Instant::now());

        assert_eq!(view.selection, (100, 100));
        assert!(!sync.is_settling());
    }

    #[test]
    fn test_restore_reproduces_relative_position() {
        // At capture the selection sat 40 rows below the visible top.
        let mut view = TestView::new(400.0, 20.0).with_span(10, 10, 50.0, 51.0);
        view.selection = (10, 10);
        view.scroll_top = 10.0;

        let snapshot = ViewportSnapshot::capture(&view);
        assert_eq!(snapshot.span.map(|s| s.top), Some(40.0));

        // Navigation moved the view far away.
        view.scroll_top = 90.0;
        view.selection = (300, 300);

        let mut sync = ScrollSync::new(tuning());
        sync.restore(&mut view, &snapshot);

        assert_eq!(view.selection, (10, 10));
        assert_eq!(view.scroll_top, 10.0);
        let span = view.measure_span(10, 10).unwrap();
        assert_eq!(span.top, 40.0);
    }

    #[test]
    fn test_restore_clamps_to_valid_range() {
        let mut view = TestView::new(100.0, 20.0).with_span(10, 10, 5.0, 6.0);
        view.selection = (10, 10);
        view.scroll_top = 0.0;
        let mut snapshot = ViewportSnapshot::capture(&view);
        // A snapshot taken before the document shrank may point past the end.
        snapshot.scroll_top = 500.0;
        snapshot.span = None;

        let mut sync = ScrollSync::new(tuning());
        sync.restore(&mut view, &snapshot);

        assert_eq!(view.scroll_top, 80.0);
    }

    #[test]
    fn test_restore_falls_back_to_raw_offset() {
        let mut view = TestView::new(400.0, 20.0).with_span(10, 10, 50.0, 51.0);
        view.selection = (10, 10);
        view.scroll_top = 25.0;
        let snapshot = ViewportSnapshot::capture(&view);

        view.scroll_top = 200.0;
        view.measurable = false;

        let mut sync = ScrollSync::new(tuning());
        sync.restore(&mut view, &snapshot);

        assert_eq!(view.scroll_top, 25.0);
    }

    #[test]
    fn test_restore_cancels_pending_verification() {
        let mut view = TestView::new(400.0, 20.0).with_span(100, 110, 100.0, 101.0);
        let mut sync = ScrollSync::new(tuning());
        let now = Instant::now();

        sync.navigate(&mut view, &heading(100, 110), Alignment::Top, now);
        assert!(sync.is_settling());

        let snapshot = ViewportSnapshot {
            selection_from: 0,
            selection_to: 0,
            span: None,
            scroll_top: 0.0,
        };
        sync.restore(&mut view, &snapshot);

        assert!(!sync.is_settling());
    }

    mod plan_step_tests {
        use super::*;

        #[test]
        fn test_missing_measurement_reissues() {
            let step = plan_step(None, 0.0, 20.0, 200.0, Alignment::Top, 1.0);
            assert_eq!(step, Step::Reissue);
        }

        #[test]
        fn test_within_tolerance_holds() {
            let span = SpanRect {
                top: 0.8,
                bottom: 1.8,
            };
            let step = plan_step(Some(span), 40.0, 20.0, 200.0, Alignment::Top, 1.0);
            assert_eq!(step, Step::Hold);
        }

        #[test]
        fn test_correction_targets_span_top() {
            let span = SpanRect {
                top: 12.0,
                bottom: 13.0,
            };
            let step = plan_step(Some(span), 40.0, 20.0, 200.0, Alignment::Top, 1.0);
            assert_eq!(step, Step::Correct(52.0));
        }

        #[test]
        fn test_correction_clamps_to_zero() {
            // Span above the viewport near the document start.
            let span = SpanRect {
                top: -8.0,
                bottom: -7.0,
            };
            let step = plan_step(Some(span), 3.0, 20.0, 200.0, Alignment::Top, 1.0);
            assert_eq!(step, Step::Correct(0.0));
        }

        #[test]
        fn test_tall_span_centering_keeps_start_visible() {
            // Span taller than the viewport centers to its own top instead.
            let span = SpanRect {
                top: 10.0,
                bottom: 40.0,
            };
            let step = plan_step(Some(span), 0.0, 20.0, 200.0, Alignment::Center, 1.0);
            assert_eq!(step, Step::Correct(10.0));
        }

        #[test]
        fn test_pinned_at_extreme_holds() {
            // Already scrolled to the max; the leftover delta is unreachable.
            let span = SpanRect {
                top: 10.0,
                bottom: 11.0,
            };
            let step = plan_step(Some(span), 180.0, 20.0, 200.0, Alignment::Top, 1.0);
            assert_eq!(step, Step::Hold);
        }
    }
}
