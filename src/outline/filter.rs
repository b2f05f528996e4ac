//! Substring filtering over the heading list.
//!
//! The popup re-filters on every keystroke, so this stays a pure function
//! over the current heading list: it returns the surviving indices plus the
//! selection that should be active afterwards.

use super::{HeadingEntry, HeadingId};

/// Result of applying a filter: indices into the input slice, plus the
/// reselected heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub filtered: Vec<usize>,
    pub selected: Option<HeadingId>,
}

/// Filter `headings` by case-insensitive substring match on their text.
///
/// An empty (or whitespace-only) filter matches everything. The reselection
/// policy: no matches yields no selection; otherwise the previous selection
/// is kept when it survived the filter, and the first match is selected when
/// it did not.
pub fn apply_filter(
    headings: &[HeadingEntry],
    filter_text: &str,
    previous: Option<HeadingId>,
) -> FilterOutcome {
    let query = filter_text.trim();

    let filtered: Vec<usize> = if query.is_empty() {
        (0..headings.len()).collect()
    } else {
        let query_lower = query.to_lowercase();
        headings
            .iter()
            .enumerate()
            .filter(|(_, h)| h.text.to_lowercase().contains(&query_lower))
            .map(|(i, _)| i)
            .collect()
    };

    let selected = if filtered.is_empty() {
        None
    } else if previous.is_some_and(|id| filtered.iter().any(|&i| headings[i].id() == id)) {
        previous
    } else {
        Some(headings[filtered[0]].id())
    };

    FilterOutcome { filtered, selected }
}
