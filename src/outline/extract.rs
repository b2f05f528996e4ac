//! Heading extraction from markdown text.
//!
//! Walks pulldown-cmark's offset-carrying event stream and collects every
//! ATX and Setext heading into a flat, document-ordered list. Heading text
//! is normalized for display: inline markup contributes only its visible
//! content (link labels, image alt text, code span bodies), raw HTML is
//! dropped, and whitespace is collapsed.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::HeadingEntry;
use super::line_index::LineIndex;

struct OpenHeading {
    level: u8,
    from: usize,
    to: usize,
    raw: String,
}

/// Extract all headings from `text`, in document order.
///
/// This never fails: a node that violates the expected span invariants is
/// logged and skipped, and text without headings simply yields an empty
/// vector. Calling it twice on the same text produces identical output.
pub fn extract(text: &str) -> Vec<HeadingEntry> {
    let index = LineIndex::new(text);
    let mut entries: Vec<HeadingEntry> = Vec::new();
    let mut open: Option<OpenHeading> = None;

    for (event, range) in Parser::new_ext(text, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                open = Some(OpenHeading {
                    level: level_number(level),
                    from: range.start,
                    to: range.end,
                    raw: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = open.take() {
                    push_entry(&mut entries, heading, &index);
                }
            }
            Event::Text(chunk) | Event::Code(chunk) => {
                if let Some(ref mut heading) = open {
                    heading.raw.push_str(&chunk);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                // Setext heading text may span lines; treat breaks as spaces.
                if let Some(ref mut heading) = open {
                    heading.raw.push(' ');
                }
            }
            _ => {}
        }
    }

    entries
}

/// Extensions documents in the wild commonly use. None of them can place a
/// heading inside a construct that would reorder or hide it.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn push_entry(entries: &mut Vec<HeadingEntry>, heading: OpenHeading, index: &LineIndex) {
    // Collapse runs of whitespace and trim; headings that normalize to
    // nothing (e.g. "### ") carry no navigable text and are dropped.
    let text = heading.raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return;
    }

    if heading.from >= heading.to {
        log::warn!(
            "skipping heading with degenerate span {}..{}",
            heading.from,
            heading.to
        );
        return;
    }
    if let Some(last) = entries.last() {
        if heading.from <= last.from {
            log::warn!(
                "skipping out-of-order heading at offset {} (previous at {})",
                heading.from,
                last.from
            );
            return;
        }
    }

    entries.push(HeadingEntry {
        text,
        level: heading.level,
        from: heading.from,
        to: heading.to,
        line: index.line_of(heading.from),
    });
}
