//! # mdhop
//!
//! A markdown heading navigator library: outline extraction with stable
//! heading identity, case-insensitive filtering, and a host-agnostic jump
//! popup with verified viewport alignment.
//!
//! The outline and navigator layers are plain state machines with no
//! terminal dependency; any host that can implement
//! [`navigator::EditorView`] over its document view can drive them. The
//! `tui` module is the bundled terminal host.
//!
//! ## Example
//!
//! ```rust
//! use mdhop::outline::{apply_filter, extract};
//!
//! let markdown = "# Introduction\n\n## Background\n\n## Methodology\n";
//!
//! let headings = extract(markdown);
//! assert_eq!(headings.len(), 3);
//!
//! // Filter headings by text
//! let outcome = apply_filter(&headings, "method", None);
//! assert_eq!(outcome.filtered.len(), 1);
//! assert_eq!(headings[outcome.filtered[0]].text, "Methodology");
//! ```

/// Configuration module for persisting user preferences.
///
/// Provides configuration management for popup sizing, scroll verification
/// tuning, and live reload.
pub mod config;

/// Navigator module for the jump popup and viewport alignment.
///
/// Provides the popup state machine (open, filter, preview, confirm,
/// cancel) and the scroll verification protocol that keeps the viewport
/// where a navigation put it.
pub mod navigator;

/// Outline module for heading extraction and filtering.
///
/// Provides functions to extract an ordered, normalized heading outline
/// from markdown text, with byte-offset identity that survives edits
/// elsewhere in the document.
pub mod outline;

/// TUI module for the interactive terminal interface.
///
/// Provides the App and UI rendering functionality for the bundled
/// document viewer.
pub mod tui;

// Re-export commonly used types for convenience
pub use config::Config;
pub use outline::{HeadingEntry, HeadingId, extract};
pub use tui::App;
