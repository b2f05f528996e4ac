//! Command line interface definition and the non-interactive listing.

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use std::path::PathBuf;

use mdhop::outline::{HeadingEntry, apply_filter};

#[derive(Parser, Debug)]
#[command(name = "mdhop")]
#[command(version)]
#[command(about = "A markdown heading navigator with a filterable jump popup")]
#[command(
    long_about = "mdhop - jump between markdown headings from a filterable popup.\n\n\
    Open a file to get a scrollable view of the document; the outline popup\n\
    previews headings as you move through it and jumps on confirm. Use the\n\
    flags for non-interactive listing of the extracted outline.\n\n\
    Examples:\n  \
    mdhop README.md                   # Interactive TUI mode\n  \
    mdhop -l README.md                # List all headings\n  \
    mdhop -l --filter usage doc.md    # List matching headings\n  \
    mdhop -l -o json doc.md           # Outline as JSON"
)]
pub struct Cli {
    /// Markdown file to open (.md or .markdown)
    pub file: PathBuf,

    /// List all headings in the document (non-interactive)
    ///
    /// Displays the extracted outline with level indicators (# for h1,
    /// ## for h2, etc.) and exits. Combine with --filter to narrow results.
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Filter listed headings by text (case-insensitive)
    ///
    /// Only shows headings containing the specified text, using the same
    /// matching the popup filter uses.
    ///
    /// Example: --filter "install" matches "Installation" and "Installing"
    #[arg(long = "filter", value_name = "PATTERN")]
    pub filter: Option<String>,

    /// Output format for --list
    ///
    /// Controls how headings are displayed:
    ///   plain - Human-readable text (default)
    ///   json  - JSON array for scripting/parsing
    #[arg(short = 'o', long = "output", default_value = "plain")]
    pub output: OutputFormat,

    /// Disable live reload when the file changes on disk
    #[arg(long = "no-watch")]
    pub no_watch: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
}

/// Render the outline for `--list`, with the optional filter applied.
pub fn render_listing(
    headings: &[HeadingEntry],
    filter: Option<&str>,
    format: &OutputFormat,
) -> Result<String> {
    let outcome = apply_filter(headings, filter.unwrap_or(""), None);
    let entries: Vec<&HeadingEntry> = outcome.filtered.iter().map(|&i| &headings[i]).collect();

    match format {
        OutputFormat::Plain => {
            let mut out = String::new();
            for entry in &entries {
                out.push_str(&"#".repeat(usize::from(entry.level)));
                out.push(' ');
                out.push_str(&entry.text);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&entries)?)),
    }
}
