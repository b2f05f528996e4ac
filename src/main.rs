//! # mdhop
//!
//! A markdown heading navigator: a scrollable document view with a
//! filterable popup for previewing and jumping between headings.
//!
//! ## Usage
//!
//! Launch the interactive TUI:
//! ```sh
//! mdhop README.md
//! ```
//!
//! List all headings:
//! ```sh
//! mdhop -l README.md
//! ```
//!
//! List matching headings as JSON:
//! ```sh
//! mdhop -l --filter usage -o json README.md
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::Cli;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;

use mdhop::outline::extract;
use mdhop::tui::watcher::DocumentWatcher;
use mdhop::{Config, tui};

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let args = Cli::parse();

    let text = std::fs::read_to_string(&args.file)
        .wrap_err_with(|| format!("failed to read {}", args.file.display()))?;

    if args.list {
        let headings = extract(&text);
        let listing = cli::render_listing(&headings, args.filter.as_deref(), &args.output)?;
        print!("{listing}");
        return Ok(());
    }

    let config = Config::load();

    let watcher = if args.no_watch || !config.watch.enabled {
        None
    } else {
        match DocumentWatcher::new(&args.file) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                log::warn!("live reload unavailable: {err}");
                None
            }
        }
    };

    // Initialize the terminal manually for explicit cleanup on errors.
    use crossterm::ExecutableCommand;
    use crossterm::terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    };
    use std::io::stdout;

    enable_raw_mode().inspect_err(|e| {
        eprintln!("Failed to enable raw mode: {}", e);
    })?;

    stdout().execute(EnterAlternateScreen).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let backend = ratatui::backend::CrosstermBackend::new(stdout());
    let mut terminal = ratatui::Terminal::new(backend).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let path = args.file.canonicalize().unwrap_or_else(|_| args.file.clone());
    let app = tui::App::new(path, text, &config);
    let result = tui::run(&mut terminal, app, watcher);

    // Cleanup terminal state
    stdout().execute(LeaveAlternateScreen).ok();
    disable_raw_mode().ok();

    result
}

/// Route log output to a file when `MDHOP_LOG` is set. Writing to stderr
/// would corrupt the alternate screen, so logging is off by default.
fn init_logging() {
    let Ok(filter) = std::env::var("MDHOP_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create("mdhop.log") else {
        return;
    };
    env_logger::Builder::new()
        .parse_filters(&filter)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}
