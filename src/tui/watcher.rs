//! File system watcher for live reload.
//!
//! Watches the open document and tells the TUI when it should re-read
//! the file. Events arrive on a channel from the notify backend and are
//! drained non-blockingly from the main loop.

use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{AccessKind, AccessMode, ModifyKind},
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

pub struct DocumentWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    path: PathBuf,
    /// Ignore further events within this duration of the last reload.
    last_reload: Instant,
    debounce: Duration,
}

impl DocumentWatcher {
    pub fn new(path: &Path) -> Result<Self, notify::Error> {
        // Notify reports absolute paths; canonicalize so comparisons hold
        // when the document was given as a relative path.
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        Ok(Self {
            watcher,
            receiver: rx,
            path,
            last_reload: Instant::now(),
            debounce: Duration::from_millis(100),
        })
    }

    /// Drain pending events. Returns true when the document changed and
    /// the debounce window has passed.
    pub fn poll_change(&mut self) -> bool {
        let mut changed = false;
        let mut rewatch = false;

        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    if !event.paths.iter().any(|p| p == &self.path) {
                        continue;
                    }
                    // A rename or removal replaces the inode; the watch
                    // must be re-armed on the new file.
                    if matches!(
                        event.kind,
                        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Remove(_)
                    ) {
                        rewatch = true;
                    }
                    if is_reload_kind(&event.kind) {
                        changed = true;
                    }
                }
                Ok(Err(err)) => log::warn!("file watch error: {err}"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if rewatch {
            let _ = self.watcher.unwatch(&self.path);
            if let Err(err) = self.watcher.watch(&self.path, RecursiveMode::NonRecursive) {
                log::warn!("failed to re-watch {}: {err}", self.path.display());
            }
        }

        if changed && self.last_reload.elapsed() >= self.debounce {
            self.last_reload = Instant::now();
            return true;
        }

        false
    }
}

fn is_reload_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Create(_)
    )
}
