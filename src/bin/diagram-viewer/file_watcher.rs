//! Reloads the viewed image when it changes on disk.
//!
//! The parent directory is watched rather than the file itself, since many
//! editors save by writing a temporary file and renaming it over the target.

use eframe::egui;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Watches a single image file for modifications.
pub struct FileWatcher {
    /// Receives one message per relevant filesystem event
    change_rx: Receiver<()>,
    /// The watcher must be kept alive for events to fire
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FileWatcher {
    /// Starts watching `path`.
    ///
    /// Returns `None` if the path has no parent directory or watching fails.
    pub fn new(path: &Path, ctx: egui::Context) -> Option<Self> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = path.parent()?.to_path_buf();
        let file_name = path.file_name()?.to_os_string();

        let (change_tx, change_rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    log::warn!("File watcher error: {err}");
                    return;
                }
            };

            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }

            if event
                .paths
                .iter()
                .any(|changed| changed.file_name() == Some(file_name.as_os_str()))
            {
                let _ = change_tx.send(());
                ctx.request_repaint();
            }
        })
        .map_err(|err| log::warn!("Failed to create file watcher: {err}"))
        .ok()?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|err| log::warn!("Failed to watch {}: {err}", dir.display()))
            .ok()?;

        log::info!("Watching {} for changes", path.display());

        Some(Self {
            change_rx,
            _watcher: watcher,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drains pending events and returns whether the file changed since the last poll.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.change_rx.try_recv() {
                Ok(()) => changed = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("File watcher channel disconnected");
                    break;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn wait_for_change(watcher: &mut FileWatcher) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if watcher.poll() {
                return true;
            }
            thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    fn poll_reports_rewrite_of_watched_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("diagram.png");
        std::fs::write(&path, b"first").unwrap();

        let mut watcher = FileWatcher::new(&path, egui::Context::default())
            .expect("failed to watch temp file");
        assert_eq!(watcher.path(), path.canonicalize().unwrap());
        assert!(!watcher.poll());

        thread::sleep(Duration::from_millis(100));
        std::fs::write(&path, b"second").unwrap();

        assert!(wait_for_change(&mut watcher), "no change event for {}", path.display());
        // Events are drained, so a quiet poll follows once the burst settles
        thread::sleep(Duration::from_millis(200));
        watcher.poll();
        assert!(!watcher.poll());
    }

    #[test]
    fn sibling_file_changes_are_ignored() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("diagram.svg");
        std::fs::write(&path, b"<svg/>").unwrap();

        let mut watcher = FileWatcher::new(&path, egui::Context::default())
            .expect("failed to watch temp file");

        thread::sleep(Duration::from_millis(100));
        std::fs::write(dir.path().join("notes.txt"), b"unrelated").unwrap();
        thread::sleep(Duration::from_millis(500));

        assert!(!watcher.poll());
    }
}
