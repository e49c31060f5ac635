//! Reload the configuration file when it changes on disk.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by writing a temp file and renaming it over the original are
//! still seen. Bursts of events are collapsed into one reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, Overrides};
use crate::config::schema::ConsoleConfig;

const SETTLE: Duration = Duration::from_millis(300);

pub struct ConfigWatcher {
    path: PathBuf,
    overrides: Overrides,
    updates: mpsc::UnboundedSender<ConsoleConfig>,
}

impl ConfigWatcher {
    /// The watcher and the channel reloaded configurations arrive on.
    pub fn new(path: &Path, overrides: Overrides) -> (Self, mpsc::UnboundedReceiver<ConsoleConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            overrides,
            updates,
        };
        (watcher, rx)
    }

    /// Start watching. Must be called inside a Tokio runtime; reloads stop
    /// when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.path.file_name().map(|n| n.to_os_string());
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (changed_tx, mut changed_rx) = mpsc::unbounded_channel::<()>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if touches(&event, file_name.as_deref()) => {
                let _ = changed_tx.send(());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Config watch error"),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let path = self.path;
        let overrides = self.overrides;
        let updates = self.updates;
        tokio::spawn(async move {
            while changed_rx.recv().await.is_some() {
                tokio::time::sleep(SETTLE).await;
                while changed_rx.try_recv().is_ok() {}

                match load_config(&path, &overrides) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Configuration reloaded");
                        if updates.send(config).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reloaded configuration is invalid, keeping the current one");
                    }
                }
            }
        });

        tracing::info!(path = %dir.display(), "Watching configuration");
        Ok(watcher)
    }
}

/// A content change to the watched file.
fn touches(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }
    match file_name {
        Some(name) => event.paths.iter().any(|p| p.file_name() == Some(name)),
        None => true,
    }
}
