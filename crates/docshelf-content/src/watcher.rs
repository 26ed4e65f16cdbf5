//! Filesystem watching for docs rebuilds.

use std::path::PathBuf;
use std::time::Duration;

use notify_debouncer_mini::{DebouncedEventKind, new_debouncer};
use tokio::sync::mpsc;

use crate::config::SiteContext;
use crate::versions::{VersionMetadata, versions_file_path};

pub enum ContentEvent {
    Changed,
}

pub struct ContentWatcher {
    _handle: tokio::task::JoinHandle<()>,
}

impl ContentWatcher {
    /// Start watching docs paths for content changes.
    ///
    /// Sends `ContentEvent::Changed` on any `.md`/`.mdx`/`.json` change
    /// (debounced 500ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem watcher cannot be initialized.
    pub fn start(paths: &[PathBuf], tx: mpsc::Sender<ContentEvent>) -> anyhow::Result<Self> {
        let (notify_tx, mut notify_rx) = mpsc::channel(16);

        let mut debouncer = new_debouncer(
            Duration::from_millis(500),
            move |events: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                let events = match events {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!("watcher error: {e}");
                        return;
                    }
                };

                let has_docs_change = events.iter().any(|e| {
                    e.kind == DebouncedEventKind::Any
                        && e.path
                            .extension()
                            .is_some_and(|ext| ext == "md" || ext == "mdx" || ext == "json")
                });

                if has_docs_change {
                    let _ = notify_tx.blocking_send(());
                }
            },
        )?;

        for path in paths {
            debouncer
                .watcher()
                .watch(path, notify::RecursiveMode::Recursive)?;
        }

        let handle = tokio::spawn(async move {
            let _debouncer = debouncer;
            while notify_rx.recv().await.is_some() {
                if tx.send(ContentEvent::Changed).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self { _handle: handle })
    }
}

/// The paths a rebuild depends on: content roots, sidebar files, and the
/// versions registry. Paths that do not exist are dropped, since the
/// watcher refuses to start on them.
#[must_use]
pub fn watch_paths(
    site: &SiteContext,
    instance_id: &str,
    versions: &[VersionMetadata],
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for version in versions {
        paths.push(version.content_paths.content_path.clone());
        paths.push(version.content_paths.content_path_localized.clone());
        paths.push(version.sidebar_file_path.clone());
    }
    paths.push(versions_file_path(&site.site_dir, instance_id));
    paths.retain(|path| path.exists());
    paths.dedup();
    paths
}
