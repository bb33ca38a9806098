//! Reload-on-change for the backing file.
//!
//! A [`FileWatcher`] turns filesystem events into [`ChangeSignal`]s and a
//! reloader task answers each signal with a forced [`DocumentStore::reload`].
//! Reloads take the store's session lock, so they never land in the middle
//! of a request's load-mutate-save sequence.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::store::DocumentStore;

/// "The backing file may have changed."
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeSignal;

/// Reload `store` once per signal until the stream closes.
pub fn spawn_reloader(
    store: Arc<DocumentStore>,
    mut signals: mpsc::UnboundedReceiver<ChangeSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signals.recv().await.is_some() {
            debug!("backing file changed; reloading");
            store.reload().await;
        }
        debug!("change stream closed; reloader stopped");
    })
}

fn is_change(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

fn names_file(event: &Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Directory to watch for `file`; a bare file name lives in `.`.
fn watch_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Watches the store's backing file and reloads the cache on change.
///
/// The watch sits on the containing directory and only events naming the
/// file count, so the file may be created or replaced after the watcher
/// starts. Dropping the watcher stops event delivery; the reloader task ends
/// once the event stream closes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    reloader: JoinHandle<()>,
}

impl FileWatcher {
    /// Start watching. Returns `Ok(None)` when there is nothing to watch:
    /// the backend has no file, or reads are already disabled.
    ///
    /// A permission failure while registering the watch also disables reads
    /// on `store`.
    pub fn start(store: Arc<DocumentStore>) -> StoreResult<Option<Self>> {
        let Some(path) = store.location().map(|p| p.to_path_buf()) else {
            return Ok(None);
        };
        if !store.is_readable() {
            return Ok(None);
        }

        let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
            return Ok(None);
        };
        let dir = watch_dir(&path);

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_change(&event.kind) && names_file(&event, &file_name) => {
                let _ = tx.send(ChangeSignal);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "file watcher error"),
        })?;

        if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            let e = crate::StoreError::from(e);
            if e.is_permission_denied() {
                store.disable_reads();
            }
            return Err(e);
        }

        info!(path = %path.display(), "watching document file for changes");
        let reloader = spawn_reloader(store, rx);
        Ok(Some(Self {
            _watcher: watcher,
            reloader,
        }))
    }

    /// Stop watching and cancel the reloader.
    pub async fn stop(self) {
        let Self { _watcher: watcher, reloader } = self;
        drop(watcher);
        reloader.abort();
        let _ = reloader.await;
    }
}
