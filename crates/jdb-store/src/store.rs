use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use jdb_tree::Document;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::codec::DocumentCodec;

/// Result of one attempt to read the backing document.
enum ReadOutcome {
    Loaded(Document),
    Missing,
    Failed,
}

/// Owner of the cached document.
///
/// All access to the cache goes through one async mutex: a request holds a
/// [`Session`] for its whole load-mutate-save sequence, and external-change
/// reloads take the same lock, so neither can interleave with the other.
///
/// Permission failures switch reads or writes off for the lifetime of this
/// instance. Every other I/O or parse failure is logged and the cache keeps
/// its previous contents.
pub struct DocumentStore {
    backend: Box<dyn Backend>,
    cache: Mutex<Option<Document>>,
    readable: AtomicBool,
    writable: AtomicBool,
}

impl DocumentStore {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            cache: Mutex::new(None),
            readable: AtomicBool::new(true),
            writable: AtomicBool::new(true),
        }
    }

    /// Location of the backing file, when the backend has one.
    pub fn location(&self) -> Option<&Path> {
        self.backend.location()
    }

    pub fn is_readable(&self) -> bool {
        self.readable.load(Ordering::Acquire)
    }

    pub fn is_writable(&self) -> bool {
        self.writable.load(Ordering::Acquire)
    }

    pub(crate) fn disable_reads(&self) {
        if self.readable.swap(false, Ordering::AcqRel) {
            warn!("read permission denied; serving cached document only");
        }
    }

    pub(crate) fn disable_writes(&self) {
        if self.writable.swap(false, Ordering::AcqRel) {
            warn!("write permission denied; changes will only be kept in memory");
        }
    }

    /// Take exclusive access to the cache.
    pub async fn session(&self) -> Session<'_> {
        Session {
            store: self,
            cache: self.cache.lock().await,
        }
    }

    /// Snapshot of the current document, loading it on first use.
    pub async fn load(&self) -> Option<Document> {
        self.session().await.load().await.cloned()
    }

    /// Replace the cached document and persist it.
    pub async fn save(&self, document: Document) {
        let mut session = self.session().await;
        session.replace(document);
        session.save().await;
    }

    /// Re-read the backing file, overwriting the cache.
    pub async fn reload(&self) {
        self.session().await.reload().await;
    }

    async fn read_document(&self) -> ReadOutcome {
        if !self.is_readable() {
            debug!("reads disabled; keeping cached document");
            return ReadOutcome::Failed;
        }
        match self.backend.read().await {
            Ok(Some(bytes)) => match DocumentCodec::decode_document(&bytes) {
                Ok(document) => ReadOutcome::Loaded(document),
                Err(e) => {
                    warn!(error = %e, "couldn't parse document; keeping cached copy");
                    ReadOutcome::Failed
                }
            },
            Ok(None) => ReadOutcome::Missing,
            Err(e) if e.is_permission_denied() => {
                self.disable_reads();
                ReadOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, "couldn't reload document; keeping cached copy");
                ReadOutcome::Failed
            }
        }
    }

    async fn write_document(&self, document: &Document) {
        if !self.is_writable() {
            debug!("writes disabled; change kept in memory only");
            return;
        }
        let bytes = match DocumentCodec::encode_document(document) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "couldn't encode document");
                return;
            }
        };
        match self.backend.write(&bytes).await {
            Ok(()) => {}
            Err(e) if e.is_permission_denied() => self.disable_writes(),
            Err(e) => warn!(error = %e, "couldn't save document"),
        }
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("location", &self.location())
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Exclusive handle on the cached document.
///
/// Dropping the session releases the lock.
pub struct Session<'a> {
    store: &'a DocumentStore,
    cache: MutexGuard<'a, Option<Document>>,
}

impl<'a> Session<'a> {
    /// The cached document, reading the backing file if nothing is cached.
    ///
    /// Returns `None` only when no document could ever be read.
    pub async fn load(&mut self) -> Option<&mut Document> {
        if self.cache.is_none() {
            self.reload().await;
        }
        self.cache.as_mut()
    }

    /// The cached document without touching the backend.
    pub fn document(&mut self) -> Option<&mut Document> {
        self.cache.as_mut()
    }

    /// Force a re-read of the backing file.
    ///
    /// A missing file only seeds an empty document when nothing is cached.
    pub async fn reload(&mut self) {
        match self.store.read_document().await {
            ReadOutcome::Loaded(document) => {
                debug!("document loaded from backend");
                *self.cache = Some(document);
            }
            ReadOutcome::Missing if self.cache.is_none() => {
                info!("no stored document; starting from an empty one");
                *self.cache = Some(Value::Object(Map::new()));
            }
            ReadOutcome::Missing | ReadOutcome::Failed => {}
        }
    }

    /// Swap in a new document without persisting it.
    pub fn replace(&mut self, document: Document) {
        *self.cache = Some(document);
    }

    /// Persist the cached document.
    pub async fn save(&mut self) {
        match self.cache.as_ref() {
            Some(document) => self.store.write_document(document).await,
            None => debug!("nothing cached; skipping save"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use crate::file::FileBackend;
    use crate::memory::MemoryBackend;

    fn store_with(bytes: &str) -> (DocumentStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::with_bytes(bytes));
        (DocumentStore::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn loads_once_and_caches() {
        let (store, backend) = store_with(r#"{"people": []}"#);
        assert_eq!(store.load().await, Some(json!({"people": []})));

        backend.set_bytes(r#"{"other": 1}"#);
        assert_eq!(store.load().await, Some(json!({"people": []})));
    }

    #[tokio::test]
    async fn reload_overwrites_cache() {
        let (store, backend) = store_with(r#"{"a": 1}"#);
        store.load().await;
        backend.set_bytes(r#"{"a": 2}"#);
        store.reload().await;
        assert_eq!(store.load().await, Some(json!({"a": 2})));
    }

    #[tokio::test]
    async fn missing_file_defaults_to_empty_object() {
        let store = DocumentStore::new(MemoryBackend::new());
        assert_eq!(store.load().await, Some(json!({})));
    }

    #[tokio::test]
    async fn missing_file_on_reload_keeps_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, r#"{"a": 1}"#).unwrap();
        let store = DocumentStore::new(FileBackend::new(&path));
        store.load().await;
        std::fs::remove_file(&path).unwrap();
        store.reload().await;
        assert_eq!(store.load().await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn parse_failure_keeps_previous_cache() {
        let (store, backend) = store_with(r#"{"a": 1}"#);
        store.load().await;
        backend.set_bytes("{broken");
        store.reload().await;
        assert_eq!(store.load().await, Some(json!({"a": 1})));
        assert!(store.is_readable());
    }

    #[tokio::test]
    async fn parse_failure_with_empty_cache_yields_nothing() {
        let (store, _backend) = store_with("{broken");
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn read_permission_failure_disables_reads() {
        let (store, backend) = store_with(r#"{"a": 1}"#);
        backend.fail_reads(Some(io::ErrorKind::PermissionDenied));
        assert_eq!(store.load().await, None);
        assert!(!store.is_readable());

        backend.fail_reads(None);
        store.reload().await;
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn other_read_failure_is_transient() {
        let (store, backend) = store_with(r#"{"a": 1}"#);
        backend.fail_reads(Some(io::ErrorKind::Other));
        assert_eq!(store.load().await, None);
        assert!(store.is_readable());

        backend.fail_reads(None);
        assert_eq!(store.load().await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let doc = json!({"people": [{"id": 1, "name": "Ann"}]});

        let store = DocumentStore::new(FileBackend::new(&path));
        store.save(doc.clone()).await;
        assert_eq!(store.load().await, Some(doc.clone()));

        let fresh = DocumentStore::new(FileBackend::new(&path));
        assert_eq!(fresh.load().await, Some(doc));
    }

    #[tokio::test]
    async fn write_permission_failure_keeps_memory_copy() {
        let (store, backend) = store_with("{}");
        backend.fail_writes(Some(io::ErrorKind::PermissionDenied));
        store.save(json!({"x": 1})).await;
        assert!(!store.is_writable());
        assert_eq!(store.load().await, Some(json!({"x": 1})));

        backend.fail_writes(None);
        store.save(json!({"x": 2})).await;
        assert_eq!(backend.write_count(), 0);
        assert_eq!(backend.bytes(), Some(b"{}".to_vec()));
        assert_eq!(store.load().await, Some(json!({"x": 2})));
    }

    #[tokio::test]
    async fn other_write_failure_is_transient() {
        let (store, backend) = store_with("{}");
        backend.fail_writes(Some(io::ErrorKind::Other));
        store.save(json!({"x": 1})).await;
        assert!(store.is_writable());
        assert_eq!(store.load().await, Some(json!({"x": 1})));

        backend.fail_writes(None);
        store.save(json!({"x": 2})).await;
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn flags_are_per_instance() {
        let (denied, backend) = store_with("{}");
        backend.fail_reads(Some(io::ErrorKind::PermissionDenied));
        denied.load().await;
        assert!(!denied.is_readable());

        let (other, _) = store_with("{}");
        assert!(other.is_readable());
        assert_eq!(other.load().await, Some(json!({})));
    }

    #[tokio::test]
    async fn session_mutations_are_saved() {
        let (store, backend) = store_with(r#"{"people": []}"#);
        {
            let mut session = store.session().await;
            let doc = session.load().await.unwrap();
            doc["people"].as_array_mut().unwrap().push(json!({"id": 1}));
            session.save().await;
        }
        let saved = crate::DocumentCodec::decode_document(&backend.bytes().unwrap()).unwrap();
        assert_eq!(saved, json!({"people": [{"id": 1}]}));
    }

    #[tokio::test]
    async fn reload_waits_for_open_session() {
        let backend = Arc::new(MemoryBackend::with_bytes(r#"{"v": 1}"#));
        let store = Arc::new(DocumentStore::new(backend.clone()));

        let mut session = store.session().await;
        session.load().await;
        backend.set_bytes(r#"{"v": 2}"#);

        let mut reloading = {
            let store = store.clone();
            tokio::spawn(async move { store.reload().await })
        };
        let blocked = tokio::time::timeout(Duration::from_millis(100), &mut reloading).await;
        assert!(blocked.is_err(), "reload ran while a session was open");

        session.document().unwrap()["v"] = json!(3);
        session.save().await;
        assert_eq!(session.document().cloned(), Some(json!({"v": 3})));
        drop(session);

        reloading.await.unwrap();
        assert_eq!(store.load().await, Some(json!({"v": 3})));
    }
}
