use std::io;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::backend::Backend;
use crate::error::StoreResult;

#[derive(Default)]
struct MemoryState {
    bytes: Option<Vec<u8>>,
    read_failure: Option<io::ErrorKind>,
    write_failure: Option<io::ErrorKind>,
    writes: usize,
}

/// In-memory backend.
///
/// Intended for tests and embedding. Read and write failures can be injected
/// to exercise the store's degradation paths.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    /// Create an empty backend (reads return `None`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend already holding `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let backend = Self::new();
        backend.set_bytes(bytes);
        backend
    }

    /// Overwrite the stored bytes as an external writer would.
    pub fn set_bytes(&self, bytes: impl Into<Vec<u8>>) {
        self.state.write().expect("lock poisoned").bytes = Some(bytes.into());
    }

    /// Current stored bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.state.read().expect("lock poisoned").bytes.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.read().expect("lock poisoned").writes
    }

    /// Make every subsequent read fail with `kind` (`None` to clear).
    pub fn fail_reads(&self, kind: Option<io::ErrorKind>) {
        self.state.write().expect("lock poisoned").read_failure = kind;
    }

    /// Make every subsequent write fail with `kind` (`None` to clear).
    pub fn fail_writes(&self, kind: Option<io::ErrorKind>) {
        self.state.write().expect("lock poisoned").write_failure = kind;
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        let state = self.state.read().expect("lock poisoned");
        if let Some(kind) = state.read_failure {
            return Err(io::Error::from(kind).into());
        }
        Ok(state.bytes.clone())
    }

    async fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        if let Some(kind) = state.write_failure {
            return Err(io::Error::from(kind).into());
        }
        state.bytes = Some(bytes.to_vec());
        state.writes += 1;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("lock poisoned");
        f.debug_struct("MemoryBackend")
            .field("len", &state.bytes.as_ref().map(Vec::len))
            .field("writes", &state.writes)
            .finish()
    }
}
