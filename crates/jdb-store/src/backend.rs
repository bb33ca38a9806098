use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Byte-level storage behind a [`DocumentStore`](crate::DocumentStore).
///
/// A backend holds exactly one document image. It never interprets the
/// bytes; encoding is the store's job.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the stored bytes.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    async fn read(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replace the stored bytes.
    async fn write(&self, bytes: &[u8]) -> StoreResult<()>;

    /// Filesystem location to watch for external changes, if any.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// A shared backend, so callers can keep a handle after the store owns it.
#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        (**self).read().await
    }

    async fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        (**self).write(bytes).await
    }

    fn location(&self) -> Option<&Path> {
        (**self).location()
    }
}
