use std::io;

/// Errors from document storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be parsed as a document.
    #[error("parse error: {0}")]
    Parse(String),

    /// The document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file watcher could not be started.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl StoreError {
    /// Returns `true` for failures caused by missing permissions.
    ///
    /// These disable the affected capability for the life of the store.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            Self::Watch(e) => match &e.kind {
                notify::ErrorKind::Io(err) => err.kind() == io::ErrorKind::PermissionDenied,
                _ => false,
            },
            _ => false,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_classification() {
        let denied = StoreError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(denied.is_permission_denied());
        let missing = StoreError::Io(io::Error::from(io::ErrorKind::NotFound));
        assert!(!missing.is_permission_denied());
        assert!(!StoreError::Parse("x".into()).is_permission_denied());
        let watch = StoreError::Watch(notify::Error::io(io::Error::from(
            io::ErrorKind::PermissionDenied,
        )));
        assert!(watch.is_permission_denied());
    }
}
