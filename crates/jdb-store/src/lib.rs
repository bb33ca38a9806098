//! Document storage for jdb.
//!
//! A [`DocumentStore`] owns the single in-memory copy of the document and
//! keeps it in step with one backing file:
//!
//! - the file is read on first access and after every external change,
//! - every successful mutation writes the whole document back,
//! - permission failures degrade the store to read-only or memory-only
//!   operation instead of failing requests.
//!
//! # Backends
//!
//! All backends implement the [`Backend`] trait:
//!
//! - [`FileBackend`] -- the document file on disk
//! - [`MemoryBackend`] -- in-memory bytes for tests and embedding
//!
//! # Change detection
//!
//! [`FileWatcher`] feeds filesystem events to [`spawn_reloader`], which
//! reloads the cache under the same lock requests use.

pub mod backend;
pub mod codec;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod watch;

pub use backend::Backend;
pub use codec::DocumentCodec;
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::{DocumentStore, Session};
pub use watch::{spawn_reloader, ChangeSignal, FileWatcher};
