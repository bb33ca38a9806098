//! Path-addressed document tree for jdb.
//!
//! A document is a JSON tree of objects, collections (arrays of records)
//! and scalars. An address such as `/people/1/addresses/2` alternates
//! between collection names and record ids:
//!
//! - even segments name a field on the current object,
//! - odd segments select a record by its `id` inside the current collection.
//!
//! # Layers
//!
//! - [`DocPath`] / [`Step`] -- decoded address and its per-segment meaning
//! - [`id_matches`] -- loose identity between a stored id and a segment
//! - [`Edit`] and the `*_by_*` accessors -- the shared read/write substrate
//! - [`resolve`] / [`resolve_mut`] -- the navigator folding a path over it
//!
//! Every lookup that fails because a node is missing or has the wrong shape
//! yields `None`; nothing in this crate panics on document content.

pub mod edit;
pub mod error;
pub mod id;
pub mod navigator;
pub mod path;

pub use edit::{
    field_by_name, field_by_name_mut, record_by_id, record_by_id_mut, replace_field_by_name,
    replace_record_by_id, Edit,
};
pub use error::{TreeError, TreeResult};
pub use id::{id_is_missing, id_matches, numeric_id, record_has_id, ID_FIELD};
pub use navigator::{resolve, resolve_mut};
pub use path::{DocPath, Step};

/// The document type handled by every jdb crate.
pub type Document = serde_json::Value;
