//! Path resolution over a document.

use serde_json::Value;

use crate::edit::{field_by_name, field_by_name_mut, record_by_id, record_by_id_mut};
use crate::path::{DocPath, Step};

/// Resolve `path` against `root`.
///
/// The empty path returns `root` itself. Once a step misses, the rest of the
/// path is skipped and the result is `None`.
pub fn resolve<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    path.steps().try_fold(root, |node, step| match step {
        Step::Field(name) => field_by_name(node, name),
        Step::Record(id) => record_by_id(node, id),
    })
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Value, path: &DocPath) -> Option<&'a mut Value> {
    path.steps().try_fold(root, |node, step| match step {
        Step::Field(name) => field_by_name_mut(node, name),
        Step::Record(id) => record_by_id_mut(node, id),
    })
}
