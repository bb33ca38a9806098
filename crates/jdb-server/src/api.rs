//! Verb handlers over the document tree.
//!
//! Each handler works on the currently loaded document and reports whether
//! it changed it; [`handle`] runs one inside a store session and persists
//! only changed documents.

use std::collections::HashSet;
use std::fmt;

use jdb_store::DocumentStore;
use jdb_tree::{
    field_by_name_mut, id_is_missing, numeric_id, replace_record_by_id, resolve, resolve_mut,
    DocPath, Edit, ID_FIELD,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Request verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Other,
}

impl Verb {
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PATCH" => Self::Patch,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// What the transport should send back.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Success carrying the affected node.
    Ok(Value),
    /// Success without a payload.
    OkEmpty,
    /// Successful delete.
    NoContent,
    NotFound,
}

/// A reply plus whether the document must be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub reply: Reply,
    pub changed: bool,
}

impl Outcome {
    fn unchanged(reply: Reply) -> Self {
        Self { reply, changed: false }
    }

    fn changed(reply: Reply) -> Self {
        Self { reply, changed: true }
    }

    fn not_found() -> Self {
        Self::unchanged(Reply::NotFound)
    }
}

/// Run one request against the store.
pub async fn handle(store: &DocumentStore, verb: Verb, path: &DocPath, body: Option<Value>) -> Reply {
    if verb == Verb::Other {
        return Reply::NotFound;
    }
    let mut session = store.session().await;
    let document = session.load().await;
    let outcome = apply(document, verb, path, body);
    if outcome.changed {
        session.save().await;
    }
    debug!(%verb, %path, reply = ?outcome.reply, changed = outcome.changed, "request handled");
    outcome.reply
}

/// Dispatch `verb` to its handler.
pub fn apply(document: Option<&mut Value>, verb: Verb, path: &DocPath, body: Option<Value>) -> Outcome {
    match verb {
        Verb::Get => Outcome::unchanged(get(document.map(|d| &*d), path)),
        Verb::Post => create(document, path, body),
        Verb::Patch => update(document, path, body),
        Verb::Put => replace(document, path, body),
        Verb::Delete => delete(document, path),
        Verb::Other => Outcome::not_found(),
    }
}

/// Read the node at `path`. The root itself is answered without a payload.
pub fn get(document: Option<&Value>, path: &DocPath) -> Reply {
    if path.is_empty() {
        return Reply::OkEmpty;
    }
    match document.and_then(|doc| resolve(doc, path)) {
        Some(node) => Reply::Ok(node.clone()),
        None => Reply::NotFound,
    }
}

/// Append `body` as a new record to the collection at `path`.
///
/// A record without a usable id gets one from [`next_id`].
pub fn create(document: Option<&mut Value>, path: &DocPath, body: Option<Value>) -> Outcome {
    let Some(doc) = document else {
        return Outcome::not_found();
    };
    let Some(Value::Array(records)) = resolve_mut(doc, path) else {
        return Outcome::not_found();
    };
    let mut record = into_record(body);
    if id_is_missing(record.get(ID_FIELD)) {
        record.insert(ID_FIELD.to_string(), next_id(records));
    }
    let record = Value::Object(record);
    records.push(record.clone());
    Outcome::changed(Reply::Ok(record))
}

/// Merge `body` into the record at `path`; fields in `body` win.
pub fn update(document: Option<&mut Value>, path: &DocPath, body: Option<Value>) -> Outcome {
    let incoming = into_record(body);
    edit_record(document, path, |previous| match previous {
        Some(Value::Object(stored)) => {
            let mut merged = incoming;
            for (key, value) in stored {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
            Edit::Replace(Value::Object(merged))
        }
        _ => Edit::Keep,
    })
}

/// Replace the record at `path` with `body`, keeping its id if `body` has none.
pub fn replace(document: Option<&mut Value>, path: &DocPath, body: Option<Value>) -> Outcome {
    let mut incoming = into_record(body);
    edit_record(document, path, |previous| match previous {
        Some(stored) => {
            if id_is_missing(incoming.get(ID_FIELD)) {
                if let Some(id) = stored.get(ID_FIELD) {
                    incoming.insert(ID_FIELD.to_string(), id.clone());
                }
            }
            Edit::Replace(Value::Object(incoming))
        }
        None => Edit::Keep,
    })
}

/// Remove the record at `path` from its collection.
///
/// Succeeds whenever the collection exists, whether or not the record did.
pub fn delete(document: Option<&mut Value>, path: &DocPath) -> Outcome {
    let Some(doc) = document else {
        return Outcome::not_found();
    };
    if path.len() < 2 {
        return Outcome::not_found();
    }
    let collection_index = path.len() - 2;
    let name = &path.segments()[collection_index];
    let id = &path.segments()[collection_index + 1];

    let Some(grandparent) = resolve_mut(doc, &path.prefix(collection_index)) else {
        return Outcome::not_found();
    };
    let collection = match field_by_name_mut(grandparent, name) {
        None | Some(Value::Null) => return Outcome::not_found(),
        Some(collection) => collection,
    };

    let mut removed = false;
    replace_record_by_id(collection, id, |previous| {
        removed = previous.is_some();
        Edit::Remove
    });
    Outcome {
        reply: Reply::NoContent,
        changed: removed,
    }
}

/// Shared shape of PATCH and PUT: edit the record named by the last segment
/// inside the collection named by the rest of the path.
fn edit_record<F>(document: Option<&mut Value>, path: &DocPath, edit: F) -> Outcome
where
    F: FnOnce(Option<&Value>) -> Edit,
{
    let Some(doc) = document else {
        return Outcome::not_found();
    };
    let Some((parent, id)) = path.split_last() else {
        return Outcome::not_found();
    };
    let Some(collection) = resolve_mut(doc, &parent) else {
        return Outcome::not_found();
    };
    match replace_record_by_id(collection, id, edit) {
        Some(stored) => Outcome::changed(Reply::Ok(stored.clone())),
        None => Outcome::not_found(),
    }
}

/// Object bodies become records; anything else counts as no body.
fn into_record(body: Option<Value>) -> Map<String, Value> {
    match body {
        Some(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

/// One past the largest integer id, `1` for a collection without any.
///
/// When the largest id is `i64::MAX` the smallest unused positive id is
/// taken instead.
fn next_id(records: &[Value]) -> Value {
    let taken: HashSet<i64> = records
        .iter()
        .filter_map(|record| record.get(ID_FIELD))
        .filter_map(numeric_id)
        .collect();
    let next = match taken.iter().max() {
        None => 1,
        Some(max) => max
            .checked_add(1)
            .unwrap_or_else(|| (1..).find(|id| !taken.contains(id)).unwrap_or(1)),
    };
    Value::from(next)
}
