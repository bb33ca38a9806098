//! Record and field accessors shared by reads and writes.
//!
//! Each accessor addresses one child of a container: a record by id inside a
//! collection, or a field by name inside an object. The editors take a
//! closure that sees the current child (if any) and returns an [`Edit`]; the
//! mutable getters are the editors called with [`Edit::Keep`], so a read and
//! a write through the same key always land on the same slot.
//!
//! A container of the wrong shape yields `None` and the closure is never run.

use serde_json::{Map, Value};

use crate::id::record_has_id;

/// What an editor should do with the addressed slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    /// Leave the slot untouched.
    Keep,
    /// Store this value in the slot, creating it if needed.
    Replace(Value),
    /// Remove the slot from its container.
    Remove,
}

fn records(collection: &Value) -> Option<&Vec<Value>> {
    collection.as_array()
}

fn fields(object: &Value) -> Option<&Map<String, Value>> {
    object.as_object()
}

fn position_by_id(records: &[Value], id: &str) -> Option<usize> {
    records.iter().position(|record| record_has_id(record, id))
}

/// Find the first record in `collection` whose id loosely equals `id`.
pub fn record_by_id<'a>(collection: &'a Value, id: &str) -> Option<&'a Value> {
    let records = records(collection)?;
    position_by_id(records, id).map(|index| &records[index])
}

/// Mutable access to the record addressed by `id`.
pub fn record_by_id_mut<'a>(collection: &'a mut Value, id: &str) -> Option<&'a mut Value> {
    replace_record_by_id(collection, id, |_| Edit::Keep)
}

/// Look up a field on an object node. Arrays and scalars have no fields.
pub fn field_by_name<'a>(object: &'a Value, name: &str) -> Option<&'a Value> {
    fields(object)?.get(name)
}

/// Mutable access to the field addressed by `name`.
pub fn field_by_name_mut<'a>(object: &'a mut Value, name: &str) -> Option<&'a mut Value> {
    replace_field_by_name(object, name, |_| Edit::Keep)
}

/// Edit the record addressed by `id` inside `collection`.
///
/// `edit` receives the matching record, or `None` when no record matches.
/// `Replace` overwrites the match in place (or appends when there was no
/// match), `Remove` deletes the match and shifts later records down.
///
/// Returns the record now stored in the slot.
pub fn replace_record_by_id<'a, F>(
    collection: &'a mut Value,
    id: &str,
    edit: F,
) -> Option<&'a mut Value>
where
    F: FnOnce(Option<&Value>) -> Edit,
{
    let records = collection.as_array_mut()?;
    let index = position_by_id(records, id);
    match edit(index.map(|i| &records[i])) {
        Edit::Keep => match index {
            Some(i) => records.get_mut(i),
            None => None,
        },
        Edit::Replace(value) => match index {
            Some(i) => {
                records[i] = value;
                records.get_mut(i)
            }
            None => {
                records.push(value);
                records.last_mut()
            }
        },
        Edit::Remove => {
            if let Some(i) = index {
                records.remove(i);
            }
            None
        }
    }
}

/// Edit the field `name` of `object`.
///
/// `edit` receives the current field value, or `None` when it is unset.
/// Returns the value now stored under `name`.
pub fn replace_field_by_name<'a, F>(
    object: &'a mut Value,
    name: &str,
    edit: F,
) -> Option<&'a mut Value>
where
    F: FnOnce(Option<&Value>) -> Edit,
{
    let fields = object.as_object_mut()?;
    match edit(fields.get(name)) {
        Edit::Keep => fields.get_mut(name),
        Edit::Replace(value) => {
            fields.insert(name.to_string(), value);
            fields.get_mut(name)
        }
        Edit::Remove => {
            fields.remove(name);
            None
        }
    }
}
