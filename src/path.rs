// Author: Dustin Pilgrim
// License: MIT

use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::command::PathSegment;
use crate::error::CmdError;
use crate::search;
use crate::utils::type_name;

/// Final step of a resolved path, relative to its parent container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Key(String),
    Index(usize),
}

/// Parent container of a resolved path plus the slot the path ends at. The slot's
/// kind always matches the parent (a key into a table, an index into an array).
#[derive(Debug)]
pub struct Location<'a> {
    pub parent: &'a mut Value,
    pub slot: Slot,
}

/// Walk `scope` followed by `path` from the document root.
///
/// A null root becomes an empty table. With `create`, missing intermediate
/// containers are inserted with the kind implied by the segment that follows them;
/// without it they are reported as missing elements. Search segments never create.
pub fn navigate<'a>(
    root: &'a mut Value,
    scope: &[String],
    path: &[PathSegment<'_>],
    create: bool,
) -> Result<Location<'a>, CmdError> {
    let mut segments = Vec::with_capacity(scope.len() + path.len());
    for key in scope {
        segments.push(PathSegment::Key(key.as_str()));
    }
    for segment in path {
        segments.push(segment.clone());
    }

    let Some((last, _)) = segments.split_last() else {
        return Err(CmdError::syntax(107, "path-resolve: command path is empty"));
    };

    if root.is_null() {
        *root = Value::Object(Map::new());
    }

    let mut current = root;
    for pair in segments.windows(2) {
        current = descend(current, &pair[0], &pair[1], create)?;
    }

    let slot = final_slot(current, last)?;
    Ok(Location { parent: current, slot })
}

fn descend<'v>(
    container: &'v mut Value,
    segment: &PathSegment<'_>,
    next: &PathSegment<'_>,
    create: bool,
) -> Result<&'v mut Value, CmdError> {
    match segment {
        PathSegment::Key(key) => {
            let table = as_table(container, key)?;
            match table.entry(*key) {
                Entry::Occupied(entry) => Ok(entry.into_mut()),
                Entry::Vacant(entry) => {
                    if !create {
                        return Err(missing(segment));
                    }
                    Ok(entry.insert(empty_container_for(next)?))
                }
            }
        }
        PathSegment::Index(index) => {
            let index = *index;
            let array = as_array(container, index)?;
            if index >= array.len() {
                if !create {
                    return Err(missing(segment));
                }
                let fresh = empty_container_for(next)?;
                pad_to(array, index)?;
                array.push(fresh);
            }
            Ok(&mut array[index])
        }
        PathSegment::Search { key, value } => {
            let index = search::find_index(container, key, value)?;
            container
                .get_mut(index)
                .ok_or_else(|| CmdError::search(224, format!("array search result {} is out of range", index)))
        }
    }
}

fn final_slot(parent: &mut Value, last: &PathSegment<'_>) -> Result<Slot, CmdError> {
    match last {
        PathSegment::Key(key) => {
            as_table(parent, key)?;
            Ok(Slot::Key((*key).to_string()))
        }
        PathSegment::Index(index) => {
            as_array(parent, *index)?;
            Ok(Slot::Index(*index))
        }
        PathSegment::Search { key, value } => Ok(Slot::Index(search::find_index(parent, key, value)?)),
    }
}

fn as_table<'v>(container: &'v mut Value, key: &str) -> Result<&'v mut Map<String, Value>, CmdError> {
    match container {
        Value::Object(table) => Ok(table),
        Value::Array(_) => Err(CmdError::path(
            201,
            format!("path-resolve: key '{}' specified but container is an array, not a table", key),
        )),
        other => Err(CmdError::path(
            203,
            format!(
                "path-resolve: key '{}' specified but container is a {} value, not a table",
                key,
                type_name(other)
            ),
        )),
    }
}

fn as_array(container: &mut Value, index: usize) -> Result<&mut Vec<Value>, CmdError> {
    match container {
        Value::Array(array) => Ok(array),
        Value::Object(_) => Err(CmdError::path(
            202,
            format!("path-resolve: index '{}' specified but container is a table, not an array", index),
        )),
        other => Err(CmdError::path(
            203,
            format!(
                "path-resolve: index '{}' specified but container is a {} value, not an array",
                index,
                type_name(other)
            ),
        )),
    }
}

fn empty_container_for(next: &PathSegment<'_>) -> Result<Value, CmdError> {
    match next {
        PathSegment::Key(_) => Ok(Value::Object(Map::new())),
        PathSegment::Index(_) => Ok(Value::Array(Vec::new())),
        PathSegment::Search { .. } => Err(CmdError::search(
            222,
            "path-resolve: attempting to perform array search on an element that does not exist",
        )),
    }
}

/// Fill `array` with nulls up to `index`, with room reserved for one more element.
fn pad_to(array: &mut Vec<Value>, index: usize) -> Result<(), CmdError> {
    let additional = index.saturating_add(1).saturating_sub(array.len());
    array.try_reserve(additional).map_err(|e| {
        CmdError::path(213, format!("cannot grow array to element {}: {}", index, e))
            .with_hint("Array indices past the end are padded with nulls; use a smaller index")
    })?;
    array.resize(index, Value::Null);
    Ok(())
}

fn missing(segment: &PathSegment<'_>) -> CmdError {
    CmdError::erase(231, format!("element {} along the path does not exist", segment))
}

impl Location<'_> {
    /// Overwrite the slot. Indices past the end pad the array with nulls.
    pub fn replace(self, value: Value) -> Result<(), CmdError> {
        match (self.parent, self.slot) {
            (Value::Object(table), Slot::Key(key)) => {
                table.insert(key, value);
                Ok(())
            }
            (Value::Array(array), Slot::Index(index)) => {
                if index >= array.len() {
                    pad_to(array, index)?;
                    array.push(value);
                } else {
                    array[index] = value;
                }
                Ok(())
            }
            (parent, slot) => Err(mismatch(parent, &slot)),
        }
    }

    /// Push onto the array in the slot, creating the array if the slot is empty.
    pub fn append_into(self, value: Value) -> Result<(), CmdError> {
        match (self.parent, self.slot) {
            (Value::Object(table), Slot::Key(key)) => match table.get_mut(&key) {
                Some(Value::Array(existing)) => {
                    existing.push(value);
                    Ok(())
                }
                Some(other) => Err(CmdError::path(
                    205,
                    format!("$append target at key '{}' exists but it is a {}, not an array", key, type_name(other)),
                )),
                None => {
                    table.insert(key, Value::Array(vec![value]));
                    Ok(())
                }
            },
            (Value::Array(array), Slot::Index(index)) => match array.get_mut(index) {
                Some(Value::Array(existing)) => {
                    existing.push(value);
                    Ok(())
                }
                Some(other) => Err(CmdError::path(
                    205,
                    format!(
                        "$append target at element '{}' exists but it is a {}, not an array",
                        index,
                        type_name(other)
                    ),
                )),
                None => {
                    pad_to(array, index)?;
                    array.push(Value::Array(vec![value]));
                    Ok(())
                }
            },
            (parent, slot) => Err(mismatch(parent, &slot)),
        }
    }

    /// Remove the slot and return what was there. Later array elements shift down;
    /// the remaining keys of a table keep their order.
    pub fn remove(self) -> Result<Value, CmdError> {
        match (self.parent, self.slot) {
            (Value::Object(table), Slot::Key(key)) => table.shift_remove(&key).ok_or_else(|| {
                CmdError::erase(
                    230,
                    format!("$erase operation at key '{}' failed, key not defined in table", key),
                )
            }),
            (Value::Array(array), Slot::Index(index)) => {
                if index < array.len() {
                    Ok(array.remove(index))
                } else {
                    Err(CmdError::erase(
                        232,
                        format!(
                            "$erase operation at element '{}' failed, array only has {} element(s)",
                            index,
                            array.len()
                        ),
                    ))
                }
            }
            (parent, slot) => Err(mismatch(parent, &slot)),
        }
    }
}

fn mismatch(parent: &Value, slot: &Slot) -> CmdError {
    CmdError::path(
        204,
        format!("slot {:?} does not fit a {} container", slot, type_name(parent)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> PathSegment<'_> {
        PathSegment::Key(k)
    }

    #[test]
    fn test_creates_containers_from_next_segment() {
        let mut doc = Value::Null;
        let path = [key("a"), PathSegment::Index(1), key("b")];
        navigate(&mut doc, &[], &path, true)
            .unwrap()
            .replace(json!(true))
            .unwrap();
        assert_eq!(doc, json!({"a": [null, {"b": true}]}));
    }

    #[test]
    fn test_scope_prefixes_path() {
        let mut doc = json!({"obj": {}});
        let scope = vec!["obj".to_string()];
        navigate(&mut doc, &scope, &[key("x")], true)
            .unwrap()
            .replace(json!(1))
            .unwrap();
        assert_eq!(doc, json!({"obj": {"x": 1}}));
    }

    #[test]
    fn test_kind_mismatch() {
        let mut doc = json!({"a": ["x"]});
        let err = navigate(&mut doc, &[], &[key("a"), key("b")], true).unwrap_err();
        assert_eq!(err.code(), Some(201));

        let mut doc = json!({"a": {"b": "x"}});
        let err = navigate(&mut doc, &[], &[key("a"), PathSegment::Index(0)], true).unwrap_err();
        assert_eq!(err.code(), Some(202));
    }

    #[test]
    fn test_scalar_blocks_navigation() {
        let mut doc = json!({"a": {"b": "x"}});
        let path = [key("a"), key("b"), key("c"), key("d")];
        let err = navigate(&mut doc, &[], &path, true).unwrap_err();
        assert_eq!(err.code(), Some(203));
        assert_eq!(doc, json!({"a": {"b": "x"}}));
    }

    #[test]
    fn test_without_create_reports_missing() {
        let mut doc = json!({});
        let err = navigate(&mut doc, &[], &[key("a"), key("b")], false).unwrap_err();
        assert!(matches!(err, CmdError::EraseError { code: Some(231), .. }));
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_search_never_creates() {
        let mut doc = json!({});
        let needle = json!(1);
        let path = [key("c"), PathSegment::Search { key: "id", value: &needle }, key("v")];
        let err = navigate(&mut doc, &[], &path, true).unwrap_err();
        assert_eq!(err.code(), Some(222));
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_search_as_final_segment() {
        let mut doc = json!({"c": [{"id": 1}, {"id": 2}]});
        let needle = json!(2);
        let path = [key("c"), PathSegment::Search { key: "id", value: &needle }];
        let removed = navigate(&mut doc, &[], &path, false).unwrap().remove().unwrap();
        assert_eq!(removed, json!({"id": 2}));
        assert_eq!(doc, json!({"c": [{"id": 1}]}));
    }

    #[test]
    fn test_append_into_existing_and_missing() {
        let mut doc = json!({"a": [1]});
        navigate(&mut doc, &[], &[key("a")], true).unwrap().append_into(json!(2)).unwrap();
        navigate(&mut doc, &[], &[key("b")], true).unwrap().append_into(json!(3)).unwrap();
        assert_eq!(doc, json!({"a": [1, 2], "b": [3]}));

        let err = navigate(&mut doc, &[], &[key("a"), PathSegment::Index(0)], true)
            .unwrap()
            .append_into(json!(4))
            .unwrap_err();
        assert_eq!(err.code(), Some(205));
    }

    #[test]
    fn test_remove_keeps_key_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3});
        navigate(&mut doc, &[], &[key("a")], false).unwrap().remove().unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut doc = json!({"a": ["b"]});
        let err = navigate(&mut doc, &[], &[key("a"), PathSegment::Index(2)], false)
            .unwrap()
            .remove()
            .unwrap_err();
        assert_eq!(err.code(), Some(232));
    }

    #[test]
    fn test_padding_that_cannot_fit_is_an_error() {
        let mut array = vec![json!(1)];
        let err = pad_to(&mut array, usize::MAX).unwrap_err();
        assert_eq!(err.code(), Some(213));
        assert_eq!(array, vec![json!(1)]);

        pad_to(&mut array, 3).unwrap();
        assert_eq!(array, vec![json!(1), json!(null), json!(null)]);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let mut doc = Value::Null;
        let err = navigate(&mut doc, &[], &[], true).unwrap_err();
        assert_eq!(err.code(), Some(107));
    }
}
