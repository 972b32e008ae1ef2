use serde_json::Value;

use crate::error::CmdError;
use crate::utils::{preview, type_name, values_equal};

/// Index of the first table in `container` whose `key` field equals `value`.
///
/// Elements that are not tables, or lack the field, never match. Running out of
/// elements is an error rather than a no-op.
pub fn find_index(container: &Value, key: &str, value: &Value) -> Result<usize, CmdError> {
    let elements = container.as_array().ok_or_else(|| {
        CmdError::search(
            223,
            format!(
                "attempting to perform array search on a {} element, not an array",
                type_name(container)
            ),
        )
    })?;

    elements
        .iter()
        .position(|element| {
            element
                .as_object()
                .and_then(|table| table.get(key))
                .is_some_and(|field| values_equal(field, value))
        })
        .ok_or_else(|| {
            CmdError::search(
                224,
                format!(
                    "array search on property '{}' failed, could not find an element with value '{}'",
                    key,
                    preview(value)
                ),
            )
        })
}
