//! Required-field checks run on raw request bodies before any typed parsing.

use serde_json::{Map, Value};

/// Returns the first field of `required` that `body` lacks, in list order.
///
/// Presence is all that is checked: a field set to `null` counts as present
/// and is left to typed deserialization to reject.
pub fn missing_field<'a>(body: &Map<String, Value>, required: &[&'a str]) -> Option<&'a str> {
    required
        .iter()
        .copied()
        .find(|field| !body.contains_key(*field))
}

/// Message for a request that lacks `field`.
pub fn missing_field_message(field: &str) -> String {
    format!("Missing `{field}` in request body")
}
