//! Conversion of boundary values delivered by the embedded view into
//! [`ScriptValue`] trees.
//!
//! The view's message channel carries JSON. Types plain JSON cannot express
//! are tagged by the channel bootstrap script (see `shell::bootstrap_script`)
//! with single-key marker objects, which this module resolves before the
//! generic mapping case. A marker key inside a larger mapping is ordinary
//! page data, not a marker.

use serde_json::Value as JsonValue;

use crate::value::ScriptValue;

/// Dates are not carried as real timestamps; the whole tree collapses to this
/// sentinel. The embedding application does not depend on date semantics.
pub const DATE_SENTINEL: &str = "DATE";

/// Marker key the bootstrap script attaches to `Date` payloads.
pub const DATE_MARKER: &str = "__lg_date";

/// Marker key the bootstrap script attaches to payloads of types the
/// converter was never taught to handle (functions, symbols, undefined).
pub const UNSUPPORTED_MARKER: &str = "__lg_unsupported";

/// Converts a boundary value into a [`ScriptValue`], total over the accepted
/// type set. Checked in fixed priority order: number before date before
/// string before list before mapping.
///
/// # Panics
///
/// Panics on an unsupported-type marker. That is a converter gap, not user
/// input, and must surface as a hard failure rather than be swallowed.
pub fn to_script_value(raw: &JsonValue) -> ScriptValue {
    match raw {
        JsonValue::Null => ScriptValue::Null,
        JsonValue::Bool(value) => ScriptValue::Bool(*value),
        JsonValue::Number(number) => ScriptValue::Number(number.to_string()),
        JsonValue::Object(entries) if entries.len() == 1 && entries.contains_key(DATE_MARKER) => {
            ScriptValue::Text(DATE_SENTINEL.to_string())
        }
        JsonValue::Object(entries)
            if entries.len() == 1 && entries.contains_key(UNSUPPORTED_MARKER) =>
        {
            let kind = entries
                .get(UNSUPPORTED_MARKER)
                .and_then(JsonValue::as_str)
                .unwrap_or("unknown");
            panic!("script value of unsupported type {kind:?} reached the converter");
        }
        JsonValue::String(text) => ScriptValue::Text(text.clone()),
        JsonValue::Array(items) => ScriptValue::List(items.iter().map(to_script_value).collect()),
        JsonValue::Object(entries) => ScriptValue::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), to_script_value(value)))
                .collect(),
        ),
    }
}
