use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// A language-neutral value tree carried from the embedded view to native
/// handlers. Built fresh per inbound message and discarded once the handler
/// returns.
///
/// Numbers are kept as their canonical decimal text rather than a binary
/// encoding, so consumers parse exactly what the script side produced.
/// Map keys are unique and keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Null,
    Bool(bool),
    Number(String),
    Text(String),
    List(Vec<ScriptValue>),
    Map(IndexMap<String, ScriptValue>),
}

impl ScriptValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(text) => text.parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScriptValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScriptValue]> {
        match self {
            ScriptValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ScriptValue>> {
        match self {
            ScriptValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Map field access; `None` for non-maps and missing keys.
    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.as_map().and_then(|entries| entries.get(key))
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            ScriptValue::Null => JsonValue::Null,
            ScriptValue::Bool(value) => JsonValue::Bool(*value),
            ScriptValue::Number(text) => serde_json::from_str::<serde_json::Number>(text)
                .map(JsonValue::Number)
                .unwrap_or_else(|_| JsonValue::String(text.clone())),
            ScriptValue::Text(text) => JsonValue::String(text.clone()),
            ScriptValue::List(items) => {
                JsonValue::Array(items.iter().map(ScriptValue::to_json).collect())
            }
            ScriptValue::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::to_script_value;

    fn sample_tree() -> ScriptValue {
        let mut entries = IndexMap::new();
        entries.insert("name".to_string(), ScriptValue::Text("print".into()));
        entries.insert(
            "content".to_string(),
            ScriptValue::List(vec![
                ScriptValue::Text("hello".into()),
                ScriptValue::Number("1.5".into()),
                ScriptValue::Bool(true),
                ScriptValue::Null,
            ]),
        );
        ScriptValue::Map(entries)
    }

    #[test]
    fn json_round_trip_is_identity() {
        let tree = sample_tree();
        let text = tree.to_json().to_string();
        let parsed: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(to_script_value(&parsed), tree);
    }

    #[test]
    fn maps_preserve_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("zebra".to_string(), ScriptValue::Null);
        entries.insert("apple".to_string(), ScriptValue::Null);
        let keys: Vec<_> = match ScriptValue::Map(entries) {
            ScriptValue::Map(map) => map.keys().cloned().collect(),
            _ => unreachable!(),
        };
        assert_eq!(keys, ["zebra", "apple"]);
    }

    #[test]
    fn accessors_match_variants() {
        let tree = sample_tree();
        assert_eq!(tree.get("name").and_then(ScriptValue::as_text), Some("print"));
        let content = tree.get("content").and_then(ScriptValue::as_list).unwrap();
        assert_eq!(content.len(), 4);
        assert_eq!(content[1].as_f64(), Some(1.5));
        assert_eq!(content[2].as_bool(), Some(true));
        assert!(tree.get("missing").is_none());
        assert!(ScriptValue::Null.get("name").is_none());
    }

    #[test]
    fn non_numeric_number_text_serializes_as_string() {
        let value = ScriptValue::Number("not-a-number".into());
        assert_eq!(value.to_json(), JsonValue::String("not-a-number".into()));
    }
}
