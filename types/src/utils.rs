use crate::OptionValue;
use serde_json::Value as JsonValue;

const REFERENCE_KEY: &str = "$ref";

/// Convert an `OptionValue` to its JSON wire form.
///
/// References become `{"$ref": name}`; non-finite floats become `null`.
pub fn option_value_to_json(value: &OptionValue) -> JsonValue {
    match value {
        OptionValue::Null => JsonValue::Null,
        OptionValue::Bool(b) => JsonValue::Bool(*b),
        OptionValue::Integer(i) => JsonValue::Number((*i).into()),
        OptionValue::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(JsonValue::Null, JsonValue::Number),
        OptionValue::String(s) => JsonValue::String(s.clone()),
        OptionValue::Array(items) => {
            JsonValue::Array(items.iter().map(option_value_to_json).collect())
        }
        OptionValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), option_value_to_json(value)))
                .collect(),
        ),
        OptionValue::Reference(name) => {
            let mut map = serde_json::Map::new();
            map.insert(REFERENCE_KEY.to_string(), JsonValue::String(name.clone()));
            JsonValue::Object(map)
        }
    }
}

/// Convert a JSON value back into an `OptionValue`.
///
/// Numbers that fit an i64 stay integers, everything else numeric becomes a
/// float. An object whose only key is `$ref` with a string value is read back
/// as a reference.
pub fn json_to_option_value(value: JsonValue) -> OptionValue {
    match value {
        JsonValue::Null => OptionValue::Null,
        JsonValue::Bool(b) => OptionValue::Bool(b),
        JsonValue::Number(n) => n.as_i64().map_or_else(
            || n.as_f64().map_or(OptionValue::Null, OptionValue::Float),
            OptionValue::Integer,
        ),
        JsonValue::String(s) => OptionValue::String(s),
        JsonValue::Array(items) => OptionValue::Array(
            items.into_iter().map(json_to_option_value).collect(),
        ),
        JsonValue::Object(mut map) => {
            if map.len() == 1 {
                if let Some(JsonValue::String(name)) = map.remove(REFERENCE_KEY)
                {
                    return OptionValue::Reference(name);
                }
            }
            OptionValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, json_to_option_value(value)))
                    .collect(),
            )
        }
    }
}

/// Build the postback key for an internal field of a widget.
///
/// `feedback_key("slider1", "_Value")` is `"slider1__Value"`. A field name
/// without the leading underscore marker gets one.
pub fn feedback_key(widget_id: &str, internal_field: &str) -> String {
    if internal_field.starts_with('_') {
        format!("{widget_id}_{internal_field}")
    } else {
        format!("{widget_id}__{internal_field}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_reference_encoding() {
        let value = OptionValue::Reference("onSelect".to_string());
        let json = option_value_to_json(&value);
        assert_eq!(json, json!({ "$ref": "onSelect" }));
        assert_eq!(json_to_option_value(json), value);
    }

    #[test]
    fn test_object_with_extra_keys_is_not_reference() {
        let json = json!({ "$ref": "x", "other": 1 });
        let value = json_to_option_value(json);
        assert!(matches!(value, OptionValue::Object(ref m) if m.len() == 2));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(json_to_option_value(json!(5)), OptionValue::Integer(5));
        assert_eq!(json_to_option_value(json!(2.5)), OptionValue::Float(2.5));
        assert_eq!(
            option_value_to_json(&OptionValue::Float(f64::NAN)),
            JsonValue::Null
        );
    }

    #[test]
    fn test_nested_object() {
        let mut inner = BTreeMap::new();
        inner.insert("text".to_string(), OptionValue::from("OK"));
        let value = OptionValue::Array(vec![OptionValue::Object(inner)]);

        assert_eq!(option_value_to_json(&value), json!([{ "text": "OK" }]));
    }

    #[test]
    fn test_feedback_key() {
        assert_eq!(feedback_key("slider1", "_Value"), "slider1__Value");
        assert_eq!(feedback_key("list1", "ItemArray"), "list1__ItemArray");
    }
}
