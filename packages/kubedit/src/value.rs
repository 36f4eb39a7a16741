use serde::Serialize;

use crate::Error;

/// The plain nested form of a mapping: what merge payloads are written
/// in, and what parsed entries materialize into before merging.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeValue {
    Null,
    Bool(bool),
    Number(String), // Kept as source text to preserve exact formatting
    String(String),
    Array(Vec<MergeValue>),
    Object(Vec<(String, MergeValue)>), // Preserves insertion order
}

impl MergeValue {
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(MergeValue::from(&serde_json::to_value(value)?))
    }

    pub fn get(&self, key: &str) -> Option<&MergeValue> {
        match self {
            MergeValue::Object(entries) => entries
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value),

            _ => None,
        }
    }
}

impl From<&serde_json::Value> for MergeValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => {
                MergeValue::Null
            },

            serde_json::Value::Bool(b) => {
                MergeValue::Bool(*b)
            },

            serde_json::Value::Number(n) => {
                MergeValue::Number(n.to_string())
            },

            serde_json::Value::String(s) => {
                MergeValue::String(s.to_string())
            },

            serde_json::Value::Array(items) => {
                MergeValue::Array(items.iter().map(From::from).collect())
            },

            serde_json::Value::Object(entries) => {
                MergeValue::Object(entries.iter().map(|(k, v)| (k.to_string(), From::from(v))).collect())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn from_json_value() {
        let value = MergeValue::from(&json!({
            "imagePullPolicy": "Always",
            "replicas": 3,
            "paused": false,
            "tolerations": [],
        }));

        assert_eq!(value, MergeValue::Object(vec![
            ("imagePullPolicy".to_string(), MergeValue::String("Always".to_string())),
            ("replicas".to_string(), MergeValue::Number("3".to_string())),
            ("paused".to_string(), MergeValue::Bool(false)),
            ("tolerations".to_string(), MergeValue::Array(vec![])),
        ]));
    }

    #[test]
    fn from_serializable_struct() {
        #[derive(Serialize)]
        struct Patch {
            replicas: u32,
        }

        let value = MergeValue::from_serializable(&Patch { replicas: 2 }).unwrap();

        assert_eq!(value.get("replicas"), Some(&MergeValue::Number("2".to_string())));
    }

    #[test]
    fn key_order_is_preserved() {
        let value = MergeValue::from(&json!({"z": 1, "a": 2, "m": 3}));

        let MergeValue::Object(entries) = value else {
            panic!("expected an object");
        };

        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
