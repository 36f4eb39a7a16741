use crate::value::MergeValue;

/// Emits a merged mapping as block-style YAML at column zero, nesting by
/// two spaces. The combine engine re-indents the result to its context.
pub fn write_map(entries: &[(String, MergeValue)]) -> String {
    let mut out
        = String::new();

    write_entries(&mut out, entries, 0, false);

    out
}

fn write_entries(out: &mut String, entries: &[(String, MergeValue)], indent: usize, mut inline_first: bool) {
    for (key, value) in entries {
        if inline_first {
            inline_first = false;
        } else {
            out.push_str(&" ".repeat(indent));
        }

        out.push_str(&quote(key));
        out.push(':');

        match value {
            MergeValue::Object(children) if children.is_empty() => {
                out.push_str(" {}\n");
            },

            MergeValue::Object(children) => {
                out.push('\n');
                write_entries(out, children, indent + 2, false);
            },

            MergeValue::Array(items) if items.is_empty() => {
                out.push_str(" []\n");
            },

            MergeValue::Array(items) => {
                out.push('\n');
                write_items(out, items, indent + 2);
            },

            scalar => {
                out.push(' ');
                out.push_str(&scalar_token(scalar));
                out.push('\n');
            },
        }
    }
}

fn write_items(out: &mut String, items: &[MergeValue], indent: usize) {
    for item in items {
        out.push_str(&" ".repeat(indent));
        out.push('-');

        match item {
            MergeValue::Object(entries) if entries.is_empty() => {
                out.push_str(" {}\n");
            },

            MergeValue::Object(entries) => {
                out.push(' ');
                write_entries(out, entries, indent + 2, true);
            },

            MergeValue::Array(nested) if nested.is_empty() => {
                out.push_str(" []\n");
            },

            MergeValue::Array(nested) => {
                out.push('\n');
                write_items(out, nested, indent + 2);
            },

            scalar => {
                out.push(' ');
                out.push_str(&scalar_token(scalar));
                out.push('\n');
            },
        }
    }
}

fn scalar_token(value: &MergeValue) -> String {
    match value {
        MergeValue::Null => "null".to_string(),
        MergeValue::Bool(value) => value.to_string(),
        MergeValue::Number(text) => text.clone(),
        MergeValue::String(text) => quote(text),
        MergeValue::Array(_) | MergeValue::Object(_) => {
            unreachable!("collections are emitted in block form")
        }
    }
}

fn quote(text: &str) -> String {
    if is_plain(text) {
        return text.to_string();
    }

    if text.chars().any(|c| c.is_control()) {
        // Control characters need double-quoted escapes.
        return serde_json::to_string(text).expect("string serialization is infallible");
    }

    format!("'{}'", text.replace('\'', "''"))
}

// A scalar can stay unquoted when it sticks to a safe charset and the
// YAML reading of the bare text is still a string (so `true`, `3`, and
// `null` all get quotes).
fn is_plain(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(text),
            Ok(serde_yaml::Value::String(_))
        )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::value::MergeValue;

    use super::*;

    fn entries_of(value: serde_json::Value) -> Vec<(String, MergeValue)> {
        match MergeValue::from(&value) {
            MergeValue::Object(entries) => entries,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn flat_mapping() {
        let out = write_map(&entries_of(json!({
            "action": "Reticulate",
            "image": "zotifier:latest",
            "imagePullPolicy": "Always",
        })));

        assert_eq!(out, "action: Reticulate\nimage: 'zotifier:latest'\nimagePullPolicy: Always\n");
    }

    #[test]
    fn nested_mapping() {
        let out = write_map(&entries_of(json!({
            "spec": {"replicas": 3, "paused": false},
        })));

        assert_eq!(out, "spec:\n  replicas: 3\n  paused: false\n");
    }

    #[test]
    fn sequences_and_compact_items() {
        let out = write_map(&entries_of(json!({
            "args": ["one", "two"],
            "containers": [{"name": "web", "image": "nginx"}],
        })));

        assert_eq!(out, concat!(
            "args:\n",
            "  - one\n",
            "  - two\n",
            "containers:\n",
            "  - name: web\n",
            "    image: nginx\n",
        ));
    }

    #[test]
    fn empty_collections_stay_inline() {
        let out = write_map(&entries_of(json!({
            "tolerations": [],
            "resources": {},
        })));

        assert_eq!(out, "tolerations: []\nresources: {}\n");
    }

    #[test]
    fn scalars_that_would_change_type_get_quoted() {
        let out = write_map(&entries_of(json!({
            "a": "true",
            "b": "3",
            "c": "null",
            "d": "has space",
        })));

        assert_eq!(out, "a: 'true'\nb: '3'\nc: 'null'\nd: 'has space'\n");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let out = write_map(&entries_of(json!({"msg": "it's fine"})));

        assert_eq!(out, "msg: 'it''s fine'\n");
    }

    #[test]
    fn null_bool_and_number_values() {
        let out = write_map(&entries_of(json!({
            "label": null,
            "paused": true,
            "replicas": 3,
        })));

        assert_eq!(out, "label: null\npaused: true\nreplicas: 3\n");
    }
}
