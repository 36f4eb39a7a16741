use crate::value::MergeValue;

/// Merges `overlay` into `base`. When both sides of a key are mappings
/// the merge recurses; on any other conflict the overlay wins. Keys the
/// overlay does not mention are left untouched, in their original order.
pub fn deep_merge(base: MergeValue, overlay: MergeValue) -> MergeValue {
    match (base, overlay) {
        (MergeValue::Object(mut base_entries), MergeValue::Object(overlay_entries)) => {
            for (key, overlay_value) in overlay_entries {
                match base_entries.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(slot) => {
                        let current
                            = std::mem::replace(&mut slot.1, MergeValue::Null);

                        slot.1 = deep_merge(current, overlay_value);
                    },

                    None => {
                        base_entries.push((key, overlay_value));
                    },
                }
            }

            MergeValue::Object(base_entries)
        }

        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::value::MergeValue;

    use super::*;

    fn object(value: serde_json::Value) -> MergeValue {
        MergeValue::from(&value)
    }

    #[test]
    fn overlay_wins_on_scalar_conflict() {
        let merged = deep_merge(
            object(json!({"image": "nginx", "tag": "old"})),
            object(json!({"tag": "new"})),
        );

        assert_eq!(merged, object(json!({"image": "nginx", "tag": "new"})));
    }

    #[test]
    fn new_keys_append_after_existing_ones() {
        let merged = deep_merge(
            object(json!({"action": "Reticulate", "image": "zotifier"})),
            object(json!({"imagePullPolicy": "Always"})),
        );

        let MergeValue::Object(entries) = merged else {
            panic!("expected an object");
        };

        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(keys, vec!["action", "image", "imagePullPolicy"]);
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let merged = deep_merge(
            object(json!({"spec": {"replicas": 1, "paused": false}})),
            object(json!({"spec": {"replicas": 3}})),
        );

        assert_eq!(merged, object(json!({"spec": {"replicas": 3, "paused": false}})));
    }

    #[test]
    fn overlay_scalar_replaces_base_mapping() {
        let merged = deep_merge(
            object(json!({"spec": {"replicas": 1}})),
            object(json!({"spec": "gone"})),
        );

        assert_eq!(merged, object(json!({"spec": "gone"})));
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let merged = deep_merge(
            object(json!({"args": ["a", "b"]})),
            object(json!({"args": ["c"]})),
        );

        assert_eq!(merged, object(json!({"args": ["c"]})));
    }

    #[test]
    fn merge_is_not_commutative() {
        let left = deep_merge(object(json!({"a": 1})), object(json!({"a": 2})));
        let right = deep_merge(object(json!({"a": 2})), object(json!({"a": 1})));

        assert_ne!(left, right);
    }
}
