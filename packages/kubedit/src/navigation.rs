use kubedit_parsers::{MapEntry, MapTraversal, MapValue, Range, ResourceParse, Value};

use crate::value::MergeValue;

/// The mapping a merge targets: a parsed node handed over directly, a
/// lazy traversal handle, or a whole resource.
#[derive(Debug, Clone)]
pub enum MappingReference<'a> {
    Node(&'a MapValue),
    Traversal(MapTraversal<'a>),
    Resource(&'a ResourceParse),
}

/// A borrowed view of a resolved mapping node.
#[derive(Debug, Clone, Copy)]
pub struct MapNode<'a> {
    pub range: Range,
    pub entries: &'a [MapEntry],
}

/// Resolves a mapping reference to its underlying node, or `None` when
/// the reference does not point at a mapping in the current parse.
pub fn map_node_of<'a>(reference: &MappingReference<'a>) -> Option<MapNode<'a>> {
    match reference {
        MappingReference::Node(map) => Some(MapNode {
            range: map.range,
            entries: &map.entries,
        }),

        MappingReference::Traversal(traversal) => match traversal.parse_node()? {
            Value::Map(map) => Some(MapNode {
                range: map.range,
                entries: &map.entries,
            }),

            _ => None,
        },

        MappingReference::Resource(resource) => Some(MapNode {
            range: resource.range,
            entries: &resource.entries,
        }),
    }
}

/// Materializes parsed entries into their plain nested form.
pub fn object_of(entries: &[MapEntry]) -> MergeValue {
    MergeValue::Object(
        entries
            .iter()
            .map(|entry| (entry.key.clone(), merge_value_of(&entry.value)))
            .collect(),
    )
}

fn merge_value_of(value: &Value) -> MergeValue {
    match value {
        Value::String { value, .. } => MergeValue::String(value.clone()),
        Value::Number { text, .. } => MergeValue::Number(text.clone()),
        Value::Boolean { value, .. } => MergeValue::Bool(*value),
        Value::Array { items, .. } => MergeValue::Array(items.iter().map(merge_value_of).collect()),
        Value::Map(map) => object_of(&map.entries),
        Value::Missing { .. } => MergeValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use kubedit_parsers::yaml;

    use super::*;

    #[test]
    fn resolves_a_direct_node() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let Value::Map(map) = &parse.entries[0].value else {
            panic!("expected a mapping");
        };

        let node = map_node_of(&MappingReference::Node(map)).unwrap();

        assert_eq!(node.range, map.range);
        assert_eq!(node.entries.len(), 1);
    }

    #[test]
    fn resolves_a_traversal() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let reference = MappingReference::Traversal(parse.traverse().member("spec"));

        assert_eq!(map_node_of(&reference).unwrap().entries.len(), 1);
    }

    #[test]
    fn traversal_to_a_scalar_is_not_a_mapping() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let reference = MappingReference::Traversal(parse.traverse().member("spec").member("image"));

        assert!(map_node_of(&reference).is_none());
    }

    #[test]
    fn traversal_to_a_missing_member_fails() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let reference = MappingReference::Traversal(parse.traverse().member("metadata"));

        assert!(map_node_of(&reference).is_none());
    }

    #[test]
    fn resolves_a_whole_resource() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let node = map_node_of(&MappingReference::Resource(&parse)).unwrap();

        assert_eq!(node.range, parse.range);
        assert_eq!(node.entries.len(), 1);
    }

    #[test]
    fn materializes_scalars_arrays_and_nested_maps() {
        let parse = yaml::parse_one(concat!(
            "action: Reticulate\n",
            "replicas: 3\n",
            "paused: false\n",
            "label: null\n",
            "args:\n",
            "  - one\n",
            "  - two\n",
            "spec:\n",
            "  image: nginx\n",
        ))
        .unwrap();

        assert_eq!(object_of(&parse.entries), MergeValue::from(&json!({
            "action": "Reticulate",
            "replicas": 3,
            "paused": false,
            "label": null,
            "args": ["one", "two"],
            "spec": {"image": "nginx"},
        })));
    }
}
