use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::ast::{MapEntry, MapValue, Range, Value};

use super::*;

#[test]
fn entry_accessors() {
    let resource = parse_one(indoc! {"
        spec:
          image: nginx
        status:
    "})
    .unwrap();

    let spec = resource.get("spec").unwrap().value.as_map().unwrap();

    assert_eq!(spec.get("image").map(|entry| entry.key_range), Some(Range::new(8, 13)));
    assert!(spec.get("tag").is_none());
    assert!(resource.get("metadata").is_none());
}

#[test]
fn empty_input_has_no_resources() {
    assert_eq!(parse("").unwrap(), vec![]);
    assert_eq!(parse("# just a comment\n").unwrap(), vec![]);
    assert_eq!(parse("\n\n").unwrap(), vec![]);
    assert!(parse_one("").is_err());
}

#[test]
fn single_entry() {
    let resource = parse_one("name: test\n").unwrap();

    assert_eq!(resource.range, Range::new(0, 11));
    assert_eq!(resource.entries, vec![
        MapEntry {
            key: "name".to_string(),
            key_range: Range::new(0, 4),
            value: Value::String {
                value: "test".to_string(),
                range: Range::new(6, 10),
            },
        },
    ]);
}

#[test]
fn nested_block_and_trailing_empty_mapping() {
    let resource = parse_one("spec:\n  image: nginx\nstatus:\n").unwrap();

    assert_eq!(resource.range, Range::new(0, 29));
    assert_eq!(resource.entries, vec![
        MapEntry {
            key: "spec".to_string(),
            key_range: Range::new(0, 4),
            value: Value::Map(MapValue {
                // The block's range runs up to the start of the `status:`
                // line, so it covers the separating newline.
                range: Range::new(8, 21),
                entries: vec![
                    MapEntry {
                        key: "image".to_string(),
                        key_range: Range::new(8, 13),
                        value: Value::String {
                            value: "nginx".to_string(),
                            range: Range::new(15, 20),
                        },
                    },
                ],
            }),
        },
        MapEntry {
            key: "status".to_string(),
            key_range: Range::new(21, 27),
            value: Value::Map(MapValue {
                range: Range::new(28, 28),
                entries: vec![],
            }),
        },
    ]);
}

#[test]
fn quoted_value_keeps_quotes_in_range() {
    let resource = parse_one("image: 'zotifier:latest'\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::String {
        value: "zotifier:latest".to_string(),
        range: Range::new(7, 24),
    });
}

#[test]
fn keys_containing_colons() {
    let resource = parse_one("\"foo:bar\": value\n").unwrap();

    assert_eq!(resource.entries, vec![
        MapEntry {
            key: "foo:bar".to_string(),
            key_range: Range::new(0, 9),
            value: Value::String {
                value: "value".to_string(),
                range: Range::new(11, 16),
            },
        },
    ]);
}

#[test]
fn block_sequence_of_scalars() {
    let resource = parse_one("args:\n  - one\n  - two\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::Array {
        range: Range::new(8, 22),
        items: vec![
            Value::String {
                value: "one".to_string(),
                range: Range::new(10, 13),
            },
            Value::String {
                value: "two".to_string(),
                range: Range::new(18, 21),
            },
        ],
    });
}

#[test]
fn sequence_at_parent_indent() {
    let resource = parse_one("args:\n- one\nnext: 1\n").unwrap();

    let Value::Array { items, .. } = &resource.entries[0].value else {
        panic!("expected an array");
    };

    assert_eq!(items.len(), 1);
    assert_eq!(resource.entries[1].key, "next");
}

#[test]
fn compact_map_items() {
    let resource = parse_one("containers:\n  - name: web\n    image: nginx\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::Array {
        range: Range::new(14, 43),
        items: vec![
            Value::Map(MapValue {
                range: Range::new(16, 43),
                entries: vec![
                    MapEntry {
                        key: "name".to_string(),
                        key_range: Range::new(16, 20),
                        value: Value::String {
                            value: "web".to_string(),
                            range: Range::new(22, 25),
                        },
                    },
                    MapEntry {
                        key: "image".to_string(),
                        key_range: Range::new(30, 35),
                        value: Value::String {
                            value: "nginx".to_string(),
                            range: Range::new(37, 42),
                        },
                    },
                ],
            }),
        ],
    });
}

#[test]
fn document_stream() {
    let resources = parse("a: 1\n---\nb: 2\n").unwrap();

    assert_eq!(resources.len(), 2);

    assert_eq!(resources[0].range, Range::new(0, 5));
    assert_eq!(resources[0].entries[0].value, Value::Number {
        value: 1.0,
        text: "1".to_string(),
        range: Range::new(3, 4),
    });

    assert_eq!(resources[1].range, Range::new(9, 14));
    assert_eq!(resources[1].entries[0].value, Value::Number {
        value: 2.0,
        text: "2".to_string(),
        range: Range::new(12, 13),
    });
}

#[test]
fn leading_separator_and_comments() {
    let resources = parse("---\na: 1\n").unwrap();

    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].range, Range::new(4, 9));

    let resource = parse_one("# c\ntest: value\n").unwrap();

    assert_eq!(resource.range, Range::new(4, 16));
    assert_eq!(resource.entries[0].key_range, Range::new(4, 8));
}

#[test]
fn literal_block_scalar() {
    let resource = parse_one("data: |\n  line one\n  line two\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::String {
        value: "line one\nline two\n".to_string(),
        range: Range::new(6, 29),
    });
}

#[test]
fn folded_block_scalar() {
    let resource = parse_one("summary: >\n  one\n  two\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::String {
        value: "one two\n".to_string(),
        range: Range::new(9, 22),
    });
}

#[test]
fn flow_sequence() {
    let resource = parse_one("ports: [80, 443]\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::Array {
        range: Range::new(7, 16),
        items: vec![
            Value::Number {
                value: 80.0,
                text: "80".to_string(),
                range: Range::new(8, 10),
            },
            Value::Number {
                value: 443.0,
                text: "443".to_string(),
                range: Range::new(12, 15),
            },
        ],
    });
}

#[test]
fn empty_flow_collections() {
    let resource = parse_one("resources: {}\nargs: []\n").unwrap();

    assert_eq!(resource.entries[0].value, Value::Map(MapValue {
        range: Range::new(11, 13),
        entries: vec![],
    }));
    assert!(matches!(resource.entries[1].value, Value::Array { ref items, .. } if items.is_empty()));
}

#[test]
fn flow_mapping_with_entries() {
    let resource = parse_one("limits: {cpu: 1, memory: 2Gi}\n").unwrap();

    let Value::Map(map) = &resource.entries[0].value else {
        panic!("expected a mapping");
    };

    assert_eq!(map.entries.len(), 2);
    assert_eq!(map.entries[0].key, "cpu");
    assert_eq!(map.entries[1].key, "memory");
    assert!(matches!(map.entries[1].value, Value::String { ref value, .. } if value == "2Gi"));
}

#[test]
fn templated_value_degrades_to_string() {
    let resource = parse_one("image: {{ .Values.image }}\n").unwrap();

    assert!(matches!(
        resource.entries[0].value,
        Value::String { ref value, .. } if value == "{{ .Values.image }}"
    ));
}

#[rstest]
#[case("replicas: 3\n", Value::Number { value: 3.0, text: "3".to_string(), range: Range::new(10, 11) })]
#[case("enabled: true\n", Value::Boolean { value: true, range: Range::new(9, 13) })]
#[case("tag: ~\n", Value::Missing { range: Range::new(5, 6) })]
#[case("tag: null\n", Value::Missing { range: Range::new(5, 9) })]
#[case("port: '8080'\n", Value::String { value: "8080".to_string(), range: Range::new(6, 12) })]
#[case("name: web # primary\n", Value::String { value: "web".to_string(), range: Range::new(6, 9) })]
#[case("cmd: run fast\n", Value::String { value: "run fast".to_string(), range: Range::new(5, 13) })]
fn scalar_classification(#[case] text: &str, #[case] expected: Value) {
    let resource = parse_one(text).unwrap();

    assert_eq!(resource.entries[0].value, expected);
}

#[test]
fn unterminated_final_line() {
    let resource = parse_one("test: value").unwrap();

    assert_eq!(resource.range, Range::new(0, 11));
    assert_eq!(resource.entries[0].value, Value::String {
        value: "value".to_string(),
        range: Range::new(6, 11),
    });
}

#[test]
fn blank_lines_between_entries_belong_to_the_block() {
    let resource = parse_one("spec:\n  a: 1\n\n\nnext: 2\n").unwrap();

    let Value::Map(map) = &resource.entries[0].value else {
        panic!("expected a mapping");
    };

    // The blank run before `next:` is attributed to the spec block.
    assert_eq!(map.range, Range::new(8, 15));
    assert_eq!(resource.entries[1].key, "next");
}
