use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use kubedit_parsers::{json, yaml, MapValue, Range};

use crate::document::SourceDocument;
use crate::position::Position;
use crate::value::MergeValue;

use super::*;

fn insert_index(text: &str, after: &str, before: &str) -> usize {
    let probe
        = format!("{after}{before}");

    text.find(&probe).expect("document should contain the probe") + after.len()
}

fn line_containing<'a>(text: &'a str, needle: &str) -> &'a str {
    text.lines()
        .find(|line| line.contains(needle))
        .expect("document should contain the needle")
}

fn merge_payload(value: serde_json::Value) -> MergeValue {
    MergeValue::from(&value)
}

#[test]
fn insert_into_yaml_document() {
    let document = SourceDocument::yaml("spec:\n  image: zotifier:1.0.0\n");
    let at = insert_index(document.text(), "image: ", "zotifier");

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::Insert {
        at,
        text: "saferegistry.io/".to_string(),
    })
    .unwrap();

    let after = edits.apply_to(document.text());

    assert_eq!(line_containing(&after, "image: "), "  image: saferegistry.io/zotifier:1.0.0");
}

#[test]
fn insert_offset_can_come_from_a_position() {
    let document = SourceDocument::yaml("spec:\n  image: zotifier:1.0.0\n");
    let at = document.offset_at(Position::new(1, 9)).unwrap();

    assert_eq!(at, insert_index(document.text(), "image: ", "zotifier"));
}

#[test]
fn insert_into_json_document() {
    let document = SourceDocument::json(r#"{"spec": {"image": "zotifier:1.0.0"}}"#);
    let at = insert_index(document.text(), r#""image": ""#, "zotifier");

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::Insert {
        at,
        text: "saferegistry.io/".to_string(),
    })
    .unwrap();

    let after = edits.apply_to(document.text());

    assert!(after.contains(r#""image": "saferegistry.io/zotifier:1.0.0""#));
}

#[rstest]
#[case(0, "X", "Xhello world")]
#[case(5, ",", "hello, world")]
#[case(11, "!", "hello world!")]
fn insert_in_bounds(#[case] at: usize, #[case] text: &str, #[case] expected: &str) {
    let document = SourceDocument::yaml("hello world");

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::Insert {
        at,
        text: text.to_string(),
    })
    .unwrap();

    assert_eq!(edits.apply_to(document.text()), expected);
}

#[test]
fn insert_past_the_end_is_a_no_op() {
    let document = SourceDocument::yaml("hello world");

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::Insert {
        at: 1000,
        text: "ignored".to_string(),
    })
    .unwrap();

    assert!(edits.is_empty());
    assert_eq!(edits.apply_to(document.text()), "hello world");
}

#[rstest]
// Shorter, longer, equal-length, and empty replacement text.
#[case(Range::new(0, 5), "hi", "hi world")]
#[case(Range::new(0, 5), "goodbye", "goodbye world")]
#[case(Range::new(0, 5), "HELLO", "HELLO world")]
#[case(Range::new(6, 11), "", "hello ")]

// A degenerate range behaves like an insert.
#[case(Range::new(5, 5), ",", "hello, world")]
fn replace_in_bounds(#[case] at: Range, #[case] text: &str, #[case] expected: &str) {
    let document = SourceDocument::yaml("hello world");

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::Replace {
        at,
        text: text.to_string(),
    })
    .unwrap();

    assert_eq!(edits.apply_to(document.text()), expected);
}

#[rstest]
#[case(Range::new(0, 12))]
#[case(Range::new(500, 600))]

// Inverted ranges are dropped rather than handed to the host.
#[case(Range::new(8, 2))]
fn replace_out_of_bounds_is_a_no_op(#[case] at: Range) {
    let document = SourceDocument::yaml("hello world");

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::Replace {
        at,
        text: "ignored".to_string(),
    })
    .unwrap();

    assert!(edits.is_empty());
    assert_eq!(edits.apply_to(document.text()), "hello world");
}

#[test]
fn sequence_offsets_address_the_original_document() {
    let document = SourceDocument::yaml("spec:\n  image: nginx\n");

    let mut edits = EditSet::new();
    combine_all(&mut edits, &document, &[
        ManifestEdit::Replace {
            at: Range::new(0, 4),
            text: "root".to_string(),
        },
        ManifestEdit::Insert {
            at: insert_index(document.text(), "image: ", "nginx"),
            text: "prefix-".to_string(),
        },
    ])
    .unwrap();

    assert_eq!(edits.len(), 2);
    assert_eq!(edits.apply_to(document.text()), "root:\n  image: prefix-nginx\n");
}

#[test]
fn merge_adds_a_key_and_preserves_the_rest() {
    let text = indoc! {"
        spec:
          action: Reticulate
          image: 'zotifier:latest'
        status:
    "};

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec")),
        values: merge_payload(json!({"imagePullPolicy": "Always"})),
    })
    .unwrap();

    assert_eq!(edits.updates().len(), 1);
    assert_eq!(edits.apply_to(text), indoc! {"
        spec:
          action: Reticulate
          image: 'zotifier:latest'
          imagePullPolicy: Always
        status:
    "});
}

#[test]
fn merge_overrides_scalars_in_place() {
    let text = indoc! {"
        spec:
          replicas: 3
          image: 'zotifier:latest'
          paused: false
    "};

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec")),
        values: merge_payload(json!({"replicas": 5})),
    })
    .unwrap();

    assert_eq!(edits.apply_to(text), indoc! {"
        spec:
          replicas: 5
          image: 'zotifier:latest'
          paused: false
    "});
}

#[test]
fn merge_recurses_through_nested_mappings() {
    let text = indoc! {"
        spec:
          template:
            replicas: 1
            paused: false
    "};

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec")),
        values: merge_payload(json!({"template": {"replicas": 3}})),
    })
    .unwrap();

    assert_eq!(edits.apply_to(text), indoc! {"
        spec:
          template:
            replicas: 3
            paused: false
    "});
}

#[test]
fn merge_into_an_empty_mapping_opens_a_block() {
    let text = indoc! {"
        spec:
          settings:
          other: 1
    "};

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec").member("settings")),
        values: merge_payload(json!({"mode": "fast"})),
    })
    .unwrap();

    assert_eq!(edits.apply_to(text), indoc! {"
        spec:
          settings:
            mode: fast
          other: 1
    "});
}

#[test]
fn merge_into_a_whole_resource() {
    let text = "a: 1\n";

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Resource(&parse),
        values: merge_payload(json!({"b": 2})),
    })
    .unwrap();

    assert_eq!(edits.apply_to(text), "a: 1\nb: 2\n");
}

#[test]
fn merge_into_an_unresolvable_target_is_a_no_op() {
    let text = "spec:\n  image: nginx\n";

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("metadata")),
        values: merge_payload(json!({"name": "x"})),
    })
    .unwrap();

    assert!(edits.is_empty());
}

#[test]
fn merge_with_a_stale_node_range_is_a_no_op() {
    let document = SourceDocument::yaml("a: 1\n");

    let stale = MapValue {
        range: Range::new(100, 200),
        entries: vec![],
    };

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Node(&stale),
        values: merge_payload(json!({"b": 2})),
    })
    .unwrap();

    assert!(edits.is_empty());
}

#[test]
fn merge_with_a_non_mapping_payload_is_a_no_op() {
    let text = "spec:\n  image: nginx\n";

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec")),
        values: MergeValue::String("not a mapping".to_string()),
    })
    .unwrap();

    assert!(edits.is_empty());
}

#[test]
fn merge_into_a_json_document_is_a_hard_failure() {
    let text = r#"{"spec": {"image": "nginx"}}"#;

    let document = SourceDocument::json(text);
    let parse = json::parse(text).unwrap();

    let mut edits = EditSet::new();
    let result = combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Resource(&parse),
        values: merge_payload(json!({"kind": "Pod"})),
    });

    assert!(matches!(result, Err(Error::JsonMergeUnimplemented)));
    assert!(edits.is_empty());
}

#[test]
fn merge_into_an_unknown_notation_is_a_no_op() {
    let text = "spec:\n  image: nginx\n";

    let document = SourceDocument::new(text, Notation::Other);
    let parse = yaml::parse_one(text).unwrap();

    let mut edits = EditSet::new();
    combine(&mut edits, &document, &ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec")),
        values: merge_payload(json!({"a": 1})),
    })
    .unwrap();

    assert!(edits.is_empty());
}

#[test]
fn combining_twice_queues_the_same_operations() {
    let text = "spec:\n  image: nginx\n";

    let document = SourceDocument::yaml(text);
    let parse = yaml::parse_one(text).unwrap();

    let edit = ManifestEdit::MergeValues {
        into: MappingReference::Traversal(parse.traverse().member("spec")),
        values: merge_payload(json!({"tag": "latest"})),
    };

    let mut first = EditSet::new();
    combine(&mut first, &document, &edit).unwrap();

    let mut second = EditSet::new();
    combine(&mut second, &document, &edit).unwrap();

    assert_eq!(first, second);
}
