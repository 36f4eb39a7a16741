use itertools::Itertools;

use kubedit_parsers::{ancestors_at, yaml, Containment, Range};

use crate::document::{ManifestDocument, Notation};
use crate::editset::EditSet;
use crate::error::Error;
use crate::merge::deep_merge;
use crate::navigation::{map_node_of, object_of, MappingReference};
use crate::position::{offset_in_bounds, range_in_bounds};
use crate::value::MergeValue;
use crate::writer;

/// One requested change to a manifest document. Edits whose target falls
/// outside the current document are dropped without queuing anything;
/// the document may have changed since the edit was computed, and a
/// stale edit must never corrupt it.
#[derive(Debug, Clone)]
pub enum ManifestEdit<'a> {
    Insert { at: usize, text: String },
    Replace { at: Range, text: String },
    MergeValues { into: MappingReference<'a>, values: MergeValue },
}

/// Converts one manifest edit into primitive operations on `edits`. The
/// caller commits the edit set separately.
pub fn combine(edits: &mut EditSet, document: &dyn ManifestDocument, edit: &ManifestEdit<'_>) -> Result<(), Error> {
    match edit {
        ManifestEdit::Insert { at, text } => {
            if !offset_in_bounds(*at, document.len()) {
                return Ok(());
            }

            edits.insert(*at, text.clone());

            Ok(())
        }

        ManifestEdit::Replace { at, text } => {
            if !range_in_bounds(at, document.len()) {
                return Ok(());
            }

            edits.replace(*at, text.clone());

            Ok(())
        }

        ManifestEdit::MergeValues { into, values } => merge_values(edits, document, into, values),
    }
}

/// Converts an ordered sequence of edits. Every member is dispatched
/// independently against the same document snapshot: offsets are never
/// adjusted for the length deltas of earlier members.
pub fn combine_all(edits: &mut EditSet, document: &dyn ManifestDocument, manifest_edits: &[ManifestEdit<'_>]) -> Result<(), Error> {
    for edit in manifest_edits {
        combine(edits, document, edit)?;
    }

    Ok(())
}

fn merge_values(
    edits: &mut EditSet,
    document: &dyn ManifestDocument,
    into: &MappingReference<'_>,
    values: &MergeValue,
) -> Result<(), Error> {
    match document.notation() {
        Notation::Yaml => {}
        Notation::Json => return Err(Error::JsonMergeUnimplemented),
        Notation::Other => return Ok(()),
    }

    let Some(node) = map_node_of(into) else {
        return Ok(());
    };

    let Some(replace_range) = replaceable_range(document.text(), node.range) else {
        return Ok(());
    };

    let merged
        = deep_merge(object_of(node.entries), values.clone());

    let MergeValue::Object(merged_entries) = merged else {
        // A non-mapping payload would replace the whole block; refuse it
        // the same way an unresolvable target is refused.
        return Ok(());
    };

    let parent_key = if node.entries.is_empty() {
        empty_map_parent_key(document, node.range)
    } else {
        None
    };

    let indentation = match &parent_key {
        Some(key_range) => document.position_at(key_range.start).character + 2,
        None => document.position_at(replace_range.start).character,
    };

    let block
        = writer::write_map(&merged_entries);

    let prefix
        = " ".repeat(indentation);

    let body = block
        .lines()
        .map(|line| format!("{prefix}{line}"))
        .join("\n");

    let body
        = body.trim_end();

    // A block replacing existing entries starts at the node's own column,
    // so its first line carries no prefix; a block populating an empty
    // mapping starts on a fresh line below the parent key.
    let text = match parent_key {
        Some(_) => format!("\n{body}"),
        None => body.trim_start().to_string(),
    };

    edits.replace(replace_range, text);

    Ok(())
}

// The parser attributes the whitespace separating a mapping from its
// next sibling to the mapping itself; the replaceable range stops before
// that whitespace. Returns `None` when the node's range no longer fits
// the document.
fn replaceable_range(text: &str, range: Range) -> Option<Range> {
    let raw
        = text.get(range.start..range.end)?;

    Some(Range::new(range.start, range.start + raw.trim_end().len()))
}

// For a mapping being populated for the first time: the key range of the
// entry holding it, provided its containing structure is itself a
// mapping. Containment is recovered from a fresh parse of the document.
fn empty_map_parent_key(document: &dyn ManifestDocument, target: Range) -> Option<Range> {
    let resources
        = yaml::parse(document.text()).ok()?;

    for resource in &resources {
        let ancestors
            = ancestors_at(resource, target);

        if let Some(innermost) = ancestors.first() {
            return match &innermost.kind {
                Containment::Map { key_range, .. } => Some(*key_range),
                _ => None,
            };
        }
    }

    None
}

#[cfg(test)]
#[path = "./combine.test.rs"]
mod combine_tests;
