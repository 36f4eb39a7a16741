use kubedit_parsers::Range;

/// One queued text operation, addressed against the document snapshot
/// the edits were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub range: Range,
    pub text: String,
}

/// The edit transaction handle: operations accumulate here and are
/// committed by the caller in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    updates: Vec<Update>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.updates.push(Update {
            range: Range::new(at, at),
            text: text.into(),
        });
    }

    pub fn replace(&mut self, range: Range, text: impl Into<String>) {
        self.updates.push(Update {
            range,
            text: text.into(),
        });
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Applies every queued update to the original snapshot. Updates are
    /// ordered by start offset (queue order breaks ties) and later ones
    /// are shifted by the length deltas of the ones already applied.
    pub fn apply_to(&self, document: &str) -> String {
        let mut sorted: Vec<&Update>
            = self.updates.iter().collect();

        sorted.sort_by_key(|update| update.range.start);

        let mut result
            = document.to_string();

        let mut delta
            = 0isize;

        for update in sorted {
            let start
                = (update.range.start as isize + delta) as usize;
            let end
                = (update.range.end as isize + delta) as usize;

            result.replace_range(start..end, &update.text);

            delta += update.text.len() as isize - update.range.len() as isize;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn apply_single_update() {
        let mut edits = EditSet::new();
        edits.replace(Range::new(6, 11), "foo");

        assert_eq!(edits.apply_to("test: value\n"), "test: foo\n");
    }

    #[test]
    fn apply_multiple_updates() {
        let mut edits = EditSet::new();
        edits.replace(Range::new(6, 11), "foo");
        edits.replace(Range::new(19, 25), "bar");

        assert_eq!(edits.apply_to("test: value\ntest2: value2\n"), "test: foo\ntest2: bar\n");
    }

    #[test]
    fn apply_removal() {
        let mut edits = EditSet::new();
        edits.replace(Range::new(12, 26), "");

        assert_eq!(
            edits.apply_to("test: value\ntest2: value2\ntest3: value3\n"),
            "test: value\ntest3: value3\n"
        );
    }

    #[test]
    fn apply_inserts() {
        let mut edits = EditSet::new();
        edits.insert(3, "XX");
        edits.insert(5, "YY");

        assert_eq!(edits.apply_to("hello world"), "helXXloYY world");
    }

    #[test]
    fn apply_out_of_order_queueing() {
        let mut edits = EditSet::new();
        edits.insert(5, "YY");
        edits.insert(3, "XX");

        assert_eq!(edits.apply_to("hello world"), "helXXloYY world");
    }

    #[test]
    fn equal_offsets_apply_in_queue_order() {
        let mut edits = EditSet::new();
        edits.insert(3, "A");
        edits.insert(3, "B");

        assert_eq!(edits.apply_to("hello"), "helABlo");
    }

    #[test]
    fn growing_and_shrinking_updates_compose() {
        let mut edits = EditSet::new();
        edits.replace(Range::new(0, 1), "longer");
        edits.replace(Range::new(2, 5), "s");

        assert_eq!(edits.apply_to("a b c"), "longer s");
    }
}
