use crate::position::Position;

/// The textual encoding of a manifest document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Yaml,
    Json,
    Other,
}

/// The host editor's view of an open manifest document.
pub trait ManifestDocument {
    fn text(&self) -> &str;

    fn notation(&self) -> Notation;

    fn len(&self) -> usize {
        self.text().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position_at(&self, offset: usize) -> Position {
        let text
            = self.text();

        let mut offset
            = offset.min(text.len());

        while offset > 0 && !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let before
            = &text[..offset];

        let line
            = before.matches('\n').count();

        let line_start = before
            .rfind('\n')
            .map_or(0, |index| index + 1);

        Position {
            line,
            character: before[line_start..].chars().count(),
        }
    }

    fn offset_at(&self, position: Position) -> Option<usize> {
        let text
            = self.text();

        let mut offset
            = 0usize;

        for _ in 0..position.line {
            offset += text[offset..].find('\n')? + 1;
        }

        let line
            = &text[offset..];

        let line_end
            = line.find('\n').unwrap_or(line.len());

        let line_text
            = &line[..line_end];

        let mut characters
            = 0usize;

        for (byte_index, _) in line_text.char_indices() {
            if characters == position.character {
                return Some(offset + byte_index);
            }

            characters += 1;
        }

        (position.character == characters).then(|| offset + line_text.len())
    }
}

/// A plain in-memory document: the implementation used by tests and by
/// hosts without a richer text buffer of their own.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
    notation: Notation,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>, notation: Notation) -> Self {
        Self {
            text: text.into(),
            notation,
        }
    }

    pub fn yaml(text: impl Into<String>) -> Self {
        Self::new(text, Notation::Yaml)
    }

    pub fn json(text: impl Into<String>) -> Self {
        Self::new(text, Notation::Json)
    }
}

impl ManifestDocument for SourceDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn notation(&self) -> Notation {
        self.notation
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn position_of_offsets() {
        let document = SourceDocument::yaml("spec:\n  image: nginx\n");

        assert_eq!(document.position_at(0), Position::new(0, 0));
        assert_eq!(document.position_at(4), Position::new(0, 4));
        assert_eq!(document.position_at(6), Position::new(1, 0));
        assert_eq!(document.position_at(8), Position::new(1, 2));
        assert_eq!(document.position_at(21), Position::new(2, 0));

        // Past-the-end offsets clamp to the end of the text.
        assert_eq!(document.position_at(500), Position::new(2, 0));
    }

    #[test]
    fn offset_of_positions() {
        let document = SourceDocument::yaml("spec:\n  image: nginx\n");

        assert_eq!(document.offset_at(Position::new(0, 0)), Some(0));
        assert_eq!(document.offset_at(Position::new(1, 2)), Some(8));
        assert_eq!(document.offset_at(Position::new(0, 5)), Some(5));
        assert_eq!(document.offset_at(Position::new(0, 6)), None);
        assert_eq!(document.offset_at(Position::new(9, 0)), None);
    }

    #[test]
    fn conversions_round_trip() {
        let document = SourceDocument::yaml("a: 1\nbb: 22\n");

        for offset in 0..document.len() {
            assert_eq!(document.offset_at(document.position_at(offset)), Some(offset));
        }
    }

    #[test]
    fn notation_is_what_the_document_declares() {
        assert_eq!(SourceDocument::yaml("a: 1\n").notation(), Notation::Yaml);
        assert_eq!(SourceDocument::json("{}").notation(), Notation::Json);
        assert_eq!(SourceDocument::new("x", Notation::Other).notation(), Notation::Other);
    }
}
