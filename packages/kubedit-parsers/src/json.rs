use crate::ast::{MapEntry, MapValue, Range, ResourceParse, Value};
use crate::Error;

/// Parses a JSON manifest. The top level must be an object.
pub fn parse(text: &str) -> Result<ResourceParse, Error> {
    let mut scanner = Scanner {
        input: text.as_bytes(),
        offset: 0,
    };

    scanner.skip_whitespace();

    if scanner.peek() != Some(b'{') {
        return Err(Error::InvalidSyntax("expected a top-level object".to_string()));
    }

    let map
        = scanner.parse_object()?;

    scanner.skip_whitespace();

    if scanner.offset < scanner.input.len() {
        return Err(Error::InvalidSyntax("trailing content after document".to_string()));
    }

    Ok(ResourceParse {
        range: map.range,
        entries: map.entries,
    })
}

struct Scanner<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        (self.offset < self.input.len()).then(|| self.input[self.offset])
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            self.offset += 1;
        }
    }

    fn skip_char(&mut self, expected: u8) -> Result<(), Error> {
        if self.peek() == Some(expected) {
            self.offset += 1;
            Ok(())
        } else {
            Err(Error::InvalidSyntax(format!(
                "expected '{}' at offset {}",
                expected as char, self.offset
            )))
        }
    }

    fn parse_object(&mut self) -> Result<MapValue, Error> {
        let start
            = self.offset;

        self.skip_char(b'{')?;
        self.skip_whitespace();

        let mut entries
            = Vec::new();

        if self.peek() == Some(b'}') {
            self.offset += 1;

            return Ok(MapValue {
                range: Range::new(start, self.offset),
                entries,
            });
        }

        loop {
            self.skip_whitespace();

            let (key, key_range)
                = self.parse_string_token()?;

            self.skip_whitespace();
            self.skip_char(b':')?;
            self.skip_whitespace();

            let value
                = self.parse_value()?;

            entries.push(MapEntry { key, key_range, value });

            self.skip_whitespace();

            match self.peek() {
                Some(b',') => {
                    self.offset += 1;
                }

                Some(b'}') => {
                    self.offset += 1;
                    break;
                }

                _ => {
                    return Err(Error::InvalidSyntax(format!(
                        "expected ',' or '}}' at offset {}",
                        self.offset
                    )));
                }
            }
        }

        Ok(MapValue {
            range: Range::new(start, self.offset),
            entries,
        })
    }

    fn parse_value(&mut self) -> Result<Value, Error> {
        match self.peek() {
            Some(b'{') => Ok(Value::Map(self.parse_object()?)),

            Some(b'[') => self.parse_array(),

            Some(b'"') => {
                let (value, range)
                    = self.parse_string_token()?;

                Ok(Value::String { value, range })
            }

            Some(b't') | Some(b'f') | Some(b'n') => self.parse_literal(),

            Some(c) if c == b'-' || c.is_ascii_digit() => self.parse_number(),

            _ => Err(Error::InvalidSyntax(format!(
                "unexpected value at offset {}",
                self.offset
            ))),
        }
    }

    fn parse_array(&mut self) -> Result<Value, Error> {
        let start
            = self.offset;

        self.skip_char(b'[')?;
        self.skip_whitespace();

        let mut items
            = Vec::new();

        if self.peek() == Some(b']') {
            self.offset += 1;

            return Ok(Value::Array {
                items,
                range: Range::new(start, self.offset),
            });
        }

        loop {
            self.skip_whitespace();

            items.push(self.parse_value()?);

            self.skip_whitespace();

            match self.peek() {
                Some(b',') => {
                    self.offset += 1;
                }

                Some(b']') => {
                    self.offset += 1;
                    break;
                }

                _ => {
                    return Err(Error::InvalidSyntax(format!(
                        "expected ',' or ']' at offset {}",
                        self.offset
                    )));
                }
            }
        }

        Ok(Value::Array {
            items,
            range: Range::new(start, self.offset),
        })
    }

    // Scans a raw string token and lets serde_json decode the escapes.
    fn parse_string_token(&mut self) -> Result<(String, Range), Error> {
        let start
            = self.offset;

        self.skip_char(b'"')?;

        while self.offset < self.input.len() {
            match self.input[self.offset] {
                b'\\' => self.offset += 2,
                b'"' => break,
                _ => self.offset += 1,
            }
        }

        self.skip_char(b'"')?;

        let raw
            = std::str::from_utf8(&self.input[start..self.offset])?;

        let value = serde_json::from_str::<String>(raw)
            .map_err(|err| Error::InvalidSyntax(format!("bad string token: {err}")))?;

        Ok((value, Range::new(start, self.offset)))
    }

    fn parse_literal(&mut self) -> Result<Value, Error> {
        let start
            = self.offset;

        while self.offset < self.input.len() && self.input[self.offset].is_ascii_alphabetic() {
            self.offset += 1;
        }

        let range
            = Range::new(start, self.offset);

        match &self.input[start..self.offset] {
            b"true" => Ok(Value::Boolean { value: true, range }),
            b"false" => Ok(Value::Boolean { value: false, range }),
            b"null" => Ok(Value::Missing { range }),
            _ => Err(Error::InvalidSyntax(format!("unknown literal at offset {start}"))),
        }
    }

    fn parse_number(&mut self) -> Result<Value, Error> {
        let start
            = self.offset;

        while self.offset < self.input.len()
            && matches!(self.input[self.offset], b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        {
            self.offset += 1;
        }

        let text
            = std::str::from_utf8(&self.input[start..self.offset])?;

        let value = text
            .parse::<f64>()
            .map_err(|_| Error::InvalidSyntax(format!("bad number at offset {start}")))?;

        Ok(Value::Number {
            value,
            text: text.to_string(),
            range: Range::new(start, self.offset),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn simple_object() {
        let resource = parse(r#"{"name": "test"}"#).unwrap();

        assert_eq!(resource.range, Range::new(0, 16));
        assert_eq!(resource.entries, vec![
            MapEntry {
                key: "name".to_string(),
                key_range: Range::new(1, 7),
                value: Value::String {
                    value: "test".to_string(),
                    range: Range::new(9, 15),
                },
            },
        ]);
    }

    #[test]
    fn nested_values() {
        let resource = parse(r#"{"spec": {"replicas": 3, "paused": false, "label": null}}"#).unwrap();

        let Value::Map(spec) = &resource.entries[0].value else {
            panic!("expected a mapping");
        };

        assert_eq!(spec.entries.len(), 3);
        assert_eq!(spec.entries[0].value, Value::Number {
            value: 3.0,
            text: "3".to_string(),
            range: Range::new(22, 23),
        });
        assert!(matches!(spec.entries[1].value, Value::Boolean { value: false, .. }));
        assert!(matches!(spec.entries[2].value, Value::Missing { .. }));
    }

    #[test]
    fn arrays() {
        let resource = parse(r#"{"ports": [80, 443]}"#).unwrap();

        let Value::Array { items, .. } = &resource.entries[0].value else {
            panic!("expected an array");
        };

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Value::Number { value, .. } if value == 80.0));
    }

    #[test]
    fn escaped_strings() {
        let resource = parse(r#"{"a": "line\nbreak \"quoted\""}"#).unwrap();

        assert!(matches!(
            resource.entries[0].value,
            Value::String { ref value, .. } if value == "line\nbreak \"quoted\""
        ));
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(parse("[1, 2]").is_err());
        assert!(parse("").is_err());
        assert!(parse(r#"{"a": 1} extra"#).is_err());
    }
}
