use crate::ast::{MapEntry, MapValue, Range, ResourceParse, Value};
use crate::Error;

/// Parses every resource in a manifest stream. Documents are split on
/// `---` separator lines; blank and comment-only documents are dropped.
pub fn parse(text: &str) -> Result<Vec<ResourceParse>, Error> {
    let mut resources
        = Vec::new();

    for (start, end) in document_windows(text) {
        let resource
            = parse_window(text, start, end)?;

        if !resource.entries.is_empty() {
            resources.push(resource);
        }
    }

    Ok(resources)
}

/// Parses the first resource of a manifest stream.
pub fn parse_one(text: &str) -> Result<ResourceParse, Error> {
    parse(text)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidSyntax("no resource in manifest".to_string()))
}

fn document_windows(text: &str) -> Vec<(usize, usize)> {
    let bytes
        = text.as_bytes();

    let mut windows
        = Vec::new();

    let mut window_start
        = 0usize;
    let mut offset
        = 0usize;

    while offset < bytes.len() {
        let mut line_end
            = offset;

        while line_end < bytes.len() && bytes[line_end] != b'\n' {
            line_end += 1;
        }

        let line
            = &text[offset..line_end];

        if line == "---" || line.starts_with("--- ") || line.starts_with("---\t") {
            windows.push((window_start, offset));
            window_start = (line_end + 1).min(bytes.len());
        }

        offset = line_end + 1;
    }

    windows.push((window_start, bytes.len()));

    windows
}

fn parse_window(text: &str, start: usize, end: usize) -> Result<ResourceParse, Error> {
    let mut scanner = Scanner {
        input: text.as_bytes(),
        offset: start,
        limit: end,
    };

    scanner.skip_irrelevant_lines();

    if scanner.at_end() {
        return Ok(ResourceParse {
            range: Range::new(start, start),
            entries: Vec::new(),
        });
    }

    let indent
        = scanner.line_indent();

    let map
        = scanner.parse_block_map(indent)?;

    Ok(ResourceParse {
        range: map.range,
        entries: map.entries,
    })
}

struct Scanner<'a> {
    input: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> Scanner<'a> {
    fn at_end(&self) -> bool {
        self.offset >= self.limit
    }

    fn peek(&self) -> Option<u8> {
        (self.offset < self.limit).then(|| self.input[self.offset])
    }

    fn line_end(&self, from: usize) -> usize {
        let mut offset
            = from;

        while offset < self.limit && self.input[offset] != b'\n' {
            offset += 1;
        }

        offset
    }

    fn advance_past_line(&mut self) {
        self.offset = self.line_end(self.offset);

        if self.offset < self.limit {
            self.offset += 1;
        }
    }

    // Only meaningful when positioned at a line start.
    fn line_indent(&self) -> usize {
        let mut offset
            = self.offset;

        while offset < self.limit && self.input[offset] == b' ' {
            offset += 1;
        }

        offset - self.offset
    }

    fn line_is_blank_or_comment(&self) -> bool {
        let mut offset
            = self.offset;

        while offset < self.limit && self.input[offset] == b' ' {
            offset += 1;
        }

        offset >= self.limit || self.input[offset] == b'\n' || self.input[offset] == b'#'
    }

    fn skip_irrelevant_lines(&mut self) {
        while !self.at_end() && self.line_is_blank_or_comment() {
            self.advance_past_line();
        }
    }

    fn skip_inline_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.offset += 1;
        }
    }

    // A '-' only opens a sequence item when followed by a space or the
    // end of the line; "-foo" is a plain scalar.
    fn at_sequence_dash(&self, offset: usize) -> bool {
        self.input[offset] == b'-'
            && (offset + 1 >= self.limit || matches!(self.input[offset + 1], b' ' | b'\n'))
    }

    fn parse_block_map(&mut self, indent: usize) -> Result<MapValue, Error> {
        self.skip_irrelevant_lines();

        let map_start
            = self.offset + indent;

        let mut entries
            = Vec::new();

        self.parse_block_map_entries(indent, &mut entries)?;

        Ok(MapValue {
            range: Range::new(map_start, self.offset.max(map_start)),
            entries,
        })
    }

    // A `- key: value` sequence item: the first entry begins mid-line at
    // the current offset, the remaining entries on their own lines.
    fn parse_compact_map(&mut self, indent: usize) -> Result<MapValue, Error> {
        let map_start
            = self.offset;

        let mut entries
            = Vec::new();

        if let Some(entry) = self.parse_entry_at_key(indent)? {
            entries.push(entry);
        }

        self.parse_block_map_entries(indent, &mut entries)?;

        Ok(MapValue {
            range: Range::new(map_start, self.offset.max(map_start)),
            entries,
        })
    }

    fn parse_block_map_entries(&mut self, indent: usize, entries: &mut Vec<MapEntry>) -> Result<(), Error> {
        loop {
            self.skip_irrelevant_lines();

            if self.at_end() {
                return Ok(());
            }

            let line_indent
                = self.line_indent();

            if line_indent < indent {
                return Ok(());
            }

            if line_indent > indent {
                // Stray over-indented content; attribute it to the block and move on.
                self.advance_past_line();
                continue;
            }

            if self.at_sequence_dash(self.offset + line_indent) {
                return Ok(());
            }

            self.offset += line_indent;

            if let Some(entry) = self.parse_entry_at_key(indent)? {
                entries.push(entry);
            }
        }
    }

    fn parse_entry_at_key(&mut self, indent: usize) -> Result<Option<MapEntry>, Error> {
        let key_start
            = self.offset;

        let Some((key, key_range)) = self.parse_key()? else {
            // No key on this line; skip it.
            self.offset = key_start;
            self.advance_past_line();

            return Ok(None);
        };

        let value
            = self.parse_entry_value(indent)?;

        Ok(Some(MapEntry { key, key_range, value }))
    }

    fn parse_key(&mut self) -> Result<Option<(String, Range)>, Error> {
        let key_start
            = self.offset;

        if let Some(quote @ (b'"' | b'\'')) = self.peek() {
            self.offset += 1;

            let Some(key) = self.take_quoted(quote)? else {
                return Ok(None);
            };

            let key_range
                = Range::new(key_start, self.offset);

            self.skip_inline_spaces();

            if self.peek() == Some(b':') {
                self.offset += 1;
                return Ok(Some((key, key_range)));
            }

            return Ok(None);
        }

        let line_end
            = self.line_end(self.offset);

        let mut offset
            = self.offset;

        while offset < line_end {
            // A plain key ends at a ':' followed by a space or the line end.
            if self.input[offset] == b':'
                && (offset + 1 == line_end || self.input[offset + 1] == b' ')
            {
                let key
                    = std::str::from_utf8(&self.input[key_start..offset])?
                        .trim_end()
                        .to_string();

                if key.is_empty() {
                    return Ok(None);
                }

                let key_range
                    = Range::new(key_start, key_start + key.len());

                self.offset = offset + 1;

                return Ok(Some((key, key_range)));
            }

            offset += 1;
        }

        Ok(None)
    }

    fn parse_entry_value(&mut self, indent: usize) -> Result<Value, Error> {
        let after_colon
            = self.offset;

        self.skip_inline_spaces();

        match self.peek() {
            None | Some(b'\n') | Some(b'#') => {
                // Nothing on the line: a nested block, or an empty mapping.
                self.advance_past_line();

                let checkpoint
                    = self.offset;

                self.skip_irrelevant_lines();

                if !self.at_end() {
                    let child_indent
                        = self.line_indent();

                    let dash
                        = self.at_sequence_dash(self.offset + child_indent);

                    if child_indent > indent || (child_indent == indent && dash) {
                        if dash {
                            return self.parse_block_sequence(child_indent);
                        }

                        return Ok(Value::Map(self.parse_block_map(child_indent)?));
                    }
                }

                self.offset = checkpoint;

                Ok(Value::Map(MapValue {
                    range: Range::new(after_colon, after_colon),
                    entries: Vec::new(),
                }))
            }

            Some(b'|') | Some(b'>') => self.parse_block_scalar(indent),

            Some(b'[') | Some(b'{') => {
                let checkpoint
                    = self.offset;

                match self.parse_flow_value() {
                    Ok(value) => {
                        self.advance_past_line();
                        Ok(value)
                    }

                    Err(_) => {
                        // Not actually flow syntax (templated manifests and the
                        // like); degrade to a plain string scalar.
                        self.offset = checkpoint;
                        self.parse_plain_scalar()
                    }
                }
            }

            Some(quote @ (b'"' | b'\'')) => {
                let start
                    = self.offset;

                self.offset += 1;

                match self.take_quoted(quote)? {
                    Some(value) => {
                        let range
                            = Range::new(start, self.offset);

                        self.advance_past_line();

                        Ok(Value::String { value, range })
                    }

                    None => {
                        self.offset = start;
                        self.parse_plain_scalar()
                    }
                }
            }

            _ => self.parse_plain_scalar(),
        }
    }

    fn parse_plain_scalar(&mut self) -> Result<Value, Error> {
        let start
            = self.offset;

        let line_end
            = self.line_end(self.offset);

        let raw
            = std::str::from_utf8(&self.input[start..line_end])?;

        // A comment needs a space before the '#'.
        let content = match raw.find(" #") {
            Some(index) => &raw[..index],
            None => raw,
        };

        let content
            = content.trim_end();

        let range
            = Range::new(start, start + content.len());

        self.advance_past_line();

        Ok(classify_scalar(content, range))
    }

    fn parse_block_scalar(&mut self, indent: usize) -> Result<Value, Error> {
        let start
            = self.offset;

        let header_end
            = self.line_end(self.offset);

        let header
            = std::str::from_utf8(&self.input[start..header_end])?;

        let folded
            = header.starts_with('>');
        let strip
            = header.contains('-');

        self.advance_past_line();

        let mut lines: Vec<String>
            = Vec::new();

        let mut base_indent: Option<usize>
            = None;

        let mut end
            = header_end;

        while !self.at_end() {
            let line_start
                = self.offset;

            let line_end
                = self.line_end(line_start);

            let line
                = std::str::from_utf8(&self.input[line_start..line_end])?;

            let stripped
                = line.trim_start_matches(' ');

            if stripped.is_empty() {
                lines.push(String::new());
                self.advance_past_line();
                continue;
            }

            let line_indent
                = line.len() - stripped.len();

            if line_indent <= indent {
                break;
            }

            let base
                = *base_indent.get_or_insert(line_indent);

            if line_indent < base {
                break;
            }

            lines.push(line[base..].to_string());
            end = line_end;

            self.advance_past_line();
        }

        while matches!(lines.last(), Some(line) if line.is_empty()) {
            lines.pop();
        }

        let mut value = if folded {
            fold_lines(&lines)
        } else {
            lines.join("\n")
        };

        if !strip && !value.is_empty() {
            value.push('\n');
        }

        Ok(Value::String {
            value,
            range: Range::new(start, end),
        })
    }

    fn parse_block_sequence(&mut self, indent: usize) -> Result<Value, Error> {
        self.skip_irrelevant_lines();

        let seq_start
            = self.offset + indent;

        let mut items
            = Vec::new();

        loop {
            self.skip_irrelevant_lines();

            if self.at_end() {
                break;
            }

            let line_start
                = self.offset;

            let line_indent
                = self.line_indent();

            if line_indent < indent {
                break;
            }

            if line_indent > indent {
                self.advance_past_line();
                continue;
            }

            if !self.at_sequence_dash(line_start + line_indent) {
                break;
            }

            let dash_offset
                = line_start + line_indent;

            self.offset = dash_offset + 1;

            match self.peek() {
                None | Some(b'\n') => {
                    // The item is a nested block on the following lines.
                    self.advance_past_line();

                    let checkpoint
                        = self.offset;

                    self.skip_irrelevant_lines();

                    let mut pushed
                        = false;

                    if !self.at_end() {
                        let child_indent
                            = self.line_indent();

                        if child_indent > indent {
                            if self.at_sequence_dash(self.offset + child_indent) {
                                items.push(self.parse_block_sequence(child_indent)?);
                            } else {
                                items.push(Value::Map(self.parse_block_map(child_indent)?));
                            }

                            pushed = true;
                        }
                    }

                    if !pushed {
                        self.offset = checkpoint;

                        items.push(Value::Missing {
                            range: Range::new(dash_offset + 1, dash_offset + 1),
                        });
                    }
                }

                Some(b' ') => {
                    self.skip_inline_spaces();

                    let item_column
                        = self.offset - line_start;

                    if self.line_has_map_key() {
                        items.push(Value::Map(self.parse_compact_map(item_column)?));
                    } else {
                        items.push(self.parse_item_value(indent)?);
                    }
                }

                _ => {
                    // Unreachable given the dash check above.
                    self.offset = line_start;
                    break;
                }
            }
        }

        Ok(Value::Array {
            items,
            range: Range::new(seq_start, self.offset.max(seq_start)),
        })
    }

    fn parse_item_value(&mut self, indent: usize) -> Result<Value, Error> {
        match self.peek() {
            Some(b'|') | Some(b'>') => self.parse_block_scalar(indent),

            Some(b'[') | Some(b'{') => {
                let checkpoint
                    = self.offset;

                match self.parse_flow_value() {
                    Ok(value) => {
                        self.advance_past_line();
                        Ok(value)
                    }

                    Err(_) => {
                        self.offset = checkpoint;
                        self.parse_plain_scalar()
                    }
                }
            }

            Some(quote @ (b'"' | b'\'')) => {
                let start
                    = self.offset;

                self.offset += 1;

                match self.take_quoted(quote)? {
                    Some(value) => {
                        let range
                            = Range::new(start, self.offset);

                        self.advance_past_line();

                        Ok(Value::String { value, range })
                    }

                    None => {
                        self.offset = start;
                        self.parse_plain_scalar()
                    }
                }
            }

            _ => self.parse_plain_scalar(),
        }
    }

    // Whether the rest of the line reads as `key: ...` rather than a scalar.
    fn line_has_map_key(&self) -> bool {
        let line_end
            = self.line_end(self.offset);

        let mut offset
            = self.offset;

        if matches!(self.peek(), Some(b'"') | Some(b'\'')) {
            let quote
                = self.input[offset];

            offset += 1;

            while offset < line_end && self.input[offset] != quote {
                if quote == b'"' && self.input[offset] == b'\\' {
                    offset += 1;
                }

                offset += 1;
            }

            if offset >= line_end {
                return false;
            }

            offset += 1;

            while offset < line_end && self.input[offset] == b' ' {
                offset += 1;
            }

            return offset < line_end && self.input[offset] == b':';
        }

        while offset < line_end {
            if self.input[offset] == b':'
                && (offset + 1 == line_end || self.input[offset + 1] == b' ')
            {
                return true;
            }

            offset += 1;
        }

        false
    }

    fn take_quoted(&mut self, quote: u8) -> Result<Option<String>, Error> {
        let mut out
            = Vec::new();

        while self.offset < self.limit {
            match self.input[self.offset] {
                b'\n' => return Ok(None),

                b'\\' if quote == b'"' => {
                    self.offset += 1;

                    match self.peek() {
                        Some(b'n') => out.push(b'\n'),
                        Some(b't') => out.push(b'\t'),
                        Some(b'r') => out.push(b'\r'),
                        Some(other) => out.push(other),
                        None => return Ok(None),
                    }

                    self.offset += 1;
                }

                c if c == quote => {
                    self.offset += 1;

                    // A doubled single quote is an escaped quote.
                    if quote == b'\'' && self.peek() == Some(b'\'') {
                        out.push(b'\'');
                        self.offset += 1;
                        continue;
                    }

                    return Ok(Some(String::from_utf8(out)?));
                }

                c => {
                    out.push(c);
                    self.offset += 1;
                }
            }
        }

        Ok(None)
    }

    fn parse_flow_value(&mut self) -> Result<Value, Error> {
        self.skip_flow_whitespace();

        let start
            = self.offset;

        match self.peek() {
            Some(b'[') => {
                self.offset += 1;

                let mut items
                    = Vec::new();

                loop {
                    self.skip_flow_whitespace();

                    match self.peek() {
                        Some(b']') => {
                            self.offset += 1;
                            break;
                        }

                        Some(b',') => {
                            self.offset += 1;
                        }

                        None => {
                            return Err(Error::InvalidSyntax("unterminated flow sequence".to_string()));
                        }

                        _ => {
                            items.push(self.parse_flow_value()?);
                        }
                    }
                }

                Ok(Value::Array {
                    items,
                    range: Range::new(start, self.offset),
                })
            }

            Some(b'{') => {
                self.offset += 1;

                let mut entries
                    = Vec::new();

                loop {
                    self.skip_flow_whitespace();

                    match self.peek() {
                        Some(b'}') => {
                            self.offset += 1;
                            break;
                        }

                        Some(b',') => {
                            self.offset += 1;
                        }

                        None => {
                            return Err(Error::InvalidSyntax("unterminated flow mapping".to_string()));
                        }

                        _ => {
                            let (key, key_range)
                                = self.parse_flow_key()?;

                            self.skip_flow_whitespace();

                            if self.peek() != Some(b':') {
                                return Err(Error::InvalidSyntax("expected ':' in flow mapping".to_string()));
                            }

                            self.offset += 1;
                            self.skip_flow_whitespace();

                            let value = match self.peek() {
                                Some(b',') | Some(b'}') => Value::Missing {
                                    range: Range::new(self.offset, self.offset),
                                },
                                _ => self.parse_flow_value()?,
                            };

                            entries.push(MapEntry { key, key_range, value });
                        }
                    }
                }

                Ok(Value::Map(MapValue {
                    range: Range::new(start, self.offset),
                    entries,
                }))
            }

            Some(quote @ (b'"' | b'\'')) => {
                self.offset += 1;

                match self.take_quoted(quote)? {
                    Some(value) => Ok(Value::String {
                        value,
                        range: Range::new(start, self.offset),
                    }),

                    None => Err(Error::InvalidSyntax("unterminated quoted scalar".to_string())),
                }
            }

            None => Err(Error::InvalidSyntax("unexpected end of flow value".to_string())),

            _ => {
                let text
                    = self.take_flow_plain(false)?;

                if text.is_empty() {
                    return Err(Error::InvalidSyntax("empty flow scalar".to_string()));
                }

                Ok(classify_scalar(&text, Range::new(start, start + text.len())))
            }
        }
    }

    fn parse_flow_key(&mut self) -> Result<(String, Range), Error> {
        let start
            = self.offset;

        if let Some(quote @ (b'"' | b'\'')) = self.peek() {
            self.offset += 1;

            return match self.take_quoted(quote)? {
                Some(key) => Ok((key, Range::new(start, self.offset))),
                None => Err(Error::InvalidSyntax("unterminated flow key".to_string())),
            };
        }

        let key
            = self.take_flow_plain(true)?;

        if key.is_empty() {
            return Err(Error::InvalidSyntax("empty flow key".to_string()));
        }

        Ok((key.clone(), Range::new(start, start + key.len())))
    }

    fn take_flow_plain(&mut self, stop_at_colon: bool) -> Result<String, Error> {
        let start
            = self.offset;

        while self.offset < self.limit {
            match self.input[self.offset] {
                b',' | b']' | b'}' | b'\n' => break,
                b':' if stop_at_colon => break,
                _ => self.offset += 1,
            }
        }

        Ok(std::str::from_utf8(&self.input[start..self.offset])?
            .trim_end()
            .to_string())
    }

    fn skip_flow_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\n') | Some(b'\r') | Some(b'\t')) {
            self.offset += 1;
        }
    }
}

fn classify_scalar(text: &str, range: Range) -> Value {
    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(serde_yaml::Value::Null) => Value::Missing { range },

        Ok(serde_yaml::Value::Bool(value)) => Value::Boolean { value, range },

        Ok(serde_yaml::Value::Number(number)) => Value::Number {
            value: number.as_f64().unwrap_or_default(),
            text: text.to_string(),
            range,
        },

        _ => Value::String {
            value: text.to_string(),
            range,
        },
    }
}

fn fold_lines(lines: &[String]) -> String {
    let mut out
        = String::new();

    for line in lines {
        if line.is_empty() {
            out.push('\n');
        } else {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }

            out.push_str(line);
        }
    }

    out
}

#[cfg(test)]
#[path = "./yaml.test.rs"]
mod yaml_tests;
