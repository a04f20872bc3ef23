//! Conversion between `(line, column)` positions and byte offsets.
//!
//! Lines and columns are 1-based; columns count characters, not bytes.
//! Offsets are byte offsets into the buffer the index was built from.

/// A 1-based `(line, column)` position in a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Map a position inside a nested buffer (e.g. an inline template) into
    /// the coordinates of the host buffer, given where the nested buffer starts.
    ///
    /// Segments on the nested buffer's first line are shifted by the origin's
    /// column; later lines are shifted by the origin's line and keep their column.
    pub fn translate_into(self, origin: Position) -> Position {
        if self.line == 1 {
            Position::new(origin.line, origin.column + self.column - 1)
        } else {
            Position::new(origin.line + self.line - 1, self.column)
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Index of line start offsets for a text buffer.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a byte offset. Offsets past the end clamp to the last position.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = self.text[line_start..offset].chars().count() + 1;
        Position::new(line_idx + 1, column)
    }

    /// Byte offset of a position, or `None` when the line or column does not exist.
    pub fn offset(&self, position: Position) -> Option<usize> {
        if position.line == 0 || position.column == 0 {
            return None;
        }
        let line_start = *self.line_starts.get(position.line - 1)?;
        let line_end = self
            .line_starts
            .get(position.line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[line_start..line_end];

        let wanted = position.column - 1;
        let mut chars = line.char_indices();
        for _ in 0..wanted {
            chars.next()?;
        }
        match chars.next() {
            Some((byte, _)) => Some(line_start + byte),
            // Column right after the last character of the line.
            None if line.chars().count() == wanted => Some(line_start + line.len()),
            None => None,
        }
    }

    /// Text of a 1-based line without its trailing newline.
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\r'))
    }
}
