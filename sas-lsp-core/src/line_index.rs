//! Conversion between byte offsets and LSP positions.
//!
//! LSP positions count characters in UTF-16 code units. The index stores the
//! byte offset of every line start so lookups only scan a single line.

use lsp_types::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line (line 0 starts at 0).
    line_starts: Vec<usize>,
    /// Total length of the source in bytes.
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        // LF, CRLF and a lone CR end a line; nothing else does
        let bytes = source.as_bytes();
        let mut line_starts = vec![0];
        for (i, &byte) in bytes.iter().enumerate() {
            let ends_line = match byte {
                b'\n' => true,
                b'\r' => bytes.get(i + 1) != Some(&b'\n'),
                _ => false,
            };
            if ends_line {
                line_starts.push(i + 1);
            }
        }

        Self {
            line_starts,
            len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte range of a line's content, excluding its line terminator.
    pub fn line_bounds(&self, source: &str, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let mut end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        if end > start && source.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some((start, end))
    }

    /// Text of a line without its terminator.
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> Option<&'a str> {
        let (start, end) = self.line_bounds(source, line)?;
        source.get(start..end)
    }

    /// Convert a byte offset into a UTF-16 based position.
    ///
    /// Offsets past the end are clamped to the end of the text.
    pub fn offset_to_position(&self, source: &str, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let character: usize = source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().map(char::len_utf16).sum())
            .unwrap_or(0);

        Position {
            line: line as u32,
            character: character as u32,
        }
    }

    /// Convert a UTF-16 based position into a byte offset.
    ///
    /// Lines past the end clamp to the end of the text and characters past
    /// the end of a line clamp to the end of that line.
    pub fn position_to_offset(&self, source: &str, position: Position) -> usize {
        let Some((start, end)) = self.line_bounds(source, position.line as usize) else {
            return self.len;
        };

        let target = position.character as usize;
        let mut utf16 = 0;
        let mut offset = start;
        for ch in source[start..end].chars() {
            if utf16 + ch.len_utf16() > target {
                break;
            }
            utf16 += ch.len_utf16();
            offset += ch.len_utf8();
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_round_trip_on_ascii() {
        let source = "data x;\nrun;\n";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.offset_to_position(source, 8), Position::new(1, 0));
        assert_eq!(index.position_to_offset(source, Position::new(1, 3)), 11);
    }

    #[test]
    fn test_utf16_columns() {
        // 'é' is one UTF-16 unit (two bytes), '𝄞' is two units (four bytes)
        let source = "é𝄞x";
        let index = LineIndex::new(source);

        assert_eq!(index.offset_to_position(source, 6), Position::new(0, 3));
        assert_eq!(index.position_to_offset(source, Position::new(0, 3)), 6);
        // Halfway into a surrogate pair stays before the character
        assert_eq!(index.position_to_offset(source, Position::new(0, 2)), 2);
    }

    #[test]
    fn test_lone_carriage_return_ends_a_line() {
        let source = "data x;\rrun;\r\r\nquit;";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_text(source, 0), Some("data x;"));
        assert_eq!(index.line_text(source, 1), Some("run;"));
        assert_eq!(index.line_text(source, 2), Some(""));
        assert_eq!(index.line_text(source, 3), Some("quit;"));
        assert_eq!(index.offset_to_position(source, 8), Position::new(1, 0));
        assert_eq!(index.position_to_offset(source, Position::new(1, 99)), 12);
    }

    #[test]
    fn test_other_separators_stay_inside_a_line() {
        let source = "a;\x0cb;\u{2028}c;";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 1);
        assert_eq!(index.offset_to_position(source, source.len()), Position::new(0, 8));
    }

    #[test]
    fn test_clamping() {
        let source = "ab\r\ncd";
        let index = LineIndex::new(source);

        assert_eq!(index.position_to_offset(source, Position::new(0, 99)), 2);
        assert_eq!(index.position_to_offset(source, Position::new(7, 0)), source.len());
        assert_eq!(index.line_text(source, 0), Some("ab"));
        assert_eq!(index.offset_to_position(source, 100), Position::new(1, 2));
    }
}
