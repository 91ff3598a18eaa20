use lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};
use ropey::Rope;

/// An open document as last reported by the client.
#[derive(Debug, Clone)]
pub struct Document {
    /// The URI of the document
    pub uri: Url,
    /// Current version number (from the client)
    pub version: i32,
    /// Language identifier sent with didOpen
    pub language_id: String,
    /// The document content as a Rope for efficient text operations
    pub content: Rope,
    /// Number of change batches applied since open
    pub revision: u64,
}

impl Document {
    pub fn new(uri: Url, language_id: String, version: i32, text: &str) -> Self {
        Self {
            uri,
            version,
            language_id,
            content: Rope::from_str(text),
            revision: 0,
        }
    }

    /// Apply an ordered batch of changes and move to `version`.
    ///
    /// Every batch bumps the revision, even if it leaves the text unchanged.
    pub fn apply_changes(&mut self, version: i32, changes: &[TextDocumentContentChangeEvent]) {
        for change in changes {
            match change.range {
                Some(range) => self.apply_incremental_change(range, &change.text),
                None => self.content = Rope::from_str(&change.text),
            }
        }

        self.version = version;
        self.revision += 1;
    }

    fn apply_incremental_change(&mut self, range: Range, new_text: &str) {
        let mut start = self.position_to_char(range.start);
        let mut end = self.position_to_char(range.end);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        self.content.remove(start..end);
        self.content.insert(start, new_text);
    }

    /// Convert an LSP position (UTF-16 columns) to a rope char index.
    ///
    /// Positions outside the document are clamped, the way editors do.
    pub fn position_to_char(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.content.len_lines() {
            return self.content.len_chars();
        }

        let line_start = self.content.line_to_char(line);
        let target = position.character as usize;
        let mut utf16 = 0;
        let mut chars = 0;
        for ch in self.content.line(line).chars() {
            if ch == '\n' || ch == '\r' || utf16 + ch.len_utf16() > target {
                break;
            }
            utf16 += ch.len_utf16();
            chars += 1;
        }

        line_start + chars
    }

    /// Get the full text content of the document
    pub fn text(&self) -> String {
        self.content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new(
            Url::parse("file:///test.sas").unwrap(),
            "sas".to_string(),
            1,
            text,
        )
    }

    fn patch(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range::new(
                Position::new(start.0, start.1),
                Position::new(end.0, end.1),
            )),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_document_creation() {
        let doc = doc("data x; run;");

        assert_eq!(doc.version, 1);
        assert_eq!(doc.revision, 0);
        assert_eq!(doc.text(), "data x; run;");
        assert_eq!(doc.language_id, "sas");
    }

    #[test]
    fn test_incremental_changes() {
        let mut doc = doc("data x; run;");

        // Replace "x" with "work.y"
        doc.apply_changes(2, &[patch((0, 5), (0, 6), "work.y")]);

        assert_eq!(doc.text(), "data work.y; run;");
        assert_eq!(doc.version, 2);
        assert_eq!(doc.revision, 1);
    }

    #[test]
    fn test_changes_apply_in_order() {
        let mut doc = doc("data x;\nrun;\n");

        doc.apply_changes(
            2,
            &[
                patch((1, 0), (1, 4), "set y;\nrun;"),
                patch((2, 0), (2, 4), "quit;"),
            ],
        );

        assert_eq!(doc.text(), "data x;\nset y;\nquit;\n");
    }

    #[test]
    fn test_full_replace_then_patch() {
        let mut doc = doc("old");

        doc.apply_changes(
            2,
            &[
                TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "proc print; run;".to_string(),
                },
                patch((0, 5), (0, 10), "sort"),
            ],
        );

        assert_eq!(doc.text(), "proc sort; run;");
    }

    #[test]
    fn test_utf16_positions() {
        // '𝄞' occupies two UTF-16 units
        let mut doc = doc("a𝄞b");

        doc.apply_changes(2, &[patch((0, 3), (0, 4), "c")]);

        assert_eq!(doc.text(), "a𝄞c");
    }

    #[test]
    fn test_out_of_range_positions_clamp() {
        let mut doc = doc("run;\n");

        doc.apply_changes(2, &[patch((0, 80), (9, 0), " quit;")]);

        assert_eq!(doc.text(), "run; quit;");
    }

    #[test]
    fn test_reversed_range_is_normalised() {
        let mut doc = doc("abcdef");

        doc.apply_changes(2, &[patch((0, 4), (0, 1), "-")]);

        assert_eq!(doc.text(), "a-ef");
    }

    #[test]
    fn test_no_op_change_bumps_revision() {
        let mut doc = doc("run;");

        doc.apply_changes(2, &[]);

        assert_eq!(doc.text(), "run;");
        assert_eq!(doc.revision, 1);
    }
}
