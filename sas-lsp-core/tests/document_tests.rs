use lsp_types::*;
use proptest::prelude::*;
use sas_lsp_core::{Document, LineIndex};

fn create_test_document(content: &str) -> Document {
    Document::new(
        Url::parse("file:///test.sas").unwrap(),
        "sas".to_string(),
        1,
        content,
    )
}

fn create_range_change(
    start: (u32, u32),
    end: (u32, u32),
    text: &str,
) -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: Some(Range::new(
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
        )),
        range_length: None,
        text: text.to_string(),
    }
}

/// Test: Document creation keeps every field the client sent
#[test]
fn test_document_creation() {
    let document = create_test_document("data x;\nrun;");

    assert_eq!(document.uri.as_str(), "file:///test.sas");
    assert_eq!(document.version, 1);
    assert_eq!(document.language_id, "sas");
    assert_eq!(document.text(), "data x;\nrun;");
    assert_eq!(document.revision, 0);
}

/// Test: Edits in one batch apply in order, each against the previous result
#[test]
fn test_batch_applies_in_order() {
    let mut document = create_test_document("data x;\nrun;");

    document.apply_changes(
        2,
        &[
            // Input: rename x to y, then append a SET statement after it
            create_range_change((0, 5), (0, 6), "y"),
            create_range_change((0, 7), (0, 7), " set x;"),
        ],
    );

    // Expected: second edit sees the first one's output
    assert_eq!(document.text(), "data y; set x;\nrun;");
    assert_eq!(document.version, 2);
    assert_eq!(document.revision, 1);
}

/// Test: A full replacement followed by a range edit in the same batch
#[test]
fn test_full_replace_then_range_edit() {
    let mut document = create_test_document("old");

    document.apply_changes(
        2,
        &[
            TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "proc print;\nrun;".to_string(),
            },
            create_range_change((1, 0), (1, 3), "quit"),
        ],
    );

    assert_eq!(document.text(), "proc print;\nquit;");
}

/// Test: Columns are UTF-16 code units
#[test]
fn test_utf16_columns() {
    // "😀" is two UTF-16 units, "é" is one
    let mut document = create_test_document("x = '😀é';");

    document.apply_changes(2, &[create_range_change((0, 7), (0, 8), "e")]);

    assert_eq!(document.text(), "x = '😀e';");
}

/// Test: Positions past the end are clamped instead of failing
#[test]
fn test_out_of_range_positions_clamp() {
    let mut document = create_test_document("run;\nquit;");

    document.apply_changes(2, &[create_range_change((0, 99), (0, 99), " /* end */")]);
    assert_eq!(document.text(), "run; /* end */\nquit;");

    document.apply_changes(3, &[create_range_change((40, 0), (41, 0), "\n%put done;")]);
    assert_eq!(document.text(), "run; /* end */\nquit;\n%put done;");
}

/// Test: An empty batch still counts as a change
#[test]
fn test_empty_batch_bumps_revision() {
    let mut document = create_test_document("run;");

    document.apply_changes(2, &[]);

    assert_eq!(document.text(), "run;");
    assert_eq!(document.version, 2);
    assert_eq!(document.revision, 1);
}

/// Test: Only LF, CRLF and a lone CR start a new line
#[test]
fn test_line_breaks_follow_lsp() {
    // Form feed is not a line break
    let mut document = create_test_document("run;\x0cx;\nquit;");
    document.apply_changes(2, &[create_range_change((1, 0), (1, 0), "Z")]);
    assert_eq!(document.text(), "run;\x0cx;\nZquit;");

    // Neither are NEL and the Unicode line and paragraph separators
    let mut document = create_test_document("a;\u{85}b;\u{2028}c;\u{2029}d;\ne;");
    document.apply_changes(2, &[create_range_change((1, 0), (1, 2), "f;")]);
    assert_eq!(document.text(), "a;\u{85}b;\u{2028}c;\u{2029}d;\nf;");

    // A lone CR is
    let mut document = create_test_document("data x;\rrun;");
    document.apply_changes(2, &[create_range_change((1, 0), (1, 3), "quit")]);
    assert_eq!(document.text(), "data x;\rquit;");
}

/// Test: The end of a line never falls between CR and LF
#[test]
fn test_line_end_stops_before_crlf() {
    let mut document = create_test_document("run;\r\nquit;");

    document.apply_changes(2, &[create_range_change((0, 99), (0, 99), " *")]);

    assert_eq!(document.text(), "run; *\r\nquit;");
}

fn splice(text: &str, start: Position, end: Position, new_text: &str) -> String {
    let index = LineIndex::new(text);
    let mut start = index.position_to_offset(text, start);
    let mut end = index.position_to_offset(text, end);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    let mut result = text.to_string();
    result.replace_range(start..end, new_text);
    result
}

proptest! {
    /// Range edits on the rope agree with plain string splicing
    #[test]
    fn prop_range_edit_matches_splice(
        text in "[a-z; \n\r\x0c\u{2028}]{0,60}",
        start in (0u32..6, 0u32..12),
        end in (0u32..6, 0u32..12),
        insert in "[a-z;\n\r\x0c]{0,8}",
    ) {
        let mut document = create_test_document(&text);
        let start = Position::new(start.0, start.1);
        let end = Position::new(end.0, end.1);

        document.apply_changes(2, &[TextDocumentContentChangeEvent {
            range: Some(Range::new(start, end)),
            range_length: None,
            text: insert.clone(),
        }]);

        prop_assert_eq!(document.text(), splice(&text, start, end, &insert));
    }
}
