//! Whitespace-only document formatting.

use crate::analysis::AnalysisResult;
use crate::line_index::LineIndex;
use lsp_types::{FormattingOptions, Range, TextEdit};

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Edits for the analyzed text, ordered by position and non-overlapping.
pub fn format(result: &AnalysisResult, options: &FormattingOptions) -> Vec<TextEdit> {
    format_text(result.source(), result.line_index(), options)
}

pub fn format_text(
    source: &str,
    line_index: &LineIndex,
    options: &FormattingOptions,
) -> Vec<TextEdit> {
    let trim_trailing = options.trim_trailing_whitespace != Some(false);
    let insert_final = options.insert_final_newline == Some(true);
    let trim_final = options.trim_final_newlines == Some(true);

    let edit = |start: usize, end: usize, text: &str| TextEdit {
        range: Range::new(
            line_index.offset_to_position(source, start),
            line_index.offset_to_position(source, end),
        ),
        new_text: text.to_string(),
    };

    let last_content_line = (0..line_index.line_count())
        .rev()
        .find(|&line| {
            line_index
                .line_text(source, line)
                .is_some_and(|text| text.chars().any(|c| !c.is_whitespace()))
        });

    let mut edits = Vec::new();
    for line in 0..line_index.line_count() {
        if trim_final && last_content_line.is_some_and(|last| line > last) {
            break;
        }
        let Some((start, end)) = line_index.line_bounds(source, line) else {
            continue;
        };
        let trimmed = source[start..end].trim_end_matches(is_blank).len();
        if trim_trailing && start + trimmed < end {
            edits.push(edit(start + trimmed, end, ""));
        }
    }

    let Some(last) = last_content_line else {
        return edits;
    };
    let Some((_, content_end)) = line_index.line_bounds(source, last) else {
        return edits;
    };
    let newline = if source.contains("\r\n") {
        "\r\n"
    } else if source.contains('\r') {
        "\r"
    } else {
        "\n"
    };
    let first_break = line_index
        .line_bounds(source, last + 1)
        .map(|(next_start, _)| &source[content_end..next_start]);

    if trim_final {
        let wanted = match first_break {
            Some(line_break) => line_break,
            None if insert_final => newline,
            None => "",
        };
        if &source[content_end..] != wanted {
            edits.push(edit(content_end, source.len(), wanted));
        }
    } else if insert_final && first_break.is_none() {
        edits.push(edit(source.len(), source.len(), newline));
    }

    edits
}
