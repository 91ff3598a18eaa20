//! Analysis results and the builder capability that produces them.
//!
//! An [`AnalysisResult`] is immutable once built. The cache hands out
//! `Arc<AnalysisResult>` so request handlers can project views from it
//! without holding any workspace lock.

use crate::completion::{CompletionIndex, CompletionMatch, HoverInfo};
use crate::error::BuildError;
use crate::line_index::LineIndex;
use lsp_types::{FoldingRangeKind, Position, Range, SymbolKind};
use serde::Serialize;
use std::sync::Arc;

/// Classification of a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Keyword,
    String,
    Number,
    Comment,
    Macro,
    Variable,
    Operator,
    /// Procedure names after `PROC`
    Function,
    /// Data set names
    Struct,
}

/// A classified span on a single line. Columns are UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticToken {
    pub line: u32,
    pub start: u32,
    pub length: u32,
    pub kind: TokenKind,
    /// Set when the token names something at its definition site
    pub declaration: bool,
}

/// A named region of the document, possibly containing other symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub detail: Option<String>,
    pub range: Range,
    pub selection_range: Range,
    pub children: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRange {
    pub start_line: u32,
    pub end_line: u32,
    pub kind: Option<FoldingRangeKind>,
}

/// Everything a builder derives from one document text.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub tokens: Vec<SemanticToken>,
    pub symbols: Vec<Symbol>,
    pub fold_ranges: Vec<FoldRange>,
    pub completion: CompletionIndex,
}

impl Analysis {
    /// Reject results that would produce invalid protocol payloads.
    ///
    /// Tokens must be sorted, must not overlap and must lie inside the text.
    /// Fold ranges must point at existing lines.
    pub fn validate(&self, source: &str, line_index: &LineIndex) -> Result<(), BuildError> {
        let line_count = line_index.line_count() as u32;
        let mut previous: Option<(u32, u32)> = None;

        for token in &self.tokens {
            if token.line >= line_count {
                return Err(BuildError::Invalid(format!(
                    "token on line {} but document has {} lines",
                    token.line, line_count
                )));
            }
            let line_len: u32 = line_index
                .line_text(source, token.line as usize)
                .map(|text| text.chars().map(char::len_utf16).sum::<usize>() as u32)
                .unwrap_or(0);
            if token.length == 0 || token.start + token.length > line_len {
                return Err(BuildError::Invalid(format!(
                    "token {}:{}+{} outside line of length {}",
                    token.line, token.start, token.length, line_len
                )));
            }
            if let Some((line, end)) = previous {
                if token.line < line || (token.line == line && token.start < end) {
                    return Err(BuildError::Invalid(format!(
                        "token {}:{} is out of order",
                        token.line, token.start
                    )));
                }
            }
            previous = Some((token.line, token.start + token.length));
        }

        for fold in &self.fold_ranges {
            if fold.start_line > fold.end_line || fold.end_line >= line_count {
                return Err(BuildError::Invalid(format!(
                    "fold range {}..{} outside document",
                    fold.start_line, fold.end_line
                )));
            }
        }

        Ok(())
    }
}

/// Turns document text into an [`Analysis`].
///
/// Implementations are called from tokio's blocking pool and may take time;
/// they must not assume anything about the caller's locks.
#[cfg_attr(test, mockall::automock)]
pub trait AnalysisBuilder: Send + Sync {
    fn analyze(&self, source: &str) -> Result<Analysis, BuildError>;
}

/// A built analysis tagged with the document version it was computed from.
#[derive(Debug)]
pub struct AnalysisResult {
    source_version: i32,
    source: Arc<str>,
    line_index: LineIndex,
    analysis: Analysis,
}

impl AnalysisResult {
    pub fn new(
        source_version: i32,
        source: Arc<str>,
        line_index: LineIndex,
        analysis: Analysis,
    ) -> Self {
        Self {
            source_version,
            source,
            line_index,
            analysis,
        }
    }

    pub fn source_version(&self) -> i32 {
        self.source_version
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn tokens(&self) -> &[SemanticToken] {
        &self.analysis.tokens
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.analysis.symbols
    }

    /// Depth-first flattening of the symbol tree with container names.
    pub fn flat_symbols(&self) -> Vec<(&Symbol, Option<&str>)> {
        fn walk<'a>(
            symbols: &'a [Symbol],
            container: Option<&'a str>,
            out: &mut Vec<(&'a Symbol, Option<&'a str>)>,
        ) {
            for symbol in symbols {
                out.push((symbol, container));
                walk(&symbol.children, Some(&symbol.name), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.analysis.symbols, None, &mut out);
        out
    }

    pub fn fold_ranges(&self) -> &[FoldRange] {
        &self.analysis.fold_ranges
    }

    pub fn completion_index(&self) -> &CompletionIndex {
        &self.analysis.completion
    }

    pub fn completions_at(&self, position: Position) -> CompletionMatch<'_> {
        self.analysis
            .completion
            .complete(&self.source, &self.line_index, position)
    }

    pub fn hover_at(&self, position: Position) -> Option<HoverInfo> {
        self.analysis
            .completion
            .hover(&self.source, &self.line_index, position)
    }
}
