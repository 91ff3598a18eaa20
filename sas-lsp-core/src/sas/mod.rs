//! The default analyzer for SAS programs.
//!
//! Works from a flat lexeme stream and a statement-level outline; it does
//! not build a syntax tree and accepts any text that contains no NUL bytes.

pub mod keywords;
pub mod lexer;
pub mod outline;

use crate::analysis::{Analysis, AnalysisBuilder, SemanticToken, TokenKind};
use crate::completion::{CompletionEntry, CompletionIndex, CompletionKind};
use crate::error::BuildError;
use crate::line_index::LineIndex;
use keywords::{DATASET_OPTIONS, MACRO_STATEMENTS, PROCEDURES, STATEMENTS};
use lexer::{LexKind, Lexeme};
use outline::Outline;
use tracing::trace;

fn utf16_len(text: &str) -> u32 {
    text.chars().map(char::len_utf16).sum::<usize>() as u32
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SasAnalyzer;

impl SasAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn classify(&self, source: &str, lexeme: &Lexeme) -> Option<TokenKind> {
        match lexeme.kind {
            LexKind::Word if keywords::is_keyword(lexeme.text(source)) => Some(TokenKind::Keyword),
            LexKind::Word => None,
            LexKind::Number => Some(TokenKind::Number),
            LexKind::String => Some(TokenKind::String),
            LexKind::Comment => Some(TokenKind::Comment),
            LexKind::MacroWord => Some(TokenKind::Macro),
            LexKind::MacroVar => Some(TokenKind::Variable),
            LexKind::Operator => Some(TokenKind::Operator),
            LexKind::Semicolon | LexKind::LParen | LexKind::RParen | LexKind::Dot => None,
        }
    }

    fn tokens(
        &self,
        source: &str,
        line_index: &LineIndex,
        lexemes: &[Lexeme],
        outline: &Outline,
    ) -> Vec<SemanticToken> {
        let mut tokens = Vec::new();

        for (i, lexeme) in lexemes.iter().enumerate() {
            let (kind, declaration) = match outline.roles.get(&i) {
                Some(&role) => role,
                None => match self.classify(source, lexeme) {
                    Some(kind) => (kind, false),
                    None => continue,
                },
            };

            // Multi-line lexemes become one token per line
            let first_line = line_index.offset_to_position(source, lexeme.start).line as usize;
            let last_line = line_index.offset_to_position(source, lexeme.end).line as usize;
            for line in first_line..=last_line {
                let Some((line_start, line_end)) = line_index.line_bounds(source, line) else {
                    continue;
                };
                let start = lexeme.start.max(line_start);
                let end = lexeme.end.min(line_end);
                if end <= start {
                    continue;
                }
                tokens.push(SemanticToken {
                    line: line as u32,
                    start: utf16_len(&source[line_start..start]),
                    length: utf16_len(&source[start..end]),
                    kind,
                    declaration,
                });
            }
        }

        tokens
    }

    fn completion_index(&self, outline: &Outline) -> CompletionIndex {
        let mut index = CompletionIndex::new();

        for (keyword, doc) in STATEMENTS {
            index.add_general(
                CompletionEntry::new(*keyword, CompletionKind::Keyword).with_documentation(*doc),
            );
        }
        for (procedure, doc) in PROCEDURES {
            index.add_after_word(
                "proc",
                CompletionEntry::new(*procedure, CompletionKind::Procedure)
                    .with_documentation(*doc),
            );
        }
        for (statement, doc) in MACRO_STATEMENTS {
            index.add_after_char(
                '%',
                CompletionEntry::new(*statement, CompletionKind::MacroStatement)
                    .with_documentation(*doc),
            );
        }
        for (option, doc) in DATASET_OPTIONS {
            index.add_after_char(
                '(',
                CompletionEntry::new(*option, CompletionKind::DatasetOption)
                    .with_documentation(*doc),
            );
        }

        for dataset in &outline.datasets {
            let detail = format!("Data set created on line {}", dataset.line + 1);
            let entry = CompletionEntry::new(dataset.name.as_str(), CompletionKind::Dataset)
                .with_detail(detail.as_str());
            index.add_general(entry.clone());
            for word in ["set", "merge", "update"] {
                index.add_after_word(word, entry.clone());
            }

            let (library, member) = dataset
                .name
                .split_once('.')
                .unwrap_or(("work", dataset.name.as_str()));
            index.add_qualified(
                library,
                CompletionEntry::new(member, CompletionKind::Dataset).with_detail(detail),
            );
        }

        for definition in &outline.macros {
            index.add_after_char(
                '%',
                CompletionEntry::new(format!("%{}", definition.name), CompletionKind::Macro)
                    .with_detail(format!("Macro defined on line {}", definition.line + 1)),
            );
        }
        for variable in &outline.macro_variables {
            index.add_after_char(
                '&',
                CompletionEntry::new(format!("&{}", variable.name), CompletionKind::MacroVariable)
                    .with_detail(format!("%LET on line {}", variable.line + 1)),
            );
        }

        index
    }
}

impl AnalysisBuilder for SasAnalyzer {
    fn analyze(&self, source: &str) -> Result<Analysis, BuildError> {
        if let Some(offset) = source.find('\0') {
            return Err(BuildError::Malformed(format!("NUL byte at offset {}", offset)));
        }

        let line_index = LineIndex::new(source);
        let lexemes = lexer::lex(source);
        let outline = outline::build(source, &line_index, &lexemes);
        let tokens = self.tokens(source, &line_index, &lexemes, &outline);
        let completion = self.completion_index(&outline);

        trace!(
            "Analyzed {} lexemes into {} tokens and {} symbols",
            lexemes.len(),
            tokens.len(),
            outline.symbols.len()
        );

        Ok(Analysis {
            tokens,
            symbols: outline.symbols,
            fold_ranges: outline.fold_ranges,
            completion,
        })
    }
}
