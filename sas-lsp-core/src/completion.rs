//! Completion index and the hover lookups that share it.
//!
//! The index is filled by the analyzer and knows nothing about the language
//! itself: entries are grouped by the context that makes them relevant
//! (a preceding keyword, a sigil such as `%`, or a `libref.` qualifier).

use crate::line_index::LineIndex;
use lsp_types::{Position, Range};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompletionKind {
    Keyword,
    Procedure,
    MacroStatement,
    Macro,
    MacroVariable,
    Dataset,
    DatasetOption,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
}

impl CompletionEntry {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Label without a leading sigil, used for prefix matching.
    fn match_text(&self) -> &str {
        self.label.trim_start_matches(|c: char| c == '%' || c == '&')
    }
}

/// Candidates for one completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionMatch<'a> {
    pub entries: Vec<&'a CompletionEntry>,
    /// Range of the already typed text, including any sigil
    pub replace: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    /// Markdown content
    pub contents: String,
    pub range: Range,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    general: Vec<CompletionEntry>,
    after_word: HashMap<String, Vec<CompletionEntry>>,
    after_char: HashMap<char, Vec<CompletionEntry>>,
    qualified: HashMap<String, Vec<CompletionEntry>>,
}

fn push_unique(bucket: &mut Vec<CompletionEntry>, entry: CompletionEntry) {
    if !bucket
        .iter()
        .any(|existing| existing.label.eq_ignore_ascii_case(&entry.label))
    {
        bucket.push(entry);
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Word surrounding a cursor, split into the parts the lookups need.
struct WordContext<'s> {
    /// Characters of the word before the cursor
    prefix: &'s str,
    /// Whole word under the cursor
    word: &'s str,
    /// Byte offsets of the whole word
    word_start: usize,
    word_end: usize,
    /// Character immediately before the word
    trigger: Option<char>,
    /// Previous word on the line, lowercased
    previous: Option<String>,
}

impl<'s> WordContext<'s> {
    fn at(source: &'s str, line_index: &LineIndex, position: Position) -> Option<Self> {
        let (line_start, line_end) = line_index.line_bounds(source, position.line as usize)?;
        let line = &source[line_start..line_end];
        let offset = line_index.position_to_offset(source, position);
        let cursor = offset.clamp(line_start, line_end) - line_start;

        let word_start = line[..cursor]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(cursor);
        let word_end = line[cursor..]
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map(|(i, _)| cursor + i)
            .unwrap_or(line.len());

        let before = &line[..word_start];
        let trigger = before.chars().next_back();

        // Skip the trigger (if it is punctuation) and blanks, then read a word
        let rest = match trigger {
            Some(c) if !c.is_whitespace() => &before[..before.len() - c.len_utf8()],
            _ => before,
        }
        .trim_end();
        let previous: String = rest
            .chars()
            .rev()
            .take_while(|c| is_word_char(*c))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        Some(Self {
            prefix: &line[word_start..cursor],
            word: &line[word_start..word_end],
            word_start: line_start + word_start,
            word_end: line_start + word_end,
            trigger,
            previous: (!previous.is_empty()).then(|| previous.to_lowercase()),
        })
    }

    fn sigil(&self) -> Option<char> {
        self.trigger.filter(|c| matches!(c, '%' | '&'))
    }
}

impl CompletionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry offered when no more specific context applies.
    pub fn add_general(&mut self, entry: CompletionEntry) {
        push_unique(&mut self.general, entry);
    }

    /// Entry offered when the previous word is `word`.
    pub fn add_after_word(&mut self, word: &str, entry: CompletionEntry) {
        push_unique(self.after_word.entry(word.to_lowercase()).or_default(), entry);
    }

    /// Entry offered when the typed word directly follows `trigger`.
    pub fn add_after_char(&mut self, trigger: char, entry: CompletionEntry) {
        push_unique(self.after_char.entry(trigger).or_default(), entry);
    }

    /// Entry offered after `qualifier.`, e.g. a library reference.
    pub fn add_qualified(&mut self, qualifier: &str, entry: CompletionEntry) {
        push_unique(self.qualified.entry(qualifier.to_lowercase()).or_default(), entry);
    }

    pub fn len(&self) -> usize {
        self.general.len()
            + self.after_word.values().map(Vec::len).sum::<usize>()
            + self.after_char.values().map(Vec::len).sum::<usize>()
            + self.qualified.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_for(&self, context: &WordContext<'_>) -> &[CompletionEntry] {
        let empty: &[CompletionEntry] = &[];
        match context.trigger {
            Some('.') => context
                .previous
                .as_ref()
                .and_then(|qualifier| self.qualified.get(qualifier))
                .map_or(empty, Vec::as_slice),
            Some(c) if self.after_char.contains_key(&c) => self.after_char[&c].as_slice(),
            _ => context
                .previous
                .as_ref()
                .and_then(|word| self.after_word.get(word))
                .map_or(self.general.as_slice(), Vec::as_slice),
        }
    }

    /// Candidates for the word being typed at `position`.
    pub fn complete(
        &self,
        source: &str,
        line_index: &LineIndex,
        position: Position,
    ) -> CompletionMatch<'_> {
        let Some(context) = WordContext::at(source, line_index, position) else {
            return CompletionMatch {
                entries: Vec::new(),
                replace: Range::new(position, position),
            };
        };

        let prefix = context.prefix.to_lowercase();
        let entries = self
            .bucket_for(&context)
            .iter()
            .filter(|entry| entry.match_text().to_lowercase().starts_with(&prefix))
            .collect();

        let start = context.word_start - context.sigil().map_or(0, char::len_utf8);
        CompletionMatch {
            entries,
            replace: Range::new(line_index.offset_to_position(source, start), position),
        }
    }

    /// Look up the word under `position` and describe it.
    pub fn hover(
        &self,
        source: &str,
        line_index: &LineIndex,
        position: Position,
    ) -> Option<HoverInfo> {
        let context = WordContext::at(source, line_index, position)?;
        if context.word.is_empty() {
            return None;
        }

        let wanted = match context.sigil() {
            Some(sigil) => format!("{sigil}{}", context.word),
            None => context.word.to_string(),
        };
        let matches = |entry: &&CompletionEntry| entry.label.eq_ignore_ascii_case(&wanted);

        let entry = self.bucket_for(&context).iter().find(matches).or_else(|| {
            context
                .sigil()
                .is_none()
                .then(|| self.general.iter().find(matches))
                .flatten()
        })?;

        if entry.detail.is_none() && entry.documentation.is_none() {
            return None;
        }
        let mut contents = format!("```sas\n{}\n```", entry.label);
        for part in [&entry.detail, &entry.documentation].into_iter().flatten() {
            contents.push_str("\n\n");
            contents.push_str(part);
        }

        let start = context.word_start - context.sigil().map_or(0, char::len_utf8);
        Some(HoverInfo {
            contents,
            range: Range::new(
                line_index.offset_to_position(source, start),
                line_index.offset_to_position(source, context.word_end),
            ),
        })
    }
}
