//! Statement-level structure: steps, macros, definitions and fold ranges.

use super::lexer::{LexKind, Lexeme};
use crate::analysis::{FoldRange, Symbol, TokenKind};
use crate::line_index::LineIndex;
use lsp_types::{FoldingRangeKind, Range, SymbolKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static REGION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*[%/]?\*\s*region\b").expect("region start pattern"));
static REGION_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*[%/]?\*\s*endregion\b").expect("region end pattern"));

pub fn is_region_start(comment: &str) -> bool {
    REGION_START.is_match(comment)
}

pub fn is_region_end(comment: &str) -> bool {
    REGION_END.is_match(comment)
}

/// A name defined somewhere in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    /// Zero-based line of the definition
    pub line: u32,
}

#[derive(Debug, Default)]
pub struct Outline {
    pub symbols: Vec<Symbol>,
    pub fold_ranges: Vec<FoldRange>,
    pub datasets: Vec<Definition>,
    pub macros: Vec<Definition>,
    pub macro_variables: Vec<Definition>,
    /// Highlighting decided by context, keyed by lexeme index
    pub roles: HashMap<usize, (TokenKind, bool)>,
}

/// Lexeme indices of one statement, comments excluded.
struct Statement {
    ids: Vec<usize>,
    start: usize,
    end: usize,
}

fn split_statements(lexemes: &[Lexeme]) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut ids = Vec::new();

    for (i, lexeme) in lexemes.iter().enumerate() {
        if lexeme.kind == LexKind::Comment {
            continue;
        }
        ids.push(i);
        if lexeme.kind == LexKind::Semicolon {
            statements.push(Statement {
                start: lexemes[ids[0]].start,
                end: lexeme.end,
                ids: std::mem::take(&mut ids),
            });
        }
    }
    if let (Some(&first), Some(&last)) = (ids.first(), ids.last()) {
        statements.push(Statement {
            start: lexemes[first].start,
            end: lexemes[last].end,
            ids,
        });
    }

    statements
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepKind {
    Data,
    Proc,
}

struct StepFrame {
    kind: StepKind,
    name: String,
    selection: (usize, usize),
    start: usize,
}

struct MacroFrame {
    name: String,
    selection: (usize, usize),
    start: usize,
    children: Vec<Symbol>,
}

/// A possibly qualified name (`lib.member`) inside a statement.
struct NameRef {
    text: String,
    start: usize,
    end: usize,
    ids: Vec<usize>,
}

struct OutlineBuilder<'a> {
    source: &'a str,
    line_index: &'a LineIndex,
    lexemes: &'a [Lexeme],
    step: Option<StepFrame>,
    macros: Vec<MacroFrame>,
    outline: Outline,
}

impl<'a> OutlineBuilder<'a> {
    fn text(&self, id: usize) -> &'a str {
        self.lexemes[id].text(self.source)
    }

    fn kind(&self, id: usize) -> LexKind {
        self.lexemes[id].kind
    }

    fn range(&self, start: usize, end: usize) -> Range {
        Range::new(
            self.line_index.offset_to_position(self.source, start),
            self.line_index.offset_to_position(self.source, end),
        )
    }

    fn line_of(&self, offset: usize) -> u32 {
        self.line_index.offset_to_position(self.source, offset).line
    }

    fn is_word(&self, id: usize, word: &str) -> bool {
        self.kind(id) == LexKind::Word && self.text(id).eq_ignore_ascii_case(word)
    }

    fn is_equals(&self, id: usize) -> bool {
        self.kind(id) == LexKind::Operator && self.text(id) == "="
    }

    /// Read `word` or `word.word` starting at `ids[i]`.
    fn name_at(&self, ids: &[usize], i: usize) -> Option<NameRef> {
        let first = *ids.get(i)?;
        if self.kind(first) != LexKind::Word {
            return None;
        }
        let (Some(&dot), Some(&member)) = (ids.get(i + 1), ids.get(i + 2)) else {
            return Some(self.simple_name(first));
        };
        if self.kind(dot) == LexKind::Dot && self.kind(member) == LexKind::Word {
            return Some(NameRef {
                text: format!("{}.{}", self.text(first), self.text(member)),
                start: self.lexemes[first].start,
                end: self.lexemes[member].end,
                ids: vec![first, member],
            });
        }
        Some(self.simple_name(first))
    }

    fn simple_name(&self, id: usize) -> NameRef {
        NameRef {
            text: self.text(id).to_string(),
            start: self.lexemes[id].start,
            end: self.lexemes[id].end,
            ids: vec![id],
        }
    }

    /// Data set names listed at paren depth zero, skipping `option=value` pairs.
    fn dataset_list(&self, ids: &[usize]) -> Vec<NameRef> {
        let mut names = Vec::new();
        let mut depth = 0usize;
        let mut i = 0;

        while i < ids.len() {
            match self.kind(ids[i]) {
                LexKind::LParen => depth += 1,
                LexKind::RParen => depth = depth.saturating_sub(1),
                LexKind::Word if depth == 0 => {
                    if ids.get(i + 1).is_some_and(|&next| self.is_equals(next)) {
                        i += 3;
                        continue;
                    }
                    if let Some(name) = self.name_at(ids, i) {
                        i += if name.ids.len() == 2 { 3 } else { 1 };
                        names.push(name);
                        continue;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        names
    }

    /// Value of a `key=name` option anywhere in the statement.
    fn option_dataset(&self, ids: &[usize], key: &str) -> Option<NameRef> {
        (0..ids.len().saturating_sub(2))
            .find(|&i| self.is_word(ids[i], key) && self.is_equals(ids[i + 1]))
            .and_then(|i| self.name_at(ids, i + 2))
    }

    fn mark(&mut self, name: &NameRef, kind: TokenKind, declaration: bool) {
        for &id in &name.ids {
            self.outline.roles.insert(id, (kind, declaration));
        }
    }

    fn define_dataset(&mut self, name: &NameRef) {
        self.mark(name, TokenKind::Struct, true);
        if !name.text.eq_ignore_ascii_case("_null_") {
            let line = self.line_of(name.start);
            self.outline.datasets.push(Definition {
                name: name.text.clone(),
                line,
            });
        }
    }

    fn push_symbol(&mut self, symbol: Symbol) {
        match self.macros.last_mut() {
            Some(frame) => frame.children.push(symbol),
            None => self.outline.symbols.push(symbol),
        }
    }

    fn close_step(&mut self, end: usize) {
        let Some(step) = self.step.take() else {
            return;
        };
        let detail = match step.kind {
            StepKind::Data => "DATA step",
            StepKind::Proc => "PROC step",
        };
        let kind = match step.kind {
            StepKind::Data => SymbolKind::STRUCT,
            StepKind::Proc => SymbolKind::FUNCTION,
        };
        let symbol = Symbol {
            name: step.name,
            kind,
            detail: Some(detail.to_string()),
            range: self.range(step.start, end.max(step.start)),
            selection_range: self.range(step.selection.0, step.selection.1),
            children: Vec::new(),
        };
        self.push_symbol(symbol);
    }

    fn close_macro(&mut self, end: usize) {
        let Some(frame) = self.macros.pop() else {
            return;
        };
        let symbol = Symbol {
            name: frame.name,
            kind: SymbolKind::MODULE,
            detail: Some("macro".to_string()),
            range: self.range(frame.start, end.max(frame.start)),
            selection_range: self.range(frame.selection.0, frame.selection.1),
            children: frame.children,
        };
        self.push_symbol(symbol);
    }

    fn open_data_step(&mut self, statement: &Statement) {
        let keyword = statement.ids[0];
        let outputs = self.dataset_list(&statement.ids[1..]);
        for name in &outputs {
            self.define_dataset(name);
        }

        let (name, selection) = match outputs.first() {
            Some(first) => (first.text.clone(), (first.start, first.end)),
            None => (
                "_data_".to_string(),
                (self.lexemes[keyword].start, self.lexemes[keyword].end),
            ),
        };
        self.step = Some(StepFrame {
            kind: StepKind::Data,
            name,
            selection,
            start: statement.start,
        });
    }

    fn open_proc_step(&mut self, statement: &Statement) {
        let keyword = statement.ids[0];
        let (name, selection) = match statement.ids.get(1) {
            Some(&id) if self.kind(id) == LexKind::Word => {
                self.outline.roles.insert(id, (TokenKind::Function, false));
                let lexeme = self.lexemes[id];
                (self.text(id).to_string(), (lexeme.start, lexeme.end))
            }
            _ => {
                let lexeme = self.lexemes[keyword];
                ("proc".to_string(), (lexeme.start, lexeme.end))
            }
        };

        if let Some(input) = self.option_dataset(&statement.ids, "data") {
            self.mark(&input, TokenKind::Struct, false);
        }
        if let Some(output) = self.option_dataset(&statement.ids, "out") {
            self.define_dataset(&output);
        }

        self.step = Some(StepFrame {
            kind: StepKind::Proc,
            name,
            selection,
            start: statement.start,
        });
    }

    fn open_macro(&mut self, statement: &Statement) {
        let keyword = self.lexemes[statement.ids[0]];
        let (name, selection) = match statement.ids.get(1) {
            Some(&id) if self.kind(id) == LexKind::Word => {
                self.outline.roles.insert(id, (TokenKind::Macro, true));
                let lexeme = self.lexemes[id];
                let line = self.line_of(lexeme.start);
                self.outline.macros.push(Definition {
                    name: self.text(id).to_string(),
                    line,
                });
                (self.text(id).to_string(), (lexeme.start, lexeme.end))
            }
            _ => ("%macro".to_string(), (keyword.start, keyword.end)),
        };

        self.macros.push(MacroFrame {
            name,
            selection,
            start: statement.start,
            children: Vec::new(),
        });
    }

    fn statement(&mut self, statement: &Statement, previous_end: usize) {
        let head = statement.ids[0];
        let kind = self.kind(head);
        let word = self.text(head).to_ascii_lowercase();

        match (kind, word.as_str()) {
            (LexKind::Word, "data") => {
                self.close_step(previous_end);
                self.open_data_step(statement);
            }
            (LexKind::Word, "proc") => {
                self.close_step(previous_end);
                self.open_proc_step(statement);
            }
            (LexKind::Word, "run" | "quit") => self.close_step(statement.end),
            (LexKind::Word, "set" | "merge" | "update") => {
                for name in self.dataset_list(&statement.ids[1..]) {
                    self.mark(&name, TokenKind::Struct, false);
                }
            }
            (LexKind::MacroWord, "%macro") => {
                self.close_step(previous_end);
                self.open_macro(statement);
            }
            (LexKind::MacroWord, "%mend") => {
                self.close_step(previous_end);
                self.close_macro(statement.end);
            }
            (LexKind::MacroWord, "%let") => {
                let name = statement.ids.get(1).filter(|&&id| self.kind(id) == LexKind::Word);
                if let Some(&id) = name {
                    self.outline.roles.insert(id, (TokenKind::Variable, true));
                    let line = self.line_of(self.lexemes[id].start);
                    self.outline.macro_variables.push(Definition {
                        name: self.text(id).to_string(),
                        line,
                    });
                }
            }
            _ => {}
        }
    }

    fn symbol_folds(symbols: &[Symbol], out: &mut Vec<FoldRange>) {
        for symbol in symbols {
            if symbol.range.end.line > symbol.range.start.line {
                out.push(FoldRange {
                    start_line: symbol.range.start.line,
                    end_line: symbol.range.end.line,
                    kind: None,
                });
            }
            Self::symbol_folds(&symbol.children, out);
        }
    }

    fn comment_folds(&mut self) {
        let lexemes = self.lexemes;
        let mut regions = Vec::new();
        for lexeme in lexemes.iter().filter(|l| l.kind == LexKind::Comment) {
            let text = lexeme.text(self.source);
            let start_line = self.line_of(lexeme.start);
            let end_line = self.line_of(lexeme.end);

            if is_region_start(text) {
                regions.push(start_line);
            } else if is_region_end(text) {
                if let Some(open) = regions.pop() {
                    if start_line > open {
                        self.outline.fold_ranges.push(FoldRange {
                            start_line: open,
                            end_line: start_line,
                            kind: Some(FoldingRangeKind::Region),
                        });
                    }
                }
            } else if end_line > start_line {
                self.outline.fold_ranges.push(FoldRange {
                    start_line,
                    end_line,
                    kind: Some(FoldingRangeKind::Comment),
                });
            }
        }
    }

    fn finish(mut self) -> Outline {
        let end = self.lexemes.last().map_or(0, |l| l.end);
        self.close_step(end);
        while !self.macros.is_empty() {
            self.close_macro(end);
        }

        let mut folds = Vec::new();
        Self::symbol_folds(&self.outline.symbols, &mut folds);
        self.outline.fold_ranges.extend(folds);
        self.comment_folds();
        self.outline
            .fold_ranges
            .sort_by_key(|fold| (fold.start_line, fold.end_line));
        self.outline
    }
}

pub fn build(source: &str, line_index: &LineIndex, lexemes: &[Lexeme]) -> Outline {
    let mut builder = OutlineBuilder {
        source,
        line_index,
        lexemes,
        step: None,
        macros: Vec::new(),
        outline: Outline::default(),
    };

    let mut previous_end = 0;
    for statement in split_statements(lexemes) {
        builder.statement(&statement, previous_end);
        previous_end = statement.end;
    }

    builder.finish()
}
