//! A forgiving scanner for SAS program text.
//!
//! It never fails on unbalanced input: an unterminated string or comment
//! simply runs to the end of the text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexKind {
    Word,
    Number,
    String,
    Comment,
    /// `%name`: macro statement, function or call
    MacroWord,
    /// `&name`: macro variable reference
    MacroVar,
    Operator,
    Semicolon,
    LParen,
    RParen,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexKind,
    /// Byte offsets into the source
    pub start: usize,
    pub end: usize,
}

impl Lexeme {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

const TWO_CHAR_OPERATORS: &[&str] = &["<=", ">=", "^=", "~=", "||", "**", "=:", "!!"];

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    /// True when the next lexeme begins a statement
    statement_start: bool,
    out: Vec<Lexeme>,
}

impl<'s> Lexer<'s> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Advance past the next occurrence of `needle`, or to the end.
    fn eat_through(&mut self, needle: &str) {
        match self.source[self.pos..].find(needle) {
            Some(found) => self.pos += found + needle.len(),
            None => self.pos = self.source.len(),
        }
    }

    fn push(&mut self, kind: LexKind, start: usize) {
        self.out.push(Lexeme {
            kind,
            start,
            end: self.pos,
        });
        match kind {
            LexKind::Comment => {}
            LexKind::Semicolon => self.statement_start = true,
            _ => self.statement_start = false,
        }
    }

    fn string(&mut self, quote: char) {
        self.pos += quote.len_utf8();
        loop {
            match self.source[self.pos..].find(quote) {
                Some(found) => {
                    self.pos += found + quote.len_utf8();
                    // A doubled quote is an escaped quote
                    if self.peek() == Some(quote) {
                        self.pos += quote.len_utf8();
                        continue;
                    }
                    return;
                }
                None => {
                    self.pos = self.source.len();
                    return;
                }
            }
        }
    }

    fn number(&mut self) {
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') {
            self.pos += 1;
            self.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E'))
            && matches!(self.peek_second(), Some('0'..='9' | '+' | '-'))
        {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_digit());
        }
    }

    fn run(mut self) -> Vec<Lexeme> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            let next = self.peek_second();

            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }

            match c {
                '/' if next == Some('*') => {
                    self.pos += 2;
                    self.eat_through("*/");
                    self.push(LexKind::Comment, start);
                }
                '*' if self.statement_start => {
                    self.eat_through(";");
                    self.push(LexKind::Comment, start);
                }
                '%' if next == Some('*') => {
                    self.eat_through(";");
                    self.push(LexKind::Comment, start);
                }
                '%' if next.is_some_and(is_ident_start) => {
                    self.pos += 1;
                    self.eat_while(is_ident_char);
                    self.push(LexKind::MacroWord, start);
                }
                '&' if next.is_some_and(|n| is_ident_start(n) || n == '&') => {
                    self.eat_while(|c| c == '&');
                    self.eat_while(is_ident_char);
                    self.push(LexKind::MacroVar, start);
                }
                '\'' | '"' => {
                    self.string(c);
                    self.push(LexKind::String, start);
                }
                '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                    self.number();
                    self.push(LexKind::Number, start);
                }
                '0'..='9' => {
                    self.number();
                    self.push(LexKind::Number, start);
                }
                c if is_ident_start(c) => {
                    self.eat_while(is_ident_char);
                    self.push(LexKind::Word, start);
                }
                ';' => {
                    self.pos += 1;
                    self.push(LexKind::Semicolon, start);
                }
                '(' => {
                    self.pos += 1;
                    self.push(LexKind::LParen, start);
                }
                ')' => {
                    self.pos += 1;
                    self.push(LexKind::RParen, start);
                }
                '.' => {
                    self.pos += 1;
                    self.push(LexKind::Dot, start);
                }
                _ => {
                    let rest = &self.source[self.pos..];
                    self.pos += TWO_CHAR_OPERATORS
                        .iter()
                        .find(|op| rest.starts_with(*op))
                        .map_or(c.len_utf8(), |op| op.len());
                    self.push(LexKind::Operator, start);
                }
            }
        }

        self.out
    }
}

pub fn lex(source: &str) -> Vec<Lexeme> {
    Lexer {
        source,
        pos: 0,
        statement_start: true,
        out: Vec::new(),
    }
    .run()
}
