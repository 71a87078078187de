//! Lexer for the Thistle script dialect.
//!
//! The lexer converts source text into a stream of tokens.

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for script source code.
pub struct Lexer<'src> {
    rest: &'src str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            );
        };

        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '[' => {
                self.advance();
                TokenKind::LBracket
            }
            ']' => {
                self.advance();
                TokenKind::RBracket
            }
            '{' => {
                self.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.advance();
                TokenKind::RBrace
            }
            ';' => self.scan_comment(),
            '#' => self.scan_object_ref(),
            ':' => self.scan_keyword(),
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            '-' => {
                if self.rest[1..].chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.scan_symbol()
                }
            }
            c if is_symbol_start(c) => self.scan_symbol(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source, excluding comments.
    #[must_use]
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            if !matches!(token.kind, TokenKind::Comment(_)) {
                tokens.push(token);
            }
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        let len = c.len_utf8();
        self.rest = &self.rest[len..];
        self.position += len;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_whitespace() || c == ',') {
            self.advance();
        }
    }

    fn scan_comment(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        TokenKind::Comment(text)
    }

    fn scan_object_ref(&mut self) -> TokenKind {
        self.advance(); // '#'
        let mut digits = String::new();
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            digits.push(self.advance().unwrap_or_default());
        }
        if digits.is_empty() {
            return TokenKind::Error("expected digits after '#'".to_string());
        }
        digits.parse::<u64>().map_or_else(
            |_| TokenKind::Error(format!("object id out of range: #{digits}")),
            TokenKind::Object,
        )
    }

    fn scan_keyword(&mut self) -> TokenKind {
        self.advance(); // ':'
        let mut name = String::new();
        while self.peek_char().is_some_and(is_symbol_continue) {
            name.push(self.advance().unwrap_or_default());
        }
        if name.is_empty() {
            TokenKind::Error("expected name after ':'".to_string())
        } else {
            TokenKind::Keyword(name)
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                None => return TokenKind::Error("unterminated string".to_string()),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some(c) => {
                        return TokenKind::Error(format!("unknown escape: \\{c}"));
                    }
                    None => return TokenKind::Error("unterminated string".to_string()),
                },
                Some(c) => text.push(c),
            }
        }
        TokenKind::Str(text)
    }

    fn scan_number(&mut self) -> TokenKind {
        let mut text = String::new();
        if self.peek_char() == Some('-') {
            text.push('-');
            self.advance();
        }
        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '.' && !is_float && self.rest[1..].starts_with(|c: char| c.is_ascii_digit())
            {
                is_float = true;
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if is_float {
            text.parse::<f64>().map_or_else(
                |_| TokenKind::Error(format!("bad float: {text}")),
                TokenKind::Float,
            )
        } else {
            text.parse::<i64>().map_or_else(
                |_| TokenKind::Error(format!("integer out of range: {text}")),
                TokenKind::Int,
            )
        }
    }

    fn scan_symbol(&mut self) -> TokenKind {
        let mut name = String::new();
        while self.peek_char().is_some_and(is_symbol_continue) {
            name.push(self.advance().unwrap_or_default());
        }
        TokenKind::Symbol(name)
    }
}

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '+' | '-' | '*' | '/' | '<' | '>' | '=' | '_' | '!' | '?' | '@')
}

fn is_symbol_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '-' | '*' | '/' | '<' | '>' | '=' | '_' | '!' | '?' | '@' | '.')
}
