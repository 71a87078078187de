//! Parser for the script dialect.
//!
//! Turns a token stream into a sequence of top-level AST forms.

use thistle_foundation::{Error, ErrorKind, Result};

use crate::ast::Ast;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Recursive-descent parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Creates a parser for the given source text.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            tokens: Lexer::tokenize(source),
            position: 0,
        }
    }

    /// Parses all top-level forms from the source.
    pub fn parse_all(source: &str) -> Result<Vec<Ast>> {
        let mut parser = Self::new(source);
        let mut forms = Vec::new();
        while !parser.at_eof() {
            forms.push(parser.parse_form()?);
        }
        Ok(forms)
    }

    /// Parses a single expression from the source.
    ///
    /// Trailing tokens after the first form are an error.
    pub fn parse_one(source: &str) -> Result<Ast> {
        let mut parser = Self::new(source);
        let form = parser.parse_form()?;
        if parser.at_eof() {
            Ok(form)
        } else {
            Err(parser.error_here("unexpected trailing input"))
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        let span = self.peek().span;
        Error::new(ErrorKind::ParseError {
            message: message.into(),
            line: span.line,
            column: span.column,
        })
    }

    fn parse_form(&mut self) -> Result<Ast> {
        let token = self.bump();
        let span = token.span;
        match token.kind {
            TokenKind::Int(n) => Ok(Ast::Int(n, span)),
            TokenKind::Float(n) => Ok(Ast::Float(n, span)),
            TokenKind::Str(s) => Ok(Ast::Str(s, span)),
            TokenKind::Keyword(k) => Ok(Ast::Keyword(k, span)),
            TokenKind::Object(n) => Ok(Ast::Object(n, span)),
            TokenKind::Symbol(name) => Ok(match name.as_str() {
                "nil" => Ast::Nil(span),
                "true" => Ast::Bool(true, span),
                "false" => Ast::Bool(false, span),
                _ => Ast::Symbol(name, span),
            }),
            TokenKind::LParen => self.parse_seq(span, TokenKind::RParen),
            TokenKind::LBracket => self.parse_seq(span, TokenKind::RBracket),
            TokenKind::LBrace => self.parse_map(span),
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                Err(Error::new(ErrorKind::ParseError {
                    message: format!("unexpected {}", token.kind),
                    line: span.line,
                    column: span.column,
                }))
            }
            TokenKind::Eof => Err(Error::new(ErrorKind::ParseError {
                message: "unexpected end of input".to_string(),
                line: span.line,
                column: span.column,
            })),
            TokenKind::Error(message) => Err(Error::new(ErrorKind::ParseError {
                message,
                line: span.line,
                column: span.column,
            })),
            TokenKind::Comment(_) => self.parse_form(),
        }
    }

    fn parse_seq(&mut self, open: Span, close: TokenKind) -> Result<Ast> {
        let mut items = Vec::new();
        loop {
            if self.peek().kind == close {
                let end = self.bump().span;
                let span = open.merge(end);
                return Ok(if close == TokenKind::RParen {
                    Ast::List(items, span)
                } else {
                    Ast::Vector(items, span)
                });
            }
            if self.at_eof() {
                return Err(self.error_here("unclosed form"));
            }
            items.push(self.parse_form()?);
        }
    }

    fn parse_map(&mut self, open: Span) -> Result<Ast> {
        let mut pairs = Vec::new();
        loop {
            if self.peek().kind == TokenKind::RBrace {
                let end = self.bump().span;
                return Ok(Ast::Map(pairs, open.merge(end)));
            }
            if self.at_eof() {
                return Err(self.error_here("unclosed map"));
            }
            let key = self.parse_form()?;
            if self.peek().kind == TokenKind::RBrace {
                return Err(self.error_here("map has a key without a value"));
            }
            let value = self.parse_form()?;
            pairs.push((key, value));
        }
    }
}
