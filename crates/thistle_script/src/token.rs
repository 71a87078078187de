//! Tokens produced by the lexer.

use std::fmt;

use crate::span::Span;

/// The kind of a token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// String literal like `"hello"` (unescaped).
    Str(String),
    /// Integer literal like `42`.
    Int(i64),
    /// Float literal like `3.14`.
    Float(f64),
    /// Symbol like `say` or `set-prop!`.
    Symbol(String),
    /// Keyword like `:aliases`.
    Keyword(String),
    /// Object reference literal like `#42`.
    Object(u64),
    /// Line comment starting with `;`.
    Comment(String),
    /// End of input.
    Eof,
    /// Lexing error with message.
    Error(String),
}

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// Where it appeared in the source.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Keyword(k) => write!(f, ":{k}"),
            Self::Object(n) => write!(f, "#{n}"),
            Self::Comment(_) => write!(f, "<comment>"),
            Self::Eof => write!(f, "<eof>"),
            Self::Error(msg) => write!(f, "<error: {msg}>"),
        }
    }
}
