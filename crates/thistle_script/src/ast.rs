//! Abstract syntax tree for the script dialect.

use crate::span::Span;

/// An AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// `nil`
    Nil(Span),
    /// `true` or `false`
    Bool(bool, Span),
    /// Integer literal like `42`
    Int(i64, Span),
    /// Float literal like `3.14`
    Float(f64, Span),
    /// String literal like `"hello"`
    Str(String, Span),
    /// Symbol like `say` or `this`
    Symbol(String, Span),
    /// Keyword like `:aliases`
    Keyword(String, Span),
    /// Object reference literal like `#42`
    Object(u64, Span),
    /// List form like `(say "hi")`
    List(Vec<Ast>, Span),
    /// Vector form like `[1 2 3]`
    Vector(Vec<Ast>, Span),
    /// Map form like `{"name" "lobby"}`
    Map(Vec<(Ast, Ast)>, Span),
}

impl Ast {
    /// Returns the source span of this node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Nil(s)
            | Self::Bool(_, s)
            | Self::Int(_, s)
            | Self::Float(_, s)
            | Self::Str(_, s)
            | Self::Symbol(_, s)
            | Self::Keyword(_, s)
            | Self::Object(_, s)
            | Self::List(_, s)
            | Self::Vector(_, s)
            | Self::Map(_, s) => *s,
        }
    }

    /// Returns the symbol name if this is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name, _) => Some(name),
            _ => None,
        }
    }

    /// Returns the keyword name if this is a keyword.
    #[must_use]
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Self::Keyword(name, _) => Some(name),
            _ => None,
        }
    }

    /// Returns the string content if this is a string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s, _) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a list form.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Ast]> {
        match self {
            Self::List(items, _) => Some(items),
            _ => None,
        }
    }

    /// Returns the elements if this is a vector form.
    #[must_use]
    pub fn as_vector(&self) -> Option<&[Ast]> {
        match self {
            Self::Vector(items, _) => Some(items),
            _ => None,
        }
    }
}
