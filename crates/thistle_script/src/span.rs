//! Source spans for diagnostics and body-text slicing.

/// A byte range in source text with its starting line and column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// Starting byte offset.
    pub start: usize,
    /// Ending byte offset (exclusive).
    pub end: usize,
    /// Line of the start position (1-indexed).
    pub line: u32,
    /// Column of the start position (1-indexed).
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Merges two spans into one covering both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if other.line < self.line {
                other.column
            } else {
                self.column
            },
        }
    }

    /// Slices the covered text out of the source this span refers to.
    #[must_use]
    pub fn slice<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start..self.end.min(source.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::new(4, 10, 1, 5);
        let b = Span::new(12, 20, 2, 3);
        let m = a.merge(b);
        assert_eq!(m.start, 4);
        assert_eq!(m.end, 20);
        assert_eq!(m.line, 1);
    }

    #[test]
    fn slice_extracts_text() {
        let src = "(say hi)";
        let span = Span::new(1, 4, 1, 2);
        assert_eq!(span.slice(src), "say");
    }
}
