//! Source positions attached to tokens and diagnostics.
//!
//! The token source owns position tracking; the engine only reads a
//! token's [`Span`] when it has to report a syntax error.

/// A 0-based line/column position in source text.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 0-based line number.
    pub line: usize,
    /// 0-based column number.
    pub column: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open source range: `[start, end)`.
///
/// Invariants are not enforced here, but it is conventional for `start <= end`
/// in lexicographic `(line, column)` ordering.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Creates a new `Span`.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span covering `[start, end)` columns of a single line.
    #[inline]
    pub const fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether the span covers no columns.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Pretty-print for diagnostics: `line:[start, end)`.
    ///
    /// Only the start line is printed; tokens never cross a line.
    #[inline]
    pub fn display(&self) -> String {
        format!(
            "{}:[{}, {})",
            self.start.line, self.start.column, self.end.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::on_line(0, 4, 6);
        let b = Span::on_line(1, 0, 3);
        let m = a.merge(&b);
        assert_eq!(m.start, Position::new(0, 4));
        assert_eq!(m.end, Position::new(1, 3));
    }

    #[test]
    fn display_is_half_open() {
        let s = Span::on_line(2, 5, 9);
        assert_eq!(s.display(), "2:[5, 9)");
        assert!(!s.is_empty());
        assert!(Span::on_line(0, 3, 3).is_empty());
    }
}
