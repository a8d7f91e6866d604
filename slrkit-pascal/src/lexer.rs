//! Lexer module.
//!
//! Wraps the `logos` scanner generated for [`TokenKind`] and turns its byte
//! ranges into line/column [`Span`]s. Line starts are indexed once up front,
//! so each position lookup is a binary search.

use crate::{LexError, PascalToken, TokenKind};
use logos::Logos;
use slrkit::{Position, Span};
use std::collections::VecDeque;

/// Scanner over one source string.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, TokenKind>,
    line_starts: Vec<usize>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            inner: TokenKind::lexer(source),
            line_starts,
        }
    }

    /// 0-based line and byte column of byte `offset`.
    fn position(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Position::new(line, offset - self.line_starts[line])
    }

    fn span(&self, range: std::ops::Range<usize>) -> Span {
        Span::new(self.position(range.start), self.position(range.end))
    }

    /// Scans the next token, `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<PascalToken, LexError>> {
        let kind = self.inner.next()?;
        let span = self.span(self.inner.span());
        let text = self.inner.slice();
        let token = match kind {
            Ok(kind) => Ok(PascalToken::new(kind, text, span)),
            Err(()) => Err(LexError::UnexpectedInput {
                text: text.into(),
                span,
            }),
        };
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("MATCHED: {:?} {:?} at {}", kind, text, span.display());
        }
        Some(token)
    }

    /// Scans all of `source`, stopping at the first error.
    pub fn tokenize(source: &'source str) -> Result<VecDeque<PascalToken>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut out = VecDeque::new();
        while let Some(token) = lexer.next_token() {
            out.push_back(token?);
        }
        log::debug!("lexed {} tokens", out.len());
        Ok(out)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<PascalToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slrkit::Token;

    #[test]
    fn spans_track_lines() {
        let tokens = Lexer::tokenize("program p;\n  x := 10\nend").unwrap();
        let summary: Vec<_> = tokens
            .iter()
            .map(|t| (t.kind, t.text(), t.span().display()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Program, "program", "0:[0, 7)".to_owned()),
                (TokenKind::Identifier, "p", "0:[8, 9)".to_owned()),
                (TokenKind::Semicolon, ";", "0:[9, 10)".to_owned()),
                (TokenKind::Identifier, "x", "1:[2, 3)".to_owned()),
                (TokenKind::Assign, ":=", "1:[4, 6)".to_owned()),
                (TokenKind::Integer, "10", "1:[7, 9)".to_owned()),
                (TokenKind::End, "end", "2:[0, 3)".to_owned()),
            ]
        );
    }

    #[test]
    fn unknown_character_is_reported() {
        let err = Lexer::tokenize("x := 1;\ny := ?").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedInput {
                text: "?".into(),
                span: Span::on_line(1, 5, 6),
            }
        );
    }

    #[test]
    fn iterator_yields_every_token() {
        let count = Lexer::new("a + b * (c - 1)").filter_map(Result::ok).count();
        assert_eq!(count, 9);
    }
}
