//! # Lexer Errors
//!
//! [`LexError`] reports input the scanner cannot classify. Grammar and parse
//! failures use the engine's own error types ([`slrkit::GrammarError`],
//! [`slrkit::ParseError`]); the pipeline functions in this crate combine them
//! through `anyhow`.
use slrkit::Span;
use smartstring::alias::String;
use thiserror::Error;

/// Failure to scan the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No token pattern matches the input at this position.
    #[error("unexpected input {text:?} at {}", span.display())]
    UnexpectedInput { text: String, span: Span },
}
