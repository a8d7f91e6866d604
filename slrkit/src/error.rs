//! Error types for table construction and parsing.
//!
//! * [`GrammarError`]: the grammar cannot be turned into an SLR(1) table.
//!   Raised by [`Grammar::new`](crate::Grammar::new) and
//!   [`TableBuilder::build`](crate::TableBuilder::build); never at parse time.
//! * [`SyntaxError`]: one diagnostic produced while parsing. Recovered
//!   errors are collected and do not stop the parse.
//! * [`ParseError`]: the parse was aborted because recovery failed. It
//!   carries every diagnostic collected up to that point, the final one
//!   explaining why recovery gave up.

use crate::Span;
use smartstring::alias::String;
use thiserror::Error;

/// Fatal error raised while validating a grammar or building its table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The grammar contains no production rules.
    #[error("grammar has no production rules")]
    Empty,

    /// A rule refers to a nonterminal that no rule defines.
    #[error("nonterminal {key} is used in `{rule}` but has no production rule")]
    UndefinedNonTerminal { key: String, rule: String },

    /// A symbol that is neither a terminal nor a nonterminal sits under the
    /// cursor of an item.
    #[error("unexpected symbol at position {position} of `{rule}`")]
    UnexpectedSymbol { rule: String, position: usize },

    /// The requested start key has no production rule.
    #[error("start nonterminal {key} has no production rule")]
    UnknownStart { key: String },

    /// A recovery placeholder was registered for an unknown nonterminal.
    #[error("recovery placeholder registered for unknown nonterminal {key}")]
    UnknownRecoveryKey { key: String },

    /// Two completed items claim a reduction on the same lookahead.
    #[error("reduce-reduce conflict in state {state} on {terminal}: `{first}` vs `{second}`")]
    ReduceReduce {
        state: usize,
        terminal: String,
        first: String,
        second: String,
    },
}

/// A single syntax diagnostic.
///
/// This flattened error carries only a message and an optional `Span`, the
/// way parser diagnostics are reported throughout the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    /// Human-readable message, including the offending position and the
    /// terminals that were expected.
    pub message: String,
    /// Span of the offending token, if there was one.
    pub span: Option<Span>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// The parse could not recover from a syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.errors))]
pub struct ParseError {
    /// Every diagnostic collected during the parse, in order. The last one
    /// explains why recovery failed.
    pub errors: Vec<SyntaxError>,
}

impl ParseError {
    /// The diagnostic that aborted the parse.
    pub fn last(&self) -> Option<&SyntaxError> {
        self.errors.last()
    }
}

fn summary(errors: &[SyntaxError]) -> std::string::String {
    match errors.last() {
        Some(last) => format!("parse aborted after {} error(s): {}", errors.len(), last),
        None => "parse aborted".to_owned(),
    }
}
