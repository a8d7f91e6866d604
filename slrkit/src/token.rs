use crate::Span;
use std::fmt::Debug;

/// Contract between a token source and the parser driver.
///
/// The driver never inspects a token's kind directly: terminals decide
/// whether they match a token through their predicate. The driver only
/// reads the text and span when it builds a diagnostic.
pub trait Token: Debug {
    /// Source text of the token, used verbatim in error messages.
    fn text(&self) -> &str;

    /// Source range of the token. Lines are 0-based and the column range
    /// is half-open.
    fn span(&self) -> Span;
}
