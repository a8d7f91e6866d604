//! # slrkit-pascal
//!
//! A front end for a small Pascal subset, built on **slrkit**: a `logos`
//! scanner, the subset grammar with its operator precedences, and a parser
//! that recovers from malformed statements.
//!
//! ## Overview
//!
//! - [`lexer`] turns source text into [`PascalToken`]s with line/column
//!   spans.
//! - [`grammar`] declares the production rules and builds the SLR(1)
//!   [`PascalTable`].
//! - [`PascalParser`] runs the table over a token stream and returns the
//!   syntax tree together with every recovered syntax error.
//!
//! ## Example
//!
//! ```rust
//! use slrkit_pascal::{NodeKind, PascalParser};
//!
//! let parser = PascalParser::new().unwrap();
//! let outcome = parser
//!     .parse("program demo; begin x := 1 + 2 * 3 end.")
//!     .unwrap();
//! assert!(outcome.is_clean());
//! assert_eq!(outcome.tree.kind(), Some(&NodeKind::Program));
//! ```
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod token;

pub use error::LexError;
pub use grammar::{NodeKind, NonTerminal, PascalNode, PascalRule, PascalTable, pascal_rules, pascal_table};
pub use lexer::Lexer;
pub use token::{PascalToken, TokenKind};

use anyhow::{Context, Result};
use slrkit::{Configuration, Driver, GrammarError, ParseError, ParseOutcome, SyntaxError};

/// A parse run with its full configuration trace.
#[derive(Debug)]
pub struct TracedParse {
    pub result: Result<PascalNode, ParseError>,
    /// Every syntax error, recovered or not.
    pub errors: Vec<SyntaxError>,
    pub trace: Vec<Configuration<PascalToken, NodeKind>>,
}

/// Parser for whole Pascal programs.
///
/// Owns one table; [`parse`](Self::parse) takes `&self`, so a parser can be
/// shared between threads.
pub struct PascalParser {
    table: PascalTable,
}

impl PascalParser {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self {
            table: pascal_table()?,
        })
    }

    pub fn table(&self) -> &PascalTable {
        &self.table
    }

    /// Lexes and parses `source`.
    ///
    /// Lexical errors and unrecoverable syntax errors are returned as `Err`;
    /// recovered syntax errors are listed in the outcome.
    pub fn parse(&self, source: &str) -> Result<ParseOutcome<PascalToken, NodeKind>> {
        let tokens = Lexer::tokenize(source).context("lexing failed")?;
        let mut driver = Driver::new(&self.table);
        let outcome = driver.parse_tokens(tokens, &NodeKind::Program)?;
        log::debug!("parse stats: {:?}", driver.stats());
        Ok(outcome)
    }

    /// Lexes and parses `source`, recording every parser step.
    ///
    /// Only lexical errors are returned as `Err`; the parse result, success
    /// or not, is part of the [`TracedParse`].
    pub fn parse_traced(&self, source: &str) -> Result<TracedParse> {
        let mut input = Lexer::tokenize(source).context("lexing failed")?;
        let mut errors = Vec::new();
        let mut trace = Vec::new();
        let result = Driver::new(&self.table).parse(
            &mut input,
            self.table.start_state(),
            &NodeKind::Program,
            Some(&mut trace),
            &mut errors,
        );
        Ok(TracedParse {
            result,
            errors,
            trace,
        })
    }
}

/// Parses `source` with a freshly built table.
pub fn parse_source(source: &str) -> Result<ParseOutcome<PascalToken, NodeKind>> {
    let parser = PascalParser::new().context("building the Pascal table")?;
    parser.parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slrkit::{Operation, SyntaxNode, Token};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn count(node: &PascalNode, kind: NodeKind) -> usize {
        usize::from(node.kind() == Some(&kind))
            + node
                .children()
                .iter()
                .map(|c| count(c, kind))
                .sum::<usize>()
    }

    fn find(node: &PascalNode, kind: NodeKind) -> Option<&PascalNode> {
        if node.kind() == Some(&kind) {
            return Some(node);
        }
        node.children().iter().find_map(|c| find(c, kind))
    }

    const PROGRAM: &str = "\
program sum;
begin
  total := 0;
  for i := 1 to 10 do
    total := total + i * i;
  while total > 100 do
    total := total - 1;
  if total < 5 then
    if total > 1 then x := 1 else x := 2;
  begin
    y := (total + 1) ^ 2
  end;
end.
";

    #[test]
    fn parses_full_program() {
        init_logger();
        let outcome = parse_source(PROGRAM).unwrap();
        assert!(outcome.is_clean(), "{:?}", outcome.errors);
        let tree = &outcome.tree;
        assert_eq!(tree.kind(), Some(&NodeKind::Program));
        assert_eq!(count(tree, NodeKind::ForUp), 1);
        assert_eq!(count(tree, NodeKind::While), 1);
        assert_eq!(count(tree, NodeKind::Assign), 6);
        assert_eq!(count(tree, NodeKind::CompoundStatement), 2);

        let statements = find(tree, NodeKind::Statements).unwrap();
        let listed = statements
            .children()
            .iter()
            .filter(|c| c.token().is_none())
            .count();
        // Five statements plus the empty one after the trailing `;`.
        assert_eq!(listed, 6);
    }

    #[test]
    fn dangling_else_binds_to_inner_if() {
        let outcome = parse_source(
            "program p; begin if a < b then if c > d then x := 1 else x := 2 end.",
        )
        .unwrap();
        let outer = find(&outcome.tree, NodeKind::If).unwrap();
        assert_eq!(count(outer, NodeKind::IfElse), 1);
        assert_eq!(count(&outcome.tree, NodeKind::If), 1);
    }

    #[test]
    fn multiplication_groups_first() {
        let outcome = parse_source("program p; begin x := a + b * c end.").unwrap();
        let assign = find(&outcome.tree, NodeKind::Assign).unwrap();
        let sum = &assign.children()[2];
        let ops: Vec<&str> = sum
            .children()
            .iter()
            .filter_map(|c| c.token().map(Token::text))
            .collect();
        assert_eq!(ops, vec!["+"]);
        let product = &sum.children()[2];
        assert_eq!(
            product.children()[1].token().map(Token::text),
            Some("*")
        );
    }

    #[test]
    fn malformed_statement_is_recovered() {
        let source = "program p;\nbegin\n  x := 1;\n  y := * 2;\n  z := 3\nend.";
        let outcome = parse_source(source).unwrap();
        assert_eq!(outcome.errors.len(), 1);
        let error = &outcome.errors[0];
        assert_eq!(
            error.message.as_str(),
            "unknown token \"*\" at 3:[7, 8), expected id, num, ("
        );
        assert_eq!(count(&outcome.tree, NodeKind::Assign), 2);
        let statements = find(&outcome.tree, NodeKind::Statements).unwrap();
        let placeholders = statements
            .children()
            .iter()
            .filter(|c| matches!(c, SyntaxNode::Branch { kind: NodeKind::Statement, children } if children.is_empty()))
            .count();
        assert_eq!(placeholders, 1);
    }

    #[test]
    fn missing_terminator_is_fatal() {
        let err = parse_source("program p; begin x := 1 end").unwrap_err();
        let parse = err.downcast_ref::<ParseError>().unwrap();
        assert_eq!(parse.errors.len(), 2);
        assert!(parse.errors[0].message.starts_with("unexpected end of input after \"end\""));
    }

    #[test]
    fn stray_else_after_recovery_aborts() {
        let err = parse_source("program p; begin while a < b do x := * else ; y := 1 end.")
            .unwrap_err();
        let parse = err.downcast_ref::<ParseError>().unwrap();
        assert_eq!(parse.errors.len(), 3);
        assert!(parse.errors[1].message.starts_with("unknown token \"else\""));
        assert_eq!(
            parse.last().map(|e| e.message.as_str()),
            Some("error recovery made no progress")
        );
    }

    #[test]
    fn block_comments_are_ignored() {
        let outcome =
            parse_source("program p; (* header *) begin x := 1 (* inline * ) *) end.").unwrap();
        assert!(outcome.is_clean(), "{:?}", outcome.errors);
        let assign = find(&outcome.tree, NodeKind::Assign).unwrap();
        assert_eq!(assign.span().map(|s| s.display()), Some("0:[30, 36)".to_owned()));
    }

    #[test]
    fn lex_errors_surface_through_anyhow() {
        let err = parse_source("program p; begin x := 1 ? end.").unwrap_err();
        assert!(err.downcast_ref::<LexError>().is_some());
    }

    #[test]
    fn traced_parse_ends_in_accept() {
        let parser = PascalParser::new().unwrap();
        let traced = parser.parse_traced("program p; begin end.").unwrap();
        assert!(traced.result.is_ok());
        assert!(traced.errors.is_empty());
        assert_eq!(
            traced.trace.last().map(|c| c.operation),
            Some(Operation::Accept)
        );
        let row = traced.trace[0].row(parser.table());
        assert_eq!(row.input, "program p ; begin end . $");
    }
}
