//! # slrkit
//!
//! SLR(1) parse-table construction with operator-precedence conflict
//! resolution, and a table-driven shift-reduce parser with panic-mode
//! error recovery.
//!
//! A grammar is described at runtime: terminals are named predicates over
//! the caller's token type, nonterminals are keys of any ordered, hashable
//! type, and every production rule carries a callback that builds its
//! syntax-tree node.
//!
//! ## Pipeline
//!
//! 1. Build [`Terminal`]s and [`ProductionRule`]s and validate them into a
//!    [`Grammar`].
//! 2. [`TableBuilder`] computes FIRST/FOLLOW ([`sets`]), explores the LR(0)
//!    item sets ([`item`]) and resolves shift/reduce conflicts by
//!    precedence, producing an immutable [`Table`].
//! 3. A [`Driver`] runs the table over a token queue and returns a
//!    [`SyntaxNode`] tree together with any syntax errors it recovered from.
//!
//! The [`report`] module renders tables and parser traces for inspection.
//!
//! ## Example
//!
//! ```rust
//! use slrkit::{Driver, Grammar, ProductionRule, Span, Symbol, TableBuilder, Terminal, Token};
//!
//! #[derive(Debug, Clone)]
//! struct Word(&'static str, usize);
//!
//! impl Token for Word {
//!     fn text(&self) -> &str {
//!         self.0
//!     }
//!     fn span(&self) -> Span {
//!         Span::on_line(0, self.1, self.1 + self.0.len())
//!     }
//! }
//!
//! let num = Terminal::new("num", |w: &Word| w.0.chars().all(|c| c.is_ascii_digit()));
//! let plus = Terminal::new("+", |w: &Word| w.0 == "+");
//!
//! let rules = vec![
//!     ProductionRule::new("Start", "Start", vec![Symbol::NonTerminal("Sum")]),
//!     ProductionRule::new(
//!         "Sum",
//!         "Add",
//!         vec![Symbol::NonTerminal("Sum"), (&plus).into(), (&num).into()],
//!     ),
//!     ProductionRule::new("Sum", "Number", vec![(&num).into()]),
//! ];
//! let table = TableBuilder::new(Grammar::new(rules).unwrap())
//!     .build("Start")
//!     .unwrap();
//!
//! let tokens = vec![Word("1", 0), Word("+", 2), Word("2", 4)];
//! let outcome = Driver::new(&table).parse_tokens(tokens, &"Add").unwrap();
//! assert!(outcome.is_clean());
//! assert_eq!(outcome.tree.kind(), Some(&"Add"));
//! ```

pub mod driver;
pub mod error;
pub mod grammar;
pub mod item;
pub mod node;
pub mod report;
pub mod sets;
pub mod span;
pub mod table;
pub mod token;

#[cfg(test)]
mod test_support;

pub use driver::{Configuration, Driver, Operation, ParseOutcome, ParserStats};
pub use error::{GrammarError, ParseError, SyntaxError};
pub use grammar::{Assoc, Grammar, NonTerminalKey, Produce, ProductionRule, Symbol, Terminal};
pub use item::{Item, ItemSet};
pub use node::{SyntaxNode, TreeDisplay};
pub use report::TraceRow;
pub use sets::{SymbolSet, SymbolSets};
pub use span::{Position, Span};
pub use table::{
    Action, AnalyzerState, ContextMismatch, Placeholder, PrecedenceContext, StateId, Table,
    TableBuilder,
};
pub use token::Token;
