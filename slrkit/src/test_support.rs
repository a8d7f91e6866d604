//! Token source and grammar helpers shared by the unit tests.

use crate::{Grammar, ProductionRule, Span, Symbol, Terminal, Token};
use std::collections::VecDeque;

pub type TestRule = ProductionRule<&'static str, TestToken, &'static str>;
pub type TestGrammar = Grammar<&'static str, TestToken, &'static str>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Whitespace-separated token; its text is its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestToken {
    pub text: String,
    pub span: Span,
}

impl TestToken {
    pub fn new(text: &str, line: usize, column: usize) -> Self {
        Self {
            text: text.to_owned(),
            span: Span::on_line(line, column, column + text.len()),
        }
    }
}

impl Token for TestToken {
    fn text(&self) -> &str {
        &self.text
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// Terminal matching tokens whose text equals `name`.
pub fn term(name: &'static str) -> Terminal<TestToken> {
    Terminal::new(name, move |t: &TestToken| t.text == name)
}

pub fn nt(key: &'static str) -> Symbol<&'static str, TestToken> {
    Symbol::NonTerminal(key)
}

/// Splits `source` on whitespace, tracking line and column.
pub fn lex(source: &str) -> VecDeque<TestToken> {
    let mut out = VecDeque::new();
    for (line_no, line) in source.lines().enumerate() {
        let mut column = 0;
        for word in line.split(' ') {
            if !word.is_empty() {
                out.push_back(TestToken::new(word, line_no, column));
            }
            column += word.len() + 1;
        }
    }
    out
}

/// Terminals of the expression grammar below, kept so tests can name them.
pub struct ExprTerminals {
    pub id: Terminal<TestToken>,
    pub num: Terminal<TestToken>,
    pub assign: Terminal<TestToken>,
    pub plus: Terminal<TestToken>,
    pub minus: Terminal<TestToken>,
    pub star: Terminal<TestToken>,
    pub slash: Terminal<TestToken>,
    pub caret: Terminal<TestToken>,
    pub lparen: Terminal<TestToken>,
    pub rparen: Terminal<TestToken>,
}

impl ExprTerminals {
    pub fn new(caret_assoc: crate::Assoc) -> Self {
        Self {
            id: term("id"),
            num: term("num"),
            assign: term(":="),
            plus: term("+"),
            minus: term("-"),
            star: term("*").with_precedence(1),
            slash: term("/").with_precedence(1),
            caret: term("^").with_precedence(2).with_assoc(caret_assoc),
            lparen: term("("),
            rparen: term(")"),
        }
    }
}

/// Assignment of an ambiguous arithmetic expression:
///
/// ```text
/// Start → Assign
/// Assign → id := E
/// E → E + E | E - E | E * E | E / E | E ^ E | F
/// F → id | num | ( E )
/// ```
///
/// Every `E` alternative has its own node kind so tests can read the tree
/// shape back.
pub fn expr_rules(t: &ExprTerminals) -> Vec<TestRule> {
    let binary = |kind: &'static str, op: &Terminal<TestToken>| {
        ProductionRule::new("E", kind, vec![nt("E"), op.into(), nt("E")])
    };
    vec![
        ProductionRule::new("Start", "Start", vec![nt("Assign")]),
        ProductionRule::new("Assign", "Assign", vec![(&t.id).into(), (&t.assign).into(), nt("E")]),
        binary("Sum", &t.plus),
        binary("Difference", &t.minus),
        binary("Product", &t.star),
        binary("Quotient", &t.slash),
        binary("Power", &t.caret),
        ProductionRule::new("E", "Term", vec![nt("F")]),
        ProductionRule::new("F", "Name", vec![(&t.id).into()]),
        ProductionRule::new("F", "Number", vec![(&t.num).into()]),
        ProductionRule::new("F", "Group", vec![(&t.lparen).into(), nt("E"), (&t.rparen).into()]),
    ]
}

/// Statement list with a recovery point at `Stmt`:
///
/// ```text
/// Start → Program
/// Program → Stmts
/// Stmts → Stmt | Stmts ; Stmt
/// Stmt → id := E
/// E → E + F | F
/// F → id | num
/// ```
pub fn stmt_rules() -> Vec<TestRule> {
    let id = term("id");
    let num = term("num");
    let assign = term(":=");
    let semi = term(";");
    let plus = term("+");
    vec![
        ProductionRule::new("Start", "Start", vec![nt("Program")]),
        ProductionRule::new("Program", "Program", vec![nt("Stmts")]),
        ProductionRule::new("Stmts", "Stmts", vec![nt("Stmt")]),
        ProductionRule::new("Stmts", "Stmts", vec![nt("Stmts"), semi.into(), nt("Stmt")]),
        ProductionRule::new("Stmt", "Stmt", vec![id.clone().into(), assign.into(), nt("E")]),
        ProductionRule::new("E", "E", vec![nt("E"), plus.into(), nt("F")]),
        ProductionRule::new("E", "E", vec![nt("F")]),
        ProductionRule::new("F", "F", vec![id.into()]),
        ProductionRule::new("F", "F", vec![num.into()]),
    ]
}
