//! # Pascal Subset Grammar
//!
//! ```text
//! Start             → S
//! S                 → program id ; CompoundStatement .
//! CompoundStatement → begin Statements end
//! Statements        → Statement | Statements ; Statement
//! Statement         → id := Expression
//!                   | CompoundStatement | IfStatement | ForStatement
//!                   | while BoolExpression do Statement
//!                   | ε
//! IfStatement       → if BoolExpression then Statement
//!                   | if BoolExpression then Statement else Statement
//! ForStatement      → for id := Expression to Expression do Statement
//!                   | for id := Expression downto Expression do Statement
//! BoolExpression    → Expression < Expression | Expression > Expression
//! Expression        → Expression + Expression | Expression - Expression
//!                   | Expression * Expression | Expression / Expression
//!                   | Expression ^ Factor | Factor
//! Factor            → id | num | ( Expression )
//! ```
//!
//! The expression rules are ambiguous and rely on precedence: `*` and `/`
//! bind at level 1, `^` at level 2, everything else at level 0. `else` is
//! right-associative, so a dangling `else` attaches to the nearest `if`.
//!
//! `Statement` is the recovery point: a malformed statement is replaced by
//! an empty [`NodeKind::Statement`] node and parsing resumes at the next
//! `;`, `end` or `else`.

use crate::{PascalToken, TokenKind};
use slrkit::{
    Assoc, Grammar, GrammarError, ProductionRule, Symbol, SyntaxNode, Table, TableBuilder,
    Terminal,
};
use std::fmt;

/// Nonterminals of the Pascal subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    Start,
    S,
    CompoundStatement,
    Statements,
    Statement,
    IfStatement,
    ForStatement,
    BoolExpression,
    Expression,
    Factor,
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kinds of syntax-tree nodes the grammar builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Program,
    CompoundStatement,
    /// Flat statement list; children alternate statement and `;`.
    Statements,
    Assign,
    /// Wrapper around a compound, `if` or `for` statement; empty for an
    /// empty statement or a recovery placeholder.
    Statement,
    While,
    If,
    IfElse,
    ForUp,
    ForDown,
    Relation,
    Expression,
    Factor,
}

pub type PascalRule = ProductionRule<NonTerminal, PascalToken, NodeKind>;
pub type PascalNode = SyntaxNode<PascalToken, NodeKind>;
pub type PascalTable = Table<NonTerminal, PascalToken, NodeKind>;

fn kind(name: &str, kind: TokenKind) -> Terminal<PascalToken> {
    Terminal::new(name, move |t: &PascalToken| t.kind == kind)
}

fn nt(key: NonTerminal) -> Symbol<NonTerminal, PascalToken> {
    Symbol::NonTerminal(key)
}

/// Terminals used by the grammar.
struct Terminals {
    program: Terminal<PascalToken>,
    begin: Terminal<PascalToken>,
    end: Terminal<PascalToken>,
    if_: Terminal<PascalToken>,
    then: Terminal<PascalToken>,
    else_: Terminal<PascalToken>,
    while_: Terminal<PascalToken>,
    do_: Terminal<PascalToken>,
    for_: Terminal<PascalToken>,
    to: Terminal<PascalToken>,
    downto: Terminal<PascalToken>,
    id: Terminal<PascalToken>,
    num: Terminal<PascalToken>,
    assign: Terminal<PascalToken>,
    semicolon: Terminal<PascalToken>,
    dot: Terminal<PascalToken>,
    plus: Terminal<PascalToken>,
    minus: Terminal<PascalToken>,
    star: Terminal<PascalToken>,
    slash: Terminal<PascalToken>,
    caret: Terminal<PascalToken>,
    less: Terminal<PascalToken>,
    greater: Terminal<PascalToken>,
    lparen: Terminal<PascalToken>,
    rparen: Terminal<PascalToken>,
}

impl Terminals {
    fn new() -> Self {
        Self {
            program: kind("program", TokenKind::Program),
            begin: kind("begin", TokenKind::Begin),
            end: kind("end", TokenKind::End),
            if_: kind("if", TokenKind::If),
            then: kind("then", TokenKind::Then),
            else_: kind("else", TokenKind::Else).with_assoc(Assoc::Right),
            while_: kind("while", TokenKind::While),
            do_: kind("do", TokenKind::Do),
            for_: kind("for", TokenKind::For),
            to: kind("to", TokenKind::To),
            downto: kind("downto", TokenKind::Downto),
            id: kind("id", TokenKind::Identifier),
            num: kind("num", TokenKind::Integer),
            assign: kind(":=", TokenKind::Assign),
            semicolon: kind(";", TokenKind::Semicolon),
            dot: kind(".", TokenKind::Dot),
            plus: kind("+", TokenKind::Plus),
            minus: kind("-", TokenKind::Minus),
            star: kind("*", TokenKind::Star).with_precedence(1),
            slash: kind("/", TokenKind::Slash).with_precedence(1),
            caret: kind("^", TokenKind::Caret).with_precedence(2),
            less: kind("<", TokenKind::Less),
            greater: kind(">", TokenKind::Greater),
            lparen: kind("(", TokenKind::LeftParen),
            rparen: kind(")", TokenKind::RightParen),
        }
    }
}

/// Appends a statement to the list on its left instead of nesting lists.
fn append_statement(mut children: Vec<PascalNode>) -> PascalNode {
    let tail = children.split_off(1.min(children.len()));
    let mut list = match children.pop() {
        Some(head) if head.kind() == Some(&NodeKind::Statements) => head.into_children(),
        Some(head) => vec![head],
        None => Vec::new(),
    };
    list.extend(tail);
    SyntaxNode::branch(NodeKind::Statements, list)
}

/// The production rules, start production first.
pub fn pascal_rules() -> Vec<PascalRule> {
    use NonTerminal::*;
    let t = Terminals::new();
    let sym = |terminal: &Terminal<PascalToken>| Symbol::from(terminal);
    let rule = ProductionRule::new;
    vec![
        rule(Start, NodeKind::Start, vec![nt(S)]),
        rule(
            S,
            NodeKind::Program,
            vec![sym(&t.program), sym(&t.id), sym(&t.semicolon), nt(CompoundStatement), sym(&t.dot)],
        ),
        rule(
            CompoundStatement,
            NodeKind::CompoundStatement,
            vec![sym(&t.begin), nt(Statements), sym(&t.end)],
        ),
        rule(Statements, NodeKind::Statements, vec![nt(Statement)]),
        rule(
            Statements,
            NodeKind::Statements,
            vec![nt(Statements), sym(&t.semicolon), nt(Statement)],
        )
        .with_produce(append_statement),
        rule(
            Statement,
            NodeKind::Assign,
            vec![sym(&t.id), sym(&t.assign), nt(Expression)],
        ),
        rule(Statement, NodeKind::Statement, vec![nt(CompoundStatement)]),
        rule(Statement, NodeKind::Statement, vec![nt(IfStatement)]),
        rule(Statement, NodeKind::Statement, vec![nt(ForStatement)]),
        rule(
            Statement,
            NodeKind::While,
            vec![sym(&t.while_), nt(BoolExpression), sym(&t.do_), nt(Statement)],
        ),
        ProductionRule::epsilon(Statement, NodeKind::Statement),
        rule(
            IfStatement,
            NodeKind::If,
            vec![sym(&t.if_), nt(BoolExpression), sym(&t.then), nt(Statement)],
        ),
        rule(
            IfStatement,
            NodeKind::IfElse,
            vec![
                sym(&t.if_),
                nt(BoolExpression),
                sym(&t.then),
                nt(Statement),
                sym(&t.else_),
                nt(Statement),
            ],
        ),
        rule(
            ForStatement,
            NodeKind::ForUp,
            vec![
                sym(&t.for_),
                sym(&t.id),
                sym(&t.assign),
                nt(Expression),
                sym(&t.to),
                nt(Expression),
                sym(&t.do_),
                nt(Statement),
            ],
        ),
        rule(
            ForStatement,
            NodeKind::ForDown,
            vec![
                sym(&t.for_),
                sym(&t.id),
                sym(&t.assign),
                nt(Expression),
                sym(&t.downto),
                nt(Expression),
                sym(&t.do_),
                nt(Statement),
            ],
        ),
        rule(
            BoolExpression,
            NodeKind::Relation,
            vec![nt(Expression), sym(&t.less), nt(Expression)],
        ),
        rule(
            BoolExpression,
            NodeKind::Relation,
            vec![nt(Expression), sym(&t.greater), nt(Expression)],
        ),
        rule(
            Expression,
            NodeKind::Expression,
            vec![nt(Expression), sym(&t.plus), nt(Expression)],
        ),
        rule(
            Expression,
            NodeKind::Expression,
            vec![nt(Expression), sym(&t.minus), nt(Expression)],
        ),
        rule(
            Expression,
            NodeKind::Expression,
            vec![nt(Expression), sym(&t.star), nt(Expression)],
        ),
        rule(
            Expression,
            NodeKind::Expression,
            vec![nt(Expression), sym(&t.slash), nt(Expression)],
        ),
        rule(
            Expression,
            NodeKind::Expression,
            vec![nt(Expression), sym(&t.caret), nt(Factor)],
        ),
        rule(Expression, NodeKind::Expression, vec![nt(Factor)]),
        rule(Factor, NodeKind::Factor, vec![sym(&t.id)]),
        rule(Factor, NodeKind::Factor, vec![sym(&t.num)]),
        rule(
            Factor,
            NodeKind::Factor,
            vec![sym(&t.lparen), nt(Expression), sym(&t.rparen)],
        ),
    ]
}

/// Builds the parse table, with `Statement` registered for recovery.
pub fn pascal_table() -> Result<PascalTable, GrammarError> {
    let grammar = Grammar::new(pascal_rules())?;
    TableBuilder::new(grammar)
        .recover_with(NonTerminal::Statement, || {
            SyntaxNode::branch(NodeKind::Statement, Vec::new())
        })
        .build(NonTerminal::Start)
}
