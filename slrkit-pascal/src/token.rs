//! # Pascal Tokens
//!
//! [`TokenKind`] is the raw token classification produced by the `logos`
//! scanner; [`PascalToken`] pairs a kind with its source text and [`Span`]
//! and implements [`slrkit::Token`], which is all the parser driver needs.
//!
//! Keywords are matched case-insensitively, as Pascal requires. Whitespace
//! and the three comment forms (`{ .. }`, `(* .. *)` and `// ..`) are
//! skipped by the scanner.
use logos::{FilterResult, Logos};
use slrkit::{Span, Token};
use smartstring::alias::String;
use std::fmt;

/// Token classification.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"\{[^}]*\}")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    #[token("and", ignore(ascii_case))]
    And,
    #[token("array", ignore(ascii_case))]
    Array,
    #[token("begin", ignore(ascii_case))]
    Begin,
    #[token("case", ignore(ascii_case))]
    Case,
    #[token("const", ignore(ascii_case))]
    Const,
    #[token("div", ignore(ascii_case))]
    Div,
    #[token("do", ignore(ascii_case))]
    Do,
    #[token("downto", ignore(ascii_case))]
    Downto,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("mod", ignore(ascii_case))]
    Mod,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("of", ignore(ascii_case))]
    Of,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("procedure", ignore(ascii_case))]
    Procedure,
    #[token("program", ignore(ascii_case))]
    Program,
    #[token("repeat", ignore(ascii_case))]
    Repeat,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("until", ignore(ascii_case))]
    Until,
    #[token("var", ignore(ascii_case))]
    Var,
    #[token("while", ignore(ascii_case))]
    While,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Real,
    #[regex(r"'([^'\n]|'')*'")]
    StringLiteral,

    #[token(":=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("=")]
    Equal,
    #[token("<>")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(".")]
    Dot,
    #[token("..")]
    DoubleDot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    /// `(* .. *)` comment. Skipped by its callback, never produced.
    #[token("(*", block_comment)]
    BlockComment,
}

/// Consumes a block comment up to its closing `*)`.
fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> FilterResult<(), ()> {
    match lex.remainder().find("*)") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A lexical token of the Pascal subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PascalToken {
    pub kind: TokenKind,
    /// Source text exactly as written.
    pub text: String,
    /// 0-based line and half-open byte-column range.
    pub span: Span,
}

impl PascalToken {
    /// Copies `text` into a new token.
    pub fn new(kind: TokenKind, text: &str, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl Token for PascalToken {
    fn text(&self) -> &str {
        &self.text
    }

    fn span(&self) -> Span {
        self.span
    }
}
