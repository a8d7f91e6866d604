//! Syntax tree produced by the parser driver.

use crate::{Span, Token};
use std::fmt::{self, Debug, Display};

/// A node of the syntax tree.
///
/// Branch nodes are built by a production rule's `produce` callback (or by a
/// recovery factory); terminal nodes wrap the token that was shifted. A
/// parent owns its children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode<T, N> {
    /// Interior node tagged with the node kind of the rule that built it.
    Branch {
        kind: N,
        children: Vec<SyntaxNode<T, N>>,
    },
    /// Leaf holding a matched token.
    Terminal(T),
}

impl<T, N> SyntaxNode<T, N> {
    pub fn branch(kind: N, children: Vec<SyntaxNode<T, N>>) -> Self {
        Self::Branch { kind, children }
    }

    pub fn leaf(token: T) -> Self {
        Self::Terminal(token)
    }

    /// Node kind of a branch; `None` for terminal nodes.
    pub fn kind(&self) -> Option<&N> {
        match self {
            Self::Branch { kind, .. } => Some(kind),
            Self::Terminal(_) => None,
        }
    }

    pub fn children(&self) -> &[SyntaxNode<T, N>] {
        match self {
            Self::Branch { children, .. } => children,
            Self::Terminal(_) => &[],
        }
    }

    pub fn into_children(self) -> Vec<SyntaxNode<T, N>> {
        match self {
            Self::Branch { children, .. } => children,
            Self::Terminal(_) => Vec::new(),
        }
    }

    pub fn token(&self) -> Option<&T> {
        match self {
            Self::Terminal(token) => Some(token),
            Self::Branch { .. } => None,
        }
    }

    /// Left-most token below this node.
    pub fn first_token(&self) -> Option<&T> {
        match self {
            Self::Terminal(token) => Some(token),
            Self::Branch { children, .. } => children.iter().find_map(|c| c.first_token()),
        }
    }

    /// Right-most token below this node, skipping empty branches such as
    /// epsilon reductions and recovery placeholders.
    pub fn last_token(&self) -> Option<&T> {
        match self {
            Self::Terminal(token) => Some(token),
            Self::Branch { children, .. } => children.iter().rev().find_map(|c| c.last_token()),
        }
    }

    /// Number of nodes in this subtree, this node included.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(SyntaxNode::size).sum::<usize>()
    }

    /// Indented multi-line rendering: one node per line, branch kinds via
    /// `Debug`, terminals via their text.
    pub fn display_tree(&self) -> TreeDisplay<'_, T, N> {
        TreeDisplay { node: self }
    }
}

impl<T: Token, N> SyntaxNode<T, N> {
    /// Source range covered by this node's tokens; `None` when it holds none.
    pub fn span(&self) -> Option<Span> {
        let first = self.first_token()?.span();
        let last = self.last_token()?.span();
        Some(first.merge(&last))
    }
}

/// Adaptor returned by [`SyntaxNode::display_tree`].
pub struct TreeDisplay<'a, T, N> {
    node: &'a SyntaxNode<T, N>,
}

impl<T, N> TreeDisplay<'_, T, N>
where
    T: Token,
    N: Debug,
{
    fn write_node(f: &mut fmt::Formatter<'_>, node: &SyntaxNode<T, N>, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        match node {
            SyntaxNode::Terminal(token) => writeln!(f, "{:indent$}{:?}", "", token.text()),
            SyntaxNode::Branch { kind, children } => {
                writeln!(f, "{:indent$}{:?}", "", kind)?;
                for child in children {
                    Self::write_node(f, child, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl<T, N> Display for TreeDisplay<'_, T, N>
where
    T: Token,
    N: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_node(f, self.node, 0)
    }
}
