//! Text and Graphviz renderings of a [`Table`], and of parser traces.
//!
//! Nothing here affects parsing; these are the views used to inspect a
//! grammar while writing it.

use crate::sets::SymbolSet;
use crate::{Action, Configuration, NonTerminalKey, Operation, SyntaxNode, Table, Token};
use indexmap::IndexMap;
use std::fmt::{Debug, Write as _};
use std::io::{self, Write};

/// Writes the numbered production list.
pub fn write_prods<W, K, T, N>(out: &mut W, table: &Table<K, T, N>) -> io::Result<()>
where
    W: Write,
    K: NonTerminalKey,
{
    let rules = table.grammar().rules();
    writeln!(out, "PRODUCTIONS ({})", rules.len())?;
    for (i, rule) in rules.iter().enumerate() {
        writeln!(out, "  {:>3}  {}", i, rule)?;
    }
    Ok(())
}

/// Writes every state's item set, one item per line.
pub fn write_states<W, K, T, N>(out: &mut W, table: &Table<K, T, N>) -> io::Result<()>
where
    W: Write,
    K: NonTerminalKey,
{
    let grammar = table.grammar();
    writeln!(out, "STATES ({})", table.states().len())?;
    for state in table.states() {
        writeln!(out, "state {} [{}]", state.id(), state.context())?;
        for item in state.items() {
            writeln!(out, "    {}", item.display(grammar))?;
        }
    }
    Ok(())
}

/// Writes the FIRST and FOLLOW sets of every nonterminal. Nullable keys
/// list `ε` in their FIRST set.
pub fn write_sets<W, K, T, N>(out: &mut W, table: &Table<K, T, N>) -> io::Result<()>
where
    W: Write,
    K: NonTerminalKey,
{
    write_set_map(out, "FIRST", table.sets().first_sets())?;
    write_set_map(out, "FOLLOW", table.sets().follow_sets())
}

fn write_set_map<W, K, T>(
    out: &mut W,
    label: &str,
    sets: &IndexMap<K, SymbolSet<K, T>>,
) -> io::Result<()>
where
    W: Write,
    K: NonTerminalKey,
{
    writeln!(out, "{}", label)?;
    for (key, set) in sets {
        let members: Vec<String> = set.iter().map(ToString::to_string).collect();
        writeln!(out, "  {}: {{{}}}", key, members.join(", "))?;
    }
    Ok(())
}

/// Writes the action and goto entries of every state.
///
/// Shifts print as `s<state>`, reductions as `r<rule>`, gotos as `g<state>`.
pub fn write_actions<W, K, T, N>(out: &mut W, table: &Table<K, T, N>) -> io::Result<()>
where
    W: Write,
    K: NonTerminalKey,
{
    writeln!(out, "ACTIONS")?;
    for state in table.states() {
        write!(out, "  {:>3}:", state.id())?;
        for (terminal, action) in state.actions() {
            match action {
                Action::Shift(to) => write!(out, " {}=s{}", terminal, to)?,
                Action::Reduce(rule) => write!(out, " {}=r{}", terminal, rule)?,
            }
        }
        for (key, to) in state.gotos() {
            write!(out, " {}=g{}", key, to)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn escape(label: &str) -> String {
    label.replace('\\', r"\\").replace('"', "\\\"")
}

/// Renders the state graph in Graphviz dot format: one box per state
/// labelled with its items, and one edge per shift or goto.
pub fn to_dot<K, T, N>(table: &Table<K, T, N>) -> String
where
    K: NonTerminalKey,
{
    let grammar = table.grammar();
    let mut dot = String::from("digraph slr {\n\trankdir=LR;\n\n\tnode [shape=rectangle];\n");
    for state in table.states() {
        let label = state
            .items()
            .iter()
            .map(|item| escape(&item.display(grammar).to_string()))
            .collect::<Vec<_>>()
            .join(r"\l");
        let _ = writeln!(dot, "\t{} [label=\"{}: {}\\l\"];", state.id(), state.id(), label);
    }
    dot.push('\n');
    for state in table.states() {
        for (terminal, action) in state.actions() {
            if let Action::Shift(to) = action {
                let _ = writeln!(
                    dot,
                    "\t{} -> {} [label=\"{}\"];",
                    state.id(),
                    to,
                    escape(terminal.name())
                );
            }
        }
        for (key, to) in state.gotos() {
            let _ = writeln!(
                dot,
                "\t{} -> {} [label=\"{}\", style=dashed];",
                state.id(),
                to,
                escape(&key.to_string())
            );
        }
    }
    dot.push_str("}\n");
    dot
}

/// One rendered line of a parser trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub nodes: String,
    pub states: String,
    pub input: String,
    pub operation: String,
}

impl<T, N> Configuration<T, N>
where
    T: Token,
    N: Debug,
{
    /// Renders this snapshot against the table it was recorded with.
    ///
    /// Branch nodes show the key of the rule that produces their kind,
    /// falling back to the kind itself; the input ends with `$`.
    pub fn row<K>(&self, table: &Table<K, T, N>) -> TraceRow
    where
        K: NonTerminalKey,
        N: PartialEq,
    {
        let nodes = self
            .nodes
            .iter()
            .map(|node| match node {
                SyntaxNode::Terminal(token) => token.text().to_owned(),
                SyntaxNode::Branch { kind, .. } => match table.kind_key(kind) {
                    Some(key) => key.to_string(),
                    None => format!("{:?}", kind),
                },
            })
            .collect::<Vec<_>>()
            .join(" ");
        let states = self
            .states
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let mut input: Vec<&str> = self.input.iter().map(Token::text).collect();
        input.push("$");
        let operation = match self.operation {
            Operation::Shift(to) => format!("shift {}", to),
            Operation::Reduce(rule) => format!("reduce {}", table.grammar().rule(rule)),
            Operation::Accept => "accept".to_owned(),
            Operation::Recover { success: true } => "recover".to_owned(),
            Operation::Recover { success: false } => "recovery failed".to_owned(),
        };
        TraceRow {
            nodes,
            states,
            input: input.join(" "),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestGrammar, init_logger, lex, stmt_rules};
    use crate::{Driver, Grammar, TableBuilder};

    fn table() -> Table<&'static str, crate::test_support::TestToken, &'static str> {
        let grammar: TestGrammar = Grammar::new(stmt_rules()).unwrap();
        TableBuilder::new(grammar)
            .recover_with("Stmt", || SyntaxNode::branch("Stmt", vec![]))
            .build("Start")
            .unwrap()
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_dumps_cover_grammar() {
        init_logger();
        let table = table();
        let prods = render(|out| write_prods(out, &table));
        assert!(prods.starts_with("PRODUCTIONS (9)\n"));
        assert!(prods.contains("    3  Stmts → Stmts ; Stmt\n"));

        let states = render(|out| write_states(out, &table));
        assert!(states.contains("state 0 [0/Left]\n    Start → · Program\n"));

        let sets = render(|out| write_sets(out, &table));
        assert!(sets.contains("  Stmt: {id}\n"));
        assert!(sets.contains("  Stmt: {;}\n"));
        assert!(sets.contains("  Start: {}\n"));

        let actions = render(|out| write_actions(out, &table));
        assert_eq!(actions.lines().count(), table.states().len() + 1);
        assert!(actions.lines().nth(1).unwrap().contains("id=s"));
    }

    #[test]
    fn dot_has_node_per_state_and_edge_per_transition() {
        let table = table();
        let dot = to_dot(&table);
        assert!(dot.starts_with("digraph slr {"));
        assert!(dot.ends_with("}\n"));
        let edges = dot.lines().filter(|l| l.contains("->")).count();
        let expected: usize = table
            .states()
            .iter()
            .map(|s| {
                s.actions()
                    .filter(|(_, a)| matches!(a, Action::Shift(_)))
                    .count()
                    + s.gotos().count()
            })
            .sum();
        assert_eq!(edges, expected);
        assert_eq!(
            dot.lines().filter(|l| l.contains("[label=\"") && !l.contains("->")).count(),
            table.states().len()
        );
    }

    #[test]
    fn trace_rows_render_each_step() {
        let table = table();
        let mut trace = Vec::new();
        let mut errors = Vec::new();
        let mut input = lex("id := num");
        Driver::new(&table)
            .parse(&mut input, table.start_state(), &"Program", Some(&mut trace), &mut errors)
            .unwrap();
        let rows: Vec<TraceRow> = trace.iter().map(|c| c.row(&table)).collect();
        assert_eq!(rows[0].nodes, "");
        assert_eq!(rows[0].states, "0");
        assert_eq!(rows[0].input, "id := num $");
        assert!(rows[0].operation.starts_with("shift "));
        let reduce_stmt = rows
            .iter()
            .find(|r| r.operation == "reduce Stmt → id := E")
            .unwrap();
        assert_eq!(reduce_stmt.nodes, "id := E");
        assert_eq!(reduce_stmt.input, "$");
        assert_eq!(rows.last().unwrap().operation, "accept");
        assert_eq!(rows.last().unwrap().nodes, "Program");
    }
}
