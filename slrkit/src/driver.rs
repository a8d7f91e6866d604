//! Table-driven shift-reduce parser with panic-mode error recovery.
//!
//! The driver keeps two parallel stacks, one of syntax nodes and one of
//! states, and consumes tokens from the front of a queue. On a syntax error
//! it records a diagnostic, unwinds the stacks to the nearest state with a
//! goto on a recoverable nonterminal, skips input up to a token in that
//! nonterminal's FOLLOW set, and pushes a placeholder node in the
//! nonterminal's place. Parsing then continues, so several errors can be
//! reported in one pass.

use crate::{Action, NonTerminalKey, ParseError, StateId, SyntaxError, SyntaxNode, Table, Token};
use smartstring::alias::String;
use std::collections::VecDeque;
use std::fmt::{Debug, Write as _};

/// Counters collected over a driver's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserStats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
    pub recoveries: usize,
}

/// The step a [`Configuration`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Shift(StateId),
    /// Reduction by the rule with this index.
    Reduce(usize),
    Accept,
    Recover { success: bool },
}

/// Snapshot of the parser taken while tracing.
///
/// Shift, reduce and accept snapshots show the stacks and input before the
/// step is applied; recovery snapshots show them after.
#[derive(Debug, Clone)]
pub struct Configuration<T, N> {
    pub nodes: Vec<SyntaxNode<T, N>>,
    pub states: Vec<StateId>,
    pub input: Vec<T>,
    pub operation: Operation,
}

/// Result of [`Driver::parse_tokens`]: a tree plus the errors that were
/// recovered from while building it.
#[derive(Debug, Clone)]
pub struct ParseOutcome<T, N> {
    pub tree: SyntaxNode<T, N>,
    pub errors: Vec<SyntaxError>,
}

impl<T, N> ParseOutcome<T, N> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the automaton of one [`Table`].
///
/// A driver borrows its table immutably and owns only its statistics, so
/// any number of drivers may share one table across threads.
pub struct Driver<'t, K, T, N> {
    table: &'t Table<K, T, N>,
    stats: ParserStats,
}

struct Stacks<T, N> {
    nodes: Vec<SyntaxNode<T, N>>,
    states: Vec<StateId>,
}

impl<'t, K, T, N> Driver<'t, K, T, N>
where
    K: NonTerminalKey,
    T: Token + Clone,
    N: Clone + PartialEq + Debug,
{
    pub fn new(table: &'t Table<K, T, N>) -> Self {
        Self {
            table,
            stats: ParserStats::default(),
        }
    }

    pub fn table(&self) -> &'t Table<K, T, N> {
        self.table
    }

    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    /// Parses `tokens` from the start state until a node of kind `accept`
    /// is on top of the stack at end of input.
    pub fn parse_tokens<I>(&mut self, tokens: I, accept: &N) -> Result<ParseOutcome<T, N>, ParseError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut input: VecDeque<T> = tokens.into_iter().collect();
        let mut errors = Vec::new();
        let start = self.table.start_state();
        let tree = self.parse(&mut input, start, accept, None, &mut errors)?;
        Ok(ParseOutcome { tree, errors })
    }

    /// Runs the automaton from `start` over `input`.
    ///
    /// Every syntax error is appended to `errors`, whether or not recovery
    /// succeeds. When `trace` is given, a [`Configuration`] is appended for
    /// every step. On success the accepted node is returned and `input` is
    /// empty; on failure the returned [`ParseError`] carries a copy of all
    /// errors, the last one explaining why recovery stopped.
    pub fn parse(
        &mut self,
        input: &mut VecDeque<T>,
        start: StateId,
        accept: &N,
        mut trace: Option<&mut Vec<Configuration<T, N>>>,
        errors: &mut Vec<SyntaxError>,
    ) -> Result<SyntaxNode<T, N>, ParseError> {
        let mut stacks = Stacks {
            nodes: Vec::new(),
            states: vec![start],
        };
        let mut last_recovery: Option<usize> = None;
        let table = self.table;
        if start.0 >= table.states().len() {
            let message = format!("unknown start state {}", start);
            return Err(self.fatal(errors, message, None));
        }

        loop {
            if log::log_enabled!(log::Level::Trace) {
                self.dump_state(&stacks, input.front());
            }
            let Some(&top) = stacks.states.last() else {
                return Err(self.fatal(errors, "parser state stack is empty", None));
            };
            let state = table.state(top);

            let Some(token) = input.front() else {
                if stacks.nodes.last().and_then(SyntaxNode::kind) == Some(accept) {
                    log::trace!("Accept");
                    record(&mut trace, &stacks, input, Operation::Accept);
                    if let Some(tree) = stacks.nodes.pop() {
                        return Ok(tree);
                    }
                }
                if let [rule] = state.reducible() {
                    record(&mut trace, &stacks, input, Operation::Reduce(*rule));
                    self.reduce(&mut stacks, *rule, errors)?;
                    continue;
                }
                self.recover(&mut stacks, input, &mut trace, errors, &mut last_recovery)?;
                continue;
            };

            match state.action_for(token) {
                Some((_, Action::Shift(to))) => {
                    log::trace!("Shift {}", to);
                    record(&mut trace, &stacks, input, Operation::Shift(to));
                    if let Some(token) = input.pop_front() {
                        stacks.nodes.push(SyntaxNode::leaf(token));
                        stacks.states.push(to);
                        self.stats.tokens += 1;
                        self.stats.shifts += 1;
                    }
                }
                Some((_, Action::Reduce(rule))) => {
                    record(&mut trace, &stacks, input, Operation::Reduce(rule));
                    self.reduce(&mut stacks, rule, errors)?;
                }
                None => {
                    self.recover(&mut stacks, input, &mut trace, errors, &mut last_recovery)?;
                }
            }
        }
    }

    /// Pops the rule's children, builds its node and follows the goto.
    fn reduce(
        &mut self,
        stacks: &mut Stacks<T, N>,
        rule_index: usize,
        errors: &mut Vec<SyntaxError>,
    ) -> Result<(), ParseError> {
        let table = self.table;
        let rule = table.grammar().rule(rule_index);
        log::trace!("Reduce {} ({})", rule_index, rule);
        let len = rule.len();
        if stacks.nodes.len() < len || stacks.states.len() <= len {
            let message = format!("unable to reduce `{}`: stack holds {} nodes", rule, stacks.nodes.len());
            return Err(self.fatal(errors, message, None));
        }
        let children = stacks.nodes.split_off(stacks.nodes.len() - len);
        stacks.states.truncate(stacks.states.len() - len);
        let node = rule.produce(children);
        let Some(to) = stacks
            .states
            .last()
            .and_then(|&s| table.state(s).goto(rule.key()))
        else {
            let message = format!("unable to reduce `{}`: no goto on {}", rule, rule.key());
            return Err(self.fatal(errors, message, node.span()));
        };
        stacks.nodes.push(node);
        stacks.states.push(to);
        self.stats.reductions += 1;
        Ok(())
    }

    /// Records the syntax error at the current position and attempts
    /// panic-mode recovery.
    fn recover(
        &mut self,
        stacks: &mut Stacks<T, N>,
        input: &mut VecDeque<T>,
        trace: &mut Option<&mut Vec<Configuration<T, N>>>,
        errors: &mut Vec<SyntaxError>,
        last_recovery: &mut Option<usize>,
    ) -> Result<(), ParseError> {
        let table = self.table;
        let expected = stacks
            .states
            .last()
            .map(|&s| table.state(s).expected())
            .unwrap_or_default();
        let expected = if expected.is_empty() {
            std::string::String::new()
        } else {
            format!(", expected {}", expected.join(", "))
        };

        let Some(token) = input.front() else {
            let last = stacks.nodes.last().and_then(SyntaxNode::last_token);
            let error = match last {
                Some(token) => SyntaxError::new(
                    format!(
                        "unexpected end of input after \"{}\" at {}{}",
                        token.text(),
                        token.span().display(),
                        expected
                    ),
                    Some(token.span()),
                ),
                None => SyntaxError::new(format!("unexpected end of input{}", expected), None),
            };
            log::debug!("{}", error);
            errors.push(error);
            record(trace, stacks, input, Operation::Recover { success: false });
            return Err(self.fatal(errors, "error recovery failed: input exhausted", None));
        };

        let span = token.span();
        let error = SyntaxError::new(
            format!("unknown token \"{}\" at {}{}", token.text(), span.display(), expected),
            Some(span),
        );
        log::debug!("{}", error);
        errors.push(error);

        if *last_recovery == Some(input.len()) {
            record(trace, stacks, input, Operation::Recover { success: false });
            return Err(self.fatal(errors, "error recovery made no progress", Some(span)));
        }

        let key = loop {
            let Some(&top) = stacks.states.last() else {
                record(trace, stacks, input, Operation::Recover { success: false });
                return Err(self.fatal(errors, "error recovery failed: no recoverable state", Some(span)));
            };
            let state = table.state(top);
            if let Some(key) = table.recovery_keys().find(|k| state.goto(k).is_some()) {
                break key;
            }
            stacks.states.pop();
            stacks.nodes.pop();
        };

        let mut skipped = 0;
        if let Some(follow) = table.follow(key) {
            while let Some(token) = input.front() {
                let synchronizes = follow
                    .iter()
                    .filter_map(|s| s.as_terminal())
                    .any(|t| t.matches(token));
                if synchronizes {
                    break;
                }
                input.pop_front();
                skipped += 1;
            }
        } else {
            input.clear();
        }
        if input.is_empty() {
            record(trace, stacks, input, Operation::Recover { success: false });
            let message = format!("error recovery failed: no followable input for {}", key);
            return Err(self.fatal(errors, message, Some(span)));
        }

        let (Some(to), Some(placeholder)) = (
            stacks
                .states
                .last()
                .and_then(|&s| table.state(s).goto(key)),
            table.placeholder(key),
        ) else {
            let message = format!("error recovery failed: no placeholder for {}", key);
            return Err(self.fatal(errors, message, Some(span)));
        };
        stacks.nodes.push(placeholder);
        stacks.states.push(to);
        self.stats.tokens += skipped;
        self.stats.recoveries += 1;
        *last_recovery = Some(input.len());
        log::debug!(
            "recovered at {} by skipping {} token(s), resuming in state {}",
            key,
            skipped,
            to
        );
        record(trace, stacks, input, Operation::Recover { success: true });
        Ok(())
    }

    fn fatal(
        &self,
        errors: &mut Vec<SyntaxError>,
        message: impl Into<String>,
        span: Option<crate::Span>,
    ) -> ParseError {
        let error = SyntaxError::new(message, span);
        log::debug!("{}", error);
        errors.push(error);
        ParseError {
            errors: errors.clone(),
        }
    }

    fn dump_state(&self, stacks: &Stacks<T, N>, incoming: Option<&T>) {
        let mut output = String::new();
        let _ = write!(output, "<{}>", stacks.states.first().map_or(0, |s| s.0));
        for (node, state) in stacks.nodes.iter().zip(stacks.states.iter().skip(1)) {
            match node {
                SyntaxNode::Terminal(token) => {
                    let _ = write!(output, "  {:?}  <{}>", token.text(), state);
                }
                SyntaxNode::Branch { kind, .. } => {
                    let _ = write!(output, "  {:?}  <{}>", kind, state);
                }
            }
        }
        match incoming {
            Some(token) => {
                let _ = write!(output, "  <-  {:?}", token.text());
            }
            None => output.push_str("  <-  $"),
        }
        log::trace!("{}", output);
    }
}

fn record<T, N>(
    trace: &mut Option<&mut Vec<Configuration<T, N>>>,
    stacks: &Stacks<T, N>,
    input: &VecDeque<T>,
    operation: Operation,
) where
    T: Clone,
    N: Clone,
{
    if let Some(trace) = trace.as_deref_mut() {
        trace.push(Configuration {
            nodes: stacks.nodes.clone(),
            states: stacks.states.clone(),
            input: input.iter().cloned().collect(),
            operation,
        });
    }
}
