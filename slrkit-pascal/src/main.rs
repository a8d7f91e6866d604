//! Command-line interface for the Pascal subset front end.
//!
//! `parse` checks a source file and prints its syntax tree and any syntax
//! errors (`--trace` adds one line per parser step). `table` dumps the
//! productions, item sets, FIRST/FOLLOW sets and actions of the SLR(1)
//! table; `dot` writes the state graph in Graphviz format. Logging is
//! configured through `RUST_LOG`.

#[cfg(feature = "cli")]
mod real {
    use anyhow::{Context, Result, bail};
    use clap::{Parser, Subcommand};
    use slrkit::report;
    use slrkit_pascal::PascalParser;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    #[derive(Parser, Debug)]
    #[command(version, about = "SLR(1) parser for a Pascal subset", long_about = None)]
    struct Args {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand, Debug)]
    enum Commands {
        /// Parses a source file and prints its syntax tree
        Parse {
            /// Pascal source file
            input: PathBuf,

            /// Print every parser configuration
            #[arg(short, long)]
            trace: bool,
        },
        /// Dumps the parse table
        Table,
        /// Writes the state graph in Graphviz dot format
        Dot {
            /// Output file; standard output if omitted
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
    }

    fn parse(parser: &PascalParser, input: &Path, trace: bool) -> Result<()> {
        let source = std::fs::read_to_string(input)
            .with_context(|| format!("can't read {:?}", input))?;
        let mut out = io::stdout().lock();
        if trace {
            let traced = parser.parse_traced(&source)?;
            for config in &traced.trace {
                let row = config.row(parser.table());
                writeln!(
                    out,
                    "{:<40} | {:<24} | {:<40} | {}",
                    row.nodes, row.states, row.input, row.operation
                )?;
            }
            for error in &traced.errors {
                eprintln!("error: {}", error);
            }
            let tree = traced.result?;
            write!(out, "{}", tree.display_tree())?;
            return Ok(());
        }
        let outcome = parser.parse(&source)?;
        for error in &outcome.errors {
            eprintln!("error: {}", error);
        }
        write!(out, "{}", outcome.tree.display_tree())?;
        if !outcome.is_clean() {
            bail!("{} syntax error(s)", outcome.errors.len());
        }
        Ok(())
    }

    pub fn main() -> Result<()> {
        env_logger::init();
        let args = Args::parse();
        let parser = PascalParser::new().context("building the Pascal table")?;
        match args.command {
            Commands::Parse { input, trace } => parse(&parser, &input, trace),
            Commands::Table => {
                let table = parser.table();
                let mut out = io::stdout().lock();
                report::write_prods(&mut out, table)?;
                writeln!(out)?;
                report::write_sets(&mut out, table)?;
                writeln!(out)?;
                report::write_states(&mut out, table)?;
                writeln!(out)?;
                report::write_actions(&mut out, table)?;
                Ok(())
            }
            Commands::Dot { output } => {
                let dot = report::to_dot(parser.table());
                match output {
                    Some(path) => std::fs::write(&path, dot)
                        .with_context(|| format!("can't write {:?}", path)),
                    None => {
                        io::stdout().lock().write_all(dot.as_bytes())?;
                        Ok(())
                    }
                }
            }
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("slrkit-pascal disabled (compiled without `cli` feature)");
}
