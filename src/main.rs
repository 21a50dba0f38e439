//! Command line front end: search, rewrite, split and diff text files.
//!
//! Logging: set `RUST_LOG=seqpat=debug` (or pass `--verbose`) to see engine
//! events on stderr.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use seqpat::{
    Change, CollectionDifference, ElementChange, Match, Pattern, SequenceDiff, SequenceMutation,
    SequenceSearch, parse,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log engine events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the first, last or every match of a pattern
    Find {
        pattern: String,
        /// File to search, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: String,
        /// Search backwards from the end
        #[arg(long, conflicts_with = "all")]
        last: bool,
        /// Print every non-overlapping match
        #[arg(long)]
        all: bool,
    },
    /// Replace every match of a pattern with literal text
    Replace {
        pattern: String,
        replacement: String,
        #[arg(value_name = "FILE")]
        file: String,
    },
    /// Print the components separated by a pattern, one per line
    Split {
        pattern: String,
        #[arg(value_name = "FILE")]
        file: String,
    },
    /// Print the first balanced span between two patterns
    Nest {
        open: String,
        close: String,
        #[arg(value_name = "FILE")]
        file: String,
    },
    /// Compare two files line by line
    Diff {
        old: String,
        new: String,
        /// Pair lines that were moved
        #[arg(long)]
        moves: bool,
        /// Print the difference as JSON change records
        #[arg(long)]
        json: bool,
        /// Colour removed and inserted lines
        #[arg(long)]
        color: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose {
            "seqpat=debug"
        } else {
            "seqpat=warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match run(args.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

/// Run one subcommand. `Ok(false)` means the search found nothing.
fn run(command: Command) -> Result<bool> {
    match command {
        Command::Find {
            pattern,
            file,
            last,
            all,
        } => {
            let pattern = parse_pattern(&pattern)?;
            let text = read_chars(&file)?;
            let found: Vec<Match<'_, char>> = if all {
                text.matches(&pattern)
            } else if last {
                text.last_match(&pattern).into_iter().collect()
            } else {
                text.first_match(&pattern).into_iter().collect()
            };
            debug!(count = found.len(), "find");
            for m in &found {
                println!("{}..{}\t{}", m.start(), m.end(), m.text());
            }
            Ok(!found.is_empty())
        }
        Command::Replace {
            pattern,
            replacement,
            file,
        } => {
            let pattern = parse_pattern(&pattern)?;
            let text = read_chars(&file)?;
            let replacement: Vec<char> = replacement.chars().collect();
            let rewritten: String = text
                .replacing_matches(&pattern, &replacement)
                .into_iter()
                .collect();
            print!("{rewritten}");
            Ok(true)
        }
        Command::Split { pattern, file } => {
            let pattern = parse_pattern(&pattern)?;
            let text = read_chars(&file)?;
            for component in text.components(&pattern) {
                println!("{}", component.text());
            }
            Ok(true)
        }
        Command::Nest { open, close, file } => {
            let (open, close) = (parse_pattern(&open)?, parse_pattern(&close)?);
            let text = read_chars(&file)?;
            match text.first_nesting_level(&open, &close) {
                Some(level) => {
                    println!("container\t{}", level.container.text());
                    println!("contents\t{}", level.contents.text());
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        Command::Diff {
            old,
            new,
            moves,
            json,
            color,
        } => {
            let old_lines = read_lines(&old)?;
            let new_lines = read_lines(&new)?;
            if json {
                let mut difference = CollectionDifference::between(&old_lines, &new_lines);
                if moves {
                    difference = difference.inferring_moves();
                }
                println!("{}", serde_json::to_string_pretty(&difference)?);
            } else {
                print_diff(&old_lines, &new_lines, moves, color);
            }
            Ok(true)
        }
    }
}

fn parse_pattern(source: &str) -> Result<Pattern<char>> {
    parse(source).with_context(|| format!("invalid pattern {source:?}"))
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut contents = String::new();
        io::stdin()
            .read_to_string(&mut contents)
            .context("failed to read stdin")?;
        Ok(contents)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn read_chars(path: &str) -> Result<Vec<char>> {
    Ok(read_input(path)?.chars().collect())
}

fn read_lines(path: &str) -> Result<Vec<String>> {
    Ok(read_input(path)?.lines().map(str::to_owned).collect())
}

/// How a rendered diff line is marked and coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Kept,
    Removed,
    Inserted,
}

fn print_diff(old: &[String], new: &[String], moves: bool, color: bool) {
    for (kind, line) in diff_lines(old, new, moves) {
        match (color, kind) {
            (true, LineKind::Removed) => println!("{}", line.red()),
            (true, LineKind::Inserted) => println!("{}", line.green()),
            _ => println!("{line}"),
        }
    }
}

/// Render the line diff of `old` into `new`, one entry per output line.
///
/// The diff is computed once; with `moves`, the paired removals and
/// insertions are annotated with the line they moved to or from.
fn diff_lines(old: &[String], new: &[String], moves: bool) -> Vec<(LineKind, String)> {
    // Removal offsets index `old`, insertion offsets index `new`, the same
    // coordinates the ranged changes use.
    let changes = new.difference(old);
    let (moved_out, moved_in) = if moves {
        let difference = CollectionDifference::from_changes(&changes, old, new).inferring_moves();
        let links = |side: &[ElementChange<String>]| -> HashMap<usize, usize> {
            side.iter()
                .filter_map(|c| Some((c.offset(), c.associated_with()?)))
                .collect()
        };
        (links(difference.removals()), links(difference.insertions()))
    } else {
        (HashMap::new(), HashMap::new())
    };

    let mut lines = Vec::new();
    for change in changes {
        match change {
            Change::Keep(r) => {
                lines.extend(old[r].iter().map(|line| (LineKind::Kept, format!("  {line}"))));
            }
            Change::Remove(r) => {
                for offset in r {
                    let note = moved_out
                        .get(&offset)
                        .map(|to| format!("  (moved to line {})", to + 1))
                        .unwrap_or_default();
                    lines.push((LineKind::Removed, format!("- {}{note}", old[offset])));
                }
            }
            Change::Insert(r) => {
                for offset in r {
                    let note = moved_in
                        .get(&offset)
                        .map(|from| format!("  (moved from line {})", from + 1))
                        .unwrap_or_default();
                    lines.push((LineKind::Inserted, format!("+ {}{note}", new[offset])));
                }
            }
        }
    }
    lines
}
