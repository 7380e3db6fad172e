/*!
 * Command Shell
 * Line-oriented driver for a memory space
 *
 * Script format, one command per line:
 * - `malloc <length>`: allocate, prints the base address
 * - `free <address>`: release the block at a base address
 * - `defrag`: coalesce the free list
 * - `show`: render both block lists
 * - `stats` / `stats json`: usage statistics
 * - `dump`: both block lists as JSON
 *
 * Blank lines and lines starting with `#` are skipped. Allocator failures are
 * reported and the script continues; malformed lines stop it.
 */

use crate::core::types::{Address, RequestAddress, RequestSize};
use crate::memory::{MemoryError, MemoryInfo, MemoryPressure, MemorySpace, MemoryStats};
use crate::monitoring::span_command;
use miette::Diagnostic;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Shell operation result
pub type ShellResult<T> = Result<T, ShellError>;

/// Reasons a single line fails to parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' expects an argument")]
    MissingArgument(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Shell errors
#[derive(Error, Debug, Diagnostic)]
pub enum ShellError {
    #[error("line {line}: {source}")]
    #[diagnostic(
        code(shell::parse),
        help("Commands: malloc <length>, free <address>, defrag, show, stats [json], dump")
    )]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("I/O error: {0}")]
    #[diagnostic(code(shell::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(shell::serialization))]
    Serialization(#[from] serde_json::Error),
}

/// A parsed shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Malloc(RequestSize),
    Free(RequestAddress),
    Defrag,
    Show,
    Stats { json: bool },
    Dump,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Malloc(_) => "malloc",
            Command::Free(_) => "free",
            Command::Defrag => "defrag",
            Command::Show => "show",
            Command::Stats { .. } => "stats",
            Command::Dump => "dump",
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| ParseError::UnknownCommand(String::new()))?;
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(ParseError::UnexpectedArgument(extra.to_string()));
        }

        let command = match name.to_ascii_lowercase().as_str() {
            "malloc" => Command::Malloc(number(arg, "malloc")?),
            "free" => Command::Free(number(arg, "free")?),
            "defrag" => no_argument(arg, Command::Defrag)?,
            "show" => no_argument(arg, Command::Show)?,
            "dump" => no_argument(arg, Command::Dump)?,
            "stats" => match arg {
                None => Command::Stats { json: false },
                Some("json") => Command::Stats { json: true },
                Some(other) => return Err(ParseError::UnexpectedArgument(other.to_string())),
            },
            _ => return Err(ParseError::UnknownCommand(name.to_string())),
        };

        Ok(command)
    }
}

fn number<T: FromStr>(arg: Option<&str>, command: &'static str) -> Result<T, ParseError> {
    let raw = arg.ok_or(ParseError::MissingArgument(command))?;
    raw.parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

fn no_argument(arg: Option<&str>, command: Command) -> Result<Command, ParseError> {
    match arg {
        Some(extra) => Err(ParseError::UnexpectedArgument(extra.to_string())),
        None => Ok(command),
    }
}

/// Result of executing one command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Allocated(Address),
    Freed(Address),
    Defragmented(usize),
    Rendered(String),
    Stats(MemoryStats, MemoryPressure),
    Json(String),
    Failed(MemoryError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Allocated(address) => write!(f, "allocated at {}", address),
            Outcome::Freed(address) => write!(f, "freed {}", address),
            Outcome::Defragmented(merges) => write!(f, "defragmented ({} merges)", merges),
            Outcome::Rendered(text) | Outcome::Json(text) => write!(f, "{}", text),
            Outcome::Stats(stats, pressure) => write!(
                f,
                "total={} used={} available={} usage={:.1}% allocated_blocks={} free_blocks={} largest_free={} pressure={}",
                stats.total_memory,
                stats.used_memory,
                stats.available_memory,
                stats.usage_percentage,
                stats.allocated_blocks,
                stats.free_blocks,
                stats.largest_free_block,
                pressure
            ),
            Outcome::Failed(error) => write!(f, "error: {}", error),
        }
    }
}

/// Counters for a finished script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub executed: usize,
    pub failed: usize,
}

/// Drives a memory space from textual commands
pub struct Shell {
    space: MemorySpace,
}

impl Shell {
    pub fn new(space: MemorySpace) -> Self {
        Self { space }
    }

    pub fn space(&self) -> &MemorySpace {
        &self.space
    }

    /// Execute one command; allocator errors become [`Outcome::Failed`]
    pub fn execute(&mut self, command: Command) -> ShellResult<Outcome> {
        let outcome = match command {
            Command::Malloc(length) => match self.space.malloc(length) {
                Ok(address) => Outcome::Allocated(address),
                Err(e) => Outcome::Failed(e),
            },
            Command::Free(requested) => match Address::try_from(requested) {
                Ok(address) => match self.space.free(address) {
                    Ok(()) => Outcome::Freed(address),
                    Err(e) => Outcome::Failed(e),
                },
                Err(_) => {
                    warn!(address = requested, "Rejected free of a negative address");
                    Outcome::Failed(MemoryError::NegativeAddress(requested))
                }
            },
            Command::Defrag => Outcome::Defragmented(self.space.defrag()),
            Command::Show => Outcome::Rendered(self.space.to_string()),
            Command::Stats { json: false } => {
                Outcome::Stats(self.space.stats(), self.space.pressure())
            }
            Command::Stats { json: true } => {
                Outcome::Json(serde_json::to_string(&self.space.stats())?)
            }
            Command::Dump => Outcome::Json(serde_json::to_string(&self.space.snapshot())?),
        };
        Ok(outcome)
    }

    /// Run every command in `reader`, writing one result per command
    pub fn run_script<R, W>(&mut self, reader: R, mut writer: W) -> ShellResult<ScriptSummary>
    where
        R: BufRead,
        W: Write,
    {
        let mut summary = ScriptSummary::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let command = text.parse::<Command>().map_err(|source| ShellError::Parse {
                line: line_no,
                source,
            })?;

            let span = span_command(command.name(), line_no);
            let outcome = {
                let _entered = span.enter();
                self.execute(command)?
            };
            match &outcome {
                Outcome::Failed(error) => span.record_error(&error.to_string()),
                _ => span.record_result(true),
            }

            summary.executed += 1;
            if outcome.is_failure() {
                summary.failed += 1;
            }
            writeln!(writer, "{}", outcome)?;
        }

        info!(
            executed = summary.executed,
            failed = summary.failed,
            "Script finished"
        );
        Ok(summary)
    }

    /// Run a script file
    pub fn run_file<P, W>(&mut self, path: P, writer: W) -> ShellResult<ScriptSummary>
    where
        P: AsRef<Path>,
        W: Write,
    {
        let file = File::open(path)?;
        self.run_script(BufReader::new(file), writer)
    }
}
