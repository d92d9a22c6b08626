//! Error types for table construction and case execution.
//!
//! Table errors come in three families (header, transition syntax, transition semantics),
//! and every error tied to a line of the definition carries that line verbatim.

use crate::types::Symbol;
use std::fmt;
use thiserror::Error;

/// A line of a table definition, as written by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number.
    pub number: usize,
    /// The raw line, comments included.
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: `{}`", self.number, self.text)
    }
}

/// Problems with the `key: value` block at the top of a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("unknown header key '{0}'")]
    UnknownKey(String),
    #[error("missing '{0}:' header")]
    MissingKey(&'static str),
    #[error("duplicate '{0}:' header")]
    DuplicateKey(String),
    #[error("missing value for '{0}:' header")]
    MissingValue(String),
    #[error("invalid integer for '{key}': {value:?}")]
    InvalidInteger { key: String, value: String },
    #[error("'{key}' must be a positive integer, got {value}")]
    NotPositive { key: String, value: i64 },
    #[error("'{key}' must be at most {max}, got {value}")]
    TooLarge { key: String, value: i64, max: usize },
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
    #[error("'{0}:' header is not allowed after the first transition")]
    Misplaced(String),
}

/// Malformed transition lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected 2 ':' separators, found {0}")]
    SeparatorCount(usize),
    #[error("expected {expected} read symbols, found {found}")]
    ReadCount { expected: usize, found: usize },
    #[error(
        "expected {expected} tokens after the second ':' (next state and one action per tape), found {found}"
    )]
    TokenCount { expected: usize, found: usize },
    #[error("invalid integer for {field}: {text:?}")]
    MalformedInteger { field: &'static str, text: String },
    #[error("read symbol '{0}' must be a single character")]
    MultiCharSymbol(String),
    #[error("invalid action token '{0}', expected 'L', 'R', 'S' or '<symbol><direction>'")]
    InvalidAction(String),
    #[error("invalid direction '{0}', expected one of 'L', 'R', 'S'")]
    InvalidDirection(char),
    #[error("{0}")]
    Grammar(String),
}

/// Whether a symbol appeared on the read side or the write side of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRole {
    Read,
    Write,
}

impl fmt::Display for SymbolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolRole::Read => f.write_str("read"),
            SymbolRole::Write => f.write_str("write"),
        }
    }
}

/// Well-formed transition lines that contradict the header or an earlier line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("current state {state} is outside the state range [0, {max}]")]
    StateOutOfRange { state: i64, max: usize },
    #[error("next state {state} is not in [0, {max}] nor accept (-1) nor reject (-2)")]
    TargetOutOfRange { state: i64, max: usize },
    #[error("{role} symbol '{symbol}' is not in the alphabet \"{alphabet}\"")]
    SymbolNotInAlphabet {
        role: SymbolRole,
        symbol: Symbol,
        alphabet: String,
    },
    #[error("duplicate transition for state {state} reading {read:?}")]
    DuplicateTransition { state: usize, read: Vec<Symbol> },
}

/// Any reason a table definition was refused. No partial table is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Header error: {kind}{}", located(.line))]
    Header {
        kind: HeaderError,
        line: Option<SourceLine>,
    },
    #[error("Transition syntax error: {kind} ({line})")]
    TransitionSyntax { kind: SyntaxError, line: SourceLine },
    #[error("Transition semantic error: {kind} ({line})")]
    TransitionSemantic {
        kind: SemanticError,
        line: SourceLine,
    },
}

impl TableError {
    /// The offending line, when the error is tied to one.
    pub fn line(&self) -> Option<&SourceLine> {
        match self {
            TableError::Header { line, .. } => line.as_ref(),
            TableError::TransitionSyntax { line, .. } => Some(line),
            TableError::TransitionSemantic { line, .. } => Some(line),
        }
    }
}

fn located(line: &Option<SourceLine>) -> String {
    line.as_ref()
        .map(|line| format!(" ({line})"))
        .unwrap_or_default()
}

/// Represents the errors surfaced by the public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuringMachineError {
    /// The table definition was rejected.
    #[error("Table definition error: {0}")]
    Table(#[from] TableError),
    /// An input case has more segments than the machine has tapes.
    #[error(
        "Case format error: expected at most {expected} tape segments separated by '{separator}', got {found} in {case:?}"
    )]
    CaseFormat {
        expected: usize,
        found: usize,
        separator: char,
        case: String,
    },
    /// An engine was reset with more initial tape contents than it has tapes.
    #[error("Case format error: got {found} initial tape contents for a machine with {expected} tapes")]
    TapeCount { expected: usize, found: usize },
    /// A tape index outside `[0, tapes - 1]` was requested.
    #[error("Tape index {index} is out of bounds (machine has {tapes} tapes)")]
    TapeIndex { index: usize, tapes: usize },
    /// Indicates an error related to reading tables or case files.
    #[error("File error: {0}")]
    FileError(String),
}
