//! This crate provides the core logic for a deterministic multi-tape Turing machine.
//! It includes modules for parsing transition tables, executing them over input cases,
//! analyzing tables for suspicious rules, and a small collection of bundled tables.

pub mod analyzer;
pub mod error;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod runner;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisWarning` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisWarning};
/// Re-exports the error taxonomy.
pub use error::{
    HeaderError, SemanticError, SourceLine, SymbolRole, SyntaxError, TableError,
    TuringMachineError,
};
/// Re-exports the `TableLoader` struct from the loader module.
pub use loader::TableLoader;
/// Re-exports the `Engine` struct from the machine module.
pub use machine::Engine;
/// Re-exports the `parse` function and `TableParser` from the parser module.
pub use parser::{parse, TableParser};
/// Re-exports `BundledTable`, `TableManager`, and `TABLES` from the programs module.
pub use programs::{BundledTable, TableManager, TABLES};
/// Re-exports the case-running functions, `RunConfig`, and `RunReport` from the runner module.
pub use runner::{parse_cases, run_case, run_case_with, run_cases, split_case, RunConfig, RunReport};
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Action, Direction, Halt, Outcome, State, Step, Symbol, Transition, TransitionKey,
    BLANK_SYMBOL, DEFAULT_CASE_SEPARATOR, DEFAULT_MAX_STEPS, MAX_STATES, MAX_TAPES,
};
