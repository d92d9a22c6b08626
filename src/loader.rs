//! This module provides the `TableLoader` struct, responsible for reading transition tables
//! and case files from disk.

use crate::error::TuringMachineError;
use crate::parser::parse;
use crate::runner::parse_cases;
use crate::table::TransitionTable;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of transition table files.
pub const TABLE_EXTENSION: &str = "tt";

/// `TableLoader` is a utility struct for loading transition tables and input cases.
pub struct TableLoader;

impl TableLoader {
    /// Loads a single transition table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the file is read and parsed successfully.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::Table)` if the content is not a valid table.
    pub fn load_table(path: &Path) -> Result<TransitionTable, TuringMachineError> {
        let content = read(path)?;

        Ok(parse(&content)?)
    }

    /// Parses a transition table from in-memory content.
    pub fn load_table_from_string(content: &str) -> Result<TransitionTable, TuringMachineError> {
        Ok(parse(content)?)
    }

    /// Loads every `.tt` file in `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each table file yields one
    /// entry, so a broken file never hides the others.
    pub fn load_tables(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, TransitionTable), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().map_or(true, |ext| ext != TABLE_EXTENSION) {
                    return None;
                }

                Some(Self::load_table(&path).map(|table| (path, table)))
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }

    /// Reads a case file and returns its case lines (see [`parse_cases`]).
    pub fn load_cases(path: &Path) -> Result<Vec<String>, TuringMachineError> {
        Ok(parse_cases(&read(path)?))
    }
}

fn read(path: &Path) -> Result<String, TuringMachineError> {
    fs::read_to_string(path).map_err(|e| {
        TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}
