//! Drives the engine over input cases: splits case lines into per-tape contents, runs each
//! case under a step budget and collects a report per case.

use crate::{
    error::TuringMachineError,
    machine::Engine,
    table::TransitionTable,
    types::{Outcome, State, COMMENT_MARKER, DEFAULT_CASE_SEPARATOR, DEFAULT_MAX_STEPS},
};
use serde::{Deserialize, Serialize};

/// Settings shared by every case of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Steps allowed per case before giving up.
    pub max_steps: usize,
    /// Separates per-tape segments of a multi-tape case line.
    pub separator: char,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            separator: DEFAULT_CASE_SEPARATOR,
        }
    }
}

/// The result of running one input case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The case line as given.
    pub case: String,
    pub outcome: Outcome,
    /// The state the machine ended in.
    pub state: State,
    /// Final rendering of every tape, in tape order.
    pub tapes: Vec<String>,
    /// Steps executed, including a final step that found no rule.
    pub steps: usize,
}

/// Extracts case lines from a case file: comments are stripped, lines trimmed and blank
/// lines skipped.
pub fn parse_cases(input: &str) -> Vec<String> {
    input
        .lines()
        .map(|line| {
            line.split_once(COMMENT_MARKER)
                .map_or(line, |(before, _)| before)
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Splits a case line into one initial content per tape.
///
/// A single-tape machine uses the line verbatim. Otherwise the line is split on
/// `separator` and each segment trimmed; missing trailing segments are empty, extra
/// segments are an error.
pub fn split_case(
    case: &str,
    tapes: usize,
    separator: char,
) -> Result<Vec<String>, TuringMachineError> {
    if tapes == 1 {
        return Ok(vec![case.to_string()]);
    }

    let mut segments: Vec<String> = case.split(separator).map(|s| s.trim().to_string()).collect();
    if segments.len() > tapes {
        return Err(TuringMachineError::CaseFormat {
            expected: tapes,
            found: segments.len(),
            separator,
            case: case.to_string(),
        });
    }
    segments.resize(tapes, String::new());

    Ok(segments)
}

/// Runs a single case line to completion or budget exhaustion.
pub fn run_case(
    table: &TransitionTable,
    case: &str,
    config: &RunConfig,
) -> Result<RunReport, TuringMachineError> {
    run_case_with(table, case, config, |_| {})
}

/// Like [`run_case`], calling `observer` with the initial configuration and again after
/// every executed step.
pub fn run_case_with<F>(
    table: &TransitionTable,
    case: &str,
    config: &RunConfig,
    mut observer: F,
) -> Result<RunReport, TuringMachineError>
where
    F: FnMut(&Engine),
{
    tracing::debug!(case, max_steps = config.max_steps, "Starting case");

    let segments = split_case(case, table.tapes(), config.separator)?;
    let mut engine = Engine::new(table);
    engine.reset_for_case(segments.as_slice())?;

    observer(&engine);
    let outcome = engine.run_with(config.max_steps, &mut observer);

    let report = RunReport {
        case: case.to_string(),
        outcome,
        state: engine.current_state(),
        tapes: engine.tapes().iter().map(|tape| tape.render_string()).collect(),
        steps: engine.step_count(),
    };
    tracing::debug!(case, %outcome, steps = report.steps, "Finished case");

    Ok(report)
}

/// Runs every case of a case file. A malformed case only fails its own entry.
pub fn run_cases(
    table: &TransitionTable,
    input: &str,
    config: &RunConfig,
) -> Vec<Result<RunReport, TuringMachineError>> {
    parse_cases(input)
        .iter()
        .map(|case| {
            run_case(table, case, config).inspect_err(|e| {
                tracing::warn!(case = %case, error = %e, "Skipping malformed case");
            })
        })
        .collect()
}
