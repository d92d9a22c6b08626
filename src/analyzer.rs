//! This module provides advisory checks over a parsed [`TransitionTable`]. A table that
//! passes the parser is always runnable; these checks point out rules and states that can
//! never matter, or a machine that can never accept.

use crate::table::TransitionTable;
use crate::types::State;
use std::collections::HashSet;
use std::fmt;

/// Represents a suspicious property of an otherwise valid table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisWarning {
    /// Declared states that no sequence of transitions reaches from state 0.
    UnreachableStates(Vec<usize>),
    /// Declared states without any outgoing rule. Every step taken from them rejects.
    StatesWithoutTransitions(Vec<usize>),
    /// No rule targets the accepting state, so every case rejects or runs out of steps.
    NoAcceptingTransition,
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {:?}", states)
            }
            AnalysisWarning::StatesWithoutTransitions(states) => {
                write!(f, "States without transitions: {:?}", states)
            }
            AnalysisWarning::NoAcceptingTransition => {
                write!(f, "No transition leads to the accepting state")
            }
        }
    }
}

/// Analyzes a table for states and rules that cannot contribute to an accepting run.
///
/// # Returns
///
/// Every warning found, in a fixed order: unreachable states, states without transitions,
/// then a missing accepting transition. An empty vector means nothing looked wrong.
pub fn analyze(table: &TransitionTable) -> Vec<AnalysisWarning> {
    [
        check_unreachable_states,
        check_states_without_transitions,
        check_accepting_transition,
    ]
    .iter()
    .filter_map(|check| check(table))
    .collect()
}

/// Walks the transition graph from state 0 (depth-first) and reports every ordinary state
/// it never visits.
fn check_unreachable_states(table: &TransitionTable) -> Option<AnalysisWarning> {
    let mut visited = HashSet::new();
    let mut stack = vec![0];

    while let Some(state) = stack.pop() {
        if !visited.insert(state) {
            continue;
        }

        for (_, transition) in table.transitions_from(state) {
            if let State::Ordinary(next) = transition.next_state {
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
    }

    let unreachable: Vec<usize> = (0..table.states())
        .filter(|state| !visited.contains(state))
        .collect();

    (!unreachable.is_empty()).then_some(AnalysisWarning::UnreachableStates(unreachable))
}

fn check_states_without_transitions(table: &TransitionTable) -> Option<AnalysisWarning> {
    let empty: Vec<usize> = (0..table.states())
        .filter(|&state| table.transitions_from(state).next().is_none())
        .collect();

    (!empty.is_empty()).then_some(AnalysisWarning::StatesWithoutTransitions(empty))
}

fn check_accepting_transition(table: &TransitionTable) -> Option<AnalysisWarning> {
    let accepts = table
        .transitions()
        .any(|(_, transition)| transition.next_state == State::Accept);

    (!accepts).then_some(AnalysisWarning::NoAcceptingTransition)
}
