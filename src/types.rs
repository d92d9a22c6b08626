//! This module defines the core data structures shared by the table parser and the execution
//! engine: symbols, head directions, machine states, per-tape actions and transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single tape cell value.
pub type Symbol = char;

/// The symbol held by every cell that was never written. It may be used in transition
/// rules without being declared in the alphabet.
pub const BLANK_SYMBOL: Symbol = '_';
/// Everything from this character to the end of a line is ignored.
pub const COMMENT_MARKER: char = '#';
/// Separates per-tape segments of a multi-tape input case.
pub const DEFAULT_CASE_SEPARATOR: char = '|';
/// The default step budget for a single input case.
pub const DEFAULT_MAX_STEPS: usize = 500;
/// Upper bound on the `tapes:` header. Every engine allocates one tape per declared tape.
pub const MAX_TAPES: usize = 1024;
/// Upper bound on the `states:` header.
pub const MAX_STATES: usize = 1_000_000;
/// The definition-language spelling of the accepting state.
pub const ACCEPT_CODE: i64 = -1;
/// The definition-language spelling of the rejecting state.
pub const REJECT_CODE: i64 = -2;

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Parses a direction character (`L`, `R` or `S`).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            'S' => Some(Direction::Stay),
            _ => None,
        }
    }

    /// The head offset this direction applies.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        };
        write!(f, "{c}")
    }
}

/// A machine state: either one of the declared ordinary states or a halting sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// A declared state in `[0, states - 1]`.
    Ordinary(usize),
    /// Halted, input accepted.
    Accept,
    /// Halted, input rejected (explicitly or because no transition matched).
    Reject,
}

impl State {
    /// The state every input case starts in.
    pub const INITIAL: State = State::Ordinary(0);

    /// Returns `true` for `Accept` and `Reject`.
    pub fn is_halting(self) -> bool {
        matches!(self, State::Accept | State::Reject)
    }

    /// Maps a definition-language state number onto a `State`.
    ///
    /// Non-negative numbers become ordinary states (range checking is the caller's job),
    /// `-1` and `-2` become the sentinels and anything else is `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            ACCEPT_CODE => Some(State::Accept),
            REJECT_CODE => Some(State::Reject),
            n if n >= 0 => usize::try_from(n).ok().map(State::Ordinary),
            _ => None,
        }
    }

    /// The definition-language number of this state.
    pub fn code(self) -> i64 {
        match self {
            State::Ordinary(n) => n as i64,
            State::Accept => ACCEPT_CODE,
            State::Reject => REJECT_CODE,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What a transition does to one tape: an optional write followed by a head move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The symbol to write under the head, or `None` to leave the cell unchanged.
    pub write: Option<Symbol>,
    /// Where the head moves after the write.
    pub direction: Direction,
}

impl Action {
    pub fn new(write: Option<Symbol>, direction: Direction) -> Self {
        Self { write, direction }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.write {
            Some(symbol) => write!(f, "{symbol}{}", self.direction),
            None => write!(f, "{}", self.direction),
        }
    }
}

/// Identifies a transition: the source state and one read symbol per tape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    pub state: usize,
    pub read: Vec<Symbol>,
}

/// The right-hand side of a transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to once all actions are applied.
    pub next_state: State,
    /// One action per tape, in declared tape order.
    pub actions: Vec<Action>,
}

/// Represents the outcome of a single engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The step was executed and the machine is still in an ordinary state.
    Continue,
    /// The machine is in a halting state, either reached by this step or already before it.
    Halt(Halt),
}

/// The two ways a machine can halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    Accept,
    Reject,
}

/// How a bounded run of one input case ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Accepted,
    Rejected,
    /// The step budget ran out while the machine was still in an ordinary state.
    BudgetExhausted,
}

impl From<Halt> for Outcome {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Accept => Outcome::Accepted,
            Halt::Reject => Outcome::Rejected,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Accepted => "accepted",
            Outcome::Rejected => "rejected",
            Outcome::BudgetExhausted => "step budget exhausted",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left = Direction::Left;
        let right = Direction::Right;

        let left_json = serde_json::to_string(&left).unwrap();
        let right_json = serde_json::to_string(&right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left_deserialized: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, left_deserialized);
    }

    #[test]
    fn test_direction_from_char() {
        assert_eq!(Direction::from_char('L'), Some(Direction::Left));
        assert_eq!(Direction::from_char('R'), Some(Direction::Right));
        assert_eq!(Direction::from_char('S'), Some(Direction::Stay));
        assert_eq!(Direction::from_char('l'), None);
        assert_eq!(Direction::from_char('<'), None);
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(State::from_code(0), Some(State::Ordinary(0)));
        assert_eq!(State::from_code(7), Some(State::Ordinary(7)));
        assert_eq!(State::from_code(-1), Some(State::Accept));
        assert_eq!(State::from_code(-2), Some(State::Reject));
        assert_eq!(State::from_code(-3), None);

        assert_eq!(State::Accept.to_string(), "-1");
        assert_eq!(State::Reject.to_string(), "-2");
        assert_eq!(State::Ordinary(3).to_string(), "3");
    }

    #[test]
    fn test_halting_states() {
        assert!(State::Accept.is_halting());
        assert!(State::Reject.is_halting());
        assert!(!State::INITIAL.is_halting());
        assert_ne!(State::Accept, State::Reject);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::new(Some('1'), Direction::Right).to_string(), "1R");
        assert_eq!(Action::new(None, Direction::Stay).to_string(), "S");
    }
}
