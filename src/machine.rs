//! This module defines the `Engine`, which simulates a deterministic multi-tape Turing
//! machine over a shared [`TransitionTable`]. It owns one [`Tape`] per declared tape and the
//! current state, and advances them one step at a time.

use crate::{
    error::TuringMachineError,
    table::TransitionTable,
    tape::Tape,
    types::{Halt, Outcome, State, Step, Symbol},
};

/// Executes one input case at a time against a borrowed transition table.
///
/// The table is never mutated, so any number of engines may run against it, sequentially
/// or on separate threads.
#[derive(Debug, Clone)]
pub struct Engine<'t> {
    table: &'t TransitionTable,
    state: State,
    tapes: Vec<Tape>,
    step_count: usize,
}

impl<'t> Engine<'t> {
    /// Creates an engine in state `0` with every tape blank.
    pub fn new(table: &'t TransitionTable) -> Self {
        Self {
            table,
            state: State::INITIAL,
            tapes: vec![Tape::default(); table.tapes()],
            step_count: 0,
        }
    }

    /// Prepares the engine for a new input case.
    ///
    /// `initial_contents[i]` is written to tape `i` starting at index 0. Missing trailing
    /// contents leave their tapes blank, while more contents than tapes is an error and
    /// leaves the engine untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the engine was reset.
    /// * `Err(TuringMachineError::TapeCount)` if there are more contents than tapes.
    pub fn reset_for_case<S: AsRef<str>>(
        &mut self,
        initial_contents: &[S],
    ) -> Result<(), TuringMachineError> {
        let tapes = self.table.tapes();
        if initial_contents.len() > tapes {
            return Err(TuringMachineError::TapeCount {
                expected: tapes,
                found: initial_contents.len(),
            });
        }

        self.tapes = (0..tapes)
            .map(|i| {
                initial_contents
                    .get(i)
                    .map_or_else(Tape::default, |s| Tape::new(s.as_ref()))
            })
            .collect();
        self.state = State::INITIAL;
        self.step_count = 0;

        Ok(())
    }

    /// Executes a single step of the machine.
    ///
    /// The read tuple is taken before anything is mutated. If a rule matches, each tape
    /// writes then moves according to its action and the state becomes the rule's target.
    /// If no rule matches, no tape is touched and the state becomes `Reject`; that step
    /// still counts as executed.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a rule fired and the machine is still in an ordinary state.
    /// * `Step::Halt(_)` if the machine is now halted. Stepping a machine that was
    ///   already halted changes nothing and does not count as a step.
    pub fn step(&mut self) -> Step {
        let state = match self.state {
            State::Ordinary(state) => state,
            State::Accept => return Step::Halt(Halt::Accept),
            State::Reject => return Step::Halt(Halt::Reject),
        };

        let read = self.symbols();
        let next_state = match self.table.lookup(state, &read) {
            Some(transition) => {
                for (tape, action) in self.tapes.iter_mut().zip(&transition.actions) {
                    tape.write(action.write);
                    tape.move_head(action.direction);
                }
                transition.next_state
            }
            None => State::Reject,
        };

        self.state = next_state;
        self.step_count += 1;

        tracing::trace!(
            step = self.step_count,
            state,
            read = ?read,
            next = %next_state,
            "Executed step"
        );

        match next_state {
            State::Ordinary(_) => Step::Continue,
            State::Accept => Step::Halt(Halt::Accept),
            State::Reject => Step::Halt(Halt::Reject),
        }
    }

    /// Runs until the machine halts or `max_steps` steps have been executed in total.
    pub fn run(&mut self, max_steps: usize) -> Outcome {
        self.run_with(max_steps, |_| {})
    }

    /// Like [`Engine::run`], calling `observer` after every executed step.
    pub fn run_with<F>(&mut self, max_steps: usize, mut observer: F) -> Outcome
    where
        F: FnMut(&Engine<'t>),
    {
        while let State::Ordinary(_) = self.state {
            if self.step_count >= max_steps {
                tracing::debug!(steps = self.step_count, "Step budget exhausted");
                return Outcome::BudgetExhausted;
            }

            self.step();
            observer(&*self);
        }

        let outcome = match self.state {
            State::Accept => Outcome::Accepted,
            _ => Outcome::Rejected,
        };
        tracing::debug!(steps = self.step_count, %outcome, "Machine halted");

        outcome
    }

    /// Returns the current state.
    pub fn current_state(&self) -> State {
        self.state
    }

    /// Returns the halt reason, or `None` while the machine is still running.
    pub fn halted(&self) -> Option<Halt> {
        match self.state {
            State::Ordinary(_) => None,
            State::Accept => Some(Halt::Accept),
            State::Reject => Some(Halt::Reject),
        }
    }

    /// Returns the number of steps executed since the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the symbols currently under each head, in tape order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.tapes.iter().map(Tape::read).collect()
    }

    /// Returns the machine's tapes.
    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    /// Returns the table this engine executes.
    pub fn table(&self) -> &'t TransitionTable {
        self.table
    }

    /// Renders tape `index` from its lowest to its highest written cell.
    pub fn tape_rendering(&self, index: usize) -> Result<Vec<Symbol>, TuringMachineError> {
        self.tapes
            .get(index)
            .map(Tape::render)
            .ok_or(TuringMachineError::TapeIndex {
                index,
                tapes: self.tapes.len(),
            })
    }
}
