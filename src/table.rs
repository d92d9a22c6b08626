//! The validated, immutable transition table of a multi-tape machine.

use crate::error::{SemanticError, SymbolRole};
use crate::types::{State, Symbol, Transition, TransitionKey, BLANK_SYMBOL};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A complete machine definition: tape count, state count, alphabet and rules.
///
/// Tables are only produced by [`crate::parser::parse`]; once built they are never
/// mutated, so a single table can back any number of engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    tapes: usize,
    states: usize,
    alphabet: BTreeSet<Symbol>,
    // Per-state rule maps keyed by the read tuple. States without rules have no entry.
    rules: BTreeMap<usize, HashMap<Vec<Symbol>, Transition>>,
}

impl TransitionTable {
    /// Creates an empty table. Callers guarantee `tapes >= 1`, `states >= 1` and a
    /// non-empty alphabet.
    pub(crate) fn new(tapes: usize, states: usize, alphabet: BTreeSet<Symbol>) -> Self {
        Self {
            tapes,
            states,
            alphabet,
            rules: BTreeMap::new(),
        }
    }

    /// Adds one rule, enforcing every table invariant that involves it.
    ///
    /// Tuple lengths are the parser's responsibility and are only debug-asserted here.
    pub(crate) fn insert(
        &mut self,
        key: TransitionKey,
        transition: Transition,
    ) -> Result<(), SemanticError> {
        debug_assert_eq!(key.read.len(), self.tapes);
        debug_assert_eq!(transition.actions.len(), self.tapes);

        let max = self.states - 1;
        if key.state > max {
            return Err(SemanticError::StateOutOfRange {
                state: key.state as i64,
                max,
            });
        }
        if let State::Ordinary(next) = transition.next_state {
            if next > max {
                return Err(SemanticError::TargetOutOfRange {
                    state: next as i64,
                    max,
                });
            }
        }
        for &symbol in &key.read {
            self.check_symbol(symbol, SymbolRole::Read)?;
        }
        for symbol in transition.actions.iter().filter_map(|action| action.write) {
            self.check_symbol(symbol, SymbolRole::Write)?;
        }

        let rules = self.rules.entry(key.state).or_default();
        if rules.contains_key(&key.read) {
            return Err(SemanticError::DuplicateTransition {
                state: key.state,
                read: key.read,
            });
        }
        rules.insert(key.read, transition);

        Ok(())
    }

    /// Fails unless `symbol` is the blank or part of the alphabet.
    fn check_symbol(&self, symbol: Symbol, role: SymbolRole) -> Result<(), SemanticError> {
        if self.accepts_symbol(symbol) {
            return Ok(());
        }

        Err(SemanticError::SymbolNotInAlphabet {
            role,
            symbol,
            alphabet: self.alphabet.iter().collect(),
        })
    }

    /// Number of tapes.
    pub fn tapes(&self) -> usize {
        self.tapes
    }

    /// Number of ordinary states.
    pub fn states(&self) -> usize {
        self.states
    }

    /// The declared alphabet. The blank symbol is only included if it was declared.
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    /// Returns `true` if `symbol` may appear in a rule.
    pub fn accepts_symbol(&self, symbol: Symbol) -> bool {
        symbol == BLANK_SYMBOL || self.alphabet.contains(&symbol)
    }

    /// Finds the rule for `state` reading `read`.
    pub fn lookup(&self, state: usize, read: &[Symbol]) -> Option<&Transition> {
        self.rules.get(&state)?.get(read)
    }

    /// Iterates over the rules leaving `state`.
    pub fn transitions_from(
        &self,
        state: usize,
    ) -> impl Iterator<Item = (&[Symbol], &Transition)> + '_ {
        self.rules
            .get(&state)
            .into_iter()
            .flat_map(|rules| rules.iter().map(|(read, t)| (read.as_slice(), t)))
    }

    /// Iterates over every rule as a `(key, transition)` pair, ordered by source state.
    pub fn transitions(&self) -> impl Iterator<Item = (TransitionKey, &Transition)> + '_ {
        self.rules.iter().flat_map(|(&state, rules)| {
            rules.iter().map(move |(read, t)| {
                (
                    TransitionKey {
                        state,
                        read: read.clone(),
                    },
                    t,
                )
            })
        })
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    /// Returns `true` if the table has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
