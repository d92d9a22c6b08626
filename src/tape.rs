//! A single two-way infinite tape backed by sparse storage.

use crate::types::{Direction, Symbol, BLANK_SYMBOL};
use std::collections::BTreeMap;

/// One tape and its read/write head.
///
/// Only written cells are stored; every other cell holds [`BLANK_SYMBOL`]. The head index
/// is signed, so the tape extends without bound in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, Symbol>,
    head: i64,
}

impl Tape {
    /// Creates a tape holding `content` from index 0 rightwards, with the head at index 0.
    pub fn new(content: &str) -> Self {
        Self {
            cells: (0..).zip(content.chars()).collect(),
            head: 0,
        }
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.get(self.head)
    }

    /// Returns the symbol at `index`.
    pub fn get(&self, index: i64) -> Symbol {
        self.cells.get(&index).copied().unwrap_or(BLANK_SYMBOL)
    }

    /// Writes `symbol` under the head. `None` leaves the cell untouched.
    pub fn write(&mut self, symbol: Option<Symbol>) {
        if let Some(symbol) = symbol {
            self.cells.insert(self.head, symbol);
        }
    }

    /// Moves the head one cell, or not at all for [`Direction::Stay`].
    pub fn move_head(&mut self, direction: Direction) {
        self.head += direction.offset();
    }

    /// The current head index. May be negative.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// The lowest and highest indices ever written, or `None` for an untouched tape.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let (&min, _) = self.cells.first_key_value()?;
        let (&max, _) = self.cells.last_key_value()?;
        Some((min, max))
    }

    /// Returns every cell from the lowest to the highest written index, blanks filling gaps.
    pub fn render(&self) -> Vec<Symbol> {
        match self.bounds() {
            Some((min, max)) => (min..=max).map(|i| self.get(i)).collect(),
            None => Vec::new(),
        }
    }

    /// [`Tape::render`] collected into a `String`.
    pub fn render_string(&self) -> String {
        self.render().into_iter().collect()
    }
}
