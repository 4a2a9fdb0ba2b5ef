//! Simulated account-state provider.
//!
//! The runner records one snapshot per step before evaluating; historical
//! reads walk back through those snapshots via the shared run clock. Fills
//! and bookkeeping are out of scope, so capital and position only change
//! when the caller sets them between steps.

use crate::domain::error::EvalError;
use crate::domain::market::PositionField;
use crate::ports::account_port::AccountState;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Snapshot {
    capital: f64,
    entry_price: f64,
    quantity: f64,
}

pub struct SimAccount {
    clock: Rc<Cell<usize>>,
    current: Cell<Snapshot>,
    history: RefCell<Vec<Snapshot>>,
}

impl SimAccount {
    pub fn new(initial_capital: f64, clock: Rc<Cell<usize>>) -> Self {
        Self {
            clock,
            current: Cell::new(Snapshot {
                capital: initial_capital,
                ..Snapshot::default()
            }),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot the current state as this step's history entry. The runner
    /// calls this exactly once per step, before evaluation.
    pub fn record_step(&self) {
        self.history.borrow_mut().push(self.current.get());
    }

    pub fn set_capital(&self, capital: f64) {
        let mut snapshot = self.current.get();
        snapshot.capital = capital;
        self.current.set(snapshot);
    }

    pub fn set_position(&self, entry_price: f64, quantity: f64) {
        let mut snapshot = self.current.get();
        snapshot.entry_price = entry_price;
        snapshot.quantity = quantity;
        self.current.set(snapshot);
    }

    fn snapshot_at(&self, index: i64, what: &str) -> Result<Snapshot, EvalError> {
        let history = self.history.borrow();
        let position = super::series_position(self.clock.get(), index, history.len(), what)?;
        Ok(history[position])
    }
}

impl AccountState for SimAccount {
    fn capital(&self, index: i64) -> Result<f64, EvalError> {
        Ok(self.snapshot_at(index, "capital history")?.capital)
    }

    fn position(&self, index: i64, field: PositionField) -> Result<f64, EvalError> {
        let snapshot = self.snapshot_at(index, "position history")?;
        Ok(match field {
            PositionField::EntryPrice => snapshot.entry_price,
            PositionField::Quantity => snapshot.quantity,
        })
    }
}
