//! Account-state provider port. Read-only from the evaluator's side.

use crate::domain::error::EvalError;
use crate::domain::market::PositionField;

/// Indexed reads of historical capital and position state.
/// `index` 0 = current step, -1 = previous step, and so on.
pub trait AccountState {
    fn capital(&self, index: i64) -> Result<f64, EvalError>;
    fn position(&self, index: i64, field: PositionField) -> Result<f64, EvalError>;
}
