//! Market-data feed port.

use crate::domain::context::FeedSpec;
use crate::domain::error::EvalError;
use crate::domain::market::CandleField;
use std::rc::Rc;

/// A constructed feed: a time series of candle bars owned by the supplier.
///
/// `index` is a historical offset relative to the feed's current step:
/// 0 = current bar, -1 = previous bar. Out-of-range reads are errors, never
/// defaults.
pub trait Feed {
    fn value(&self, index: i64, field: CandleField) -> Result<f64, EvalError>;

    /// Full history of one field, oldest first. Indicator engines consume
    /// this to derive computed series; evaluation never calls it.
    fn series(&self, field: CandleField) -> Vec<f64>;

    /// Human-readable identity for order logs and diagnostics.
    fn label(&self) -> String {
        "feed".to_string()
    }
}

/// Stable reference to a feed. Handle identity is what the evaluation
/// context memoizes: one handle per distinct [`FeedSpec`] for the lifetime
/// of a run.
pub type FeedHandle = Rc<dyn Feed>;

pub trait FeedSupplier {
    /// Construct the feed described by `spec`, or fail (unknown instrument,
    /// missing data). Must not fabricate a default feed on failure.
    fn construct_feed(&self, spec: &FeedSpec) -> Result<FeedHandle, EvalError>;
}
