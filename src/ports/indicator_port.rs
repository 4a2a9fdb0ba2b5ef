//! Technical-indicator engine port.
//!
//! The numeric algorithms live behind this seam; the core only addresses
//! computed indicators by stable identity and reads their output lines.

use crate::domain::context::IndicatorSpec;
use crate::domain::error::EvalError;
use crate::ports::feed_port::FeedHandle;
use std::rc::Rc;

/// A constructed indicator. Multi-output indicators expose named lines
/// (`"plus"`/`"minus"`, `"macd"`/`"signal"`/`"hist"`, ...); `line = None`
/// reads the single default output.
pub trait Indicator {
    fn value(&self, index: i64, line: Option<&str>) -> Result<f64, EvalError>;
}

pub type IndicatorHandle = Rc<dyn Indicator>;

pub trait IndicatorEngine {
    /// Construct the indicator described by `spec` over `feed`. The
    /// construction is line-independent: one handle serves every output line.
    fn construct_indicator(
        &self,
        spec: &IndicatorSpec,
        feed: FeedHandle,
    ) -> Result<IndicatorHandle, EvalError>;
}
