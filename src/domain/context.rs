//! Evaluation context: memoized feed/indicator handles, the variable
//! environment, and references to the four external collaborators.
//!
//! # Identity Semantics
//!
//! - One feed handle per distinct [`FeedSpec`]; `index`/`key` never
//!   participate in feed identity (they select *which point/field* of a feed
//!   is read, not *which feed*).
//! - One indicator handle per canonical [`IndicatorSpec`] key; `index` and
//!   `key` are excluded, so the output lines of a multi-output indicator
//!   share exactly one underlying computed object.
//! - Constructing a second handle for an already-seen canonical key would
//!   desynchronize time-series state; the context never does.
//!
//! The context is single-threaded mutable state shared across successive
//! evaluation passes (one per strategy time step). Concurrent passes need
//! their own context or external serialization.

use crate::domain::error::EvalError;
use crate::domain::expr::Expr;
use crate::domain::market::{CandleTime, Instrument};
use crate::ports::account_port::AccountState;
use crate::ports::broker_port::BrokerGateway;
use crate::ports::feed_port::{FeedHandle, FeedSupplier};
use crate::ports::indicator_port::{IndicatorEngine, IndicatorHandle};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// Canonical identity of a feed: which instrument at which aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSpec {
    pub instrument: Instrument,
    pub candletime: CandleTime,
}

impl fmt::Display for FeedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.instrument, self.candletime)
    }
}

/// Canonical identity of an indicator: function name, underlying feed, and
/// the numeric construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub function: &'static str,
    pub feed: FeedSpec,
    pub params: Vec<(&'static str, f64)>,
}

impl IndicatorSpec {
    /// Deterministic cache key: parameters are serialized sorted by name, so
    /// two structurally-equal specs collide regardless of insertion order.
    pub fn canonical_key(&self) -> String {
        let mut params = self.params.clone();
        params.sort_by_key(|(name, _)| *name);
        let body = params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({}) on {}", self.function, body, self.feed)
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}

/// Process-scoped state for one strategy run.
pub struct EvalContext {
    feeds: HashMap<FeedSpec, FeedHandle>,
    indicators: BTreeMap<String, IndicatorHandle>,
    pub environment: HashMap<String, Expr>,
    feed_supplier: Rc<dyn FeedSupplier>,
    indicator_engine: Rc<dyn IndicatorEngine>,
    pub broker: Rc<RefCell<dyn BrokerGateway>>,
    pub account: Rc<dyn AccountState>,
}

impl EvalContext {
    pub fn new(
        feed_supplier: Rc<dyn FeedSupplier>,
        indicator_engine: Rc<dyn IndicatorEngine>,
        broker: Rc<RefCell<dyn BrokerGateway>>,
        account: Rc<dyn AccountState>,
    ) -> Self {
        EvalContext {
            feeds: HashMap::new(),
            indicators: BTreeMap::new(),
            environment: HashMap::new(),
            feed_supplier,
            indicator_engine,
            broker,
            account,
        }
    }

    /// Return the feed for `spec`, constructing it on first use. The handle
    /// is stable for the lifetime of the context.
    pub fn resolve_feed(&mut self, spec: &FeedSpec) -> Result<FeedHandle, EvalError> {
        if let Some(handle) = self.feeds.get(spec) {
            return Ok(Rc::clone(handle));
        }
        let handle = self.feed_supplier.construct_feed(spec)?;
        self.feeds.insert(spec.clone(), Rc::clone(&handle));
        Ok(handle)
    }

    /// Read `index`/`line` from the indicator for `spec`, constructing the
    /// indicator (and its underlying feed) on first use.
    pub fn resolve_indicator(
        &mut self,
        spec: &IndicatorSpec,
        index: i64,
        line: Option<&str>,
    ) -> Result<f64, EvalError> {
        let key = spec.canonical_key();
        if !self.indicators.contains_key(&key) {
            let feed = self.resolve_feed(&spec.feed)?;
            let handle = self.indicator_engine.construct_indicator(spec, feed)?;
            self.indicators.insert(key.clone(), handle);
        }
        self.indicators[&key].value(index, line)
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }
}
