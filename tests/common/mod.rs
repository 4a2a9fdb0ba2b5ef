#![allow(dead_code)]

use quantdsl::adapters::sim_account_adapter::SimAccount;
use quantdsl::adapters::sim_broker_adapter::SimBroker;
use quantdsl::domain::context::{EvalContext, FeedSpec, IndicatorSpec};
use quantdsl::domain::error::EvalError;
use quantdsl::domain::eval::evaluate;
use quantdsl::domain::expr::Expr;
use quantdsl::domain::market::CandleField;
use quantdsl::domain::parser::parse_expr;
use quantdsl::ports::feed_port::{Feed, FeedHandle, FeedSupplier};
use quantdsl::ports::indicator_port::{Indicator, IndicatorEngine, IndicatorHandle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub const INSTRUMENT: &str = r#"{"name": "Reliance", "type": "equity", "ticker": "RELIANCE"}"#;

/// In-memory candle feed: OHLC derived from a close series, positioned by
/// the shared clock.
pub struct MemFeed {
    label: String,
    close: Vec<f64>,
    clock: Rc<Cell<usize>>,
}

impl Feed for MemFeed {
    fn value(&self, index: i64, field: CandleField) -> Result<f64, EvalError> {
        let cursor = self.clock.get() as i64;
        let position = cursor + index;
        if index > 0 || position < 0 || position as usize >= self.close.len() {
            return Err(EvalError::IndexOutOfRange {
                what: self.label.clone(),
                index,
                len: self.close.len(),
            });
        }
        let close = self.close[position as usize];
        Ok(match field {
            CandleField::Open | CandleField::Close => close,
            CandleField::High => close + 1.0,
            CandleField::Low => close - 1.0,
            CandleField::Volume => 1000.0,
        })
    }

    fn series(&self, field: CandleField) -> Vec<f64> {
        (0..self.close.len() as i64)
            .map(|i| {
                let saved = self.clock.get();
                self.clock.set(i as usize);
                let v = self.value(0, field).unwrap();
                self.clock.set(saved);
                v
            })
            .collect()
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}

/// Feed supplier over in-memory close series keyed by ticker, counting
/// constructions so tests can assert memoization.
pub struct MemFeedSupplier {
    series: HashMap<String, Vec<f64>>,
    clock: Rc<Cell<usize>>,
    pub constructed: Cell<usize>,
}

impl MemFeedSupplier {
    pub fn new(clock: Rc<Cell<usize>>) -> Self {
        Self {
            series: HashMap::new(),
            clock,
            constructed: Cell::new(0),
        }
    }

    pub fn with_closes(mut self, ticker: &str, closes: Vec<f64>) -> Self {
        self.series.insert(ticker.to_string(), closes);
        self
    }
}

impl FeedSupplier for MemFeedSupplier {
    fn construct_feed(&self, spec: &FeedSpec) -> Result<FeedHandle, EvalError> {
        let closes = self.series.get(&spec.instrument.ticker).ok_or_else(|| {
            EvalError::FeedConstruct {
                spec: spec.to_string(),
                reason: "unknown instrument".into(),
            }
        })?;
        self.constructed.set(self.constructed.get() + 1);
        Ok(Rc::new(MemFeed {
            label: spec.to_string(),
            close: closes.clone(),
            clock: Rc::clone(&self.clock),
        }))
    }
}

struct ConstIndicator {
    value: f64,
}

impl Indicator for ConstIndicator {
    fn value(&self, _index: i64, _line: Option<&str>) -> Result<f64, EvalError> {
        Ok(self.value)
    }
}

/// Indicator engine returning a constant for every line and offset, while
/// recording the canonical key of every construction.
pub struct ConstIndicatorEngine {
    pub value: Cell<f64>,
    pub constructed_keys: RefCell<Vec<String>>,
}

impl ConstIndicatorEngine {
    pub fn new(value: f64) -> Self {
        Self {
            value: Cell::new(value),
            constructed_keys: RefCell::new(Vec::new()),
        }
    }
}

impl IndicatorEngine for ConstIndicatorEngine {
    fn construct_indicator(
        &self,
        spec: &IndicatorSpec,
        _feed: FeedHandle,
    ) -> Result<IndicatorHandle, EvalError> {
        self.constructed_keys
            .borrow_mut()
            .push(spec.canonical_key());
        Ok(Rc::new(ConstIndicator {
            value: self.value.get(),
        }))
    }
}

pub struct Harness {
    pub ctx: EvalContext,
    pub clock: Rc<Cell<usize>>,
    pub broker: Rc<RefCell<SimBroker>>,
    pub account: Rc<SimAccount>,
    pub supplier: Rc<MemFeedSupplier>,
    pub engine: Rc<ConstIndicatorEngine>,
}

/// One-feed harness: RELIANCE closes as given, clock at 0, one recorded
/// account step at 100k capital.
pub fn harness(closes: Vec<f64>) -> Harness {
    let clock = Rc::new(Cell::new(0usize));
    let supplier = Rc::new(MemFeedSupplier::new(Rc::clone(&clock)).with_closes("RELIANCE", closes));
    let engine = Rc::new(ConstIndicatorEngine::new(42.0));
    let broker = Rc::new(RefCell::new(SimBroker::new()));
    let account = Rc::new(SimAccount::new(100_000.0, Rc::clone(&clock)));
    account.record_step();

    let ctx = EvalContext::new(
        Rc::clone(&supplier) as Rc<dyn FeedSupplier>,
        Rc::clone(&engine) as Rc<dyn IndicatorEngine>,
        broker.clone(),
        account.clone(),
    );

    Harness {
        ctx,
        clock,
        broker,
        account,
        supplier,
        engine,
    }
}

pub fn parse(json: &str) -> Expr {
    parse_expr(&serde_json::from_str(json).unwrap(), "strategy").unwrap()
}

pub fn eval_json(ctx: &mut EvalContext, json: &str) -> Result<f64, EvalError> {
    let mut expr = parse(json);
    evaluate(ctx, &mut expr)
}
