//! CSV-backed candle feed supplier for the simulated runner.
//!
//! One file per feed, named `{ticker}_{candletime}.csv` under the data
//! directory, with columns `date,open,high,low,close,volume`. The `date`
//! column accepts `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (intraday feeds).
//!
//! Every constructed feed shares the supplier's run clock; the feed's
//! "current bar" is whatever step the clock points at.

use crate::domain::context::FeedSpec;
use crate::domain::error::EvalError;
use crate::domain::market::CandleField;
use crate::ports::feed_port::{Feed, FeedHandle, FeedSupplier};
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

pub struct CsvFeedSupplier {
    base_path: PathBuf,
    clock: Rc<Cell<usize>>,
}

impl CsvFeedSupplier {
    pub fn new(base_path: PathBuf, clock: Rc<Cell<usize>>) -> Self {
        Self { base_path, clock }
    }

    fn csv_path(&self, spec: &FeedSpec) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", spec.instrument.ticker, spec.candletime))
    }
}

fn construct_error(spec: &FeedSpec, reason: impl Into<String>) -> EvalError {
    EvalError::FeedConstruct {
        spec: spec.to_string(),
        reason: reason.into(),
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_candles(spec: &FeedSpec, content: &str) -> Result<Vec<Candle>, EvalError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut candles = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| construct_error(spec, format!("CSV parse error: {}", e)))?;

        let date_str = record
            .get(0)
            .ok_or_else(|| construct_error(spec, "missing date column"))?;
        let timestamp = parse_timestamp(date_str)
            .ok_or_else(|| construct_error(spec, format!("invalid date '{}'", date_str)))?;

        let mut numbers = [0.0f64; 5];
        for (slot, name) in ["open", "high", "low", "close", "volume"].iter().enumerate() {
            numbers[slot] = record
                .get(slot + 1)
                .ok_or_else(|| construct_error(spec, format!("missing {} column", name)))?
                .parse()
                .map_err(|e| construct_error(spec, format!("invalid {} value: {}", name, e)))?;
        }

        candles.push(Candle {
            timestamp,
            open: numbers[0],
            high: numbers[1],
            low: numbers[2],
            close: numbers[3],
            volume: numbers[4],
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

impl FeedSupplier for CsvFeedSupplier {
    fn construct_feed(&self, spec: &FeedSpec) -> Result<FeedHandle, EvalError> {
        let path = self.csv_path(spec);
        let content = fs::read_to_string(&path)
            .map_err(|e| construct_error(spec, format!("failed to read {}: {}", path.display(), e)))?;

        let candles = parse_candles(spec, &content)?;
        if candles.is_empty() {
            return Err(construct_error(spec, "no candle rows"));
        }

        Ok(Rc::new(CsvFeed {
            label: spec.to_string(),
            candles,
            clock: Rc::clone(&self.clock),
        }))
    }
}

pub struct CsvFeed {
    label: String,
    candles: Vec<Candle>,
    clock: Rc<Cell<usize>>,
}

impl CsvFeed {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    fn field(candle: &Candle, field: CandleField) -> f64 {
        match field {
            CandleField::Open => candle.open,
            CandleField::High => candle.high,
            CandleField::Low => candle.low,
            CandleField::Close => candle.close,
            CandleField::Volume => candle.volume,
        }
    }
}

impl Feed for CsvFeed {
    fn value(&self, index: i64, field: CandleField) -> Result<f64, EvalError> {
        let position =
            super::series_position(self.clock.get(), index, self.candles.len(), &self.label)?;
        Ok(Self::field(&self.candles[position], field))
    }

    fn series(&self, field: CandleField) -> Vec<f64> {
        self.candles.iter().map(|c| Self::field(c, field)).collect()
    }

    fn label(&self) -> String {
        self.label.clone()
    }
}
