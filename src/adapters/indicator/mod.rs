//! Computed indicator engine for the simulated runner.
//!
//! Construction reads the full field history from the underlying feed,
//! computes every output line eagerly, and returns a handle whose reads are
//! positioned by the shared run clock. Warmup slots hold `NaN`, matching the
//! behavior of chart engines before an indicator has enough bars.
//!
//! Functions without a computation here (adaptive and multi-stage indicators
//! we have not needed yet) fail construction; the evaluator surfaces that as
//! a strategy-definition error rather than inventing values.

pub mod average;
pub mod oscillator;
pub mod trend;
pub mod volatility;
pub mod volume;

use crate::domain::context::IndicatorSpec;
use crate::domain::error::EvalError;
use crate::domain::market::CandleField;
use crate::ports::feed_port::FeedHandle;
use crate::ports::indicator_port::{Indicator, IndicatorEngine, IndicatorHandle};
use std::cell::Cell;
use std::rc::Rc;

/// Index of the first non-NaN slot; math helpers use it so composed
/// indicators (EMA of EMA, SMA of a derived line) skip warmup prefixes.
pub(super) fn valid_start(values: &[f64]) -> usize {
    values
        .iter()
        .position(|v| !v.is_nan())
        .unwrap_or(values.len())
}

fn construct_error(spec: &IndicatorSpec, reason: impl Into<String>) -> EvalError {
    EvalError::IndicatorConstruct {
        spec: spec.to_string(),
        reason: reason.into(),
    }
}

fn param(spec: &IndicatorSpec, name: &str) -> Result<f64, EvalError> {
    spec.params
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .ok_or_else(|| construct_error(spec, format!("missing parameter '{}'", name)))
}

fn period_param(spec: &IndicatorSpec, name: &str) -> Result<usize, EvalError> {
    let value = param(spec, name)?;
    if value < 1.0 {
        return Err(construct_error(
            spec,
            format!("parameter '{}' must be a period >= 1, got {}", name, value),
        ));
    }
    Ok(value as usize)
}

/// A fully computed indicator: one or more named output lines over the same
/// time axis as the feed it was derived from.
pub struct SeriesIndicator {
    label: String,
    lines: Vec<(&'static str, Vec<f64>)>,
    clock: Rc<Cell<usize>>,
}

impl Indicator for SeriesIndicator {
    fn value(&self, index: i64, line: Option<&str>) -> Result<f64, EvalError> {
        let series = match line {
            None => &self.lines[0].1,
            Some(name) => {
                &self
                    .lines
                    .iter()
                    .find(|(n, _)| *n == name)
                    .ok_or_else(|| EvalError::InvalidKey {
                        function: self.label.clone(),
                        key: name.to_string(),
                    })?
                    .1
            }
        };
        let position = crate::adapters::series_position(
            self.clock.get(),
            index,
            series.len(),
            &self.label,
        )?;
        Ok(series[position])
    }
}

pub struct SimIndicatorEngine {
    clock: Rc<Cell<usize>>,
}

impl SimIndicatorEngine {
    pub fn new(clock: Rc<Cell<usize>>) -> Self {
        Self { clock }
    }
}

impl IndicatorEngine for SimIndicatorEngine {
    fn construct_indicator(
        &self,
        spec: &IndicatorSpec,
        feed: FeedHandle,
    ) -> Result<IndicatorHandle, EvalError> {
        let close = feed.series(CandleField::Close);
        let high = || feed.series(CandleField::High);
        let low = || feed.series(CandleField::Low);
        let volume = || feed.series(CandleField::Volume);

        let lines: Vec<(&'static str, Vec<f64>)> = match spec.function {
            "SMA" => vec![("value", average::sma(&close, period_param(spec, "period")?))],
            "EMA" => vec![(
                "value",
                average::ema(&close, period_param(spec, "period")?, param(spec, "smoothing")?),
            )],
            "WMA" => vec![("value", average::wma(&close, period_param(spec, "period")?))],
            "HMA" => vec![("value", average::hma(&close, period_param(spec, "period")?))],
            "SMMA" => vec![("value", average::smma(&close, period_param(spec, "period")?))],
            "TRIMA" => vec![("value", average::trima(&close, period_param(spec, "period")?))],
            // the slow parameter names a band the chart draws; the line
            // itself is driven by the fast period, as in the original engine
            "DEMA" => vec![("value", average::dema(&close, period_param(spec, "fast")?))],
            "TEMA" => vec![("value", average::tema(&close, period_param(spec, "fast")?))],

            "RSI" => vec![(
                "value",
                oscillator::rsi(&close, period_param(spec, "period")?),
            )],
            "ROC" => vec![(
                "value",
                oscillator::roc(&close, period_param(spec, "period")?),
            )],
            "CCI" => vec![(
                "value",
                oscillator::cci(&high(), &low(), &close, period_param(spec, "period")?),
            )],
            "Williams %R" => vec![(
                "value",
                oscillator::williams_r(&high(), &low(), &close, period_param(spec, "period")?),
            )],
            "TRIX" => vec![(
                "value",
                oscillator::trix(&close, period_param(spec, "period")?),
            )],
            "Stochastic" => {
                let (k, d) = oscillator::stochastic(
                    &high(),
                    &low(),
                    &close,
                    period_param(spec, "k_period")?,
                    period_param(spec, "d_period")?,
                );
                vec![("k", k), ("d", d)]
            }

            "MACD" => {
                let (macd, signal, hist) = oscillator::macd(
                    &close,
                    period_param(spec, "fast")?,
                    period_param(spec, "slow")?,
                    period_param(spec, "signal")?,
                );
                vec![("macd", macd), ("signal", signal), ("hist", hist)]
            }

            "ATR" => vec![(
                "value",
                volatility::atr(&high(), &low(), &close, period_param(spec, "period")?),
            )],
            "Bollinger Bands" => {
                let (upper, middle, lower) = volatility::bollinger(
                    &close,
                    period_param(spec, "period")?,
                    param(spec, "stddev")?,
                );
                vec![("high", upper), ("middle", middle), ("low", lower)]
            }
            "Donchian Channels" => {
                let (upper, lower) =
                    volatility::donchian(&high(), &low(), period_param(spec, "period")?);
                vec![("high", upper), ("low", lower)]
            }
            "Keltner Channels" => {
                let (upper, middle, lower) = volatility::keltner(
                    &close,
                    &high(),
                    &low(),
                    period_param(spec, "period")?,
                    param(spec, "multiplier")?,
                );
                vec![("high", upper), ("middle", middle), ("low", lower)]
            }

            "ADX" => vec![(
                "value",
                trend::adx(&high(), &low(), &close, period_param(spec, "period")?),
            )],
            "ADXR" => vec![(
                "value",
                trend::adxr(&high(), &low(), &close, period_param(spec, "period")?),
            )],
            "DMI" => {
                let (plus, minus) =
                    trend::dmi(&high(), &low(), &close, period_param(spec, "period")?);
                vec![("plus", plus), ("minus", minus)]
            }
            "Aroon" => {
                let (up, down) = trend::aroon(&high(), &low(), period_param(spec, "period")?);
                vec![("up", up), ("down", down)]
            }
            "Pivot Points" => {
                let lines = trend::pivot_points(&high(), &low(), &close);
                vec![
                    ("pp", lines.pp),
                    ("r1", lines.r1),
                    ("r2", lines.r2),
                    ("r3", lines.r3),
                    ("s1", lines.s1),
                    ("s2", lines.s2),
                    ("s3", lines.s3),
                ]
            }

            "OBV" => vec![("value", volume::obv(&close, &volume()))],
            "VWAP" => vec![("value", volume::vwap(&high(), &low(), &close, &volume()))],
            "Force Index" => vec![(
                "value",
                volume::force_index(&close, &volume(), period_param(spec, "period")?),
            )],
            "Accum/Dist Line" => vec![(
                "value",
                volume::ad_line(&high(), &low(), &close, &volume()),
            )],
            "Chaikin Money Flow" => vec![(
                "value",
                volume::cmf(
                    &high(),
                    &low(),
                    &close,
                    &volume(),
                    period_param(spec, "period")?,
                ),
            )],
            "Volume Oscillator" => vec![("value", volume::volume_oscillator(&volume()))],

            other => return Err(construct_error(spec, format!("no computation for {}", other))),
        };

        Ok(Rc::new(SeriesIndicator {
            label: spec.canonical_key(),
            lines,
            clock: Rc::clone(&self.clock),
        }))
    }
}
