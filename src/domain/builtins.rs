//! Built-in function registry: the closed set of operations a strategy
//! document can call.
//!
//! Three families:
//! - pure arithmetic/logic over the collapsed `args` sequence
//! - read-only accessors over account state and candle feeds
//! - order placement, the one side effect visible outside the context
//!
//! Named indicators are table-driven: each entry declares which numeric
//! parameters participate in the indicator's canonical identity, and the
//! actual computation lives behind the indicator engine port. Names absent
//! from the registry are not an error; the evaluator maps them to `0`.

use crate::domain::context::{EvalContext, FeedSpec, IndicatorSpec};
use crate::domain::error::EvalError;
use crate::domain::expr::Call;
use crate::domain::market::{CandleField, CandleTime, PositionField};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Lt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl Comparator {
    fn apply(self, a: f64, b: f64) -> bool {
        match self {
            Comparator::Gt => a > b,
            Comparator::Lt => a < b,
            Comparator::Le => a <= b,
            Comparator::Ge => a >= b,
            Comparator::Eq => a == b,
            Comparator::Ne => a != b,
        }
    }
}

/// A named indicator and the numeric parameters that define its identity.
#[derive(Debug)]
pub struct IndicatorFn {
    pub name: &'static str,
    pub params: &'static [&'static str],
}

/// Every indicator a strategy document may name. Parameters listed here are
/// required on the call node and participate in the canonical cache key.
pub static INDICATORS: &[IndicatorFn] = &[
    IndicatorFn { name: "SMA", params: &["period"] },
    IndicatorFn { name: "EMA", params: &["period", "smoothing"] },
    IndicatorFn { name: "WMA", params: &["period"] },
    IndicatorFn { name: "HMA", params: &["period"] },
    IndicatorFn { name: "SMMA", params: &["period"] },
    IndicatorFn { name: "TRIMA", params: &["period"] },
    IndicatorFn { name: "DEMA", params: &["fast", "slow"] },
    IndicatorFn { name: "TEMA", params: &["fast", "slow"] },
    IndicatorFn { name: "KAMA", params: &["period"] },
    IndicatorFn { name: "ADX", params: &["period"] },
    IndicatorFn { name: "ADXR", params: &["period"] },
    IndicatorFn { name: "DMI", params: &["period"] },
    IndicatorFn { name: "Aroon", params: &["period"] },
    IndicatorFn { name: "Parabolic SAR", params: &["step", "max_step"] },
    IndicatorFn {
        name: "Ichimoku",
        params: &["tenkan", "kijun", "senkou_a", "senkou_b"],
    },
    IndicatorFn { name: "RSI", params: &["period"] },
    IndicatorFn { name: "Stochastic", params: &["k_period", "d_period"] },
    IndicatorFn { name: "Stochastic RSI", params: &["k_period", "d_period"] },
    IndicatorFn { name: "CCI", params: &["period"] },
    IndicatorFn { name: "ROC", params: &["period"] },
    IndicatorFn { name: "Williams %R", params: &["period"] },
    IndicatorFn { name: "Ultimate Oscillator", params: &[] },
    IndicatorFn { name: "TRIX", params: &["period"] },
    IndicatorFn { name: "MACD", params: &["fast", "slow", "signal"] },
    IndicatorFn { name: "ATR", params: &["period"] },
    IndicatorFn { name: "Bollinger Bands", params: &["period", "stddev"] },
    IndicatorFn { name: "Donchian Channels", params: &["period"] },
    IndicatorFn { name: "Keltner Channels", params: &["period", "multiplier"] },
    IndicatorFn { name: "OBV", params: &[] },
    IndicatorFn { name: "Chaikin Money Flow", params: &["period"] },
    IndicatorFn { name: "Accum/Dist Line", params: &[] },
    IndicatorFn { name: "Force Index", params: &["period"] },
    IndicatorFn { name: "Volume Oscillator", params: &[] },
    IndicatorFn { name: "Pivot Points", params: &[] },
    IndicatorFn { name: "VWAP", params: &[] },
];

/// One registered operation, resolved from the call node's function name.
#[derive(Debug)]
pub enum Builtin {
    GetCapital,
    GetPosition,
    GetCandle,
    PlaceMarketOrder,
    PlaceLimitOrder,
    Sum,
    Difference,
    Product,
    Quotient,
    Power,
    Abs,
    Min,
    Max,
    And,
    Or,
    Not,
    Compare(Comparator),
    Indicator(&'static IndicatorFn),
    /// Registered names whose data source does not exist yet (tic data,
    /// order books, derivatives metrics). They read as `0` like unknown
    /// functions, but stay reserved in the registry.
    Unimplemented,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "Get Capital" => Some(Builtin::GetCapital),
            "Get Position" => Some(Builtin::GetPosition),
            "Get Candle" => Some(Builtin::GetCandle),
            "Place Market Order" => Some(Builtin::PlaceMarketOrder),
            "Place Limit Order" => Some(Builtin::PlaceLimitOrder),
            "+" => Some(Builtin::Sum),
            "-" => Some(Builtin::Difference),
            "*" => Some(Builtin::Product),
            "/" => Some(Builtin::Quotient),
            "^" => Some(Builtin::Power),
            "ABS" => Some(Builtin::Abs),
            "MIN" => Some(Builtin::Min),
            "MAX" => Some(Builtin::Max),
            "AND" => Some(Builtin::And),
            "OR" => Some(Builtin::Or),
            "NOT" => Some(Builtin::Not),
            ">" => Some(Builtin::Compare(Comparator::Gt)),
            "<" => Some(Builtin::Compare(Comparator::Lt)),
            "<=" => Some(Builtin::Compare(Comparator::Le)),
            ">=" => Some(Builtin::Compare(Comparator::Ge)),
            "==" => Some(Builtin::Compare(Comparator::Eq)),
            "!=" => Some(Builtin::Compare(Comparator::Ne)),
            "Get Tic" | "Get Order Book" | "Fair Value Gap" | "Put Call Ratio"
            | "Open Interest" => Some(Builtin::Unimplemented),
            _ => INDICATORS
                .iter()
                .find(|f| f.name == name)
                .map(Builtin::Indicator),
        }
    }

    /// Run the operation against an already-collapsed call node.
    pub fn apply(&self, ctx: &mut EvalContext, call: &Call) -> Result<f64, EvalError> {
        match self {
            Builtin::GetCapital => ctx.account.capital(call.index()?),

            Builtin::GetPosition => {
                let field = position_field(call)?;
                ctx.account.position(call.index()?, field)
            }

            Builtin::GetCandle => {
                let feed = ctx.resolve_feed(&feed_spec(call)?)?;
                let field = candle_field(call)?;
                feed.value(call.index()?, field)
            }

            Builtin::PlaceMarketOrder => place_order(ctx, call, None),

            Builtin::PlaceLimitOrder => {
                let price = call.number("limit_price")?;
                place_order(ctx, call, Some(price))
            }

            Builtin::Sum => Ok(call.arg_values()?.iter().sum()),

            Builtin::Difference => {
                let args = at_least(call, 1)?;
                if args.len() == 1 {
                    Ok(-args[0])
                } else {
                    Ok(args[0] - args[1..].iter().sum::<f64>())
                }
            }

            Builtin::Product => Ok(call.arg_values()?.iter().product()),

            Builtin::Quotient => {
                let args = at_least(call, 1)?;
                let mut acc = args[0];
                for &divisor in &args[1..] {
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    acc /= divisor;
                }
                Ok(acc)
            }

            Builtin::Power => {
                let args = exactly(call, 2)?;
                Ok(args[0].powf(args[1]))
            }

            Builtin::Abs => Ok(exactly(call, 1)?[0].abs()),

            Builtin::Min => {
                let args = at_least(call, 1)?;
                Ok(args.iter().copied().fold(f64::INFINITY, f64::min))
            }

            Builtin::Max => {
                let args = at_least(call, 1)?;
                Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }

            Builtin::And => Ok(bool_num(call.arg_values()?.iter().all(|&v| v != 0.0))),

            Builtin::Or => Ok(bool_num(call.arg_values()?.iter().any(|&v| v != 0.0))),

            Builtin::Not => Ok(bool_num(exactly(call, 1)?[0] == 0.0)),

            Builtin::Compare(cmp) => {
                let args = exactly(call, 2)?;
                Ok(bool_num(cmp.apply(args[0], args[1])))
            }

            Builtin::Indicator(f) => {
                let mut params = Vec::with_capacity(f.params.len());
                for name in f.params {
                    params.push((*name, call.number(name)?));
                }
                let spec = IndicatorSpec {
                    function: f.name,
                    feed: feed_spec(call)?,
                    params,
                };
                ctx.resolve_indicator(&spec, call.index()?, call.key())
            }

            Builtin::Unimplemented => Ok(0.0),
        }
    }
}

fn bool_num(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn feed_spec(call: &Call) -> Result<FeedSpec, EvalError> {
    Ok(FeedSpec {
        instrument: call.instrument()?.clone(),
        candletime: call.candletime()?,
    })
}

/// Order nodes name an instrument but no aggregation; they trade against the
/// instrument's daily feed unless the document supplies a `candletime`.
fn order_feed_spec(call: &Call) -> Result<FeedSpec, EvalError> {
    Ok(FeedSpec {
        instrument: call.instrument()?.clone(),
        candletime: call.candletime().unwrap_or(CandleTime::Day1),
    })
}

/// Positive quantity buys, negative sells its magnitude, zero degenerates to
/// a sell of size zero.
fn place_order(
    ctx: &mut EvalContext,
    call: &Call,
    limit_price: Option<f64>,
) -> Result<f64, EvalError> {
    let feed = ctx.resolve_feed(&order_feed_spec(call)?)?;
    let quantity = call.number("quantity")?;
    let broker = Rc::clone(&ctx.broker);
    let order_id = if quantity > 0.0 {
        broker.borrow_mut().buy(&feed, quantity, limit_price)?
    } else {
        broker.borrow_mut().sell(&feed, -quantity, limit_price)?
    };
    Ok(order_id as f64)
}

fn candle_field(call: &Call) -> Result<CandleField, EvalError> {
    let key = call.required_key()?;
    CandleField::parse(key).ok_or_else(|| EvalError::InvalidKey {
        function: call.function.clone(),
        key: key.to_string(),
    })
}

fn position_field(call: &Call) -> Result<PositionField, EvalError> {
    let key = call.required_key()?;
    PositionField::parse(key).ok_or_else(|| EvalError::InvalidKey {
        function: call.function.clone(),
        key: key.to_string(),
    })
}

fn exactly(call: &Call, n: usize) -> Result<Vec<f64>, EvalError> {
    let args = call.arg_values()?;
    if args.len() != n {
        return Err(EvalError::Arity {
            function: call.function.clone(),
            expected: format!("exactly {}", n),
            got: args.len(),
        });
    }
    Ok(args)
}

fn at_least(call: &Call, n: usize) -> Result<Vec<f64>, EvalError> {
    let args = call.arg_values()?;
    if args.len() < n {
        return Err(EvalError::Arity {
            function: call.function.clone(),
            expected: format!("at least {}", n),
            got: args.len(),
        });
    }
    Ok(args)
}
