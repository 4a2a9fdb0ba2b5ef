//! Momentum oscillators.
//!
//! RSI uses Wilder's smoothing: first average is a simple mean of gains and
//! losses over `period` changes, then avg = (prev*(n-1) + current)/n, and
//! RSI = 100 - 100/(1 + avg_gain/avg_loss) with RSI = 100 when avg_loss is 0.

use super::average::{ema, sma};

pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if values.len() <= period {
        return out;
    }

    let mut gains = Vec::with_capacity(values.len() - 1);
    let mut losses = Vec::with_capacity(values.len() - 1);
    for i in 1..values.len() {
        let change = values[i] - values[i - 1];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    out[period] = rsi_point(avg_gain, avg_loss);

    for i in (period + 1)..values.len() {
        let change_idx = i - 1;
        avg_gain = (avg_gain * (period as f64 - 1.0) + gains[change_idx]) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + losses[change_idx]) / period as f64;
        out[i] = rsi_point(avg_gain, avg_loss);
    }
    out
}

fn rsi_point(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

/// Percentage rate of change over `period` bars.
pub fn roc(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in period..values.len() {
        let base = values[i - period];
        if base != 0.0 {
            out[i] = (values[i] - base) / base * 100.0;
        }
    }
    out
}

pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let typical: Vec<f64> = high
        .iter()
        .zip(low)
        .zip(close)
        .map(|((h, l), c)| (h + l + c) / 3.0)
        .collect();
    let average = sma(&typical, period);

    let mut out = vec![f64::NAN; close.len()];
    for i in (period - 1)..typical.len() {
        let mean = average[i];
        let deviation: f64 = typical[i + 1 - period..=i]
            .iter()
            .map(|tp| (tp - mean).abs())
            .sum::<f64>()
            / period as f64;
        out[i] = if deviation == 0.0 {
            0.0
        } else {
            (typical[i] - mean) / (0.015 * deviation)
        };
    }
    out
}

pub fn williams_r(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    for i in (period - 1)..close.len() {
        let window_high = highest(&high[i + 1 - period..=i]);
        let window_low = lowest(&low[i + 1 - period..=i]);
        let range = window_high - window_low;
        out[i] = if range == 0.0 {
            0.0
        } else {
            (window_high - close[i]) / range * -100.0
        };
    }
    out
}

/// Fast %K over `k_period` highs/lows, %D as its `d_period` SMA.
pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut k = vec![f64::NAN; close.len()];
    for i in (k_period - 1)..close.len() {
        let window_high = highest(&high[i + 1 - k_period..=i]);
        let window_low = lowest(&low[i + 1 - k_period..=i]);
        let range = window_high - window_low;
        k[i] = if range == 0.0 {
            50.0
        } else {
            (close[i] - window_low) / range * 100.0
        };
    }
    let d = sma(&k, d_period);
    (k, d)
}

/// One-bar rate of change of a triple-smoothed EMA, in percent.
pub fn trix(values: &[f64], period: usize) -> Vec<f64> {
    let e3 = ema(&ema(&ema(values, period, 2.0), period, 2.0), period, 2.0);
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..e3.len() {
        let previous = e3[i - 1];
        if !previous.is_nan() && previous != 0.0 {
            out[i] = (e3[i] - previous) / previous * 100.0;
        }
    }
    out
}

/// MACD line = EMA(fast) - EMA(slow); signal = EMA(macd, signal_period);
/// histogram = macd - signal.
pub fn macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_line = ema(values, fast, 2.0);
    let slow_line = ema(values, slow, 2.0);
    let macd_line: Vec<f64> = fast_line
        .iter()
        .zip(&slow_line)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal_period, 2.0);
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();
    (macd_line, signal_line, histogram)
}

fn highest(window: &[f64]) -> f64 {
    window.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn lowest(window: &[f64]) -> f64 {
    window.iter().copied().fold(f64::INFINITY, f64::min)
}
