//! Moving-average family.
//!
//! All functions take a value series (leading `NaN`s allowed, so averages
//! compose) and return a series of the same length with `NaN` warmup.

use super::valid_start;

pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let start = valid_start(values);
    let mut sum = 0.0;
    for i in start..values.len() {
        sum += values[i];
        if i >= start + period {
            sum -= values[i - period];
        }
        if i + 1 >= start + period {
            out[i] = sum / period as f64;
        }
    }
    out
}

/// k = smoothing/(period+1), seeded with the first SMA, then
/// EMA[i] = C[i]*k + EMA[i-1]*(1-k). The conventional smoothing is 2.
pub fn ema(values: &[f64], period: usize, smoothing: f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let start = valid_start(values);
    if start + period > values.len() {
        return out;
    }

    let k = smoothing / (period as f64 + 1.0);
    let seed_at = start + period - 1;
    let mut current = values[start..=seed_at].iter().sum::<f64>() / period as f64;
    out[seed_at] = current;
    for i in (seed_at + 1)..values.len() {
        current = values[i] * k + current * (1.0 - k);
        out[i] = current;
    }
    out
}

pub fn wma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let start = valid_start(values);
    let denominator = (period * (period + 1)) as f64 / 2.0;
    for i in start..values.len() {
        if i + 1 < start + period {
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(w, v)| (w + 1) as f64 * v)
            .sum();
        out[i] = weighted / denominator;
    }
    out
}

/// Wilder smoothing: seed with the first SMA, then
/// SMMA[i] = (SMMA[i-1]*(n-1) + C[i]) / n.
pub fn smma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let start = valid_start(values);
    if start + period > values.len() {
        return out;
    }

    let seed_at = start + period - 1;
    let mut current = values[start..=seed_at].iter().sum::<f64>() / period as f64;
    out[seed_at] = current;
    for i in (seed_at + 1)..values.len() {
        current = (current * (period as f64 - 1.0) + values[i]) / period as f64;
        out[i] = current;
    }
    out
}

/// SMA of an SMA with the window split in half.
pub fn trima(values: &[f64], period: usize) -> Vec<f64> {
    let first = period.div_ceil(2);
    let second = period / 2 + 1;
    sma(&sma(values, first), second)
}

pub fn dema(values: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema(values, period, 2.0);
    let e2 = ema(&e1, period, 2.0);
    e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
}

pub fn tema(values: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema(values, period, 2.0);
    let e2 = ema(&e1, period, 2.0);
    let e3 = ema(&e2, period, 2.0);
    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| 3.0 * a - 3.0 * b + c)
        .collect()
}

/// WMA(2*WMA(n/2) - WMA(n), sqrt(n)).
pub fn hma(values: &[f64], period: usize) -> Vec<f64> {
    let half = (period / 2).max(1);
    let root = (period as f64).sqrt().round().max(1.0) as usize;
    let fast = wma(values, half);
    let slow = wma(values, period);
    let diff: Vec<f64> = fast.iter().zip(&slow).map(|(a, b)| 2.0 * a - b).collect();
    wma(&diff, root)
}
