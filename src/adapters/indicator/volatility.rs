//! Volatility bands and ranges.

use super::average::{ema, sma};
use super::valid_start;

/// Population standard deviation over a rolling window.
pub fn stddev(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let start = valid_start(values);
    for i in start..values.len() {
        if i + 1 < start + period {
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        out[i] = variance.sqrt();
    }
    out
}

pub fn bollinger(values: &[f64], period: usize, mult: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let middle = sma(values, period);
    let deviation = stddev(values, period);
    let upper: Vec<f64> = middle
        .iter()
        .zip(&deviation)
        .map(|(m, d)| m + mult * d)
        .collect();
    let lower: Vec<f64> = middle
        .iter()
        .zip(&deviation)
        .map(|(m, d)| m - mult * d)
        .collect();
    (upper, middle, lower)
}

/// True range per bar, then Wilder-smoothed: seed with a simple mean of the
/// first `period` true ranges.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tr = true_range(high, low, close);
    let mut out = vec![f64::NAN; close.len()];
    if tr.len() < period {
        return out;
    }

    let mut current = tr[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = current;
    for i in period..tr.len() {
        current = (current * (period as f64 - 1.0) + tr[i]) / period as f64;
        out[i] = current;
    }
    out
}

pub(super) fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let range = high[i] - low[i];
        tr.push(if i == 0 {
            range
        } else {
            let previous_close = close[i - 1];
            range
                .max((high[i] - previous_close).abs())
                .max((low[i] - previous_close).abs())
        });
    }
    tr
}

/// Highest high and lowest low over the window.
pub fn donchian(high: &[f64], low: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    let mut upper = vec![f64::NAN; high.len()];
    let mut lower = vec![f64::NAN; low.len()];
    for i in (period - 1)..high.len() {
        let window = i + 1 - period..=i;
        upper[i] = high[window.clone()]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        lower[i] = low[window].iter().copied().fold(f64::INFINITY, f64::min);
    }
    (upper, lower)
}

/// EMA midline with ATR bands at `mult` widths.
pub fn keltner(
    close: &[f64],
    high: &[f64],
    low: &[f64],
    period: usize,
    mult: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let middle = ema(close, period, 2.0);
    let range = atr(high, low, close, period);
    let upper: Vec<f64> = middle
        .iter()
        .zip(&range)
        .map(|(m, r)| m + mult * r)
        .collect();
    let lower: Vec<f64> = middle
        .iter()
        .zip(&range)
        .map(|(m, r)| m - mult * r)
        .collect();
    (upper, middle, lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stddev_of_constant_window_is_zero() {
        let out = stddev(&[5.0, 5.0, 5.0, 5.0], 3);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[3], 0.0);
    }

    #[test]
    fn stddev_known_window() {
        let out = stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert_relative_eq!(out[7], 2.0);
    }

    #[test]
    fn bollinger_bands_bracket_the_middle() {
        let values = [10.0, 12.0, 11.0, 13.0, 12.0];
        let (upper, middle, lower) = bollinger(&values, 3, 2.0);
        assert!(upper[4] > middle[4]);
        assert!(lower[4] < middle[4]);
        assert_relative_eq!(upper[4] - middle[4], middle[4] - lower[4], epsilon = 1e-9);
    }

    #[test]
    fn atr_on_constant_range() {
        let high = [12.0, 12.0, 12.0, 12.0];
        let low = [10.0, 10.0, 10.0, 10.0];
        let close = [11.0, 11.0, 11.0, 11.0];
        let out = atr(&high, &low, &close, 3);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 2.0);
        assert_relative_eq!(out[3], 2.0);
    }

    #[test]
    fn true_range_uses_previous_close_gaps() {
        // gap up: yesterday's close 10, today's range 14..15
        let tr = true_range(&[12.0, 15.0], &[9.0, 14.0], &[10.0, 14.5]);
        assert_relative_eq!(tr[0], 3.0);
        assert_relative_eq!(tr[1], 5.0);
    }

    #[test]
    fn donchian_tracks_window_extremes() {
        let high = [12.0, 15.0, 13.0, 14.0];
        let low = [10.0, 11.0, 9.0, 12.0];
        let (upper, lower) = donchian(&high, &low, 3);
        assert_relative_eq!(upper[2], 15.0);
        assert_relative_eq!(lower[2], 9.0);
        assert_relative_eq!(upper[3], 15.0);
        assert_relative_eq!(lower[3], 9.0);
    }

    #[test]
    fn keltner_bands_are_atr_widths_from_the_ema() {
        let close = [11.0, 11.0, 11.0, 11.0, 11.0];
        let high = [12.0; 5];
        let low = [10.0; 5];
        let (upper, middle, lower) = keltner(&close, &high, &low, 3, 1.5);
        assert_relative_eq!(middle[4], 11.0);
        assert_relative_eq!(upper[4], 11.0 + 1.5 * 2.0);
        assert_relative_eq!(lower[4], 11.0 - 1.5 * 2.0);
    }
}
