//! Volume-derived series.

use super::average::{ema, sma};

/// Cumulative volume signed by the close-to-close direction, starting at 0.
pub fn obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; close.len()];
    for i in 1..close.len() {
        let delta = if close[i] > close[i - 1] {
            volume[i]
        } else if close[i] < close[i - 1] {
            -volume[i]
        } else {
            0.0
        };
        out[i] = out[i - 1] + delta;
    }
    out
}

/// Cumulative volume-weighted typical price.
pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    let mut weighted_sum = 0.0;
    let mut volume_sum = 0.0;
    for i in 0..close.len() {
        let typical = (high[i] + low[i] + close[i]) / 3.0;
        weighted_sum += typical * volume[i];
        volume_sum += volume[i];
        if volume_sum != 0.0 {
            out[i] = weighted_sum / volume_sum;
        }
    }
    out
}

/// EMA of (close change * volume).
pub fn force_index(close: &[f64], volume: &[f64], period: usize) -> Vec<f64> {
    let mut raw = vec![f64::NAN; close.len()];
    for i in 1..close.len() {
        raw[i] = (close[i] - close[i - 1]) * volume[i];
    }
    ema(&raw, period, 2.0)
}

fn money_flow_volume(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if range == 0.0 {
                0.0
            } else {
                ((close[i] - low[i]) - (high[i] - close[i])) / range * volume[i]
            }
        })
        .collect()
}

/// Cumulative money-flow volume.
pub fn ad_line(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mfv = money_flow_volume(high, low, close, volume);
    let mut out = vec![0.0; close.len()];
    let mut sum = 0.0;
    for (i, v) in mfv.iter().enumerate() {
        sum += v;
        out[i] = sum;
    }
    out
}

/// Rolling money-flow volume over rolling volume.
pub fn cmf(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
    period: usize,
) -> Vec<f64> {
    let mfv = money_flow_volume(high, low, close, volume);
    let mut out = vec![f64::NAN; close.len()];
    for i in (period - 1)..close.len() {
        let window = i + 1 - period..=i;
        let volume_sum: f64 = volume[window.clone()].iter().sum();
        if volume_sum != 0.0 {
            out[i] = mfv[window].iter().sum::<f64>() / volume_sum;
        }
    }
    out
}

/// Fast volume SMA minus slow volume SMA, at the conventional 12/26 windows.
pub fn volume_oscillator(volume: &[f64]) -> Vec<f64> {
    let fast = sma(volume, 12);
    let slow = sma(volume, 26);
    fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
}
