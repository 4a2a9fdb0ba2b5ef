//! Directional movement, Aroon, and pivot levels.

use super::average::smma;
use super::volatility::true_range;

/// +DI and -DI: Wilder-smoothed directional movement as a percentage of the
/// Wilder-smoothed true range.
pub fn dmi(high: &[f64], low: &[f64], close: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    let len = close.len();
    let mut plus_dm = vec![f64::NAN; len];
    let mut minus_dm = vec![f64::NAN; len];
    let mut tr = vec![f64::NAN; len];
    let raw_tr = true_range(high, low, close);

    for i in 1..len {
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
        tr[i] = raw_tr[i];
    }

    let smooth_plus = smma(&plus_dm, period);
    let smooth_minus = smma(&minus_dm, period);
    let smooth_tr = smma(&tr, period);

    let di = |dm: &[f64]| -> Vec<f64> {
        dm.iter()
            .zip(&smooth_tr)
            .map(|(d, t)| if *t == 0.0 { 0.0 } else { 100.0 * d / t })
            .collect()
    };
    (di(&smooth_plus), di(&smooth_minus))
}

/// Wilder's ADX: the smoothed directional index
/// DX = 100 * |+DI - -DI| / (+DI + -DI).
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let (plus, minus) = dmi(high, low, close, period);
    let dx: Vec<f64> = plus
        .iter()
        .zip(&minus)
        .map(|(p, m)| {
            let sum = p + m;
            if sum == 0.0 {
                0.0
            } else {
                100.0 * (p - m).abs() / sum
            }
        })
        .collect();
    smma(&dx, period)
}

/// ADX rating: mean of the current ADX and the ADX `period` bars back.
pub fn adxr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let adx_line = adx(high, low, close, period);
    let mut out = vec![f64::NAN; close.len()];
    for i in period..adx_line.len() {
        out[i] = (adx_line[i] + adx_line[i - period]) / 2.0;
    }
    out
}

/// Aroon up/down: bars since the window high/low, scaled to 0..100.
pub fn aroon(high: &[f64], low: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    let mut up = vec![f64::NAN; high.len()];
    let mut down = vec![f64::NAN; low.len()];
    for i in period..high.len() {
        let window = i - period..=i;
        let (high_offset, _) = high[window.clone()]
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (offset, &v)| {
                if v >= best.1 { (offset, v) } else { best }
            });
        let (low_offset, _) = low[window]
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (offset, &v)| {
                if v <= best.1 { (offset, v) } else { best }
            });
        // offset is within a window of period+1 bars, newest last
        up[i] = high_offset as f64 / period as f64 * 100.0;
        down[i] = low_offset as f64 / period as f64 * 100.0;
    }
    (up, down)
}

pub struct PivotLines {
    pub pp: Vec<f64>,
    pub r1: Vec<f64>,
    pub r2: Vec<f64>,
    pub r3: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
    pub s3: Vec<f64>,
}

/// Classic floor-trader pivots from the previous bar's high/low/close.
pub fn pivot_points(high: &[f64], low: &[f64], close: &[f64]) -> PivotLines {
    let len = close.len();
    let mut lines = PivotLines {
        pp: vec![f64::NAN; len],
        r1: vec![f64::NAN; len],
        r2: vec![f64::NAN; len],
        r3: vec![f64::NAN; len],
        s1: vec![f64::NAN; len],
        s2: vec![f64::NAN; len],
        s3: vec![f64::NAN; len],
    };

    for i in 1..len {
        let (h, l, c) = (high[i - 1], low[i - 1], close[i - 1]);
        let pp = (h + l + c) / 3.0;
        lines.pp[i] = pp;
        lines.r1[i] = 2.0 * pp - l;
        lines.s1[i] = 2.0 * pp - h;
        lines.r2[i] = pp + (h - l);
        lines.s2[i] = pp - (h - l);
        lines.r3[i] = h + 2.0 * (pp - l);
        lines.s3[i] = l - 2.0 * (h - pp);
    }
    lines
}
