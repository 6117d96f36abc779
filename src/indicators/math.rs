//! 指標數值計算
//!
//! 所有函數都接受 `&[f64]`（缺值以 NaN 表示）並返回等長的 `Vec<f64>`，
//! 暖機期間的輸出為 NaN。窗口內只要有 NaN，該位置的輸出即為 NaN。
//!
//! 固定窗口的聚合（平均、標準差、最高、最低）交給 polars 的 rolling 表達式；
//! 遞迴平滑（EMA、Wilder）逐點計算。

use polars::prelude::{
    col, Column, DataFrame, Expr, IntoLazy, RollingFnParams, RollingOptionsFixedWindow,
    RollingVarParams,
};
use std::fmt;

use super::annotate::to_nan_vec;
use crate::domain_types::OhlcvFrameExt;
use crate::error::Result;

const WINDOW_COLUMN: &str = "window";

/// 移動平均類型，編號沿用常見指標函式庫的 `matype`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaType {
    Sma,
    Ema,
    Wma,
    Dema,
    Tema,
    Trima,
}

impl MaType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MaType::Sma),
            1 => Some(MaType::Ema),
            2 => Some(MaType::Wma),
            3 => Some(MaType::Dema),
            4 => Some(MaType::Tema),
            5 => Some(MaType::Trima),
            _ => None,
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaType::Sma => write!(f, "SMA"),
            MaType::Ema => write!(f, "EMA"),
            MaType::Wma => write!(f, "WMA"),
            MaType::Dema => write!(f, "DEMA"),
            MaType::Tema => write!(f, "TEMA"),
            MaType::Trima => write!(f, "TRIMA"),
        }
    }
}

fn nan_vec(n: usize) -> Vec<f64> {
    vec![f64::NAN; n]
}

fn first_valid(x: &[f64]) -> Option<usize> {
    x.iter().position(|v| !v.is_nan())
}

/// 以 polars 固定窗口表達式計算
///
/// NaN 先轉為 null，`min_periods` 等於窗口長度，因此窗口不滿或含缺值時輸出 NaN。
fn rolling_window(
    x: &[f64],
    period: usize,
    agg: impl FnOnce(Expr, RollingOptionsFixedWindow) -> Expr,
) -> Result<Vec<f64>> {
    if period == 0 || x.len() < period {
        return Ok(nan_vec(x.len()));
    }
    let values: Vec<Option<f64>> = x.iter().map(|v| (!v.is_nan()).then_some(*v)).collect();
    let options = RollingOptionsFixedWindow {
        window_size: period,
        min_periods: period,
        ..Default::default()
    };
    let out = DataFrame::new(vec![Column::new(WINDOW_COLUMN.into(), values)])?
        .lazy()
        .select([agg(col(WINDOW_COLUMN), options).alias(WINDOW_COLUMN)])
        .collect()?;
    Ok(to_nan_vec(&out.float_values(WINDOW_COLUMN)?))
}

fn rolling_max(x: &[f64], period: usize) -> Result<Vec<f64>> {
    rolling_window(x, period, Expr::rolling_max)
}

fn rolling_min(x: &[f64], period: usize) -> Result<Vec<f64>> {
    rolling_window(x, period, Expr::rolling_min)
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

// ---------------------------------------------------------------------------
// 移動平均
// ---------------------------------------------------------------------------

/// 簡單移動平均，暖機 `period - 1`
pub fn sma(x: &[f64], period: usize) -> Result<Vec<f64>> {
    rolling_window(x, period, Expr::rolling_mean)
}

/// 從 `seed_start` 起以前 `period` 個值的平均作為種子的指數平滑
fn ema_seeded(x: &[f64], period: usize, k: f64, seed_start: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = nan_vec(n);
    if period == 0 || seed_start + period > n {
        return out;
    }
    let mut prev = mean(&x[seed_start..seed_start + period]);
    out[seed_start + period - 1] = prev;
    for i in (seed_start + period)..n {
        prev += k * (x[i] - prev);
        out[i] = prev;
    }
    out
}

fn ema_k(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// 指數移動平均，以首個窗口的 SMA 為種子，略過開頭的 NaN
pub fn ema(x: &[f64], period: usize) -> Vec<f64> {
    match first_valid(x) {
        Some(start) => ema_seeded(x, period, ema_k(period), start),
        None => nan_vec(x.len()),
    }
}

/// 線性加權移動平均
///
/// polars 的加權窗口不接受含 null 的輸入，這裡逐窗口計算。
pub fn wma(x: &[f64], period: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = nan_vec(n);
    if period == 0 || n < period {
        return out;
    }
    let denom = (period * (period + 1)) as f64 / 2.0;
    for (i, window) in x.windows(period).enumerate() {
        out[i + period - 1] = window
            .iter()
            .enumerate()
            .map(|(w, v)| v * (w + 1) as f64)
            .sum::<f64>()
            / denom;
    }
    out
}

/// 雙重指數移動平均，暖機 `2 * (period - 1)`
pub fn dema(x: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema(x, period);
    let e2 = ema(&e1, period);
    e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
}

/// 三重指數移動平均，暖機 `3 * (period - 1)`
pub fn tema(x: &[f64], period: usize) -> Vec<f64> {
    let e1 = ema(x, period);
    let e2 = ema(&e1, period);
    let e3 = ema(&e2, period);
    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| 3.0 * a - 3.0 * b + c)
        .collect()
}

/// 三角移動平均（兩層 SMA），暖機 `period - 1`
pub fn trima(x: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Ok(nan_vec(x.len()));
    }
    let (first, second) = if period % 2 == 1 {
        let half = (period + 1) / 2;
        (half, half)
    } else {
        (period / 2, period / 2 + 1)
    };
    sma(&sma(x, first)?, second)
}

/// 依類型計算移動平均
pub fn moving_average(x: &[f64], period: usize, ma_type: MaType) -> Result<Vec<f64>> {
    match ma_type {
        MaType::Sma => sma(x, period),
        MaType::Ema => Ok(ema(x, period)),
        MaType::Wma => Ok(wma(x, period)),
        MaType::Dema => Ok(dema(x, period)),
        MaType::Tema => Ok(tema(x, period)),
        MaType::Trima => trima(x, period),
    }
}

/// 窗口內最高與最低的中點
pub fn midpoint(x: &[f64], period: usize) -> Result<Vec<f64>> {
    let hh = rolling_max(x, period)?;
    let ll = rolling_min(x, period)?;
    Ok(hh.iter().zip(&ll).map(|(h, l)| (h + l) / 2.0).collect())
}

/// 母體標準差
pub fn stddev(x: &[f64], period: usize) -> Result<Vec<f64>> {
    rolling_window(x, period, |expr, mut options| {
        options.fn_params = Some(RollingFnParams::Var(RollingVarParams { ddof: 0 }));
        expr.rolling_std(options)
    })
}

/// 布林通道：返回 (上軌, 中軌, 下軌)
pub fn bbands(
    x: &[f64],
    period: usize,
    nbdev_up: f64,
    nbdev_dn: f64,
    ma_type: MaType,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let middle = moving_average(x, period, ma_type)?;
    let sd = stddev(x, period)?;
    let upper = middle.iter().zip(&sd).map(|(m, s)| m + nbdev_up * s).collect();
    let lower = middle.iter().zip(&sd).map(|(m, s)| m - nbdev_dn * s).collect();
    Ok((upper, middle, lower))
}

// ---------------------------------------------------------------------------
// 動能指標
// ---------------------------------------------------------------------------

/// Wilder 平滑的平均漲幅與跌幅，首個值出現在第 `period` 個差分
fn wilder_gain_loss(x: &[f64], period: usize) -> Vec<Option<(f64, f64)>> {
    let n = x.len();
    let mut out = vec![None; n];
    let Some(start) = first_valid(x) else {
        return out;
    };
    if period == 0 || n <= start + period {
        return out;
    }

    let split = |d: f64| if d > 0.0 { (d, 0.0) } else { (0.0, -d) };
    let p = period as f64;

    let (mut gain, mut loss) = (0.0, 0.0);
    for i in (start + 1)..=(start + period) {
        let (g, l) = split(x[i] - x[i - 1]);
        gain += g;
        loss += l;
    }
    gain /= p;
    loss /= p;
    out[start + period] = Some((gain, loss));

    for i in (start + period + 1)..n {
        let (g, l) = split(x[i] - x[i - 1]);
        gain = (gain * (p - 1.0) + g) / p;
        loss = (loss * (p - 1.0) + l) / p;
        out[i] = Some((gain, loss));
    }
    out
}

/// 相對強弱指標，暖機 `period`
pub fn rsi(x: &[f64], period: usize) -> Vec<f64> {
    wilder_gain_loss(x, period)
        .into_iter()
        .map(|avg| match avg {
            Some((g, l)) if g + l == 0.0 => 0.0,
            Some((g, l)) => 100.0 * g / (g + l),
            None => f64::NAN,
        })
        .collect()
}

/// 錢德動量擺動指標，暖機 `period`
pub fn cmo(x: &[f64], period: usize) -> Vec<f64> {
    wilder_gain_loss(x, period)
        .into_iter()
        .map(|avg| match avg {
            Some((g, l)) if g + l == 0.0 => 0.0,
            Some((g, l)) => 100.0 * (g - l) / (g + l),
            None => f64::NAN,
        })
        .collect()
}

/// 動量：x[i] - x[i - period]
pub fn mom(x: &[f64], period: usize) -> Vec<f64> {
    let mut out = nan_vec(x.len());
    for i in period..x.len() {
        out[i] = x[i] - x[i - period];
    }
    out
}

/// 變動率（百分比）；基期為 0 時輸出 0
pub fn roc(x: &[f64], period: usize) -> Vec<f64> {
    let mut out = nan_vec(x.len());
    for i in period..x.len() {
        let prev = x[i - period];
        out[i] = if prev == 0.0 {
            0.0
        } else {
            (x[i] / prev - 1.0) * 100.0
        };
    }
    out
}

/// 威廉指標
pub fn willr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Result<Vec<f64>> {
    let hh = rolling_max(high, period)?;
    let ll = rolling_min(low, period)?;
    Ok((0..close.len())
        .map(|i| {
            let range = hh[i] - ll[i];
            if range == 0.0 {
                0.0
            } else {
                -100.0 * (hh[i] - close[i]) / range
            }
        })
        .collect())
}

/// 典型價格
pub fn typprice(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| (high[i] + low[i] + close[i]) / 3.0)
        .collect()
}

/// 順勢指標
///
/// 平均偏差以窗口平均為中心，逐窗口計算。
pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Result<Vec<f64>> {
    let tp = typprice(high, low, close);
    let avg = sma(&tp, period)?;
    Ok(avg
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if m.is_nan() {
                return f64::NAN;
            }
            let window = &tp[i + 1 - period..=i];
            let mean_dev = window.iter().map(|v| (v - m).abs()).sum::<f64>() / period as f64;
            if mean_dev == 0.0 {
                0.0
            } else {
                (tp[i] - m) / (0.015 * mean_dev)
            }
        })
        .collect())
}

/// 平滑異同移動平均：返回 (macd, signal, hist)
///
/// 慢線短於快線時兩者互換；三個輸出都從總暖機期之後才有值。
pub fn macd(
    x: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = x.len();
    let (fast, slow) = if slow < fast { (slow, fast) } else { (fast, slow) };
    let Some(start) = first_valid(x) else {
        return (nan_vec(n), nan_vec(n), nan_vec(n));
    };
    if fast == 0 || signal == 0 {
        return (nan_vec(n), nan_vec(n), nan_vec(n));
    }

    // 快線與慢線在同一根K棒完成暖機
    let slow_ema = ema_seeded(x, slow, ema_k(slow), start);
    let fast_ema = ema_seeded(x, fast, ema_k(fast), start + slow - fast);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let sig = ema_seeded(&line, signal, ema_k(signal), start + slow - 1);

    let lookback = start + slow - 1 + signal - 1;
    let mut macd_out = nan_vec(n);
    let mut sig_out = nan_vec(n);
    let mut hist_out = nan_vec(n);
    for i in lookback.min(n)..n {
        macd_out[i] = line[i];
        sig_out[i] = sig[i];
        hist_out[i] = line[i] - sig[i];
    }
    (macd_out, sig_out, hist_out)
}

/// 隨機指標（慢速）：返回 (slowk, slowd)
#[allow(clippy::too_many_arguments)]
pub fn stoch(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    fastk_period: usize,
    slowk_period: usize,
    slowk_ma: MaType,
    slowd_period: usize,
    slowd_ma: MaType,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = close.len();
    let hh = rolling_max(high, fastk_period)?;
    let ll = rolling_min(low, fastk_period)?;
    let fastk: Vec<f64> = (0..n)
        .map(|i| {
            let range = hh[i] - ll[i];
            if range == 0.0 {
                0.0
            } else {
                100.0 * (close[i] - ll[i]) / range
            }
        })
        .collect();

    let slowk = moving_average(&fastk, slowk_period, slowk_ma)?;
    let slowd = moving_average(&slowk, slowd_period, slowd_ma)?;

    // 暖機長度隨平均類型而異，slowk 從 slowd 的第一個有效值起輸出
    let start = first_valid(&slowd).unwrap_or(n);
    let mut k_out = nan_vec(n);
    k_out[start..].copy_from_slice(&slowk[start..]);
    Ok((k_out, slowd))
}

// ---------------------------------------------------------------------------
// 波動度指標
// ---------------------------------------------------------------------------

/// 真實波幅，首列為 NaN
pub fn trange(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = close.len();
    let mut out = nan_vec(n);
    for i in 1..n {
        let prev = close[i - 1];
        let hl = high[i] - low[i];
        let hc = (high[i] - prev).abs();
        let lc = (low[i] - prev).abs();
        out[i] = if hl.is_nan() || hc.is_nan() || lc.is_nan() {
            f64::NAN
        } else {
            hl.max(hc).max(lc)
        };
    }
    out
}

/// 平均真實波幅（Wilder 平滑），暖機 `period`
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let tr = trange(high, low, close);
    let mut out = nan_vec(n);
    if period == 0 || n <= period {
        return out;
    }
    let p = period as f64;
    let mut prev = mean(&tr[1..=period]);
    out[period] = prev;
    for i in (period + 1)..n {
        prev = (prev * (p - 1.0) + tr[i]) / p;
        out[i] = prev;
    }
    out
}

/// 正規化平均真實波幅（百分比）
pub fn natr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    atr(high, low, close, period)
        .into_iter()
        .zip(close)
        .map(|(a, c)| {
            if a.is_nan() {
                f64::NAN
            } else if *c == 0.0 {
                0.0
            } else {
                a / c * 100.0
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 成交量指標
// ---------------------------------------------------------------------------

/// 能量潮
pub fn obv(price: &[f64], volume: &[f64]) -> Vec<f64> {
    let n = price.len();
    let mut out = nan_vec(n);
    if n == 0 {
        return out;
    }
    let mut acc = volume[0];
    out[0] = acc;
    for i in 1..n {
        if price[i] > price[i - 1] {
            acc += volume[i];
        } else if price[i] < price[i - 1] {
            acc -= volume[i];
        }
        out[i] = acc;
    }
    out
}

/// 累積/派發線
pub fn ad(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    (0..close.len())
        .map(|i| {
            let range = high[i] - low[i];
            if range > 0.0 {
                acc += ((close[i] - low[i]) - (high[i] - close[i])) / range * volume[i];
            } else if range.is_nan() || volume[i].is_nan() || close[i].is_nan() {
                acc = f64::NAN;
            }
            acc
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 價格轉換
// ---------------------------------------------------------------------------

pub fn avgprice(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| (open[i] + high[i] + low[i] + close[i]) / 4.0)
        .collect()
}

pub fn medprice(high: &[f64], low: &[f64]) -> Vec<f64> {
    (0..high.len()).map(|i| (high[i] + low[i]) / 2.0).collect()
}

pub fn wclprice(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| (high[i] + low[i] + 2.0 * close[i]) / 4.0)
        .collect()
}
