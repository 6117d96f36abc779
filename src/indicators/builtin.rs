//! 內建指標集合
//!
//! 每個指標由靜態描述與一個計算函數組成；描述中的參數預設值、輸入欄位
//! 與輸出標籤沿用常見技術分析函式庫的命名。

use polars::prelude::{DataFrame, Series};
use std::sync::Arc;
use tracing::{debug, trace};

use super::annotate::{nan_to_series, to_nan_vec};
use super::math::{self, MaType};
use super::params::{IndicatorParams, ParamValue};
use super::registry::{AbstractIndicator, IndicatorInfo, IndicatorOutput};
use crate::domain_types::{ColumnName, OhlcvFrameExt};
use crate::error::{NubraError, Result};

/// 可指定來源欄位的單一價格輸入
pub const PRICE_INPUT: &str = "price";

const MAX_PERIOD: usize = 100_000;

const OVERLAP: &str = "Overlap Studies";
const MOMENTUM: &str = "Momentum Indicators";
const VOLATILITY: &str = "Volatility Indicators";
const VOLUME: &str = "Volume Indicators";
const PRICE_TRANSFORM: &str = "Price Transform";

type ComputeFn = fn(&[Vec<f64>], &Resolved) -> Result<Vec<Vec<f64>>>;

/// 合併後的參數，提供帶驗證的讀取
pub struct Resolved {
    indicator: String,
    params: IndicatorParams,
}

impl Resolved {
    fn value(&self, key: &str) -> Result<&ParamValue> {
        self.params
            .get(key)
            .ok_or_else(|| NubraError::invalid_parameter(&self.indicator, key, "缺少參數"))
    }

    /// 讀取週期參數並檢查範圍
    pub fn period(&self, key: &str, min: usize) -> Result<usize> {
        let raw = self.value(key)?;
        let value = raw.as_i64().ok_or_else(|| {
            NubraError::invalid_parameter(&self.indicator, key, format!("需要整數，收到 {}", raw))
        })?;
        if value < min as i64 || value > MAX_PERIOD as i64 {
            return Err(NubraError::invalid_parameter(
                &self.indicator,
                key,
                format!("值 {} 不在範圍 {}..={} 內", value, min, MAX_PERIOD),
            ));
        }
        Ok(value as usize)
    }

    pub fn float(&self, key: &str) -> Result<f64> {
        let raw = self.value(key)?;
        raw.as_f64().ok_or_else(|| {
            NubraError::invalid_parameter(&self.indicator, key, format!("需要數值，收到 {}", raw))
        })
    }

    pub fn ma_type(&self, key: &str) -> Result<MaType> {
        let raw = self.value(key)?;
        raw.as_i64().and_then(MaType::from_code).ok_or_else(|| {
            NubraError::invalid_parameter(&self.indicator, key, format!("不支援的移動平均類型 {}", raw))
        })
    }

    /// 單一價格輸入對應的欄位，預設為收盤價
    fn price_column(&self) -> Result<String> {
        match self.params.get(PRICE_INPUT) {
            None => Ok(ColumnName::CLOSE.to_string()),
            Some(ParamValue::Str(column)) => Ok(column.clone()),
            Some(other) => Err(NubraError::invalid_parameter(
                &self.indicator,
                PRICE_INPUT,
                format!("需要欄位名稱，收到 {}", other),
            )),
        }
    }
}

/// 內建指標
pub struct BuiltinIndicator {
    info: IndicatorInfo,
    compute: ComputeFn,
}

impl BuiltinIndicator {
    fn uses_price(&self) -> bool {
        self.info.inputs.iter().any(|i| i == PRICE_INPUT)
    }

    /// 只保留本指標認得的參數，其餘忽略
    fn resolve(&self, params: &IndicatorParams) -> Resolved {
        let mut merged = self.info.parameters.clone();
        for (key, value) in params.iter() {
            if self.info.parameters.contains_key(key) || (key == PRICE_INPUT && self.uses_price()) {
                merged.insert(key.clone(), value.clone());
            } else {
                debug!(indicator = %self.info.name, param = %key, "忽略不適用的參數");
            }
        }
        Resolved {
            indicator: self.info.name.clone(),
            params: merged,
        }
    }
}

impl AbstractIndicator for BuiltinIndicator {
    fn info(&self) -> &IndicatorInfo {
        &self.info
    }

    fn call(&self, frame: &DataFrame, params: &IndicatorParams) -> Result<IndicatorOutput> {
        let resolved = self.resolve(params);

        let inputs = self
            .info
            .inputs
            .iter()
            .map(|input| {
                let column = if input == PRICE_INPUT {
                    resolved.price_column()?
                } else {
                    input.clone()
                };
                Ok(to_nan_vec(&frame.float_values(&column)?))
            })
            .collect::<Result<Vec<_>>>()?;

        trace!(indicator = %self.info.name, rows = frame.height(), "計算內建指標");
        let values = (self.compute)(&inputs, &resolved)?;

        let mut series: Vec<(String, Series)> = self
            .info
            .outputs
            .iter()
            .zip(values.iter())
            .map(|(label, v)| (label.clone(), nan_to_series(label, v)))
            .collect();

        if series.len() == 1 {
            let (_, single) = series.remove(0);
            Ok(IndicatorOutput::Single(single))
        } else {
            Ok(IndicatorOutput::Named(series))
        }
    }
}

fn indicator(
    name: &str,
    group: &str,
    display_name: &str,
    inputs: &[&str],
    parameters: &[(&str, ParamValue)],
    outputs: &[&str],
    compute: ComputeFn,
) -> Arc<dyn AbstractIndicator> {
    Arc::new(BuiltinIndicator {
        info: IndicatorInfo {
            name: name.to_string(),
            group: group.to_string(),
            display_name: display_name.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            parameters: parameters.iter().cloned().collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        },
        compute,
    })
}

fn int(v: i64) -> ParamValue {
    ParamValue::Int(v)
}

fn float(v: f64) -> ParamValue {
    ParamValue::Float(v)
}

const REAL: &[&str] = &["real"];
const HLC: &[&str] = &[ColumnName::HIGH, ColumnName::LOW, ColumnName::CLOSE];

/// 全部內建指標，依群組排列
pub fn catalog() -> Vec<Arc<dyn AbstractIndicator>> {
    vec![
        // Overlap Studies
        indicator("SMA", OVERLAP, "Simple Moving Average", &[PRICE_INPUT], &[("timeperiod", int(30))], REAL,
            |x, p| Ok(vec![math::sma(&x[0], p.period("timeperiod", 2)?)?])),
        indicator("EMA", OVERLAP, "Exponential Moving Average", &[PRICE_INPUT], &[("timeperiod", int(30))], REAL,
            |x, p| Ok(vec![math::ema(&x[0], p.period("timeperiod", 2)?)])),
        indicator("WMA", OVERLAP, "Weighted Moving Average", &[PRICE_INPUT], &[("timeperiod", int(30))], REAL,
            |x, p| Ok(vec![math::wma(&x[0], p.period("timeperiod", 2)?)])),
        indicator("DEMA", OVERLAP, "Double Exponential Moving Average", &[PRICE_INPUT], &[("timeperiod", int(30))], REAL,
            |x, p| Ok(vec![math::dema(&x[0], p.period("timeperiod", 2)?)])),
        indicator("TEMA", OVERLAP, "Triple Exponential Moving Average", &[PRICE_INPUT], &[("timeperiod", int(30))], REAL,
            |x, p| Ok(vec![math::tema(&x[0], p.period("timeperiod", 2)?)])),
        indicator("TRIMA", OVERLAP, "Triangular Moving Average", &[PRICE_INPUT], &[("timeperiod", int(30))], REAL,
            |x, p| Ok(vec![math::trima(&x[0], p.period("timeperiod", 2)?)?])),
        indicator("MIDPOINT", OVERLAP, "MidPoint over period", &[PRICE_INPUT], &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::midpoint(&x[0], p.period("timeperiod", 2)?)?])),
        indicator(
            "BBANDS",
            OVERLAP,
            "Bollinger Bands",
            &[PRICE_INPUT],
            &[
                ("timeperiod", int(5)),
                ("nbdevup", float(2.0)),
                ("nbdevdn", float(2.0)),
                ("matype", int(0)),
            ],
            &["upperband", "middleband", "lowerband"],
            |x, p| {
                let (upper, middle, lower) = math::bbands(
                    &x[0],
                    p.period("timeperiod", 2)?,
                    p.float("nbdevup")?,
                    p.float("nbdevdn")?,
                    p.ma_type("matype")?,
                )?;
                Ok(vec![upper, middle, lower])
            },
        ),
        // Momentum Indicators
        indicator("RSI", MOMENTUM, "Relative Strength Index", &[PRICE_INPUT], &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::rsi(&x[0], p.period("timeperiod", 2)?)])),
        indicator("MOM", MOMENTUM, "Momentum", &[PRICE_INPUT], &[("timeperiod", int(10))], REAL,
            |x, p| Ok(vec![math::mom(&x[0], p.period("timeperiod", 1)?)])),
        indicator("ROC", MOMENTUM, "Rate of change : ((price/prevPrice)-1)*100", &[PRICE_INPUT], &[("timeperiod", int(10))], REAL,
            |x, p| Ok(vec![math::roc(&x[0], p.period("timeperiod", 1)?)])),
        indicator("CMO", MOMENTUM, "Chande Momentum Oscillator", &[PRICE_INPUT], &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::cmo(&x[0], p.period("timeperiod", 2)?)])),
        indicator("WILLR", MOMENTUM, "Williams' %R", HLC, &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::willr(&x[0], &x[1], &x[2], p.period("timeperiod", 2)?)?])),
        indicator("CCI", MOMENTUM, "Commodity Channel Index", HLC, &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::cci(&x[0], &x[1], &x[2], p.period("timeperiod", 2)?)?])),
        indicator(
            "MACD",
            MOMENTUM,
            "Moving Average Convergence/Divergence",
            &[PRICE_INPUT],
            &[
                ("fastperiod", int(12)),
                ("slowperiod", int(26)),
                ("signalperiod", int(9)),
            ],
            &["macd", "macdsignal", "macdhist"],
            |x, p| {
                let (line, signal, hist) = math::macd(
                    &x[0],
                    p.period("fastperiod", 2)?,
                    p.period("slowperiod", 2)?,
                    p.period("signalperiod", 1)?,
                );
                Ok(vec![line, signal, hist])
            },
        ),
        indicator(
            "STOCH",
            MOMENTUM,
            "Stochastic",
            HLC,
            &[
                ("fastk_period", int(5)),
                ("slowk_period", int(3)),
                ("slowk_matype", int(0)),
                ("slowd_period", int(3)),
                ("slowd_matype", int(0)),
            ],
            &["slowk", "slowd"],
            |x, p| {
                let (slowk, slowd) = math::stoch(
                    &x[0],
                    &x[1],
                    &x[2],
                    p.period("fastk_period", 1)?,
                    p.period("slowk_period", 1)?,
                    p.ma_type("slowk_matype")?,
                    p.period("slowd_period", 1)?,
                    p.ma_type("slowd_matype")?,
                )?;
                Ok(vec![slowk, slowd])
            },
        ),
        // Volatility Indicators
        indicator("TRANGE", VOLATILITY, "True Range", HLC, &[], REAL,
            |x, _| Ok(vec![math::trange(&x[0], &x[1], &x[2])])),
        indicator("ATR", VOLATILITY, "Average True Range", HLC, &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::atr(&x[0], &x[1], &x[2], p.period("timeperiod", 1)?)])),
        indicator("NATR", VOLATILITY, "Normalized Average True Range", HLC, &[("timeperiod", int(14))], REAL,
            |x, p| Ok(vec![math::natr(&x[0], &x[1], &x[2], p.period("timeperiod", 1)?)])),
        // Volume Indicators
        indicator("OBV", VOLUME, "On Balance Volume", &[PRICE_INPUT, ColumnName::VOLUME], &[], REAL,
            |x, _| Ok(vec![math::obv(&x[0], &x[1])])),
        indicator(
            "AD",
            VOLUME,
            "Chaikin A/D Line",
            &[ColumnName::HIGH, ColumnName::LOW, ColumnName::CLOSE, ColumnName::VOLUME],
            &[],
            REAL,
            |x, _| Ok(vec![math::ad(&x[0], &x[1], &x[2], &x[3])]),
        ),
        // Price Transform
        indicator(
            "AVGPRICE",
            PRICE_TRANSFORM,
            "Average Price",
            &[ColumnName::OPEN, ColumnName::HIGH, ColumnName::LOW, ColumnName::CLOSE],
            &[],
            REAL,
            |x, _| Ok(vec![math::avgprice(&x[0], &x[1], &x[2], &x[3])]),
        ),
        indicator("MEDPRICE", PRICE_TRANSFORM, "Median Price", &[ColumnName::HIGH, ColumnName::LOW], &[], REAL,
            |x, _| Ok(vec![math::medprice(&x[0], &x[1])])),
        indicator("TYPPRICE", PRICE_TRANSFORM, "Typical Price", HLC, &[], REAL,
            |x, _| Ok(vec![math::typprice(&x[0], &x[1], &x[2])])),
        indicator("WCLPRICE", PRICE_TRANSFORM, "Weighted Close Price", HLC, &[], REAL,
            |x, _| Ok(vec![math::wclprice(&x[0], &x[1], &x[2])])),
    ]
}
