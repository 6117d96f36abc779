//! 歷史數據回應模型
//!
//! 回應結構為：批次列表 → 每批次的商品值映射 → 每商品的欄位序列 → 數據點。
//! 同時支援強型別模型與未經解析的 `serde_json::Value`，兩者都透過
//! [`ChartSource`] 提供相同的讀取能力。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

use super::data_point::{FieldSeries, Point};
use super::types::PriceField;
use crate::error::Result;
use crate::utils::serde_helpers::{coerce_timestamp, coerce_value, null_as_default};

/// 歷史數據回應
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<ChartBatch>,
}

/// 單一結果批次
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartBatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<HashMap<String, StockChart>>,
}

/// 單一商品的欄位序列集合，缺少的序列視為空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockChart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub open: FieldSeries,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high: FieldSeries,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low: FieldSeries,
    #[serde(default, deserialize_with = "null_as_default")]
    pub close: FieldSeries,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumulative_volume: FieldSeries,
}

impl StockChart {
    /// 依欄位取得點序列
    pub fn series(&self, field: PriceField) -> &[Point] {
        match field {
            PriceField::Open => &self.open,
            PriceField::High => &self.high,
            PriceField::Low => &self.low,
            PriceField::Close => &self.close,
            PriceField::CumulativeVolume => &self.cumulative_volume,
        }
    }

    pub fn series_mut(&mut self, field: PriceField) -> &mut FieldSeries {
        match field {
            PriceField::Open => &mut self.open,
            PriceField::High => &mut self.high,
            PriceField::Low => &mut self.low,
            PriceField::Close => &mut self.close,
            PriceField::CumulativeVolume => &mut self.cumulative_volume,
        }
    }

    /// 以建構器風格設定某欄位的點序列
    pub fn with_series(mut self, field: PriceField, points: impl Into<FieldSeries>) -> Self {
        *self.series_mut(field) = points.into();
        self
    }
}

impl HistoricalDataResponse {
    /// 從 JSON 字串解析回應
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 建立只含單一批次、單一商品的回應
    pub fn single(symbol: impl Into<String>, chart: StockChart) -> Self {
        let mut values = HashMap::new();
        values.insert(symbol.into(), chart);
        Self {
            result: vec![ChartBatch {
                values: vec![values],
            }],
        }
    }
}

/// 可以依商品代碼列出圖表數據的來源
pub trait ChartSource {
    /// 依批次順序列出所有屬於 `symbol` 的圖表
    fn charts_for(&self, symbol: &str) -> Vec<Cow<'_, StockChart>>;
}

impl ChartSource for HistoricalDataResponse {
    fn charts_for(&self, symbol: &str) -> Vec<Cow<'_, StockChart>> {
        self.result
            .iter()
            .flat_map(|batch| batch.values.iter())
            .filter_map(|stock_data| stock_data.get(symbol))
            .map(Cow::Borrowed)
            .collect()
    }
}

impl ChartSource for Value {
    fn charts_for(&self, symbol: &str) -> Vec<Cow<'_, StockChart>> {
        let mut charts = Vec::new();
        for batch in array_field(self, "result") {
            for stock_data in array_field(batch, "values") {
                // 只有物件形式的商品映射才可能包含該商品
                let Some(chart) = stock_data.as_object().and_then(|m| m.get(symbol)) else {
                    continue;
                };
                if chart.is_null() {
                    continue;
                }
                charts.push(Cow::Owned(chart_from_value(chart)));
            }
        }
        charts
    }
}

impl<T: ChartSource + ?Sized> ChartSource for &T {
    fn charts_for(&self, symbol: &str) -> Vec<Cow<'_, StockChart>> {
        (**self).charts_for(symbol)
    }
}

/// 讀取命名欄位；不存在、為 null 或本身不是物件時返回 None
pub fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.get(name).filter(|v| !v.is_null())
}

fn array_field<'a>(value: &'a Value, name: &str) -> &'a [Value] {
    field(value, name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn chart_from_value(chart: &Value) -> StockChart {
    let mut out = StockChart::default();
    for price_field in PriceField::ALL {
        *out.series_mut(price_field) = array_field(chart, price_field.response_key())
            .iter()
            .map(point_from_value)
            .collect();
    }
    out
}

fn point_from_value(point: &Value) -> Point {
    Point {
        timestamp: field(point, "timestamp").and_then(coerce_timestamp),
        value: field(point, "value").and_then(coerce_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "result": [{
                "values": [
                    {"ASHOKLEY": {"close": [{"timestamp": 1, "value": 100}], "open": null}},
                    {"TMPV": {"close": [{"timestamp": 1, "value": 200}]}},
                    "not-a-map",
                    {"ASHOKLEY": {"high": [{"timestamp": 2, "value": 300}]}}
                ]
            }, {
                "values": null
            }]
        })
    }

    #[test]
    fn test_value_source_filters_symbol() {
        let value = sample();
        let charts = value.charts_for("ASHOKLEY");
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].close, vec![Point::new(1, 100.0)]);
        assert!(charts[0].open.is_empty());
        assert_eq!(charts[1].high, vec![Point::new(2, 300.0)]);

        assert!(value.charts_for("MISSING").is_empty());
    }

    #[test]
    fn test_typed_and_value_sources_agree() {
        let value = sample();
        // 字串元素無法反序列化為映射，先移除再比較
        let mut cleaned = value.clone();
        cleaned["result"][0]["values"]
            .as_array_mut()
            .unwrap()
            .retain(|v| v.is_object());

        let typed: HistoricalDataResponse = serde_json::from_value(cleaned).unwrap();
        let typed_charts: Vec<StockChart> =
            typed.charts_for("ASHOKLEY").into_iter().map(Cow::into_owned).collect();
        let value_charts: Vec<StockChart> =
            value.charts_for("ASHOKLEY").into_iter().map(Cow::into_owned).collect();
        assert_eq!(typed_charts, value_charts);
    }

    #[test]
    fn test_field_accessor() {
        let v = json!({"a": 1, "b": null});
        assert_eq!(field(&v, "a"), Some(&json!(1)));
        assert_eq!(field(&v, "b"), None);
        assert_eq!(field(&v, "c"), None);
        assert_eq!(field(&json!([1, 2]), "a"), None);
    }
}
