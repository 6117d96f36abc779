//! 基於 Polars 的 OHLCV 表格擴展

use polars::prelude::*;

use super::types::{ColumnName, DataFormat, OhlcvFormat};
use crate::error::{NubraError, Result};
use crate::indicators::{add_basics, add_talib, IndicatorParams, IndicatorSpec};

/// OHLCV 表格 trait，為 DataFrame 提供鏈式轉換
///
/// 每個轉換都返回新的 DataFrame，不修改輸入。
pub trait OhlcvFrameExt {
    /// 檢查是否具備標準 OHLCV 欄位
    fn is_ohlcv(&self) -> bool;

    /// 以 `Option<f64>` 讀取欄位，非浮點欄位會先轉型
    fn float_values(&self, column: &str) -> Result<Vec<Option<f64>>>;

    /// 將時間欄位轉換為印度標準時間
    fn to_ist(&self, column: &str) -> Result<DataFrame>;

    /// 附加技術指標欄位
    fn with_indicators(
        &self,
        funcs: impl Into<IndicatorSpec>,
        defaults: &IndicatorParams,
    ) -> Result<DataFrame>;

    /// 附加 6 與 30 期簡單移動平均
    fn with_basics(&self) -> Result<DataFrame>;
}

impl OhlcvFrameExt for DataFrame {
    fn is_ohlcv(&self) -> bool {
        OhlcvFormat::validate_dataframe(self).is_ok()
    }

    fn float_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let col = self
            .column(column)
            .map_err(|_| NubraError::MissingColumn(column.to_string()))?;
        let series = col.as_materialized_series().cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    fn to_ist(&self, column: &str) -> Result<DataFrame> {
        crate::convert::to_ist(self, column)
    }

    fn with_indicators(
        &self,
        funcs: impl Into<IndicatorSpec>,
        defaults: &IndicatorParams,
    ) -> Result<DataFrame> {
        add_talib(self, funcs, defaults)
    }

    fn with_basics(&self) -> Result<DataFrame> {
        add_basics(self)
    }
}

/// 標準欄位順序的空表格
pub(crate) fn empty_ohlcv_frame(timestamp_dtype: DataType) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(6);
    columns.push(Series::new_empty(ColumnName::TIMESTAMP.into(), &timestamp_dtype).into());
    for name in &OhlcvFormat::required_columns()[1..] {
        columns.push(Series::new_empty((*name).into(), &DataType::Float64).into());
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frame_has_canonical_columns() {
        let df = empty_ohlcv_frame(DataType::Int64).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.is_ohlcv());
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, ["timestamp", "open", "high", "low", "close", "volume"]);
    }

    #[test]
    fn test_float_values_casts_and_reports_missing() {
        let df = df![
            "close" => [1i64, 2, 3],
        ]
        .unwrap();
        assert_eq!(df.float_values("close").unwrap(), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert!(matches!(
            df.float_values("open"),
            Err(NubraError::MissingColumn(c)) if c == "open"
        ));
        assert!(!df.is_ohlcv());
    }
}
