//! 基本市場數據類型定義

use polars::prelude::{DataFrame, PolarsError, PolarsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 標準列名定義
pub struct ColumnName;

impl ColumnName {
    pub const TIMESTAMP: &'static str = "timestamp"; // 帶時區的奈秒時間
    pub const OPEN: &'static str = "open"; // 開盤價
    pub const HIGH: &'static str = "high"; // 最高價
    pub const LOW: &'static str = "low"; // 最低價
    pub const CLOSE: &'static str = "close"; // 收盤價
    pub const VOLUME: &'static str = "volume"; // 成交量

    // 移動平均快捷欄位
    pub const MA_SHORT: &'static str = "ma_6";
    pub const MA_LONG: &'static str = "ma_30";
}

/// 回應中每個商品提供的欄位序列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    CumulativeVolume,
}

impl PriceField {
    /// 依輸出欄位順序排列的全部欄位
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::CumulativeVolume,
    ];

    /// 回應中的鍵名
    pub fn response_key(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::CumulativeVolume => "cumulative_volume",
        }
    }

    /// 輸出表格中的欄位名
    pub fn column(&self) -> &'static str {
        match self {
            PriceField::Open => ColumnName::OPEN,
            PriceField::High => ColumnName::HIGH,
            PriceField::Low => ColumnName::LOW,
            PriceField::Close => ColumnName::CLOSE,
            PriceField::CumulativeVolume => ColumnName::VOLUME,
        }
    }

    /// 是否以派薩（paise）計價，需要換算為盧比
    pub fn is_price(&self) -> bool {
        !matches!(self, PriceField::CumulativeVolume)
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response_key())
    }
}

/// 數據格式 trait - 定義表格格式的要求
pub trait DataFormat {
    /// 獲取此格式所需的必要列名
    fn required_columns() -> &'static [&'static str];

    /// 驗證 DataFrame 是否符合此格式的要求
    fn validate_dataframe(df: &DataFrame) -> PolarsResult<()> {
        for &col in Self::required_columns() {
            if df.column(col).is_err() {
                return Err(PolarsError::ColumnNotFound(
                    format!("Required column '{}' not found", col).into(),
                ));
            }
        }
        Ok(())
    }
}

/// OHLCV 數據格式
pub struct OhlcvFormat;

impl DataFormat for OhlcvFormat {
    fn required_columns() -> &'static [&'static str] {
        &[
            ColumnName::TIMESTAMP,
            ColumnName::OPEN,
            ColumnName::HIGH,
            ColumnName::LOW,
            ColumnName::CLOSE,
            ColumnName::VOLUME,
        ]
    }
}
