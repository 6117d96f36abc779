use serde::{Deserialize, Serialize};

use crate::utils::serde_helpers::{lenient_f64, lenient_timestamp};

/// 行情數據點：紀元奈秒時間戳與數值
///
/// 兩個欄位都可能缺失；缺少時間戳的點在建表時會被丟棄。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
}

impl Point {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            value: Some(value),
        }
    }

    /// 帶空值的數據點
    pub fn null_value(timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
            value: None,
        }
    }
}

/// 單一欄位（open/high/low/close/cumulative_volume）的點序列，順序不保證
pub type FieldSeries = Vec<Point>;
