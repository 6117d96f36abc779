//! 回應轉換模組
//!
//! 將歷史數據回應攤平為 OHLCV 表格，並提供時區重投影工具。

pub mod ohlcv;
pub mod options;
pub mod timezone;

pub use ohlcv::to_ohlcv_df;
pub use options::{ConvertOptions, DAILY_INTERVAL, IST_TIMEZONE, PAISE_PER_RUPEE};
pub use timezone::{reproject_timezone, to_ist};
