// 模組定義
pub mod config;
pub mod convert;
pub mod domain_types;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod utils;

pub use convert::{to_ist, to_ohlcv_df, reproject_timezone, ConvertOptions, IST_TIMEZONE};
pub use domain_types::{ChartSource, HistoricalDataResponse, OhlcvFrameExt, Point, StockChart};
pub use error::{NubraError, Result};
pub use indicators::{
    abstract_registry, add_basics, add_talib, AbstractIndicator, AbstractRegistry,
    IndicatorAnnotator, IndicatorOutput, IndicatorParams, IndicatorRegistry, IndicatorSpec,
    ParamValue,
};
