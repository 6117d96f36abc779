//! 技術指標模組
//!
//! 以名稱查詢抽象指標註冊表，呼叫指標並將輸出攤平成具名欄位。

pub mod annotate;
#[cfg(feature = "abstract")]
pub mod builtin;
pub mod math;
pub mod params;
pub mod registry;

pub use annotate::{add_basics, add_talib, output_columns, IndicatorAnnotator};
pub use math::MaType;
pub use params::{IndicatorParams, IndicatorSpec, ParamValue};
pub use registry::{
    abstract_registry, AbstractIndicator, AbstractRegistry, IndicatorInfo, IndicatorOutput,
    IndicatorRegistry,
};
