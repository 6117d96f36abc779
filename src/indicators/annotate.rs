//! 指標附加：依名稱查詢註冊表、呼叫指標並將輸出攤平為欄位

use polars::prelude::*;
use std::sync::Arc;
use tracing::debug;

use super::params::{IndicatorParams, IndicatorSpec};
use super::registry::{abstract_registry, IndicatorOutput, IndicatorRegistry};
use crate::domain_types::ColumnName;
use crate::error::{NubraError, Result};

const BASIC_SHORT_PERIOD: usize = 6;
const BASIC_LONG_PERIOD: usize = 30;

/// 指標附加器
///
/// 持有一個可選的註冊表；註冊表不可用時任何需要它的呼叫都會失敗。
#[derive(Clone)]
pub struct IndicatorAnnotator {
    registry: Option<Arc<dyn IndicatorRegistry>>,
}

impl IndicatorAnnotator {
    pub fn new(registry: Option<Arc<dyn IndicatorRegistry>>) -> Self {
        Self { registry }
    }

    pub fn with_registry(registry: Arc<dyn IndicatorRegistry>) -> Self {
        Self::new(Some(registry))
    }

    /// 使用預設的抽象指標註冊表
    pub fn from_default() -> Self {
        Self::new(abstract_registry())
    }

    pub fn has_registry(&self) -> bool {
        self.registry.is_some()
    }

    /// 返回附加了指標欄位的新表格
    ///
    /// 任一指標失敗時整個呼叫失敗，輸入表格不受影響。
    pub fn annotate(
        &self,
        df: &DataFrame,
        funcs: impl Into<IndicatorSpec>,
        defaults: &IndicatorParams,
    ) -> Result<DataFrame> {
        let spec: IndicatorSpec = funcs.into();
        let mut out = df.clone();
        if spec.is_empty() {
            return Ok(out);
        }

        for (name, params) in spec.into_entries() {
            let registry = self
                .registry
                .as_ref()
                .ok_or_else(NubraError::registry_unavailable)?;
            let indicator = registry.function(&name)?;
            let merged = params.overlaid_on(defaults);

            debug!(indicator = %name, params = merged.len(), "計算指標");
            let output = indicator.call(&out, &merged)?;

            for series in output_columns(&name, output) {
                out.with_column(series)?;
            }
        }

        debug!(columns = out.width() - df.width(), rows = out.height(), "指標附加完成");
        Ok(out)
    }
}

impl Default for IndicatorAnnotator {
    fn default() -> Self {
        Self::from_default()
    }
}

impl std::fmt::Debug for IndicatorAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorAnnotator")
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

/// 將指標輸出攤平為具名欄位
///
/// - 單一輸出：`<名稱>`
/// - 具名子輸出：`<名稱>_<標籤>`
/// - 無名輸出：`<名稱>_<位置>`，位置從 0 開始
///
/// 名稱與標籤都轉為小寫。
pub fn output_columns(name: &str, output: IndicatorOutput) -> Vec<Series> {
    let prefix = name.to_lowercase();
    match output {
        IndicatorOutput::Single(series) => vec![series.with_name(prefix.as_str().into())],
        IndicatorOutput::Named(columns) => columns
            .into_iter()
            .map(|(label, series)| {
                let column = format!("{}_{}", prefix, label.to_lowercase());
                series.with_name(column.as_str().into())
            })
            .collect(),
        IndicatorOutput::Unnamed(columns) => columns
            .into_iter()
            .enumerate()
            .map(|(idx, series)| {
                let column = format!("{}_{}", prefix, idx);
                series.with_name(column.as_str().into())
            })
            .collect(),
    }
}

/// 以預設註冊表附加指標
///
/// `funcs` 可為名稱列表或名稱 → 參數的有序對應；`defaults` 套用於每個指標，
/// 個別參數優先。
pub fn add_talib(
    df: &DataFrame,
    funcs: impl Into<IndicatorSpec>,
    defaults: &IndicatorParams,
) -> Result<DataFrame> {
    IndicatorAnnotator::from_default().annotate(df, funcs, defaults)
}

/// 附加 `ma_6` 與 `ma_30` 簡單移動平均，不經過註冊表
///
/// 窗口未滿或含 null 的位置為 null。
pub fn add_basics(df: &DataFrame) -> Result<DataFrame> {
    if df.column(ColumnName::CLOSE).is_err() {
        return Err(NubraError::MissingColumn(ColumnName::CLOSE.to_string()));
    }

    let close = || col(ColumnName::CLOSE).cast(DataType::Float64);
    let window = |size: usize| RollingOptionsFixedWindow {
        window_size: size,
        min_periods: size,
        ..Default::default()
    };

    let out = df
        .clone()
        .lazy()
        .with_columns([
            close()
                .rolling_mean(window(BASIC_SHORT_PERIOD))
                .alias(ColumnName::MA_SHORT),
            close()
                .rolling_mean(window(BASIC_LONG_PERIOD))
                .alias(ColumnName::MA_LONG),
        ])
        .collect()?;
    Ok(out)
}

/// null → NaN
pub(crate) fn to_nan_vec(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

/// 非有限值轉為 null 的 Float64 序列
#[cfg(any(feature = "abstract", test))]
pub(crate) fn nan_to_series(name: &str, values: &[f64]) -> Series {
    let values: Vec<Option<f64>> = values
        .iter()
        .map(|v| if v.is_finite() { Some(*v) } else { None })
        .collect();
    Series::new(name.into(), values)
}
