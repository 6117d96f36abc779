//! 時區重投影
//!
//! 時間欄位在內部一律是 UTC 紀元奈秒，重投影只改變欄位的時區屬性，
//! 因此對同一時區重複執行結果不變。

use polars::prelude::*;
use tracing::debug;

use super::options::IST_TIMEZONE;
use crate::error::Result;
use crate::utils::time_utils::{parse_timestamp_str, unit_to_ns_factor, validate_time_zone};

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

/// 返回副本，將時間欄位轉換為印度標準時間
pub fn to_ist(df: &DataFrame, column: &str) -> Result<DataFrame> {
    reproject_timezone(df, column, IST_TIMEZONE)
}

/// 返回副本，將 `column` 解讀為 UTC 時間點後以 `timezone` 呈現
///
/// 欄位不存在時返回未修改的副本；無法解析的值變為 null。
pub fn reproject_timezone(df: &DataFrame, column: &str, timezone: &str) -> Result<DataFrame> {
    validate_time_zone(timezone)?;

    let mut out = df.clone();
    let Ok(existing) = df.column(column) else {
        debug!(column, "時間欄位不存在，跳過時區轉換");
        return Ok(out);
    };

    let nanos = epoch_nanos(existing.as_materialized_series())?;
    let reprojected = datetime_series(column, nanos, timezone)?;
    out.with_column(reprojected)?;
    Ok(out)
}

/// 由紀元奈秒建立帶時區的 Datetime 欄位
pub(crate) fn datetime_series(name: &str, nanos: Vec<Option<i64>>, timezone: &str) -> Result<Series> {
    let raw = Series::new(name.into(), nanos);
    Ok(raw.cast(&DataType::Datetime(
        TimeUnit::Nanoseconds,
        Some(timezone.into()),
    ))?)
}

/// 將任意時間欄位轉換為 UTC 紀元奈秒
///
/// 整數視為奈秒，無時區的 Datetime 視為 UTC，字串逐一解析。
fn epoch_nanos(series: &Series) -> Result<Vec<Option<i64>>> {
    let values = match series.dtype() {
        DataType::Datetime(unit, _) => {
            let factor = unit_to_ns_factor(*unit);
            let physical = series.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|v| v.checked_mul(factor)))
                .collect()
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|v| v.and_then(|d| i64::from(d).checked_mul(NANOS_PER_DAY)))
                .collect()
        }
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_timestamp_str))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let floats = series.cast(&DataType::Float64)?;
            floats
                .f64()?
                .into_iter()
                .map(|v| {
                    v.filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                        .map(|f| f.trunc() as i64)
                })
                .collect()
        }
        dtype if dtype.is_integer() => {
            let ints = series.cast(&DataType::Int64)?;
            ints.i64()?.into_iter().collect()
        }
        dtype => {
            debug!(?dtype, "無法解讀為時間的欄位類型，全部轉為 null");
            vec![None; series.len()]
        }
    };
    Ok(values)
}
