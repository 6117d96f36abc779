//! 回應 → OHLCV 表格

use polars::prelude::*;
use polars::series::ops::NullBehavior;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

use super::options::{ConvertOptions, PAISE_PER_RUPEE};
use super::timezone::datetime_series;
use crate::domain_types::frame::empty_ohlcv_frame;
use crate::domain_types::{ChartSource, ColumnName, Point, PriceField, StockChart};
use crate::error::Result;
use crate::utils::time_utils::validate_time_zone;

const UTC: &str = "UTC";

/// 單一時間戳的一列數據，欄位順序同 [`PriceField::ALL`]
#[derive(Debug, Clone, PartialEq)]
struct OhlcvRow {
    timestamp: i64,
    values: [Option<f64>; 5],
}

/// 將歷史數據回應轉換為單一商品的 OHLCV 表格
///
/// 每個時間戳一列，欄位為 timestamp/open/high/low/close/volume。
/// 找不到商品時返回只有欄位、沒有資料的空表格。
pub fn to_ohlcv_df<S>(source: &S, symbol: &str, options: &ConvertOptions) -> Result<DataFrame>
where
    S: ChartSource + ?Sized,
{
    let timezone = options.target_timezone().unwrap_or(UTC);
    validate_time_zone(timezone)?;

    let mut rows: Vec<OhlcvRow> = Vec::new();
    for chart in source.charts_for(symbol) {
        rows.extend(chart_rows(&chart));
    }

    debug!(symbol, rows = rows.len(), interval = %options.interval, "回應攤平完成");

    let timestamp_dtype = DataType::Datetime(TimeUnit::Nanoseconds, Some(timezone.into()));
    if rows.is_empty() {
        return empty_ohlcv_frame(timestamp_dtype);
    }

    // 穩定排序：同一時間戳的多列保持批次順序
    rows.sort_by_key(|row| row.timestamp);

    let timestamps: Vec<Option<i64>> = rows.iter().map(|row| Some(row.timestamp)).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(PriceField::ALL.len() + 1);
    columns.push(datetime_series(ColumnName::TIMESTAMP, timestamps, timezone)?.into());

    for (idx, field) in PriceField::ALL.iter().enumerate() {
        let values: Vec<Option<f64>> = rows.iter().map(|row| row.values[idx]).collect();
        columns.push(Series::new(field.column().into(), values).into());
    }
    let frame = DataFrame::new(columns)?;

    let exprs = column_transforms(options);
    if exprs.is_empty() {
        return Ok(frame);
    }
    Ok(frame.lazy().with_columns(exprs).collect()?)
}

/// 價格換算與成交量差分的欄位表達式
///
/// 價格除以 100 後以四捨六入五成雙取到兩位小數；累積成交量取一階差分，
/// 首列與任一側為 null 的列都是 null。
fn column_transforms(options: &ConvertOptions) -> Vec<Expr> {
    let mut exprs = Vec::new();
    if options.paise_to_rupee {
        exprs.extend(PriceField::ALL.iter().filter(|f| f.is_price()).map(|f| {
            (col(f.column()) / lit(PAISE_PER_RUPEE))
                .round(2, RoundMode::HalfToEven)
                .alias(f.column())
        }));
    }
    if options.differences_volume() {
        let volume = PriceField::CumulativeVolume.column();
        exprs.push(col(volume).diff(lit(1i64), NullBehavior::Ignore).alias(volume));
    }
    exprs
}

/// 建立單一圖表的各欄位索引並依時間戳聯集產生列
fn chart_rows(chart: &StockChart) -> Vec<OhlcvRow> {
    let indices: Vec<BTreeMap<i64, Option<f64>>> = PriceField::ALL
        .iter()
        .map(|field| points_to_map(chart.series(*field)))
        .collect();

    let all_ts: BTreeSet<i64> = indices.iter().flat_map(|index| index.keys().copied()).collect();

    all_ts
        .into_iter()
        .map(|timestamp| {
            let mut values = [None; 5];
            for (slot, index) in values.iter_mut().zip(&indices) {
                *slot = index.get(&timestamp).copied().flatten();
            }
            OhlcvRow { timestamp, values }
        })
        .collect()
}

/// 時間戳 → 數值索引；缺少時間戳的點丟棄，重複時間戳後者覆蓋前者
fn points_to_map(points: &[Point]) -> BTreeMap<i64, Option<f64>> {
    let mut out = BTreeMap::new();
    for point in points {
        match point.timestamp {
            Some(ts) => {
                out.insert(ts, point.value);
            }
            None => trace!(?point, "丟棄缺少時間戳的數據點"),
        }
    }
    out
}
