#![allow(dead_code)]

use nubra_talib::domain_types::PriceField;
use nubra_talib::{HistoricalDataResponse, Point, StockChart};
use serde_json::{json, Value};

/// 2026-01-01 09:15:00 IST 的 UTC 奈秒時間戳
pub const BASE_TS: i64 = 1_767_239_100_000_000_000;

/// 三分鐘
pub const STEP_NS: i64 = 180_000_000_000;

pub const SYMBOL: &str = "RELIANCE";

pub fn ts(i: usize) -> i64 {
    BASE_TS + i as i64 * STEP_NS
}

/// 以相同時間軸建立完整圖表，價格單位為派薩
pub fn full_chart(closes: &[f64], cumulative_volume: &[f64]) -> StockChart {
    let points = |values: Vec<f64>| -> Vec<Point> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Point::new(ts(i), v))
            .collect()
    };

    StockChart::default()
        .with_series(PriceField::Open, points(closes.iter().map(|c| c - 50.0).collect()))
        .with_series(PriceField::High, points(closes.iter().map(|c| c + 100.0).collect()))
        .with_series(PriceField::Low, points(closes.iter().map(|c| c - 100.0).collect()))
        .with_series(PriceField::Close, points(closes.to_vec()))
        .with_series(PriceField::CumulativeVolume, points(cumulative_volume.to_vec()))
}

/// 只有收盤價的圖表
pub fn close_only_chart(closes: &[f64]) -> StockChart {
    let points: Vec<Point> = closes
        .iter()
        .enumerate()
        .map(|(i, v)| Point::new(ts(i), *v))
        .collect();
    StockChart::default().with_series(PriceField::Close, points)
}

pub fn response(chart: StockChart) -> HistoricalDataResponse {
    HistoricalDataResponse::single(SYMBOL, chart)
}

/// 平滑起伏的收盤價序列（派薩）
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 150_000.0 + ((i as f64) * 0.7).sin() * 1_500.0 + i as f64 * 10.0)
        .collect()
}

/// 單調遞增的累積成交量
pub fn cumulative(n: usize) -> Vec<f64> {
    (0..n).map(|i| 1_000.0 * (i as f64 + 1.0)).collect()
}

/// 以字典形式表達的回應，含字串數值與無效點
pub fn json_response() -> Value {
    json!({
        "result": [
            {
                "values": [
                    {
                        "RELIANCE": {
                            "open": [{"timestamp": ts(0), "value": 15000}],
                            "close": [
                                {"timestamp": ts(0).to_string(), "value": "15050"},
                                {"timestamp": null, "value": 1},
                                {"timestamp": ts(1), "value": null}
                            ],
                            "cumulative_volume": [
                                {"timestamp": ts(0), "value": 100},
                                {"timestamp": ts(1), "value": 140}
                            ]
                        }
                    },
                    {"TCS": {"close": [{"timestamp": ts(5), "value": 1}]}}
                ]
            },
            {"values": [{"RELIANCE": null}]}
        ]
    })
}
