mod common;

use assert_matches::assert_matches;
use common::*;
use nubra_talib::indicators::IndicatorInfo;
use nubra_talib::{
    add_basics, add_talib, to_ohlcv_df, AbstractIndicator, AbstractRegistry, ConvertOptions,
    IndicatorAnnotator, IndicatorOutput, IndicatorParams, IndicatorSpec, NubraError,
    OhlcvFrameExt, Result,
};
use polars::prelude::*;
use std::sync::Arc;

fn ohlcv(n: usize) -> DataFrame {
    to_ohlcv_df(
        &response(full_chart(&wave(n), &cumulative(n))),
        SYMBOL,
        &ConvertOptions::default().with_interval("3m"),
    )
    .unwrap()
}

fn new_columns(before: &DataFrame, after: &DataFrame) -> Vec<String> {
    after
        .get_column_names()
        .iter()
        .skip(before.width())
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_rsi_adds_single_column() {
    let df = ohlcv(40);
    let spec = IndicatorSpec::default().with("RSI", IndicatorParams::new().with("timeperiod", 14));
    let out = add_talib(&df, spec, &IndicatorParams::new()).unwrap();

    assert_eq!(new_columns(&df, &out), ["rsi"]);
    let rsi = out.float_values("rsi").unwrap();
    assert!(rsi[..14].iter().all(Option::is_none));
    assert!(rsi[14..].iter().all(Option::is_some));
    assert!(rsi[14..].iter().flatten().all(|v| (0.0..=100.0).contains(v)));
    assert_eq!(df.width(), 6);
}

#[test]
fn test_unknown_indicator_adds_nothing() {
    let df = ohlcv(20);
    let result = add_talib(&df, ["RSI", "NOT_AN_INDICATOR"], &IndicatorParams::new());
    assert_matches!(result, Err(NubraError::UnknownIndicator(name)) if name == "NOT_AN_INDICATOR");
    assert_eq!(df.width(), 6);
}

#[test]
fn test_empty_spec_returns_copy() {
    let df = ohlcv(5);
    let out = add_talib(&df, IndicatorSpec::default(), &IndicatorParams::new()).unwrap();
    assert!(out.equals_missing(&df));
    let out = add_talib(&df, None::<IndicatorSpec>, &IndicatorParams::new()).unwrap();
    assert!(out.equals_missing(&df));
}

#[test]
fn test_named_outputs_and_names_list() {
    let df = ohlcv(60);
    let out = add_talib(&df, ["bbands", "MACD", "Stoch"], &IndicatorParams::new()).unwrap();
    assert_eq!(
        new_columns(&df, &out),
        [
            "bbands_upperband",
            "bbands_middleband",
            "bbands_lowerband",
            "macd_macd",
            "macd_macdsignal",
            "macd_macdhist",
            "stoch_slowk",
            "stoch_slowd",
        ]
    );

    let macd = out.float_values("macd_macd").unwrap();
    assert!(macd[32].is_none());
    assert!(macd[33].is_some());
}

#[test]
fn test_defaults_overlaid_by_indicator_params() {
    let df = ohlcv(40);
    let defaults = IndicatorParams::new().with("timeperiod", 5);
    let spec = IndicatorSpec::default()
        .with("SMA", IndicatorParams::new())
        .with("EMA", IndicatorParams::new().with("timeperiod", 10));
    let out = df.with_indicators(spec, &defaults).unwrap();

    let sma = out.float_values("sma").unwrap();
    assert!(sma[3].is_none() && sma[4].is_some());
    let ema = out.float_values("ema").unwrap();
    assert!(ema[8].is_none() && ema[9].is_some());
}

#[test]
fn test_shared_defaults_ignored_where_not_applicable() {
    let df = ohlcv(40);
    let defaults = IndicatorParams::new().with("timeperiod", 7);
    let out = add_talib(&df, ["TRANGE", "OBV", "ATR"], &defaults).unwrap();
    assert_eq!(new_columns(&df, &out), ["trange", "obv", "atr"]);
    assert!(out.float_values("atr").unwrap()[7].is_some());
}

#[test]
fn test_invalid_parameter() {
    let df = ohlcv(20);
    let spec = IndicatorSpec::default().with("RSI", IndicatorParams::new().with("timeperiod", 0));
    assert_matches!(
        add_talib(&df, spec, &IndicatorParams::new()),
        Err(NubraError::InvalidParameter { indicator, .. }) if indicator == "RSI"
    );
}

#[test]
fn test_spec_from_json_preserves_order() {
    let df = ohlcv(40);
    let spec: IndicatorSpec =
        serde_json::from_str(r#"{"WMA": {"timeperiod": 3}, "CCI": {}, "MOM": {"timeperiod": 2}}"#)
            .unwrap();
    let out = add_talib(&df, spec, &IndicatorParams::new()).unwrap();
    assert_eq!(new_columns(&df, &out), ["wma", "cci", "mom"]);
}

#[test]
fn test_add_basics_on_converted_frame() {
    let df = ohlcv(35);
    let out = df.with_basics().unwrap();
    assert_eq!(new_columns(&df, &out), ["ma_6", "ma_30"]);
    assert_eq!(out.column("ma_30").unwrap().null_count(), 29);

    let via_fn = add_basics(&df).unwrap();
    assert!(via_fn.equals_missing(&out));
}

/// 返回兩個無名序列：收盤價的加減一
struct Envelope {
    info: IndicatorInfo,
}

impl Envelope {
    fn new() -> Self {
        Self {
            info: IndicatorInfo {
                name: "ENVELOPE".to_string(),
                group: "Custom".to_string(),
                display_name: "Envelope".to_string(),
                inputs: vec!["close".to_string()],
                parameters: IndicatorParams::new(),
                outputs: vec![],
            },
        }
    }
}

impl AbstractIndicator for Envelope {
    fn info(&self) -> &IndicatorInfo {
        &self.info
    }

    fn call(&self, frame: &DataFrame, _params: &IndicatorParams) -> Result<IndicatorOutput> {
        let close = frame.column("close")?.as_materialized_series().clone();
        let upper = (&close + 1.0).with_name("a".into());
        let lower = (&close - 1.0).with_name("b".into());
        Ok(IndicatorOutput::Unnamed(vec![upper, lower]))
    }
}

#[test]
fn test_unnamed_outputs_from_custom_registry() {
    let df = ohlcv(3);
    let mut registry = AbstractRegistry::new();
    registry.register(Arc::new(Envelope::new()));
    let annotator = IndicatorAnnotator::with_registry(Arc::new(registry));

    let out = annotator.annotate(&df, ["envelope"], &IndicatorParams::new()).unwrap();
    assert_eq!(new_columns(&df, &out), ["envelope_0", "envelope_1"]);

    let close = out.float_values("close").unwrap();
    let upper = out.float_values("envelope_0").unwrap();
    assert_eq!(upper[0], close[0].map(|c| c + 1.0));
}

#[test]
fn test_registry_unavailable() {
    let df = ohlcv(3);
    let annotator = IndicatorAnnotator::new(None);
    assert_matches!(
        annotator.annotate(&df, ["SMA"], &IndicatorParams::new()),
        Err(NubraError::Configuration(msg)) if msg.contains("abstract")
    );
}
