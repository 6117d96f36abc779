// time_utils.rs
//
// 提供時間轉換相關的工具函數。
// 系統內部一律以 UTC 紀元奈秒（i64）表示時間點，時區只是顯示層的屬性。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use polars::prelude::TimeUnit;

use crate::error::{NubraError, Result};

/// 字串時間戳接受的無時區格式，一律視為 UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// 時間單位換算為奈秒的乘數
pub fn unit_to_ns_factor(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1,
        TimeUnit::Microseconds => 1_000,
        TimeUnit::Milliseconds => 1_000_000,
    }
}

/// 解析字串時間戳為 UTC 奈秒
///
/// 支援 RFC 3339（帶時區偏移）、常見的無時區格式（視為 UTC）、純日期，
/// 以及純數字的奈秒紀元。無法解析時返回 None。
pub fn parse_timestamp_str(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ns) = raw.parse::<i64>() {
        return Some(ns);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).timestamp_nanos_opt();
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc().timestamp_nanos_opt();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_utc().timestamp_nanos_opt())
}

/// 驗證 IANA 時區名稱
pub fn validate_time_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| NubraError::InvalidTimeZone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc
            .with_ymd_and_hms(2026, 1, 1, 11, 1, 57)
            .unwrap()
            .timestamp_nanos_opt()
            .unwrap();

        assert_eq!(parse_timestamp_str("2026-01-01T11:01:57.000Z"), Some(expected));
        assert_eq!(parse_timestamp_str("2026-01-01T16:31:57+05:30"), Some(expected));
        assert_eq!(parse_timestamp_str("2026-01-01 11:01:57"), Some(expected));
        assert_eq!(parse_timestamp_str(&expected.to_string()), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp_str(""), None);
        assert_eq!(parse_timestamp_str("not a time"), None);
        assert_eq!(parse_timestamp_str("2026-13-45"), None);
    }

    #[test]
    fn test_unit_factor() {
        assert_eq!(unit_to_ns_factor(TimeUnit::Milliseconds), 1_000_000);
        assert_eq!(unit_to_ns_factor(TimeUnit::Microseconds), 1_000);
        assert_eq!(unit_to_ns_factor(TimeUnit::Nanoseconds), 1);
    }

    #[test]
    fn test_validate_time_zone() {
        assert!(validate_time_zone("Asia/Kolkata").is_ok());
        assert!(validate_time_zone("UTC").is_ok());
        assert!(matches!(
            validate_time_zone("Mars/Olympus"),
            Err(NubraError::InvalidTimeZone(_))
        ));
    }
}
