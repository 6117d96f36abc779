// utils/serde_helpers.rs - 序列化與反序列化輔助函數
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::time_utils::parse_timestamp_str;

/// 將任意 JSON 值寬鬆地轉換為奈秒時間戳
///
/// 整數原樣使用，浮點數截斷，字串交由 [`parse_timestamp_str`] 解析；
/// 其餘（null、布林、物件等）返回 None。
pub fn coerce_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// 將任意 JSON 值寬鬆地轉換為數值
pub fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// 寬鬆的時間戳反序列化器，無法辨識的內容解析為 None 而非報錯
///
/// # 使用範例
///
/// ```
/// use serde::Deserialize;
/// use nubra_talib::utils::serde_helpers::lenient_timestamp;
///
/// #[derive(Deserialize)]
/// struct Tick {
///     #[serde(default, deserialize_with = "lenient_timestamp")]
///     timestamp: Option<i64>,
/// }
///
/// let tick: Tick = serde_json::from_str(r#"{"timestamp": "42"}"#).unwrap();
/// assert_eq!(tick.timestamp, Some(42));
/// ```
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_timestamp))
}

/// 將 null 反序列化為型別預設值（例如空 Vec）
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 寬鬆的數值反序列化器
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(coerce_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_timestamp() {
        assert_eq!(coerce_timestamp(&json!(1_700_000_000_000_000_000i64)), Some(1_700_000_000_000_000_000));
        assert_eq!(coerce_timestamp(&json!(12.9)), Some(12));
        assert_eq!(coerce_timestamp(&json!("99")), Some(99));
        assert_eq!(coerce_timestamp(&json!(null)), None);
        assert_eq!(coerce_timestamp(&json!("yesterday")), None);
        assert_eq!(coerce_timestamp(&json!({"ts": 1})), None);
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(&json!(15050)), Some(15050.0));
        assert_eq!(coerce_value(&json!("101.5")), Some(101.5));
        assert_eq!(coerce_value(&json!(null)), None);
        assert_eq!(coerce_value(&json!(true)), None);
    }
}
