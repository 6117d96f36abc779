use serde::{Deserialize, Serialize};

/// 印度標準時間的 IANA 名稱
pub const IST_TIMEZONE: &str = "Asia/Kolkata";

/// 日線間隔標記；其他任何間隔字串都會觸發成交量差分
pub const DAILY_INTERVAL: &str = "1d";

/// 一盧比等於一百派薩
pub const PAISE_PER_RUPEE: f64 = 100.0;

/// 回應轉換選項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// 目標時區；None 或空字串代表保留 UTC
    pub timezone: Option<String>,
    /// 是否將派薩價格換算為盧比並四捨五入到兩位小數
    pub paise_to_rupee: bool,
    /// 宣告的取樣間隔，例如 "1d"、"3m"
    pub interval: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            timezone: Some(IST_TIMEZONE.to_string()),
            paise_to_rupee: true,
            interval: DAILY_INTERVAL.to_string(),
        }
    }
}

impl ConvertOptions {
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// 保留 UTC 時間戳
    pub fn without_timezone(mut self) -> Self {
        self.timezone = None;
        self
    }

    pub fn with_paise_to_rupee(mut self, enabled: bool) -> Self {
        self.paise_to_rupee = enabled;
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    /// 實際要套用的時區
    pub fn target_timezone(&self) -> Option<&str> {
        self.timezone.as_deref().filter(|tz| !tz.is_empty())
    }

    /// 是否把累積成交量轉為逐根成交量
    ///
    /// 僅以字串比對 "1d"（不分大小寫）判斷；例如 "1w" 也會被差分。
    pub fn differences_volume(&self) -> bool {
        !self.interval.eq_ignore_ascii_case(DAILY_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1d", false)]
    #[case("1D", false)]
    #[case("3m", true)]
    #[case("1h", true)]
    #[case("1w", true)]
    #[case(" 1d", true)]
    #[case("", true)]
    fn test_volume_differencing_rule(#[case] interval: &str, #[case] expected: bool) {
        let options = ConvertOptions::default().with_interval(interval);
        assert_eq!(options.differences_volume(), expected);
    }

    #[test]
    fn test_target_timezone() {
        assert_eq!(ConvertOptions::default().target_timezone(), Some(IST_TIMEZONE));
        assert_eq!(ConvertOptions::default().without_timezone().target_timezone(), None);
        assert_eq!(ConvertOptions::default().with_timezone("").target_timezone(), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ConvertOptions = serde_json::from_str(r#"{"interval": "3m"}"#).unwrap();
        assert_eq!(options.interval, "3m");
        assert!(options.paise_to_rupee);
        assert_eq!(options.target_timezone(), Some(IST_TIMEZONE));
    }
}
