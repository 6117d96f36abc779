use serde::{Deserialize, Serialize};

use crate::config::validation::{ValidationError, ValidationUtils, Validator};
use crate::convert::ConvertOptions;
use crate::indicators::{IndicatorParams, IndicatorSpec};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// 函式庫設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub convert: ConvertOptions,
    pub indicators: IndicatorConfig,
    pub log: LogConfig,
}

impl Settings {
    /// 回應轉換選項
    pub fn convert_options(&self) -> ConvertOptions {
        self.convert.clone()
    }
}

impl Validator for Settings {
    fn validate(&self) -> Result<(), ValidationError> {
        self.convert.validate()?;
        self.indicators.validate()?;
        self.log.validate()?;

        Ok(())
    }
}

impl Validator for ConvertOptions {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(tz) = self.target_timezone() {
            ValidationUtils::time_zone(tz, "convert.timezone")?;
        }
        ValidationUtils::not_empty(&self.interval, "convert.interval")?;

        Ok(())
    }
}

/// 指標設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// 套用於每個指標的預設參數
    pub defaults: IndicatorParams,
    /// 預設要附加的指標
    pub funcs: Option<IndicatorSpec>,
}

impl IndicatorConfig {
    /// 設定的指標清單，未設定時為空
    pub fn spec(&self) -> IndicatorSpec {
        self.funcs.clone().unwrap_or_default()
    }
}

impl Validator for IndicatorConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (name, _) in self.spec().into_entries() {
            ValidationUtils::not_empty(&name, "indicators.funcs")?;
        }

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LogConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證日誌級別
        ValidationUtils::one_of(&self.level, &LOG_LEVELS, "log.level")?;

        // 驗證日誌格式
        ValidationUtils::one_of(&self.format, &LOG_FORMATS, "log.format")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.convert_options(), ConvertOptions::default());
        assert!(settings.indicators.spec().is_empty());
        assert!(!settings.log.is_json());
    }

    #[test]
    fn test_invalid_sections() {
        let mut settings = Settings::default();
        settings.log.format = "xml".to_string();
        assert_matches!(settings.validate(), Err(ValidationError::InvalidValue(_)));

        let mut settings = Settings::default();
        settings.convert.timezone = Some("Nowhere/City".to_string());
        assert_matches!(settings.validate(), Err(ValidationError::InvalidValue(_)));

        let mut settings = Settings::default();
        settings.convert.interval = String::new();
        assert_matches!(settings.validate(), Err(ValidationError::MissingField(_)));
    }

    #[test]
    fn test_empty_timezone_is_allowed() {
        let mut settings = Settings::default();
        settings.convert.timezone = Some(String::new());
        assert!(settings.validate().is_ok());
    }
}
