//! 錯誤類型定義

use crate::config::ValidationError;
use thiserror::Error;

/// 指標函式庫安裝錯誤時的補救提示
pub const REGISTRY_UNAVAILABLE_HINT: &str = "抽象指標註冊表不可用。這通常代表安裝了錯誤的指標函式庫版本；\
     請以預設的 `abstract` 功能重新編譯 nubra_talib，或透過 IndicatorAnnotator 明確提供註冊表。";

/// 函式庫錯誤類型
#[derive(Error, Debug)]
pub enum NubraError {
    #[error("指標註冊表設定錯誤: {0}")]
    Configuration(String),

    #[error("找不到指標: {0}")]
    UnknownIndicator(String),

    #[error("無效的指標參數: 指標 {indicator}, 參數 {param}, 原因: {reason}")]
    InvalidParameter {
        indicator: String,
        param: String,
        reason: String,
    },

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("無效的時區: {0}")]
    InvalidTimeZone(String),

    #[error("Polars 錯誤: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON 解析錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置載入錯誤: {0}")]
    Config(#[from] config::ConfigError),

    #[error("配置驗證錯誤: {0}")]
    Validation(#[from] ValidationError),

    #[error("日誌系統初始化失敗: {0}")]
    Logging(String),
}

impl NubraError {
    /// 註冊表不可用時的標準錯誤
    pub fn registry_unavailable() -> Self {
        NubraError::Configuration(REGISTRY_UNAVAILABLE_HINT.to_string())
    }

    pub(crate) fn invalid_parameter(
        indicator: &str,
        param: &str,
        reason: impl Into<String>,
    ) -> Self {
        NubraError::InvalidParameter {
            indicator: indicator.to_string(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }
}

/// 函式庫結果類型
pub type Result<T> = std::result::Result<T, NubraError>;
