//! 日誌系統初始化

use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LogConfig;
use crate::error::{NubraError, Result};

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // 默認為INFO
    }
}

/// `RUST_LOG` 優先，未設定時使用配置的級別
fn env_filter(log_config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_level(&log_config.level).as_str().to_lowercase()))
}

/// 安裝全域 tracing 訂閱者
///
/// 已有全域訂閱者時返回 [`NubraError::Logging`]。
pub fn init_logging(log_config: &LogConfig) -> Result<()> {
    let builder = FmtSubscriber::builder().with_env_filter(env_filter(log_config));

    let installed = if log_config.is_json() {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| NubraError::Logging(format!("設置日誌系統失敗: {}", e)))?;

    info!(level = %log_config.level, format = %log_config.format, "日誌系統初始化完成");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default();
        let _ = init_logging(&config);
        assert_matches!(init_logging(&config), Err(NubraError::Logging(_)));
    }
}
