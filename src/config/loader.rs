use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::types::Settings;
use crate::config::validation::Validator;
use crate::error::Result;

/// 環境變數前綴，例如 `NUBRA__LOG__LEVEL`
pub const ENV_PREFIX: &str = "NUBRA";

/// 指定設定檔路徑的環境變數
pub const CONFIG_PATH_ENV: &str = "NUBRA_CONFIG";

/// 未指定路徑時嘗試讀取的設定檔
pub const DEFAULT_CONFIG_FILE: &str = "nubra.toml";

/// 配置加載器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 從指定檔案載入配置，環境變數覆蓋檔案內容
    pub fn from_file(path: impl AsRef<Path>) -> Result<Settings> {
        Self::load(path.as_ref(), true)
    }

    /// 載入當前環境的配置
    ///
    /// 讀取 `NUBRA_CONFIG` 指定的檔案；未設定時嘗試 `nubra.toml`，
    /// 檔案不存在則全部使用預設值。
    pub fn load_current() -> Result<Settings> {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(&PathBuf::from(path), true),
            _ => Self::load(Path::new(DEFAULT_CONFIG_FILE), false),
        }
    }

    fn load(path: &Path, required: bool) -> Result<Settings> {
        debug!(path = %path.display(), required, "載入配置");

        let config = Config::builder()
            .add_source(File::from(path).required(required))
            // 從環境變數加載配置（優先級高於文件配置）
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
