/// 配置管理模組
///
/// 本模組負責從 TOML 檔案與 `NUBRA__*` 環境變數載入並驗證函式庫設定：
/// 轉換選項、預設指標參數與日誌格式。
// 宣告子模組
pub mod loader;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigLoader, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use types::*;
pub use validation::{ValidationError, ValidationUtils, Validator};
