// utils.rs - 公共工具模組
//
// 提供時間戳轉換與寬鬆反序列化等通用輔助函數。

pub mod serde_helpers;
pub mod time_utils;

// 重新導出時間工具函數，使其可以通過 utils::function_name 直接訪問
pub use time_utils::{parse_timestamp_str, unit_to_ns_factor, validate_time_zone};
