//! 抽象指標註冊表
//!
//! 註冊表以名稱（不分大小寫）查詢指標描述；描述可對表格呼叫並返回
//! 三種輸出形狀之一。

use polars::prelude::{DataFrame, Series};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::params::IndicatorParams;
use crate::error::{NubraError, Result};

/// 指標的靜態描述
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorInfo {
    /// 正式名稱（大寫），例如 "RSI"
    pub name: String,
    /// 所屬功能群組，例如 "Momentum Indicators"
    pub group: String,
    pub display_name: String,
    /// 需要的輸入欄位；"price" 代表可由 `price` 參數指定的單一價格欄位
    pub inputs: Vec<String>,
    /// 參數預設值
    pub parameters: IndicatorParams,
    /// 輸出標籤
    pub outputs: Vec<String>,
}

/// 指標輸出形狀
#[derive(Debug, Clone)]
pub enum IndicatorOutput {
    /// 單一具名序列
    Single(Series),
    /// 多個具名子輸出，依輸出順序排列
    Named(Vec<(String, Series)>),
    /// 多個無名序列，依位置編號
    Unnamed(Vec<Series>),
}

/// 可被呼叫的抽象指標
pub trait AbstractIndicator: Send + Sync {
    fn info(&self) -> &IndicatorInfo;

    /// 對表格計算指標；`params` 已合併預設值與個別參數
    fn call(&self, frame: &DataFrame, params: &IndicatorParams) -> Result<IndicatorOutput>;
}

/// 抽象指標註冊表
pub trait IndicatorRegistry: Send + Sync {
    /// 以名稱查詢指標，不分大小寫
    fn lookup(&self, name: &str) -> Option<Arc<dyn AbstractIndicator>>;

    /// 功能群組目錄：群組名 → 成員指標名
    fn function_groups(&self) -> Vec<(String, Vec<String>)>;

    /// 查詢指標，找不到時返回查詢錯誤
    fn function(&self, name: &str) -> Result<Arc<dyn AbstractIndicator>> {
        self.lookup(name)
            .ok_or_else(|| NubraError::UnknownIndicator(name.to_string()))
    }
}

/// 以 HashMap 實作的註冊表，可加入自訂指標
#[derive(Clone, Default)]
pub struct AbstractRegistry {
    functions: HashMap<String, Arc<dyn AbstractIndicator>>,
    groups: Vec<(String, Vec<String>)>,
}

impl AbstractRegistry {
    /// 建立空的註冊表
    pub fn new() -> Self {
        Self::default()
    }

    /// 內建指標集合
    #[cfg(feature = "abstract")]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for indicator in super::builtin::catalog() {
            registry.register(indicator);
        }
        registry
    }

    /// 註冊指標；同名指標會被取代並返回舊的
    pub fn register(
        &mut self,
        indicator: Arc<dyn AbstractIndicator>,
    ) -> Option<Arc<dyn AbstractIndicator>> {
        let info = indicator.info();
        let key = info.name.to_uppercase();
        let group = info.group.clone();

        // 換群組時先從原群組移除，空群組一併刪除
        for (name, members) in self.groups.iter_mut() {
            if *name != group {
                members.retain(|member| *member != key);
            }
        }
        self.groups.retain(|(_, members)| !members.is_empty());

        match self.groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, members)) => {
                if !members.contains(&key) {
                    members.push(key.clone());
                }
            }
            None => self.groups.push((group, vec![key.clone()])),
        }

        self.functions.insert(key, indicator)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// 依字母排序的指標名稱
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl IndicatorRegistry for AbstractRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn AbstractIndicator>> {
        self.functions.get(&name.to_uppercase()).cloned()
    }

    fn function_groups(&self) -> Vec<(String, Vec<String>)> {
        self.groups.clone()
    }
}

impl fmt::Debug for AbstractRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbstractRegistry")
            .field("functions", &self.names())
            .field("groups", &self.groups.iter().map(|(g, _)| g).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(feature = "abstract")]
static BUILTIN_REGISTRY: once_cell::sync::Lazy<Arc<AbstractRegistry>> =
    once_cell::sync::Lazy::new(|| Arc::new(AbstractRegistry::builtin()));

/// 預設的抽象指標註冊表；未啟用 `abstract` 功能時為 None
pub fn abstract_registry() -> Option<Arc<dyn IndicatorRegistry>> {
    #[cfg(feature = "abstract")]
    {
        let registry: Arc<dyn IndicatorRegistry> = BUILTIN_REGISTRY.clone();
        Some(registry)
    }
    #[cfg(not(feature = "abstract"))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::NamedFrom;

    struct Constant {
        info: IndicatorInfo,
    }

    impl Constant {
        fn new(name: &str, group: &str) -> Arc<dyn AbstractIndicator> {
            Arc::new(Self {
                info: IndicatorInfo {
                    name: name.to_string(),
                    group: group.to_string(),
                    display_name: name.to_string(),
                    inputs: vec![],
                    parameters: IndicatorParams::new(),
                    outputs: vec!["value".to_string()],
                },
            })
        }
    }

    impl AbstractIndicator for Constant {
        fn info(&self) -> &IndicatorInfo {
            &self.info
        }

        fn call(&self, frame: &DataFrame, _params: &IndicatorParams) -> Result<IndicatorOutput> {
            Ok(IndicatorOutput::Single(Series::new(
                "value".into(),
                vec![1.0; frame.height()],
            )))
        }
    }

    #[test]
    fn test_register_and_lookup_case_insensitive() {
        let mut registry = AbstractRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Constant::new("One", "Custom")).is_none());
        registry.register(Constant::new("TWO", "Custom"));
        registry.register(Constant::new("three", "Other"));

        assert_eq!(registry.len(), 3);
        assert!(registry.lookup("one").is_some());
        assert!(registry.lookup("ONE").is_some());
        assert!(registry.lookup("four").is_none());
        assert!(matches!(
            registry.function("four"),
            Err(NubraError::UnknownIndicator(n)) if n == "four"
        ));

        let groups = registry.function_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("Custom".to_string(), vec!["ONE".to_string(), "TWO".to_string()]));
        assert_eq!(groups[1].1, vec!["THREE".to_string()]);
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = AbstractRegistry::new();
        registry.register(Constant::new("X", "G"));
        assert!(registry.register(Constant::new("x", "G")).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.function_groups()[0].1, vec!["X".to_string()]);
    }

    #[test]
    fn test_reregister_moves_group() {
        let mut registry = AbstractRegistry::new();
        registry.register(Constant::new("X", "A"));
        registry.register(Constant::new("Y", "A"));
        registry.register(Constant::new("Z", "B"));

        registry.register(Constant::new("x", "B"));
        assert_eq!(
            registry.function_groups(),
            vec![
                ("A".to_string(), vec!["Y".to_string()]),
                ("B".to_string(), vec!["Z".to_string(), "X".to_string()]),
            ]
        );

        // 群組清空後不再出現
        registry.register(Constant::new("y", "C"));
        let names: Vec<String> = registry.function_groups().into_iter().map(|(g, _)| g).collect();
        assert_eq!(names, ["B", "C"]);
        assert_eq!(registry.lookup("X").unwrap().info().group, "B");
    }

    #[cfg(feature = "abstract")]
    #[test]
    fn test_default_registry_available() {
        let registry = abstract_registry().expect("內建註冊表應可用");
        assert!(registry.lookup("RSI").is_some());
        let groups: Vec<String> = registry.function_groups().into_iter().map(|(g, _)| g).collect();
        assert!(groups.contains(&"Momentum Indicators".to_string()));
    }

    #[cfg(not(feature = "abstract"))]
    #[test]
    fn test_default_registry_unavailable() {
        assert!(abstract_registry().is_none());
    }
}
