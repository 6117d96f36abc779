//! 指標參數與指標清單

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 單一參數值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// 以浮點數讀取；整數會轉型
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Str(_) => None,
        }
    }

    /// 以整數讀取；小數部分為零的浮點數也接受
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// 指標參數集合（參數名 → 值）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorParams(BTreeMap<String, ParamValue>);

impl IndicatorParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器風格加入參數
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// 以 `self` 覆蓋 `base`：衝突時 `self` 的值優先
    pub fn overlaid_on(&self, base: &IndicatorParams) -> IndicatorParams {
        let mut merged = base.clone();
        merged.0.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for IndicatorParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for IndicatorParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// 要附加的指標清單
///
/// 可以是純名稱列表，或名稱 → 參數的有序映射；兩者都保留宣告順序。
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSpec {
    Names(Vec<String>),
    Params(Vec<(String, IndicatorParams)>),
}

impl Default for IndicatorSpec {
    fn default() -> Self {
        IndicatorSpec::Names(Vec::new())
    }
}

impl IndicatorSpec {
    pub fn is_empty(&self) -> bool {
        match self {
            IndicatorSpec::Names(names) => names.is_empty(),
            IndicatorSpec::Params(entries) => entries.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndicatorSpec::Names(names) => names.len(),
            IndicatorSpec::Params(entries) => entries.len(),
        }
    }

    /// 加入一個帶參數的指標，純名稱列表會先轉為映射形式
    pub fn with(self, name: impl Into<String>, params: IndicatorParams) -> Self {
        let mut entries = self.into_entries();
        entries.push((name.into(), params));
        IndicatorSpec::Params(entries)
    }

    /// 展開為 (名稱, 參數) 列表；純名稱對應空參數
    pub fn into_entries(self) -> Vec<(String, IndicatorParams)> {
        match self {
            IndicatorSpec::Names(names) => names
                .into_iter()
                .map(|name| (name, IndicatorParams::new()))
                .collect(),
            IndicatorSpec::Params(entries) => entries,
        }
    }
}

impl From<Vec<String>> for IndicatorSpec {
    fn from(names: Vec<String>) -> Self {
        IndicatorSpec::Names(names)
    }
}

impl From<Vec<&str>> for IndicatorSpec {
    fn from(names: Vec<&str>) -> Self {
        IndicatorSpec::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for IndicatorSpec {
    fn from(names: &[&str]) -> Self {
        IndicatorSpec::Names(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for IndicatorSpec {
    fn from(names: [&str; N]) -> Self {
        IndicatorSpec::Names(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<S: Into<String>> From<Vec<(S, IndicatorParams)>> for IndicatorSpec {
    fn from(entries: Vec<(S, IndicatorParams)>) -> Self {
        IndicatorSpec::Params(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[(S, IndicatorParams); N]> for IndicatorSpec {
    fn from(entries: [(S, IndicatorParams); N]) -> Self {
        IndicatorSpec::Params(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<&IndicatorSpec> for IndicatorSpec {
    fn from(spec: &IndicatorSpec) -> Self {
        spec.clone()
    }
}

impl From<Option<IndicatorSpec>> for IndicatorSpec {
    fn from(spec: Option<IndicatorSpec>) -> Self {
        spec.unwrap_or_default()
    }
}

impl Serialize for IndicatorSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndicatorSpec::Names(names) => {
                let mut seq = serializer.serialize_seq(Some(names.len()))?;
                for name in names {
                    seq.serialize_element(name)?;
                }
                seq.end()
            }
            IndicatorSpec::Params(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, params) in entries {
                    map.serialize_entry(name, params)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for IndicatorSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SpecVisitor)
    }
}

struct SpecVisitor;

impl<'de> Visitor<'de> for SpecVisitor {
    type Value = IndicatorSpec;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("指標名稱列表或 名稱 → 參數 的映射")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(IndicatorSpec::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(IndicatorSpec::default())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut names = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(name) = seq.next_element::<String>()? {
            names.push(name);
        }
        Ok(IndicatorSpec::Names(names))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, params)) = map.next_entry::<String, Option<IndicatorParams>>()? {
            entries.push((name, params.unwrap_or_default()));
        }
        Ok(IndicatorSpec::Params(entries))
    }
}
