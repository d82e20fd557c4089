//! # Parameter Mapping Module / 参数映射模块
//!
//! Every stage of the matrix is parameterised by an ordered `name -> value`
//! mapping of plain strings. Insertion order is part of the value: it decides
//! the order of `-D` flags on the configure line and the line order of a
//! written `parameter.ini`.
//!
//! 矩阵的每个阶段都由一个有序的 `名称 -> 值` 字符串映射参数化。
//! 插入顺序是值的一部分：它决定配置命令行中 `-D` 参数的顺序以及写出的 `parameter.ini` 的行顺序。

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// An ordered mapping from parameter name to textual value with unique keys.
/// 从参数名到文本值的有序映射，键唯一。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMapping {
    entries: Vec<(String, String)>,
}

impl ParameterMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value. An existing key keeps its position and gets the new value.
    /// 插入一个值。已存在的键保持其位置并获得新值。
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key and returns its value, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if every key/value pair of `self` is also present in `other`.
    /// The empty mapping is a subset of every mapping.
    ///
    /// 如果 `self` 的每个键值对也存在于 `other` 中，则返回 `true`。
    /// 空映射是任何映射的子集。
    pub fn is_subset_of(&self, other: &ParameterMapping) -> bool {
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = ParameterMapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// Renders as `key: value,key: value`, the form used in stage listings.
impl fmt::Display for ParameterMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}: {}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ParameterMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
