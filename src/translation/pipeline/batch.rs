//! 带键批次
//!
//! 每个待翻译字符串分配一个由内容哈希派生的短键，适配器调用是
//! `键 -> 原文` 的映射而不是裸数组。这样超长字符串不会受后端键长度
//! 限制，后端也可以按键缓存。

use std::collections::BTreeMap;

use crate::translation::storage::ContentHash;

/// 默认短键长度（十六进制字符）
pub const DEFAULT_KEY_LEN: usize = 12;

/// 批次中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub hash: ContentHash,
    pub text: String,
}

/// 某个目标语言的带键批次
#[derive(Debug, Clone, Default)]
pub struct KeyedBatch {
    entries: BTreeMap<String, BatchEntry>,
}

impl KeyedBatch {
    /// 从工作集构建批次
    ///
    /// 短键取哈希前缀，批次内前缀冲突时逐步加长；完整哈希也相同时追加序号。
    pub fn build<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();

        for text in texts {
            let text = text.as_ref();
            let hash = ContentHash::of(text);
            let key = Self::unique_key(&entries, &hash);
            entries.insert(
                key,
                BatchEntry {
                    hash,
                    text: text.to_string(),
                },
            );
        }

        Self { entries }
    }

    fn unique_key(entries: &BTreeMap<String, BatchEntry>, hash: &ContentHash) -> String {
        let full_len = hash.as_str().len();
        let mut len = DEFAULT_KEY_LEN.min(full_len);

        loop {
            let candidate = hash.prefix(len);
            if !entries.contains_key(candidate) {
                return candidate.to_string();
            }
            if len >= full_len {
                break;
            }
            len = (len + 4).min(full_len);
        }

        (1..)
            .map(|n| format!("{}-{}", hash, n))
            .find(|candidate| !entries.contains_key(candidate))
            .unwrap_or_else(|| hash.to_string())
    }

    /// 适配器请求体: `键 -> 原文`
    pub fn texts(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.text.clone()))
            .collect()
    }

    /// 根据键还原原文与哈希
    pub fn resolve(&self, key: &str) -> Option<&BatchEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 批次字符总数
    pub fn total_chars(&self) -> usize {
        self.entries.values().map(|entry| entry.text.chars().count()).sum()
    }
}
