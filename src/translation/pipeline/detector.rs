//! 变更检测
//!
//! 将当前源字符串集合与存储对比，划分为新增、变更、未变更三类，
//! 并找出存储中已不再使用的过期记录。纯函数，无副作用。

use std::collections::BTreeSet;

use crate::translation::storage::{ContentHash, TranslationStore};

/// 一次同步计算出的变更集（不持久化）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// 存储中没有记录的字符串
    pub new_strings: Vec<String>,
    /// 哈希命中但原文不同的字符串（哈希碰撞），需要重新翻译
    pub changed_strings: Vec<String>,
    /// 哈希命中且原文一致的字符串
    pub unchanged_strings: Vec<String>,
    /// 原文已不在当前集合中的记录
    pub stale_hashes: Vec<ContentHash>,
}

impl ChangeSet {
    /// 对所有语言都需要翻译的字符串（新增 ∪ 变更）
    pub fn texts_needing_work(&self) -> impl Iterator<Item = &String> {
        self.new_strings.iter().chain(self.changed_strings.iter())
    }

    /// 当前字符串总数
    pub fn total(&self) -> usize {
        self.new_strings.len() + self.changed_strings.len() + self.unchanged_strings.len()
    }

    pub fn has_content_changes(&self) -> bool {
        !self.new_strings.is_empty() || !self.changed_strings.is_empty()
    }

    /// 简要描述，用于日志
    pub fn summary(&self) -> String {
        format!(
            "新增 {}，变更 {}，未变更 {}，过期 {}",
            self.new_strings.len(),
            self.changed_strings.len(),
            self.unchanged_strings.len(),
            self.stale_hashes.len()
        )
    }
}

/// 计算变更集
pub fn detect(current: &BTreeSet<String>, store: &TranslationStore) -> ChangeSet {
    let mut change_set = ChangeSet::default();

    for text in current {
        let hash = ContentHash::of(text);
        match store.get(&hash) {
            None => change_set.new_strings.push(text.clone()),
            Some(record) if record.original_text != *text => {
                tracing::warn!("检测到哈希碰撞: {}，按变更处理", hash);
                change_set.changed_strings.push(text.clone());
            }
            Some(_) => change_set.unchanged_strings.push(text.clone()),
        }
    }

    change_set.stale_hashes = store
        .records()
        .filter(|record| !current.contains(&record.original_text))
        .map(|record| record.hash.clone())
        .collect();

    tracing::debug!("变更检测完成: {}", change_set.summary());
    change_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::storage::TextRecord;

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_store_everything_new() {
        let store = TranslationStore::new();
        let change_set = detect(&strings(&["Hello", "Goodbye"]), &store);

        assert_eq!(change_set.new_strings.len(), 2);
        assert!(change_set.changed_strings.is_empty());
        assert!(change_set.unchanged_strings.is_empty());
        assert!(change_set.stale_hashes.is_empty());
    }

    #[test]
    fn test_classification_partitions_current_set() {
        let mut store = TranslationStore::new();
        store.upsert(&ContentHash::of("Hello"), "Hello", "es", "Hola");
        store.upsert(&ContentHash::of("Goodbye"), "Goodbye", "es", "Adiós");

        let current = strings(&["Hello", "Thanks", "Welcome"]);
        let change_set = detect(&current, &store);

        assert_eq!(change_set.unchanged_strings, vec!["Hello".to_string()]);
        assert_eq!(
            change_set.new_strings,
            vec!["Thanks".to_string(), "Welcome".to_string()]
        );
        assert_eq!(change_set.total(), current.len());

        let mut union: Vec<String> = change_set
            .new_strings
            .iter()
            .chain(&change_set.changed_strings)
            .chain(&change_set.unchanged_strings)
            .cloned()
            .collect();
        union.sort();
        assert_eq!(union, current.into_iter().collect::<Vec<_>>());

        assert_eq!(change_set.stale_hashes, vec![ContentHash::of("Goodbye")]);
    }

    #[test]
    fn test_collision_is_classified_as_changed() {
        // 构造一个键为 "Hello" 的哈希、原文却不同的记录
        let mut record = TextRecord::new("Hello");
        record.original_text = "Something else".to_string();
        let mut store = TranslationStore::new();
        store.upsert(&record.hash, &record.original_text, "es", "Otra cosa");

        let change_set = detect(&strings(&["Hello"]), &store);
        assert_eq!(change_set.changed_strings, vec!["Hello".to_string()]);
        assert!(change_set.new_strings.is_empty());
        assert_eq!(change_set.stale_hashes, vec![ContentHash::of("Hello")]);
        assert!(change_set.has_content_changes());
    }

    #[test]
    fn test_texts_needing_work() {
        let change_set = ChangeSet {
            new_strings: vec!["a".into()],
            changed_strings: vec!["b".into()],
            unchanged_strings: vec!["c".into()],
            stale_hashes: vec![],
        };
        let work: Vec<&String> = change_set.texts_needing_work().collect();
        assert_eq!(work, vec!["a", "b"]);
    }
}
