//! 完整性检查
//!
//! 判断某个目标语言是否已为每个当前字符串记录了译文。

use std::collections::BTreeSet;

use crate::translation::storage::TranslationStore;

/// 单个语言的覆盖情况
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCoverage {
    pub lang: String,
    pub translated: usize,
    pub total: usize,
}

impl LanguageCoverage {
    pub fn is_complete(&self) -> bool {
        self.translated == self.total
    }

    pub fn missing(&self) -> usize {
        self.total - self.translated
    }

    /// 覆盖率百分比，空集合视为 100%
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.translated as f64 * 100.0 / self.total as f64
        }
    }
}

/// 当前字符串是否已有该语言的有效译文
///
/// 要求记录存在、原文一致且译文非空。
pub fn has_translation(store: &TranslationStore, text: &str, lang: &str) -> bool {
    store
        .get_by_text(text)
        .is_some_and(|record| record.has_translation(lang))
}

/// 语言是否完整
pub fn is_language_complete(
    current: &BTreeSet<String>,
    store: &TranslationStore,
    lang: &str,
) -> bool {
    current
        .iter()
        .all(|text| has_translation(store, text, lang))
}

/// 缺少该语言译文的字符串
pub fn missing_for_language<'a>(
    current: &'a BTreeSet<String>,
    store: &TranslationStore,
    lang: &str,
) -> Vec<&'a String> {
    current
        .iter()
        .filter(|text| !has_translation(store, text, lang))
        .collect()
}

/// 统计每个语言的覆盖情况
pub fn coverage(
    current: &BTreeSet<String>,
    store: &TranslationStore,
    langs: &[String],
) -> Vec<LanguageCoverage> {
    langs
        .iter()
        .map(|lang| LanguageCoverage {
            lang: lang.clone(),
            translated: current
                .iter()
                .filter(|text| has_translation(store, text, lang))
                .count(),
            total: current.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::storage::ContentHash;

    fn setup() -> (BTreeSet<String>, TranslationStore) {
        let current: BTreeSet<String> = ["Hello", "Goodbye"].iter().map(|s| s.to_string()).collect();
        let mut store = TranslationStore::new();
        store.upsert(&ContentHash::of("Hello"), "Hello", "es", "Hola");
        store.upsert(&ContentHash::of("Goodbye"), "Goodbye", "es", "Adiós");
        store.upsert(&ContentHash::of("Hello"), "Hello", "fr", "Bonjour");
        (current, store)
    }

    #[test]
    fn test_complete_language() {
        let (current, store) = setup();
        assert!(is_language_complete(&current, &store, "es"));
        assert!(!is_language_complete(&current, &store, "fr"));
    }

    #[test]
    fn test_new_language_is_incomplete() {
        let (current, store) = setup();
        assert!(!is_language_complete(&current, &store, "de"));
        assert_eq!(missing_for_language(&current, &store, "de").len(), 2);
    }

    #[test]
    fn test_new_string_makes_language_incomplete() {
        let (mut current, store) = setup();
        current.insert("Thanks".to_string());
        assert!(!is_language_complete(&current, &store, "es"));
        assert_eq!(missing_for_language(&current, &store, "es"), vec!["Thanks"]);
    }

    #[test]
    fn test_empty_set_is_complete() {
        let store = TranslationStore::new();
        assert!(is_language_complete(&BTreeSet::new(), &store, "es"));
    }

    #[test]
    fn test_coverage() {
        let (current, store) = setup();
        let report = coverage(&current, &store, &["es".to_string(), "fr".to_string()]);

        assert_eq!(report[0].translated, 2);
        assert!(report[0].is_complete());
        assert_eq!(report[1].translated, 1);
        assert_eq!(report[1].missing(), 1);
        assert!((report[1].percent() - 50.0).abs() < f64::EPSILON);
    }
}
