// 集成测试公共模块
//
// 提供可记录调用的假适配器和临时存储环境

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use transync::translation::{
    RetryPolicy, SyncOptions, TranslatedItem, TranslationAdapter, TranslationError,
    TranslationResult, TranslationStore,
};

/// 一次适配器调用
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub source_lang: String,
    pub target_lang: String,
    /// 本次请求的原文（已排序）
    pub texts: Vec<String>,
}

/// 可编程的假适配器
///
/// 按 `(语言, 原文)` 查字典，未登记的原文返回 `<lang>:<原文>`。
/// 可以让某个语言的每次调用都失败，或只返回部分条目。
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    dictionary: BTreeMap<(String, String), String>,
    failures: BTreeMap<String, TranslationError>,
    omitted: BTreeSet<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, lang: &str, text: &str, translated: &str) -> Self {
        self.dictionary
            .insert((lang.to_string(), text.to_string()), translated.to_string());
        self
    }

    /// 该语言的每次调用都返回给定错误
    pub fn failing_for(mut self, lang: &str, error: TranslationError) -> Self {
        self.failures.insert(lang.to_string(), error);
        self
    }

    /// 不返回该原文的译文
    pub fn omitting(mut self, text: &str) -> Self {
        self.omitted.insert(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, lang: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.target_lang == lang)
            .collect()
    }
}

impl TranslationAdapter for RecordingAdapter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn translate_batch(
        &self,
        texts: &BTreeMap<String, String>,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<TranslatedItem>> {
        let mut requested: Vec<String> = texts.values().cloned().collect();
        requested.sort();
        self.calls.lock().unwrap().push(RecordedCall {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            texts: requested,
        });

        if let Some(error) = self.failures.get(target_lang) {
            return Err(error.clone());
        }

        Ok(texts
            .iter()
            .filter(|(_, text)| !self.omitted.contains(*text))
            .map(|(key, text)| {
                let translated = self
                    .dictionary
                    .get(&(target_lang.to_string(), text.clone()))
                    .cloned()
                    .unwrap_or_else(|| format!("{}:{}", target_lang, text));
                TranslatedItem::new(key, translated)
            })
            .collect())
    }
}

/// 带临时目录的测试环境
pub struct TestEnvironment {
    pub dir: TempDir,
    pub store_path: PathBuf,
}

impl Default for TestEnvironment {
    fn default() -> Self {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("i18n").join("translations.json");
        Self { dir, store_path }
    }
}

impl TestEnvironment {
    /// 重试间隔很短的同步选项
    pub fn options(&self, langs: &[&str]) -> SyncOptions {
        let mut options = SyncOptions::new(&self.store_path, "en", langs);
        options.retry = fast_retry();
        options
    }

    pub async fn load_store(&self) -> TranslationStore {
        TranslationStore::load(&self.store_path).await
    }

    pub fn export_dir(&self) -> PathBuf {
        self.dir.path().join("locales")
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        multiplier: 2,
        attempt_timeout: None,
    }
}

pub fn strings(texts: &[&str]) -> BTreeSet<String> {
    texts.iter().map(|text| text.to_string()).collect()
}

/// 常用的 es/fr 字典
pub fn greeting_adapter() -> RecordingAdapter {
    RecordingAdapter::new()
        .with_translation("es", "Hello", "Hola")
        .with_translation("es", "Goodbye", "Adiós")
        .with_translation("es", "Thanks", "Gracias")
        .with_translation("fr", "Hello", "Bonjour")
        .with_translation("fr", "Goodbye", "Au revoir")
        .with_translation("fr", "Thanks", "Merci")
}
