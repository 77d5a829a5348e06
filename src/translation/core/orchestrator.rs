//! 同步编排器
//!
//! 增量翻译的核心算法。一次同步过程：
//!
//! 1. 加载存储
//! 2. 计算变更集
//! 3. 新增与变更的字符串对所有语言都需要翻译
//! 4. 对每个目标语言独立计算工作集，构建带键批次，按重试策略调用适配器，
//!    成功后将结果合并回存储；某个语言失败只记录并继续下一个语言
//! 5. 删除过期记录
//! 6. 原子保存存储（唯一的持久化检查点）
//! 7. 可选地写出每个语言的导出文件
//!
//! 网络调用可以跨语言并发，但所有合并都在单个顺序循环中完成，
//! 不会交错修改存储。在第6步之前丢弃同步 future 不会留下任何部分写入。

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};

use super::adapter::{TranslatedItem, TranslationAdapter};
use super::retry::RetryPolicy;
use crate::translation::config::SyncConfig;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::pipeline::{
    coverage, detect, missing_for_language, ChangeSet, KeyedBatch, LanguageCoverage,
};
use crate::translation::storage::{write_exports, TranslationStore};

/// 同步选项
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub store_path: PathBuf,
    pub source_lang: String,
    pub target_langs: Vec<String>,
    pub export_dir: Option<PathBuf>,
    pub retry: RetryPolicy,
    /// 同时进行网络调用的语言数
    pub max_concurrent_languages: usize,
}

impl SyncOptions {
    pub fn new(store_path: impl Into<PathBuf>, source_lang: &str, target_langs: &[&str]) -> Self {
        Self {
            store_path: store_path.into(),
            source_lang: source_lang.to_string(),
            target_langs: target_langs.iter().map(|lang| lang.to_string()).collect(),
            export_dir: None,
            retry: RetryPolicy::default(),
            max_concurrent_languages: 1,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            store_path: config.store_path(),
            source_lang: config.source_lang.clone(),
            target_langs: config.target_langs.clone(),
            export_dir: config.export_dir(),
            retry: config.retry_policy(),
            max_concurrent_languages: config.max_concurrent_languages.max(1),
        }
    }
}

/// 单个语言的处理结果
#[derive(Debug, Clone)]
pub enum LanguageStatus {
    /// 所有字符串已有译文，没有网络调用
    UpToDate,
    /// 已翻译并合并
    Translated {
        requested: usize,
        merged: usize,
        /// 适配器未返回（或返回空译文）的条目数，下次同步会再次请求
        missing: usize,
    },
    /// 重试耗尽或被拒绝，本语言本次跳过
    Failed { error: TranslationError },
}

#[derive(Debug, Clone)]
pub struct LanguageOutcome {
    pub lang: String,
    pub status: LanguageStatus,
}

impl LanguageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, LanguageStatus::Failed { .. })
    }
}

/// 进度观察者
///
/// 在每个语言开始网络调用时以及处理完成后调用。任意
/// `Fn(&LanguageOutcome)` 闭包都可以作为观察者。
pub trait SyncObserver: Send + Sync {
    fn on_language_start(&self, _lang: &str, _work: usize) {}

    fn on_language_complete(&self, outcome: &LanguageOutcome);
}

impl<F> SyncObserver for F
where
    F: Fn(&LanguageOutcome) + Send + Sync,
{
    fn on_language_complete(&self, outcome: &LanguageOutcome) {
        self(outcome)
    }
}

/// 同步报告
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub new_strings: usize,
    pub changed_strings: usize,
    pub unchanged_strings: usize,
    pub languages: Vec<LanguageOutcome>,
    /// 删除的过期记录数
    pub deleted: usize,
    /// 保存后存储中的记录数
    pub records: usize,
    pub exported: Vec<PathBuf>,
    /// 导出失败不影响已保存的存储
    pub export_error: Option<TranslationError>,
}

impl SyncReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &LanguageOutcome> {
        self.languages.iter().filter(|outcome| !outcome.is_failed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &LanguageOutcome> {
        self.languages.iter().filter(|outcome| outcome.is_failed())
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed().next().is_none() && self.export_error.is_none()
    }

    pub fn outcome(&self, lang: &str) -> Option<&LanguageOutcome> {
        self.languages.iter().find(|outcome| outcome.lang == lang)
    }
}

/// 同步计划（不调用适配器、不写入）
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub change_set: ChangeSet,
    /// 每个目标语言的工作集大小
    pub work: Vec<(String, usize)>,
    pub coverage: Vec<LanguageCoverage>,
}

impl SyncPlan {
    pub fn is_noop(&self) -> bool {
        self.change_set.stale_hashes.is_empty() && self.work.iter().all(|(_, n)| *n == 0)
    }
}

/// 同步编排器
pub struct SyncOrchestrator<A> {
    adapter: A,
    options: SyncOptions,
    observer: Option<Box<dyn SyncObserver>>,
}

impl<A: TranslationAdapter> SyncOrchestrator<A> {
    pub fn new(adapter: A, options: SyncOptions) -> Self {
        Self {
            adapter,
            options,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl SyncObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// 计算某语言的工作集: 需要翻译的文本 ∪ 缺少该语言译文的文本
    fn work_set<'a>(
        current: &'a BTreeSet<String>,
        change_set: &'a ChangeSet,
        store: &TranslationStore,
        lang: &str,
    ) -> BTreeSet<&'a String> {
        change_set
            .texts_needing_work()
            .chain(missing_for_language(current, store, lang))
            .collect()
    }

    /// 生成同步计划
    pub async fn plan(&self, current: &BTreeSet<String>) -> SyncPlan {
        let store = TranslationStore::load(&self.options.store_path).await;
        let change_set = detect(current, &store);
        let work = self
            .options
            .target_langs
            .iter()
            .map(|lang| {
                let n = Self::work_set(current, &change_set, &store, lang).len();
                (lang.clone(), n)
            })
            .collect();
        let coverage = coverage(current, &store, &self.options.target_langs);

        SyncPlan {
            change_set,
            work,
            coverage,
        }
    }

    /// 执行一次完整的同步过程
    ///
    /// 只有存储保存失败会返回错误；单个语言的失败记录在报告中。
    pub async fn sync(&self, current: &BTreeSet<String>) -> TranslationResult<SyncReport> {
        let path = &self.options.store_path;
        let mut store = TranslationStore::load(path).await;
        tracing::debug!("同步开始: {} 个源字符串，存储 {} 条记录", current.len(), store.len());

        let change_set = detect(current, &store);
        tracing::info!("变更检测: {}", change_set.summary());

        let mut report = SyncReport {
            new_strings: change_set.new_strings.len(),
            changed_strings: change_set.changed_strings.len(),
            unchanged_strings: change_set.unchanged_strings.len(),
            ..SyncReport::default()
        };

        // 基于加载时的快照为每个语言构建批次，语言之间互不依赖
        let mut jobs = Vec::new();
        for lang in &self.options.target_langs {
            let work = Self::work_set(current, &change_set, &store, lang);
            if work.is_empty() {
                tracing::debug!("语言 {} 已完整，跳过", lang);
                let outcome = LanguageOutcome {
                    lang: lang.clone(),
                    status: LanguageStatus::UpToDate,
                };
                self.notify_complete(&outcome);
                report.languages.push(outcome);
                continue;
            }
            jobs.push((lang.clone(), KeyedBatch::build(work)));
        }

        let concurrency = self.options.max_concurrent_languages.max(1);
        let mut results = stream::iter(jobs.iter())
            .map(|(lang, batch)| async move {
                if let Some(observer) = &self.observer {
                    observer.on_language_start(lang, batch.len());
                }
                let result = self.translate_language(lang, batch).await;
                (lang, batch, result)
            })
            .buffered(concurrency);

        // 合并在这里顺序进行
        while let Some((lang, batch, result)) = results.next().await {
            let status = match result {
                Ok(items) => {
                    let (merged, missing) = merge_results(&mut store, lang, batch, items);
                    tracing::info!("语言 {}: 请求 {} 条，合并 {} 条", lang, batch.len(), merged);
                    LanguageStatus::Translated {
                        requested: batch.len(),
                        merged,
                        missing,
                    }
                }
                Err(error) => {
                    let error = error.for_language(lang);
                    helpers::log_error(&error);
                    LanguageStatus::Failed { error }
                }
            };

            let outcome = LanguageOutcome {
                lang: lang.clone(),
                status,
            };
            self.notify_complete(&outcome);
            report.languages.push(outcome);
        }

        report.languages.sort_by_key(|outcome| {
            self.options
                .target_langs
                .iter()
                .position(|lang| *lang == outcome.lang)
        });

        report.deleted = remove_stale(&mut store, current, &change_set);

        if let Err(error) = store.save(path).await {
            helpers::log_error(&error);
            return Err(error);
        }
        report.records = store.len();

        if let Some(dir) = &self.options.export_dir {
            match write_exports(&store, &self.options.target_langs, dir).await {
                Ok(paths) => report.exported = paths,
                Err(error) => {
                    tracing::warn!("导出失败: {}", error);
                    report.export_error = Some(error);
                }
            }
        }

        tracing::info!(
            "同步完成: {} 个语言成功，{} 个失败，删除 {} 条过期记录",
            report.succeeded().count(),
            report.failed().count(),
            report.deleted
        );
        Ok(report)
    }

    /// 只清理过期记录并保存，返回删除数
    pub async fn prune(&self, current: &BTreeSet<String>) -> TranslationResult<usize> {
        prune_store(&self.options.store_path, current).await
    }

    /// 调用适配器翻译一个语言的批次（带重试）
    async fn translate_language(
        &self,
        lang: &str,
        batch: &KeyedBatch,
    ) -> TranslationResult<Vec<TranslatedItem>> {
        let texts = batch.texts();
        let source_lang = self.options.source_lang.as_str();
        let label = format!("{}:{}", self.adapter.name(), lang);

        tracing::debug!(
            "翻译 {} -> {}: {} 条，{} 个字符",
            source_lang,
            lang,
            batch.len(),
            batch.total_chars()
        );

        self.options
            .retry
            .run(&label, |_| {
                self.adapter.translate_batch(&texts, source_lang, lang)
            })
            .await
    }

    fn notify_complete(&self, outcome: &LanguageOutcome) {
        if let Some(observer) = &self.observer {
            observer.on_language_complete(outcome);
        }
    }
}

/// 将适配器结果合并进存储，返回 (合并数, 缺失数)
///
/// 未知键和空译文被忽略，对应条目保持缺失，下次同步会再次请求。
fn merge_results(
    store: &mut TranslationStore,
    lang: &str,
    batch: &KeyedBatch,
    items: Vec<TranslatedItem>,
) -> (usize, usize) {
    let mut merged_keys = BTreeSet::new();

    for item in items {
        let Some(entry) = batch.resolve(&item.key) else {
            tracing::warn!("语言 {}: 适配器返回了未知键 {}", lang, item.key);
            continue;
        };
        if item.translated_text.is_empty() {
            tracing::warn!("语言 {}: 键 {} 的译文为空，忽略", lang, item.key);
            continue;
        }
        store.upsert(&entry.hash, &entry.text, lang, &item.translated_text);
        merged_keys.insert(item.key);
    }

    let merged = merged_keys.len();
    let missing = batch.len() - merged;
    if missing > 0 {
        tracing::warn!("语言 {}: {} 条未返回译文", lang, missing);
    }
    (merged, missing)
}

/// 只清理存储中的过期记录并保存，不需要适配器
pub async fn prune_store(path: &Path, current: &BTreeSet<String>) -> TranslationResult<usize> {
    let mut store = TranslationStore::load(path).await;
    let change_set = detect(current, &store);

    let deleted = remove_stale(&mut store, current, &change_set);
    store.save(path).await?;

    tracing::info!("已清理 {} 条过期记录", deleted);
    Ok(deleted)
}

/// 删除过期记录，返回删除数
///
/// 在所有翻译完成后执行。本次已被改写为当前原文的记录（哈希碰撞时）保留。
pub fn remove_stale(
    store: &mut TranslationStore,
    current: &BTreeSet<String>,
    change_set: &ChangeSet,
) -> usize {
    let mut deleted = 0;
    for hash in &change_set.stale_hashes {
        let still_stale = store
            .get(hash)
            .is_some_and(|record| !current.contains(&record.original_text));
        if still_stale {
            store.delete(hash);
            deleted += 1;
        }
    }
    if deleted > 0 {
        tracing::debug!("删除了 {} 条过期记录", deleted);
    }
    deleted
}
