//! 翻译存储
//!
//! 以内容哈希为主键的持久化翻译存储。整个存储作为单一文档加载和保存：
//!
//! - 加载时文件缺失或损坏一律返回空存储（损坏时记录警告）
//! - 保存为整文档原子覆盖写入，失败时向调用方返回错误
//! - 仅由同步编排器在一次同步过程中独占修改
//!
//! ## 文档格式
//!
//! ```json
//! {
//!   "formatVersion": "1.0.0",
//!   "records": {
//!     "<hash>": {
//!       "hash": "<hash>",
//!       "originalText": "Hello World",
//!       "lastUpdated": 1737849600000,
//!       "translations": { "es": "Hola Mundo" }
//!     }
//!   }
//! }
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::hasher::ContentHash;
use crate::translation::error::{TranslationError, TranslationResult};

/// 当前存储格式版本
pub const FORMAT_VERSION: &str = "1.0.0";

/// 文本记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRecord {
    pub hash: ContentHash,
    pub original_text: String,
    /// 最近一次写入的时间戳（毫秒）
    pub last_updated: i64,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

impl TextRecord {
    /// 为原文创建空记录
    pub fn new(original_text: &str) -> Self {
        Self {
            hash: ContentHash::of(original_text),
            original_text: original_text.to_string(),
            last_updated: now_millis(),
            translations: BTreeMap::new(),
        }
    }

    /// 获取某语言的非空译文
    pub fn translation(&self, lang: &str) -> Option<&str> {
        self.translations
            .get(lang)
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    pub fn has_translation(&self, lang: &str) -> bool {
        self.translation(lang).is_some()
    }
}

/// 翻译存储
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStore {
    pub format_version: String,
    #[serde(default)]
    records: BTreeMap<ContentHash, TextRecord>,
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            records: BTreeMap::new(),
        }
    }

    /// 从文件加载存储
    ///
    /// 文件不存在时返回空存储；内容无法解析时记录警告并返回空存储。
    /// 两种情况对调用方而言是一致的。
    pub async fn load(path: &Path) -> Self {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("存储文件不存在，使用空存储: {}", path.display());
                return Self::new();
            }
            Err(e) => {
                let error = TranslationError::StoreLoadCorrupt {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}，使用空存储", error);
                return Self::new();
            }
        };

        match Self::from_json(&content) {
            Ok(store) => {
                tracing::debug!("已加载存储 {}: {} 条记录", path.display(), store.len());
                store
            }
            Err(e) => {
                let error = TranslationError::StoreLoadCorrupt {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}，使用空存储", error);
                Self::new()
            }
        }
    }

    /// 从JSON文本解析存储，并丢弃损坏的记录
    pub fn from_json(content: &str) -> TranslationResult<Self> {
        let mut store: TranslationStore = serde_json::from_str(content)?;

        if store.format_version != FORMAT_VERSION {
            tracing::warn!(
                "存储格式版本 {} 与当前版本 {} 不同，按兼容方式读取",
                store.format_version,
                FORMAT_VERSION
            );
        }

        let dropped = store.drop_corrupt_records();
        if dropped > 0 {
            tracing::warn!("丢弃了 {} 条损坏的记录", dropped);
        }

        Ok(store)
    }

    /// 序列化为格式化JSON
    pub fn to_json(&self) -> TranslationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 原子写入整个存储
    ///
    /// 先写入同目录下的临时文件并同步到磁盘，再重命名覆盖目标文件。
    pub async fn save(&self, path: &Path) -> TranslationResult<()> {
        let content = self.to_json()?;
        write_atomic(path, content.as_bytes())
            .await
            .map_err(|reason| TranslationError::StoreSaveFailed {
                path: path.to_path_buf(),
                reason,
            })?;
        tracing::debug!("已保存存储 {}: {} 条记录", path.display(), self.len());
        Ok(())
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&TextRecord> {
        self.records.get(hash)
    }

    /// 按原文查找记录（要求原文完全一致）
    pub fn get_by_text(&self, text: &str) -> Option<&TextRecord> {
        self.records
            .get(&ContentHash::of(text))
            .filter(|record| record.original_text == text)
    }

    /// 写入一条译文
    ///
    /// 记录不存在时创建；已存在但原文不同（哈希碰撞）时替换原文并清空旧译文。
    /// 对同一参数重复调用得到的状态与调用一次相同。
    pub fn upsert(
        &mut self,
        hash: &ContentHash,
        original_text: &str,
        lang: &str,
        translated_text: &str,
    ) {
        let record = match self.records.entry(hash.clone()) {
            Entry::Vacant(entry) => entry.insert(TextRecord {
                hash: hash.clone(),
                original_text: original_text.to_string(),
                last_updated: now_millis(),
                translations: BTreeMap::new(),
            }),
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                if record.original_text != original_text {
                    tracing::warn!("哈希 {} 对应的原文已变化，重置记录", hash);
                    record.original_text = original_text.to_string();
                    record.translations.clear();
                }
                record
            }
        };

        record
            .translations
            .insert(lang.to_string(), translated_text.to_string());
        record.last_updated = now_millis();
    }

    /// 删除记录
    pub fn delete(&mut self, hash: &ContentHash) -> Option<TextRecord> {
        self.records.remove(hash)
    }

    pub fn records(&self) -> impl Iterator<Item = &TextRecord> {
        self.records.values()
    }

    pub fn hashes(&self) -> impl Iterator<Item = &ContentHash> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 存储中出现过的所有语言
    pub fn languages(&self) -> Vec<String> {
        let mut langs: Vec<String> = self
            .records
            .values()
            .flat_map(|record| record.translations.keys().cloned())
            .collect();
        langs.sort();
        langs.dedup();
        langs
    }

    /// 丢弃键与哈希不一致、或哈希与原文不一致的记录，以及空译文
    fn drop_corrupt_records(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|key, record| {
            let valid = *key == record.hash && record.hash.matches(&record.original_text);
            if !valid {
                tracing::debug!("丢弃损坏记录: {}", key);
            }
            valid
        });

        for record in self.records.values_mut() {
            record.translations.retain(|_, text| !text.is_empty());
        }

        before - self.records.len()
    }
}

/// 当前时间戳（毫秒）
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 原子写入文件，失败时返回原因描述
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> Result<(), String> {
    let path = path.to_path_buf();
    let content = content.to_vec();

    tokio::task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| format!("创建目录失败: {}", e))?;

        let mut file =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| format!("创建临时文件失败: {}", e))?;
        file.write_all(&content)
            .map_err(|e| format!("写入临时文件失败: {}", e))?;
        file.as_file()
            .sync_all()
            .map_err(|e| format!("同步文件失败: {}", e))?;
        file.persist(&path)
            .map_err(|e| format!("替换目标文件失败: {}", e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| format!("写入任务异常: {}", e))?
}
