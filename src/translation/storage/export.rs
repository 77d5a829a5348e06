//! 导出投影
//!
//! 将存储展开为每种语言的扁平 `原文 -> 译文` 映射，供运行时使用。
//! 只读视图，没有自身状态。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::store::{write_atomic, TranslationStore};
use crate::translation::error::{TranslationError, TranslationResult};

/// 单个语言的导出映射
pub type ExportMap = BTreeMap<String, String>;

/// 投影某个语言的译文
///
/// 没有该语言译文的原文不会出现在结果中，回退策略由调用方决定。
pub fn project(store: &TranslationStore, lang: &str) -> ExportMap {
    store
        .records()
        .filter_map(|record| {
            record
                .translation(lang)
                .map(|translated| (record.original_text.clone(), translated.to_string()))
        })
        .collect()
}

/// 导出文件路径: `<dir>/<lang>.json`
pub fn export_path(dir: &Path, lang: &str) -> PathBuf {
    dir.join(format!("{}.json", lang))
}

/// 为每个语言写出导出文件，返回写入的文件路径
pub async fn write_exports(
    store: &TranslationStore,
    langs: &[String],
    dir: &Path,
) -> TranslationResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(langs.len());

    for lang in langs {
        let map = project(store, lang);
        let path = export_path(dir, lang);
        let content = serde_json::to_string_pretty(&map)?;

        write_atomic(&path, content.as_bytes())
            .await
            .map_err(|reason| {
                TranslationError::IoError(format!("写入导出文件 {} 失败: {}", path.display(), reason))
            })?;

        tracing::info!("已导出 {} 条 {} 译文到 {}", map.len(), lang, path.display());
        written.push(path);
    }

    Ok(written)
}
