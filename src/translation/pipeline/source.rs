//! 源字符串加载
//!
//! 源字符串由外部扫描组件产出，这里只负责读入去重后的集合。
//! 支持三种文件形式：
//! - JSON 字符串数组
//! - JSON 对象（取所有字符串值，忽略键）
//! - 纯文本，每个非空行一个字符串

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;

use crate::translation::error::{TranslationError, TranslationResult};

/// 读取源字符串集合
pub async fn load_source_strings(path: &Path) -> TranslationResult<BTreeSet<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        TranslationError::InvalidInput(format!("无法读取源字符串文件 {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let strings = if is_json {
        parse_json_strings(&content)?
    } else {
        parse_line_strings(&content)
    };

    tracing::debug!("从 {} 读取了 {} 个源字符串", path.display(), strings.len());
    Ok(strings)
}

/// 解析 JSON 形式的源字符串
pub fn parse_json_strings(content: &str) -> TranslationResult<BTreeSet<String>> {
    let value: Value = serde_json::from_str(content)?;

    let values: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => {
            return Err(TranslationError::InvalidInput(
                "源字符串文件必须是字符串数组或对象".to_string(),
            ))
        }
    };

    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(Ok(text)),
            other => Some(Err(TranslationError::InvalidInput(format!(
                "源字符串必须是字符串，实际为: {}",
                other
            )))),
        })
        .collect()
}

/// 按行解析源字符串
pub fn parse_line_strings(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
