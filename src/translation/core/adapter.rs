//! 翻译适配器
//!
//! 编排器只依赖 `TranslationAdapter` 接口，从不根据提供方身份分支。
//! 具体提供方是一个封闭的变体集合 [`Adapter`]，由配置选择。

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use super::http::HttpAdapter;
use crate::translation::config::{AdapterKind, SyncConfig};
#[cfg(not(feature = "http"))]
use crate::translation::error::TranslationError;
use crate::translation::error::TranslationResult;

/// 单条翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedItem {
    pub key: String,
    pub translated_text: String,
}

impl TranslatedItem {
    pub fn new(key: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            translated_text: translated_text.into(),
        }
    }
}

/// 翻译后端接口
///
/// 输出应保留所有输入键；部分成功时返回成功的部分。完全失败时返回错误，
/// 编排器按重试策略处理。需要区分可重试与终止性失败的适配器，
/// 应对终止性失败返回 [`crate::translation::error::TranslationError::Rejected`]。
pub trait TranslationAdapter: Send + Sync {
    /// 适配器名称，用于日志
    fn name(&self) -> &str;

    /// 批量翻译 `键 -> 原文`
    fn translate_batch(
        &self,
        texts: &BTreeMap<String, String>,
        source_lang: &str,
        target_lang: &str,
    ) -> impl Future<Output = TranslationResult<Vec<TranslatedItem>>> + Send;
}

/// 伪本地化适配器
///
/// 离线生成确定性的 `[lang] 原文` 译文，用于开发和界面预览。
#[derive(Debug, Clone, Default)]
pub struct PseudoAdapter;

impl TranslationAdapter for PseudoAdapter {
    fn name(&self) -> &str {
        "pseudo"
    }

    async fn translate_batch(
        &self,
        texts: &BTreeMap<String, String>,
        _source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<TranslatedItem>> {
        Ok(texts
            .iter()
            .map(|(key, text)| TranslatedItem::new(key, format!("[{}] {}", target_lang, text)))
            .collect())
    }
}

/// 已支持的翻译提供方
#[derive(Debug, Clone)]
pub enum Adapter {
    #[cfg(feature = "http")]
    Http(HttpAdapter),
    Pseudo(PseudoAdapter),
}

impl Adapter {
    /// 根据配置创建适配器
    pub fn from_config(config: &SyncConfig) -> TranslationResult<Self> {
        match config.adapter {
            #[cfg(feature = "http")]
            AdapterKind::Http => Ok(Adapter::Http(HttpAdapter::from_config(config)?)),
            #[cfg(not(feature = "http"))]
            AdapterKind::Http => Err(TranslationError::ConfigError(
                "未启用 http 功能，无法使用 HTTP 适配器".to_string(),
            )),
            AdapterKind::Pseudo => Ok(Adapter::Pseudo(PseudoAdapter)),
        }
    }
}

impl TranslationAdapter for Adapter {
    fn name(&self) -> &str {
        match self {
            #[cfg(feature = "http")]
            Adapter::Http(adapter) => adapter.name(),
            Adapter::Pseudo(adapter) => adapter.name(),
        }
    }

    async fn translate_batch(
        &self,
        texts: &BTreeMap<String, String>,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<TranslatedItem>> {
        match self {
            #[cfg(feature = "http")]
            Adapter::Http(adapter) => {
                adapter
                    .translate_batch(texts, source_lang, target_lang)
                    .await
            }
            Adapter::Pseudo(adapter) => {
                adapter
                    .translate_batch(texts, source_lang, target_lang)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pseudo_adapter_preserves_keys() {
        let texts: BTreeMap<String, String> = [
            ("k1".to_string(), "Hello".to_string()),
            ("k2".to_string(), "Goodbye".to_string()),
        ]
        .into_iter()
        .collect();

        let items = PseudoAdapter.translate_batch(&texts, "en", "es").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], TranslatedItem::new("k1", "[es] Hello"));
        assert_eq!(items[1], TranslatedItem::new("k2", "[es] Goodbye"));
    }

    #[tokio::test]
    async fn test_adapter_from_config() {
        let config = SyncConfig {
            adapter: AdapterKind::Pseudo,
            ..SyncConfig::default()
        };
        let adapter = Adapter::from_config(&config).unwrap();
        assert_eq!(adapter.name(), "pseudo");
    }

    #[test]
    fn test_translated_item_wire_format() {
        let json = serde_json::to_string(&TranslatedItem::new("k1", "Hola")).unwrap();
        assert_eq!(json, r#"{"key":"k1","translatedText":"Hola"}"#);
    }
}
