//! HTTP 翻译适配器
//!
//! 通用 JSON 接口：
//!
//! ```text
//! POST <api_url>
//! { "sourceLang": "en", "targetLang": "es", "texts": { "<key>": "<text>" } }
//!
//! 200 OK
//! { "translations": [ { "key": "<key>", "translatedText": "<text>" } ] }
//! ```
//!
//! 状态码映射：400/401/403/404/422 视为明确拒绝（不重试），429 视为限流，
//! 5xx 与传输错误视为可重试的网络错误。

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::adapter::{TranslatedItem, TranslationAdapter};
use crate::translation::config::SyncConfig;
use crate::translation::error::{TranslationError, TranslationResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest<'a> {
    source_lang: &'a str,
    target_lang: &'a str,
    texts: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    translations: Vec<TranslatedItem>,
}

/// HTTP 适配器
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    client: Client,
    api_url: Url,
    api_key: Option<String>,
}

impl HttpAdapter {
    /// 创建适配器
    ///
    /// `timeout` 作为 HTTP 客户端的请求超时，编排器另有每次尝试的超时。
    pub fn new(api_url: &str, api_key: Option<String>, timeout: Duration) -> TranslationResult<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| TranslationError::ConfigError(format!("无效的API地址 {}: {}", api_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("transync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    pub fn from_config(config: &SyncConfig) -> TranslationResult<Self> {
        Self::new(&config.api_url, config.api_key.clone(), config.request_timeout())
    }
}

/// 将非成功状态码映射为错误
fn status_error(status: StatusCode, body: &str) -> TranslationError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body.chars().take(200).collect::<String>())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => TranslationError::RateLimitExceeded,
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND
        | StatusCode::UNPROCESSABLE_ENTITY => TranslationError::Rejected(detail),
        s if s.is_server_error() => TranslationError::NetworkError(detail),
        _ => TranslationError::Rejected(detail),
    }
}

impl TranslationAdapter for HttpAdapter {
    fn name(&self) -> &str {
        "http"
    }

    async fn translate_batch(
        &self,
        texts: &BTreeMap<String, String>,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<TranslatedItem>> {
        let body = BatchRequest {
            source_lang,
            target_lang,
            texts,
        };

        let mut request = self.client.post(self.api_url.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!("向 {} 发送 {} 条文本 ({})", self.api_url, texts.len(), target_lang);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: BatchResponse = response.json().await?;
        Ok(parsed.translations)
    }
}
