//! 翻译同步统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。
//!
//! 错误分为三类：
//! - **可本地恢复**: 存储文件损坏或缺失，按空存储处理并记录警告
//! - **可部分恢复**: 某个目标语言重试耗尽后失败，跳过该语言，其余语言继续
//! - **致命**: 存储持久化失败，必须向调用方传播

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimitExceeded,

    /// 翻译后端明确拒绝请求（例如凭据无效），重试无意义
    #[error("翻译服务拒绝请求: {0}")]
    Rejected(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 适配器调用超时
    #[error("适配器调用超时: {0}")]
    AdapterTimeout(String),

    /// 存储文件内容损坏（本地恢复为空存储）
    #[error("存储文件损坏 {path}: {reason}")]
    StoreLoadCorrupt { path: PathBuf, reason: String },

    /// 存储持久化失败（致命）
    #[error("存储保存失败 {path}: {reason}")]
    StoreSaveFailed { path: PathBuf, reason: String },

    /// 单个目标语言翻译失败（在编排层恢复）
    #[error("语言 {lang} 翻译失败: {cause}")]
    LanguageTranslationFailed {
        lang: String,
        cause: Box<TranslationError>,
    },

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::AdapterTimeout(_) => true,
            TranslationError::RateLimitExceeded => true,
            TranslationError::IoError(_) => true,
            TranslationError::Rejected(_) => false,
            TranslationError::ConfigError(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::StoreLoadCorrupt { .. } => false,
            TranslationError::StoreSaveFailed { .. } => false,
            TranslationError::LanguageTranslationFailed { .. } => false,
            TranslationError::ParseError(_) => false,
            TranslationError::SerializationError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::RateLimitExceeded => ErrorSeverity::Warning,
            TranslationError::Rejected(_) => ErrorSeverity::Error,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::AdapterTimeout(_) => ErrorSeverity::Warning,
            TranslationError::StoreLoadCorrupt { .. } => ErrorSeverity::Warning,
            TranslationError::StoreSaveFailed { .. } => ErrorSeverity::Critical,
            TranslationError::LanguageTranslationFailed { .. } => ErrorSeverity::Error,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::IoError(_) => ErrorSeverity::Error,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::RateLimitExceeded => ErrorCategory::RateLimit,
            TranslationError::Rejected(_) => ErrorCategory::Service,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::AdapterTimeout(_) => ErrorCategory::Timeout,
            TranslationError::StoreLoadCorrupt { .. } => ErrorCategory::Storage,
            TranslationError::StoreSaveFailed { .. } => ErrorCategory::Storage,
            TranslationError::LanguageTranslationFailed { cause, .. } => cause.category(),
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::IoError(_) => ErrorCategory::Storage,
        }
    }

    /// 是否为致命错误（同步过程必须中止）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TranslationError::StoreSaveFailed { .. } | TranslationError::ConfigError(_)
        )
    }

    /// 包装为某个语言的翻译失败
    pub fn for_language(self, lang: &str) -> Self {
        TranslationError::LanguageTranslationFailed {
            lang: lang.to_string(),
            cause: Box::new(self),
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        match &mut self {
            TranslationError::ConfigError(msg)
            | TranslationError::NetworkError(msg)
            | TranslationError::Rejected(msg)
            | TranslationError::InvalidInput(msg)
            | TranslationError::AdapterTimeout(msg)
            | TranslationError::ParseError(msg)
            | TranslationError::SerializationError(msg)
            | TranslationError::IoError(msg) => {
                *msg = format!("{} (上下文: {})", msg, context);
            }
            TranslationError::StoreLoadCorrupt { reason, .. }
            | TranslationError::StoreSaveFailed { reason, .. } => {
                *reason = format!("{} (上下文: {})", reason, context);
            }
            TranslationError::RateLimitExceeded
            | TranslationError::LanguageTranslationFailed { .. } => {}
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RateLimit,
    Input,
    Storage,
    Service,
    Timeout,
    Parsing,
    Serialization,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::AdapterTimeout(format!("调用超过时限: {}", error))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::AdapterTimeout(error.to_string())
        } else if error.is_decode() {
            TranslationError::ParseError(format!("响应解析失败: {}", error))
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TranslationError::NetworkError("reset".into()).is_retryable());
        assert!(TranslationError::AdapterTimeout("30s".into()).is_retryable());
        assert!(TranslationError::RateLimitExceeded.is_retryable());
        assert!(!TranslationError::Rejected("invalid key".into()).is_retryable());
        assert!(!TranslationError::ConfigError("x".into()).is_retryable());
    }

    #[test]
    fn test_save_failure_is_fatal() {
        let error = TranslationError::StoreSaveFailed {
            path: PathBuf::from("/tmp/store.json"),
            reason: "disk full".into(),
        };
        assert!(error.is_fatal());
        assert_eq!(error.severity(), ErrorSeverity::Critical);
        assert_eq!(error.category(), ErrorCategory::Storage);

        let corrupt = TranslationError::StoreLoadCorrupt {
            path: PathBuf::from("/tmp/store.json"),
            reason: "EOF".into(),
        };
        assert!(!corrupt.is_fatal());
    }

    #[test]
    fn test_language_failure_wraps_cause() {
        let error = TranslationError::NetworkError("connection refused".into()).for_language("fr");
        match &error {
            TranslationError::LanguageTranslationFailed { lang, cause } => {
                assert_eq!(lang, "fr");
                assert!(matches!(**cause, TranslationError::NetworkError(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(error.category(), ErrorCategory::Network);
        assert!(error.to_string().contains("fr"));
    }

    #[test]
    fn test_with_context() {
        let error = TranslationError::NetworkError("reset".into()).with_context("es");
        assert!(error.to_string().contains("上下文: es"));

        let unchanged = TranslationError::RateLimitExceeded.with_context("es");
        assert!(matches!(unchanged, TranslationError::RateLimitExceeded));
    }
}
