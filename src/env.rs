//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 仅在变量已设置时返回值；值无效时记录警告并忽略
    fn get_if_set() -> Option<T> {
        let value = env::var(Self::NAME).ok()?;
        match Self::parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("忽略无效的环境变量: {}", e);
                None
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "TRANSYNC_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 同步相关环境变量
pub mod sync {
    use super::*;
    use crate::translation::config::AdapterKind;

    /// 存储文件路径
    pub struct StorePath;
    impl EnvVar<String> for StorePath {
        const NAME: &'static str = "TRANSYNC_STORE_PATH";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the persisted translation store";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 导出目录
    pub struct ExportDir;
    impl EnvVar<String> for ExportDir {
        const NAME: &'static str = "TRANSYNC_EXPORT_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory for per-language export files";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 源语言
    pub struct SourceLang;
    impl EnvVar<String> for SourceLang {
        const NAME: &'static str = "TRANSYNC_SOURCE_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Source language code (e.g. en)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_lang_code(value, Self::NAME)
        }
    }

    /// 目标语言列表
    pub struct TargetLangs;
    impl EnvVar<Vec<String>> for TargetLangs {
        const NAME: &'static str = "TRANSYNC_TARGET_LANGS";
        const DEFAULT: Option<Vec<String>> = None;
        const DESCRIPTION: &'static str = "Comma-separated target language codes (e.g. es,fr-CA)";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            let langs = value
                .split(',')
                .map(str::trim)
                .filter(|lang| !lang.is_empty())
                .map(|lang| parse_lang_code(lang, Self::NAME))
                .collect::<EnvResult<Vec<String>>>()?;

            if langs.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "At least one language is required".to_string(),
                });
            }
            Ok(langs)
        }
    }

    /// 适配器类型
    pub struct Adapter;
    impl EnvVar<AdapterKind> for Adapter {
        const NAME: &'static str = "TRANSYNC_ADAPTER";
        const DEFAULT: Option<AdapterKind> = None;
        const DESCRIPTION: &'static str = "Translation adapter: http, pseudo";

        fn parse(value: &str) -> EnvResult<AdapterKind> {
            value.trim().parse().map_err(|e| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("{}", e),
            })
        }
    }

    /// API URL
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "TRANSYNC_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Translation API endpoint URL";

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "API URL must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// API 密钥
    pub struct ApiKey;
    impl EnvVar<String> for ApiKey {
        const NAME: &'static str = "TRANSYNC_API_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Bearer token sent to the translation API";

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 单次调用超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "TRANSYNC_TIMEOUT";
        const DEFAULT: Option<Duration> = None;
        const DESCRIPTION: &'static str = "Adapter call timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value, Self::NAME, 1, 600)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }

    /// 最大尝试次数
    pub struct MaxRetries;
    impl EnvVar<usize> for MaxRetries {
        const NAME: &'static str = "TRANSYNC_MAX_RETRIES";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Maximum adapter attempts per language (including the first)";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 10)
        }
    }

    /// 重试基础延迟
    pub struct RetryDelayMs;
    impl EnvVar<u64> for RetryDelayMs {
        const NAME: &'static str = "TRANSYNC_RETRY_DELAY_MS";
        const DEFAULT: Option<u64> = None;
        const DESCRIPTION: &'static str = "Base retry delay in milliseconds, doubled after each attempt";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_positive_usize(value, Self::NAME, 0, 60_000).map(|ms| ms as u64)
        }
    }

    /// 最大并发语言数
    pub struct MaxConcurrentLanguages;
    impl EnvVar<usize> for MaxConcurrentLanguages {
        const NAME: &'static str = "TRANSYNC_MAX_CONCURRENT_LANGUAGES";
        const DEFAULT: Option<usize> = None;
        const DESCRIPTION: &'static str = "Number of languages translated concurrently";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 32)
        }
    }
}

/// 辅助函数
fn parse_non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(EnvError {
            variable: var_name.to_string(),
            message: "Value must not be empty".to_string(),
        })
    } else {
        Ok(value.to_string())
    }
}

fn parse_lang_code(value: &str, var_name: &str) -> EnvResult<String> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(value.to_string())
    } else {
        Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language code '{}'", value),
        })
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn line(name: &str, description: &str) -> String {
        format!("- `{}`: {}\n", name, description)
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&line(core::LogLevel::NAME, core::LogLevel::DESCRIPTION));
    docs.push_str(&line(core::NoColor::NAME, core::NoColor::DESCRIPTION));

    docs.push_str("\n## Sync Configuration\n\n");
    docs.push_str(&line(sync::StorePath::NAME, sync::StorePath::DESCRIPTION));
    docs.push_str(&line(sync::ExportDir::NAME, sync::ExportDir::DESCRIPTION));
    docs.push_str(&line(sync::SourceLang::NAME, sync::SourceLang::DESCRIPTION));
    docs.push_str(&line(sync::TargetLangs::NAME, sync::TargetLangs::DESCRIPTION));

    docs.push_str("\n## Adapter Configuration\n\n");
    docs.push_str(&line(sync::Adapter::NAME, sync::Adapter::DESCRIPTION));
    docs.push_str(&line(sync::ApiUrl::NAME, sync::ApiUrl::DESCRIPTION));
    docs.push_str(&line(sync::ApiKey::NAME, sync::ApiKey::DESCRIPTION));
    docs.push_str(&line(sync::Timeout::NAME, sync::Timeout::DESCRIPTION));
    docs.push_str(&line(sync::MaxRetries::NAME, sync::MaxRetries::DESCRIPTION));
    docs.push_str(&line(sync::RetryDelayMs::NAME, sync::RetryDelayMs::DESCRIPTION));
    docs.push_str(&line(
        sync::MaxConcurrentLanguages::NAME,
        sync::MaxConcurrentLanguages::DESCRIPTION,
    ));

    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::config::AdapterKind;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(super::core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(super::core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_target_langs_parsing() {
        assert_eq!(
            sync::TargetLangs::parse("es, fr-CA,,de").unwrap(),
            vec!["es", "fr-CA", "de"]
        );
        assert!(sync::TargetLangs::parse(" , ").is_err());
        assert!(sync::TargetLangs::parse("es,f r").is_err());
    }

    #[test]
    fn test_adapter_parsing() {
        assert_eq!(sync::Adapter::parse("pseudo").unwrap(), AdapterKind::Pseudo);
        assert!(sync::Adapter::parse("carrier-pigeon").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(sync::ApiUrl::parse("http://localhost:1188").is_ok());
        assert!(sync::ApiUrl::parse("https://api.example.com").is_ok());
        assert!(sync::ApiUrl::parse("ftp://example.com").is_err());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(sync::Timeout::parse("45").unwrap(), Duration::from_secs(45));
        assert!(sync::Timeout::parse("0").is_err());
        assert!(sync::MaxRetries::parse("11").is_err());
        assert_eq!(sync::RetryDelayMs::parse("0").unwrap(), 0);
        assert!(sync::MaxConcurrentLanguages::parse("many").is_err());
    }

    #[test]
    fn test_env_docs_lists_variables() {
        let docs = generate_env_docs();
        assert!(docs.contains("TRANSYNC_STORE_PATH"));
        assert!(docs.contains("TRANSYNC_TARGET_LANGS"));
        assert!(docs.contains("NO_COLOR"));
    }
}
