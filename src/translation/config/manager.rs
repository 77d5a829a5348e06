//! 配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值。
//! 优先级从低到高：默认值 → 配置文件 → `.env` 与环境变量 → 命令行参数。

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::core::RetryPolicy;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译提供方类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    #[default]
    Http,
    Pseudo,
}

impl std::str::FromStr for AdapterKind {
    type Err = TranslationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "http" => Ok(AdapterKind::Http),
            "pseudo" => Ok(AdapterKind::Pseudo),
            other => Err(TranslationError::ConfigError(format!(
                "未知的适配器类型 '{}'，可选: http, pseudo",
                other
            ))),
        }
    }
}

/// 同步配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    // 存储
    pub store_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,

    // 语言
    pub source_lang: String,
    pub target_langs: Vec<String>,

    // 适配器
    pub adapter: AdapterKind,
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,

    // 重试
    pub max_retry_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub retry_multiplier: u32,

    pub max_concurrent_languages: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store_path: constants::DEFAULT_STORE_PATH.to_string(),
            export_dir: None,

            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            target_langs: Vec::new(),

            adapter: AdapterKind::default(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            api_key: None,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            max_retry_attempts: constants::DEFAULT_MAX_RETRY_ATTEMPTS,
            retry_base_delay_ms: constants::DEFAULT_RETRY_DELAY_MS,
            retry_multiplier: constants::DEFAULT_RETRY_MULTIPLIER,

            max_concurrent_languages: constants::DEFAULT_MAX_CONCURRENT_LANGUAGES,
        }
    }
}

impl SyncConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        self.validate_store()?;

        if self.source_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("源语言不能为空".to_string()));
        }

        if self.target_langs.is_empty() {
            return Err(TranslationError::ConfigError("至少需要一个目标语言".to_string()));
        }

        if let Some(lang) = self.target_langs.iter().find(|lang| lang.trim().is_empty()) {
            return Err(TranslationError::ConfigError(format!("目标语言无效: '{}'", lang)));
        }

        let mut seen = BTreeSet::new();
        if let Some(lang) = self.target_langs.iter().find(|lang| !seen.insert(lang.as_str())) {
            return Err(TranslationError::ConfigError(format!("目标语言重复: {}", lang)));
        }

        if self.target_langs.contains(&self.source_lang) {
            return Err(TranslationError::ConfigError(format!(
                "目标语言不能与源语言相同: {}",
                self.source_lang
            )));
        }

        if self.max_retry_attempts == 0 {
            return Err(TranslationError::ConfigError("最大尝试次数不能为0".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时不能为0".to_string()));
        }

        if self.max_concurrent_languages == 0 {
            return Err(TranslationError::ConfigError("最大并发语言数不能为0".to_string()));
        }

        if self.adapter == AdapterKind::Http {
            url::Url::parse(&self.api_url).map_err(|e| {
                TranslationError::ConfigError(format!("无效的API地址 {}: {}", self.api_url, e))
            })?;
        }

        Ok(())
    }

    /// 只验证存储路径，用于不涉及翻译的操作
    pub fn validate_store(&self) -> TranslationResult<()> {
        if self.store_path.trim().is_empty() {
            return Err(TranslationError::ConfigError("存储路径不能为空".to_string()));
        }
        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{sync, EnvVar};

        if let Some(path) = sync::StorePath::get_if_set() {
            self.store_path = path;
        }

        if let Some(dir) = sync::ExportDir::get_if_set() {
            self.export_dir = Some(dir);
        }

        if let Some(lang) = sync::SourceLang::get_if_set() {
            self.source_lang = lang;
        }

        if let Some(langs) = sync::TargetLangs::get_if_set() {
            self.target_langs = langs;
        }

        if let Some(adapter) = sync::Adapter::get_if_set() {
            self.adapter = adapter;
        }

        if let Some(api_url) = sync::ApiUrl::get_if_set() {
            self.api_url = api_url;
            tracing::info!("环境变量覆盖 API URL: {}", self.api_url);
        }

        if let Some(api_key) = sync::ApiKey::get_if_set() {
            self.api_key = Some(api_key);
        }

        if let Some(timeout) = sync::Timeout::get_if_set() {
            self.request_timeout_secs = timeout.as_secs().max(1);
        }

        if let Some(attempts) = sync::MaxRetries::get_if_set() {
            self.max_retry_attempts = attempts;
        }

        if let Some(delay) = sync::RetryDelayMs::get_if_set() {
            self.retry_base_delay_ms = delay;
        }

        if let Some(n) = sync::MaxConcurrentLanguages::get_if_set() {
            self.max_concurrent_languages = n;
        }
    }

    /// 展开 `~` 后的存储路径
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store_path).as_ref())
    }

    pub fn export_dir(&self) -> Option<PathBuf> {
        self.export_dir
            .as_ref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).as_ref()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            multiplier: self.retry_multiplier,
            attempt_timeout: Some(self.request_timeout()),
        }
    }
}

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SyncConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 搜索默认路径加载配置，并应用环境变量覆盖
    ///
    /// 返回的配置尚未验证，调用方在应用命令行参数后调用 [`SyncConfig::validate`]。
    pub fn new() -> TranslationResult<Self> {
        Self::load(None)
    }

    /// 从指定文件加载配置，并应用环境变量覆盖
    pub fn from_path(path: &Path) -> TranslationResult<Self> {
        Self::load(Some(path))
    }

    fn load(explicit: Option<&Path>) -> TranslationResult<Self> {
        Self::load_dotenv();

        let (mut config, source) = match explicit {
            Some(path) => (Self::load_from_file(path)?, Some(path.to_path_buf())),
            None => match Self::find_config_file() {
                Some(path) => {
                    tracing::info!("加载配置文件: {}", path.display());
                    (Self::load_from_file(&path)?, Some(path))
                }
                None => {
                    tracing::debug!("未找到配置文件，使用默认配置");
                    (SyncConfig::default(), None)
                }
            },
        };

        config.apply_env_overrides();
        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SyncConfig {
        &mut self.config
    }

    pub fn into_config(self) -> SyncConfig {
        self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 从指定文件加载配置，按扩展名选择 TOML 或 JSON
    pub fn load_from_file(path: &Path) -> TranslationResult<SyncConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件 {} 失败: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let config = SyncConfig {
            target_langs: vec!["es".to_string(), "fr".to_string()],
            export_dir: Some("i18n/locales".to_string()),
            ..SyncConfig::default()
        };
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> SyncConfig {
        SyncConfig {
            target_langs: vec!["es".to_string()],
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_default_values() {
        let config = SyncConfig::default();
        assert_eq!(config.source_lang, "en");
        assert_eq!(config.max_retry_attempts, 3);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate().is_ok());
        assert!(SyncConfig::default().validate().is_err());

        let same_lang = SyncConfig {
            target_langs: vec!["en".to_string()],
            ..SyncConfig::default()
        };
        assert!(same_lang.validate().is_err());

        let no_attempts = SyncConfig {
            max_retry_attempts: 0,
            ..valid_config()
        };
        assert!(no_attempts.validate().is_err());

        let bad_url = SyncConfig {
            api_url: "localhost".to_string(),
            ..valid_config()
        };
        assert!(bad_url.validate().is_err());

        let pseudo = SyncConfig {
            adapter: AdapterKind::Pseudo,
            api_url: "localhost".to_string(),
            ..valid_config()
        };
        assert!(pseudo.validate().is_ok());
    }

    #[test]
    fn test_duplicate_target_languages_rejected() {
        let duplicated = SyncConfig {
            target_langs: vec!["es".to_string(), "fr".to_string(), "es".to_string()],
            ..SyncConfig::default()
        };
        match duplicated.validate() {
            Err(TranslationError::ConfigError(msg)) => assert!(msg.contains("es")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_store_ignores_languages() {
        let no_langs = SyncConfig::default();
        assert!(no_langs.validate_store().is_ok());
        assert!(no_langs.validate().is_err());

        let no_store = SyncConfig {
            store_path: " ".to_string(),
            ..valid_config()
        };
        assert!(no_store.validate_store().is_err());
        assert!(no_store.validate().is_err());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transync.toml");
        std::fs::write(
            &path,
            r#"
store_path = "store.json"
source_lang = "en"
target_langs = ["es", "fr-CA"]
adapter = "pseudo"
max_retry_attempts = 5
"#,
        )
        .unwrap();

        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.target_langs, vec!["es", "fr-CA"]);
        assert_eq!(config.adapter, AdapterKind::Pseudo);
        assert_eq!(config.max_retry_attempts, 5);
        assert_eq!(config.retry_base_delay_ms, 1000);
    }

    #[test]
    fn test_load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transync.json");
        std::fs::write(&path, r#"{"target_langs": ["de"], "adapter": "http"}"#).unwrap();

        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.target_langs, vec!["de"]);
        assert_eq!(config.adapter, AdapterKind::Http);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transync.toml");
        std::fs::write(&path, "target_langs = ").unwrap();

        assert!(matches!(
            ConfigManager::load_from_file(&path),
            Err(TranslationError::ConfigError(_))
        ));
    }

    #[test]
    fn test_generate_example_config_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.toml");

        ConfigManager::generate_example_config(&path).unwrap();
        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.target_langs, vec!["es", "fr"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_adapter_kind_parsing() {
        assert_eq!("HTTP".parse::<AdapterKind>().unwrap(), AdapterKind::Http);
        assert_eq!("pseudo".parse::<AdapterKind>().unwrap(), AdapterKind::Pseudo);
        assert!("deepl".parse::<AdapterKind>().is_err());
    }
}
