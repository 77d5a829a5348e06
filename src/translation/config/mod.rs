//! 同步配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{AdapterKind, ConfigManager, SyncConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 存储
    pub const DEFAULT_STORE_PATH: &str = "i18n/translations.json";
    pub const DEFAULT_SOURCE_LANG: &str = "en";

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "http://localhost:1188/translate";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_MAX_CONCURRENT_LANGUAGES: usize = 1;

    // 重试
    pub const DEFAULT_MAX_RETRY_ATTEMPTS: usize = 3;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
    pub const DEFAULT_RETRY_MULTIPLIER: u32 = 2;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "transync.toml",
        ".transync.toml",
        "transync.json",
        "~/.config/transync/config.toml",
    ];

    // 环境变量文件
    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];
}
