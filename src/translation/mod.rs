//! 增量翻译同步模块
//!
//! 采用清晰的模块化架构：
//! - **core**: 适配器接口、重试策略和同步编排器
//! - **pipeline**: 变更检测、完整性检查、批次构建和源文本加载
//! - **storage**: 内容哈希、翻译存储和导出
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::collections::BTreeSet;
//! use transync::translation::{PseudoAdapter, SyncOptions, SyncOrchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = SyncOptions::new("i18n/translations.json", "en", &["es", "fr"]);
//! let orchestrator = SyncOrchestrator::new(PseudoAdapter, options);
//!
//! let current: BTreeSet<String> = ["Hello".to_string(), "Save".to_string()].into();
//! let report = orchestrator.sync(&current).await?;
//! println!("新增 {} 条, 失败语言 {} 个", report.new_strings, report.failed().count());
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 同步核心模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 文本处理管道模块
pub mod pipeline;

/// 存储管理模块
pub mod storage;

// 重新导出主要类型
pub use config::{AdapterKind, ConfigManager, SyncConfig};
#[cfg(feature = "http")]
pub use core::HttpAdapter;
pub use core::{
    prune_store, remove_stale, Adapter, LanguageOutcome, LanguageStatus, PseudoAdapter,
    RetryPolicy, SyncObserver, SyncOptions, SyncOrchestrator, SyncPlan, SyncReport,
    TranslatedItem, TranslationAdapter,
};
pub use error::{TranslationError, TranslationResult};
pub use pipeline::{coverage, detect, load_source_strings, ChangeSet, KeyedBatch, LanguageCoverage};
pub use storage::{project, write_exports, ContentHash, TextRecord, TranslationStore};
