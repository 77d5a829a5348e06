//! # Transync Library
//!
//! 增量翻译跟踪与同步引擎：按内容哈希记录每条源文本及其各语言译文，
//! 检测新增、变更和过期文本，只把缺失的部分交给翻译适配器，并导出每种语言的映射表。
//!
//! ## 模块组织
//!
//! - `translation` - 存储、变更检测、同步编排和导出
//! - `env` - 类型安全的环境变量访问

pub mod env;
pub mod translation;

// Re-export commonly used items for convenience
pub use translation::{
    ContentHash, SyncConfig, SyncOptions, SyncOrchestrator, SyncReport, TranslationError,
    TranslationResult, TranslationStore,
};
