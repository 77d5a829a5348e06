//! 同步核心模块
//!
//! 增量翻译同步的核心部分：适配器接口、重试策略和同步编排器。
//!
//! ## 模块依赖关系
//!
//! ```text
//! SyncOrchestrator (orchestrator.rs)
//!     ├── TranslationStore (storage/store.rs)
//!     ├── detect / coverage (pipeline/detector.rs, pipeline/completeness.rs)
//!     ├── KeyedBatch (pipeline/batch.rs)
//!     ├── RetryPolicy (retry.rs)
//!     └── TranslationAdapter (adapter.rs)
//!             ├── HttpAdapter (http.rs)
//!             └── PseudoAdapter
//! ```

pub mod adapter;
#[cfg(feature = "http")]
pub mod http;
pub mod orchestrator;
pub mod retry;

pub use adapter::{Adapter, PseudoAdapter, TranslatedItem, TranslationAdapter};
#[cfg(feature = "http")]
pub use http::HttpAdapter;
pub use orchestrator::{
    prune_store, remove_stale, LanguageOutcome, LanguageStatus, SyncObserver, SyncOptions,
    SyncOrchestrator, SyncPlan, SyncReport,
};
pub use retry::RetryPolicy;
