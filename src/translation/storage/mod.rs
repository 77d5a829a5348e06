//! 存储模块
//!
//! 提供内容哈希、持久化翻译存储和导出投影。

pub mod export;
pub mod hasher;
pub mod store;

pub use export::{export_path, project, write_exports, ExportMap};
pub use hasher::ContentHash;
pub use store::{TextRecord, TranslationStore, FORMAT_VERSION};
