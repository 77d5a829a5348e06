//! 同步管道模块
//!
//! 提供变更检测、完整性检查、带键批次构建与源字符串加载

pub mod batch;
pub mod completeness;
pub mod detector;
pub mod source;

// 重新导出主要类型
pub use batch::{BatchEntry, KeyedBatch};
pub use completeness::{coverage, is_language_complete, missing_for_language, LanguageCoverage};
pub use detector::{detect, ChangeSet};
pub use source::load_source_strings;
