//! 内容哈希
//!
//! 源字符串到稳定标识符的确定性映射，是存储主键的来源。

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

/// 哈希十六进制长度（128位）
pub const HASH_HEX_LEN: usize = 32;

/// 内容哈希标识
///
/// 由原文的精确字节内容计算，跨进程重启稳定。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// 计算文本的内容哈希
    pub fn of(text: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(text.as_bytes());
        let hex = hasher.finalize().to_hex();
        Self(hex.as_str()[..HASH_HEX_LEN].to_string())
    }

    /// 校验此哈希是否与给定文本对应
    pub fn matches(&self, text: &str) -> bool {
        *self == Self::of(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 取前 `len` 个字符作为短键
    pub fn prefix(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(ContentHash::of("Hello World"), ContentHash::of("Hello World"));
        assert_ne!(ContentHash::of("Hello World"), ContentHash::of("Hello world"));
    }

    #[test]
    fn test_hash_is_stable_across_runs() {
        // blake3("") 的前128位
        assert_eq!(
            ContentHash::of("").as_str(),
            "af1349b9f5f9a1a6a0404dea36dcc949"
        );
    }

    #[test]
    fn test_hash_length_and_charset() {
        for text in ["", "a", "多语言文本", &"x".repeat(10_000)] {
            let hash = ContentHash::of(text);
            assert_eq!(hash.as_str().len(), HASH_HEX_LEN);
            assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
            assert!(hash.matches(text));
        }
    }

    #[test]
    fn test_prefix_is_clamped() {
        let hash = ContentHash::of("Thanks");
        assert_eq!(hash.prefix(8).len(), 8);
        assert_eq!(hash.prefix(100), hash.as_str());
    }
}
