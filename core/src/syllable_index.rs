//! Prefix trie over syllable names, used by the tokenizer as its prefix set.
use ahash::AHashMap;

use crate::phonetic::Pid;

/// A character trie storing every known syllable.
///
/// Every node reached while inserting a syllable is a valid syllable prefix;
/// nodes that end a syllable also carry its code.
///
/// # Example
/// ```
/// use pinyinkit_core::syllable_index::SyllableIndex;
///
/// let mut index = SyllableIndex::new();
/// index.insert("xiao", 0);
/// index.insert("xi", 1);
///
/// assert_eq!(index.get("xiao"), Some(0));
/// assert!(index.is_prefix("xia"));
/// assert_eq!(index.get("xia"), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct SyllableIndex {
    children: AHashMap<char, SyllableIndex>,
    /// Code of the syllable ending exactly here, if any.
    pid: Option<Pid>,
}

impl SyllableIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a syllable with its code.
    ///
    /// A syllable that is already present keeps its first code.
    pub fn insert(&mut self, syllable: &str, pid: Pid) {
        let mut node = self;
        for ch in syllable.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.pid.get_or_insert(pid);
    }

    fn node(&self, key: &str) -> Option<&SyllableIndex> {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// Code of the syllable spelled exactly `syllable`.
    pub fn get(&self, syllable: &str) -> Option<Pid> {
        self.node(syllable).and_then(|n| n.pid)
    }

    /// Whether `syllable` is a complete known syllable.
    pub fn contains(&self, syllable: &str) -> bool {
        self.get(syllable).is_some()
    }

    /// Whether `key` is a non-empty prefix of some known syllable
    /// (a complete syllable counts as its own prefix).
    pub fn is_prefix(&self, key: &str) -> bool {
        !key.is_empty() && self.node(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_insert_and_get() {
        let mut index = SyllableIndex::new();
        index.insert("ni", 0);
        index.insert("hao", 1);
        index.insert("nihao", 2);

        assert_eq!(index.get("ni"), Some(0));
        assert_eq!(index.get("hao"), Some(1));
        assert_eq!(index.get("nihao"), Some(2));
        assert!(!index.contains("n"));
        assert!(!index.contains("ha"));
        assert!(!index.contains("niha"));
    }

    #[test]
    fn test_prefixes() {
        let mut index = SyllableIndex::new();
        index.insert("zhuang", 0);

        assert!(index.is_prefix("z"));
        assert!(index.is_prefix("zhua"));
        assert!(index.is_prefix("zhuang"));
        assert!(!index.is_prefix("zhuangg"));
        assert!(!index.is_prefix(""));
    }

    #[test]
    fn test_first_code_wins() {
        let mut index = SyllableIndex::new();
        index.insert("ma", 3);
        index.insert("ma", 7);
        assert_eq!(index.get("ma"), Some(3));
    }
}
