//! pinyinkit-core
//!
//! Phonetic table, tokenizer, word trie, fuzzy matcher and candidate ranking
//! shared by the `pinyinkit` front ends.
//!
//! Nothing in this crate performs I/O or returns errors: lookups that miss
//! resolve to sentinels or empty collections. Resource loading lives in the
//! `pinyinkit` crate, which hands a [`DictionarySource`] to the constructors
//! here.
//!
//! Public API:
//! - `PhoneticTable` - Syllable interning and character ↔ syllable lookups
//! - `Segmentation` - Tokenizer output (codes plus source offsets)
//! - `TrieMultimap` - Prefix tree multi-map keyed by code sequences
//! - `WordDictionary` - Word records indexed by pronunciation
//! - `FuzzyMatcher` - Subsequence alignment and locality scoring
//! - `CandidateRanker` - Frequency + sample-corpus candidate ranking
//! - `Config` - Ranking and matching parameters
use serde::{Deserialize, Serialize};

pub mod phonetic;
pub use phonetic::{literal_char, literal_pid, Pid, PidSet, PidTone, PidToneSet, Tone, UNKNOWN_PID};

pub mod syllable_index;
pub use syllable_index::SyllableIndex;

pub mod table;
pub use table::{CharEntry, CharInfo, DictionarySource, PhoneticTable, WordEntry};

pub mod tokenizer;
pub use tokenizer::Segmentation;

pub mod trie;
pub use trie::TrieMultimap;

pub mod words;
pub use words::{WordDictionary, WordRecord};

pub mod matcher;
pub use matcher::{FuzzyMatcher, HighlightMatch, MatchResult};

pub mod candidate;
pub use candidate::{sort_top_n, CharCandidate, WordCandidate};

pub mod ranker;
pub use ranker::{CandidateRanker, SampleString};

/// Ranking and matching parameters.
///
/// Every field has a default, so a TOML file only needs to name the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Number of trailing prefix characters aligned against samples.
    pub lookback_window: usize,
    /// Occurrence weight by matched suffix length. Index 0 is the base weight
    /// every character occurrence earns; the last entry caps longer matches.
    pub occurrence_weights: Vec<f64>,
    /// Effectivity of the prefix text older than the lookback window.
    pub prefix_effectivity: f64,
    /// Added to raw character frequencies before taking the logarithm.
    pub frequency_offset: f64,
    /// Trie levels explored below the typed codes for word candidates.
    pub word_depth_limit: usize,
    /// Default number of candidates returned per query.
    pub max_candidates: usize,
    /// Score multiplier for words defined at runtime.
    pub custom_word_effectivity: f64,
    /// Only suggest CJK ideographs when no input is pending.
    pub chinese_only_suggestions: bool,

    // Highlight markers for search results
    pub highlight_begin: String,
    pub highlight_end: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookback_window: 4,
            occurrence_weights: vec![0.08, 1.0, 4.0, 8.0, 10.0],
            prefix_effectivity: 5.0,
            frequency_offset: 2.0,
            word_depth_limit: 2,
            max_candidates: 100,
            custom_word_effectivity: 1.0,
            chinese_only_suggestions: true,
            highlight_begin: "\x1b[1;31m".to_string(),
            highlight_end: "\x1b[0m".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Largest usable suffix length when scoring occurrences.
    pub fn max_weight_index(&self) -> usize {
        self.occurrence_weights.len().saturating_sub(1)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// CJK Unified Ideographs block.
    pub fn is_chinese_character(c: char) -> bool {
        ('\u{4E00}'..='\u{9FFF}').contains(&c)
    }

    /// CJK symbols and punctuation, plus the halfwidth/fullwidth forms block.
    pub fn is_chinese_punctuation(c: char) -> bool {
        ('\u{3000}'..='\u{303F}').contains(&c) || ('\u{FF00}'..='\u{FFEF}').contains(&c)
    }

    pub fn is_english_character(c: char) -> bool {
        c.is_ascii_alphabetic()
    }

    pub fn is_english_punctuation(c: char) -> bool {
        c.is_ascii_punctuation()
    }

    /// Count (chinese, english) characters and punctuation in `s`.
    pub fn chinese_english_fraction(s: &str) -> (usize, usize) {
        let mut chinese = 0;
        let mut english = 0;
        for c in s.chars() {
            if is_chinese_character(c) || is_chinese_punctuation(c) {
                chinese += 1;
            } else if is_english_character(c) || is_english_punctuation(c) {
                english += 1;
            }
        }
        (chinese, english)
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("prefix_effectivity = 2.5\nlookback_window = 3\n").unwrap();
        assert_eq!(config.prefix_effectivity, 2.5);
        assert_eq!(config.lookback_window, 3);
        assert_eq!(config.occurrence_weights, Config::default().occurrence_weights);
    }

    #[test]
    fn toml_roundtrip() {
        let config = Config {
            word_depth_limit: 3,
            ..Config::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn character_classes() {
        assert!(is_chinese_character('小'));
        assert!(!is_chinese_character('a'));
        assert!(is_chinese_punctuation('，'));
        assert!(is_chinese_punctuation('。'));
        assert!(is_english_punctuation('!'));
        assert_eq!(chinese_english_fraction("我们are好!"), (3, 4));
    }

    #[test]
    fn normalize_trims() {
        assert_eq!(normalize("  小 "), "小");
    }
}
