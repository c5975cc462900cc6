//! Phonetic table: syllable interning plus character ↔ syllable lookups.
//!
//! The table is built once from a [`DictionarySource`] and is read-only
//! afterwards. Every lookup resolves misses to a sentinel (unknown code, empty
//! string, empty slice, zero weight) instead of failing.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::phonetic::{is_literal, literal_char, split_tone, Pid, PidSet, PidTone, PidToneSet, Tone, UNKNOWN_PID};
use crate::syllable_index::SyllableIndex;
use crate::Config;

/// One character row as supplied by a resource loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharEntry {
    pub character: char,
    /// Raw occurrence count from the frequency corpus.
    pub frequency: u32,
    /// Pronunciations as (syllable, tone) pairs, most common first.
    pub pinyin: Vec<(String, Tone)>,
}

/// One word row as supplied by a resource loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub text: String,
    pub pinyin: Vec<(String, Tone)>,
    /// Explicit score; computed from character weights when absent.
    pub score: Option<f32>,
}

/// Everything a loader hands to the core in a single pass.
///
/// The order of `syllables` defines code assignment: code = position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionarySource {
    pub syllables: Vec<String>,
    pub characters: Vec<CharEntry>,
    pub words: Vec<WordEntry>,
}

impl DictionarySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character row, parsing `"xiao3"`-style pronunciations.
    pub fn push_char(&mut self, character: char, frequency: u32, pinyin: &[&str]) {
        self.characters.push(CharEntry {
            character,
            frequency,
            pinyin: pinyin
                .iter()
                .map(|p| {
                    let (name, tone) = split_tone(p);
                    (name.to_string(), tone)
                })
                .collect(),
        });
    }

    /// Add a word row, parsing `"xiao3"`-style pronunciations.
    pub fn push_word(&mut self, text: &str, pinyin: &[&str], score: Option<f32>) {
        self.words.push(WordEntry {
            text: text.to_string(),
            pinyin: pinyin
                .iter()
                .map(|p| {
                    let (name, tone) = split_tone(p);
                    (name.to_string(), tone)
                })
                .collect(),
            score,
        });
    }
}

/// A character together with its log-frequency weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharInfo {
    pub character: char,
    pub weight: f64,
}

#[derive(Debug, Clone)]
struct PinyinInfo {
    weight: f64,
    pinyin: PidToneSet,
}

/// Syllable ↔ code ↔ character lookups.
#[derive(Debug, Clone, Default)]
pub struct PhoneticTable {
    names: Vec<String>,
    index: SyllableIndex,
    syllable_to_chars: AHashMap<Pid, Vec<CharInfo>>,
    char_to_syllables: AHashMap<char, PinyinInfo>,
}

impl PhoneticTable {
    /// Build the table from loader output.
    ///
    /// Duplicate syllable names keep their first code. Character rows naming
    /// a syllable missing from `source.syllables` append a new code. A
    /// character listed twice merges its readings and takes the later weight.
    pub fn from_source(source: &DictionarySource, config: &Config) -> Self {
        let mut table = PhoneticTable::default();
        for name in source.syllables.iter().filter(|n| !n.is_empty()) {
            table.intern(name);
        }
        let declared = table.names.len();

        for entry in &source.characters {
            let weight = (entry.frequency as f64 + config.frequency_offset).ln();
            let mut pinyin = PidToneSet::new();
            for (name, tone) in &entry.pinyin {
                if name.is_empty() {
                    continue;
                }
                let pid = table.intern(name);
                if !pinyin.iter().any(|p| p.pid == pid) {
                    pinyin.push(PidTone::new(pid, *tone));
                }
            }
            table.add_character(entry.character, weight, pinyin);
        }

        if table.names.len() > declared {
            warn!(
                extra = table.names.len() - declared,
                "character rows introduced syllables missing from the syllable list"
            );
        }
        debug!(
            syllables = table.names.len(),
            characters = table.char_to_syllables.len(),
            "phonetic table built"
        );
        table
    }

    fn intern(&mut self, name: &str) -> Pid {
        if let Some(pid) = self.index.get(name) {
            return pid;
        }
        let pid = self.names.len() as Pid;
        self.names.push(name.to_string());
        self.index.insert(name, pid);
        pid
    }

    fn add_character(&mut self, character: char, weight: f64, pinyin: PidToneSet) {
        let info = self
            .char_to_syllables
            .entry(character)
            .or_insert_with(|| PinyinInfo {
                weight,
                pinyin: PidToneSet::new(),
            });
        info.weight = weight;
        for p in pinyin {
            if !info.pinyin.iter().any(|q| q.pid == p.pid) {
                info.pinyin.push(p);
            }
        }
        // A repeated row replaces the weight under every reading, old ones too.
        for p in &info.pinyin {
            let chars = self.syllable_to_chars.entry(p.pid).or_default();
            match chars.iter_mut().find(|c| c.character == character) {
                Some(existing) => existing.weight = weight,
                None => chars.push(CharInfo { character, weight }),
            }
        }
    }

    /// Code of a syllable; [`UNKNOWN_PID`] if the name is not known.
    pub fn syllable_to_code(&self, name: &str) -> Pid {
        self.find_syllable(name).unwrap_or(UNKNOWN_PID)
    }

    /// Code of a syllable, or `None` if the name is not known.
    pub fn find_syllable(&self, name: &str) -> Option<Pid> {
        self.index.get(name)
    }

    /// Display name of a code.
    ///
    /// Literal codes decode to their one-character string; out-of-range
    /// syllable codes give an empty string.
    pub fn code_to_name(&self, pid: Pid) -> String {
        if is_literal(pid) {
            return literal_char(pid).to_string();
        }
        self.names.get(pid as usize).cloned().unwrap_or_default()
    }

    /// Exclusive upper bound of syllable codes.
    pub fn code_limit(&self) -> Pid {
        self.names.len() as Pid
    }

    /// Syllable names in code order.
    pub fn syllables(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Number of characters with at least one known record.
    pub fn character_count(&self) -> usize {
        self.char_to_syllables.len()
    }

    /// Whether `name` is a complete syllable.
    pub fn is_syllable(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Whether `key` is a prefix of some syllable.
    pub fn is_syllable_prefix(&self, key: &str) -> bool {
        self.index.is_prefix(key)
    }

    /// Characters pronounced with `pid`, in resource order.
    pub fn characters_for_syllable(&self, pid: Pid) -> &[CharInfo] {
        self.syllable_to_chars
            .get(&pid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Deduplicated syllable codes of a character (empty if unknown).
    pub fn syllables_for_character(&self, character: char) -> PidSet {
        let mut set = PidSet::new();
        if let Some(info) = self.char_to_syllables.get(&character) {
            let mut seen = AHashSet::with_capacity(info.pinyin.len());
            for p in &info.pinyin {
                if seen.insert(p.pid) {
                    set.push(p.pid);
                }
            }
        }
        set
    }

    /// Toned pronunciations of a character.
    pub fn syllables_for_character_toned(&self, character: char) -> Option<&PidToneSet> {
        self.char_to_syllables.get(&character).map(|i| &i.pinyin)
    }

    /// Log-frequency weight of a character (0 if unknown).
    pub fn frequency_of(&self, character: char) -> f64 {
        self.char_to_syllables
            .get(&character)
            .map(|i| i.weight)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetic::literal_pid;

    fn sample_table() -> PhoneticTable {
        let mut src = DictionarySource::new();
        src.syllables = vec!["xiao".into(), "peng".into(), "you".into()];
        src.push_char('小', 146, &["xiao3"]);
        src.push_char('晓', 20, &["xiao3"]);
        src.push_char('朋', 30, &["peng2"]);
        src.push_char('友', 40, &["you3", "you3"]);
        src.push_char('了', 500, &["le", "liao3"]);
        PhoneticTable::from_source(&src, &Config::default())
    }

    #[test]
    fn code_assignment_follows_syllable_order() {
        let table = sample_table();
        assert_eq!(table.syllable_to_code("xiao"), 0);
        assert_eq!(table.syllable_to_code("peng"), 1);
        assert_eq!(table.syllable_to_code("you"), 2);
        // introduced by character rows
        assert_eq!(table.syllable_to_code("le"), 3);
        assert_eq!(table.syllable_to_code("liao"), 4);
        assert_eq!(table.code_limit(), 5);
    }

    #[test]
    fn lookup_misses_use_sentinels() {
        let table = sample_table();
        assert_eq!(table.syllable_to_code("zzz"), UNKNOWN_PID);
        assert_eq!(table.code_to_name(99), "");
        assert_eq!(table.code_to_name(literal_pid('好')), "好");
        assert!(table.characters_for_syllable(99).is_empty());
        assert!(table.syllables_for_character('好').is_empty());
        assert_eq!(table.frequency_of('好'), 0.0);
    }

    #[test]
    fn names_roundtrip() {
        let table = sample_table();
        for pid in 0..table.code_limit() {
            assert_eq!(table.syllable_to_code(&table.code_to_name(pid)), pid);
        }
    }

    #[test]
    fn characters_and_weights() {
        let table = sample_table();
        let xiao = table.syllable_to_code("xiao");
        let chars: Vec<char> = table
            .characters_for_syllable(xiao)
            .iter()
            .map(|c| c.character)
            .collect();
        assert_eq!(chars, vec!['小', '晓']);
        assert!((table.frequency_of('小') - (148.0f64).ln()).abs() < 1e-9);
    }

    #[test]
    fn duplicate_pronunciations_are_deduplicated() {
        let table = sample_table();
        let you = table.syllable_to_code("you");
        assert_eq!(table.syllables_for_character('友').as_slice(), &[you]);
        assert_eq!(table.characters_for_syllable(you).len(), 1);
        let toned = table.syllables_for_character_toned('了').unwrap();
        assert_eq!(toned.len(), 2);
        assert_eq!(toned[1].tone, 3);
    }

    #[test]
    fn repeated_character_row_keeps_weights_consistent() {
        let mut src = DictionarySource::new();
        src.syllables = vec!["xiao".into(), "shao".into()];
        src.push_char('小', 10, &["xiao3"]);
        src.push_char('小', 146, &["xiao3", "shao3"]);
        let table = PhoneticTable::from_source(&src, &Config::default());

        let weight = table.frequency_of('小');
        assert!((weight - (148.0f64).ln()).abs() < 1e-9);
        assert_eq!(table.syllables_for_character('小').as_slice(), &[0, 1]);
        for pid in [0, 1] {
            let chars = table.characters_for_syllable(pid);
            assert_eq!(chars.len(), 1);
            assert_eq!(chars[0].weight, weight);
        }
    }

    #[test]
    fn prefix_queries() {
        let table = sample_table();
        assert!(table.is_syllable("peng"));
        assert!(table.is_syllable_prefix("pe"));
        assert!(!table.is_syllable("pe"));
    }
}
