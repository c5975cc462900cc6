//! Word records and their pronunciation trie.

use tracing::{debug, warn};

use crate::phonetic::{Pid, PidTone, PidToneSet};
use crate::table::{DictionarySource, PhoneticTable};
use crate::trie::TrieMultimap;

/// A dictionary word with its pronunciation and static score.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    pub text: String,
    pub pinyin: PidToneSet,
    pub score: f32,
}

impl WordRecord {
    /// Untoned codes of the pronunciation.
    pub fn codes(&self) -> Vec<Pid> {
        self.pinyin.iter().map(|p| p.pid).collect()
    }
}

/// Word records plus a trie from untoned code sequences to record indices.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary {
    records: Vec<WordRecord>,
    trie: TrieMultimap<Pid, usize>,
}

/// Score of a word from its characters' weights: one plus the summed
/// weights, averaged over the characters with a known weight (at least one).
pub fn word_score(table: &PhoneticTable, text: &str) -> f64 {
    let mut score = 1.0;
    let mut known = 0usize;
    for c in text.chars() {
        let weight = table.frequency_of(c);
        if weight > 0.0 {
            known += 1;
        }
        score += weight;
    }
    score / known.max(1) as f64
}

impl WordDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every word of `source`.
    ///
    /// Words whose pronunciation names a syllable unknown to `table` are
    /// skipped.
    pub fn from_source(table: &PhoneticTable, source: &DictionarySource) -> Self {
        let mut dict = Self::new();
        let mut skipped = 0usize;
        for entry in &source.words {
            let mut pinyin = PidToneSet::with_capacity(entry.pinyin.len());
            let mut known = true;
            for (name, tone) in &entry.pinyin {
                match table.find_syllable(name) {
                    Some(pid) => pinyin.push(PidTone::new(pid, *tone)),
                    None => {
                        known = false;
                        break;
                    }
                }
            }
            if !known || pinyin.is_empty() {
                warn!(word = %entry.text, "skipping word with unknown pronunciation");
                skipped += 1;
                continue;
            }
            let score = entry
                .score
                .unwrap_or_else(|| word_score(table, &entry.text) as f32);
            dict.push(WordRecord {
                text: entry.text.clone(),
                pinyin,
                score,
            });
        }
        debug!(words = dict.len(), skipped, "word dictionary built");
        dict
    }

    fn push(&mut self, record: WordRecord) -> usize {
        let index = self.records.len();
        self.trie.insert(&record.codes(), index);
        self.records.push(record);
        index
    }

    /// Add runtime-defined words from `(pinyin, word)` pairs.
    ///
    /// The pinyin is segmented case-insensitively on spaces; literal codes
    /// from unrecognized letters are kept so the word stays reachable by the
    /// exact text typed. The score is [`word_score`] times `effectivity`.
    pub fn add_custom_words<S, T>(&mut self, table: &PhoneticTable, words: &[(S, T)], effectivity: f64)
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        for (pinyin, text) in words {
            let text = text.as_ref();
            let codes = table.segment(pinyin.as_ref(), true, ' ').codes;
            if codes.is_empty() || text.is_empty() {
                warn!(word = %text, "skipping custom word without pronunciation");
                continue;
            }
            let score = word_score(table, text) * effectivity;
            let index = self.push(WordRecord {
                text: text.to_string(),
                pinyin: codes.iter().map(|&pid| PidTone::new(pid, 0)).collect(),
                score: score as f32,
            });
            debug!(word = %text, index, score, "custom word added");
        }
    }

    pub fn get(&self, index: usize) -> Option<&WordRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }

    pub fn trie(&self) -> &TrieMultimap<Pid, usize> {
        &self.trie
    }

    /// Records stored exactly at `codes`.
    pub fn lookup(&self, codes: &[Pid]) -> impl Iterator<Item = &WordRecord> + '_ {
        self.trie
            .find(codes)
            .iter()
            .filter_map(move |&i| self.records.get(i))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn setup() -> (PhoneticTable, DictionarySource) {
        let mut src = DictionarySource::new();
        src.syllables = vec!["peng".into(), "you".into(), "xiao".into()];
        src.push_char('朋', 30, &["peng2"]);
        src.push_char('友', 40, &["you3"]);
        src.push_char('小', 146, &["xiao3"]);
        src.push_word("朋友", &["peng2", "you3"], Some(7.5));
        src.push_word("小朋友", &["xiao3", "peng2", "you3"], None);
        src.push_word("坏词", &["huai4", "ci2"], Some(1.0));
        let table = PhoneticTable::from_source(&src, &Config::default());
        (table, src)
    }

    #[test]
    fn loads_words_and_skips_unknown_syllables() {
        let (table, src) = setup();
        let dict = WordDictionary::from_source(&table, &src);
        assert_eq!(dict.len(), 2);

        let peng = table.syllable_to_code("peng");
        let you = table.syllable_to_code("you");
        let found: Vec<&str> = dict.lookup(&[peng, you]).map(|w| w.text.as_str()).collect();
        assert_eq!(found, vec!["朋友"]);
        assert_eq!(dict.get(0).map(|w| w.score), Some(7.5));
        assert_eq!(dict.get(0).map(|w| w.pinyin[1].tone), Some(3));
    }

    #[test]
    fn computed_score_averages_known_weights() {
        let (table, src) = setup();
        let dict = WordDictionary::from_source(&table, &src);
        let expected = (1.0 + table.frequency_of('小') + table.frequency_of('朋') + table.frequency_of('友')) / 3.0;
        assert!((dict.get(1).map(|w| w.score).unwrap_or(0.0) as f64 - expected).abs() < 1e-4);
    }

    #[test]
    fn score_floor_without_known_characters() {
        let (table, _) = setup();
        assert_eq!(word_score(&table, "谢谢"), 1.0);
        assert_eq!(word_score(&table, ""), 1.0);
    }

    #[test]
    fn custom_words_are_indexed() {
        let (table, src) = setup();
        let mut dict = WordDictionary::from_source(&table, &src);
        dict.add_custom_words(&table, &[("Peng You", "朋友们"), ("", "空")], 2.0);
        assert_eq!(dict.len(), 3);

        let peng = table.syllable_to_code("peng");
        let you = table.syllable_to_code("you");
        let found: Vec<&str> = dict.lookup(&[peng, you]).map(|w| w.text.as_str()).collect();
        assert_eq!(found, vec!["朋友", "朋友们"]);

        let custom = &dict.records()[2];
        let expected = 2.0 * word_score(&table, "朋友们");
        assert!((custom.score as f64 - expected).abs() < 1e-4);
        assert!(custom.pinyin.iter().all(|p| p.tone == 0));
    }
}
