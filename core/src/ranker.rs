//! Contextual candidate ranking.
//!
//! Static dictionary weights are blended with occurrence statistics from a
//! set of sample strings. The last `lookback_window` characters of the typed
//! prefix are aligned against every sample: a character that appears right
//! after a suffix of that recent context earns a weight that grows with the
//! suffix length, and any appearance at all earns the base weight. The part
//! of the prefix older than the window is scored as one more sample.

use std::ops::ControlFlow;

use ahash::AHashMap;
use tracing::{debug, debug_span};

use crate::candidate::{sort_top_n, CharCandidate, WordCandidate};
use crate::phonetic::{literal_char, Pid};
use crate::table::PhoneticTable;
use crate::utils::is_chinese_character;
use crate::words::WordDictionary;
use crate::Config;

/// A corpus entry used only as a statistical signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleString {
    pub content: Vec<char>,
    /// Non-negative multiplier of this sample's contribution.
    pub effectivity: f64,
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from + needle.len() > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Positions right after an occurrence of a suffix of `recent`, mapped to the
/// longest such suffix length.
fn suffix_hits(sample: &[char], recent: &[char]) -> AHashMap<usize, usize> {
    let mut hits = AHashMap::new();
    for len in 1..=recent.len() {
        let suffix = &recent[recent.len() - len..];
        let mut pos = 0;
        while let Some(found) = find_from(sample, suffix, pos) {
            pos = found + len;
            hits.insert(pos, len);
        }
    }
    hits
}

/// Log-compressed per-character occurrence weights of one sample.
fn char_occurrences(sample: &[char], recent: &[char], weights: &[f64]) -> AHashMap<char, f64> {
    let mut occurrence: AHashMap<char, f64> = AHashMap::new();
    let Some(&base) = weights.first() else {
        return occurrence;
    };
    for &c in sample {
        *occurrence.entry(c).or_default() += base;
    }
    for (pos, len) in suffix_hits(sample, recent) {
        if let Some(&c) = sample.get(pos) {
            *occurrence.entry(c).or_default() += weights[len.min(weights.len() - 1)];
        }
    }
    for weight in occurrence.values_mut() {
        *weight = (*weight + 1.0).ln();
    }
    occurrence
}

/// Log-compressed occurrence weight of a whole word in one sample.
///
/// Each non-overlapping occurrence earns `weights[s]`, where `s` counts the
/// characters right before it that repeat the recent context backwards.
fn word_occurrence(sample: &[char], word: &[char], recent: &[char], weights: &[f64]) -> f64 {
    if weights.is_empty() || word.is_empty() {
        return 0.0;
    }
    let cap = recent.len().min(weights.len() - 1);
    let mut count = 0.0;
    let mut pos = 0;
    while let Some(found) = find_from(sample, word, pos) {
        let mut s = 0;
        while s < cap && s < found && recent[recent.len() - 1 - s] == sample[found - 1 - s] {
            s += 1;
        }
        count += weights[s];
        pos = found + word.len();
    }
    (count + 1.0).ln()
}

/// Ranks character and word candidates against registered samples.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    samples: Vec<SampleString>,
    prefix_effectivity: f64,
    lookback_window: usize,
    weights: Vec<f64>,
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl CandidateRanker {
    pub fn new(config: &Config) -> Self {
        Self {
            samples: Vec::new(),
            prefix_effectivity: config.prefix_effectivity,
            lookback_window: config.lookback_window,
            weights: config.occurrence_weights.clone(),
        }
    }

    pub fn add_sample_string(&mut self, text: &str, effectivity: f64) {
        self.samples.push(SampleString {
            content: text.chars().collect(),
            effectivity,
        });
    }

    pub fn clear_sample_strings(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> &[SampleString] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn set_prefix_effectivity(&mut self, effectivity: f64) {
        self.prefix_effectivity = effectivity;
    }

    pub fn prefix_effectivity(&self) -> f64 {
        self.prefix_effectivity
    }

    /// Split the prefix into (recent window, older portion).
    fn split_prefix<'p>(&self, prefix: &'p [char]) -> (&'p [char], &'p [char]) {
        if prefix.len() > self.lookback_window {
            let cut = prefix.len() - self.lookback_window;
            (&prefix[cut..], &prefix[..cut])
        } else {
            (prefix, &[])
        }
    }

    /// Summed occurrence score of every character seen in the samples (and
    /// in the older part of the prefix).
    pub fn occurrence_scores(&self, prefix: &str) -> AHashMap<char, f64> {
        let prefix: Vec<char> = prefix.chars().collect();
        let (recent, older) = self.split_prefix(&prefix);
        let mut scores: AHashMap<char, f64> = AHashMap::new();
        for sample in &self.samples {
            for (c, w) in char_occurrences(&sample.content, recent, &self.weights) {
                *scores.entry(c).or_default() += w * sample.effectivity;
            }
        }
        if !older.is_empty() {
            for (c, w) in char_occurrences(older, recent, &self.weights) {
                *scores.entry(c).or_default() += w * self.prefix_effectivity;
            }
        }
        scores
    }

    /// Characters ranked by occurrence score alone, for when nothing is
    /// typed after `prefix`.
    pub fn suggest_char_candidates(&self, prefix: &str, limit: usize, chinese_only: bool) -> Vec<CharCandidate> {
        let _span = debug_span!("suggest_char_candidates", limit, chinese_only).entered();
        let mut candidates: Vec<CharCandidate> = self
            .occurrence_scores(prefix)
            .into_iter()
            .filter(|(c, _)| !chinese_only || is_chinese_character(*c))
            .map(|(c, score)| CharCandidate::new(c, score))
            .collect();
        sort_top_n(&mut candidates, limit, |c| c.score);
        candidates
    }

    /// Characters for one code after `prefix`.
    ///
    /// A literal code yields exactly its own character, scored by occurrence
    /// alone. A syllable code yields every character of the syllable scored
    /// by static weight plus occurrence. A non-negative code past
    /// [`PhoneticTable::code_limit`] has no characters and no literal reading,
    /// so it gives an empty list.
    pub fn char_candidates(&self, table: &PhoneticTable, prefix: &str, pid: Pid, limit: usize) -> Vec<CharCandidate> {
        let _span = debug_span!("char_candidates", pid, limit).entered();
        let mut occurrence = self.occurrence_scores(prefix);
        let mut take = |c: char| occurrence.remove(&c).unwrap_or(0.0);

        let mut candidates = Vec::new();
        if pid < 0 {
            let c = literal_char(pid);
            candidates.push(CharCandidate::new(c, take(c)));
        } else {
            for info in table.characters_for_syllable(pid) {
                candidates.push(CharCandidate::new(info.character, info.weight + take(info.character)));
            }
        }
        sort_top_n(&mut candidates, limit, |c| c.score);
        debug!(count = candidates.len(), "char candidates ranked");
        candidates
    }

    /// Words stored at or below `codes` in the trie, after `prefix`.
    ///
    /// The raw score `score * |codes| / (|full codes| + 1)` favors exact
    /// length matches; occurrences of the whole word in each sample then add
    /// `effectivity * ln(count + 1)`. With no codes the whole trie (bounded
    /// by `depth_limit`) is searched, unless the prefix is empty too.
    pub fn word_candidates(
        &self,
        words: &WordDictionary,
        prefix: &str,
        codes: &[Pid],
        limit: usize,
        depth_limit: usize,
    ) -> Vec<WordCandidate> {
        let _span = debug_span!("word_candidates", codes = codes.len(), limit, depth_limit).entered();
        if codes.is_empty() && prefix.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        let mut texts: Vec<Vec<char>> = Vec::new();
        let _ = words.trie().visit_prefix(codes, depth_limit, |full, &index| {
            if let Some(record) = words.get(index) {
                let score = record.score as f64 * codes.len() as f64 / (full.len() + 1) as f64;
                candidates.push(WordCandidate::new(record.text.clone(), full.to_vec(), score));
                texts.push(record.text.chars().collect());
            }
            ControlFlow::Continue(())
        });

        let prefix: Vec<char> = prefix.chars().collect();
        let (recent, older) = self.split_prefix(&prefix);
        let sources = self
            .samples
            .iter()
            .map(|s| (s.content.as_slice(), s.effectivity))
            .chain((!older.is_empty()).then_some((older, self.prefix_effectivity)));
        for (sample, effectivity) in sources {
            if sample.is_empty() {
                continue;
            }
            for (candidate, text) in candidates.iter_mut().zip(&texts) {
                candidate.score += effectivity * word_occurrence(sample, text, recent, &self.weights);
            }
        }

        sort_top_n(&mut candidates, limit, |c| c.score);
        debug!(count = candidates.len(), "word candidates ranked");
        candidates
    }
}
