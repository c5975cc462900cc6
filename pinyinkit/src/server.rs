//! Input session front end.
//!
//! `PinyinServer` owns the dictionary, the englify codec and the ranker, and
//! turns raw keystrokes plus the text already committed before the cursor
//! into a ranked candidate list.

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, info};

use pinyinkit_core::phonetic::is_literal;
use pinyinkit_core::utils::{chinese_english_fraction, is_chinese_character, is_english_character, is_english_punctuation, normalize};
use pinyinkit_core::{literal_char, CandidateRanker, FuzzyMatcher, HighlightMatch, Pid, PhoneticTable, Segmentation};

use crate::config::ServerConfig;
use crate::englify::Englify;
use crate::loader::Dictionary;

/// One entry in an input result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    /// Englify tokens that select `text` directly.
    pub token: String,
    pub score: f64,
    /// Bytes of pending input (after `fixed_consumed`) this candidate replaces.
    pub eat_bytes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputResult {
    pub candidates: Vec<Candidate>,
    /// Characters decoded from englify tokens at the start of the input.
    pub fixed_prefix: String,
    /// Input bytes covered by `fixed_prefix`.
    pub fixed_consumed: usize,
}

pub struct PinyinServer {
    config: ServerConfig,
    dictionary: Dictionary,
    englify: Englify,
    ranker: CandidateRanker,
    cache: Option<RefCell<LruCache<String, Segmentation>>>,
}

impl PinyinServer {
    pub fn new(dictionary: Dictionary, config: ServerConfig) -> Self {
        let englify = Englify::new(&dictionary.table);
        let ranker = CandidateRanker::new(config.base());
        let cache = NonZeroUsize::new(config.max_cache_size).map(|cap| RefCell::new(LruCache::new(cap)));
        info!(
            syllables = dictionary.table.code_limit(),
            words = dictionary.words.len(),
            tokens = englify.len(),
            "pinyin server ready"
        );
        Self {
            config,
            dictionary,
            englify,
            ranker,
            cache,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn table(&self) -> &PhoneticTable {
        &self.dictionary.table
    }

    pub fn englify(&self) -> &Englify {
        &self.englify
    }

    pub fn ranker(&self) -> &CandidateRanker {
        &self.ranker
    }

    pub fn ranker_mut(&mut self) -> &mut CandidateRanker {
        &mut self.ranker
    }

    /// Register a text sample (NFC-normalized) for context ranking.
    pub fn on_load_sample(&mut self, text: &str, factor: f64) {
        let text = normalize(text);
        if text.is_empty() {
            return;
        }
        debug!(chars = text.chars().count(), factor, "sample loaded");
        self.ranker.add_sample_string(&text, factor);
    }

    /// Add words from `ni hao=你好` lines. Lines without `=` or with an empty
    /// word are ignored.
    pub fn on_define_words(&mut self, text: &str, factor: f64) {
        let pairs: Vec<(&str, &str)> = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .filter(|(_, word)| !word.is_empty())
            .collect();
        let before = self.dictionary.words.len();
        self.dictionary
            .words
            .add_custom_words(&self.dictionary.table, &pairs, factor);
        info!(added = self.dictionary.words.len() - before, "custom words defined");
    }

    fn segment_cached(&self, rest: &str) -> Segmentation {
        let separator = self.config.input_separator;
        let Some(cache) = &self.cache else {
            return self.dictionary.table.segment(rest, false, separator);
        };
        if let Some(seg) = cache.borrow_mut().get(rest) {
            return seg.clone();
        }
        let seg = self.dictionary.table.segment(rest, false, separator);
        cache.borrow_mut().put(rest.to_string(), seg.clone());
        seg
    }

    /// Rank candidates for `input` typed after the committed text `prefix`.
    ///
    /// Englify tokens at the start of `input` are decoded first and reported
    /// as `fixed_prefix`. With nothing left to convert, the next character is
    /// suggested from the samples (only after a CJK character). Otherwise the
    /// rest is segmented and, if it looks like pinyin rather than English,
    /// one code yields characters while several yield words followed by the
    /// characters of the first code.
    pub fn on_input(&self, prefix: &str, input: &str, limit: usize) -> InputResult {
        let _span = debug_span!("on_input", input, limit).entered();
        let mut result = InputResult::default();

        let decoded = self.englify.decode(input);
        let past = &decoded.text[..decoded.decoded_len];
        let rest = &decoded.text[decoded.decoded_len..];
        let context = format!("{prefix}{past}");

        if rest.is_empty() {
            if context.chars().last().is_some_and(is_chinese_character) {
                result.fixed_prefix = past.to_string();
                result.fixed_consumed = decoded.consumed;
                let chinese_only = self.config.base.chinese_only_suggestions;
                for c in self.ranker.suggest_char_candidates(&context, limit, chinese_only) {
                    result.candidates.push(Candidate {
                        text: c.character.to_string(),
                        token: self.englify.char_to_token(c.character),
                        score: c.score,
                        eat_bytes: 0,
                    });
                }
            }
            return result;
        }

        let seg = self.segment_cached(rest);
        if seg.is_empty() || !self.seems_pinyin(&context, &seg.codes) {
            debug!(codes = seg.len(), "input does not look like pinyin");
            return result;
        }
        result.fixed_prefix = past.to_string();
        result.fixed_consumed = decoded.consumed;

        let bounds: Vec<usize> = rest
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(rest.len()))
            .collect();
        let ends: Vec<usize> = seg
            .offsets
            .iter()
            .map(|&o| bounds.get(o).copied().unwrap_or(rest.len()))
            .collect();

        let mut codes = seg.codes;
        if codes.len() > 1 {
            self.push_words(&mut result, &context, &codes, &ends, limit);
            if result.candidates.is_empty() && limit != 0 && codes.len() > 2 {
                codes.pop();
                self.push_words(&mut result, &context, &codes, &ends, limit);
            }
        }
        self.push_chars(&mut result, &context, codes[0], ends[0], limit);
        debug!(count = result.candidates.len(), "input candidates");
        result
    }

    fn push_chars(&self, result: &mut InputResult, context: &str, pid: Pid, eat_bytes: usize, limit: usize) {
        let remaining = limit.saturating_sub(result.candidates.len());
        if remaining == 0 {
            return;
        }
        for c in self
            .ranker
            .char_candidates(&self.dictionary.table, context, pid, remaining)
        {
            result.candidates.push(Candidate {
                text: c.character.to_string(),
                token: self.englify.char_to_token_for(c.character, pid),
                score: c.score,
                eat_bytes,
            });
        }
    }

    fn push_words(&self, result: &mut InputResult, context: &str, codes: &[Pid], ends: &[usize], limit: usize) {
        let remaining = limit.saturating_sub(result.candidates.len());
        if remaining == 0 {
            return;
        }
        let eat_bytes = ends[(codes.len() - 1).min(ends.len() - 1)];
        let depth = self.config.base.word_depth_limit;
        for w in self
            .ranker
            .word_candidates(&self.dictionary.words, context, codes, remaining, depth)
        {
            result.candidates.push(Candidate {
                token: self.englify.encode_word(&w.text, &w.pinyin),
                text: w.text,
                score: w.score,
                eat_bytes,
            });
        }
    }

    /// Decide whether a segmented input is pinyin or English typed with the
    /// IME on.
    ///
    /// Mostly-English context raises the bar. Literal letters weigh heavily
    /// against, punctuation less so; long syllables, initials like `zh` and
    /// typical two-letter finals weigh in favor.
    fn seems_pinyin(&self, context: &str, codes: &[Pid]) -> bool {
        let (cn, en) = chinese_english_fraction(context);
        let mut tendency: i64 = 0;
        if cn * 2 > en * 3 {
            tendency -= 1;
        } else if en * 2 > cn * 3 {
            tendency += 1;
        }
        if cn > en * 3 {
            tendency -= 2;
        } else if en > cn * 4 {
            tendency += 1;
        }
        if en > cn * 8 {
            tendency += 1;
        }

        let mut pinyin: i64 = 0;
        let mut special: i64 = 0;
        for &pid in codes {
            if is_literal(pid) {
                let c = literal_char(pid);
                if c == ' ' || c == '_' {
                    continue;
                }
                special += if is_english_character(c) {
                    34
                } else if is_english_punctuation(c) {
                    4
                } else {
                    1
                };
                continue;
            }

            let name = self.dictionary.table.code_to_name(pid);
            let bytes = name.as_bytes();
            let mut len = bytes.len() as i64;
            if len >= 2 {
                let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
                if b"wxyzgqjy".contains(&first) {
                    len += 1;
                }
                if len == 2 && b"iuv".contains(&last) {
                    pinyin += 10;
                }
                if len == 2 && b"ao".contains(&last) {
                    pinyin += 8;
                }
                if len >= 3 && b"zcs".contains(&first) && bytes[1] == b'h' {
                    len += 1;
                    pinyin += 6;
                }
            }
            pinyin += len * 10;
            if len >= 5 {
                pinyin += 12;
            } else if len >= 4 {
                pinyin += 7;
            }
            special += match len {
                ..=1 => 8,
                2 => 5,
                3 => 2,
                _ => 0,
            };
        }
        debug!(tendency, pinyin, special, "pinyin likeness");
        pinyin != 0 && special * (5 + tendency) < pinyin + 13
    }

    /// Indices of `candidates` matching `query`, best first.
    pub fn on_search<S: AsRef<str>>(&self, candidates: &[S], query: &str, limit: usize) -> Vec<usize> {
        FuzzyMatcher::new(&self.dictionary.table).search(candidates, query, limit)
    }

    /// Ids whose best alias matches `query`, best first.
    pub fn on_aliased_search<Id: Clone, S: AsRef<str>>(
        &self,
        entries: &[(Id, Vec<S>)],
        query: &str,
        limit: usize,
    ) -> Vec<Id> {
        FuzzyMatcher::new(&self.dictionary.table).aliased_search(entries, query, limit)
    }

    /// Matches with the matched characters wrapped in the configured
    /// highlight markers.
    pub fn on_highlight_search<S: AsRef<str>>(&self, candidates: &[S], query: &str, limit: usize) -> Vec<HighlightMatch> {
        let base = self.config.base();
        FuzzyMatcher::new(&self.dictionary.table).highlight_search(
            candidates,
            query,
            limit,
            &base.highlight_begin,
            &base.highlight_end,
        )
    }
}
