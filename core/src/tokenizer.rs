// core/src/tokenizer.rs
//
// Segmentation of romanized text into phonetic codes, and the per-character
// code sets used on the candidate side of fuzzy matching.
//
// The segmenter is greedy with one character of back-off: it grows a token
// while it remains a syllable prefix, then commits the longest buffered
// syllable. The only look-ahead rule is the n/g coda split ("xian" + "ga"
// rather than "xiang" + "a"); other ambiguous boundaries are left to the
// greedy rule.

use crate::phonetic::{literal_char, literal_pid, Pid, PidSet, PidTone, PidToneSet};
use crate::table::PhoneticTable;

const CODA_FOLLOWERS: &[char] = &['a', 'e', 'i', 'o', 'u', 'v'];

/// Result of [`PhoneticTable::segment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Emitted codes, left to right.
    pub codes: Vec<Pid>,
    /// `offsets[k]` is the char offset in the input just past the text that
    /// produced `codes[k]`.
    pub offsets: Vec<usize>,
}

impl Segmentation {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn push(&mut self, pid: Pid, end: usize) {
        self.codes.push(pid);
        self.offsets.push(end);
    }

    /// Emit one literal per buffered character; the last one ends at `end`.
    fn push_literals(&mut self, token: &str, end: usize) {
        let mut remaining = token.chars().count();
        for c in token.chars() {
            remaining -= 1;
            self.push(literal_pid(c), end - remaining);
        }
    }
}

#[inline]
fn fold(c: char, ignore_case: bool) -> char {
    if ignore_case {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

impl PhoneticTable {
    /// Split romanized text into phonetic codes.
    ///
    /// Lowercase ASCII letters are grouped into syllables; every other
    /// character becomes a literal code, except `separator`, which only ends
    /// the pending syllable and is dropped. With `ignore_case`, ASCII
    /// uppercase letters are folded before anything is compared.
    pub fn segment(&self, text: &str, ignore_case: bool, separator: char) -> Segmentation {
        let input: Vec<char> = text.chars().map(|c| fold(c, ignore_case)).collect();
        let n = input.len();
        let mut out = Segmentation::default();
        let mut token = String::new();
        let mut in_token = false;

        let mut i = 0;
        while i < n {
            let c = input[i];
            if c.is_ascii_lowercase() {
                token.push(c);
                if self.is_syllable_prefix(&token) {
                    in_token = true;
                    i += 1;
                    continue;
                }
                if in_token {
                    // `c` broke the prefix: commit what came before it and
                    // look at `c` again on the next iteration.
                    token.pop();
                    match self.find_syllable(&token) {
                        Some(mut pid) => {
                            let mut end = i;
                            if let Some(shorter) = self.split_nasal_coda(&token, c) {
                                pid = shorter;
                                end = i - 1;
                            }
                            out.push(pid, end);
                            i = end;
                        }
                        None => out.push_literals(&token, i),
                    }
                    in_token = false;
                    token.clear();
                    continue;
                }
                if c != separator {
                    out.push(literal_pid(c), i + 1);
                }
                token.clear();
            } else {
                if in_token {
                    match self.find_syllable(&token) {
                        Some(pid) => out.push(pid, i),
                        None => out.push_literals(&token, i),
                    }
                    token.clear();
                    in_token = false;
                }
                if c != separator {
                    out.push(literal_pid(c), i + 1);
                }
            }
            i += 1;
        }

        if in_token {
            match self.find_syllable(&token) {
                Some(pid) => out.push(pid, n),
                None => {
                    let mut remaining = token.chars().count();
                    for c in token.chars() {
                        remaining -= 1;
                        if c != separator {
                            out.push(literal_pid(c), n - remaining);
                        }
                    }
                }
            }
        }
        out
    }

    /// The n/g coda rule: for a committed syllable ending in `n` or `g` that is
    /// followed by a vowel, prefer dropping the coda when both the coda+vowel
    /// and the remainder are syllables ("xiang"+"a" → "xian"+"ga").
    fn split_nasal_coda(&self, token: &str, next: char) -> Option<Pid> {
        if token.len() < 2 || !CODA_FOLLOWERS.contains(&next) {
            return None;
        }
        let coda = token.chars().last()?;
        if coda != 'n' && coda != 'g' {
            return None;
        }
        let mut onset = String::with_capacity(2);
        onset.push(coda);
        onset.push(next);
        if !self.is_syllable(&onset) {
            return None;
        }
        self.find_syllable(&token[..token.len() - 1])
    }

    /// Syllable names of [`segment`](Self::segment), literals as themselves.
    pub fn split_names(&self, text: &str, ignore_case: bool, separator: char) -> Vec<String> {
        self.segment(text, ignore_case, separator)
            .codes
            .iter()
            .map(|&pid| self.code_to_name(pid))
            .collect()
    }

    /// Join the names of `codes` with `separator`.
    pub fn join_names(&self, codes: &[Pid], separator: char) -> String {
        let mut out = String::new();
        for (i, &pid) in codes.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(&self.code_to_name(pid));
        }
        out
    }

    /// Per-character code sets of arbitrary text: every syllable of the
    /// character, followed by the character's own literal code.
    pub fn script_to_phonetic_sets(&self, text: &str, ignore_case: bool) -> Vec<PidSet> {
        text.chars()
            .map(|c| {
                let c = fold(c, ignore_case);
                let mut set = self.syllables_for_character(c);
                set.push(literal_pid(c));
                set
            })
            .collect()
    }

    /// Toned variant of [`script_to_phonetic_sets`](Self::script_to_phonetic_sets);
    /// the literal code carries tone 0.
    pub fn script_to_phonetic_sets_toned(&self, text: &str, ignore_case: bool) -> Vec<PidToneSet> {
        text.chars()
            .map(|c| {
                let c = fold(c, ignore_case);
                let mut set = self
                    .syllables_for_character_toned(c)
                    .cloned()
                    .unwrap_or_default();
                set.push(PidTone::new(literal_pid(c), 0));
                set
            })
            .collect()
    }

    /// Readings of each character as names; characters without a reading
    /// map to themselves.
    pub fn script_to_names(&self, text: &str) -> Vec<Vec<String>> {
        text.chars()
            .map(|c| match self.syllables_for_character_toned(c) {
                Some(set) if !set.is_empty() => {
                    set.iter().map(|p| self.code_to_name(p.pid)).collect()
                }
                _ => vec![c.to_string()],
            })
            .collect()
    }
}

/// Reassemble the text a segmentation covers (separators excluded).
pub fn reassemble(table: &PhoneticTable, codes: &[Pid]) -> String {
    codes
        .iter()
        .map(|&pid| {
            if pid < 0 {
                literal_char(pid).to_string()
            } else {
                table.code_to_name(pid)
            }
        })
        .collect()
}
