//! Candidate types produced by the ranker.
//!
//! This module provides:
//! - `CharCandidate`: a single character with its score
//! - `WordCandidate`: a dictionary word with the codes it was found under
//! - `sort_top_n`: partial selection of the best-scoring entries

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::phonetic::Pid;

/// A single character candidate. Higher scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharCandidate {
    pub character: char,
    pub score: f64,
}

impl CharCandidate {
    pub fn new(character: char, score: f64) -> Self {
        CharCandidate { character, score }
    }
}

/// A word candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCandidate {
    pub text: String,
    /// Full code sequence of the trie node the word was stored at; may be
    /// longer than the typed codes.
    pub pinyin: Vec<Pid>,
    pub score: f64,
}

impl WordCandidate {
    pub fn new<T: Into<String>>(text: T, pinyin: Vec<Pid>, score: f64) -> Self {
        WordCandidate {
            text: text.into(),
            pinyin,
            score,
        }
    }
}

/// Keep the `n` entries with the highest `key`, sorted descending.
///
/// This is a true top-k: the result equals the first `n` entries of a full
/// descending sort, up to the order of ties.
pub fn sort_top_n<T, F>(items: &mut Vec<T>, n: usize, key: F)
where
    F: Fn(&T) -> f64,
{
    let n = n.min(items.len());
    if n == 0 {
        items.clear();
        return;
    }
    let cmp = |a: &T, b: &T| -> Ordering { key(b).total_cmp(&key(a)) };
    if n < items.len() {
        items.select_nth_unstable_by(n - 1, &cmp);
        items.truncate(n);
    }
    items.sort_by(&cmp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_matches_full_sort() {
        let scores = [3.0, 9.5, -1.0, 4.25, 9.0, 0.0, 7.0];
        for n in 0..=scores.len() + 1 {
            let mut items: Vec<f64> = scores.to_vec();
            sort_top_n(&mut items, n, |x| *x);

            let mut full = scores.to_vec();
            full.sort_by(|a, b| b.total_cmp(a));
            full.truncate(n);
            assert_eq!(items, full, "n = {n}");
        }
    }

    #[test]
    fn sorts_candidates_by_score() {
        let mut cands = vec![
            CharCandidate::new('晓', 3.0),
            CharCandidate::new('小', 5.0),
            CharCandidate::new('笑', 4.0),
        ];
        sort_top_n(&mut cands, 2, |c| c.score);
        let chars: Vec<char> = cands.iter().map(|c| c.character).collect();
        assert_eq!(chars, vec!['小', '笑']);
    }
}
