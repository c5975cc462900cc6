//! Fuzzy matching by longest common subsequence.
//!
//! A candidate string is turned into one code set per character (every
//! pronunciation plus the character itself as a literal); a typed query is
//! segmented into codes. The alignment is a plain LCS where a candidate
//! position matches a query code when the code is in its set. Matched
//! positions are then scored for locality: tight, left-aligned,
//! length-complete matches score highest.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidate::sort_top_n;
use crate::phonetic::{Pid, PidSet};
use crate::table::PhoneticTable;

/// One scored candidate of a batch match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Position of the candidate in the batch (or the logical id index for
    /// aliased matches).
    pub index: usize,
    /// In `(0, 1]`; zero scores are never reported.
    pub score: f64,
    /// Matched candidate positions, ascending.
    pub highlights: Vec<usize>,
}

/// A search hit with its candidate text already wrapped in highlight markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightMatch {
    pub index: usize,
    pub score: f64,
    pub text: String,
}

/// LCS alignment of `candidate` against `query` using `matches` as the
/// position equality. Returns matched candidate positions in ascending order.
pub fn lcs_by<A, B, F>(candidate: &[A], query: &[B], matches: F) -> Vec<usize>
where
    F: Fn(&A, &B) -> bool,
{
    let l1 = candidate.len();
    let l2 = query.len();
    let width = l2 + 1;
    let mut dp = vec![0usize; (l1 + 1) * width];
    for i in 0..l1 {
        for j in 0..l2 {
            dp[(i + 1) * width + j + 1] = if matches(&candidate[i], &query[j]) {
                dp[i * width + j] + 1
            } else {
                dp[i * width + j + 1].max(dp[(i + 1) * width + j])
            };
        }
    }

    // Ties prefer skipping a candidate position, then a query position.
    let mut positions = Vec::new();
    let (mut i, mut j) = (l1, l2);
    while i > 0 && j > 0 {
        let here = dp[i * width + j];
        if here == dp[(i - 1) * width + j] {
            i -= 1;
        } else if here == dp[i * width + j - 1] {
            j -= 1;
        } else {
            positions.push(i - 1);
            i -= 1;
            j -= 1;
        }
    }
    positions.reverse();
    positions
}

/// Align per-position code sets against a code query (set membership).
pub fn match_phonetic(candidate: &[PidSet], query: &[Pid]) -> Vec<usize> {
    lcs_by(candidate, query, |set, pid| set.contains(pid))
}

/// Align two scalar sequences (plain equality).
pub fn match_scalar<T: PartialEq>(candidate: &[T], query: &[T]) -> Vec<usize> {
    lcs_by(candidate, query, |a, b| a == b)
}

/// Locality score of a match, in `(0, 1]`, or 0 for an empty match.
///
/// The denominator is one plus the squared gaps between consecutive matched
/// positions. When both lengths are non-zero it also includes the squared
/// shortfall against the query length (plus one), the leading gap and the
/// trailing gap.
pub fn match_score(positions: &[usize], candidate_len: usize, expected_len: usize) -> f64 {
    let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
        return 0.0;
    };
    let mut penalty: f64 = 1.0;
    for pair in positions.windows(2) {
        let gap = (pair[1] - pair[0]) as f64;
        penalty += gap * gap;
    }
    if candidate_len != 0 && expected_len != 0 {
        let shortfall = expected_len as f64 - positions.len() as f64 + 1.0;
        penalty += shortfall * shortfall;
        penalty += first as f64;
        penalty += candidate_len.saturating_sub(1 + last) as f64;
    }
    1.0 / penalty
}

/// Match every candidate against `query`, dropping zero scores.
pub fn batch_match(candidates: &[Vec<PidSet>], query: &[Pid]) -> Vec<MatchResult> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, sets)| {
            let highlights = match_phonetic(sets, query);
            let score = match_score(&highlights, sets.len(), query.len());
            (score > 0.0).then_some(MatchResult {
                index,
                score,
                highlights,
            })
        })
        .collect()
}

/// Match alias strings that belong to logical ids and keep the best alias
/// per id.
///
/// `targets[k]` is the id index of `aliases[k]`. Results are in order of
/// first appearance; a later alias replaces an earlier one only with a
/// strictly higher score. `MatchResult::index` is the id index.
pub fn aliased_batch_match(aliases: &[Vec<PidSet>], targets: &[usize], query: &[Pid]) -> Vec<MatchResult> {
    let mut unique: Vec<MatchResult> = Vec::new();
    let mut seen: AHashMap<usize, usize> = AHashMap::new();
    for mut m in batch_match(aliases, query) {
        let Some(&target) = targets.get(m.index) else {
            continue;
        };
        m.index = target;
        match seen.get(&target) {
            Some(&slot) => {
                if m.score > unique[slot].score {
                    unique[slot] = m;
                }
            }
            None => {
                seen.insert(target, unique.len());
                unique.push(m);
            }
        }
    }
    unique
}

/// Wrap each run of matched positions of `text` in `begin`/`end`.
pub fn render_highlight(text: &[char], positions: &[usize], begin: &str, end: &str) -> String {
    let mut active = vec![false; text.len()];
    for &p in positions {
        if let Some(slot) = active.get_mut(p) {
            *slot = true;
        }
    }
    let mut out = String::new();
    let mut open = false;
    for (&c, &on) in text.iter().zip(&active) {
        if on && !open {
            out.push_str(begin);
        } else if !on && open {
            out.push_str(end);
        }
        open = on;
        out.push(c);
    }
    if open {
        out.push_str(end);
    }
    out
}

/// Table-backed fuzzy search over candidate strings.
///
/// Queries are segmented case-insensitively with `' '` as the separator;
/// candidates are expanded with [`PhoneticTable::script_to_phonetic_sets`].
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher<'a> {
    table: &'a PhoneticTable,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(table: &'a PhoneticTable) -> Self {
        Self { table }
    }

    fn query_codes(&self, query: &str) -> Vec<Pid> {
        self.table.segment(query, true, ' ').codes
    }

    fn expand<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<Vec<PidSet>> {
        candidates
            .iter()
            .map(|c| self.table.script_to_phonetic_sets(c.as_ref(), true))
            .collect()
    }

    /// Indices of the best `limit` candidates, best first.
    pub fn search<S: AsRef<str>>(&self, candidates: &[S], query: &str, limit: usize) -> Vec<usize> {
        let query = self.query_codes(query);
        let mut matches = batch_match(&self.expand(candidates), &query);
        debug!(candidates = candidates.len(), hits = matches.len(), "fuzzy search");
        sort_top_n(&mut matches, limit, |m| m.score);
        matches.into_iter().map(|m| m.index).collect()
    }

    /// Ids of the best `limit` entries, each entry matched through its
    /// best-scoring alias.
    pub fn aliased_search<Id, S>(&self, entries: &[(Id, Vec<S>)], query: &str, limit: usize) -> Vec<Id>
    where
        Id: Clone,
        S: AsRef<str>,
    {
        let query = self.query_codes(query);
        let mut aliases = Vec::new();
        let mut targets = Vec::new();
        for (i, (_, names)) in entries.iter().enumerate() {
            for name in names {
                aliases.push(self.table.script_to_phonetic_sets(name.as_ref(), true));
                targets.push(i);
            }
        }
        let mut matches = aliased_batch_match(&aliases, &targets, &query);
        debug!(entries = entries.len(), aliases = aliases.len(), hits = matches.len(), "aliased search");
        sort_top_n(&mut matches, limit, |m| m.score);
        matches
            .into_iter()
            .map(|m| entries[m.index].0.clone())
            .collect()
    }

    /// Best `limit` candidates with matched characters wrapped in
    /// `begin`/`end`.
    pub fn highlight_search<S: AsRef<str>>(
        &self,
        candidates: &[S],
        query: &str,
        limit: usize,
        begin: &str,
        end: &str,
    ) -> Vec<HighlightMatch> {
        let query = self.query_codes(query);
        let mut matches = batch_match(&self.expand(candidates), &query);
        sort_top_n(&mut matches, limit, |m| m.score);
        matches
            .into_iter()
            .map(|m| {
                let chars: Vec<char> = candidates[m.index].as_ref().chars().collect();
                HighlightMatch {
                    index: m.index,
                    score: m.score,
                    text: render_highlight(&chars, &m.highlights, begin, end),
                }
            })
            .collect()
    }
}
