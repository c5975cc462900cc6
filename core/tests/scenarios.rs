//! End-to-end ranking and search scenarios over a small hand-built dictionary.

use pinyinkit_core::{
    CandidateRanker, Config, DictionarySource, FuzzyMatcher, PhoneticTable, WordDictionary,
};

fn fixture() -> (PhoneticTable, WordDictionary) {
    let mut src = DictionarySource::new();
    src.syllables = [
        "a", "cai", "dao", "de", "huang", "huo", "liu", "ma", "man", "men", "peng", "song", "wo",
        "xiao", "you",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    src.push_char('小', 146, &["xiao3"]);
    src.push_char('晓', 20, &["xiao3"]);
    src.push_char('笑', 90, &["xiao4"]);
    src.push_char('朋', 10, &["peng2"]);
    src.push_char('蓬', 200, &["peng2"]);
    src.push_char('友', 40, &["you3"]);
    src.push_char('松', 30, &["song1"]);
    src.push_char('妈', 60, &["ma1"]);
    src.push_char('马', 80, &["ma3"]);
    src.push_char('的', 900, &["de", "di2", "di4"]);
    src.push_char('菜', 30, &["cai4"]);
    src.push_char('刀', 25, &["dao1"]);
    src.push_char('硫', 5, &["liu2"]);
    src.push_char('磺', 3, &["huang2"]);
    src.push_char('火', 70, &["huo3"]);
    src.push_char('我', 500, &["wo3"]);
    src.push_char('们', 400, &["men"]);

    src.push_word("朋友", &["peng2", "you3"], Some(6.0));
    src.push_word("蓬松", &["peng2", "song1"], Some(8.0));
    src.push_word("小朋友", &["xiao3", "peng2", "you3"], None);
    src.push_word("我们", &["wo3", "men"], Some(9.0));

    let table = PhoneticTable::from_source(&src, &Config::default());
    let words = WordDictionary::from_source(&table, &src);
    (table, words)
}

#[test]
fn test_character_lookup_and_frequency_ranking() {
    let (table, _) = fixture();
    let ranker = CandidateRanker::default();

    let xiao = table.syllable_to_code("xiao");
    assert!(xiao >= 0);
    assert!(table
        .characters_for_syllable(xiao)
        .iter()
        .any(|c| c.character == '小'));

    // No samples: ranking is by static weight only.
    let cands = ranker.char_candidates(&table, "", xiao, 10);
    let chars: Vec<char> = cands.iter().map(|c| c.character).collect();
    assert_eq!(chars, vec!['小', '笑', '晓']);
    assert_eq!(cands[0].score, table.frequency_of('小'));
    assert!((cands[0].score - 148f64.ln()).abs() < 1e-9);
}

#[test]
fn test_aliased_search_prefers_best_alias() {
    let (table, _) = fixture();
    let matcher = FuzzyMatcher::new(&table);
    let entries = vec![
        (118, vec!["硫磺火"]),
        (115, vec!["小妈刀"]),
        (114, vec!["妈刀", "妈妈的菜刀"]),
    ];

    assert_eq!(
        table.split_names("mamadecaidao", true, ' '),
        vec!["ma", "ma", "de", "cai", "dao"]
    );
    let ids = matcher.aliased_search(&entries, "mamadecaidao", usize::MAX);
    assert_eq!(ids, vec![114, 115]);
}

#[test]
fn test_highlight_search_marks_matched_characters() {
    let (table, _) = fixture();
    let matcher = FuzzyMatcher::new(&table);
    let hits = matcher.highlight_search(&["硫磺火", "妈妈的菜刀"], "caidao", 5, "<em>", "</em>");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].index, 1);
    assert_eq!(hits[0].text, "妈妈的<em>菜刀</em>");
}

#[test]
fn test_search_accepts_literal_text() {
    let (table, _) = fixture();
    let matcher = FuzzyMatcher::new(&table);
    // Characters also match themselves as literal codes.
    let found = matcher.search(&["火车", "我们的火"], "火", 10);
    assert_eq!(found, vec![0, 1]);
}

#[test]
fn test_sample_lifts_character_after_prefix() {
    let (table, _) = fixture();
    let mut ranker = CandidateRanker::default();
    ranker.add_sample_string("我们小朋友", 5.0);

    let peng = table.syllable_to_code("peng");
    let cands = ranker.char_candidates(&table, "我们小", peng, 10);
    assert_eq!(cands[0].character, '朋');
    assert!(table.frequency_of('朋') < table.frequency_of('蓬'));
}

#[test]
fn test_word_candidates_blend_dictionary_and_samples() {
    let (table, words) = fixture();
    let peng = table.syllable_to_code("peng");
    let mut ranker = CandidateRanker::default();

    let plain = ranker.word_candidates(&words, "", &[peng], 10, 2);
    let texts: Vec<&str> = plain.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["蓬松", "朋友"]);
    assert!((plain[0].score - 8.0 / 3.0).abs() < 1e-6);

    ranker.add_sample_string("我们小朋友", 5.0);
    let ranked = ranker.word_candidates(&words, "我们小", &[peng], 10, 2);
    assert_eq!(ranked[0].text, "朋友");
    assert_eq!(ranked[0].pinyin.len(), 2);
}

#[test]
fn test_word_candidates_exact_length_preferred() {
    let (table, words) = fixture();
    let codes = vec![table.syllable_to_code("wo"), table.syllable_to_code("men")];
    let ranker = CandidateRanker::default();
    let cands = ranker.word_candidates(&words, "", &codes, 10, 2);
    assert_eq!(cands.len(), 1);
    assert!((cands[0].score - 9.0 * 2.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_empty_query_yields_nothing() {
    let (table, words) = fixture();
    let ranker = CandidateRanker::default();
    assert!(ranker.word_candidates(&words, "", &[], 10, 2).is_empty());
    // With a prefix the whole trie is searched, but empty codes give zero raw
    // score.
    let all = ranker.word_candidates(&words, "我", &[], 10, 3);
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|c| c.score == 0.0));
    assert!(table.segment("", false, ' ').is_empty());
}

#[test]
fn test_code_past_table_end_has_no_characters() {
    let (table, _) = fixture();
    let mut ranker = CandidateRanker::default();
    ranker.add_sample_string("我们小朋友", 1.0);

    let past_end = table.code_limit();
    assert_eq!(table.code_to_name(past_end), "");
    assert!(ranker.char_candidates(&table, "我们", past_end, 10).is_empty());
    assert!(ranker.char_candidates(&table, "", past_end + 100, 10).is_empty());

    // Literal codes still resolve to their own character.
    let literal = ranker.char_candidates(&table, "我们", pinyinkit_core::literal_pid('小'), 10);
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].character, '小');
    assert!(literal[0].score > 0.0);
}

#[test]
fn test_custom_words_join_candidates() {
    let (table, mut words) = fixture();
    words.add_custom_words(&table, &[("ma dao", "马刀")], 1.0);
    let codes = table.segment("madao", false, ' ').codes;
    let ranker = CandidateRanker::default();
    let cands = ranker.word_candidates(&words, "", &codes, 10, 2);
    assert_eq!(cands.len(), 1);
    assert_eq!(cands[0].text, "马刀");
}
