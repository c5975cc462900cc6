//! Resource loading: text tables and the bincode dictionary resource.
//!
//! Two text formats are understood:
//! - characters: `codepoint,frequency,py1/py2 ...` with the codepoint in
//!   decimal and pronunciations separated by `/` or whitespace, each with an
//!   optional trailing tone digit
//! - words: `word<TAB>py1 py2 ...[<TAB>score]`, `#` starts a comment line
//!
//! Either way the result is a [`DictionarySource`], which is also what the
//! bincode resource stores.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

use ahash::AHashSet;
use pinyinkit_core::phonetic::split_tone;
use pinyinkit_core::{CharEntry, Config, DictionarySource, PhoneticTable, WordDictionary, WordEntry};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("resource encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}

fn parse_error(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_pinyin<'a, I>(tokens: I) -> Vec<(String, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(|t| {
            let (name, tone) = split_tone(t);
            (name.to_string(), tone)
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Read a character table.
///
/// Syllables are collected in first-seen order, which fixes their codes.
pub fn load_chars_csv<R: BufRead>(reader: R) -> Result<DictionarySource, LoadError> {
    let mut source = DictionarySource::new();
    let mut seen: AHashSet<String> = AHashSet::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.splitn(3, ',');
        let code_field = fields.next().unwrap_or("").trim();
        let codepoint: u32 = code_field
            .parse()
            .map_err(|_| parse_error(line_no, format!("bad codepoint {code_field:?}")))?;
        let character = char::from_u32(codepoint)
            .ok_or_else(|| parse_error(line_no, format!("codepoint {codepoint} is not a character")))?;

        let freq_field = fields
            .next()
            .ok_or_else(|| parse_error(line_no, "missing frequency"))?
            .trim();
        let frequency: u32 = if freq_field.is_empty() {
            0
        } else {
            freq_field
                .parse()
                .map_err(|_| parse_error(line_no, format!("bad frequency {freq_field:?}")))?
        };

        let pinyin = parse_pinyin(
            fields
                .next()
                .unwrap_or("")
                .split(|c: char| c == '/' || c.is_whitespace()),
        );
        for (name, _) in &pinyin {
            if seen.insert(name.clone()) {
                source.syllables.push(name.clone());
            }
        }
        source.characters.push(CharEntry {
            character,
            frequency,
            pinyin,
        });
    }

    info!(
        characters = source.characters.len(),
        syllables = source.syllables.len(),
        "loaded character table"
    );
    Ok(source)
}

/// Read a word list.
///
/// Rows without pronunciation are skipped with a warning; a malformed score
/// is an error.
pub fn load_words<R: BufRead>(reader: R) -> Result<Vec<WordEntry>, LoadError> {
    let mut words = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split('\t');
        let text = fields.next().unwrap_or("").trim();
        let pinyin = parse_pinyin(fields.next().unwrap_or("").split_whitespace());
        if text.is_empty() || pinyin.is_empty() {
            warn!(line = line_no, "skipping word row without text or pronunciation");
            continue;
        }
        let score = match fields.next().map(str::trim) {
            Some(s) if !s.is_empty() => Some(
                s.parse::<f32>()
                    .map_err(|_| parse_error(line_no, format!("bad score {s:?}")))?,
            ),
            _ => None,
        };
        words.push(WordEntry {
            text: text.to_string(),
            pinyin,
            score,
        });
    }
    info!(words = words.len(), "loaded word list");
    Ok(words)
}

/// Read a character table and an optional word list from disk.
pub fn load_text_files<P: AsRef<Path>>(chars: P, words: Option<P>) -> Result<DictionarySource, LoadError> {
    let mut source = load_chars_csv(BufReader::new(File::open(chars)?))?;
    if let Some(words) = words {
        source.words = load_words(BufReader::new(File::open(words)?))?;
    }
    Ok(source)
}

pub fn load_resource<P: AsRef<Path>>(path: P) -> Result<DictionarySource, LoadError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let source: DictionarySource = bincode::deserialize_from(reader)?;
    info!(
        path = %path.as_ref().display(),
        characters = source.characters.len(),
        words = source.words.len(),
        "loaded dictionary resource"
    );
    Ok(source)
}

pub fn save_resource<P: AsRef<Path>>(path: P, source: &DictionarySource) -> Result<(), LoadError> {
    let writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(writer, source)?;
    Ok(())
}

/// Phonetic table and word dictionary built from one source.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub table: PhoneticTable,
    pub words: WordDictionary,
}

impl Dictionary {
    pub fn from_source(source: &DictionarySource, config: &Config) -> Self {
        let table = PhoneticTable::from_source(source, config);
        let words = WordDictionary::from_source(&table, source);
        Self { table, words }
    }

    pub fn from_resource<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self, LoadError> {
        Ok(Self::from_source(&load_resource(path)?, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chars_csv_assigns_codes_in_first_seen_order() {
        let csv = "23567,146,xiao3\n# comment\n\n30340,900,de/di2 di4\n19968,500,\n";
        let source = load_chars_csv(csv.as_bytes()).unwrap();
        assert_eq!(source.syllables, vec!["xiao", "de", "di"]);
        assert_eq!(source.characters.len(), 3);
        assert_eq!(source.characters[0].character, '小');
        assert_eq!(source.characters[1].pinyin, vec![("de".to_string(), 0), ("di".to_string(), 2), ("di".to_string(), 4)]);
        assert!(source.characters[2].pinyin.is_empty());
    }

    #[test]
    fn chars_csv_reports_bad_rows() {
        let err = load_chars_csv("23567,146,xiao3\nabc,1,a\n".as_bytes()).unwrap_err();
        match err {
            LoadError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other}"),
        }
        assert!(matches!(
            load_chars_csv("23567\n".as_bytes()),
            Err(LoadError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn words_parse_with_optional_score() {
        let text = "# words\n朋友\tpeng2 you3\t6.5\n小朋友\txiao3 peng2 you3\n坏行\t\n";
        let words = load_words(text.as_bytes()).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].score, Some(6.5));
        assert_eq!(words[1].score, None);
        assert_eq!(words[1].pinyin.len(), 3);
        assert!(load_words("朋友\tpeng you\tbad\n".as_bytes()).is_err());
    }
}
