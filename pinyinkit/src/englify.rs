//! ASCII tokens for characters.
//!
//! Every character of a syllable gets a token made of the syllable name and
//! its 1-based position in that syllable's character list (`xiao1`, `xiao2`,
//! ...). Typed input can then carry already-chosen characters as plain
//! letters and digits.

use ahash::AHashMap;
use pinyinkit_core::{Pid, PhoneticTable};

/// Result of [`Englify::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    /// Input with every known token replaced by its character.
    pub text: String,
    /// Input byte offset just past the last replaced token.
    pub consumed: usize,
    /// Byte length of `text` up to and including the last replaced character.
    pub decoded_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Englify {
    token_to_char: AHashMap<String, char>,
    char_to_token: AHashMap<char, String>,
    char_code_to_token: AHashMap<(char, Pid), String>,
}

impl Englify {
    pub fn new(table: &PhoneticTable) -> Self {
        let mut englify = Self::default();
        for pid in 0..table.code_limit() {
            let name = table.code_to_name(pid);
            for (n, info) in table.characters_for_syllable(pid).iter().enumerate() {
                let token = format!("{name}{}", n + 1);
                englify.token_to_char.entry(token.clone()).or_insert(info.character);
                englify.char_to_token.entry(info.character).or_insert_with(|| token.clone());
                englify.char_code_to_token.entry((info.character, pid)).or_insert(token);
            }
        }
        englify
    }

    pub fn len(&self) -> usize {
        self.token_to_char.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_char.is_empty()
    }

    pub fn token_to_char(&self, token: &str) -> Option<char> {
        self.token_to_char.get(token).copied()
    }

    /// Token of a character's first pronunciation, or the character itself
    /// when it has none.
    pub fn char_to_token(&self, c: char) -> String {
        self.char_to_token
            .get(&c)
            .cloned()
            .unwrap_or_else(|| c.to_string())
    }

    /// Token of a character under a given syllable, falling back to
    /// [`char_to_token`](Self::char_to_token).
    pub fn char_to_token_for(&self, c: char, pid: Pid) -> String {
        match self.char_code_to_token.get(&(c, pid)) {
            Some(token) => token.clone(),
            None => self.char_to_token(c),
        }
    }

    /// Tokens for a word, using `codes[i]` for the i-th character where
    /// available.
    pub fn encode_word(&self, word: &str, codes: &[Pid]) -> String {
        word.chars()
            .enumerate()
            .map(|(i, c)| match codes.get(i) {
                Some(&pid) => self.char_to_token_for(c, pid),
                None => self.char_to_token(c),
            })
            .collect()
    }

    /// Replace tokens in `input` with their characters.
    ///
    /// A chunk starts at a lowercase ASCII letter and runs through the end of
    /// the next digit run (or to the end of input if no digit follows).
    /// Chunks that are not known tokens are copied unchanged.
    pub fn decode(&self, input: &str) -> Decoded {
        let bytes = input.as_bytes();
        let mut out = Decoded::default();
        let mut pos = 0;

        while pos < bytes.len() {
            let Some(begin) = find_from(bytes, pos, |b| b.is_ascii_lowercase()) else {
                out.text.push_str(&input[pos..]);
                break;
            };
            out.text.push_str(&input[pos..begin]);

            let end = find_from(bytes, begin, |b| b.is_ascii_digit())
                .and_then(|digits| find_from(bytes, digits, |b| !b.is_ascii_digit()))
                .unwrap_or(bytes.len());
            let chunk = &input[begin..end];
            match self.token_to_char(chunk) {
                Some(c) => {
                    out.text.push(c);
                    out.consumed = end;
                    out.decoded_len = out.text.len();
                }
                None => out.text.push_str(chunk),
            }
            pos = end;
        }
        out
    }
}

fn find_from(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
    bytes[from..].iter().position(|&b| pred(b)).map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinyinkit_core::{Config, DictionarySource};

    fn table() -> PhoneticTable {
        let mut src = DictionarySource::new();
        src.syllables = vec!["wo".into(), "shi".into(), "de".into(), "di".into()];
        src.push_char('我', 500, &["wo3"]);
        src.push_char('是', 400, &["shi4"]);
        src.push_char('事', 300, &["shi4"]);
        src.push_char('的', 900, &["de", "di4"]);
        src.push_char('地', 200, &["de", "di4"]);
        PhoneticTable::from_source(&src, &Config::default())
    }

    #[test]
    fn tokens_follow_character_order() {
        let e = Englify::new(&table());
        assert_eq!(e.token_to_char("shi1"), Some('是'));
        assert_eq!(e.token_to_char("shi2"), Some('事'));
        assert_eq!(e.token_to_char("shi3"), None);
        assert_eq!(e.char_to_token('的'), "de1");
        assert_eq!(e.char_to_token_for('的', 3), "di1");
        assert_eq!(e.char_to_token_for('的', 1), "de1");
        assert_eq!(e.char_to_token('x'), "x");
        assert_eq!(e.encode_word("我的", &[0]), "wo1de1");
    }

    #[test]
    fn decode_replaces_known_tokens() {
        let e = Englify::new(&table());
        let d = e.decode("wo1shi1");
        assert_eq!(d.text, "我是");
        assert_eq!(d.consumed, 7);
        assert_eq!(d.decoded_len, "我是".len());

        let d = e.decode("wo1shide");
        assert_eq!(d.text, "我shide");
        assert_eq!(d.consumed, 3);
        assert_eq!(d.decoded_len, "我".len());
    }

    #[test]
    fn decode_without_tokens_is_identity() {
        let e = Englify::new(&table());
        for input in ["", "nihao", "ABC 12", "wo9", "中文"] {
            let d = e.decode(input);
            assert_eq!(d.text, input);
            assert_eq!((d.consumed, d.decoded_len), (0, 0));
        }
    }

    #[test]
    fn decode_keeps_text_between_tokens() {
        let e = Englify::new(&table());
        let d = e.decode("A wo1, de2x");
        assert_eq!(d.text, "A 我, 地x");
        assert_eq!(d.consumed, "A wo1, de2".len());
        assert_eq!(d.decoded_len, "A 我, 地".len());
    }
}
