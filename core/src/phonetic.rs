//! Phonetic codes.
//!
//! A phonetic code (`Pid`) is a signed integer. Non-negative values index a
//! syllable in a [`PhoneticTable`](crate::PhoneticTable); negative values
//! carry a literal Unicode scalar value inline (`code = -1 - codepoint`), so a
//! code sequence can mix syllables and raw characters without a separate
//! variant.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Phonetic code: syllable index when non-negative, literal character otherwise.
pub type Pid = i32;

/// Tone marker attached to a syllable occurrence (0 = neutral/unspecified).
pub type Tone = u8;

/// Deduplicated set of syllable codes for one character.
pub type PidSet = SmallVec<[Pid; 2]>;

/// Ordered (code, tone) list for one character or word.
pub type PidToneSet = SmallVec<[PidTone; 4]>;

/// True when `pid` is a literal character code rather than a syllable.
#[inline]
pub fn is_literal(pid: Pid) -> bool {
    pid < 0
}

/// Encode a character as a literal code. Always negative.
#[inline]
pub fn literal_pid(c: char) -> Pid {
    -1 - c as Pid
}

/// Decode a literal code back to its character.
///
/// Returns `'\0'` for non-negative codes, which are syllables and carry no
/// character of their own.
#[inline]
pub fn literal_char(pid: Pid) -> char {
    if pid < 0 {
        char::from_u32((-1 - pid) as u32).unwrap_or('\0')
    } else {
        '\0'
    }
}

/// Code returned for lookups that miss (the literal NUL character).
pub const UNKNOWN_PID: Pid = -1;

/// A syllable code with its tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PidTone {
    pub pid: Pid,
    pub tone: Tone,
}

impl PidTone {
    pub fn new(pid: Pid, tone: Tone) -> Self {
        Self { pid, tone }
    }
}

/// Split a trailing tone digit off a romanized syllable (`"xiao3"` → `("xiao", 3)`).
pub fn split_tone(syllable: &str) -> (&str, Tone) {
    match syllable.as_bytes().last() {
        Some(b) if b.is_ascii_digit() => (&syllable[..syllable.len() - 1], b - b'0'),
        _ => (syllable, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn literal_codes_are_negative() {
        assert_eq!(literal_pid('\0'), UNKNOWN_PID);
        assert!(literal_pid('a') < 0);
        assert!(is_literal(literal_pid('小')));
        assert!(!is_literal(0));
    }

    #[test]
    fn syllable_codes_decode_to_nul() {
        assert_eq!(literal_char(0), '\0');
        assert_eq!(literal_char(42), '\0');
    }

    #[test]
    fn split_tone_handles_digits() {
        assert_eq!(split_tone("xiao3"), ("xiao", 3));
        assert_eq!(split_tone("de"), ("de", 0));
        assert_eq!(split_tone(""), ("", 0));
    }

    proptest! {
        #[test]
        fn literal_roundtrip(c in any::<char>()) {
            let pid = literal_pid(c);
            prop_assert!(pid < 0);
            prop_assert_eq!(literal_char(pid), c);
        }
    }
}
