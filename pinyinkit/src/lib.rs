//! pinyinkit
//!
//! Pinyin input and fuzzy phonetic search on top of `pinyinkit-core`.
//!
//! Public API:
//! - `PinyinServer` - Input session: samples, custom words, candidates, search
//! - `ServerConfig` - Core `Config` plus input and cache options
//! - `Dictionary` - Phonetic table and word dictionary built from a source
//! - `Englify` - ASCII tokens (`xiao1`) for individual characters
//! - `loader` - Character/word text tables and the bincode resource

pub mod config;
pub mod englify;
pub mod loader;
pub mod server;
pub mod syllables;

pub use config::ServerConfig;
pub use englify::{Decoded, Englify};
pub use loader::{load_chars_csv, load_resource, load_text_files, load_words, save_resource, Dictionary, LoadError};
pub use server::{Candidate, InputResult, PinyinServer};
pub use syllables::PINYIN_SYLLABLES;

// Re-export core types for convenience
pub use pinyinkit_core::{CharCandidate, Config, DictionarySource, PhoneticTable, WordCandidate, WordDictionary};
