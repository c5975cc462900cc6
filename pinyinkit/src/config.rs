use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

use pinyinkit_core::Config;

/// Server configuration that extends the core `Config`.
///
/// This configuration includes:
/// - All ranking and search options from `pinyinkit_core::Config` (flattened via serde)
/// - The separator typed between syllables in `on_input`
/// - Segmentation cache size
/// - Effectivity used for samples loaded without an explicit factor
///
/// # Example
///
/// ```rust
/// use pinyinkit::ServerConfig;
///
/// let config = ServerConfig::from_toml_str("input_separator = \"'\"\nlookback_window = 3").unwrap();
/// assert_eq!(config.input_separator, '\'');
/// assert_eq!(config.base().lookback_window, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(flatten)]
    pub base: Config,

    /// Explicit syllable boundary in typed input; dropped from the output.
    pub input_separator: char,

    /// Entries kept in the segmentation cache (0 disables caching).
    pub max_cache_size: usize,

    pub default_sample_effectivity: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base: Config::default(),
            input_separator: '0',
            max_cache_size: 1000,
            default_sample_effectivity: 1.0,
        }
    }
}

impl ServerConfig {
    pub fn into_base(self) -> Config {
        self.base
    }

    pub fn base(&self) -> &Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Config {
        &mut self.base
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_zero_separator() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.input_separator, '0');
        assert_eq!(cfg.base(), &Config::default());
    }

    #[test]
    fn flattened_fields_parse() {
        let cfg = ServerConfig::from_toml_str(
            "max_cache_size = 16\nprefix_effectivity = 2.5\nchinese_only_suggestions = false\n",
        )
        .unwrap();
        assert_eq!(cfg.max_cache_size, 16);
        assert_eq!(cfg.base.prefix_effectivity, 2.5);
        assert!(!cfg.base.chinese_only_suggestions);
        assert_eq!(cfg.base.lookback_window, 4);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut cfg = ServerConfig::default();
        cfg.base_mut().max_candidates = 7;
        cfg.input_separator = '\'';
        cfg.save_toml(&path).unwrap();
        assert_eq!(ServerConfig::load_toml(&path).unwrap(), cfg);
    }
}
