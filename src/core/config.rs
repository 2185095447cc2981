//! Tunable constants of the cleaning engine.
//!
//! A [`RosterConfig`] is built once, validated, and shared read-only by every
//! worker of a batch. Missing fields in a JSON config file fall back to the
//! defaults below.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

const DEFAULT_DROP_TOKENS: &[&str] = &[
    "nm",
    "nm-",
    "members",
    "member",
    "elite",
    "officer",
    "president",
    "vice",
    "vice president",
    "hardcore",
    "casual",
    "active",
    "daily",
    "active daily",
    "active at night",
    "online",
    "offline",
    "ranking",
    "notice",
    "enter",
    "club",
    "tag",
    "state",
];

const DEFAULT_CONFUSIONS: &[(char, char)] = &[
    ('O', '0'),
    ('o', '0'),
    ('Q', '0'),
    ('D', '0'),
    ('l', '1'),
    ('I', '1'),
    ('i', '1'),
    ('|', '1'),
    ('!', '1'),
    ('Z', '2'),
    ('z', '2'),
    ('S', '5'),
    ('s', '5'),
    ('G', '6'),
    ('b', '6'),
    ('T', '7'),
    ('B', '8'),
    ('g', '9'),
    ('q', '9'),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Shortest digit span accepted as a power value.
    pub min_digits: usize,
    /// Digit spans shorter than this yield a SUSPECT confidence.
    pub strict_digits: usize,
    /// Longest plausible digit span.
    pub max_digits: usize,
    pub strict_min_power: u64,
    pub name_min_len: usize,
    pub name_max_len: usize,
    /// Name tokens with a smaller share of letters are treated as decoration.
    pub min_letter_ratio: f32,
    /// Punctuation allowed in names besides letters, digits and spaces.
    pub name_punctuation: String,
    pub drop_tokens: BTreeSet<String>,
    pub confusions: BTreeMap<char, char>,
    pub join_fragments: bool,
    pub max_name_fragments: usize,
    pub max_images: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            min_digits: 6,
            strict_digits: 7,
            max_digits: 12,
            strict_min_power: 3_000_000,
            name_min_len: 2,
            name_max_len: 24,
            min_letter_ratio: 0.35,
            name_punctuation: "^~-_.'".to_string(),
            drop_tokens: DEFAULT_DROP_TOKENS.iter().map(|t| t.to_string()).collect(),
            confusions: DEFAULT_CONFUSIONS.iter().copied().collect(),
            join_fragments: true,
            max_name_fragments: 2,
            max_images: 16,
        }
    }
}

impl RosterConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: RosterConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_digits == 0 {
            return Err(ConfigError::ZeroMinDigits);
        }
        if self.strict_digits < self.min_digits {
            return Err(ConfigError::StrictDigitsBelowMin {
                strict: self.strict_digits,
                min: self.min_digits,
            });
        }
        if self.max_digits < self.min_digits {
            return Err(ConfigError::MaxDigitsBelowMin {
                max: self.max_digits,
                min: self.min_digits,
            });
        }
        if self.name_min_len == 0 || self.name_min_len > self.name_max_len {
            return Err(ConfigError::NameBounds {
                min: self.name_min_len,
                max: self.name_max_len,
            });
        }
        if !(0.0..=1.0).contains(&self.min_letter_ratio) {
            return Err(ConfigError::LetterRatio(self.min_letter_ratio));
        }
        for (&from, &to) in &self.confusions {
            if from.is_ascii_digit() || !to.is_ascii_digit() {
                return Err(ConfigError::Confusion { from, to });
            }
        }
        if self.max_images == 0 {
            return Err(ConfigError::ZeroMaxImages);
        }
        Ok(())
    }

    /// Drop tokens split into lowercase words, longest phrases first.
    pub fn drop_phrases(&self) -> Vec<Vec<String>> {
        let mut phrases: Vec<Vec<String>> = self
            .drop_tokens
            .iter()
            .map(|token| {
                token
                    .split_whitespace()
                    .map(|word| word.to_lowercase())
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(RosterConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_min_digits() {
        let config = RosterConfig {
            min_digits: 0,
            ..RosterConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinDigits));
    }

    #[test]
    fn rejects_confusion_to_letter() {
        let mut config = RosterConfig::default();
        config.confusions.insert('A', 'x');
        assert_eq!(
            config.validate(),
            Err(ConfigError::Confusion { from: 'A', to: 'x' })
        );
    }

    #[test]
    fn rejects_inverted_name_bounds() {
        let config = RosterConfig {
            name_min_len: 10,
            name_max_len: 4,
            ..RosterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NameBounds { min: 10, max: 4 })
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: RosterConfig =
            serde_json::from_str(r#"{"min_digits": 7, "confusions": {"O": "0"}}"#).unwrap();
        assert_eq!(config.min_digits, 7);
        assert_eq!(config.strict_min_power, 3_000_000);
        assert_eq!(config.confusions.len(), 1);
        assert_eq!(config.confusions.get(&'O'), Some(&'0'));
    }

    #[test]
    fn drop_phrases_put_longest_first() {
        let phrases = RosterConfig::default().drop_phrases();
        assert_eq!(phrases[0], vec!["active", "at", "night"]);
        assert!(phrases.iter().any(|p| p == &vec!["vice".to_string()]));
    }
}
