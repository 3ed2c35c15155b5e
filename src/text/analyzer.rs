use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::lemma::lemmatize;
use super::stopwords::{ENGLISH, SPANISH};

/// Tokens shorter than this are dropped before stop-word filtering.
const MIN_TOKEN_CHARS: usize = 2;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{N}_]+").expect("word pattern is valid"))
}

/// Turns raw article text into a normalized token stream.
///
/// The stop-word set is fixed when the analyzer is built. Cloning is cheap
/// enough to hand one to each component, but a single shared instance is the
/// usual setup.
#[derive(Debug, Clone)]
pub struct Analyzer {
    stop_words: HashSet<String>,
}

impl Analyzer {
    pub fn new() -> Self {
        let stop_words = SPANISH
            .iter()
            .chain(ENGLISH.iter())
            .map(|w| w.nfc().collect::<String>())
            .collect();
        Self { stop_words }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Lowercased, purely alphabetic tokens without any filtering.
    pub fn raw_tokens(&self, text: &str) -> Vec<String> {
        let normalized = text.nfc().collect::<String>().to_lowercase();
        word_pattern()
            .find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|t| t.chars().all(char::is_alphabetic))
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
            .map(str::to_string)
            .collect()
    }

    /// Full pipeline: raw tokens, stop-word removal, lemmatization.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.raw_tokens(text)
            .into_iter()
            .filter(|t| !self.is_stop_word(t))
            .map(|t| lemmatize(&t))
            .filter(|lemma| !self.is_stop_word(lemma))
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
