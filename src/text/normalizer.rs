use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::stopwords;

/// Accented letters accepted besides ASCII letters.
pub const DEFAULT_LOCALE_LETTERS: &str = "áàâãéèêíìîóòôõúùûç";

/// Tokens shorter than this (in chars) are dropped.
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 3;

/// Serializable settings of a [`TextNormalizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// letters accepted in addition to `a-z`
    pub locale_letters: String,
    pub stopwords: Vec<String>,
    pub min_token_chars: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            locale_letters: DEFAULT_LOCALE_LETTERS.to_string(),
            stopwords: stopwords::default_stopwords(),
            min_token_chars: DEFAULT_MIN_TOKEN_CHARS,
        }
    }
}

/// TextNormalizer
/// Lowercases text, blanks out every character outside the configured
/// alphabet, and drops stopwords and short tokens.
///
/// The same instance (or one rebuilt from the same [`NormalizerConfig`]) must
/// be used when fitting the vectorizer and when transforming queries,
/// otherwise the resulting vectors are not comparable.
///
/// # Examples
/// ```
/// use synopsis_recommender::TextNormalizer;
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("The Banker, wrongly convicted!"), "banker wrongly convicted");
/// ```
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    config: NormalizerConfig,
    letters: HashSet<char>,
    stopwords: HashSet<String>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl PartialEq for TextNormalizer {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl TextNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let letters = config
            .locale_letters
            .chars()
            .flat_map(char::to_lowercase)
            .collect();
        let stopwords = config
            .stopwords
            .iter()
            .map(|w| w.to_lowercase())
            .collect();
        Self {
            config,
            letters,
            stopwords,
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize text
    ///
    /// # Arguments
    /// * `text` - raw text
    ///
    /// # Returns
    /// * `String` - surviving tokens joined by single spaces
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Normalize an optional field. A missing value yields an empty string.
    pub fn normalize_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.normalize(t)).unwrap_or_default()
    }

    /// Normalized tokens in input order.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| if self.is_allowed(c) { c } else { ' ' })
            .collect();
        cleaned
            .split_whitespace()
            .filter(|tok| tok.chars().count() >= self.config.min_token_chars)
            .filter(|tok| !self.stopwords.contains(*tok))
            .map(str::to_string)
            .collect()
    }

    #[inline]
    fn is_allowed(&self, c: char) -> bool {
        c.is_ascii_lowercase() || c.is_whitespace() || self.letters.contains(&c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_text_becomes_empty() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize_opt(None), "");
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \t\n"), "");
    }

    #[test]
    fn strips_punctuation_digits_and_short_tokens() {
        let n = TextNormalizer::default();
        assert_eq!(
            n.normalize("In 1947, a banker is sent to Shawshank -- for life."),
            "banker sent shawshank life"
        );
    }

    #[test]
    fn keeps_locale_letters_and_lowercases_them() {
        let n = TextNormalizer::default();
        assert_eq!(
            n.normalize("Um banqueiro CONDENADO por uxoricídio forma uma AMIZADE"),
            "banqueiro condenado uxoricídio forma amizade"
        );
    }

    #[test]
    fn hyphenated_words_split_into_tokens() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("decades-long friendship"), "decades long friendship");
    }

    #[test]
    fn stopword_only_text_is_empty() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("The and of with a an to by"), "");
    }

    #[test]
    fn custom_alphabet_drops_unknown_letters() {
        let n = TextNormalizer::new(NormalizerConfig {
            locale_letters: String::new(),
            stopwords: vec![],
            min_token_chars: 3,
        });
        // 'í' is no longer part of the alphabet and splits the token
        assert_eq!(n.normalize("uxoricídio"), "uxoric dio");
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = TextNormalizer::default();
        let once = n.normalize("A heist crew plans the perfect robbery of a casino vault.");
        assert_eq!(n.normalize(&once), once);
    }
}
