//! Text normalizer: tokens, stop-words, lemmas and suffix stripping.
//!
//! Pipeline (fixed order):
//!
//! 1. Lowercase; every character that is not a letter, digit or whitespace
//!    becomes a space.
//! 2. Split on whitespace. Positions index this raw token sequence.
//! 3. Drop French/English stop-words and tokens of ≤ 2 characters.
//! 4. Replace known inflected forms with their lemma (exact match).
//! 5. Strip one suffix: French table first, then English, longest suffix
//!    first within each table. A suffix is stripped only when at least
//!    [`MIN_STEM_CHARS`] characters remain; tokens of ≤ 3 characters are
//!    never stemmed.
//!
//! The surface token kept in the index is the pre-lemma token; the stem is
//! derived from the lemma.
//!
//! # Fixed points
//!
//! Every stem has at least three characters, and any token of at most three
//! characters is returned unchanged. Hence `stem(stem(w)) == stem(w)` holds
//! whenever `stem(w)` has length 3, or ends in no table suffix that would
//! leave three characters behind.
//!
//! All tables are built once per process and never mutated.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Minimum number of characters a stem must keep.
pub const MIN_STEM_CHARS: usize = 3;

/// Tokens of this many characters or fewer are dropped.
const MAX_DROPPED_CHARS: usize = 2;

const STOP_WORDS_FR: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "de", "du", "et", "ou", "mais", "donc", "car", "ni",
    "est", "sont", "a", "au", "aux", "ce", "cette", "ces", "mon", "ma", "mes", "ton", "ta", "tes",
    "son", "sa", "ses", "notre", "nos", "votre", "vos", "leur", "leurs", "je", "tu", "il", "elle",
    "nous", "vous", "ils", "elles", "on", "qui", "que", "quoi", "dont", "où", "pour", "par",
    "dans", "sur", "avec", "sans", "sous", "entre", "vers", "chez", "être", "avoir", "faire",
    "dire", "aller", "voir", "savoir", "pouvoir", "falloir", "vouloir", "devoir", "plus", "moins",
    "très", "aussi", "encore", "déjà", "ici", "là", "alors",
];

const STOP_WORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "this",
    "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "what", "which", "who",
    "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
];

const LEMMAS: &[(&str, &str)] = &[
    ("algorithmes", "algorithme"),
    ("réseaux", "réseau"),
    ("neurones", "neurone"),
    ("données", "donnée"),
    ("modèles", "modèle"),
    ("apprentissage", "apprendre"),
    ("entraînement", "entraîner"),
    ("prédictions", "prédiction"),
    ("classifications", "classification"),
    ("optimisations", "optimisation"),
    ("networks", "network"),
    ("models", "model"),
    ("algorithms", "algorithm"),
    ("predictions", "prediction"),
    ("training", "train"),
    ("learning", "learn"),
];

const SUFFIXES_FR: &[&str] = &[
    "ement", "ation", "ateur", "atrice", "ique", "isme", "able", "ible", "eux", "euse", "ance",
    "ence", "ité", "age", "ment", "ant", "ent", "ais", "ait", "aient", "era", "erai", "erais",
    "erait", "és", "ées", "er", "ez", "é", "ée", "s", "x",
];

const SUFFIXES_EN: &[&str] = &[
    "ing", "ed", "es", "s", "er", "est", "ly", "ness", "ment", "tion", "sion", "ance", "ence",
    "able", "ible", "al", "ful", "less", "ous", "ive", "ize", "ise",
];

/// A surviving token with its stem and raw position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenOccurrence {
    pub token: String,
    pub stem: String,
    pub position: usize,
}

/// A `(token, stem)` pair and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub token: String,
    pub stem: String,
    pub count: usize,
}

/// Immutable vocabulary tables driving normalization.
#[derive(Debug)]
pub struct Normalizer {
    stop_words: HashSet<&'static str>,
    lemmas: HashMap<&'static str, &'static str>,
    /// Suffix tables in trial order, each sorted longest-first.
    suffix_tiers: Vec<Vec<&'static str>>,
}

static DEFAULT: Lazy<Normalizer> = Lazy::new(Normalizer::new);

impl Normalizer {
    pub fn new() -> Self {
        let stop_words = STOP_WORDS_FR
            .iter()
            .chain(STOP_WORDS_EN.iter())
            .copied()
            .collect();
        let lemmas = LEMMAS.iter().copied().collect();
        let suffix_tiers = [SUFFIXES_FR, SUFFIXES_EN]
            .into_iter()
            .map(|table| {
                let mut tier = table.to_vec();
                // Stable: equal lengths keep table order.
                tier.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
                tier
            })
            .collect();

        Self {
            stop_words,
            lemmas,
            suffix_tiers,
        }
    }

    /// The process-wide normalizer.
    pub fn shared() -> &'static Normalizer {
        &DEFAULT
    }

    /// Lowercase and replace everything but letters, digits and whitespace
    /// with single spaces.
    pub fn clean(&self, text: &str) -> String {
        let replaced: String = text
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        replaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Raw tokens of the cleaned text, before filtering.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn keeps(&self, token: &str) -> bool {
        token.chars().count() > MAX_DROPPED_CHARS && !self.is_stop_word(token)
    }

    /// Canonical form of a known inflected token, or the token itself.
    pub fn lemmatize<'a>(&self, token: &'a str) -> &'a str {
        match self.lemmas.get(token) {
            Some(lemma) => lemma,
            None => token,
        }
    }

    /// Strip at most one suffix.
    pub fn stem(&self, word: &str) -> String {
        let len = word.chars().count();
        if len <= MIN_STEM_CHARS {
            return word.to_string();
        }
        for tier in &self.suffix_tiers {
            for suffix in tier {
                if let Some(stem) = word.strip_suffix(suffix) {
                    if len - suffix.chars().count() >= MIN_STEM_CHARS {
                        return stem.to_string();
                    }
                }
            }
        }
        word.to_string()
    }

    fn token_and_stem(&self, token: &str) -> (String, String) {
        let stem = self.stem(self.lemmatize(token));
        (token.to_string(), stem)
    }

    /// `(token, stem)` pairs of all surviving tokens, in text order.
    pub fn normalize(&self, text: &str) -> Vec<(String, String)> {
        self.tokenize(text)
            .iter()
            .filter(|t| self.keeps(t))
            .map(|t| self.token_and_stem(t))
            .collect()
    }

    /// Surviving tokens with their stems and positions in the raw token
    /// sequence.
    pub fn normalize_with_positions(&self, text: &str) -> Vec<TokenOccurrence> {
        self.tokenize(text)
            .iter()
            .enumerate()
            .filter(|(_, t)| self.keeps(t))
            .map(|(position, t)| {
                let (token, stem) = self.token_and_stem(t);
                TokenOccurrence {
                    token,
                    stem,
                    position,
                }
            })
            .collect()
    }

    /// Distinct `(token, stem)` pairs occurring at least `min_freq` times,
    /// most frequent first. Ties keep first-occurrence order.
    pub fn extract_keywords(&self, text: &str, min_freq: usize) -> Vec<KeywordCount> {
        let mut counts: Vec<KeywordCount> = Vec::new();
        let mut slots: HashMap<(String, String), usize> = HashMap::new();

        for (token, stem) in self.normalize(text) {
            match slots.get(&(token.clone(), stem.clone())) {
                Some(&i) => counts[i].count += 1,
                None => {
                    slots.insert((token.clone(), stem.clone()), counts.len());
                    counts.push(KeywordCount {
                        token,
                        stem,
                        count: 1,
                    });
                }
            }
        }

        counts.retain(|k| k.count >= min_freq);
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> &'static Normalizer {
        Normalizer::shared()
    }

    #[test]
    fn clean_strips_punctuation_and_keeps_accents() {
        assert_eq!(
            n().clean("  L'Intelligence, artificielle!!  réseaux\t\nÉté  "),
            "l intelligence artificielle réseaux été"
        );
        assert_eq!(n().clean("snake_case-word"), "snake case word");
        assert_eq!(n().clean("...---..."), "");
    }

    #[test]
    fn normalize_drops_stop_words_and_short_tokens() {
        let text = "The cat and le chat de la maison sont in a box, ok? xy zz";
        for (token, _) in n().normalize(text) {
            assert!(!n().is_stop_word(&token), "stop-word kept: {token}");
            assert!(token.chars().count() > 2, "short token kept: {token}");
        }
        let tokens: Vec<String> = n().normalize(text).into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["cat", "chat", "maison", "box"]);
    }

    #[test]
    fn lemma_applies_before_stemming_but_token_is_kept() {
        let pairs = n().normalize("learning networks");
        assert_eq!(pairs[0], ("learning".to_string(), "learn".to_string()));
        assert_eq!(pairs[1], ("networks".to_string(), "network".to_string()));
    }

    #[test]
    fn stem_prefers_french_then_longest_suffix() {
        // "ation" (fr, 5) wins over "tion" (en) and "s".
        assert_eq!(n().stem("classification"), "classific");
        // French "ement" beats "ment".
        assert_eq!(n().stem("rapidement"), "rapid");
        // French "s" applies before English "es".
        assert_eq!(n().stem("classes"), "classe");
        // English table reached when no French suffix matches.
        assert_eq!(n().stem("quickly"), "quick");
        assert_eq!(n().stem("machine"), "machine");
    }

    #[test]
    fn stem_respects_minimum_length() {
        assert_eq!(n().stem("cats"), "cat");
        // "ing" would leave 2 characters.
        assert_eq!(n().stem("sing"), "sing");
        // Tokens of ≤ 3 characters are never stemmed.
        assert_eq!(n().stem("bas"), "bas");
        assert_eq!(n().stem("été"), "été");
    }

    #[test]
    fn stem_counts_characters_not_bytes() {
        // "ée" is 2 chars / 4 bytes; "créée" keeps "cré" (3 chars).
        assert_eq!(n().stem("créée"), "cré");
    }

    #[test]
    fn stem_is_fixed_point_at_boundary() {
        for w in ["classification", "rapidement", "quickly", "tokens", "bas", "cats"] {
            let once = n().stem(w);
            if once.chars().count() == MIN_STEM_CHARS {
                assert_eq!(n().stem(&once), once);
            }
        }
        for w in ["cat", "box", "été", "a1b"] {
            assert_eq!(n().stem(w), w);
        }
        let once = n().stem("classification");
        assert_eq!(n().stem(&once), once);
    }

    #[test]
    fn positions_index_raw_tokens() {
        let occ = n().normalize_with_positions("The machine learning model");
        let got: Vec<(&str, usize)> = occ.iter().map(|o| (o.token.as_str(), o.position)).collect();
        assert_eq!(got, vec![("machine", 1), ("learning", 2), ("model", 3)]);
        assert_eq!(occ[1].stem, "learn");
    }

    #[test]
    fn extract_keywords_counts_and_filters() {
        let kws = n().extract_keywords("data data model data model graph", 1);
        assert_eq!(kws[0].token, "data");
        assert_eq!(kws[0].count, 3);
        assert_eq!(kws[1].token, "model");
        assert_eq!(kws[1].count, 2);
        assert_eq!(kws[2].token, "graph");

        let frequent = n().extract_keywords("data data model data model graph", 2);
        assert_eq!(frequent.len(), 2);
    }

    #[test]
    fn extract_keywords_ties_keep_first_occurrence() {
        let kws = n().extract_keywords("zebra apple mango", 1);
        let tokens: Vec<&str> = kws.iter().map(|k| k.token.as_str()).collect();
        assert_eq!(tokens, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn empty_and_stop_word_only_text() {
        assert!(n().normalize("").is_empty());
        assert!(n().extract_keywords("the and of le la", 1).is_empty());
    }
}
