//! Domain synonym expansion for whole queries.
//!
//! A query that, lowercased and trimmed, equals one of the known AI/ML
//! acronyms or terms is replaced by all of its synonyms joined by spaces, so
//! that tokenization matches any of them. Partial overlaps never expand.

/// Query key and the synonyms it expands to (the key's own spelling
/// included where it is itself a useful term).
const SYNONYMS: &[(&str, &[&str])] = &[
    (
        "ai",
        &["intelligence artificielle", "artificial intelligence", "ai", "ia"],
    ),
    (
        "ia",
        &["intelligence artificielle", "artificial intelligence", "ai", "ia"],
    ),
    (
        "ml",
        &["machine learning", "apprentissage automatique", "ml"],
    ),
    (
        "ai&ml",
        &[
            "machine learning",
            "intelligence artificielle",
            "machine learning et intelligence artificielle",
        ],
    ),
    ("deep learning", &["deep learning", "apprentissage profond"]),
    (
        "neural",
        &["neural network", "réseau de neurones", "neural"],
    ),
    ("tensorflow", &["tensorflow", "tensor flow"]),
    ("pytorch", &["pytorch", "py torch"]),
    (
        "nlp",
        &[
            "natural language processing",
            "traitement du langage naturel",
            "nlp",
        ],
    ),
    (
        "cnn",
        &[
            "convolutional neural network",
            "réseau de neurones convolutif",
            "cnn",
        ],
    ),
    (
        "rnn",
        &[
            "recurrent neural network",
            "réseau de neurones récurrent",
            "rnn",
        ],
    ),
    ("data science", &["data science", "science des données"]),
    ("algorithm", &["algorithm", "algorithme"]),
    ("model", &["model", "modèle", "modelling", "modélisation"]),
];

/// Synonyms registered for `key`, if any.
pub fn synonyms(key: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, terms)| *terms)
}

/// Expand `raw` when it exactly names a known term; otherwise return it
/// unchanged.
pub fn expand_query(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    match synonyms(&key) {
        Some(terms) => terms.join(" "),
        None => raw.to_string(),
    }
}
