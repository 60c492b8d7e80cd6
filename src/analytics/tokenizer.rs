//! Phrase tokenizer for shift notes
//!
//! Lowercases, extracts alphabetic runs (accented letters included) and drops
//! short tokens, English/Spanish stopwords and template noise. Template noise
//! is the vocabulary of the note headings themselves; left in, words such as
//! `staff` would top every ranking.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}+").unwrap());

static DEFAULT_TOKENIZER: LazyLock<Tokenizer> = LazyLock::new(Tokenizer::new);

/// Tokens of this many characters or fewer are dropped
pub const MAX_SHORT_TOKEN_CHARS: usize = 3;

const ENGLISH_STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "always", "another", "because",
    "been", "before", "being", "below", "between", "both", "could", "does", "doing", "done",
    "down", "during", "each", "even", "ever", "every", "from", "further", "going", "have",
    "having", "here", "hers", "herself", "himself", "into", "itself", "just", "like", "made",
    "make", "many", "more", "most", "much", "must", "myself", "never", "only", "other", "ought",
    "ours", "ourselves", "over", "really", "same", "should", "some", "still", "such", "than",
    "that", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "though", "through", "today", "tonight", "under", "until", "very", "want", "well",
    "were", "what", "when", "where", "which", "while", "whom", "whose", "will", "with", "would",
    "your", "yours", "yourself", "yourselves",
];

const SPANISH_STOPWORDS: &[&str] = &[
    "algo", "alguna", "algunas", "alguno", "algunos", "ante", "antes", "aquel", "aquella",
    "aquellas", "aquellos", "aquí", "aunque", "bastante", "bien", "cada", "casi", "como", "cómo",
    "contra", "cual", "cuál", "cuando", "cuándo", "desde", "después", "donde", "dónde",
    "durante", "ella", "ellas", "ellos", "entonces", "entre", "eran", "esta", "está", "estaba",
    "estaban", "estamos", "están", "estar", "estas", "este", "esto", "estos", "estuvo", "fueron",
    "había", "habían", "hace", "hacer", "hasta", "luego", "más", "mismo", "misma", "mucha",
    "muchas", "mucho", "muchos", "nada", "nosotros", "nuestra", "nuestro", "otra", "otras",
    "otro", "otros", "para", "pero", "poco", "porque", "pues", "quien", "quién", "sido", "siempre",
    "sobre", "solo", "sólo", "también", "tanto", "tenemos", "tener", "tiene", "tienen", "toda",
    "todas", "todo", "todos", "tras", "unas", "unos", "vamos", "ayer", "mañana",
];

const TEMPLATE_NOISE: &[&str] = &[
    "incidents", "incident", "incidencias", "incidencia", "incidentes", "issues", "problems",
    "problemas", "staff", "personal", "sold", "soldout", "agotado", "agotados", "complaints",
    "complaint", "quejas", "queja", "reclamaciones", "notes", "notas", "none", "ninguno",
    "ninguna", "nothing", "shift", "turno",
];

/// Stopword-aware word tokenizer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: HashSet<String>,
    noise: HashSet<String>,
}

impl Tokenizer {
    /// Tokenizer with the built-in English/Spanish stopwords and template noise
    pub fn new() -> Self {
        Self {
            stopwords: ENGLISH_STOPWORDS
                .iter()
                .chain(SPANISH_STOPWORDS)
                .map(|w| (*w).to_string())
                .collect(),
            noise: TEMPLATE_NOISE.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    /// Add deployment-specific stopwords
    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    /// Whether a lowercase token survives filtering
    pub fn keeps(&self, token: &str) -> bool {
        token.chars().count() > MAX_SHORT_TOKEN_CHARS
            && !self.stopwords.contains(token)
            && !self.noise.contains(token)
    }

    /// Content-word tokens in input order
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        WORD_REGEX
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|token| self.keeps(token))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize with the built-in word lists
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT_TOKENIZER.tokenize(text)
}
