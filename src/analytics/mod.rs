//! Phrase analytics over shift notes
//!
//! - [`tokenizer`] - content-word extraction with EN/ES stopwords
//! - [`phrases`] - bigram/unigram counting and ranking
//! - [`trends`] - period-over-period deltas and spike detection

pub mod phrases;
pub mod tokenizer;
pub mod trends;

pub use phrases::{count_phrases, rank, FrequencyMap, PhraseCounter, PhraseKind, RankedPhrase};
pub use tokenizer::{tokenize, Tokenizer};
pub use trends::{
    spike_detect, PhraseDelta, SectionTrend, Spike, SpikePolicy, TrendDirection, TrendEngine,
    TrendReport,
};
