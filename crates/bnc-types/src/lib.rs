//! Shared types for looking up word statistics in the British National Corpus.
//!
//! The corpus is a fixed, pre-computed table of 669,417 word forms drawn from
//! 100,106,029 tokens. Every form carries a frequency bucket (1 = top 1% by
//! frequency, 100 = bottom 1%) and a relative frequency (raw count divided by
//! [`CORPUS_TOKENS`]).
//!
//! Use [`Bucket`] to name a tier (construction enforces the 1..=100 range),
//! [`WordList`] for the sorted members of a tier, and [`CorpusIndex`] as the
//! read-only contract any storage backend implements.
//!
//! ```rust
//! use bnc_types::{Bucket, WordList};
//!
//! let top = Bucket::new(1).unwrap();
//! assert!(top < Bucket::LEAST_FREQUENT);
//! assert!(Bucket::new(0).is_err());
//!
//! let words = WordList::from(vec!["the".to_string(), "and".to_string()]);
//! assert_eq!(words.get(0), Some("and"));
//! ```

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Total token count of the source corpus.
pub const CORPUS_TOKENS: u64 = 100_106_029;
/// Number of documents in the source corpus.
pub const CORPUS_DOCUMENTS: u32 = 4_124;
/// Number of distinct word forms with corpus entries.
pub const WORD_FORMS: u32 = 669_417;
/// Number of frequency tiers.
pub const BUCKET_COUNT: u8 = 100;
/// Number of hash partitions the corpus tables are split into.
pub const SHARD_COUNT: usize = 256;

/// Frequency tier in `1..=100`; lower numbers are more frequent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Bucket(u8);

/// A bucket number outside `1..=100` was supplied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("bucket must be 1-{max}, got {got}", max = BUCKET_COUNT)]
pub struct BucketRangeError {
    pub got: i64,
}

impl Bucket {
    /// Top 1% of word forms by frequency.
    pub const MOST_FREQUENT: Bucket = Bucket(1);
    /// Bottom 1% of word forms by frequency.
    pub const LEAST_FREQUENT: Bucket = Bucket(BUCKET_COUNT);

    /// Validate a raw bucket number.
    pub fn new(raw: i64) -> Result<Self, BucketRangeError> {
        if (1..=i64::from(BUCKET_COUNT)).contains(&raw) {
            Ok(Bucket(raw as u8))
        } else {
            Err(BucketRangeError { got: raw })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Iterate every bucket from most to least frequent.
    pub fn all() -> impl Iterator<Item = Bucket> {
        (1..=BUCKET_COUNT).map(Bucket)
    }
}

impl TryFrom<i64> for Bucket {
    type Error = BucketRangeError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Bucket::new(raw)
    }
}

impl From<Bucket> for u8 {
    fn from(bucket: Bucket) -> u8 {
        bucket.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alphabetically sorted, deduplicated words sharing a bucket.
///
/// Clones share the same backing storage.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WordList {
    words: Arc<[String]>,
}

impl WordList {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }

    /// Binary search; relies on the sorted invariant.
    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search_by(|probe| probe.as_str().cmp(word))
            .is_ok()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }
}

impl From<Vec<String>> for WordList {
    fn from(mut words: Vec<String>) -> Self {
        words.sort_unstable();
        words.dedup();
        Self {
            words: words.into(),
        }
    }
}

/// Read-only lookups over the corpus tables, keyed by normalized word.
///
/// Implementations report absent words (including the empty string) as
/// `false`/`None`; they never fail a lookup.
pub trait CorpusIndex {
    /// Whether the word form has a corpus entry.
    fn contains(&self, word: &str) -> bool;

    /// Frequency tier of the word form, if known.
    fn bucket_of(&self, word: &str) -> Option<Bucket>;

    /// Relative frequency in `(0, 1)`, if known.
    fn relative_frequency_of(&self, word: &str) -> Option<f64>;

    /// All word forms assigned to `bucket`, sorted alphabetically.
    fn words_in_bucket(&self, bucket: Bucket) -> WordList;
}

impl<C: CorpusIndex + ?Sized> CorpusIndex for Arc<C> {
    fn contains(&self, word: &str) -> bool {
        (**self).contains(word)
    }

    fn bucket_of(&self, word: &str) -> Option<Bucket> {
        (**self).bucket_of(word)
    }

    fn relative_frequency_of(&self, word: &str) -> Option<f64> {
        (**self).relative_frequency_of(word)
    }

    fn words_in_bucket(&self, bucket: Bucket) -> WordList {
        (**self).words_in_bucket(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_range_is_enforced() {
        assert_eq!(Bucket::new(1).unwrap(), Bucket::MOST_FREQUENT);
        assert_eq!(Bucket::new(100).unwrap(), Bucket::LEAST_FREQUENT);
        assert_eq!(Bucket::new(0), Err(BucketRangeError { got: 0 }));
        assert!(Bucket::new(101).is_err());
        assert!(Bucket::new(-1).is_err());
        assert!(Bucket::try_from(-100_i64).is_err());
    }

    #[test]
    fn range_error_names_the_value() {
        let err = Bucket::new(101).unwrap_err();
        assert_eq!(err.to_string(), "bucket must be 1-100, got 101");
    }

    #[test]
    fn all_buckets_in_order() {
        let all: Vec<u8> = Bucket::all().map(Bucket::get).collect();
        assert_eq!(all.len(), 100);
        assert_eq!(all.first(), Some(&1));
        assert_eq!(all.last(), Some(&100));
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn word_list_sorts_and_dedups() {
        let list = WordList::from(vec![
            "people".to_string(),
            "and".to_string(),
            "the".to_string(),
            "and".to_string(),
        ]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["and", "people", "the"]);
        assert!(list.contains("people"));
        assert!(!list.contains("python"));
        assert!(WordList::default().is_empty());
    }
}
