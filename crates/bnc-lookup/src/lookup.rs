//! Word statistics with contraction- and plural-aware fallbacks.
//!
//! Every query normalizes its input, then probes up to three keys in order:
//! the word itself, its contraction split, and its singular. The direct and
//! contraction probes compete (each query decides which estimate wins); the
//! plural probe only runs when neither resolves.

use bnc_morph::{ContractionRules, Fallbacks, Tier, normalize};
use bnc_types::{Bucket, BucketRangeError, CorpusIndex, WordList};
use rand::Rng;

/// Words returned by [`Lookup::sample`] when the caller does not say.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// A resolved value and the fallback that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate<T> {
    pub value: T,
    pub via: Tier,
}

impl<T> Estimate<T> {
    fn new(value: T, via: Tier) -> Self {
        Self { value, via }
    }
}

/// Query engine over a read-only corpus.
pub struct Lookup<C> {
    corpus: C,
    rules: ContractionRules,
}

impl<C: CorpusIndex> Lookup<C> {
    pub fn new(corpus: C) -> Self {
        Self::with_rules(corpus, ContractionRules::default())
    }

    pub fn with_rules(corpus: C, rules: ContractionRules) -> Self {
        Self { corpus, rules }
    }

    pub fn corpus(&self) -> &C {
        &self.corpus
    }

    pub fn rules(&self) -> &ContractionRules {
        &self.rules
    }

    /// Whether the word is in the corpus directly, as a plural of a known
    /// singular, or as a contraction whose parts are both known.
    pub fn exists(&self, word: &str) -> bool {
        let word = normalize(word);
        self.resolve(
            &word,
            |w| self.corpus.contains(w).then_some(()),
            |_, _| (),
            |_, _| false,
        )
        .is_some()
    }

    /// Frequency tier, 1 (most frequent) to 100.
    pub fn bucket(&self, word: &str) -> Option<Bucket> {
        self.bucket_estimate(word).map(|e| e.value)
    }

    /// A contraction is as rare as its rarest part; it replaces the direct
    /// entry only when that makes the word more frequent. Without a direct
    /// entry the contraction is tried before the plural stem, so an
    /// allowlisted `x's` never resolves through a stray `x'` entry.
    pub fn bucket_estimate(&self, word: &str) -> Option<Estimate<Bucket>> {
        let word = normalize(word);
        self.resolve(
            &word,
            |w| self.corpus.bucket_of(w),
            Ord::max,
            |direct, split| split < direct,
        )
    }

    /// Share of corpus tokens taken by this word, in `(0, 1)`.
    pub fn relative_frequency(&self, word: &str) -> Option<f64> {
        self.relative_frequency_estimate(word).map(|e| e.value)
    }

    /// Split parts combine to the smaller frequency; the split replaces the
    /// direct entry only when it is larger.
    pub fn relative_frequency_estimate(&self, word: &str) -> Option<Estimate<f64>> {
        let word = normalize(word);
        self.resolve(
            &word,
            |w| self.corpus.relative_frequency_of(w),
            f64::min,
            |direct, split| split > direct,
        )
    }

    /// Expected occurrences in a text of `text_length` tokens.
    ///
    /// Linear in `text_length`; zero and negative lengths are accepted.
    pub fn expected_count(&self, word: &str, text_length: i64) -> Option<f64> {
        Some(self.relative_frequency(word)? * text_length as f64)
    }

    /// [`Lookup::expected_count`] rounded half-to-even.
    pub fn expected_count_rounded(&self, word: &str, text_length: i64) -> Option<i64> {
        self.expected_count(word, text_length)
            .map(|count| count.round_ties_even() as i64)
    }

    /// Every word in a bucket, alphabetically.
    pub fn words(&self, bucket: i64) -> Result<WordList, BucketRangeError> {
        Ok(self.corpus.words_in_bucket(Bucket::new(bucket)?))
    }

    /// Up to `n` distinct random words from a bucket.
    pub fn sample(&self, bucket: i64, n: usize) -> Result<Vec<String>, BucketRangeError> {
        self.sample_with_rng(bucket, n, &mut rand::rng())
    }

    /// [`Lookup::sample`] with a caller-supplied RNG.
    pub fn sample_with_rng<R: Rng + ?Sized>(
        &self,
        bucket: i64,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, BucketRangeError> {
        let words = self.words(bucket)?;
        let amount = n.min(words.len());
        Ok(rand::seq::index::sample(rng, words.len(), amount)
            .into_iter()
            .filter_map(|idx| words.get(idx).map(str::to_string))
            .collect())
    }

    /// Run the fallback chain for one query.
    ///
    /// `probe` looks up a single key, `join` combines the two halves of a
    /// contraction, and `split_wins` decides whether the contraction estimate
    /// replaces a direct hit.
    fn resolve<T, P, J, W>(&self, word: &str, probe: P, join: J, split_wins: W) -> Option<Estimate<T>>
    where
        T: Copy,
        P: Fn(&str) -> Option<T>,
        J: Fn(T, T) -> T,
        W: Fn(T, T) -> bool,
    {
        let fallbacks = Fallbacks::new(word, &self.rules);
        let direct = probe(fallbacks.direct);
        let split = fallbacks
            .contraction
            .and_then(|c| Some(join(probe(c.stem)?, probe(c.suffix)?)));

        let primary = match (direct, split) {
            (Some(d), Some(s)) if split_wins(d, s) => Some(Estimate::new(s, Tier::Contraction)),
            (Some(d), _) => Some(Estimate::new(d, Tier::Direct)),
            (None, Some(s)) => Some(Estimate::new(s, Tier::Contraction)),
            (None, None) => None,
        };
        primary.or_else(|| {
            fallbacks
                .plural
                .and_then(|stem| probe(stem))
                .map(|v| Estimate::new(v, Tier::Plural))
        })
    }
}
