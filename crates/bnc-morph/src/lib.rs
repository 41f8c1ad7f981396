//! Text normalization and morphological fallbacks for BNC lookups.
//!
//! The corpus tokenizes contractions and possessives as separate units and
//! lists singular and plural forms independently, so a raw user word often
//! misses. This crate turns a surface form into the ordered set of keys worth
//! probing, while staying ignorant of how the corpus is stored; callers supply
//! the lookups.
//!
//! # How it works
//! 1. [`normalize`] folds apostrophe look-alikes, accents, case and whitespace.
//! 2. [`Fallbacks::new`] derives the probe keys for the normalized word:
//!    the word itself ([`Tier::Direct`]), its contraction split
//!    ([`Tier::Contraction`]), and its singular ([`Tier::Plural`]).
//!
//! # Example
//! ```
//! use bnc_morph::{ContractionRules, Fallbacks, normalize};
//!
//! let rules = ContractionRules::default();
//! let word = normalize("We\u{2019}ll");
//! let fallbacks = Fallbacks::new(&word, &rules);
//! assert_eq!(fallbacks.direct, "we'll");
//! let split = fallbacks.contraction.unwrap();
//! assert_eq!((split.stem, split.suffix), ("we", "'ll"));
//! assert_eq!(fallbacks.plural, None);
//! ```

pub mod contraction;
pub mod normalize;

use std::fmt;

pub use contraction::{
    CONTRACTION_SUFFIXES, Contraction, ContractionRules, DEFAULT_S_ALLOWLIST, S_SUFFIX,
    split_contraction, split_with,
};
pub use normalize::{
    APOSTROPHE_VARIANTS, NormalizedWord, is_apostrophe_variant, normalize, normalize_apostrophes,
    strip_accents,
};

/// Words at or below this length never fall back to a singular, so `bus`,
/// `gas` and `yes` are not read as plurals of two-letter stems.
pub const PLURAL_MIN_LEN: usize = 4;

/// Which fallback produced a result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Tier {
    Direct,
    Contraction,
    Plural,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Direct => "direct",
            Tier::Contraction => "contraction",
            Tier::Plural => "plural",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe keys for one normalized word, in precedence order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fallbacks<'a> {
    pub direct: &'a str,
    pub contraction: Option<Contraction<'a>>,
    pub plural: Option<&'a str>,
}

impl<'a> Fallbacks<'a> {
    pub fn new(word: &'a str, rules: &ContractionRules) -> Self {
        Self {
            direct: word,
            contraction: rules.split(word),
            plural: plural_stem(word),
        }
    }
}

/// Drop a trailing `s` from words of at least [`PLURAL_MIN_LEN`] bytes.
///
/// Expects a normalized (ASCII) word; length is measured in bytes.
pub fn plural_stem(word: &str) -> Option<&str> {
    if word.len() < PLURAL_MIN_LEN {
        return None;
    }
    word.strip_suffix('s')
}
