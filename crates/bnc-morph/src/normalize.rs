//! Canonical lookup keys for user-supplied word forms.
//!
//! Corpus entries are ASCII, lowercase, and use the plain apostrophe (U+0027).
//! [`normalize`] folds input onto that alphabet in a fixed order:
//!
//! 1. Map apostrophe look-alikes ([`APOSTROPHE_VARIANTS`]) to `'`.
//! 2. Apply compatibility decomposition (NFKD) and drop every non-ASCII char,
//!    which strips accents (`café` -> `cafe`).
//! 3. Fold look-alikes again; some characters (fullwidth grave, Greek varia)
//!    only become a backtick under NFKD.
//! 4. Lowercase.
//! 5. Trim surrounding whitespace, including the ASCII information separators
//!    `\x1c`..=`\x1f`.
//!
//! Step 1 must precede step 2: several look-alikes (acute accent, Greek psili)
//! decompose into a space plus a combining mark, and the rest are non-ASCII,
//! so the ASCII filter would otherwise erase or mangle them. Letters with no
//! base-plus-mark decomposition (`ø`, `ł`) are dropped.

use std::fmt;
use std::ops::Deref;

use unicode_normalization::UnicodeNormalization;

/// Code points treated as apostrophes, most common in English text first.
pub const APOSTROPHE_VARIANTS: [char; 20] = [
    '\u{2019}', // RIGHT SINGLE QUOTATION MARK
    '\u{2018}', // LEFT SINGLE QUOTATION MARK
    '\u{0060}', // GRAVE ACCENT
    '\u{00B4}', // ACUTE ACCENT
    '\u{201B}', // SINGLE HIGH-REVERSED-9 QUOTATION MARK
    '\u{2032}', // PRIME
    '\u{2035}', // REVERSED PRIME
    '\u{02B9}', // MODIFIER LETTER PRIME
    '\u{02BC}', // MODIFIER LETTER APOSTROPHE
    '\u{02C8}', // MODIFIER LETTER VERTICAL LINE
    '\u{0313}', // COMBINING COMMA ABOVE
    '\u{0315}', // COMBINING COMMA ABOVE RIGHT
    '\u{055A}', // ARMENIAN APOSTROPHE
    '\u{05F3}', // HEBREW PUNCTUATION GERESH
    '\u{07F4}', // NKO HIGH TONE APOSTROPHE
    '\u{07F5}', // NKO LOW TONE APOSTROPHE
    '\u{FF07}', // FULLWIDTH APOSTROPHE
    '\u{1FBF}', // GREEK PSILI
    '\u{1FBD}', // GREEK KORONIS
    '\u{A78C}', // LATIN SMALL LETTER SALTILLO
];

/// A lookup key: ASCII, lowercase, trimmed, apostrophes folded to `'`.
///
/// Only [`normalize`] produces one, and normalizing its contents again is a
/// no-op.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NormalizedWord(String);

impl NormalizedWord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for NormalizedWord {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedWord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for NormalizedWord {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedWord {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

pub fn is_apostrophe_variant(c: char) -> bool {
    APOSTROPHE_VARIANTS.contains(&c)
}

/// Replace every apostrophe look-alike with `'`.
pub fn normalize_apostrophes(text: &str) -> String {
    text.chars().map(fold_apostrophe).collect()
}

/// Decompose (NFKD) and keep only ASCII characters.
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

/// Produce the corpus lookup key for `text`.
pub fn normalize(text: &str) -> NormalizedWord {
    let mut ascii: String = text
        .chars()
        .map(fold_apostrophe)
        .nfkd()
        .filter(char::is_ascii)
        .map(fold_apostrophe)
        .collect();
    ascii.make_ascii_lowercase();
    let trimmed = ascii.trim_matches(is_trimmed);
    if trimmed.len() == ascii.len() {
        NormalizedWord(ascii)
    } else {
        NormalizedWord(trimmed.to_string())
    }
}

fn fold_apostrophe(c: char) -> char {
    if is_apostrophe_variant(c) { '\'' } else { c }
}

fn is_trimmed(c: char) -> bool {
    c.is_ascii_whitespace() || matches!(c, '\x0b' | '\x1c'..='\x1f')
}
