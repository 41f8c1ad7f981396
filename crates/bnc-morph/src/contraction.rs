//! Split contracted surface forms the way the corpus tokenizer did.
//!
//! The corpus stores `don't` as `do` + `n't` and `we'll` as `we` + `'ll`, so a
//! contraction's frequency is best estimated from its parts. The suffix `'s`
//! is ambiguous: `it's` is a contraction of "it is", `dog's` is a possessive
//! and must not be split. Only stems on an explicit allowlist split on `'s`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::normalize::normalize;

/// Candidate suffixes in match order. `n't` precedes every shorter suffix that
/// shares its tail.
pub const CONTRACTION_SUFFIXES: [&str; 7] = ["n't", "'ll", "'re", "'ve", "'m", "'d", "'s"];

/// The ambiguous suffix gated by the allowlist.
pub const S_SUFFIX: &str = "'s";

/// Stems for which `'s` reads as "is"/"has" rather than a possessive.
///
/// The membership has varied over time and wants linguistic review before any
/// production change; [`ContractionRules::with_allowlist`] replaces it.
pub const DEFAULT_S_ALLOWLIST: [&str; 23] = [
    "where",
    "how",
    "somebody",
    "everybody",
    "everyone",
    "everything",
    "nobody",
    "anywhere",
    "nowhere",
    "it",
    "he",
    "she",
    "that",
    "what",
    "there",
    "here",
    "who",
    "something",
    "nothing",
    "someone",
    "let",
    "one",
    "anything",
];

/// A contracted form split into corpus tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Contraction<'a> {
    pub stem: &'a str,
    pub suffix: &'static str,
}

/// Suffix list plus the `'s` allowlist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractionRules {
    s_allowlist: HashSet<String>,
}

impl Default for ContractionRules {
    fn default() -> Self {
        Self::with_allowlist(DEFAULT_S_ALLOWLIST)
    }
}

impl ContractionRules {
    /// Rules whose `'s` allowlist is exactly `stems` (each normalized).
    pub fn with_allowlist<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let s_allowlist = stems
            .into_iter()
            .map(|stem| normalize(stem.as_ref()).into_string())
            .filter(|stem| !stem.is_empty())
            .collect();
        Self { s_allowlist }
    }

    /// Load an allowlist file: one stem per line, blank lines and `#` comments
    /// ignored.
    pub fn load_allowlist(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("open allowlist {}", path.display()))?;
        let mut stems = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
            let entry = line.split('#').next().unwrap_or("").trim();
            if !entry.is_empty() {
                stems.push(entry.to_string());
            }
        }
        Ok(Self::with_allowlist(stems))
    }

    pub fn allows_s(&self, stem: &str) -> bool {
        self.s_allowlist.contains(stem)
    }

    pub fn allowlist(&self) -> impl Iterator<Item = &str> + '_ {
        self.s_allowlist.iter().map(String::as_str)
    }

    /// Split `word` into stem and suffix, or `None` if it is not a contraction
    /// under these rules.
    pub fn split<'a>(&self, word: &'a str) -> Option<Contraction<'a>> {
        split_with(word, |stem| self.allows_s(stem))
    }
}

/// Split using the built-in allowlist.
pub fn split_contraction(word: &str) -> Option<Contraction<'_>> {
    split_with(word, |stem| DEFAULT_S_ALLOWLIST.contains(&stem))
}

/// Core splitter; `allows_s` decides whether a stem may take `'s`.
///
/// Walks [`CONTRACTION_SUFFIXES`] in order and returns the first match with a
/// non-empty stem that passes the `'s` gate.
pub fn split_with<'a, F>(word: &'a str, allows_s: F) -> Option<Contraction<'a>>
where
    F: Fn(&str) -> bool,
{
    CONTRACTION_SUFFIXES.iter().find_map(|&suffix| {
        let stem = word.strip_suffix(suffix)?;
        if stem.is_empty() || (suffix == S_SUFFIX && !allows_s(stem)) {
            return None;
        }
        Some(Contraction { stem, suffix })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parts(word: &str) -> Option<(&str, &str)> {
        split_contraction(word).map(|c| (c.stem, c.suffix))
    }

    #[test]
    fn splits_negations_before_shorter_suffixes() {
        assert_eq!(parts("don't"), Some(("do", "n't")));
        assert_eq!(parts("can't"), Some(("ca", "n't")));
        assert_eq!(parts("won't"), Some(("wo", "n't")));
        assert_eq!(parts("shouldn't"), Some(("should", "n't")));
    }

    #[test]
    fn splits_other_suffixes() {
        assert_eq!(parts("we'll"), Some(("we", "'ll")));
        assert_eq!(parts("you're"), Some(("you", "'re")));
        assert_eq!(parts("they've"), Some(("they", "'ve")));
        assert_eq!(parts("i'm"), Some(("i", "'m")));
        assert_eq!(parts("she'd"), Some(("she", "'d")));
    }

    #[test]
    fn splits_allowlisted_s_stems() {
        for stem in DEFAULT_S_ALLOWLIST {
            let word = format!("{stem}'s");
            let split = split_contraction(&word).expect("allowlisted stem splits");
            assert_eq!(split.stem, stem);
            assert_eq!(split.suffix, "'s");
        }
    }

    #[test]
    fn leaves_possessives_alone() {
        for word in ["dog's", "cat's", "john's", "man's", "world's", "child's"] {
            assert_eq!(split_contraction(word), None, "{word} should not split");
        }
    }

    #[test]
    fn rejects_empty_stems_and_plain_words() {
        assert_eq!(split_contraction("n't"), None);
        assert_eq!(split_contraction("'s"), None);
        assert_eq!(split_contraction("'ll"), None);
        assert_eq!(split_contraction(""), None);
        assert_eq!(split_contraction("the"), None);
        assert_eq!(split_contraction("cats"), None);
    }

    #[test]
    fn custom_allowlist_replaces_default() {
        let rules = ContractionRules::with_allowlist(["Dog"]);
        assert!(rules.split("dog's").is_some());
        assert!(rules.split("it's").is_none());
        // Other suffixes do not consult the allowlist.
        assert!(rules.split("we'll").is_some());
    }

    #[test]
    fn default_rules_match_free_function() {
        let rules = ContractionRules::default();
        for word in ["it's", "dog's", "don't", "let's", "everything's", "x"] {
            assert_eq!(rules.split(word), split_contraction(word));
        }
    }

    #[test]
    fn loads_allowlist_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# reviewed stems").unwrap();
        writeln!(file, "it").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  WHO  # interrogative").unwrap();
        let rules = ContractionRules::load_allowlist(file.path()).unwrap();
        let mut stems: Vec<&str> = rules.allowlist().collect();
        stems.sort_unstable();
        assert_eq!(stems, vec!["it", "who"]);
        assert!(rules.split("who's").is_some());
        assert!(rules.split("that's").is_none());
    }

    #[test]
    fn missing_allowlist_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContractionRules::load_allowlist(dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("open allowlist"));
    }
}
