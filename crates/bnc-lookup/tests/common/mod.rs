#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bnc_db::{Corpus, ShardKey};
use bnc_lookup::{AppState, Lookup};
use tempfile::TempDir;

/// word, bucket, relative frequency
pub const WORDS: &[(&str, u8, f64)] = &[
    ("the", 1, 0.0617),
    ("of", 1, 0.0291),
    ("and", 1, 0.0268),
    ("people", 1, 0.000714),
    ("it", 1, 0.0109),
    ("'s", 1, 0.00443),
    ("do", 1, 0.00274),
    ("n't", 1, 0.00315),
    ("we", 1, 0.00366),
    ("'ll", 1, 0.000701),
    ("computer", 3, 0.000108),
    ("bus", 6, 3.1e-5),
    ("don't", 41, 1.2e-6),
    ("python", 62, 1.1e-6),
    ("shimmered", 85, 3.2e-7),
];

/// Lay out a corpus directory for `words` under a fresh tempdir.
pub fn write_corpus(words: &[(&str, u8, f64)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_corpus_at(dir.path(), words);
    dir
}

pub fn write_corpus_at(root: &Path, words: &[(&str, u8, f64)]) {
    let mut shards: BTreeMap<u8, String> = BTreeMap::new();
    let mut buckets: BTreeMap<u8, String> = BTreeMap::new();
    for (word, bucket, rf) in words {
        let key = ShardKey::for_word(word);
        let line = format!("{}\t{bucket}\t{rf}\n", key.digest_hex());
        shards.entry(key.shard).or_default().push_str(&line);
        buckets.entry(*bucket).or_default().push_str(&format!("{word}\n"));
    }

    fs::create_dir_all(root.join("index")).unwrap();
    fs::create_dir_all(root.join("buckets")).unwrap();
    for (shard, body) in shards {
        fs::write(root.join("index").join(ShardKey::file_name(shard)), body).unwrap();
    }
    for (bucket, body) in buckets {
        fs::write(root.join("buckets").join(format!("{bucket:02}.txt")), body).unwrap();
    }
}

pub fn open_lookup(root: &Path) -> Lookup<Corpus> {
    Lookup::new(Corpus::open(root).unwrap())
}

/// Router state over the standard test corpus. Keep the tempdir alive for as
/// long as the state is used; tables load lazily.
pub fn make_state(disable_cache: bool) -> (TempDir, AppState) {
    let dir = write_corpus(WORDS);
    let state = AppState {
        lookup: Arc::new(open_lookup(dir.path())),
        max_page_size: 5,
        disable_cache,
    };
    (dir, state)
}
