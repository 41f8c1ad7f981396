//! Read prebuilt BNC frequency tables from disk, one shard at a time.
//!
//! The corpus ships as 256 hash-partitioned entry tables plus 100 bucket word
//! lists. Nothing is read up front: the first lookup that lands in a shard
//! loads and parses that shard, and every later lookup shares the parsed copy.
//! Concurrent first access from many threads loads a shard exactly once.
//!
//! # Layout
//! ```text
//! <data-dir>/
//!   index/<xx>.tsv    xx = first byte of md5(word), lowercase hex
//!   buckets/<nn>.txt  nn = 01..100, one word per line
//! ```
//! Each shard line is `<remaining 30 hex digits of the md5>\t<bucket>\t<rf>`;
//! the bucket and relative-frequency columns may be absent or `-`. Lines that
//! do not parse are skipped with a warning.
//!
//! A missing or unreadable table is logged and treated as empty, so only the
//! words it would have held report not found.
//!
//! # Example
//! ```no_run
//! use bnc_db::{Corpus, LoadMode};
//! use bnc_types::CorpusIndex;
//!
//! # fn main() -> anyhow::Result<()> {
//! let corpus = Corpus::open_with_mode("/path/to/bnc", LoadMode::Mmap)?;
//! if let Some(bucket) = corpus.bucket_of("the") {
//!     println!("'the' is in bucket {bucket}");
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p bnc-db --example stats -- <data-dir>`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bnc_types::{Bucket, CorpusIndex, SHARD_COUNT, WordList};
use dashmap::DashMap;
use md5::{Digest, Md5};
use memmap2::Mmap;
use tracing::{debug, info, warn};

const INDEX_DIR: &str = "index";
const BUCKETS_DIR: &str = "buckets";
const DIGEST_SUFFIX_LEN: usize = 30;

/// Strategy for reading table files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each table file before parsing.
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Where a word's entry lives: the shard byte and the remaining 120 bits of
/// its md5 digest.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ShardKey {
    pub shard: u8,
    pub digest: u128,
}

impl ShardKey {
    pub fn for_word(word: &str) -> Self {
        let hash = Md5::digest(word.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash);
        let shard = bytes[0];
        bytes[0] = 0;
        Self {
            shard,
            digest: u128::from_be_bytes(bytes),
        }
    }

    /// The digest column as written in shard files.
    pub fn digest_hex(&self) -> String {
        format!("{:0width$x}", self.digest, width = DIGEST_SUFFIX_LEN)
    }

    /// File name of a shard table, relative to `index/`.
    pub fn file_name(shard: u8) -> String {
        format!("{shard:02x}.tsv")
    }
}

/// Everything stored about one word form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Entry {
    pub bucket: Option<Bucket>,
    pub relative_frequency: Option<f64>,
}

/// Snapshot of what has been materialized so far.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CorpusStats {
    pub shards_loaded: usize,
    pub shards_missing: usize,
    pub buckets_loaded: usize,
    pub entries: usize,
    pub skipped_lines: usize,
}

#[derive(Debug, Default)]
struct Shard {
    entries: HashMap<u128, Entry>,
    skipped: usize,
    missing: bool,
}

impl Shard {
    fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }
}

/// Lazily materialized view of a corpus directory.
pub struct Corpus {
    root: PathBuf,
    mode: LoadMode,
    shards: DashMap<u8, Arc<Shard>>,
    buckets: DashMap<Bucket, WordList>,
}

impl Corpus {
    /// Open a corpus directory, memory-mapping tables as they are needed.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_mode(data_dir, LoadMode::Mmap)
    }

    /// Open a corpus directory choosing how tables are read.
    ///
    /// Only the directory structure is checked here; tables load on demand.
    pub fn open_with_mode(data_dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let root = data_dir.as_ref().to_path_buf();
        for dir in [root.clone(), root.join(INDEX_DIR), root.join(BUCKETS_DIR)] {
            if !dir.is_dir() {
                anyhow::bail!("missing corpus directory: {}", dir.display());
            }
        }
        info!("opened corpus at {} (mode: {:?})", root.display(), mode);
        Ok(Self {
            root,
            mode,
            shards: DashMap::with_capacity(SHARD_COUNT),
            buckets: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Fetch the stored entry for an already-normalized word.
    pub fn entry(&self, word: &str) -> Option<Entry> {
        if word.is_empty() {
            return None;
        }
        let key = ShardKey::for_word(word);
        self.shard(key.shard).entries.get(&key.digest).copied()
    }

    /// Materialize every shard and bucket list now instead of on first use.
    pub fn preload(&self) -> CorpusStats {
        for id in 0..=u8::MAX {
            self.shard(id);
        }
        for bucket in Bucket::all() {
            self.bucket_words(bucket);
        }
        self.stats()
    }

    pub fn stats(&self) -> CorpusStats {
        let mut stats = CorpusStats {
            buckets_loaded: self.buckets.len(),
            ..CorpusStats::default()
        };
        for shard in self.shards.iter() {
            stats.shards_loaded += 1;
            stats.entries += shard.entries.len();
            stats.skipped_lines += shard.skipped;
            if shard.missing {
                stats.shards_missing += 1;
            }
        }
        stats
    }

    fn shard(&self, id: u8) -> Arc<Shard> {
        if let Some(shard) = self.shards.get(&id) {
            return Arc::clone(shard.value());
        }
        // The entry guard serializes concurrent first loads of the same shard.
        let shard = self
            .shards
            .entry(id)
            .or_insert_with(|| Arc::new(self.load_shard(id)));
        Arc::clone(shard.value())
    }

    fn load_shard(&self, id: u8) -> Shard {
        let path = self.root.join(INDEX_DIR).join(ShardKey::file_name(id));
        let buffer = match load_file(&path, self.mode) {
            Ok(Some(buffer)) => buffer,
            Ok(None) => {
                warn!("shard {id:02x} missing at {}; its words will report not found", path.display());
                return Shard::missing();
            }
            Err(err) => {
                warn!("shard {id:02x} unreadable: {err:#}; its words will report not found");
                return Shard::missing();
            }
        };
        let shard = parse_shard(buffer.as_slice(), &path);
        debug!(
            "loaded shard {id:02x}: {} entries ({} skipped)",
            shard.entries.len(),
            shard.skipped
        );
        shard
    }

    fn bucket_words(&self, bucket: Bucket) -> WordList {
        if let Some(words) = self.buckets.get(&bucket) {
            return words.value().clone();
        }
        let words = self
            .buckets
            .entry(bucket)
            .or_insert_with(|| self.load_bucket(bucket));
        words.value().clone()
    }

    fn load_bucket(&self, bucket: Bucket) -> WordList {
        let path = self
            .root
            .join(BUCKETS_DIR)
            .join(format!("{:02}.txt", bucket.get()));
        let buffer = match load_file(&path, self.mode) {
            Ok(Some(buffer)) => buffer,
            Ok(None) => {
                warn!("word list for bucket {bucket} missing at {}", path.display());
                return WordList::default();
            }
            Err(err) => {
                warn!("word list for bucket {bucket} unreadable: {err:#}");
                return WordList::default();
            }
        };
        let words = parse_word_list(buffer.as_slice(), &path);
        debug!("loaded bucket {bucket}: {} words", words.len());
        words
    }
}

impl CorpusIndex for Corpus {
    fn contains(&self, word: &str) -> bool {
        self.entry(word).is_some()
    }

    fn bucket_of(&self, word: &str) -> Option<Bucket> {
        self.entry(word)?.bucket
    }

    fn relative_frequency_of(&self, word: &str) -> Option<f64> {
        self.entry(word)?.relative_frequency
    }

    fn words_in_bucket(&self, bucket: Bucket) -> WordList {
        self.bucket_words(bucket)
    }
}

/// `Ok(None)` when the file does not exist.
fn load_file(path: &Path, mode: LoadMode) -> Result<Option<Buffer>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("open {}", path.display())),
    };
    let len = file
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    match mode {
        // Zero-length files cannot be mapped.
        LoadMode::Mmap if len > 0 => unsafe { Mmap::map(&file) }
            .map(|m| Some(Buffer::Mmap(m)))
            .with_context(|| format!("mmap {}", path.display())),
        _ => {
            let mut buf = Vec::with_capacity(len as usize);
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Some(Buffer::Owned(buf)))
        }
    }
}

fn parse_shard(bytes: &[u8], path: &Path) -> Shard {
    let mut shard = Shard::default();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        if line.is_empty() || line.first() == Some(&b'#') {
            continue;
        }
        match parse_entry_line(line) {
            Some((digest, entry)) => {
                shard.entries.insert(digest, entry);
            }
            None => {
                shard.skipped += 1;
                warn!("{}:{} malformed entry skipped", path.display(), lineno + 1);
            }
        }
    }
    shard
}

fn parse_entry_line(line: &[u8]) -> Option<(u128, Entry)> {
    let line = std::str::from_utf8(line).ok()?;
    let mut fields = line.split('\t');
    let digest = parse_digest(fields.next()?.trim())?;

    let bucket = match optional_field(fields.next()) {
        Some(raw) => Some(Bucket::new(raw.parse().ok()?).ok()?),
        None => None,
    };
    let relative_frequency = match optional_field(fields.next()) {
        Some(raw) => {
            let value: f64 = raw.parse().ok()?;
            if !(value > 0.0 && value < 1.0) {
                return None;
            }
            Some(value)
        }
        None => None,
    };

    Some((
        digest,
        Entry {
            bucket,
            relative_frequency,
        },
    ))
}

fn parse_digest(token: &str) -> Option<u128> {
    if token.len() != DIGEST_SUFFIX_LEN || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u128::from_str_radix(token, 16).ok()
}

fn optional_field(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|f| !f.is_empty() && *f != "-")
}

fn parse_word_list(bytes: &[u8], path: &Path) -> WordList {
    let mut words = Vec::new();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        match std::str::from_utf8(line) {
            Ok(word) => {
                let word = word.trim();
                if !word.is_empty() {
                    words.push(word.to_string());
                }
            }
            Err(_) => warn!("{}:{} invalid utf-8 skipped", path.display(), lineno + 1),
        }
    }
    WordList::from(words)
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
