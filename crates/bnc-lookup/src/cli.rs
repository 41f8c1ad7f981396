//! Command-line surface shared by the `bnc` binary and its tests.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bnc_db::{Corpus, LoadMode};
use bnc_morph::ContractionRules;
use bnc_types::CorpusIndex;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

use crate::lookup::{DEFAULT_SAMPLE_SIZE, Lookup};

/// Query succeeded or the word was found.
pub const EXIT_FOUND: u8 = 0;
/// The word is not in the corpus.
pub const EXIT_NOT_FOUND: u8 = 1;
/// Bad arguments, including out-of-range buckets.
pub const EXIT_USAGE: u8 = 2;
/// The corpus (or the server) could not be brought up.
pub const EXIT_UNAVAILABLE: u8 = 3;

pub const DEFAULT_DATA_DIR: &str = "bnc_data";
pub const DEFAULT_DATA_IMAGE_DIR: &str = "/app/bnc";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Parser)]
#[command(name = "bnc")]
#[command(about = "Word frequency lookups against the British National Corpus")]
pub struct Cli {
    /// Corpus directory holding `index/` and `buckets/`.
    #[arg(long, global = true, env = "BNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    /// How table files are read: `mmap` or `owned`.
    #[arg(
        long,
        global = true,
        env = "BNC_LOAD_MODE",
        default_value = "mmap",
        value_parser = parse_load_mode
    )]
    pub load_mode: LoadMode,
    /// Replace the built-in `'s` contraction allowlist with this file.
    #[arg(long, global = true, env = "BNC_ALLOWLIST")]
    pub allowlist: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Query(Query),
    /// Serve the JSON API over HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Subcommand)]
pub enum Query {
    /// Check whether a word exists in the corpus.
    Exists { word: String },
    /// Print a word's frequency bucket (1 = most frequent).
    Bucket { word: String },
    /// Print a word's relative frequency.
    Freq { word: String },
    /// Print how often a word should appear in a text of the given length.
    Expected {
        word: String,
        #[arg(allow_negative_numbers = true)]
        text_length: i64,
        #[arg(long)]
        rounded: bool,
    },
    /// List every word in a bucket.
    Words {
        #[arg(allow_negative_numbers = true)]
        bucket: i64,
    },
    /// Print random words from a bucket.
    Sample {
        #[arg(allow_negative_numbers = true)]
        bucket: i64,
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        n: usize,
    },
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Load every shard and bucket before accepting requests.
    #[arg(long, env = "BNC_PRELOAD", value_parser = BoolishValueParser::new())]
    pub preload: bool,
    /// Omit Cache-Control headers.
    #[arg(long, env = "BNC_NO_CACHE", value_parser = BoolishValueParser::new())]
    pub no_cache: bool,
}

impl Cli {
    /// `--data-dir`, else `./bnc_data` when present, else the container path.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Open the corpus and build the engine the command runs against.
    pub fn open(&self) -> Result<Lookup<Corpus>> {
        let data_dir = self.data_dir();
        let corpus = Corpus::open_with_mode(&data_dir, self.load_mode)
            .with_context(|| format!("open corpus at {}", data_dir.display()))?;
        let rules = match &self.allowlist {
            Some(path) => ContractionRules::load_allowlist(path)?,
            None => ContractionRules::default(),
        };
        Ok(Lookup::with_rules(corpus, rules))
    }

    /// Commands that print results stay quiet unless something is wrong.
    pub fn default_log_level(&self) -> &'static str {
        match self.command {
            Command::Serve(_) => "info",
            Command::Query(_) => "warn",
        }
    }
}

fn default_data_dir() -> PathBuf {
    let local = PathBuf::from(DEFAULT_DATA_DIR);
    if local.exists() {
        return local;
    }
    PathBuf::from(DEFAULT_DATA_IMAGE_DIR)
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    LoadMode::parse(raw).ok_or_else(|| format!("unknown load mode `{raw}` (expected mmap or owned)"))
}

/// Run a one-shot query, writing results to `out` and diagnostics to `err`.
/// Returns the process exit code.
pub fn run_query<C, O, E>(lookup: &Lookup<C>, query: &Query, out: &mut O, err: &mut E) -> io::Result<u8>
where
    C: CorpusIndex,
    O: Write,
    E: Write,
{
    match query {
        Query::Exists { word } => {
            let found = lookup.exists(word);
            writeln!(out, "{found}")?;
            Ok(found_code(found))
        }
        Query::Bucket { word } => print_option(out, lookup.bucket(word)),
        Query::Freq { word } => {
            print_option(out, lookup.relative_frequency(word).map(format_scientific))
        }
        Query::Expected {
            word,
            text_length,
            rounded,
        } => {
            if *rounded {
                print_option(out, lookup.expected_count_rounded(word, *text_length))
            } else {
                let count = lookup.expected_count(word, *text_length);
                print_option(out, count.map(|c| format!("{c:.4}")))
            }
        }
        Query::Words { bucket } => match lookup.words(*bucket) {
            Ok(words) => {
                for word in words.iter() {
                    writeln!(out, "{word}")?;
                }
                Ok(EXIT_FOUND)
            }
            Err(e) => usage(err, e),
        },
        Query::Sample { bucket, n } => match lookup.sample(*bucket, *n) {
            Ok(words) => {
                for word in words {
                    writeln!(out, "{word}")?;
                }
                Ok(EXIT_FOUND)
            }
            Err(e) => usage(err, e),
        },
    }
}

/// Scientific notation with six fractional digits and a signed, two-digit
/// exponent: `6.170000e-02`.
pub fn format_scientific(value: f64) -> String {
    let formatted = format!("{value:.6e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

fn print_option<O: Write, T: std::fmt::Display>(out: &mut O, value: Option<T>) -> io::Result<u8> {
    let found = value.is_some();
    match value {
        Some(value) => writeln!(out, "{value}")?,
        None => writeln!(out, "None")?,
    }
    Ok(found_code(found))
}

fn found_code(found: bool) -> u8 {
    if found { EXIT_FOUND } else { EXIT_NOT_FOUND }
}

fn usage<E: Write>(err: &mut E, error: impl std::fmt::Display) -> io::Result<u8> {
    writeln!(err, "error: {error}")?;
    Ok(EXIT_USAGE)
}
