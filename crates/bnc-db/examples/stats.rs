use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use bnc_db::{Corpus, LoadMode};
use bnc_types::{Bucket, CORPUS_TOKENS, CorpusIndex};

fn main() -> Result<()> {
    let data_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p bnc-db --example stats -- <path-to-bnc-data>")?;

    let corpus = Corpus::open_with_mode(&data_dir, LoadMode::Mmap)
        .with_context(|| format!("opening corpus at {}", data_dir.display()))?;

    let start = Instant::now();
    let stats = corpus.preload();

    println!("Corpus       : {}", data_dir.display());
    println!("Loaded in    : {} ms", start.elapsed().as_millis());
    println!("Shards       : {} ({} missing)", stats.shards_loaded, stats.shards_missing);
    println!("Entries      : {}", stats.entries);
    println!("Skipped lines: {}", stats.skipped_lines);

    let sizes: Vec<usize> = Bucket::all()
        .map(|b| corpus.words_in_bucket(b).len())
        .collect();
    println!("Bucket sizes : min {} / max {}", sizes.iter().min().unwrap_or(&0), sizes.iter().max().unwrap_or(&0));

    // Spot-check a couple of words.
    for word in ["the", "computer", "shimmered"] {
        match (corpus.bucket_of(word), corpus.relative_frequency_of(word)) {
            (Some(bucket), Some(rf)) => println!(
                "'{word}': bucket {bucket}, rf {rf:.3e}, ~{:.0} occurrences",
                rf * CORPUS_TOKENS as f64
            ),
            _ => println!("'{word}': not found"),
        }
    }

    Ok(())
}
