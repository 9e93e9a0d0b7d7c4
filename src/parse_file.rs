//! Parse a saved replay listing page from disk and print the Barcelona entries.
//! Run: cargo run --bin parse-file -- luxiang.htm [keyword ...]

use anyhow::{Context, Result};
use replay_crawler::{ExtractConfig, Extractor};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: parse-file <page.html> [keyword ...]")?;

    let mut config = ExtractConfig::default();
    let keywords: Vec<String> = args.collect();
    if !keywords.is_empty() {
        config.keywords = keywords;
    }

    let extractor = Extractor::new(config).context("bad base url")?;
    let items = extractor
        .extract_file(&path)
        .with_context(|| format!("parse {path}"))?;

    info!("{} matching replays in {}", items.len(), path);
    for (i, it) in items.iter().enumerate() {
        println!("{}. [{}] {}\n   {}", i + 1, it.date, it.title, it.url);
    }
    Ok(())
}
