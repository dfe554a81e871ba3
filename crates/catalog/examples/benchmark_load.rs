use anyhow::{Context, Result};
use catalog::{Catalog, LoadOptions, RowErrorPolicy};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/movies_metadata.csv.zip"));

    println!("Loading movie catalog from {}...\n", path.display());

    let options = LoadOptions::new().with_row_error_policy(RowErrorPolicy::SkipRow);
    let start = Instant::now();
    let catalog = Catalog::load_from_path(&path, options)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let elapsed = start.elapsed();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", catalog.len());
    println!("Genres: {}", catalog.genres().len());
    println!("Countries: {}", catalog.countries().len());
    println!("Skipped rows: {}", catalog.skipped_rows());
    println!("\nPerformance: {:.0} movies/second",
             catalog.len() as f64 / elapsed.as_secs_f64());

    Ok(())
}
