//! Reads a raw extraction CSV back in, for transform-only runs.

use crate::models::RawProduct;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

const RAW_COLUMNS: [&str; 7] = ["title", "price", "rating", "colors", "size", "gender", "timestamp"];

/// Parse a raw CSV: title, price, rating, colors, size, gender, timestamp.
/// Missing columns fail the whole file; a malformed row is skipped.
pub fn load_raw_csv(path: &Path) -> Result<Vec<RawProduct>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let headers = reader.headers().with_context(|| format!("No header in {:?}", path))?.clone();
    let missing: Vec<&str> = RAW_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("{:?} is missing columns: {}", path, missing.join(", "));
    }

    let mut products = Vec::new();
    for (i, result) in reader.deserialize::<RawProduct>().enumerate() {
        match result {
            Ok(p) => products.push(p),
            Err(e) => warn!("Row {} in {:?}: {}", i + 1, path, e),
        }
    }

    info!("{} raw rows loaded from {:?}", products.len(), path);
    Ok(products)
}
