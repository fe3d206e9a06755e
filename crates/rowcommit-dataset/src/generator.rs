// crates/rowcommit-dataset/src/generator.rs

//! Deterministic synthetic supply-chain dataset for tests, benches and the
//! CLI `simulate` subcommand.
//!
//! The columns include the default denylisted identifiers so the sanitizer
//! has something to drop, and some values carry irregular whitespace so
//! canonicalization has something to normalize.

use crate::format::Row;
use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng as _, SeedableRng};
use std::path::Path;

/// Column layout of generated datasets.
pub const SYNTHETIC_HEADERS: &[&str] = &[
    "Order Id",
    "Order Date",
    "Customer Email",
    "Customer Password",
    "Customer Street",
    "Customer City",
    "Product Name",
    "Order Item Quantity",
    "Sales",
];

const CITIES: &[&str] = &["Caguas", "Chicago", "Los Angeles", "San Juan", "New York"];
const PRODUCTS: &[&str] = &[
    "Field & Stream Sportsman 16 Gun Fire Safe",
    "Perfect Fitness Perfect Rip Deck",
    "Nike Men's Dri-FIT Victory Golf Polo",
    "O'Brien Men's Neoprene Life Vest",
    "Smart watch",
];

fn pick<'a>(rng: &mut StdRng, xs: &[&'a str]) -> &'a str {
    xs[rng.random_range(0..xs.len())]
}

/// Generate `n` rows with a fixed seed; the same `(n, seed)` always yields the
/// same rows.
#[must_use]
pub fn generate_rows(n: usize, seed: u64) -> Vec<Row> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);

    for i in 0..n {
        let qty: u32 = rng.random_range(1..=5);
        let price: u32 = rng.random_range(500..=40_000);
        let product = pick(&mut rng, PRODUCTS);
        // Roughly one value in five gets padded or doubled spaces.
        let product = if rng.random_bool(0.2) {
            format!("  {}  ", product.replace(' ', "  "))
        } else {
            product.to_owned()
        };

        let values = [
            (1000 + i).to_string(),
            format!("2017-{:02}-{:02}", rng.random_range(1..=12), rng.random_range(1..=28)),
            format!("customer{i}@example.com"),
            "XXXXXXXXX".to_owned(),
            format!("{} Main Street", rng.random_range(1..=9999)),
            pick(&mut rng, CITIES).to_owned(),
            product,
            qty.to_string(),
            format!("{}.{:02}", price * qty / 100, price * qty % 100),
        ];
        rows.push(
            SYNTHETIC_HEADERS
                .iter()
                .map(|h| (*h).to_owned())
                .zip(values)
                .collect(),
        );
    }
    rows
}

/// Write a generated dataset as a raw CSV (all columns, header row first).
pub fn write_synthetic_csv(path: &Path, n: usize, seed: u64) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating parent directory {}", dir.display()))?;
    }
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    w.write_record(SYNTHETIC_HEADERS).context("write CSV header")?;
    for row in generate_rows(n, seed) {
        w.write_record(SYNTHETIC_HEADERS.iter().map(|h| row.get(*h).map_or("", String::as_str)))
            .context("write CSV record")?;
    }
    w.flush().context("flush CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_a_seed() {
        assert_eq!(generate_rows(20, 7), generate_rows(20, 7));
        assert_ne!(generate_rows(20, 7), generate_rows(20, 8));
    }

    #[test]
    fn every_row_has_every_column() {
        for row in generate_rows(10, 1) {
            assert_eq!(row.len(), SYNTHETIC_HEADERS.len());
        }
    }
}
